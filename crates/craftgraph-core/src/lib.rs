//! Craftgraph Core -- derives a complete crafting model from a game's
//! line-oriented data mod.
//!
//! The pipeline runs as a single batch over in-memory data, one phase
//! feeding the next:
//!
//! 1. **Parse** -- object, category and transition records become typed
//!    models ([`object::GameObject`], [`category::Category`],
//!    [`transition::Transition`]).
//! 2. **Resolve categories** -- category records attach to their parent
//!    objects and validate members.
//! 3. **Expand & merge transitions** -- [`graph::GraphBuilder`] splits
//!    category placeholders into concrete transitions, aligns pattern
//!    categories positionally, folds generic rules into their matches and
//!    rewrites attack rules.
//! 4. **Wire** -- transitions land in the [`graph::CraftGraph`] arena and
//!    objects get their forward/backward adjacency; global triggers are
//!    connected by name convention.
//! 5. **Depth** -- [`depth::calculate`] runs a least fixed point over the
//!    (cyclic) graph, giving every object a craftability distance.
//! 6. **Export** -- [`export::export_object`] projects per-object records:
//!    resolved transitions, depth, biome spawns, a tech-tree sketch and the
//!    [`recipe::Recipe`] payload.
//!
//! Earlier phases never read what later phases write, so a full rebuild is
//! the only mutation story: re-running the pipeline reconstructs everything
//! from the raw records.
//!
//! Failures follow one rule: only unreadable raw records are hard errors.
//! Unknown attributes, unresolvable ids, category self-references and
//! per-object recipe blowups are logged through `tracing` and the pipeline
//! carries on without them.

pub mod biome;
pub mod category;
pub mod config;
pub mod depth;
pub mod export;
pub mod graph;
pub mod id;
pub mod object;
pub mod record;
pub mod recipe;
pub mod sprite;
pub mod transition;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

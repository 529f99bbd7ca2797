//! Engine configuration.
//!
//! A small immutable struct threaded explicitly through the depth, recipe
//! and export paths; nothing in the engine reads ambient process state.

use crate::id::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Flat bonus added to displayed food values (a server-side rule some
    /// mods run with).
    pub food_bonus: i32,
    /// Object synthesized as the outcome of an unanswered attack.
    pub grave_id: ObjectId,
    /// Maximum decay-chain hops collapsed into one timed recipe edge.
    pub decay_collapse_limit: u32,
    /// Maximum hops followed when propagating tool status through simple
    /// transitions.
    pub tool_search_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            food_bonus: 0,
            grave_id: ObjectId(87),
            decay_collapse_limit: 10,
            tool_search_limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.food_bonus, 0);
        assert_eq!(config.grave_id, ObjectId(87));
        assert_eq!(config.decay_collapse_limit, 10);
        assert_eq!(config.tool_search_limit, 10);
    }

    #[test]
    fn partial_deserialization_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"food_bonus": 3}"#).unwrap();
        assert_eq!(config.food_bonus, 3);
        assert_eq!(config.grave_id, ObjectId(87));
    }
}

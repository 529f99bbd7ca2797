//! Craftgraph Data -- the filesystem pipeline around `craftgraph-core`.
//!
//! Reads a data mod checkout (objects/, categories/, transitions/, ground/),
//! drives the core import phases in order, and assembles the derived
//! payloads the packaging layer publishes: per-object records, per-biome
//! records and the object catalog. Writing those payloads anywhere is the
//! caller's business.

pub mod badges;
pub mod catalog;
pub mod config;
pub mod filters;
pub mod loader;

pub use config::{ConfigError, load_config, load_config_dir};
pub use loader::{GameDataLoader, LoadError};

//! fundflow-state
//!
//! The project lifecycle engine: an in-memory state store, reducer-style
//! action dispatch with atomic commit, input validation, the badge and
//! companion progression read model, and gacha pulls.

pub mod config;
pub mod engine;
pub mod gacha;
pub mod progression;
pub mod store;
pub mod validation;

pub use config::EngineConfig;
pub use engine::LifecycleEngine;
pub use progression::{CollectionEvent, CollectionLedger};
pub use store::StateStore;

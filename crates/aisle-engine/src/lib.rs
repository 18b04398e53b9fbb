//! aisle-engine
//!
//! Deterministic filter/rank pipeline over an in-memory catalog. Stateless and
//! read-only, so one catalog can serve any number of sessions.
pub mod reason;
pub mod search;

pub use search::search;

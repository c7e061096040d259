//! Shared application state.

pub mod store;

pub use store::{analysis_key, AppState, CachedAnalysis};

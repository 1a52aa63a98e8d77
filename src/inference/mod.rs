//! Prediction serving: the loaded-once inference engine and the
//! append-only inference log it feeds.

mod engine;
mod log;

pub use engine::{InferenceEngine, InferenceStats};
pub use log::InferenceLog;

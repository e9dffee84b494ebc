//! sunset_pipeline: checks guessed sunset hours against a lookup service.
//!
//! Records flow from a shared queue through a pool of workers into a result
//! aggregator, which publishes the hour-ordered matches once every worker has
//! finished.

pub mod prelude;

#[path = "common/lib.rs"]
pub mod common;
#[path = "engine/lib.rs"]
pub mod engine;
#[path = "errors/lib.rs"]
pub mod errors;
#[path = "lookup/lib.rs"]
pub mod lookup;
#[path = "queue/lib.rs"]
pub mod queue;
#[path = "utils/lib.rs"]
pub mod utils;

//! Session Orchestration: protocol orderings, block sequencing, reduction
//!
//! # Components
//! - `protocol.rs`: the four counterbalanced block orderings
//! - `orchestrator.rs`: (practice, measured) pair sequencing with rest
//!   checkpoints
//! - `results.rs`: ordered session results and summary reduction

pub mod orchestrator;
pub mod protocol;
pub mod results;

pub use orchestrator::{Orchestrator, SessionPlan, StageMaterial};
pub use protocol::{BlockId, Protocol, Stage, SubBlock};
pub use results::{condition_accuracy, BlockSummary, SessionResult};

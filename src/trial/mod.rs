//! Trial Presentation: stimulus modeling, phase timing, and sequencing
//!
//! # Components
//! - `item.rs`: StimulusItem/ItemSet generation and response records
//! - `timing.rs`: the fixed phase sequence and per-phase dwells
//! - `engine.rs`: the per-item trial state machine
//! - `block.rs`: block-level policy around the engine

pub mod block;
pub mod engine;
pub mod item;
pub mod timing;

pub use block::{assemble_block, BlockConfig, BlockOutcome, BlockRunner, RoundIntro};
pub use engine::{TrialEngine, TrialResult};
pub use item::{ItemSet, Modality, ResponseKey, ResponseRecord, StimulusItem, Verdict};
pub use timing::{Phase, TrialTiming};

//! Tabular Data: stimulus table loading and result persistence
//!
//! # Components
//! - `config.rs`: CSV stimulus tables normalized into fixed-shape rows
//! - `output.rs`: per-session trial CSV and the cross-session overview

pub mod config;
pub mod output;

pub use config::{load_stimulus_rows, split_former_latter, StimulusRow};
pub use output::{append_overview, write_session_csv, Participant};

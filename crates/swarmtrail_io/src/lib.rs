//! # Swarmtrail IO
//!
//! Persistence layer for recorded swarm trajectories.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - JSON serialization helpers with whole-file writes
//! - Log file naming, save debouncing and run finalization
//! - Loading recorded logs back, including the legacy layout

/// Error types and result aliases for I/O operations
pub mod error;
/// Log file naming, save gating and writing
pub mod persistence;
/// Loading persisted logs in current and legacy layouts
pub mod replay;
/// Validated serialization helpers for JSON
pub mod serialization;

pub use error::{IoError, Result};
pub use persistence::{Persister, SaveGate, SaveKind, SkipReason, LOG_FILE_SUFFIX};
pub use replay::{latest_log, load_log, parse_log};
pub use serialization::{
    from_json, read_json_file, to_json, to_json_pretty, write_json_file, write_whole_file,
};

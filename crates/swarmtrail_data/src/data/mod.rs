//! Core data structures for trajectory recording.

pub mod frame;
pub mod log;

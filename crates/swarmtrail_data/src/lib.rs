//! # Swarmtrail Data
//!
//! Plain data structures shared by every swarmtrail crate: agent identities,
//! sampled frames, per-agent trajectories and the persisted log document.
//!
//! Everything here is `serde`-serializable and carries no behavior beyond
//! small accessors, so the wire format of a trajectory log is defined in one
//! place.

pub mod data;

pub use data::frame::{AgentId, Frame, Position, Trajectory};
pub use data::log::{RunMetadata, TrajectoryLog, DEFAULT_PARTICIPANT_ID, EVERY_TICK_SAMPLE_HZ};

//! # Swarmtrail Core
//!
//! Recording logic for drone-swarm trajectories, independent of any host
//! engine and of the file system.
//!
//! This crate contains:
//! - Tick throttling for sampling and recording (rate and decimation gates)
//! - Main-group classification (connectivity graph, then geometric clustering)
//! - Two-tier agent identity resolution
//! - The append-only trajectory store
//! - Configuration, recorder statistics and logging setup
//! - Offline centroid analysis of recorded logs
//!
//! ## Example
//!
//! ```
//! use swarmtrail_core::cluster::find_components;
//! use swarmtrail_data::Position;
//!
//! let points = [
//!     Position::new(0.0, 0.0, 0.0),
//!     Position::new(1.0, 0.0, 0.0),
//!     Position::new(10.0, 0.0, 0.0),
//! ];
//! let components = find_components(&points, 1.5, false);
//! assert_eq!(components.largest_size(), 2);
//! ```

/// Main-group centroid analysis of recorded logs
pub mod analysis;
/// Main-group classification policy
pub mod classifier;
/// Weighted union-find clustering over agent positions
pub mod cluster;
/// Configuration management for recorder parameters
pub mod config;
/// Link-graph connectivity source
pub mod connectivity;
/// Stable and run-local agent identities
pub mod identity;
/// Lenient decoding of host run metadata
pub mod metadata;
/// Recorder statistics and logging initialization
pub mod metrics;
/// Capability traits implemented by the host
pub mod provider;
/// Sample and record gating per tick
pub mod scheduler;
/// Append-only trajectory storage
pub mod store;

pub use classifier::{Classification, GroupSource, MainGroupClassifier};
pub use config::RecorderConfig;
pub use connectivity::LinkGraph;
pub use metrics::{init_logging, RecorderStats};
pub use provider::{AgentProvider, AgentSample, ConnectivitySource, RunMetadataSource};
pub use scheduler::{RecordingScheduler, TickDecision};
pub use store::TrajectoryStore;

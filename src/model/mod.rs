pub mod analysis {
    pub use swarmtrail_core::analysis::*;
}
pub mod classifier {
    pub use swarmtrail_core::classifier::*;
}
pub mod cluster {
    pub use swarmtrail_core::cluster::*;
}
pub mod config {
    pub use swarmtrail_core::config::*;
}
pub mod connectivity {
    pub use swarmtrail_core::connectivity::*;
}
pub mod provider {
    pub use swarmtrail_core::provider::*;
}
pub mod scheduler {
    pub use swarmtrail_core::scheduler::*;
}
pub mod persistence {
    pub use swarmtrail_io::persistence::*;
}
pub mod replay {
    pub use swarmtrail_io::replay::*;
}

pub mod state {
    pub use swarmtrail_data::*;
}

pub mod recorder;
pub mod swarm;

pub use recorder::Recorder;
pub use swarm::SyntheticSwarm;

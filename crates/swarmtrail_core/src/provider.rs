//! Capability interfaces the host injects into the recorder.
//!
//! The recorder never inspects the host's object model. It asks an
//! [`AgentProvider`] for the live agents, optionally consults a
//! [`ConnectivitySource`] for the swarm's communication graph, and reads run
//! metadata through a [`RunMetadataSource`].

use swarmtrail_data::{AgentId, Position};

/// One live agent as reported by the host on a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSample {
    /// Identity that survives restarts, when the host has one.
    pub stable_id: Option<AgentId>,
    /// Host-side handle, unique among live agents of the current run.
    pub instance: u64,
    pub name: String,
    pub position: Position,
}

impl AgentSample {
    #[must_use]
    pub fn new(stable_id: Option<AgentId>, instance: u64, name: impl Into<String>, position: Position) -> Self {
        Self {
            stable_id,
            instance,
            name: name.into(),
            position,
        }
    }
}

/// Source of live agents and their current positions.
///
/// The returned `Vec` is an owned snapshot, so every agent of one sample is
/// read at the same instant. An error or an empty list means discovery has
/// not succeeded yet; the recorder backs off and retries.
pub trait AgentProvider {
    fn list(&mut self) -> anyhow::Result<Vec<AgentSample>>;

    /// Connectivity graph maintained alongside the agents, if the host has one.
    fn connectivity(&self) -> Option<&dyn ConnectivitySource> {
        None
    }
}

impl<F> AgentProvider for F
where
    F: FnMut() -> anyhow::Result<Vec<AgentSample>>,
{
    fn list(&mut self) -> anyhow::Result<Vec<AgentSample>> {
        self()
    }
}

/// External knowledge of which agents are connected to each other.
pub trait ConnectivitySource {
    /// Members of the largest connected group. Empty while not ready.
    fn largest_group(&self) -> Vec<AgentId>;

    /// Independent "is this agent in the main network" query.
    ///
    /// The classifier ORs this with membership in [`largest_group`]; the two
    /// answers are not required to agree.
    ///
    /// [`largest_group`]: ConnectivitySource::largest_group
    fn is_in_main_network(&self, id: AgentId) -> bool;
}

/// Raw run metadata as handed over by the host.
///
/// Values are untyped on purpose: fields with an unexpected type or shape are
/// treated as absent by [`crate::metadata::resolve`].
pub trait RunMetadataSource {
    fn fetch(&self) -> Option<serde_json::Value>;
}

impl RunMetadataSource for serde_json::Value {
    fn fetch(&self) -> Option<serde_json::Value> {
        Some(self.clone())
    }
}

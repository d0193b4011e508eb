//! Graph-backed [`ConnectivitySource`].
//!
//! Hosts that know which agents can talk to each other (radio range, mesh
//! links, ...) feed the links in as edges; the largest connected component of
//! that graph becomes the main network.

use crate::provider::ConnectivitySource;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::UnGraphMap;
use std::collections::HashSet;
use swarmtrail_data::AgentId;

/// Undirected link graph between agents.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    graph: UnGraphMap<AgentId, ()>,
    main_network: HashSet<AgentId>,
    largest: Vec<AgentId>,
}

impl LinkGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all nodes, links and cached components.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.main_network.clear();
        self.largest.clear();
    }

    pub fn add_agent(&mut self, id: AgentId) {
        self.graph.add_node(id);
    }

    pub fn link(&mut self, a: AgentId, b: AgentId) {
        if a != b {
            self.graph.add_edge(a, b, ());
        }
    }

    /// Marks agents the host separately reports as attached to the main network.
    pub fn set_main_network(&mut self, ids: impl IntoIterator<Item = AgentId>) {
        self.main_network = ids.into_iter().collect();
    }

    /// Recomputes the largest connected component after the links changed.
    ///
    /// Ties keep the component containing the smallest agent id.
    pub fn rebuild(&mut self) {
        let mut best: Vec<AgentId> = Vec::new();
        for mut component in tarjan_scc(&self.graph) {
            component.sort_unstable();
            let better = component.len() > best.len()
                || (component.len() == best.len() && component.first() < best.first());
            if better {
                best = component;
            }
        }
        self.largest = best;
    }

    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.graph.node_count()
    }
}

impl ConnectivitySource for LinkGraph {
    fn largest_group(&self) -> Vec<AgentId> {
        self.largest.clone()
    }

    fn is_in_main_network(&self, id: AgentId) -> bool {
        self.main_network.contains(&id)
    }
}

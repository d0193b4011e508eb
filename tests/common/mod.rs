pub mod macros;

use std::path::PathBuf;
use swarmtrail_core::config::RecorderConfig;
use swarmtrail_core::{AgentProvider, AgentSample, ConnectivitySource, LinkGraph};
use swarmtrail_data::{AgentId, Position};

/// Provider with a fixed set of agents, optional failures and an optional
/// connectivity graph.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedSwarm {
    pub agents: Vec<AgentSample>,
    pub failures_left: usize,
    pub list_calls: usize,
    pub graph: Option<LinkGraph>,
}

#[allow(dead_code)]
impl ScriptedSwarm {
    /// Agents with stable ids `0..n` spaced `spacing` apart on the X axis.
    pub fn line(n: usize, spacing: f32) -> Self {
        let agents = (0..n)
            .map(|i| {
                AgentSample::new(
                    Some(AgentId(i as i64)),
                    100 + i as u64,
                    format!("Drone {i}"),
                    Position::new(i as f32 * spacing, 1.0, 0.0),
                )
            })
            .collect();
        Self {
            agents,
            ..Self::default()
        }
    }

    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures_left = failures;
        self
    }

    pub fn with_graph(mut self, graph: LinkGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Moves every agent by `dx` along X.
    pub fn advance(&mut self, dx: f32) {
        for agent in &mut self.agents {
            agent.position.x += dx;
        }
    }
}

impl AgentProvider for ScriptedSwarm {
    fn list(&mut self) -> anyhow::Result<Vec<AgentSample>> {
        self.list_calls += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            anyhow::bail!("host not ready");
        }
        Ok(self.agents.clone())
    }

    fn connectivity(&self) -> Option<&dyn ConnectivitySource> {
        self.graph.as_ref().map(|g| g as &dyn ConnectivitySource)
    }
}

/// Config recording every tick into a fresh scratch directory, with autosave
/// off.
#[allow(dead_code)]
pub fn scratch_config() -> RecorderConfig {
    let mut config = RecorderConfig::default();
    config.sampling.sample_hz = 0.0;
    config.persistence.autosave_interval_secs = 0.0;
    config.persistence.root_dir = scratch_dir().to_string_lossy().into_owned();
    config
}

#[allow(dead_code)]
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("swarmtrail-it-{}", uuid::Uuid::new_v4()))
}

/// Log files currently in `dir`, sorted by name.
#[allow(dead_code)]
pub fn log_files(dir: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.to_string_lossy().ends_with("_traj.json"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

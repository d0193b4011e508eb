use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::config::RecorderConfig;
use crate::model::{Recorder, SyntheticSwarm};

/// Radio range of the synthetic swarm, relative to the clustering threshold.
const LINK_RANGE_FACTOR: f32 = 1.2;

/// Options the host binary takes from its command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub drones: usize,
    pub seed: u64,
    pub scene: String,
    /// Stop after this much simulated time. `None` runs until interrupted.
    pub duration: Option<Duration>,
    pub tick_rate: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config.toml"),
            drones: 12,
            seed: 42,
            scene: "Synthetic Swarm".to_string(),
            duration: None,
            tick_rate: Duration::from_micros(16_667),
        }
    }
}

pub struct App {
    pub running: bool,
    pub tick_count: u64,
    pub recorder: Recorder<SyntheticSwarm>,
    pub options: RunOptions,
}

impl App {
    /// Reads `path`, falling back to defaults on a missing or invalid file.
    /// A missing file is created with the defaults.
    pub fn load_config(path: &Path) -> RecorderConfig {
        if let Ok(content) = std::fs::read_to_string(path) {
            match RecorderConfig::from_toml(&content) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load {}: {e:#}", path.display());
                }
            }
        }
        let default = RecorderConfig::default();
        if !path.exists() {
            match default.to_toml() {
                Ok(toml_str) => {
                    if let Err(e) = std::fs::write(path, toml_str) {
                        tracing::warn!("Could not write default {}: {e}", path.display());
                    }
                }
                Err(e) => tracing::warn!("Could not render default config: {e:#}"),
            }
        }
        default
    }

    pub fn new(options: RunOptions) -> Result<Self> {
        let config = Self::load_config(&options.config_path);
        config.validate()?;

        let link_range = config.grouping.cluster_threshold * LINK_RANGE_FACTOR;
        let swarm = SyntheticSwarm::new(options.drones, options.seed, link_range);
        let mut recorder = Recorder::new(config, swarm);
        recorder.start_run(options.scene.clone(), None);

        Ok(Self {
            running: true,
            tick_count: 0,
            recorder,
            options,
        })
    }

    /// Advances the swarm and the recorder by one fixed tick.
    pub fn step(&mut self) {
        let dt = self.options.tick_rate.as_secs_f64();
        self.recorder.provider_mut().step(dt as f32);
        self.recorder.tick(dt);
        self.tick_count += 1;

        if let Some(limit) = self.options.duration {
            if self.recorder.run_time() >= limit.as_secs_f64() {
                tracing::info!(
                    run_time = self.recorder.run_time(),
                    "Duration limit reached"
                );
                self.running = false;
            }
        }
    }
}

//! The per-run recording pipeline.
//!
//! A [`Recorder`] owns every piece of recording state for one run and is
//! driven by the host with one [`Recorder::tick`] call per simulation step.
//! Saves happen on the autosave timer, on explicit request, and at the end of
//! the run.

use std::path::PathBuf;
use std::time::Instant;

use swarmtrail_core::config::RecorderConfig;
use swarmtrail_core::identity::IdentityRegistry;
use swarmtrail_core::metadata;
use swarmtrail_core::{
    AgentProvider, MainGroupClassifier, RecorderStats, RecordingScheduler, RunMetadataSource,
    TickDecision, TrajectoryStore,
};
use swarmtrail_data::{AgentId, Frame, Position, RunMetadata, TrajectoryLog};
use swarmtrail_io::{Persister, SaveKind};

pub struct Recorder<P: AgentProvider> {
    config: RecorderConfig,
    provider: P,
    scheduler: RecordingScheduler,
    classifier: MainGroupClassifier,
    store: TrajectoryStore,
    identity: IdentityRegistry,
    persister: Persister,
    stats: RecorderStats,
    scene_label: String,
    metadata: RunMetadata,
    /// Seconds since run start; frame timestamps.
    run_time: f64,
    autosave_elapsed: f64,
    /// Run time before which discovery is not retried.
    next_discovery_at: f64,
}

impl<P: AgentProvider> Recorder<P> {
    /// Creates a recorder for `provider`. The first run starts with the
    /// configured metadata and an unnamed scene.
    pub fn new(config: RecorderConfig, provider: P) -> Self {
        let metadata = config.metadata.to_run_metadata();
        Self {
            scheduler: RecordingScheduler::new(&config.sampling),
            classifier: MainGroupClassifier::new(config.grouping.clone()),
            persister: Persister::from_config(&config.persistence),
            store: TrajectoryStore::new(),
            identity: IdentityRegistry::new(),
            stats: RecorderStats::new(),
            scene_label: metadata.label.clone().unwrap_or_default(),
            metadata,
            run_time: 0.0,
            autosave_elapsed: 0.0,
            next_discovery_at: 0.0,
            config,
            provider,
        }
    }

    /// Begins a new run. A previous run that recorded frames and was not
    /// finalized gets its final save first.
    ///
    /// A `label` in the host metadata overrides `scene_label`.
    pub fn start_run(
        &mut self,
        scene_label: impl Into<String>,
        metadata_source: Option<&dyn RunMetadataSource>,
    ) {
        if self.store.has_frames() && !self.persister.is_finalized() {
            tracing::info!(scene = %self.scene_label, "Run transition; saving previous run");
            self.finish();
        }

        let raw = metadata_source.and_then(|source| source.fetch());
        self.metadata = metadata::resolve(raw.as_ref(), self.config.metadata.to_run_metadata());
        self.scene_label = match &self.metadata.label {
            Some(label) => label.clone(),
            None => scene_label.into(),
        };

        self.scheduler.reset();
        self.store.reset();
        self.identity.reset();
        self.persister.reset();
        self.stats = RecorderStats::new();
        self.run_time = 0.0;
        self.autosave_elapsed = 0.0;
        self.next_discovery_at = 0.0;

        tracing::info!(
            scene = %self.scene_label,
            pid = %self.metadata.participant_id,
            haptics = self.metadata.haptics_tag(),
            order = self.metadata.order_tag(),
            "Recording run started"
        );
    }

    /// Advances the run by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> TickDecision {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.run_time += dt;

        let decision = self.scheduler.tick(dt);
        let recorded = decision.record && self.capture(false) > 0;
        self.stats
            .record_tick(decision.samples, recorded, self.store.trajectory_count());

        self.advance_autosave(dt);
        decision
    }

    /// Reads every agent once and appends one frame each, regardless of the
    /// scheduler. Returns the number of frames appended.
    pub fn force_sample(&mut self) -> usize {
        self.capture(true)
    }

    fn capture(&mut self, force: bool) -> usize {
        if !force && self.run_time < self.next_discovery_at {
            return 0;
        }

        let samples = match self.provider.list() {
            Ok(samples) if !samples.is_empty() => samples,
            Ok(_) => {
                self.defer_discovery("no agents reported");
                return 0;
            }
            Err(e) => {
                self.defer_discovery(&e.to_string());
                return 0;
            }
        };

        let ids: Vec<AgentId> = samples.iter().map(|s| self.identity.resolve(s)).collect();
        let positions: Vec<Position> = samples.iter().map(|s| s.position).collect();
        let classification =
            self.classifier
                .classify(&ids, &positions, self.provider.connectivity());

        for ((sample, id), grouped) in samples.iter().zip(&ids).zip(classification.flags) {
            self.store.ensure(*id, &sample.name);
            self.store
                .append(*id, Frame::new(self.run_time, sample.position, grouped));
        }
        samples.len()
    }

    fn defer_discovery(&mut self, reason: &str) {
        let retry = self.config.discovery.retry_interval_secs;
        self.next_discovery_at = self.run_time + retry;
        tracing::debug!(reason, retry_in_secs = retry, "Agent discovery failed");
    }

    fn advance_autosave(&mut self, dt: f64) {
        let interval = self.config.persistence.autosave_interval_secs;
        if interval <= 0.0 {
            return;
        }
        self.autosave_elapsed += dt;
        if self.autosave_elapsed >= interval {
            self.autosave_elapsed %= interval;
            self.save(SaveKind::Periodic);
        }
    }

    /// Builds the log document from the live store.
    ///
    /// If nothing has been recorded yet, one sample is forced first so that a
    /// run with known agents never produces an empty log.
    pub fn build_log(&mut self) -> TrajectoryLog {
        if !self.store.has_frames() {
            let appended = self.force_sample();
            if appended > 0 {
                tracing::debug!(agents = appended, "Forced a sample for an empty run");
            }
        }
        self.store
            .snapshot(&self.scene_label, &self.metadata, self.scheduler.sample_hz())
    }

    /// Saves now. Returns the written path, or `None` if the save was skipped
    /// or failed (failures are logged).
    pub fn save(&mut self, kind: SaveKind) -> Option<PathBuf> {
        self.save_at(kind, Instant::now())
    }

    /// Same as [`Recorder::save`] with an explicit clock reading for the
    /// debounce.
    pub fn save_at(&mut self, kind: SaveKind, now: Instant) -> Option<PathBuf> {
        if let Err(reason) = self.persister.admit(kind, now) {
            tracing::debug!(?kind, ?reason, "Save skipped");
            self.stats.record_skipped_save();
            return None;
        }

        let log = self.build_log();
        if log.trajectories.is_empty() {
            tracing::debug!(?kind, "Nothing recorded yet; save skipped");
            self.stats.record_skipped_save();
            return None;
        }

        self.persister.mark_written(now);
        match self.persister.write(&log) {
            Ok(path) => {
                tracing::info!(
                    ?kind,
                    path = %path.display(),
                    trajectories = log.trajectories.len(),
                    frames = log.frame_count(),
                    "Trajectory log saved"
                );
                self.stats.record_save();
                Some(path)
            }
            Err(e) => {
                tracing::error!(?kind, error = %e, "Failed to save trajectory log");
                self.stats.record_failed_save();
                None
            }
        }
    }

    /// Manual "save now" request.
    pub fn save_now(&mut self) -> Option<PathBuf> {
        self.save(SaveKind::Manual)
    }

    /// Ends the run with a final save, unless saving on exit is disabled.
    pub fn finish(&mut self) -> Option<PathBuf> {
        if !self.config.persistence.save_on_exit {
            tracing::info!("Save on exit disabled; discarding run");
            return None;
        }
        self.save(SaveKind::Final)
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn store(&self) -> &TrajectoryStore {
        &self.store
    }

    pub fn stats(&self) -> &RecorderStats {
        &self.stats
    }

    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    pub fn scene_label(&self) -> &str {
        &self.scene_label
    }

    pub fn run_time(&self) -> f64 {
        self.run_time
    }

    pub fn is_finalized(&self) -> bool {
        self.persister.is_finalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmtrail_core::AgentSample;

    fn config() -> RecorderConfig {
        let mut config = RecorderConfig::default();
        config.sampling.sample_hz = 0.0;
        config.persistence.autosave_interval_secs = 0.0;
        config.persistence.root_dir = std::env::temp_dir()
            .join(format!("swarmtrail-recorder-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();
        config
    }

    fn line_of(n: u64) -> impl FnMut() -> anyhow::Result<Vec<AgentSample>> {
        move || {
            Ok((0..n)
                .map(|i| {
                    AgentSample::new(
                        Some(AgentId(i as i64)),
                        i,
                        format!("Drone {i}"),
                        Position::new(i as f32, 0.0, 0.0),
                    )
                })
                .collect())
        }
    }

    #[test]
    fn test_tick_appends_frames_with_run_time() {
        let mut recorder = Recorder::new(config(), line_of(2));
        recorder.start_run("Lab", None);
        recorder.tick(0.5);
        recorder.tick(0.25);
        let traj = recorder.store().get(AgentId(1)).unwrap();
        let times: Vec<f64> = traj.frames.iter().map(|f| f.timestamp).collect();
        assert_eq!(times, vec![0.5, 0.75]);
    }

    #[test]
    fn test_metadata_label_overrides_scene() {
        let mut recorder = Recorder::new(config(), line_of(1));
        let raw = serde_json::json!({"label": "Trial 3", "haptics": "H", "pid": 12});
        recorder.start_run("Lab", Some(&raw));
        assert_eq!(recorder.scene_label(), "Trial 3");
        assert!(recorder.metadata().haptics);
        assert_eq!(recorder.metadata().participant_id, "12");
    }

    #[test]
    fn test_discovery_backoff_uses_run_time() {
        let mut calls = 0;
        let provider = move || {
            calls += 1;
            if calls < 3 {
                Ok(Vec::new())
            } else {
                line_of(1)()
            }
        };
        let mut config = config();
        config.discovery.retry_interval_secs = 1.0;
        let mut recorder = Recorder::new(config, provider);
        recorder.start_run("Lab", None);

        recorder.tick(0.1); // first attempt fails, retry at 1.1
        for _ in 0..9 {
            recorder.tick(0.1);
        }
        assert!(!recorder.store().has_frames());
        recorder.tick(0.2); // second attempt fails at 1.2
        recorder.tick(1.0); // third succeeds at 2.2
        assert_eq!(recorder.store().frame_count(), 1);
    }

    #[test]
    fn test_save_without_agents_is_skipped() {
        let provider = || -> anyhow::Result<Vec<AgentSample>> { Ok(Vec::new()) };
        let mut recorder = Recorder::new(config(), provider);
        recorder.start_run("Empty", None);
        recorder.tick(0.1);
        assert!(recorder.save_now().is_none());
        assert_eq!(recorder.stats().saves(), 0);
    }

    #[test]
    fn test_skipped_save_does_not_debounce_the_next() {
        let mut calls = 0;
        let provider = move || {
            calls += 1;
            if calls == 1 {
                Ok(Vec::new())
            } else {
                line_of(1)()
            }
        };
        let config = config();
        let dir = config.persistence.root_dir.clone();
        let mut recorder = Recorder::new(config, provider);
        recorder.start_run("Lab", None);

        let t0 = Instant::now();
        assert!(recorder.save_at(SaveKind::Manual, t0).is_none());
        let path = recorder.save_at(SaveKind::Manual, t0 + std::time::Duration::from_millis(50));
        assert!(path.is_some());
        assert_eq!(recorder.stats().saves(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}

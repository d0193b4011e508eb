use std::collections::HashMap;
use swarmtrail_data::{AgentId, Frame, RunMetadata, Trajectory, TrajectoryLog, EVERY_TICK_SAMPLE_HZ};

/// Append-only per-agent trajectories of the current run.
///
/// Trajectories are kept in first-observation order and are never removed
/// before [`TrajectoryStore::reset`].
#[derive(Debug, Default, Clone)]
pub struct TrajectoryStore {
    trajectories: Vec<Trajectory>,
    index: HashMap<AgentId, usize>,
    frame_count: usize,
}

impl TrajectoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the trajectory for `id` if it does not exist yet.
    pub fn ensure(&mut self, id: AgentId, name: &str) {
        self.slot(id, name);
    }

    /// Appends a frame to `id`'s trajectory.
    ///
    /// An unknown id is created on the spot rather than losing the frame.
    pub fn append(&mut self, id: AgentId, frame: Frame) {
        let slot = match self.index.get(&id) {
            Some(&slot) => slot,
            None => {
                tracing::warn!(agent = %id, "Append for unknown agent; creating trajectory");
                self.slot(id, &format!("agent_{id}"))
            }
        };
        if self.trajectories[slot].push(frame) {
            tracing::debug!(agent = %id, "Clamped out-of-order frame timestamp");
        }
        self.frame_count += 1;
    }

    fn slot(&mut self, id: AgentId, name: &str) -> usize {
        if let Some(&slot) = self.index.get(&id) {
            return slot;
        }
        let slot = self.trajectories.len();
        self.trajectories.push(Trajectory::new(id, name));
        self.index.insert(id, slot);
        slot
    }

    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&Trajectory> {
        self.index.get(&id).map(|&slot| &self.trajectories[slot])
    }

    #[must_use]
    pub fn trajectory_count(&self) -> usize {
        self.trajectories.len()
    }

    /// Total frames recorded this run.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[must_use]
    pub fn has_frames(&self) -> bool {
        self.frame_count > 0
    }

    /// Copies the live trajectories into a log document.
    ///
    /// `sample_hz` of `None` is written as [`EVERY_TICK_SAMPLE_HZ`].
    #[must_use]
    pub fn snapshot(&self, scene_label: &str, metadata: &RunMetadata, sample_hz: Option<f64>) -> TrajectoryLog {
        TrajectoryLog {
            scene_label: scene_label.to_string(),
            participant_id: metadata.participant_id.clone(),
            haptics: metadata.haptics,
            ordered: metadata.ordered,
            sample_hz: sample_hz.unwrap_or(EVERY_TICK_SAMPLE_HZ),
            trajectories: self.trajectories.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.trajectories.clear();
        self.index.clear();
        self.frame_count = 0;
    }
}

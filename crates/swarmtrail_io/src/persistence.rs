//! Writing trajectory logs to disk.
//!
//! Each save produces one self-contained JSON file named
//! `{label}_{H|NH}_{O|NO}_{yyyyMMdd_HHmmss}_traj.json` under the configured
//! root directory. Saves are gated: bursts within the debounce window collapse
//! into one write, and once a run has been finalized its periodic saves stop.

use crate::error::{IoError, Result};
use crate::serialization::{to_json_pretty, write_whole_file};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use swarmtrail_core::config::PersistenceConfig;
use swarmtrail_data::TrajectoryLog;

/// Suffix shared by every trajectory log file.
pub const LOG_FILE_SUFFIX: &str = "_traj.json";

const FALLBACK_LABEL: &str = "Scene";

/// What triggered a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    /// Autosave timer.
    Periodic,
    /// Explicit "save now" request.
    Manual,
    /// End of run. Never debounced.
    Final,
}

/// Why a save request did not write anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Too close to the previous save.
    Debounced,
    /// Periodic save after the run was finalized.
    Finalized,
}

/// Debounce and finalization bookkeeping for one run.
#[derive(Debug, Clone)]
pub struct SaveGate {
    debounce: Duration,
    last_attempt: Option<Instant>,
    finalized: bool,
}

impl SaveGate {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            last_attempt: None,
            finalized: false,
        }
    }

    /// Decides whether a save of `kind` at `now` goes ahead.
    ///
    /// - `Final` always passes and finalizes the run.
    /// - `Periodic` is refused once the run is finalized.
    /// - `Periodic` and `Manual` are refused within the debounce window of the
    ///   last [`SaveGate::mark_written`] call.
    pub fn admit(&mut self, kind: SaveKind, now: Instant) -> std::result::Result<(), SkipReason> {
        match kind {
            SaveKind::Final => {
                self.finalized = true;
            }
            SaveKind::Periodic if self.finalized => return Err(SkipReason::Finalized),
            SaveKind::Periodic | SaveKind::Manual => {
                if let Some(last) = self.last_attempt {
                    if now.saturating_duration_since(last) < self.debounce {
                        return Err(SkipReason::Debounced);
                    }
                }
            }
        }
        Ok(())
    }

    /// Starts the debounce window at `now`. Called once a write has been
    /// tried, whether or not it succeeded.
    pub fn mark_written(&mut self, now: Instant) {
        self.last_attempt = Some(now);
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Forgets the previous run.
    pub fn reset(&mut self) {
        self.last_attempt = None;
        self.finalized = false;
    }
}

/// Makes a run label safe to embed in a file name.
///
/// Whitespace runs become one `_`; characters rejected by common file systems
/// (`<>:"/\|?*` and control characters) are dropped; leading and trailing dots
/// and underscores are trimmed. An empty result becomes `Scene`.
#[must_use]
pub fn safe_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_sep = false;
    for c in label.chars() {
        if c.is_whitespace() {
            pending_sep = true;
            continue;
        }
        if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.push(c);
    }
    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name stem (without the `_traj.json` suffix) for `log` saved at `at`.
#[must_use]
pub fn file_stem(log: &TrajectoryLog, at: &DateTime<Local>) -> String {
    format!(
        "{}_{}_{}_{}",
        safe_label(&log.scene_label),
        log.haptics_tag(),
        log.order_tag(),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// First free path for `stem` in `dir`: `{stem}_traj.json`, then
/// `{stem}_2_traj.json`, `{stem}_3_traj.json`, ...
#[must_use]
pub fn unique_path(dir: &Path, stem: &str) -> PathBuf {
    let first = dir.join(format!("{stem}{LOG_FILE_SUFFIX}"));
    if !first.exists() {
        return first;
    }
    (2u32..)
        .map(|n| dir.join(format!("{stem}_{n}{LOG_FILE_SUFFIX}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// Writes trajectory logs under one root directory.
#[derive(Debug, Clone)]
pub struct Persister {
    root_dir: PathBuf,
    gate: SaveGate,
}

impl Persister {
    #[must_use]
    pub fn new(root_dir: impl Into<PathBuf>, debounce: Duration) -> Self {
        Self {
            root_dir: root_dir.into(),
            gate: SaveGate::new(debounce),
        }
    }

    #[must_use]
    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(&config.root_dir, Duration::from_millis(config.debounce_ms))
    }

    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// See [`SaveGate::admit`].
    pub fn admit(&mut self, kind: SaveKind, now: Instant) -> std::result::Result<(), SkipReason> {
        self.gate.admit(kind, now)
    }

    /// See [`SaveGate::mark_written`].
    pub fn mark_written(&mut self, now: Instant) {
        self.gate.mark_written(now);
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.gate.is_finalized()
    }

    pub fn reset(&mut self) {
        self.gate.reset();
    }

    /// Writes `log` now, bypassing the gate.
    pub fn write(&self, log: &TrajectoryLog) -> Result<PathBuf> {
        self.write_at(log, &Local::now())
    }

    /// Writes `log` as if saved at wall-clock time `at`.
    pub fn write_at(&self, log: &TrajectoryLog, at: &DateTime<Local>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root_dir).map_err(|e| {
            IoError::FileSystem(e).with_context(format!("creating {:?}", self.root_dir))
        })?;
        let json = to_json_pretty(log)?;
        let path = unique_path(&self.root_dir, &file_stem(log, at));
        write_whole_file(&path, json.as_bytes())?;
        Ok(path)
    }
}

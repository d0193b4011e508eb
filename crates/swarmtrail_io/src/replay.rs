//! Reading persisted trajectory logs back.
//!
//! Two layouts are accepted:
//!
//! - the current one, with a `trajectories` array of `{id, name, frames}`;
//! - the legacy one, with a `swarmState` array of
//!   `{droneId, droneState: {position: [{x, y, z, g?}]}}` and an optional
//!   top-level `time` array shared by all drones.
//!
//! Parsing is lenient: missing or mistyped fields get defaults instead of
//! failing the whole file, so partially written or hand-edited logs still load.

use crate::error::{IoError, Result};
use crate::persistence::LOG_FILE_SUFFIX;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use swarmtrail_data::{
    AgentId, Frame, Position, Trajectory, TrajectoryLog, DEFAULT_PARTICIPANT_ID,
    EVERY_TICK_SAMPLE_HZ,
};

const UNKNOWN_SCENE: &str = "Unknown Scene";

/// Loads a trajectory log file in either layout.
pub fn load_log<P: AsRef<Path>>(path: P) -> Result<TrajectoryLog> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("reading {:?}", path)))?;
    parse_log(&text).map_err(|e| e.with_context(format!("parsing {:?}", path)))
}

/// Parses a trajectory log document in either layout.
pub fn parse_log(text: &str) -> Result<TrajectoryLog> {
    let root: Value = serde_json::from_str(text)?;
    let obj = root
        .as_object()
        .ok_or_else(|| IoError::validation("log root is not an object"))?;

    let trajectories = if let Some(list) = obj.get("trajectories").and_then(Value::as_array) {
        list.iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_object().map(|t| current_trajectory(i, t)))
            .collect()
    } else if let Some(list) = obj.get("swarmState").and_then(Value::as_array) {
        tracing::debug!(drones = list.len(), "Reading legacy swarmState layout");
        let times: Option<Vec<f64>> = obj
            .get("time")
            .and_then(Value::as_array)
            .map(|ts| ts.iter().map(|t| t.as_f64().unwrap_or(f64::NAN)).collect());
        list.iter()
            .enumerate()
            .filter_map(|(i, d)| d.as_object().map(|d| legacy_trajectory(i, d, times.as_deref())))
            .collect()
    } else {
        return Err(IoError::validation(
            "unrecognized layout (expected 'trajectories' or 'swarmState')",
        ));
    };

    Ok(TrajectoryLog {
        scene_label: str_field(obj, "scene")
            .or_else(|| str_field(obj, "level"))
            .unwrap_or(UNKNOWN_SCENE)
            .to_string(),
        participant_id: str_field(obj, "pid")
            .unwrap_or(DEFAULT_PARTICIPANT_ID)
            .to_string(),
        haptics: str_field(obj, "haptics") == Some("H"),
        ordered: str_field(obj, "order") == Some("O"),
        sample_hz: obj
            .get("sampleHz")
            .and_then(Value::as_f64)
            .unwrap_or(EVERY_TICK_SAMPLE_HZ),
        trajectories,
    })
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

/// Fallback id for entries without a usable numeric id: `-(index + 1)`.
fn positional_id(index: usize) -> AgentId {
    AgentId(-(index as i64) - 1)
}

fn current_trajectory(index: usize, obj: &Map<String, Value>) -> Trajectory {
    let id = obj
        .get("id")
        .and_then(Value::as_i64)
        .map(AgentId)
        .unwrap_or_else(|| positional_id(index));
    let name = str_field(obj, "name")
        .map(str::to_string)
        .unwrap_or_else(|| format!("id:{id}"));
    let mut trajectory = Trajectory::new(id, name);
    let frames = obj.get("frames").and_then(Value::as_array);
    for (i, frame) in frames.into_iter().flatten().enumerate() {
        if let Some(frame) = frame.as_object() {
            let t = frame.get("t").and_then(Value::as_f64).unwrap_or(i as f64);
            trajectory.push(frame_from(t, frame));
        }
    }
    trajectory
}

fn legacy_trajectory(index: usize, obj: &Map<String, Value>, times: Option<&[f64]>) -> Trajectory {
    let (id, name) = match obj.get("droneId") {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(v) => (AgentId(v), v.to_string()),
            None => (positional_id(index), n.to_string()),
        },
        Some(Value::String(s)) => match s.parse::<i64>() {
            Ok(v) => (AgentId(v), s.clone()),
            Err(_) => (positional_id(index), s.clone()),
        },
        _ => (positional_id(index), format!("d{index}")),
    };

    let positions: Vec<&Map<String, Value>> = obj
        .get("droneState")
        .and_then(|s| s.get("position"))
        .and_then(Value::as_array)
        .map(|ps| ps.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default();

    let shared_times = times.filter(|ts| ts.len() == positions.len());
    let mut trajectory = Trajectory::new(id, name);
    for (i, p) in positions.into_iter().enumerate() {
        let t = shared_times
            .map(|ts| ts[i])
            .filter(|t| t.is_finite())
            .unwrap_or(i as f64);
        trajectory.push(frame_from(t, p));
    }
    trajectory
}

fn frame_from(t: f64, obj: &Map<String, Value>) -> Frame {
    let coord = |key: &str| obj.get(key).and_then(Value::as_f64).unwrap_or(0.0) as f32;
    let grouped = match obj.get("g") {
        Some(Value::Bool(b)) => *b,
        Some(v) => v.as_f64() == Some(1.0),
        None => false,
    };
    Frame::new(t, Position::new(coord("x"), coord("y"), coord("z")), grouped)
}

/// Most recently modified `*_traj.json` file in `dir`.
pub fn latest_log<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("listing {:?}", dir)))?;

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(LOG_FILE_SUFFIX));
        if !is_log {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if best.as_ref().map_or(true, |(t, _)| modified > *t) {
            best = Some((modified, path));
        }
    }

    best.map(|(_, path)| path)
        .ok_or_else(|| IoError::not_found(format!("no *{LOG_FILE_SUFFIX} file in {:?}", dir)))
}

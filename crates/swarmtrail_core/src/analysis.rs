//! Offline analysis of recorded logs.
//!
//! The main consumer of a trajectory log looks at the swarm's main group as a
//! whole: its centroid over time, and how far that centroid strays from a
//! reference route. All geometry here is in the XZ plane.

use std::collections::BTreeMap;
use swarmtrail_data::TrajectoryLog;

/// Main-group centroid at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentroidSample {
    pub t: f64,
    pub x: f64,
    pub z: f64,
    /// Frames averaged into this sample.
    pub members: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorSummary {
    pub mean: f64,
    pub max: f64,
    pub samples: usize,
}

/// Centroid of the main group per timestamp, in time order.
///
/// Frames are binned by timestamp rounded to the millisecond. Only frames
/// flagged as main group are used when the log has any; otherwise all frames
/// count.
#[must_use]
pub fn main_group_centroid(log: &TrajectoryLog) -> Vec<CentroidSample> {
    let grouped_only = log
        .trajectories
        .iter()
        .flat_map(|t| t.frames.iter())
        .any(|f| f.in_main_group);

    let mut bins: BTreeMap<i64, (f64, f64, usize)> = BTreeMap::new();
    for frame in log.trajectories.iter().flat_map(|t| t.frames.iter()) {
        if grouped_only && !frame.in_main_group {
            continue;
        }
        if !frame.timestamp.is_finite() {
            continue;
        }
        let key = (frame.timestamp * 1000.0).round() as i64;
        let bin = bins.entry(key).or_insert((0.0, 0.0, 0));
        bin.0 += f64::from(frame.x);
        bin.1 += f64::from(frame.z);
        bin.2 += 1;
    }

    bins.into_iter()
        .map(|(key, (sx, sz, n))| CentroidSample {
            t: key as f64 / 1000.0,
            x: sx / n as f64,
            z: sz / n as f64,
            members: n,
        })
        .collect()
}

/// Polyline through the cumulative sums of relative `(dx, dz)` steps,
/// starting at the origin and scaled by `scale`.
#[must_use]
pub fn reference_path(steps: &[(f64, f64)], scale: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(steps.len() + 1);
    let (mut x, mut z) = (0.0, 0.0);
    points.push((0.0, 0.0));
    for &(dx, dz) in steps {
        x += dx;
        z += dz;
        points.push((x * scale, z * scale));
    }
    points
}

/// Shortest distance from `p` to any segment of `polyline`.
///
/// A single-point polyline degenerates to point distance; an empty one
/// yields infinity.
#[must_use]
pub fn distance_to_polyline(p: (f64, f64), polyline: &[(f64, f64)]) -> f64 {
    match polyline {
        [] => f64::INFINITY,
        [only] => ((p.0 - only.0).powi(2) + (p.1 - only.1).powi(2)).sqrt(),
        _ => polyline
            .windows(2)
            .map(|w| segment_distance_sq(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min)
            .sqrt(),
    }
}

fn segment_distance_sq(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let ab = (b.0 - a.0, b.1 - a.1);
    let ap = (p.0 - a.0, p.1 - a.1);
    let len_sq = ab.0 * ab.0 + ab.1 * ab.1;
    if len_sq == 0.0 {
        return ap.0 * ap.0 + ap.1 * ap.1;
    }
    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / len_sq).clamp(0.0, 1.0);
    let q = (a.0 + t * ab.0, a.1 + t * ab.1);
    (p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)
}

/// Per-sample distance of the centroid track to `polyline`, plus a summary.
#[must_use]
pub fn centroid_error(centroids: &[CentroidSample], polyline: &[(f64, f64)]) -> (Vec<f64>, Option<ErrorSummary>) {
    let errors: Vec<f64> = centroids
        .iter()
        .map(|c| distance_to_polyline((c.x, c.z), polyline))
        .collect();
    if errors.is_empty() {
        return (errors, None);
    }
    let sum: f64 = errors.iter().sum();
    let max = errors.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let summary = ErrorSummary {
        mean: sum / errors.len() as f64,
        max,
        samples: errors.len(),
    };
    (errors, Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmtrail_data::{AgentId, Frame, Position, Trajectory};

    fn log_with(frames: &[(i64, f64, f32, f32, bool)]) -> TrajectoryLog {
        let mut trajectories: Vec<Trajectory> = Vec::new();
        for &(id, t, x, z, g) in frames {
            let idx = match trajectories.iter().position(|tr| tr.id.0 == id) {
                Some(i) => i,
                None => {
                    trajectories.push(Trajectory::new(AgentId(id), format!("d{id}")));
                    trajectories.len() - 1
                }
            };
            trajectories[idx].push(Frame::new(t, Position::new(x, 0.0, z), g));
        }
        TrajectoryLog {
            scene_label: "S".to_string(),
            participant_id: "P".to_string(),
            haptics: false,
            ordered: false,
            sample_hz: 30.0,
            trajectories,
        }
    }

    #[test]
    fn test_centroid_uses_main_group_only() {
        let log = log_with(&[
            (1, 0.0, 0.0, 0.0, true),
            (2, 0.0, 2.0, 2.0, true),
            (3, 0.0, 100.0, 100.0, false),
        ]);
        let c = main_group_centroid(&log);
        assert_eq!(c.len(), 1);
        assert_eq!((c[0].x, c[0].z, c[0].members), (1.0, 1.0, 2));
    }

    #[test]
    fn test_centroid_falls_back_to_all_frames() {
        let log = log_with(&[(1, 0.5, 0.0, 0.0, false), (2, 0.5, 4.0, 0.0, false)]);
        let c = main_group_centroid(&log);
        assert_eq!(c[0].x, 2.0);
        assert_eq!(c[0].t, 0.5);
    }

    #[test]
    fn test_centroid_bins_in_time_order() {
        let log = log_with(&[(1, 1.0, 1.0, 0.0, true), (2, 0.0, 0.0, 0.0, true)]);
        let c = main_group_centroid(&log);
        let times: Vec<f64> = c.iter().map(|s| s.t).collect();
        assert_eq!(times, vec![0.0, 1.0]);
    }

    #[test]
    fn test_reference_path() {
        let path = reference_path(&[(0.0, 10.0), (-10.0, 0.0)], 0.5);
        assert_eq!(path, vec![(0.0, 0.0), (0.0, 5.0), (-5.0, 5.0)]);
    }

    #[test]
    fn test_distance_to_polyline() {
        let line = [(0.0, 0.0), (10.0, 0.0)];
        assert_eq!(distance_to_polyline((5.0, 3.0), &line), 3.0);
        assert_eq!(distance_to_polyline((13.0, 4.0), &line), 5.0);
        assert!(distance_to_polyline((0.0, 0.0), &[]).is_infinite());
    }

    #[test]
    fn test_centroid_error_summary() {
        let line = [(0.0, 0.0), (10.0, 0.0)];
        let centroids = [
            CentroidSample { t: 0.0, x: 1.0, z: 1.0, members: 1 },
            CentroidSample { t: 1.0, x: 2.0, z: 3.0, members: 1 },
        ];
        let (errors, summary) = centroid_error(&centroids, &line);
        assert_eq!(errors, vec![1.0, 3.0]);
        let summary = summary.unwrap();
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.max, 3.0);
    }
}

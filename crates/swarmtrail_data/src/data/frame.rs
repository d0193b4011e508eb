use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a tracked agent.
///
/// Non-negative values come from a stable external identity. Negative values
/// are run-local ids issued on first discovery and are not stable across
/// restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub i64);

impl AgentId {
    /// Returns true when the id was issued by the run-local fallback counter.
    #[must_use]
    pub fn is_run_local(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AgentId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A point in scene space. `y` is up; the horizontal plane is XZ.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Squared euclidean distance in 3D.
    #[inline]
    #[must_use]
    pub fn distance_sq(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Squared distance projected onto the XZ plane.
    #[inline]
    #[must_use]
    pub fn horizontal_distance_sq(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }
}

/// One sampled, classified position of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds since the start of the run.
    #[serde(rename = "t")]
    pub timestamp: f64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Serialized as `g: 0|1`.
    #[serde(rename = "g", with = "group_flag", default)]
    pub in_main_group: bool,
}

impl Frame {
    #[must_use]
    pub fn new(timestamp: f64, position: Position, in_main_group: bool) -> Self {
        Self {
            timestamp,
            x: position.x,
            y: position.y,
            z: position.z,
            in_main_group,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// The recorded path of one agent over a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub id: AgentId,
    pub name: String,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl Trajectory {
    #[must_use]
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            frames: Vec::new(),
        }
    }

    /// Appends a frame, keeping timestamps non-decreasing.
    ///
    /// A frame older than the last one is clamped to the last timestamp.
    /// Returns `true` if clamping happened.
    pub fn push(&mut self, mut frame: Frame) -> bool {
        let clamped = match self.frames.last() {
            Some(last) if frame.timestamp < last.timestamp => {
                frame.timestamp = last.timestamp;
                true
            }
            _ => false,
        };
        self.frames.push(frame);
        clamped
    }

    #[must_use]
    pub fn last_timestamp(&self) -> Option<f64> {
        self.frames.last().map(|f| f.timestamp)
    }
}

mod group_flag {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        struct FlagVisitor;

        impl Visitor<'_> for FlagVisitor {
            type Value = bool;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("0, 1 or a boolean")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
                Ok(v)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
                Ok(v != 0)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
                Ok(v != 0)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
                Ok(v != 0.0)
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}

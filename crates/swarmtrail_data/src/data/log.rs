use super::frame::Trajectory;
use serde::{Deserialize, Serialize};

/// Participant id used when the run metadata does not provide one.
pub const DEFAULT_PARTICIPANT_ID: &str = "PID_Default";

/// `sampleHz` value meaning "sampled every tick, no fixed rate".
pub const EVERY_TICK_SAMPLE_HZ: f64 = -1.0;

/// Descriptive metadata of one recording run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub participant_id: String,
    pub haptics: bool,
    pub ordered: bool,
    /// Human-readable run or scene label, if the host provides one.
    pub label: Option<String>,
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self {
            participant_id: DEFAULT_PARTICIPANT_ID.to_string(),
            haptics: false,
            ordered: false,
            label: None,
        }
    }
}

impl RunMetadata {
    /// `H` or `NH`.
    #[must_use]
    pub fn haptics_tag(&self) -> &'static str {
        flags::haptics_tag(self.haptics)
    }

    /// `O` or `NO`.
    #[must_use]
    pub fn order_tag(&self) -> &'static str {
        flags::order_tag(self.ordered)
    }
}

/// The persisted document: run metadata plus every trajectory of the run.
///
/// Built fresh at save time; never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryLog {
    #[serde(rename = "scene")]
    pub scene_label: String,
    #[serde(rename = "pid")]
    pub participant_id: String,
    #[serde(with = "flags::haptics")]
    pub haptics: bool,
    #[serde(rename = "order", with = "flags::order")]
    pub ordered: bool,
    /// Configured sample rate, or [`EVERY_TICK_SAMPLE_HZ`].
    #[serde(rename = "sampleHz")]
    pub sample_hz: f64,
    pub trajectories: Vec<Trajectory>,
}

impl TrajectoryLog {
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.trajectories.iter().map(|t| t.frames.len()).sum()
    }

    #[must_use]
    pub fn haptics_tag(&self) -> &'static str {
        flags::haptics_tag(self.haptics)
    }

    #[must_use]
    pub fn order_tag(&self) -> &'static str {
        flags::order_tag(self.ordered)
    }
}

mod flags {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn haptics_tag(on: bool) -> &'static str {
        if on {
            "H"
        } else {
            "NH"
        }
    }

    pub fn order_tag(on: bool) -> &'static str {
        if on {
            "O"
        } else {
            "NO"
        }
    }

    fn parse_tag<'de, D: Deserializer<'de>>(
        deserializer: D,
        on: &str,
        off: &str,
    ) -> Result<bool, D::Error> {
        let tag = String::deserialize(deserializer)?;
        if tag == on {
            Ok(true)
        } else if tag == off {
            Ok(false)
        } else {
            Err(serde::de::Error::custom(format!(
                "expected \"{on}\" or \"{off}\", got \"{tag}\""
            )))
        }
    }

    pub mod haptics {
        use super::*;

        pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(haptics_tag(*value))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
            parse_tag(deserializer, "H", "NH")
        }
    }

    pub mod order {
        use super::*;

        pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(order_tag(*value))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
            parse_tag(deserializer, "O", "NO")
        }
    }
}

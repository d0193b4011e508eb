//! Lenient decoding of host-supplied run metadata.

use serde_json::Value;
use swarmtrail_data::RunMetadata;

/// Overlays the well-formed fields of `raw` onto `base`.
///
/// Recognized keys: `pid` (string, or a number which is stringified),
/// `haptics` (bool or `"H"`/`"NH"`), `order` (bool or `"O"`/`"NO"`) and
/// `label` (non-blank string). Anything else, including a non-object `raw`,
/// leaves the corresponding `base` value in place.
#[must_use]
pub fn resolve(raw: Option<&Value>, base: RunMetadata) -> RunMetadata {
    let Some(raw) = raw else {
        return base;
    };
    let Some(obj) = raw.as_object() else {
        tracing::warn!("Run metadata is not an object; using defaults");
        return base;
    };

    let mut meta = base;

    match obj.get("pid") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if !s.trim().is_empty() => meta.participant_id = s.trim().to_string(),
        Some(Value::Number(n)) => meta.participant_id = n.to_string(),
        Some(other) => tracing::warn!(value = %other, "Ignoring malformed participant id"),
    }

    match obj.get("haptics").map(|v| parse_flag(v, "H", "NH")) {
        None | Some(Ok(None)) => {}
        Some(Ok(Some(on))) => meta.haptics = on,
        Some(Err(other)) => tracing::warn!(value = %other, "Ignoring malformed haptics flag"),
    }

    match obj.get("order").map(|v| parse_flag(v, "O", "NO")) {
        None | Some(Ok(None)) => {}
        Some(Ok(Some(on))) => meta.ordered = on,
        Some(Err(other)) => tracing::warn!(value = %other, "Ignoring malformed order flag"),
    }

    match obj.get("label") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if !s.trim().is_empty() => meta.label = Some(s.trim().to_string()),
        Some(other) => tracing::warn!(value = %other, "Ignoring malformed run label"),
    }

    meta
}

fn parse_flag<'a>(value: &'a Value, on: &str, off: &str) -> Result<Option<bool>, &'a Value> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::String(s) if s.eq_ignore_ascii_case(on) => Ok(Some(true)),
        Value::String(s) if s.eq_ignore_ascii_case(off) => Ok(Some(false)),
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use swarmtrail_data::DEFAULT_PARTICIPANT_ID;

    #[test]
    fn test_absent_metadata_uses_defaults() {
        let meta = resolve(None, RunMetadata::default());
        assert_eq!(meta, RunMetadata::default());
    }

    #[test]
    fn test_well_formed_metadata() {
        let raw = json!({"pid": "P07", "haptics": "H", "order": true, "label": "Scene 3"});
        let meta = resolve(Some(&raw), RunMetadata::default());
        assert_eq!(meta.participant_id, "P07");
        assert!(meta.haptics);
        assert!(meta.ordered);
        assert_eq!(meta.label.as_deref(), Some("Scene 3"));
    }

    #[test]
    fn test_numeric_pid_is_stringified() {
        let raw = json!({"pid": 12});
        assert_eq!(resolve(Some(&raw), RunMetadata::default()).participant_id, "12");
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let raw = json!({"pid": ["x"], "haptics": 3, "order": "sideways", "label": {"a": 1}});
        let meta = resolve(Some(&raw), RunMetadata::default());
        assert_eq!(meta.participant_id, DEFAULT_PARTICIPANT_ID);
        assert!(!meta.haptics);
        assert!(!meta.ordered);
        assert_eq!(meta.label, None);
    }

    #[test]
    fn test_non_object_is_ignored() {
        let base = RunMetadata {
            participant_id: "cfg".to_string(),
            ..RunMetadata::default()
        };
        let meta = resolve(Some(&json!("H")), base.clone());
        assert_eq!(meta, base);
    }
}

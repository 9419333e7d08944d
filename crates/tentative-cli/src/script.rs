//! Event scripts and the built-in patch reducer.

use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tentative_ledger::Record;

/// Field of an event holding the keys to merge into state.
pub const PATCH_FIELD: &str = "patch";

/// Read a JSON-lines script from disk.
pub fn load(path: &Path) -> anyhow::Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing script {}", path.display()))
}

/// Parse one JSON event per non-blank line. Lines starting with `#` are comments.
pub fn parse(text: &str) -> anyhow::Result<Vec<Value>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}", index + 1))
        })
        .collect()
}

/// Merge the event's patch into state; `null` values delete keys.
pub fn patch(state: Option<&Record>, event: &Value) -> Value {
    let mut next = state.cloned().unwrap_or_default();
    if let Some(Value::Object(patch)) = event.get(PATCH_FIELD) {
        for (key, value) in patch {
            if value.is_null() {
                next.remove(key);
            } else {
                next.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(next)
}

/// Short label for an event: its `type` field if present.
pub fn label(event: &Value) -> &str {
    event.get("type").and_then(Value::as_str).unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        let events = parse("# header\n{\"type\": \"A\"}\n\n  {\"type\": \"B\"}\n").unwrap();
        assert_eq!(events, vec![json!({"type": "A"}), json!({"type": "B"})]);
    }

    #[test]
    fn parse_reports_line_number() {
        let err = parse("{\"type\": \"A\"}\n{oops}\n").unwrap_err();
        assert_eq!(err.to_string(), "line 2");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"type\": \"SET\", \"patch\": {{\"a\": 1}}}}").unwrap();
        let events = load(file.path()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(label(&events[0]), "SET");
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.jsonl")).is_err());
    }

    #[test]
    fn patch_merges_and_deletes() {
        let first = patch(None, &json!({"patch": {"a": 1, "b": 2}}));
        assert_eq!(first, json!({"a": 1, "b": 2}));

        let state = first.as_object().unwrap();
        let second = patch(Some(state), &json!({"patch": {"a": null, "c": 3}}));
        assert_eq!(second, json!({"b": 2, "c": 3}));

        let unchanged = patch(Some(state), &json!({"type": "PING"}));
        assert_eq!(&unchanged, &first);
    }

    #[test]
    fn label_falls_back_for_untyped_events() {
        assert_eq!(label(&json!({"patch": {}})), "-");
    }
}

//! Golden-file snapshots.
//!
//! Values are stored as pretty JSON with object keys sorted, so field order in
//! the serialized type never shows up as a diff. Tests compare against the file
//! on disk; rerun with `ANCHORPLACE_UPDATE_SNAPSHOTS=1` to rewrite it.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "ANCHORPLACE_UPDATE_SNAPSHOTS";

/// Assert that `value` matches the JSON snapshot stored at `path`.
///
/// With the update variable set the file is (re)written instead.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if should_update_snapshots() {
        write_snapshot(path, &actual)?;
        return Ok(());
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {}=1 to create it)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;

    // Compare structurally so line endings in checked-out goldens do not matter.
    let expected_value: Value = serde_json::from_str(&expected)
        .with_context(|| format!("Snapshot {} is not valid JSON", path.display()))?;
    let actual_value: Value = serde_json::from_str(&actual)?;
    if expected_value != actual_value {
        anyhow::bail!(
            "Snapshot mismatch at {} (run with {}=1 to update)\n--- actual ---\n{}",
            path.display(),
            UPDATE_SNAPSHOTS_ENV,
            actual
        );
    }

    Ok(())
}

/// Serialize `value` as sorted-key pretty JSON with a trailing newline.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let mut s = serde_json::to_string_pretty(&canonicalize_value(value))
        .context("Failed to format snapshot JSON")?;
    s.push('\n');
    Ok(s)
}

fn should_update_snapshots() -> bool {
    matches!(
        std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn write_snapshot(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize_value(v)))
                    .collect(),
            )
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_nested_keys() {
        let text = canonical_json(&json!({ "b": 1, "a": { "z": true, "y": null } }))
            .expect("serializes");
        let a = text.find("\"a\"").expect("a present");
        let b = text.find("\"b\"").expect("b present");
        let y = text.find("\"y\"").expect("y present");
        let z = text.find("\"z\"").expect("z present");
        assert!(a < b);
        assert!(y < z);
        assert!(text.ends_with('\n'));
    }
}

//! Ordered synonym-key lists
//!
//! Firmware versions disagree on property names. Each field is looked up under
//! the keys below, first non-empty match wins.

use serde_json::Value;
use wam_api::PropertyMap;

pub const NAME_KEYS: &[&str] = &["name", "friendlyName", "modelName"];
pub const MODEL_KEYS: &[&str] = &["model", "modelName", "model_name"];

pub const MAC_KEYS: &[&str] = &["mac", "macAddress"];
pub const VERSION_KEYS: &[&str] = &["version", "software_version"];
pub const POWER_KEYS: &[&str] = &["power"];
pub const VOLUME_KEYS: &[&str] = &["volume"];
pub const INPUT_KEYS: &[&str] = &["input", "source"];

pub const GROUP_ID_KEYS: &[&str] = &["group_id", "groupId", "groupid"];
pub const GROUP_NAME_KEYS: &[&str] = &["group_name", "groupName", "groupname"];
pub const GROUPED_FLAG_KEYS: &[&str] = &["is_grouped", "grouped", "isGrouped"];

/// Value used in views for anything the device did not report
pub const UNKNOWN: &str = "Unknown";

/// First non-empty scalar stored under one of `keys`
pub fn resolve(snapshot: &PropertyMap, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| snapshot.get(*key).and_then(scalar_text))
}

/// [`resolve`], falling back to `default`
pub fn resolve_or(snapshot: &PropertyMap, keys: &[&str], default: &str) -> String {
    resolve(snapshot, keys).unwrap_or_else(|| default.to_string())
}

/// Whether the first grouped-flag key present holds a truthy value
pub fn is_flagged(snapshot: &PropertyMap, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|key| snapshot.get(*key))
        .map_or(false, truthy)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        _ => false,
    }
}

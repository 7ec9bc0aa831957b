//! Key/value metadata
//!
//! The `/metadata` endpoint serves template variables as environment-file
//! style text that a machine can source:
//!
//! ```text
//! ETCD_NAME=node1
//! MAC=52:54:00:a1:9c:ae
//! NETWORK_GATEWAY=10.0.0.1
//! ```
//!
//! Nested objects are flattened with `_`, keys are upper-cased, and lines
//! are sorted by key. Key characters outside `[A-Z0-9_]` become `_`. Control
//! characters and backslashes in values are escaped so every entry stays on
//! one line.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Render variables as `KEY=value` lines
pub fn render_metadata(variables: &Map<String, Value>) -> String {
    let mut flat = BTreeMap::new();
    for (key, value) in variables {
        flatten(&env_key(key), value, &mut flat);
    }

    flat.into_iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(&format!("{}_{}", prefix, env_key(key)), nested, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), escape_value(s));
        }
        Value::Null => {
            out.insert(prefix.to_string(), String::new());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

fn env_key(key: &str) -> String {
    key.chars()
        .map(|c| match c.to_ascii_uppercase() {
            c @ ('A'..='Z' | '0'..='9' | '_') => c,
            _ => '_',
        })
        .collect()
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c.is_control() {
            escaped.extend(c.escape_default());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_flat() {
        let out = render_metadata(&vars(json!({
            "etcd_name": "node1",
            "mac": "52:54:00:a1:9c:ae",
        })));
        assert_eq!(out, "ETCD_NAME=node1\nMAC=52:54:00:a1:9c:ae\n");
    }

    #[test]
    fn test_render_nested_and_scalars() {
        let out = render_metadata(&vars(json!({
            "network": {"gateway": "10.0.0.1", "prefix": 24},
            "enabled": true,
            "dns": ["10.0.0.2", "10.0.0.3"],
            "unset": null,
        })));

        assert_eq!(
            out,
            "DNS=[\"10.0.0.2\",\"10.0.0.3\"]\nENABLED=true\nNETWORK_GATEWAY=10.0.0.1\nNETWORK_PREFIX=24\nUNSET=\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_metadata(&Map::new()), "");
    }

    #[test]
    fn test_render_is_deterministic() {
        let v = vars(json!({"b": "2", "a": "1", "c": {"z": 1, "y": 2}}));
        assert_eq!(render_metadata(&v), render_metadata(&v.clone()));
    }

    #[test]
    fn test_values_stay_on_one_line() {
        let out = render_metadata(&vars(json!({
            "hostname": "node1",
            "os": "x\nHOSTNAME=evil",
            "motd": "a\tb\r\\c\u{7}",
        })));

        assert_eq!(
            out,
            "HOSTNAME=node1\nMOTD=a\\tb\\r\\\\c\\u{7}\nOS=x\\nHOSTNAME=evil\n"
        );
        assert_eq!(out.lines().filter(|l| l.starts_with("HOSTNAME=")).count(), 1);
    }

    #[test]
    fn test_keys_are_sanitized() {
        let out = render_metadata(&vars(json!({
            "etcd-name": "node1",
            "bad\nKEY": "1",
            "net": {"ip.addr": "10.0.0.5"},
        })));
        assert_eq!(out, "BAD_KEY=1\nETCD_NAME=node1\nNET_IP_ADDR=10.0.0.5\n");
    }
}

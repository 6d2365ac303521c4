//! Canonical payload serialization
//!
//! Two payloads with identical semantic content must produce byte-identical
//! output regardless of key insertion order. Object keys are sorted
//! recursively; array elements keep their order. Output is compact JSON
//! (no whitespace), the basis for signature determinism and tamper
//! detection.

use serde_json::Value;

/// Serialize a payload to canonical bytes.
pub fn canonical_bytes(payload: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_canonical(payload, &mut out);
    out
}

/// Canonical serialization as a string, for logging and tests.
pub fn canonical_string(payload: &Value) -> String {
    // canonical output is valid UTF-8 by construction
    String::from_utf8(canonical_bytes(payload)).expect("canonical bytes are UTF-8")
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_escaped(s, out),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_escaped(key, out);
                out.push(b':');
                write_canonical(&map[key], out);
            }
            out.push(b'}');
        }
    }
}

fn write_escaped(s: &str, out: &mut Vec<u8>) {
    let escaped = serde_json::to_vec(s).expect("string serialization is infallible");
    out.extend_from_slice(&escaped);
}

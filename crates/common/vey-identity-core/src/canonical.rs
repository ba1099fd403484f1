//! Deterministic credential canonicalization.
//!
//! The same canonical form is used on sign and verify: object keys sorted
//! lexicographically, minimal JSON encoding, arrays in source order, the
//! whole thing prefixed with a domain tag.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use vey_crypto::domain;

#[derive(Error, Debug)]
pub enum CanonicalError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Render a JSON value in canonical form: sorted keys, no whitespace,
/// canonical string escaping.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            // serde_json's string rendering is already canonical.
            out.push_str(&Value::String(s.clone()).to_string());
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
    }
}

/// The canonical byte form of a serializable value under the credential
/// domain tag. This is the signing input for VCs.
pub fn canonical_form<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    canonical_form_with(domain::VC_CANONICAL, value)
}

/// As [`canonical_form`], under an explicit domain tag (revocation lists,
/// provider artifacts).
pub fn canonical_form_with<T: Serialize>(
    domain_tag: &str,
    value: &T,
) -> Result<Vec<u8>, CanonicalError> {
    let json = canonical_json(&serde_json::to_value(value)?);
    let mut out = Vec::with_capacity(domain_tag.len() + 1 + json.len());
    out.extend_from_slice(domain_tag.as_bytes());
    out.push(0u8);
    out.extend_from_slice(json.as_bytes());
    Ok(out)
}

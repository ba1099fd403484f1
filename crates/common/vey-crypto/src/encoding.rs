//! Base64url (unpadded) helpers and serde adapters. All byte strings that
//! cross the wire are base64url without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

use crate::hash::Digest32;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Invalid base64url encoding: {0}")]
    InvalidBase64(String),
    #[error("Invalid byte length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn decode(s: &str) -> Result<Vec<u8>, EncodingError> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| EncodingError::InvalidBase64(e.to_string()))
}

pub fn decode_digest(s: &str) -> Result<Digest32, EncodingError> {
    let bytes = decode(s)?;
    let array: Digest32 = bytes
        .as_slice()
        .try_into()
        .map_err(|_| EncodingError::InvalidLength { expected: 32, got: bytes.len() })?;
    Ok(array)
}

/// Serde adapter for `Digest32` fields serialized as base64url strings.
pub mod b64_digest {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Digest32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Digest32, D::Error> {
        let s = String::deserialize(deserializer)?;
        decode_digest(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Vec<u8>` fields serialized as base64url strings.
pub mod b64_bytes {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Vec<Option<Digest32>>` (Merkle sibling lists, where
/// `None` marks a promoted lone node).
pub mod b64_opt_digest_list {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(
        value: &[Option<Digest32>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for item in value {
            seq.serialize_element(&item.map(|d| encode(&d)))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Option<Digest32>>, D::Error> {
        let raw: Vec<Option<String>> = Vec::deserialize(deserializer)?;
        raw.into_iter()
            .map(|item| match item {
                Some(s) => decode_digest(&s).map(Some).map_err(serde::de::Error::custom),
                None => Ok(None),
            })
            .collect()
    }
}

/// Serde adapter for `Vec<Digest32>` lists.
pub mod b64_digest_list {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(value: &[Digest32], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for item in value {
            seq.serialize_element(&encode(item))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Digest32>, D::Error> {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        raw.iter()
            .map(|s| decode_digest(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

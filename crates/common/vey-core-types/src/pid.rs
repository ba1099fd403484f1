use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum overall PID length, including hyphens.
pub const MAX_PID_LENGTH: usize = 80;
/// Maximum number of hyphen-separated segments (the country token included).
pub const MAX_SEGMENTS: usize = 8;
/// Maximum length of a single non-country segment.
pub const MAX_SEGMENT_LENGTH: usize = 8;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PidError {
    #[error("Invalid PID format: {0}")]
    InvalidFormat(String),
    #[error("PID too long: {got} characters, maximum {max}")]
    TooLong { got: usize, max: usize },
    #[error("PID has too many segments: {got}, maximum {max}")]
    TooManySegments { got: usize, max: usize },
}

/// A Place Identifier: a canonical hierarchical string with a two-letter
/// country prefix and up to seven further hyphen-separated segments, e.g.
/// `JP-13-113-01`. Matches `^[A-Z]{2}(-[A-Z0-9]{1,8}){0,7}$`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Pid(String);

/// The decoded form of a PID: the country code plus every segment in order.
/// `segments[0]` is the country token, so `segments.len()` is the PID depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidComponents {
    pub country: String,
    pub segments: Vec<String>,
}

impl Pid {
    /// Parse and validate a PID string. ASCII lowercase input is
    /// case-normalized before validation.
    pub fn parse(s: &str) -> Result<Self, PidError> {
        let normalized = s.trim().to_ascii_uppercase();
        if normalized.len() > MAX_PID_LENGTH {
            return Err(PidError::TooLong { got: normalized.len(), max: MAX_PID_LENGTH });
        }

        let tokens: Vec<&str> = normalized.split('-').collect();
        if tokens.len() > MAX_SEGMENTS {
            return Err(PidError::TooManySegments { got: tokens.len(), max: MAX_SEGMENTS });
        }

        let country = tokens[0];
        if country.len() != 2 || !country.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(PidError::InvalidFormat(s.to_string()));
        }

        for token in &tokens[1..] {
            if token.is_empty()
                || token.len() > MAX_SEGMENT_LENGTH
                || !token.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
            {
                return Err(PidError::InvalidFormat(s.to_string()));
            }
        }

        Ok(Pid(normalized))
    }

    /// The two-letter country code prefix.
    pub fn country(&self) -> &str {
        &self.0[..2]
    }

    /// All hyphen-separated segments in order, country token first.
    pub fn segments(&self) -> Vec<&str> {
        self.0.split('-').collect()
    }

    /// The number of segments, country token included.
    pub fn depth(&self) -> usize {
        self.0.split('-').count()
    }

    pub fn components(&self) -> PidComponents {
        PidComponents {
            country: self.country().to_string(),
            segments: self.0.split('-').map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Pid {
    type Err = PidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pid::parse(s)
    }
}

impl TryFrom<String> for Pid {
    type Error = PidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pid::parse(&value)
    }
}

impl From<Pid> for String {
    fn from(pid: Pid) -> Self {
        pid.0
    }
}

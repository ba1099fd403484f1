//! The Address Mapping Framework: normalization of heterogeneous raw
//! input into the canonical field set, and the PID codec over it.

use thiserror::Error;

use vey_core_types::{Pid, PidComponents, PidError};

use crate::address::{AddressField, NormalizedAddress, RawAddress};
use crate::grammar::{CountryData, CountryGrammar, GrammarSlot};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmfError {
    #[error("Unknown country: {0}")]
    UnknownCountry(String),
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("Missing value for required slot {slot}")]
    MissingField { slot: String },
    #[error("Requested depth {depth} exceeds grammar depth {max}")]
    DepthExceedsGrammar { depth: usize, max: usize },
    #[error(transparent)]
    Pid(#[from] PidError),
}

/// Key aliases accepted by the normalizer, lowercased with separators
/// stripped. Canonical field names are always included so
/// `normalize(denormalize(x)) == x`.
fn field_for_key(key: &str) -> Option<AddressField> {
    let folded: String = key
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_ascii_lowercase();
    let field = match folded.as_str() {
        "country" | "countrycode" => AddressField::Country,
        "admin1" | "province" | "prefecture" | "state" | "region" => AddressField::Admin1,
        "admin2" | "county" | "district" | "ward" => AddressField::Admin2,
        "locality" | "city" | "town" => AddressField::Locality,
        "postalcode" | "postcode" | "zip" | "zipcode" => AddressField::PostalCode,
        "street" | "address1" | "addressline1" | "streetaddress" => AddressField::Street,
        "building" | "address2" | "addressline2" => AddressField::Building,
        "unit" | "room" | "apartment" | "suite" => AddressField::Unit,
        "recipient" | "addressee" | "attention" => AddressField::Recipient,
        _ => return None,
    };
    Some(field)
}

/// Normalize raw input against the country grammar. Fields the grammar
/// does not reference are dropped; unknown keys and empty values are
/// rejected.
pub fn normalize(
    raw: &RawAddress,
    country_hint: Option<&str>,
    country_data: &dyn CountryData,
) -> Result<NormalizedAddress, AmfError> {
    let mut mapped: Vec<(AddressField, String)> = Vec::with_capacity(raw.fields.len());
    for (key, value) in &raw.fields {
        let field = field_for_key(key).ok_or_else(|| AmfError::InvalidField {
            field: key.clone(),
            reason: "unrecognized field name".to_string(),
        })?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AmfError::InvalidField {
                field: key.clone(),
                reason: "empty value".to_string(),
            });
        }
        mapped.push((field, trimmed.to_string()));
    }

    let country = mapped
        .iter()
        .find(|(f, _)| *f == AddressField::Country)
        .map(|(_, v)| v.clone())
        .or_else(|| country_hint.map(str::to_string))
        .ok_or_else(|| AmfError::UnknownCountry("<none>".to_string()))?;
    let country = country.to_ascii_uppercase();

    let grammar = country_data
        .grammar(&country)
        .ok_or_else(|| AmfError::UnknownCountry(country.clone()))?;

    let mut normalized = NormalizedAddress::new();
    normalized.set(AddressField::Country, country);
    for (field, value) in mapped {
        if field == AddressField::Country {
            continue;
        }
        // Fields outside the country grammar are absent from the
        // normalized form; recipient survives for display.
        let in_grammar = grammar.slots.iter().any(|s| s.field == field)
            || matches!(field, AddressField::Recipient | AddressField::PostalCode);
        if in_grammar {
            normalized.set(field, value);
        }
    }
    Ok(normalized)
}

/// Invert normalization into canonical-keyed raw form, suitable for
/// display or re-normalization. Not a trust boundary.
pub fn denormalize(normalized: &NormalizedAddress) -> RawAddress {
    let mut raw = RawAddress::new();
    for (field, value) in normalized.iter() {
        raw.fields.insert(field.name().to_string(), value.to_string());
    }
    raw
}

/// Render display lines, most specific first.
pub fn display_lines(normalized: &NormalizedAddress) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(recipient) = normalized.get(AddressField::Recipient) {
        lines.push(recipient.to_string());
    }
    let street_parts: Vec<&str> = [AddressField::Unit, AddressField::Building, AddressField::Street]
        .iter()
        .filter_map(|f| normalized.get(*f))
        .collect();
    if !street_parts.is_empty() {
        lines.push(street_parts.join(" "));
    }
    let area_parts: Vec<&str> = [AddressField::Locality, AddressField::Admin2, AddressField::Admin1]
        .iter()
        .filter_map(|f| normalized.get(*f))
        .collect();
    if !area_parts.is_empty() {
        lines.push(area_parts.join(", "));
    }
    let tail_parts: Vec<&str> = [AddressField::PostalCode, AddressField::Country]
        .iter()
        .filter_map(|f| normalized.get(*f))
        .collect();
    if !tail_parts.is_empty() {
        lines.push(tail_parts.join(" "));
    }
    lines
}

/// Derive the segment token for one slot from its field value.
///
/// Candidates are the alphanumeric runs of the uppercased value,
/// truncated to the slot's length bound. Tie-break: the more specific
/// (longer) candidate wins; on a length tie the one with a numeric
/// component wins; otherwise the lexicographically smallest.
fn derive_segment(value: &str, slot: &GrammarSlot) -> Result<String, AmfError> {
    let upper = value.to_ascii_uppercase();
    let mut candidates: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in upper.chars() {
        if c.is_ascii_uppercase() || c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            candidates.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        candidates.push(current);
    }

    candidates = candidates
        .into_iter()
        .map(|c| c.chars().take(slot.max_len).collect::<String>())
        .filter(|c| !c.is_empty())
        .filter(|c| !slot.numeric || c.bytes().all(|b| b.is_ascii_digit()))
        .collect();

    candidates
        .into_iter()
        .max_by(|a, b| {
            a.len()
                .cmp(&b.len())
                .then_with(|| {
                    let a_numeric = a.bytes().any(|b| b.is_ascii_digit());
                    let b_numeric = b.bytes().any(|c| c.is_ascii_digit());
                    a_numeric.cmp(&b_numeric)
                })
                // max_by keeps the later of equal elements, so reverse the
                // lexicographic order to prefer the smallest.
                .then_with(|| b.cmp(a))
        })
        .ok_or_else(|| AmfError::InvalidField {
            field: slot.name.clone(),
            reason: format!("no usable token in {:?}", value),
        })
}

/// Encode a normalized address into a PID of exactly `depth` segments.
/// Every slot up to `depth` must have a derivable value.
pub fn encode_pid(
    normalized: &NormalizedAddress,
    depth: usize,
    grammar: &CountryGrammar,
) -> Result<Pid, AmfError> {
    if depth == 0 || depth > grammar.depth() {
        return Err(AmfError::DepthExceedsGrammar { depth, max: grammar.depth() });
    }

    let mut segments = Vec::with_capacity(depth);
    for slot in &grammar.slots[..depth] {
        if slot.field == AddressField::Country {
            segments.push(grammar.country.clone());
            continue;
        }
        let value = normalized
            .get(slot.field)
            .ok_or_else(|| AmfError::MissingField { slot: slot.name.clone() })?;
        segments.push(derive_segment(value, slot)?);
    }

    Ok(Pid::parse(&segments.join("-"))?)
}

/// Decode a PID string into its components, validating the token rules.
pub fn decode_pid(pid: &str) -> Result<PidComponents, AmfError> {
    Ok(Pid::parse(pid)?.components())
}

/// The structured segment tokens for an address, used as ZKP witness
/// material: the longest derivable slot prefix.
pub fn pid_components(
    normalized: &NormalizedAddress,
    grammar: &CountryGrammar,
) -> Vec<String> {
    let mut segments = Vec::new();
    for slot in &grammar.slots {
        if slot.field == AddressField::Country {
            segments.push(grammar.country.clone());
            continue;
        }
        let token = normalized
            .get(slot.field)
            .and_then(|value| derive_segment(value, slot).ok());
        match token {
            Some(token) => segments.push(token),
            None => break,
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::StaticCountryData;

    fn jp_grammar() -> CountryGrammar {
        StaticCountryData::seeded().grammar("JP").unwrap()
    }

    fn jp_address() -> NormalizedAddress {
        NormalizedAddress::new()
            .with(AddressField::Country, "JP")
            .with(AddressField::Admin1, "13")
            .with(AddressField::Admin2, "113")
            .with(AddressField::Locality, "Shibuya")
    }

    #[test]
    fn normalizes_aliased_keys() {
        let raw = RawAddress::new()
            .with("country", "JP")
            .with("province", "13")
            .with("city", "Shibuya");
        let normalized = normalize(&raw, None, &StaticCountryData::seeded()).unwrap();
        assert_eq!(normalized.country(), Some("JP"));
        assert_eq!(normalized.get(AddressField::Admin1), Some("13"));
        assert_eq!(normalized.get(AddressField::Locality), Some("Shibuya"));
    }

    #[test]
    fn unknown_country_and_bad_fields_reject() {
        let data = StaticCountryData::seeded();
        let raw = RawAddress::new().with("country", "ZZ");
        assert!(matches!(
            normalize(&raw, None, &data),
            Err(AmfError::UnknownCountry(_))
        ));

        let raw = RawAddress::new().with("country", "JP").with("flavor", "umami");
        assert!(matches!(
            normalize(&raw, None, &data),
            Err(AmfError::InvalidField { .. })
        ));

        let raw = RawAddress::new().with("country", "JP").with("city", "   ");
        assert!(matches!(
            normalize(&raw, None, &data),
            Err(AmfError::InvalidField { .. })
        ));
    }

    #[test]
    fn country_hint_fills_missing_country() {
        let raw = RawAddress::new().with("city", "Portland").with("state", "OR");
        let normalized = normalize(&raw, Some("us"), &StaticCountryData::seeded()).unwrap();
        assert_eq!(normalized.country(), Some("US"));
    }

    #[test]
    fn denormalize_round_trips() {
        let raw = RawAddress::new()
            .with("country", "JP")
            .with("province", "13")
            .with("city", "Shibuya");
        let data = StaticCountryData::seeded();
        let normalized = normalize(&raw, None, &data).unwrap();
        let back = normalize(&denormalize(&normalized), None, &data).unwrap();
        assert_eq!(normalized, back);
    }

    #[test]
    fn encodes_expected_pid() {
        let pid = encode_pid(&jp_address(), 3, &jp_grammar()).unwrap();
        assert_eq!(pid.as_str(), "JP-13-113");
    }

    #[test]
    fn encode_decode_depth_round_trip() {
        let grammar = jp_grammar();
        let addr = jp_address();
        for depth in 1..=4 {
            let pid = encode_pid(&addr, depth, &grammar).unwrap();
            let components = decode_pid(pid.as_str()).unwrap();
            assert_eq!(components.segments.len(), depth);
            assert_eq!(components.country, "JP");
        }
    }

    #[test]
    fn encode_rejects_excess_depth_and_missing_slots() {
        let grammar = jp_grammar();
        assert!(matches!(
            encode_pid(&jp_address(), 8, &grammar),
            Err(AmfError::DepthExceedsGrammar { .. })
        ));
        // Slot 5 (chome) has no value.
        assert!(matches!(
            encode_pid(&jp_address(), 5, &grammar),
            Err(AmfError::MissingField { .. })
        ));
    }

    #[test]
    fn segment_tie_break_prefers_specific_then_numeric() {
        let slot = GrammarSlot::new("city", AddressField::Admin2, true);
        // Longer run wins.
        assert_eq!(derive_segment("Shibuya 1", &slot).unwrap(), "SHIBUYA");
        // Length tie: numeric component wins.
        assert_eq!(derive_segment("AB A1", &slot).unwrap(), "A1");
        // Full tie: lexicographic.
        assert_eq!(derive_segment("BB AA", &slot).unwrap(), "AA");
    }

    #[test]
    fn numeric_slot_filters_candidates() {
        let slot = GrammarSlot::new("prefecture", AddressField::Admin1, true)
            .numeric()
            .max_len(2);
        assert_eq!(derive_segment("Tokyo 13", &slot).unwrap(), "13");
        assert!(derive_segment("Tokyo", &slot).is_err());
    }

    #[test]
    fn pid_components_yield_witness_prefix() {
        let segments = pid_components(&jp_address(), &jp_grammar());
        assert_eq!(segments, vec!["JP", "13", "113", "SHIBUYA"]);
    }
}

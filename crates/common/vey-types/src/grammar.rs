use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use vey_crypto::hash::{digest_parts, Digest32};
use vey_crypto::domain;

use crate::address::AddressField;

/// One slot of a country's address hierarchy, in grammar order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GrammarSlot {
    /// Grammar-local slot name, e.g. "prefecture".
    pub name: String,
    /// The semantic field the slot's segment is derived from.
    pub field: AddressField,
    /// Whether an address must carry a value for this slot.
    pub required: bool,
    /// Whether the derived segment must be all digits.
    pub numeric: bool,
    /// Maximum derived segment length (≤ 8).
    pub max_len: usize,
}

impl GrammarSlot {
    pub fn new(name: &str, field: AddressField, required: bool) -> Self {
        GrammarSlot {
            name: name.to_string(),
            field,
            required,
            numeric: false,
            max_len: 8,
        }
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.min(8);
        self
    }
}

/// The per-country ordered list of address-hierarchy slots. Grammars are
/// versioned; structure proofs bind the digest of the exact version used.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CountryGrammar {
    pub country: String,
    pub version: u32,
    pub slots: Vec<GrammarSlot>,
}

impl CountryGrammar {
    pub fn new(country: &str, version: u32, slots: Vec<GrammarSlot>) -> Self {
        CountryGrammar { country: country.to_ascii_uppercase(), version, slots }
    }

    /// The hierarchy depth, country slot included.
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&GrammarSlot> {
        self.slots.get(index)
    }

    /// Digest of this grammar version. A verifier with a different grammar
    /// version computes a different hash, so proofs bound to stale rules
    /// are rejected.
    pub fn rules_hash(&self) -> Digest32 {
        let mut parts: Vec<Vec<u8>> = vec![
            self.country.as_bytes().to_vec(),
            self.version.to_le_bytes().to_vec(),
        ];
        for slot in &self.slots {
            parts.push(slot.name.as_bytes().to_vec());
            parts.push(slot.field.name().as_bytes().to_vec());
            parts.push(vec![
                slot.required as u8,
                slot.numeric as u8,
                slot.max_len as u8,
            ]);
        }
        let part_refs: Vec<&[u8]> = parts.iter().map(Vec::as_slice).collect();
        digest_parts(domain::GRAMMAR_RULES, &part_refs)
    }
}

/// Country-data collaborator: resolves a country code to its grammar.
pub trait CountryData: Send + Sync {
    fn grammar(&self, country: &str) -> Option<CountryGrammar>;
}

/// An in-memory grammar table. Ships with seed data for a handful of
/// countries so the crate is exercisable without the external country-data
/// service.
#[derive(Debug, Clone, Default)]
pub struct StaticCountryData {
    grammars: HashMap<String, CountryGrammar>,
}

impl StaticCountryData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_grammar(mut self, grammar: CountryGrammar) -> Self {
        self.grammars.insert(grammar.country.clone(), grammar);
        self
    }

    /// Seed table: JP, US, DE, GB.
    pub fn seeded() -> Self {
        use AddressField::*;
        Self::empty()
            .with_grammar(CountryGrammar::new("JP", 1, vec![
                GrammarSlot::new("country", Country, true).max_len(2),
                GrammarSlot::new("prefecture", Admin1, true).numeric().max_len(2),
                GrammarSlot::new("city", Admin2, true).max_len(4),
                GrammarSlot::new("town", Locality, false),
                GrammarSlot::new("chome", Street, false).numeric().max_len(3),
                GrammarSlot::new("block", Building, false).numeric().max_len(4),
                GrammarSlot::new("room", Unit, false).max_len(6),
            ]))
            .with_grammar(CountryGrammar::new("US", 1, vec![
                GrammarSlot::new("country", Country, true).max_len(2),
                GrammarSlot::new("state", Admin1, true).max_len(2),
                GrammarSlot::new("county", Admin2, false),
                GrammarSlot::new("city", Locality, true),
                GrammarSlot::new("street", Street, false),
                GrammarSlot::new("unit", Unit, false).max_len(6),
            ]))
            .with_grammar(CountryGrammar::new("DE", 1, vec![
                GrammarSlot::new("country", Country, true).max_len(2),
                GrammarSlot::new("land", Admin1, true).max_len(2),
                GrammarSlot::new("kreis", Admin2, false),
                GrammarSlot::new("stadt", Locality, true),
                GrammarSlot::new("strasse", Street, false),
            ]))
            .with_grammar(CountryGrammar::new("GB", 1, vec![
                GrammarSlot::new("country", Country, true).max_len(2),
                GrammarSlot::new("region", Admin1, true),
                GrammarSlot::new("county", Admin2, false),
                GrammarSlot::new("town", Locality, true),
                GrammarSlot::new("street", Street, false),
                GrammarSlot::new("unit", Unit, false).max_len(6),
            ]))
    }
}

impl CountryData for StaticCountryData {
    fn grammar(&self, country: &str) -> Option<CountryGrammar> {
        self.grammars.get(&country.to_ascii_uppercase()).cloned()
    }
}

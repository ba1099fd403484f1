use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of semantic address fields. Country grammars map their
/// hierarchy slots onto these; fields a grammar does not reference are
/// absent from the normalized form.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    Country,
    Admin1,
    Admin2,
    Locality,
    PostalCode,
    Street,
    Building,
    Unit,
    Recipient,
}

impl AddressField {
    pub const ALL: [AddressField; 9] = [
        AddressField::Country,
        AddressField::Admin1,
        AddressField::Admin2,
        AddressField::Locality,
        AddressField::PostalCode,
        AddressField::Street,
        AddressField::Building,
        AddressField::Unit,
        AddressField::Recipient,
    ];

    /// The canonical wire name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            AddressField::Country => "country",
            AddressField::Admin1 => "admin1",
            AddressField::Admin2 => "admin2",
            AddressField::Locality => "locality",
            AddressField::PostalCode => "postalCode",
            AddressField::Street => "street",
            AddressField::Building => "building",
            AddressField::Unit => "unit",
            AddressField::Recipient => "recipient",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        AddressField::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A canonical address: a mapping from semantic field names to values,
/// produced by the AMF normalizer.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct NormalizedAddress {
    fields: BTreeMap<AddressField, String>,
}

impl NormalizedAddress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: AddressField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn with(mut self, field: AddressField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: AddressField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn country(&self) -> Option<&str> {
        self.get(AddressField::Country)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressField, &str)> {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Raw, possibly multi-lingual user input: free-form keys to values.
/// The AMF normalizer maps known key aliases onto [`AddressField`]s.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct RawAddress {
    pub fields: BTreeMap<String, String>,
}

impl RawAddress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

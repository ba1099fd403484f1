// src/lib.rs for vey-types

pub mod address;
pub mod amf;
pub mod audit;
pub mod grammar;
pub mod policy;
pub mod resume;

pub use address::{AddressField, NormalizedAddress, RawAddress};
pub use amf::AmfError;
pub use audit::{AuditLogEntry, AuditResult};
pub use grammar::{CountryData, CountryGrammar, GrammarSlot, StaticCountryData};
pub use policy::{AccessPolicy, PolicyAction, PolicyError};
pub use resume::{
    Certification, Education, Employment, QualificationLevel, ResumeData, Skill,
};

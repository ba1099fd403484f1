//! Typed credential subjects and their constructors. Each constructor
//! builds an unsigned [`VerifiableCredential`] of the matching type; the
//! caller signs it with the issuer key.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use vey_core_types::{Did, Pid};
use vey_types::address::NormalizedAddress;
use vey_types::resume::{QualificationLevel, ResumeData};

use super::{VcError, VerifiableCredential};

pub const ADDRESS_PID_CREDENTIAL: &str = "AddressPIDCredential";
pub const EMPLOYMENT_CREDENTIAL: &str = "EmploymentCredential";
pub const EDUCATION_CREDENTIAL: &str = "EducationCredential";
pub const CERTIFICATION_CREDENTIAL: &str = "CertificationCredential";
pub const RESUME_CREDENTIAL: &str = "ResumeCredential";

/// Subject of an address-PID credential. The clear address components are
/// optional; issuers embed them when the credential backs resolution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AddressPidSubject {
    pub id: String,
    pub pid: Pid,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<NormalizedAddress>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EmploymentSubject {
    pub id: String,
    pub organization: String,
    pub position: String,
    #[serde(rename = "positionLevel")]
    pub position_level: u8,
    #[serde(rename = "verifierDid", skip_serializing_if = "Option::is_none")]
    pub verifier_did: Option<Did>,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EducationSubject {
    pub id: String,
    pub institution: String,
    pub level: QualificationLevel,
    #[serde(rename = "fieldOfStudy")]
    pub field_of_study: String,
    #[serde(rename = "completionYear")]
    pub completion_year: i32,
    #[serde(rename = "verifierDid", skip_serializing_if = "Option::is_none")]
    pub verifier_did: Option<Did>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CertificationSubject {
    pub id: String,
    pub name: String,
    pub issuer: String,
    #[serde(rename = "completionYear")]
    pub completion_year: i32,
    #[serde(rename = "verifierDid", skip_serializing_if = "Option::is_none")]
    pub verifier_did: Option<Did>,
}

/// Subject of a résumé credential: the full record, as attested by the
/// issuer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResumeSubject {
    pub id: String,
    pub resume: ResumeData,
}

/// Build an unsigned `AddressPIDCredential`.
pub fn address_pid_credential(
    subject: &Did,
    issuer: &Did,
    pid: &Pid,
    country: &str,
    admin1: Option<&str>,
    issued_at: DateTime<Utc>,
    expiration: Option<DateTime<Utc>>,
) -> Result<VerifiableCredential, VcError> {
    let payload = AddressPidSubject {
        id: subject.to_string(),
        pid: pid.clone(),
        country: country.to_string(),
        admin1: admin1.map(str::to_string),
        address: None,
    };
    build(ADDRESS_PID_CREDENTIAL, issuer, &payload, issued_at, expiration)
}

/// Build an unsigned `AddressPIDCredential` that also carries the clear
/// address, for issuers backing a resolver.
pub fn address_pid_credential_with_address(
    subject: &Did,
    issuer: &Did,
    pid: &Pid,
    address: &NormalizedAddress,
    issued_at: DateTime<Utc>,
    expiration: Option<DateTime<Utc>>,
) -> Result<VerifiableCredential, VcError> {
    let payload = AddressPidSubject {
        id: subject.to_string(),
        pid: pid.clone(),
        country: pid.country().to_string(),
        admin1: pid.segments().get(1).map(|s| s.to_string()),
        address: Some(address.clone()),
    };
    build(ADDRESS_PID_CREDENTIAL, issuer, &payload, issued_at, expiration)
}

pub fn employment_credential(
    subject: &Did,
    issuer: &Did,
    employment: &vey_types::resume::Employment,
    issued_at: DateTime<Utc>,
    expiration: Option<DateTime<Utc>>,
) -> Result<VerifiableCredential, VcError> {
    let payload = EmploymentSubject {
        id: subject.to_string(),
        organization: employment.organization.clone(),
        position: employment.position.clone(),
        position_level: employment.position_level,
        verifier_did: employment.verifier_did.clone(),
        start_date: employment.start_date,
        end_date: employment.end_date,
    };
    build(EMPLOYMENT_CREDENTIAL, issuer, &payload, issued_at, expiration)
}

pub fn education_credential(
    subject: &Did,
    issuer: &Did,
    education: &vey_types::resume::Education,
    issued_at: DateTime<Utc>,
    expiration: Option<DateTime<Utc>>,
) -> Result<VerifiableCredential, VcError> {
    let payload = EducationSubject {
        id: subject.to_string(),
        institution: education.institution.clone(),
        level: education.level,
        field_of_study: education.field_of_study.clone(),
        completion_year: education.completion_year,
        verifier_did: education.verifier_did.clone(),
    };
    build(EDUCATION_CREDENTIAL, issuer, &payload, issued_at, expiration)
}

pub fn certification_credential(
    subject: &Did,
    issuer: &Did,
    certification: &vey_types::resume::Certification,
    issued_at: DateTime<Utc>,
    expiration: Option<DateTime<Utc>>,
) -> Result<VerifiableCredential, VcError> {
    let payload = CertificationSubject {
        id: subject.to_string(),
        name: certification.name.clone(),
        issuer: certification.issuer.clone(),
        completion_year: certification.completion_year,
        verifier_did: certification.verifier_did.clone(),
    };
    build(CERTIFICATION_CREDENTIAL, issuer, &payload, issued_at, expiration)
}

pub fn resume_credential(
    subject: &Did,
    issuer: &Did,
    resume: &ResumeData,
    issued_at: DateTime<Utc>,
    expiration: Option<DateTime<Utc>>,
) -> Result<VerifiableCredential, VcError> {
    let payload = ResumeSubject { id: subject.to_string(), resume: resume.clone() };
    build(RESUME_CREDENTIAL, issuer, &payload, issued_at, expiration)
}

fn build<S: Serialize>(
    credential_type: &str,
    issuer: &Did,
    payload: &S,
    issued_at: DateTime<Utc>,
    expiration: Option<DateTime<Utc>>,
) -> Result<VerifiableCredential, VcError> {
    let subject = serde_json::to_value(payload)?;
    let mut vc = VerifiableCredential::new(credential_type, issuer.clone(), subject, issued_at);
    if let Some(expiration) = expiration {
        vc = vc.expiring(expiration);
    }
    Ok(vc)
}

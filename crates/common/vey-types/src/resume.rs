use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use vey_core_types::Did;

/// Ordered qualification levels; `certification` is the lowest.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum QualificationLevel {
    Certification,
    Bachelor,
    Master,
    Doctorate,
    Professional,
}

/// One employment record. `verifier_did` is the DID of the organization
/// that can attest the record; membership proofs require it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Employment {
    pub organization: String,
    pub position: String,
    /// Seniority rank within the organization, 0 = entry.
    #[serde(rename = "positionLevel", default)]
    pub position_level: u8,
    #[serde(rename = "verifierDid", skip_serializing_if = "Option::is_none")]
    pub verifier_did: Option<Did>,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Employment {
    /// Whole years covered by this record, as of `today` for open-ended
    /// employment.
    pub fn years(&self, today: NaiveDate) -> u32 {
        let end = self.end_date.unwrap_or(today);
        if end < self.start_date {
            return 0;
        }
        let mut years = end.year() - self.start_date.year();
        if (end.month(), end.day()) < (self.start_date.month(), self.start_date.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Education {
    pub institution: String,
    #[serde(rename = "verifierDid", skip_serializing_if = "Option::is_none")]
    pub verifier_did: Option<Did>,
    pub level: QualificationLevel,
    #[serde(rename = "fieldOfStudy")]
    pub field_of_study: String,
    #[serde(rename = "completionYear")]
    pub completion_year: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    #[serde(rename = "verifierDid", skip_serializing_if = "Option::is_none")]
    pub verifier_did: Option<Did>,
    #[serde(rename = "completionYear")]
    pub completion_year: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Skill {
    pub name: String,
    pub category: String,
    /// Proficiency on a 1..=5 scale.
    pub proficiency: u8,
    #[serde(rename = "yearsOfExperience", default)]
    pub years_of_experience: u32,
}

/// A subject's résumé: the record lists the résumé proof patterns draw
/// their witnesses from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResumeData {
    #[serde(rename = "userDid")]
    pub user_did: Did,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub employment: Vec<Employment>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl ResumeData {
    pub fn new(user_did: Did, full_name: impl Into<String>) -> Self {
        ResumeData {
            user_did,
            full_name: full_name.into(),
            email: None,
            phone: None,
            employment: Vec::new(),
            education: Vec::new(),
            certifications: Vec::new(),
            skills: Vec::new(),
        }
    }

    /// Derived field: whole years of experience summed over employment
    /// records.
    pub fn total_years_experience(&self, today: NaiveDate) -> u32 {
        self.employment.iter().map(|e| e.years(today)).sum()
    }

    /// Derived field: number of employment records.
    pub fn employment_count(&self) -> usize {
        self.employment.len()
    }

    /// Derived field: the top skills, at most five. Sort order:
    /// proficiency descending, years of experience descending, name
    /// ascending.
    pub fn top_skills(&self) -> Vec<&Skill> {
        let mut skills: Vec<&Skill> = self.skills.iter().collect();
        skills.sort_by(|a, b| {
            b.proficiency
                .cmp(&a.proficiency)
                .then_with(|| b.years_of_experience.cmp(&a.years_of_experience))
                .then_with(|| a.name.cmp(&b.name))
        });
        skills.truncate(5);
        skills
    }
}

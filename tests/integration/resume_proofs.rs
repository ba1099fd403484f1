//! Résumé proof flows: organization membership, selective reveal with
//! nonce freshness, qualification and skill proofs.

use chrono::{NaiveDate, TimeZone, Utc};

use vey_core_types::Did;
use vey_crypto::merkle::MerkleTree;
use vey_integration_tests::t0;
use vey_types::resume::{
    Certification, Education, Employment, QualificationLevel, ResumeData, Skill,
};
use vey_zkp::circuit::{circuits, ZkCircuit};
use vey_zkp::resume::membership::{prove_resume_membership, verify_resume_membership};
use vey_zkp::resume::qualification::{prove_degree, verify_qualification};
use vey_zkp::resume::reveal::{prove_resume_reveal, verify_resume_reveal};
use vey_zkp::resume::skill::{prove_skills, verify_skills};
use vey_zkp::{ProofPattern, ZkpError};

fn verified_orgs() -> Vec<Did> {
    [
        "did:web:google.com",
        "did:web:microsoft.com",
        "did:web:amazon.com",
    ]
    .iter()
    .map(|s| Did::parse(s).unwrap())
    .collect()
}

fn google_employment() -> Employment {
    Employment {
        organization: "Google".to_string(),
        position: "Senior Software Engineer".to_string(),
        position_level: 5,
        verifier_did: Some(Did::parse("did:web:google.com").unwrap()),
        start_date: NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
        end_date: Some(NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()),
    }
}

fn resume() -> ResumeData {
    let mut resume = ResumeData::new(
        Did::parse("did:web:alice.example").unwrap(),
        "Alice Example",
    );
    resume.email = Some("alice@example.com".to_string());
    resume.employment = vec![google_employment()];
    resume.education = vec![Education {
        institution: "University of Tokyo".to_string(),
        verifier_did: Some(Did::parse("did:web:u-tokyo.ac.jp").unwrap()),
        level: QualificationLevel::Master,
        field_of_study: "Computer Science".to_string(),
        completion_year: 2015,
    }];
    resume.certifications = vec![Certification {
        name: "CKA".to_string(),
        issuer: "CNCF".to_string(),
        verifier_did: None,
        completion_year: 2021,
    }];
    resume.skills = vec![
        Skill {
            name: "rust".to_string(),
            category: "engineering".to_string(),
            proficiency: 5,
            years_of_experience: 6,
        },
        Skill {
            name: "go".to_string(),
            category: "engineering".to_string(),
            proficiency: 4,
            years_of_experience: 5,
        },
        Skill {
            name: "figma".to_string(),
            category: "design".to_string(),
            proficiency: 2,
            years_of_experience: 1,
        },
    ];
    resume
}

#[test]
fn membership_at_verified_org() {
    let circuit = ZkCircuit::new(circuits::RESUME_MEMBERSHIP_V1, "resume membership");
    let orgs = verified_orgs();
    let leaves: Vec<&[u8]> = orgs.iter().map(|d| d.as_str().as_bytes()).collect();
    let root = MerkleTree::build(&leaves).root();

    let proof =
        prove_resume_membership(&google_employment(), &orgs, &circuit, t0()).unwrap();
    assert!(verify_resume_membership(&proof, &circuit, &root).is_ok());

    // An unverified organization cannot generate a proof.
    let mut unknown = google_employment();
    unknown.verifier_did = Some(Did::parse("did:web:unknown").unwrap());
    assert!(matches!(
        prove_resume_membership(&unknown, &orgs, &circuit, t0()),
        Err(ZkpError::MembershipNotFound)
    ));
}

#[test]
fn selective_reveal_nonces_are_unique_and_binding() {
    let circuit = ZkCircuit::new(circuits::RESUME_REVEAL_V1, "resume reveal");
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let fields = ["totalYearsExperience", "topSkills"];

    let a = prove_resume_reveal(&resume(), &fields, today, &circuit, t0()).unwrap();
    let b = prove_resume_reveal(&resume(), &fields, today, &circuit, t0()).unwrap();
    assert!(verify_resume_reveal(&a, &circuit).is_ok());
    assert!(verify_resume_reveal(&b, &circuit).is_ok());

    let (nonce_a, nonce_b) = match (&a.pattern, &b.pattern) {
        (
            ProofPattern::ResumeSelectiveReveal(pa),
            ProofPattern::ResumeSelectiveReveal(pb),
        ) => (pa.disclosure_nonce, pb.disclosure_nonce),
        _ => panic!("wrong pattern"),
    };
    assert_ne!(nonce_a, nonce_b);

    // Swapping nonces invalidates the counterpart proof.
    let mut swapped = a.clone();
    if let ProofPattern::ResumeSelectiveReveal(payload) = &mut swapped.pattern {
        payload.disclosure_nonce = nonce_b;
    }
    assert!(verify_resume_reveal(&swapped, &circuit).is_err());
}

#[test]
fn qualification_proof_orders_levels() {
    let circuit = ZkCircuit::new(circuits::RESUME_QUALIFICATION_V1, "resume qualification");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let proof = prove_degree(&resume().education[0], &circuit, now).unwrap();

    assert!(verify_qualification(&proof, &circuit, QualificationLevel::Bachelor, 2024).is_ok());
    assert!(matches!(
        verify_qualification(&proof, &circuit, QualificationLevel::Doctorate, 2024),
        Err(ZkpError::ProofRejected(_))
    ));
}

#[test]
fn skill_proof_counts_qualifying_skills() {
    let circuit = ZkCircuit::new(circuits::RESUME_SKILL_V1, "resume skill");
    let skills = resume().skills;

    let proof = prove_skills(&skills, "engineering", 4, &circuit, t0()).unwrap();
    assert!(verify_skills(&proof, &circuit, "engineering", 4, 2).is_ok());
    assert!(verify_skills(&proof, &circuit, "engineering", 4, 3).is_err());

    assert!(matches!(
        prove_skills(&skills, "design", 4, &circuit, t0()),
        Err(ZkpError::NoQualifyingSkills { .. })
    ));
}

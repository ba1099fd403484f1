//! The nine zero-knowledge proof patterns of the vey address protocol:
//! five over addresses (membership, structure, selective-reveal, version,
//! locker) and four over résumés (membership, selective-reveal,
//! qualification, skill).
//!
//! Each pattern is a prove/verify pair over a [`ZkCircuit`] descriptor.
//! Artifacts carry only public inputs plus the backend witness; private
//! values participate through commitments so a proof cannot be rebound to
//! a different private value. The deterministic commitment backend here
//! keeps the same contracts a Groth16/Plonk backing would satisfy.

pub mod address;
pub mod artifact;
pub mod circuit;
pub mod commitment;
pub mod error;
pub mod resume;

pub use artifact::{ProofPattern, ZkProof};
pub use circuit::{circuits, ProofType, ZkCircuit};
pub use error::ZkpError;

pub use address::locker::{prove_locker, verify_locker, LockerProof};
pub use address::membership::{prove_membership, verify_membership, MembershipProof};
pub use address::reveal::{
    prove_selective_reveal, verify_selective_reveal, SelectiveRevealProof,
};
pub use address::structure::{prove_structure, StructureProof, StructureVerifier};
pub use address::version::{prove_version, verify_version, VersionProof};
pub use resume::membership::{
    prove_resume_membership, verify_resume_membership, ResumeMembershipProof,
};
pub use resume::qualification::{
    prove_certification, prove_degree, verify_qualification, QualificationKind,
    QualificationProof,
};
pub use resume::reveal::{
    prove_resume_reveal, verify_resume_reveal, ResumeRevealProof, RESUME_REVEAL_FIELDS,
};
pub use resume::skill::{prove_skills, verify_skills, SkillProof};

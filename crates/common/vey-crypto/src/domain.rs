//! Domain-separation tags. Every digest in the protocol is prefixed by one
//! of these fixed ASCII strings so digests from different use-sites can
//! never collide.

pub const MERKLE_LEAF: &str = "vey:merkle:leaf";
pub const MERKLE_NODE: &str = "vey:merkle:node";
pub const VC_CANONICAL: &str = "vey:vc:canonical";
pub const PID_COMMIT: &str = "vey:pid:commit";
pub const ADDR_FIELD: &str = "vey:addr:field";
pub const RESUME_FIELD: &str = "vey:resume:field";
pub const OWNER_BIND: &str = "vey:owner:bind";
pub const DID_HASH: &str = "vey:did:hash";
pub const INSTITUTION_HASH: &str = "vey:institution:hash";
pub const FIELD_OF_STUDY_HASH: &str = "vey:fieldofstudy:hash";
pub const PERIOD_COMMIT: &str = "vey:period:commit";
pub const SKILLSET_COMMIT: &str = "vey:skillset:commit";
pub const STRUCTURE_ATTEST: &str = "vey:structure:attest";
pub const QUALIFICATION_ATTEST: &str = "vey:qualification:attest";
pub const SKILL_ATTEST: &str = "vey:skill:attest";
pub const GRAMMAR_RULES: &str = "vey:grammar:rules";
pub const LIST_CANONICAL: &str = "vey:list:canonical";
pub const PROVIDER_ARTIFACT: &str = "vey:provider:artifact";
pub const PID_TOKEN: &str = "vey:token";

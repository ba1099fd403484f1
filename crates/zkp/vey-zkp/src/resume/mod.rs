//! The four résumé proof patterns, structurally parallel to the address
//! patterns.

pub mod membership;
pub mod qualification;
pub mod reveal;
pub mod skill;

// src/lib.rs for vey-core-types

pub mod did;
pub mod did_key;
pub mod pid;

pub use did::{decode_multibase_key, encode_multibase_key, Did, DidError, DidMethod};
pub use did_key::DidKey;
pub use pid::{Pid, PidComponents, PidError};

//! DID documents, verifiable credentials, revocation lists and the
//! provider registry for the vey address protocol.

pub mod canonical;
pub mod document;
pub mod keystore;
pub mod provider;
pub mod revocation;
pub mod vc;

pub use canonical::{canonical_form, canonical_json, CanonicalError};
pub use document::{DidDocument, DocumentError, VerificationMethod};
pub use keystore::{Keystore, KeystoreError, MemoryKeystore};
pub use provider::{validate_provider_signature, AddressProvider, ProviderError};
pub use revocation::storage::{MemoryRevocationStore, RevocationStore, StorageError};
pub use revocation::{
    RevocationEntry, RevocationError, RevocationList, RevocationReason,
};
pub use vc::{Proof, VcError, VerifiableCredential};

#![deny(missing_docs)]

//! # pgap-core: Foundational Types for Policy Gap Analysis
//!
//! This crate defines the types that every other crate in the workspace
//! depends on. It has no internal crate dependencies; it uses only `serde`,
//! `serde_json`, `thiserror`, `uuid`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **[`Score`] is the only similarity currency.** Every clause, section,
//!    and domain score in the workspace is a `Score`, and a `Score` can only
//!    be constructed inside `[0, 1]`. Out-of-range or non-finite values are
//!    rejected at the boundary instead of leaking into aggregates.
//!
//! 2. **Newtype wrappers for identifiers.** A [`DocumentId`] cannot be
//!    confused with an [`AnalysisId`].
//!
//! 3. **[`ContentDigest`] for versioning.** Taxonomy versions and derived
//!    document identities are SHA-256 digests over canonical bytes.
//!
//! 4. **[`PgapError`] hierarchy.** Structured errors with `thiserror`. No
//!    `Box<dyn Error>` and no `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod score;

pub use digest::{sha256_digest, ContentDigest};
pub use error::{PgapError, ValidationError};
pub use identity::{AnalysisId, DocumentId};
pub use score::Score;

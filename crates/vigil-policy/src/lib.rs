//! # vigil-policy
//!
//! The policy store: a versioned, operator-owned document that every gate
//! reads fresh on every call, plus the global panic lock.
//!
//! ## Key invariants
//!
//! - **No caching**: [`PolicyStore::load`] re-reads and re-parses the
//!   backing file on every call, so a lock change is visible to the very
//!   next call with no process restart.
//! - **Fail closed**: a malformed document is a [`PolicyError`], never a
//!   silent default. Callers treat a load failure as deny.
//! - **Atomic swap**: administrative writes replace the document via a
//!   temp file plus rename, so no reader ever observes a partial document.
//! - **Read-only pipeline**: the gates never write the policy. Only the
//!   separate administrative operations ([`PolicyStore::lock`],
//!   [`PolicyStore::unlock`], [`PolicyStore::set_profile`]) do.

pub mod document;
pub mod error;
pub mod rules;
pub mod store;

pub use document::{ExecutionProfile, PolicyDocument, ProhibitedPatterns, Thresholds};
pub use error::PolicyError;
pub use rules::{CompiledPolicy, CompiledRule, PatternCategory};
pub use store::PolicyStore;

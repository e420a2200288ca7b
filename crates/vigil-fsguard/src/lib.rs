//! # vigil-fsguard
//!
//! The filesystem write guard: validates proposed paths and contents
//! before anything touches disk.
//!
//! Four rules, each independently fatal:
//! - path escape (`..` or absolute paths resolving outside the root)
//! - forbidden path (policy prefix/glob list)
//! - binary blob (NUL bytes or a denylisted extension)
//! - file explosion (too many new files in one action)
//!
//! The guard finds every violation in one pass and reports them all in
//! `details`; the decision's reason is the first violation found. Paths are
//! normalized lexically, without touching the filesystem, so the check is a
//! pure function of its inputs.

pub mod guard;

pub use guard::check_write;

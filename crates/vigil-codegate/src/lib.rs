//! # vigil-codegate
//!
//! The primary pre-write gate: scans proposed code text for prohibited
//! markers, unsafe escape primitives, and logic deletion, and scores diff
//! size/coherence against the policy thresholds.
//!
//! Two operations:
//! - [`check_code`] — pattern groups + logic-preservation heuristic; the
//!   review mode decides which categories are fatal.
//! - [`check_diff_quality`] — identical thresholds in every mode; only the
//!   consequence (advisory vs fatal) depends on the mode.
//!
//! Both are pure functions of their inputs: calling twice with the same
//! edits and the same policy yields the same Decision.

pub mod diff;
pub mod logic;
pub mod scan;

pub use diff::{check_diff_quality, DiffSummary};
pub use logic::logic_delta;
pub use scan::check_code;

//! # vigil-entropy
//!
//! Session entropy monitor for Vigil.
//!
//! Analyzes an agent session's edit history for degradation signals:
//! circular edits (the same file retried past the configured threshold)
//! and topic drift (consecutive prompts sharing too little vocabulary).
//! The monitor is advisory only — it reports signals but never blocks.
//!
//! ## Quick Example
//!
//! ```rust
//! use vigil_entropy::check_entropy;
//! use vigil_policy::document::PolicyDocument;
//! use vigil_protocol::request::EditEvent;
//!
//! let history = vec![EditEvent {
//!     path: "src/main.rs".to_string(),
//!     prompt: "implement argument parsing".to_string(),
//! }];
//! let decision = check_entropy(&history, &PolicyDocument::default());
//! assert!(decision.allowed);
//! ```

pub mod monitor;

pub use monitor::{check_entropy, compute_entropy, EntropyReport, EntropySignal};

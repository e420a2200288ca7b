//! # vigil-gateway
//!
//! The capability gateway: the single choke point for tool invocation and
//! command execution.
//!
//! Two operations, both stateless per call:
//! - [`check_tool`] — allowlist + session state machine + identity token
//! - [`check_command`] — profile gate + ordered block patterns
//!
//! ## Key invariants
//!
//! - **Lock supremacy**: a `locked` execution profile denies before any
//!   other input is examined, regardless of session markers.
//! - **Fresh policy per call**: the caller loads the policy immediately
//!   before each check; no allowed result outlives one call.
//! - **Presence, not correctness**: the content-identity token on write
//!   tools is checked for presence only. Validating it is an external
//!   authority's job; this boundary must not be silently tightened.

pub mod command;
pub mod session;
pub mod tool;

pub use command::check_command;
pub use session::{SessionPhase, MARKER_PROMPT_UNLOCKED, MARKER_SESSION_INITIALIZED};
pub use tool::check_tool;

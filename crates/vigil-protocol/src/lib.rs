//! # vigil-protocol
//!
//! The shared request/decision contract used by every vigil hook.
//!
//! The host agent issues exactly one [`HookRequest`] per phase per action
//! and reads one [`Decision`] back. There is no third state between
//! "continue" and "halt": a hook either allows the action or denies it with
//! a reason, a human-readable message, and recovery steps.
//!
//! ## Key invariants
//!
//! - **No silent denial**: `allowed = false` always carries a [`DenyReason`]
//!   and a non-empty message. The constructors enforce this.
//! - **Terminal denials**: a denial is final for that call. The caller, not
//!   the pipeline, decides what to try next.
//! - **Two exit states**: [`Decision::exit_code`] maps to 0 (continue) or
//!   2 (halt-with-reason). There is no retry status.

pub mod decision;
pub mod request;

pub use decision::{Decision, DenyReason, Finding};
pub use request::{EditEvent, HookAction, HookRequest, ProposedEdit, ReviewMode, SessionMarkers};

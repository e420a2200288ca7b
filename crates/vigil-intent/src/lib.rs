//! # vigil-intent
//!
//! Never-blocking helpers: the intent classifier and the plan resolver.
//!
//! [`classify`] scores a natural-language prompt against a fixed set of
//! intent categories and always returns a result. [`resolve_plan`] looks
//! for an optional declarative plan document and extracts its file scope;
//! absence of a plan is a valid, common outcome and downstream scope
//! checks treat it as "no restriction", never as a violation.

pub mod classifier;
pub mod plan;

pub use classifier::{classify, Classification, IntentCategory};
pub use plan::{resolve_plan, Plan};

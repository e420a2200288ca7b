//! # vigil-verify
//!
//! The post-write verifier: re-examines code that has already been written.
//!
//! Three independent checks combined into one Decision:
//! - **scope** — written paths inside the plan's declared scope (fatal only
//!   in strict mode; no plan means no scope check at all)
//! - **semantic match** — keyword overlap between the classified intent and
//!   identifiers introduced by the diff (always advisory)
//! - **observability** — large diffs must show logging evidence (fatal only
//!   in ship/strict)
//!
//! Plus the optional external verification command, run under a deadline:
//! a non-zero exit always blocks regardless of mode (negative signals
//! always block); an unconfigured command is never a signal.

pub mod external;
pub mod postwrite;

pub use external::{run_external_check, ExternalCheck};
pub use postwrite::verify_post_write;

// mod.rs — Subcommand implementations, one module per top-level command.

pub mod classify;
pub mod hook;
pub mod plan;
pub mod policy;

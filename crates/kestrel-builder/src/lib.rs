//! Kestrel Builder
//!
//! Translates a declarative [`WorkflowDef`](kestrel_config::WorkflowDef) into
//! concrete nodes and an edge map ready for the scheduler.
//!
//! Building never fails because of a single bad node: unknown types are
//! skipped with a warning, and nodes with broken settings are still built so
//! that they fail, if at all, when they execute. Every such decision is also
//! recorded as a [`BuildDiagnostic`] on the result.

mod builder;
mod error;

pub use builder::{BuildDiagnostic, Builder, BuiltGraph, Severity, StandardBuilder};
pub use error::BuildError;

//! Check registry (C4) and executor (C5): the layer that turns a stored
//! `Check` into a rendered sensor query, a graded `CheckResult`, and —
//! on failure — an incident.

pub mod executor;
pub mod legacy;
pub mod registry;

pub use executor::{execute, preview, ExecutionError, ExecutionRequest};
pub use registry::{is_column_level, lookup, CheckEntry};

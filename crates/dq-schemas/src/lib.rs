//! Shared domain types for the data quality platform.
//!
//! This crate holds only data: entities, enums, and the small value types
//! that cross crate boundaries. No I/O, no business logic. Every entity ID
//! is an opaque `Uuid` — there are no bidirectional pointers between entities,
//! only weak references by id (see `DESIGN.md` for the cycle-breaking
//! rationale).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub mod connection;
pub mod check;
pub mod job;
pub mod result;
pub mod incident;
pub mod schedule;
pub mod notification;

pub use check::*;
pub use connection::*;
pub use incident::*;
pub use job::*;
pub use notification::*;
pub use result::*;
pub use schedule::*;

/// Free-form JSON bag used for check parameters, rule thresholds, and
/// structured result detail. Kept as `serde_json::Value` rather than a typed
/// struct because callers (sensors, rules, the API) each only care about a
/// handful of keys and the set of keys is open-ended per check type.
pub type JsonBag = Value;

/// Convenience alias shared by every entity.
pub type Id = Uuid;

/// Common timestamp pair most entities carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

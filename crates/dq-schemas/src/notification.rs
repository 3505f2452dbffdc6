use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::incident::IncidentSeverity;
use crate::result::ResultSeverity;

/// Events a `NotificationChannel` can subscribe to. Closed set; dispatch
/// logic in `dq-notify` matches on this directly rather than free-form
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "notification_event", rename_all = "snake_case")]
pub enum NotificationEvent {
    IncidentOpened,
    IncidentResolved,
}

/// Only webhook delivery is implemented; `channel_type` is kept as an enum
/// (rather than collapsed into the struct) so adding Slack/email later is an
/// additive variant, matching how `ConnectionType` anticipates new dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "channel_type", rename_all = "snake_case")]
pub enum ChannelType {
    Webhook,
}

/// `url` is optional: a channel saved without one is kept around (e.g. while
/// its destination is still being provisioned) but every dispatch for it is
/// skipped before any HTTP attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: Option<String>,
    #[serde(default)]
    pub headers: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: Uuid,
    pub name: String,
    pub channel_type: ChannelType,
    pub config: WebhookConfig,
    pub events: Vec<NotificationEvent>,
    /// Floor on the `warning < error < fatal` scale; `None` means no floor.
    /// An incident's `IncidentSeverity` is mapped down onto this scale
    /// before comparison, since the two scales don't share a cardinality
    /// (`high` and `critical` both collapse to `fatal`).
    pub min_severity: Option<ResultSeverity>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collapses the operator-facing `IncidentSeverity` scale onto the
/// `warning/error/fatal` floor scale used by notification filtering. `high`
/// and `critical` both map to `fatal`: there's no floor above it to express
/// the escalation-only distinction `critical` carries on its own scale.
fn incident_floor(severity: IncidentSeverity) -> ResultSeverity {
    match severity {
        IncidentSeverity::Low => ResultSeverity::Warning,
        IncidentSeverity::Medium => ResultSeverity::Error,
        IncidentSeverity::High => ResultSeverity::Fatal,
        IncidentSeverity::Critical => ResultSeverity::Fatal,
    }
}

impl NotificationChannel {
    /// A channel fires for an event only if it's subscribed to that event
    /// kind and the incident's severity, mapped onto the warning/error/fatal
    /// scale, meets its floor. A channel with no floor fires on every
    /// subscribed event regardless of severity.
    pub fn should_fire(&self, event: NotificationEvent, severity: IncidentSeverity) -> bool {
        if !self.is_active || !self.events.contains(&event) {
            return false;
        }
        match self.min_severity {
            Some(floor) => incident_floor(severity) >= floor,
            None => true,
        }
    }
}

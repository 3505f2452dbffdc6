//! C10: notification fan-out.
//!
//! The incident manager (or the check executor, on a newly opened incident)
//! sends a [`NotificationJob`] into a bounded channel; a background task
//! drained by [`spawn_dispatcher`] loads the active channels, filters them
//! with [`NotificationChannel::should_fire`], and delivers each match as a
//! webhook POST. Delivery is fire-and-forget past the channel send — a
//! notification failure never blocks or fails the check run that triggered it.

use chrono::{DateTime, Utc};
use dq_schemas::{Incident, NotificationChannel, NotificationEvent};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tracing::{error, warn};

pub mod webhook;

/// Capacity of the dispatch channel. Sized generously above expected burst
/// (a scheduler tick that opens several incidents at once); a full channel
/// means the dispatcher has stalled, and callers drop the notification
/// rather than block check execution.
pub const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct NotificationJob {
    pub event: NotificationEvent,
    pub incident: Incident,
    pub occurred_at: DateTime<Utc>,
}

pub type NotifySender = mpsc::Sender<NotificationJob>;

pub fn channel() -> (NotifySender, mpsc::Receiver<NotificationJob>) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Best-effort enqueue: logs and drops the job if the dispatcher's channel
/// is full or has been shut down, rather than propagating an error up into
/// check execution.
pub fn enqueue(sender: &NotifySender, job: NotificationJob) {
    if let Err(e) = sender.try_send(job) {
        warn!("notification dropped: {e}");
    }
}

/// Spawns the background task that drains `rx` and delivers matching
/// webhooks. Returns the `JoinHandle` so callers can await it on shutdown.
pub fn spawn_dispatcher(pool: PgPool, mut rx: mpsc::Receiver<NotificationJob>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if let Err(e) = dispatch_one(&pool, &job).await {
                error!("notification dispatch failed: {e}");
            }
        }
    })
}

async fn dispatch_one(pool: &PgPool, job: &NotificationJob) -> anyhow::Result<()> {
    let channels = dq_db::list_active_channels(pool).await?;
    let matching: Vec<&NotificationChannel> = channels
        .iter()
        .filter(|c| c.should_fire(job.event, job.incident.severity))
        .collect();

    for channel in matching {
        if let Err(e) = webhook::deliver(channel, job).await {
            error!(channel = %channel.name, "webhook delivery failed: {e}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dq_schemas::{ChannelType, IncidentSeverity, IncidentStatus, ResultSeverity, WebhookConfig};
    use uuid::Uuid;

    fn sample_channel(events: Vec<NotificationEvent>, min_severity: Option<ResultSeverity>) -> NotificationChannel {
        NotificationChannel {
            id: Uuid::new_v4(),
            name: "ops-webhook".into(),
            channel_type: ChannelType::Webhook,
            config: WebhookConfig { url: Some("https://example.invalid/hook".into()), headers: Default::default() },
            events,
            min_severity,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_incident(severity: IncidentSeverity) -> Incident {
        Incident {
            id: Uuid::new_v4(),
            check_id: Uuid::new_v4(),
            result_id: Uuid::new_v4(),
            status: IncidentStatus::Open,
            severity,
            title: "row_count failed".into(),
            description: None,
            first_failure_at: Utc::now(),
            last_failure_at: Utc::now(),
            failure_count: 1,
            acknowledged_at: None,
            acknowledged_by: None,
            resolved_at: None,
            resolved_by: None,
            resolution_notes: None,
        }
    }

    #[test]
    fn channel_fires_only_for_subscribed_event_above_floor() {
        let channel = sample_channel(vec![NotificationEvent::IncidentOpened], Some(ResultSeverity::Fatal));
        assert!(channel.should_fire(NotificationEvent::IncidentOpened, IncidentSeverity::Critical));
        assert!(!channel.should_fire(NotificationEvent::IncidentOpened, IncidentSeverity::Low));
        assert!(!channel.should_fire(NotificationEvent::IncidentResolved, IncidentSeverity::Critical));
    }

    #[test]
    fn high_and_critical_collapse_to_the_same_fatal_floor() {
        let channel = sample_channel(vec![NotificationEvent::IncidentOpened], Some(ResultSeverity::Fatal));
        assert!(channel.should_fire(NotificationEvent::IncidentOpened, IncidentSeverity::High));
        assert!(channel.should_fire(NotificationEvent::IncidentOpened, IncidentSeverity::Critical));
        assert!(!channel.should_fire(NotificationEvent::IncidentOpened, IncidentSeverity::Medium));
    }

    #[test]
    fn no_floor_fires_on_every_subscribed_severity() {
        let channel = sample_channel(vec![NotificationEvent::IncidentOpened], None);
        assert!(channel.should_fire(NotificationEvent::IncidentOpened, IncidentSeverity::Low));
    }

    #[test]
    fn inactive_channel_never_fires() {
        let mut channel = sample_channel(vec![NotificationEvent::IncidentOpened], Some(ResultSeverity::Warning));
        channel.is_active = false;
        assert!(!channel.should_fire(NotificationEvent::IncidentOpened, IncidentSeverity::Critical));
    }

    #[test]
    fn enqueue_on_closed_receiver_does_not_panic() {
        let (tx, rx) = channel();
        drop(rx);
        enqueue(&tx, NotificationJob { event: NotificationEvent::IncidentOpened, incident: sample_incident(IncidentSeverity::Low), occurred_at: Utc::now() });
    }
}

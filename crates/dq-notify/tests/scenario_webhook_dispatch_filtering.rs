//! N3 and N4: webhook delivery never raises past `deliver`'s own error
//! return, and a channel with no URL is skipped before any request exists.

use chrono::Utc;
use dq_notify::webhook::deliver;
use dq_notify::NotificationJob;
use dq_schemas::{
    ChannelType, Incident, IncidentSeverity, IncidentStatus, NotificationChannel, NotificationEvent, ResultSeverity,
    WebhookConfig,
};
use uuid::Uuid;

fn sample_incident() -> Incident {
    Incident {
        id: Uuid::new_v4(),
        check_id: Uuid::new_v4(),
        result_id: Uuid::new_v4(),
        status: IncidentStatus::Open,
        severity: IncidentSeverity::High,
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

fn channel_with_url(url: Option<String>) -> NotificationChannel {
    NotificationChannel {
        id: Uuid::new_v4(),
        name: "ops-webhook".into(),
        channel_type: ChannelType::Webhook,
        config: WebhookConfig { url, headers: Default::default() },
        events: vec![NotificationEvent::IncidentOpened],
        min_severity: Some(ResultSeverity::Warning),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn n3_http_500_is_reported_as_an_error_not_a_panic() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/hook").with_status(500).create_async().await;

    let channel = channel_with_url(Some(format!("{}/hook", server.url())));
    let job = NotificationJob { event: NotificationEvent::IncidentOpened, incident: sample_incident(), occurred_at: Utc::now() };

    let result = deliver(&channel, &job).await;
    assert!(result.is_err(), "a 500 response must surface as a delivery error the caller logs and drops");
    mock.assert_async().await;
}

#[tokio::test]
async fn n4_channel_with_no_url_is_skipped_without_a_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/hook").expect(0).create_async().await;

    let channel = channel_with_url(None);
    let job = NotificationJob { event: NotificationEvent::IncidentOpened, incident: sample_incident(), occurred_at: Utc::now() };

    let result = deliver(&channel, &job).await;
    assert!(result.is_ok());
    mock.assert_async().await;
}

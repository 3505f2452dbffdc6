//! Axum router and all HTTP handlers for dq-server.
//!
//! `build_router` is the single entry point; `main.rs`/`dq-cli` attach
//! middleware layers after calling it. All handlers are `pub(crate)` so
//! tests can compose the router directly.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use chrono::Utc;
use dq_checks::ExecutionRequest;
use dq_db::{CheckFilter, CheckUpdate};
use dq_schemas::{Job, JobTrigger, NewCheck, NewSchedule, WebhookConfig};
use uuid::Uuid;

use crate::api_types::*;
use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/connections", post(create_connection).get(list_connections))
        .route(
            "/api/v1/connections/:id",
            get(get_connection).put(update_connection).delete(delete_connection),
        )
        .route("/api/v1/connections/:id/test", post(test_connection))
        .route("/api/v1/connections/:id/schemas", get(list_schemas))
        .route("/api/v1/connections/:id/schemas/:schema/tables", get(list_tables))
        .route(
            "/api/v1/connections/:id/schemas/:schema/tables/:table/columns",
            get(list_columns),
        )
        .route("/api/v1/checks", post(create_check).get(list_checks))
        .route("/api/v1/checks/meta/types", get(check_types_meta))
        .route("/api/v1/checks/:id", get(get_check).patch(update_check).delete(delete_check))
        .route("/api/v1/checks/:id/run", post(run_check))
        .route("/api/v1/checks/:id/preview", post(preview_stored_check))
        .route("/api/v1/checks/batch/run", post(batch_run))
        .route("/api/v1/checks/validate/preview", post(preview_transient_check))
        .route("/api/v1/jobs", get(list_jobs))
        .route("/api/v1/jobs/:id", get(get_job))
        .route("/api/v1/jobs/:id/cancel", post(cancel_job))
        .route("/api/v1/results", get(list_results))
        .route("/api/v1/results/summary", get(result_summary))
        .route("/api/v1/incidents", get(list_incidents))
        .route("/api/v1/incidents/:id", get(get_incident).patch(update_incident))
        .route("/api/v1/schedules", post(create_schedule).get(list_schedules))
        .route(
            "/api/v1/schedules/:id",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
        .route(
            "/api/v1/notifications/channels",
            post(create_channel).get(list_channels),
        )
        .route(
            "/api/v1/notifications/channels/:id",
            get(get_channel).put(update_channel).delete(delete_channel),
        )
        .route("/api/v1/notifications/channels/:id/test", post(test_channel))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = dq_db::status(&st.pool).await;
    let database = db_status.as_ref().map(|s| s.ok && s.schema_ready).unwrap_or(false);
    // The jobs table is also the work queue (no separate broker process);
    // reachability of it is the "broker" half of the deep health check.
    let job_queue = dq_db::list_schedules(&st.pool).await.is_ok();

    let status = if database && job_queue { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (
        status,
        Json(HealthResponse {
            ok: database && job_queue,
            service: st.build.service,
            version: st.build.version,
            database,
            job_queue,
        }),
    )
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

async fn create_connection(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CreateConnectionRequest>,
) -> Result<Json<ConnectionResponse>, AppError> {
    let encrypted = st
        .encryption_key
        .encrypt_config(&req.config)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let conn = dq_db::insert_connection(&st.pool, &req.name, req.connection_type, &encrypted).await?;
    Ok(Json(conn.into()))
}

async fn list_connections(State(st): State<Arc<AppState>>) -> Result<Json<Vec<ConnectionResponse>>, AppError> {
    let conns = dq_db::list_connections(&st.pool, false).await?;
    Ok(Json(conns.into_iter().map(Into::into).collect()))
}

async fn get_connection(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionResponse>, AppError> {
    let conn = dq_db::get_connection(&st.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("connection {id}")))?;
    Ok(Json(conn.into()))
}

async fn update_connection(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateConnectionRequest>,
) -> Result<Json<ConnectionResponse>, AppError> {
    let encrypted = req
        .config
        .as_ref()
        .map(|c| st.encryption_key.encrypt_config(c).map_err(|e| AppError::Validation(e.to_string())))
        .transpose()?;
    dq_db::update_connection(&st.pool, id, req.name.as_deref(), encrypted.as_deref(), req.is_active).await?;
    let conn = dq_db::get_connection(&st.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("connection {id}")))?;
    Ok(Json(conn.into()))
}

async fn delete_connection(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<StatusCode, AppError> {
    dq_db::deactivate_connection(&st.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn test_connection(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TestConnectionResponse>, AppError> {
    let connection = dq_db::get_connection(&st.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("connection {id}")))?;
    match dq_connectors::connect(&connection, &st.encryption_key).await {
        Ok(connector) => match connector.test_connection().await {
            Ok(()) => Ok(Json(TestConnectionResponse { ok: true, error: None })),
            Err(e) => Ok(Json(TestConnectionResponse { ok: false, error: Some(e.to_string()) })),
        },
        Err(e) => Ok(Json(TestConnectionResponse { ok: false, error: Some(e.to_string()) })),
    }
}

async fn list_schemas(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SchemaListResponse>, AppError> {
    let connector = connect_for(&st, id).await?;
    let schemas = dq_connectors::introspect::list_schemas(connector.as_ref()).await?;
    Ok(Json(SchemaListResponse { schemas }))
}

async fn list_tables(
    State(st): State<Arc<AppState>>,
    Path((id, schema)): Path<(Uuid, String)>,
) -> Result<Json<TableListResponse>, AppError> {
    let connector = connect_for(&st, id).await?;
    let tables = dq_connectors::introspect::list_tables(connector.as_ref(), &schema).await?;
    Ok(Json(TableListResponse { tables }))
}

async fn list_columns(
    State(st): State<Arc<AppState>>,
    Path((id, schema, table)): Path<(Uuid, String, String)>,
) -> Result<Json<ColumnListResponse>, AppError> {
    let connector = connect_for(&st, id).await?;
    let columns = dq_connectors::introspect::list_columns(connector.as_ref(), &schema, &table).await?;
    Ok(Json(ColumnListResponse { columns }))
}

async fn connect_for(st: &AppState, connection_id: Uuid) -> Result<Box<dyn dq_connectors::Connector>, AppError> {
    let connection = dq_db::get_connection(&st.pool, connection_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("connection {connection_id}")))?;
    Ok(dq_connectors::connect(&connection, &st.encryption_key).await?)
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

async fn create_check(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CreateCheckRequest>,
) -> Result<Json<CheckDto>, AppError> {
    let new_check = new_check_from_request(req);
    validate_new_check(&new_check)?;
    let check = dq_db::insert_check(&st.pool, &new_check).await?;
    Ok(Json(check))
}

async fn list_checks(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ListChecksQuery>,
) -> Result<Json<Vec<CheckDto>>, AppError> {
    let filter = CheckFilter {
        connection_id: q.connection_id,
        check_type: q.check_type,
        check_mode: q.check_mode,
        target_table: q.target_table,
        is_active: q.is_active,
    };
    let checks = dq_db::list_checks(&st.pool, &filter, q.limit).await?;
    Ok(Json(checks))
}

async fn check_types_meta() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "check_modes": ["profiling", "monitoring", "partitioned"],
        "time_scales": ["daily", "monthly"],
    }))
}

async fn get_check(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<Json<CheckDto>, AppError> {
    let check = fetch_check(&st, id).await?;
    Ok(Json(check))
}

async fn update_check(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCheckRequest>,
) -> Result<Json<CheckDto>, AppError> {
    let update = CheckUpdate {
        target_schema: req.target_schema,
        target_table: req.target_table,
        target_column: req.target_column,
        partition_by_column: req.partition_by_column,
        parameters: req.parameters,
        rule_parameters: req.rule_parameters,
        is_active: req.is_active,
    };
    dq_db::update_check(&st.pool, id, &update).await?;
    let check = fetch_check(&st, id).await?;
    Ok(Json(check))
}

async fn delete_check(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<StatusCode, AppError> {
    dq_db::deactivate_check(&st.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn run_check(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RunCheckResponse>, AppError> {
    fetch_check(&st, id).await?;
    let job = dq_jobs::create_job(&st.pool, id, JobTrigger::Api, None)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    st.job_submitter.submit(job.id).await;
    Ok(Json(job_response(&job)))
}

async fn batch_run(
    State(st): State<Arc<AppState>>,
    Json(req): Json<BatchRunRequest>,
) -> Result<Json<BatchRunResponse>, AppError> {
    let mut jobs = Vec::with_capacity(req.check_ids.len());
    for check_id in req.check_ids {
        fetch_check(&st, check_id).await?;
        let job = dq_jobs::create_job(&st.pool, check_id, JobTrigger::Api, None)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        st.job_submitter.submit(job.id).await;
        jobs.push(job_response(&job));
    }
    Ok(Json(BatchRunResponse { jobs }))
}

/// Synchronous execution against a check already on file — used by
/// `POST /checks/{id}/preview`, which skips persistence but otherwise runs
/// the identical sensor/rule path `run_check` dispatches asynchronously.
async fn preview_stored_check(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckResultDto>, AppError> {
    let check = fetch_check(&st, id).await?;
    let result = preview_check(&st, &check).await?;
    Ok(Json(result))
}

/// `POST /checks/validate/preview` — runs a transient check definition that
/// is never persisted, for "try before you save" workflows in the UI.
async fn preview_transient_check(
    State(st): State<Arc<AppState>>,
    Json(req): Json<PreviewCheckRequest>,
) -> Result<Json<CheckResultDto>, AppError> {
    let new_check = new_check_from_request(req.check);
    validate_new_check(&new_check)?;
    let now = Utc::now();
    let check = dq_schemas::Check {
        id: Uuid::new_v4(),
        connection_id: new_check.connection_id,
        check_type: new_check.check_type,
        check_mode: new_check.check_mode,
        time_scale: new_check.time_scale,
        target_schema: new_check.target_schema,
        target_table: new_check.target_table,
        target_column: new_check.target_column,
        partition_by_column: new_check.partition_by_column,
        parameters: new_check.parameters,
        rule_parameters: new_check.rule_parameters,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let result = preview_check(&st, &check).await?;
    Ok(Json(result))
}

async fn preview_check(st: &AppState, check: &dq_schemas::Check) -> Result<CheckResultDto, AppError> {
    let connection = dq_db::get_connection(&st.pool, check.connection_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("connection {}", check.connection_id)))?;
    let cross_source_connection = cross_source_connection(st, check).await?;

    let request = ExecutionRequest {
        check,
        job_id: Uuid::new_v4(),
        connection: &connection,
        cross_source_connection: cross_source_connection.as_ref(),
        encryption_key: &st.encryption_key,
        pool: &st.pool,
    };
    Ok(dq_checks::preview(request).await?)
}

async fn cross_source_connection(
    st: &AppState,
    check: &dq_schemas::Check,
) -> Result<Option<dq_schemas::Connection>, AppError> {
    let Some(raw_id) = check.parameters.get("reference_connection_id").and_then(|v| v.as_str()) else {
        return Ok(None);
    };
    let reference_id = Uuid::parse_str(raw_id)
        .map_err(|_| AppError::Validation("parameters.reference_connection_id is not a valid uuid".to_string()))?;
    let connection = dq_db::get_connection(&st.pool, reference_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("connection {reference_id}")))?;
    Ok(Some(connection))
}

async fn fetch_check(st: &AppState, id: Uuid) -> Result<dq_schemas::Check, AppError> {
    dq_db::get_check(&st.pool, id).await?.ok_or_else(|| AppError::NotFound(format!("check {id}")))
}

fn new_check_from_request(req: CreateCheckRequest) -> NewCheck {
    NewCheck {
        connection_id: req.connection_id,
        check_type: req.check_type,
        check_mode: req.check_mode,
        time_scale: req.time_scale,
        target_schema: req.target_schema,
        target_table: req.target_table,
        target_column: req.target_column,
        partition_by_column: req.partition_by_column,
        parameters: req.parameters,
        rule_parameters: req.rule_parameters,
    }
}

fn validate_new_check(new_check: &NewCheck) -> Result<(), AppError> {
    let is_column_level = dq_checks::is_column_level(new_check.check_type).unwrap_or(false);
    if is_column_level && new_check.target_column.is_none() {
        return Err(AppError::Validation("column-level check requires target_column".to_string()));
    }
    if new_check.check_mode == dq_schemas::CheckMode::Partitioned && new_check.partition_by_column.is_none() {
        return Err(AppError::Validation("partitioned check requires partition_by_column".to_string()));
    }
    Ok(())
}

fn job_response(job: &Job) -> RunCheckResponse {
    RunCheckResponse { job_id: job.id, task_id: job.id, status: format!("{:?}", job.status).to_lowercase() }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

async fn list_jobs(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ListJobsQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = dq_jobs::list_for_check(&st.pool, q.check_id, q.limit)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(jobs))
}

async fn get_job(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<Json<Job>, AppError> {
    let job = dq_jobs::get_job(&st.pool, id).await.map_err(job_error)?;
    Ok(Json(job))
}

async fn cancel_job(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<StatusCode, AppError> {
    dq_jobs::cancel_job(&st.pool, id).await.map_err(job_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn job_error(e: dq_jobs::JobError) -> AppError {
    match e {
        dq_jobs::JobError::NotFound(id) => AppError::NotFound(format!("job {id}")),
        dq_jobs::JobError::InvalidTransition { .. } => AppError::Validation(e.to_string()),
        dq_jobs::JobError::Db(_) => AppError::Internal(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

async fn list_results(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ListResultsQuery>,
) -> Result<Json<Vec<CheckResultDto>>, AppError> {
    let results = dq_db::list_results(&st.pool, q.check_id, q.connection_id, q.passed, q.from_date, q.to_date, q.limit)
        .await?;
    Ok(Json(results))
}

async fn result_summary(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ResultSummaryQuery>,
) -> Result<Json<ResultSummaryResponse>, AppError> {
    let row = dq_db::result_summary(&st.pool, q.check_id, q.connection_id, q.passed, q.from_date, q.to_date).await?;
    Ok(Json(row.into()))
}

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

async fn list_incidents(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ListIncidentsQuery>,
) -> Result<Json<Vec<IncidentDto>>, AppError> {
    let incidents = dq_db::list_incidents_filtered(&st.pool, q.check_id, q.status, q.severity, q.limit).await?;
    Ok(Json(incidents))
}

async fn get_incident(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<Json<IncidentDto>, AppError> {
    let incident =
        dq_db::get_incident(&st.pool, id).await?.ok_or_else(|| AppError::NotFound(format!("incident {id}")))?;
    Ok(Json(incident))
}

async fn update_incident(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateIncidentRequest>,
) -> Result<Json<IncidentDto>, AppError> {
    match req.status {
        dq_schemas::IncidentStatus::Acknowledged => dq_incidents::acknowledge(&st.pool, id, &req.by).await?,
        dq_schemas::IncidentStatus::Resolved => {
            dq_incidents::resolve(&st.pool, id, &req.by, req.notes.as_deref()).await?
        }
        dq_schemas::IncidentStatus::Open => {
            return Err(AppError::Validation("cannot transition an incident back to open".to_string()))
        }
    }
    let incident =
        dq_db::get_incident(&st.pool, id).await?.ok_or_else(|| AppError::NotFound(format!("incident {id}")))?;
    Ok(Json(incident))
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

async fn create_schedule(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<Json<ScheduleDto>, AppError> {
    dq_jobs::next_run_after(&req.cron_expression, &req.timezone, Utc::now())
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let new_schedule =
        NewSchedule { check_id: req.check_id, cron_expression: req.cron_expression, timezone: req.timezone };
    let schedule = dq_db::insert_schedule(&st.pool, &new_schedule).await?;
    Ok(Json(schedule))
}

async fn list_schedules(State(st): State<Arc<AppState>>) -> Result<Json<Vec<ScheduleDto>>, AppError> {
    let schedules = dq_db::list_schedules(&st.pool).await?;
    Ok(Json(schedules))
}

async fn get_schedule(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<Json<ScheduleDto>, AppError> {
    let schedule =
        dq_db::get_schedule(&st.pool, id).await?.ok_or_else(|| AppError::NotFound(format!("schedule {id}")))?;
    Ok(Json(schedule))
}

async fn update_schedule(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<Json<ScheduleDto>, AppError> {
    dq_jobs::next_run_after(&req.cron_expression, &req.timezone, Utc::now())
        .map_err(|e| AppError::Validation(e.to_string()))?;
    dq_db::update_schedule(&st.pool, id, &req.cron_expression, &req.timezone, true).await?;
    let schedule =
        dq_db::get_schedule(&st.pool, id).await?.ok_or_else(|| AppError::NotFound(format!("schedule {id}")))?;
    Ok(Json(schedule))
}

async fn delete_schedule(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<StatusCode, AppError> {
    dq_db::delete_schedule(&st.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Notification channels
// ---------------------------------------------------------------------------

async fn create_channel(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CreateChannelRequest>,
) -> Result<Json<ChannelDto>, AppError> {
    let config = WebhookConfig { url: req.url, headers: req.headers };
    let channel = dq_db::insert_channel(
        &st.pool,
        &req.name,
        dq_schemas::ChannelType::Webhook,
        &config,
        &req.events,
        req.min_severity,
    )
    .await?;
    Ok(Json(channel))
}

async fn list_channels(State(st): State<Arc<AppState>>) -> Result<Json<Vec<ChannelDto>>, AppError> {
    let channels = dq_db::list_channels(&st.pool).await?;
    Ok(Json(channels))
}

async fn get_channel(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<Json<ChannelDto>, AppError> {
    let channel = dq_db::get_channel(&st.pool, id).await?.ok_or_else(|| AppError::NotFound(format!("channel {id}")))?;
    Ok(Json(channel))
}

async fn update_channel(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateChannelRequest>,
) -> Result<Json<ChannelDto>, AppError> {
    let config = WebhookConfig { url: req.url, headers: req.headers };
    dq_db::update_channel(&st.pool, id, &req.name, &config, &req.events, req.min_severity, true).await?;
    let channel = dq_db::get_channel(&st.pool, id).await?.ok_or_else(|| AppError::NotFound(format!("channel {id}")))?;
    Ok(Json(channel))
}

async fn delete_channel(State(st): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Result<StatusCode, AppError> {
    dq_db::delete_channel(&st.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn test_channel(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TestConnectionResponse>, AppError> {
    let channel = dq_db::get_channel(&st.pool, id).await?.ok_or_else(|| AppError::NotFound(format!("channel {id}")))?;
    let sample = dq_notify::NotificationJob {
        event: dq_schemas::NotificationEvent::IncidentOpened,
        incident: sample_incident_for_test(),
        occurred_at: Utc::now(),
    };
    match dq_notify::webhook::deliver(&channel, &sample).await {
        Ok(()) => Ok(Json(TestConnectionResponse { ok: true, error: None })),
        Err(e) => Ok(Json(TestConnectionResponse { ok: false, error: Some(e.to_string()) })),
    }
}

fn sample_incident_for_test() -> dq_schemas::Incident {
    let now = Utc::now();
    dq_schemas::Incident {
        id: Uuid::new_v4(),
        check_id: Uuid::new_v4(),
        result_id: Uuid::new_v4(),
        status: dq_schemas::IncidentStatus::Open,
        severity: dq_schemas::IncidentSeverity::Low,
        title: "Test notification".to_string(),
        description: Some("This is a test delivery triggered from the API.".to_string()),
        first_failure_at: now,
        last_failure_at: now,
        failure_count: 1,
        acknowledged_at: None,
        acknowledged_by: None,
        resolved_at: None,
        resolved_by: None,
        resolution_notes: None,
    }
}

//! HTTP API daemon (C-HTTP). Thin on purpose: `run` wires together the
//! database pool, worker pool, scheduler, and notification dispatcher and
//! then serves `routes::build_router` — both `main.rs` and `dq-cli`'s `serve`
//! subcommand call into this, not the other way around.

pub mod api_types;
pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::middleware;
use dq_config::AppConfig;
use dq_crypto::EncryptionKey;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use state::AppState;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let pool = dq_db::connect(&config.database_url, config.database_max_connections).await?;
    dq_db::migrate(&pool).await.context("failed to run database migrations")?;

    let encryption_key = Arc::new(
        EncryptionKey::from_base64(&config.encryption_key).context("invalid ENCRYPTION_KEY")?,
    );

    let (job_submitter, job_rx) = dq_jobs::submit_channel(1024);
    let (notify_tx, notify_rx) = dq_notify::channel();

    let worker_config = dq_jobs::WorkerPoolConfig {
        concurrency: config.max_concurrent_checks,
        execution_timeout: config.check_execution_timeout(),
        ..Default::default()
    };
    dq_jobs::spawn_pool(pool.clone(), encryption_key.clone(), notify_tx.clone(), job_rx, worker_config);
    dq_jobs::spawn_scheduler(pool.clone(), job_submitter.clone(), config.scheduler_poll_interval());
    dq_notify::spawn_dispatcher(pool.clone(), notify_rx);

    let state = Arc::new(AppState::new(pool, encryption_key, job_submitter, notify_tx, config.api_key.clone()));

    let app = routes::build_router(state.clone())
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let addr: SocketAddr = config.bind_addr.parse().context("invalid bind_addr")?;
    info!("dq-server listening on http://{addr}");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

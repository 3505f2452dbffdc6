//! Shared runtime state for dq-server.
//!
//! All fields are `Clone`-able (via `Arc`); handlers receive
//! `State<Arc<AppState>>`. This module owns nothing async itself.

use std::sync::Arc;

use dq_crypto::EncryptionKey;
use dq_jobs::JobSubmitter;
use dq_notify::NotifySender;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub encryption_key: Arc<EncryptionKey>,
    pub job_submitter: JobSubmitter,
    pub notify_sender: NotifySender,
    pub build: BuildInfo,
    /// `None` disables API-key enforcement (local/dev only).
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        encryption_key: Arc<EncryptionKey>,
        job_submitter: JobSubmitter,
        notify_sender: NotifySender,
        api_key: Option<String>,
    ) -> Self {
        AppState {
            pool,
            encryption_key,
            job_submitter,
            notify_sender,
            build: BuildInfo {
                service: "dq-server",
                version: env!("CARGO_PKG_VERSION"),
            },
            api_key,
        }
    }
}

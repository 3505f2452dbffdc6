//! `dq` command-line entry point. Mirrors the platform's own direct-library-
//! call style: each subcommand reaches straight into the crate that owns the
//! behavior (`dq-db`, `dq-jobs`, `dq-server`) rather than shelling out to the
//! HTTP API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dq")]
#[command(about = "Data quality platform CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API, worker pool, scheduler, and notification dispatcher
    /// in one process (the default deployment shape).
    Serve,

    /// Run only the worker pool, scheduler, and notification dispatcher —
    /// no HTTP listener. For a deployment that splits API and execution
    /// across separate processes.
    Worker,

    /// Database maintenance commands.
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Generate a new base64-encoded ENCRYPTION_KEY for first-time setup.
    Keygen,
}

#[derive(Subcommand)]
enum DbCmd {
    Status,
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Serve => {
            let config = dq_config::AppConfig::from_env()?;
            dq_server::run(config).await?;
        }

        Commands::Worker => {
            let config = dq_config::AppConfig::from_env()?;
            run_worker_only(config).await?;
        }

        Commands::Db { cmd } => {
            let pool = dq_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = dq_db::status(&pool).await?;
                    println!("db_ok={} schema_ready={}", s.ok, s.schema_ready);
                }
                DbCmd::Migrate => {
                    dq_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::Keygen => {
            println!("{}", dq_crypto::EncryptionKey::generate());
        }
    }

    Ok(())
}

/// Same wiring as `dq_server::run`, minus the axum listener — used when the
/// API and execution tiers are deployed as separate processes.
async fn run_worker_only(config: dq_config::AppConfig) -> Result<()> {
    use std::sync::Arc;

    let pool = dq_db::connect_from_env().await?;
    dq_db::migrate(&pool).await?;

    let encryption_key = Arc::new(dq_crypto::EncryptionKey::from_base64(&config.encryption_key)?);

    let (job_submitter, job_rx) = dq_jobs::submit_channel(1024);
    let (notify_tx, notify_rx) = dq_notify::channel();

    let worker_config = dq_jobs::WorkerPoolConfig {
        concurrency: config.max_concurrent_checks,
        execution_timeout: config.check_execution_timeout(),
        ..Default::default()
    };
    let handles =
        dq_jobs::spawn_pool(pool.clone(), encryption_key, notify_tx, job_rx, worker_config);
    dq_jobs::spawn_scheduler(pool.clone(), job_submitter, config.scheduler_poll_interval());
    dq_notify::spawn_dispatcher(pool, notify_rx);

    tracing::info!("dq worker running with {} concurrent slot(s)", handles.len());
    futures_util::future::join_all(handles).await;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

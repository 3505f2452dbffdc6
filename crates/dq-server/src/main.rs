//! dq-server entry point.
//!
//! Intentionally thin: load config, hand off to `dq_server::run`. All routing
//! and state live in the library crate so `dq-cli`'s `serve` subcommand can
//! call the exact same path.

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let config = dq_config::AppConfig::from_env()?;
    dq_server::run(config).await
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_worker::cli::{Cli, Command};
use studio_worker::config::WorkerConfig;
use studio_worker::{jobs, scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = WorkerConfig::from_env()?;

    let pool = studio_db::create_pool(&config.database_url).await?;
    studio_db::health_check(&pool).await?;
    tracing::info!("Database connection established");

    match cli.command {
        Command::Once { job, date } => {
            tracing::info!(job = job.name(), ?date, "Running job once");
            jobs::run_once(&pool, &config, job, date).await?;
        }
        Command::Run => {
            let cancel = CancellationToken::new();
            let handles = scheduler::spawn_all(pool.clone(), Arc::new(config), cancel.clone());
            tracing::info!("Worker running, press Ctrl+C to stop");

            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutdown signal received");
            cancel.cancel();
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::error!(error = %e, "Job task panicked");
                }
            }
        }
    }

    pool.close().await;
    tracing::info!("Worker stopped");
    Ok(())
}

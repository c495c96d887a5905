use anyhow::Result;
use std::time::Duration;
use tracing::info;

use labtrack_api::jobs::{DueRemindersJob, JobScheduler, PoolMetricsJob};
use labtrack_api::services::email::EmailService;
use labtrack_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::metrics::init_metrics();

    info!("Starting LabTrack API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Background jobs: due-date reminders and pool metrics
    let email = EmailService::new(config.email.clone());
    let mut scheduler = JobScheduler::new();
    if config.jobs.reminders_enabled {
        scheduler.register(DueRemindersJob::new(
            pool.clone(),
            email.clone(),
            config.jobs.reminder_interval_minutes,
        ));
    }
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    scheduler.start();

    let app = app::create_app(config.clone(), pool, email)?;

    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}

//! Aedura API server binary.

use aedura_api::config::AppConfig;
use aedura_api::directory::PgUserDirectory;
use aedura_api::email::EmailClient;
use aedura_api::handlers::{create_router, AppState};
use aedura_api::service::AuthService;
use aedura_api::waitlist::{PgWaitlistStore, WaitlistService};

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!("Server failed to start: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    PgUserDirectory::run_migrations(&pool).await?;
    PgWaitlistStore::run_migrations(&pool).await?;

    let email = Arc::new(EmailClient::new(&config));
    let directory = Arc::new(PgUserDirectory::new(pool.clone()));
    let auth = Arc::new(AuthService::new(directory, config.clone())?);
    let waitlist = Arc::new(WaitlistService::new(
        Arc::new(PgWaitlistStore::new(pool)),
        email,
    ));

    let app = create_router(AppState { auth, waitlist });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Aedura API listening");
    axum::serve(listener, app).await?;

    Ok(())
}

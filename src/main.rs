use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod app_state;
mod config;
mod db;
mod error;
mod middleware;
mod modules;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv().ok();

    let env = config::init().context("Failed to load configuration")?.clone();

    let pool = db::init_pool()
        .await
        .context("Failed to initialize database pool")?;

    let state = app_state::AppState::new(pool, env.clone());
    let app = app::create_router(state);

    let addr = env.server_addr();
    info!("{} listening on {}", env.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to serve application")?;

    Ok(())
}

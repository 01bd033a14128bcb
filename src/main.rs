use tracing_subscriber::EnvFilter;

use warbler::config::Config;
use warbler::session::SessionStore;
use warbler::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = db::connect(&config.database_url).await?;
    db::prepare(&pool).await?;

    let state = AppState {
        pool,
        sessions: SessionStore::new(config.session_ttl),
    };
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_dashboard::api::router;
use study_dashboard::auth;
use study_dashboard::config::AppConfig;
use study_dashboard::crawler::HttpCrawlerClient;
use study_dashboard::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "study_dashboard=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    auth::ensure_admin_seed(&pool, &config.admin_password).await?;

    let crawler = Arc::new(HttpCrawlerClient::new(config.crawler_api_url.clone())?);
    let bind_addr = config.bind_addr.clone();

    let state = AppState {
        db: pool.clone(),
        crawler,
        config: Arc::new(config),
    };

    let app = router(state);

    info!("listening on http://{}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

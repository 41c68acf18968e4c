use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::crawler::CrawlerClient;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub crawler: Arc<dyn CrawlerClient>,
    pub config: Arc<AppConfig>,
}

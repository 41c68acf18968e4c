use std::env;
use std::path::PathBuf;

/// Process configuration, read once in `main` and injected through
/// `AppState`. Every variable has a development default.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub crawler_api_url: String,
    pub upload_dir: PathBuf,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://dashboard.db".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            crawler_api_url: env::var("CRAWLER_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads/resumes".to_string()),
            ),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
        }
    }
}

use serde::Deserialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AdminAuthRow {
    pub id: i64,
    pub password_hash: String,
    pub salt: String,
    pub hide_completed_lectures: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsPatch {
    pub hide_completed_lectures: Option<bool>,
}

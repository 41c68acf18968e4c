use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Uploaded resume metadata; the bytes live on disk under the upload dir.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: i64,
    pub file_name: String,
    pub original_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_path: String,
    pub uploaded_at: String,
}

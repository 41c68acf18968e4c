use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;

/// hash = sha256(password + salt), hex-encoded.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks a plaintext password against the stored admin credential.
pub async fn verify_password(db: &SqlitePool, password: &str) -> Result<bool, AppError> {
    let Some(admin) = repository::latest_admin(db).await? else {
        return Ok(false);
    };
    Ok(hash_password(password, &admin.salt) == admin.password_hash)
}

/// Verifies `Authorization: Bearer <password>`. Every mutating endpoint goes
/// through here.
pub async fn require_auth(db: &SqlitePool, headers: &HeaderMap) -> Result<(), AppError> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let Some(password) = header.strip_prefix("Bearer ") else {
        return Err(AppError::Unauthorized);
    };
    if verify_password(db, password).await? {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Replaces the admin credential with a freshly salted hash.
pub async fn update_admin_password(db: &SqlitePool, new_password: &str) -> Result<(), AppError> {
    let salt = Uuid::new_v4().simple().to_string();
    let password_hash = hash_password(new_password, &salt);
    repository::replace_admin(db, &password_hash, &salt).await?;
    Ok(())
}

/// Seeds the admin credential on first startup so a new install can log in.
pub async fn ensure_admin_seed(db: &SqlitePool, initial_password: &str) -> Result<(), AppError> {
    if repository::latest_admin(db).await?.is_none() {
        update_admin_password(db, initial_password).await?;
        info!("seeded initial admin credential");
    }
    Ok(())
}

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::error;

use crate::auth;
use crate::db::repository;
use crate::error::AppError;
use crate::state::AppState;

use super::parse_id;

const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub async fn list_resumes(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let resumes = repository::fetch_resumes(&state.db).await?;
    Ok(Json(json!(resumes)))
}

pub async fn get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, "resume")?;
    let resume = repository::find_resume_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("파일을 찾을 수 없습니다.".to_string()))?;
    Ok(Json(json!(resume)))
}

pub async fn upload_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let original_name = field.file_name().unwrap_or("resume").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?;
            file = Some((content_type, original_name, bytes));
            break;
        }
    }

    let Some((content_type, original_name, bytes)) = file else {
        return Err(AppError::BadRequest("파일이 제공되지 않았습니다.".to_string()));
    };

    let file_type = match content_type.as_str() {
        PDF_MIME => "pdf",
        DOCX_MIME => "docx",
        _ => {
            return Err(AppError::BadRequest(
                "PDF 또는 DOCX 파일만 업로드할 수 있습니다.".to_string(),
            ));
        }
    };
    if bytes.len() > MAX_FILE_BYTES {
        return Err(AppError::BadRequest(
            "파일 크기는 10MB를 초과할 수 없습니다.".to_string(),
        ));
    }

    // Stored name: timestamp prefix keeps crawls of the same original apart.
    let safe_name: String = original_name.replace(['/', '\\'], "_");
    let file_name = format!("{}_{}", Utc::now().timestamp_millis(), safe_name);

    tokio::fs::create_dir_all(&state.config.upload_dir).await?;
    let disk_path = state.config.upload_dir.join(&file_name);
    tokio::fs::write(&disk_path, &bytes).await?;

    let file_path = disk_path.to_string_lossy().to_string();
    let id = repository::insert_resume(
        &state.db,
        &file_name,
        &original_name,
        file_type,
        bytes.len() as i64,
        &file_path,
    )
    .await?;

    Ok(Json(json!({
        "message": "파일이 성공적으로 업로드되었습니다.",
        "file": {
            "id": id,
            "fileName": file_name,
            "originalName": original_name,
            "fileType": file_type,
            "fileSize": bytes.len(),
            "filePath": file_path,
        },
    })))
}

pub async fn delete_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;
    let id = parse_id(&id, "resume")?;

    let resume = repository::find_resume_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("파일을 찾을 수 없습니다.".to_string()))?;

    // Metadata row wins; a missing file on disk is logged, not fatal.
    if let Err(e) = tokio::fs::remove_file(&resume.file_path).await {
        error!("failed to remove resume file {}: {}", resume.file_path, e);
    }

    repository::delete_resume(&state.db, id).await?;

    Ok(Json(json!({ "message": "파일이 삭제되었습니다." })))
}

pub async fn download_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id, "resume")?;
    let resume = repository::find_resume_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("파일을 찾을 수 없습니다.".to_string()))?;

    let bytes = tokio::fs::read(&resume.file_path).await?;

    let content_type = if resume.file_type == "pdf" { PDF_MIME } else { DOCX_MIME };
    // Header values must stay ASCII; non-ASCII originals fall back to a
    // generic name.
    let filename = if resume.original_name.is_ascii()
        && !resume.original_name.contains(['"', '\\'])
    {
        resume.original_name.clone()
    } else {
        format!("resume.{}", resume.file_type)
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            ),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}

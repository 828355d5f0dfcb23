//! Handlers for the `/knowledge-share` resource.

use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use signoff_core::error::CoreError;
use signoff_core::types::DbId;
use signoff_core::upload::{allowed_extension, stored_file_name, MAX_UPLOAD_BYTES};
use signoff_db::models::knowledge_share::{CreateKnowledgeShare, KnowledgeShareWithAuthor};
use signoff_db::repositories::KnowledgeShareRepo;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct KnowledgeShareCreated {
    pub id: DbId,
    pub message: &'static str,
}

/// GET /api/v1/knowledge-share
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<KnowledgeShareWithAuthor>>> {
    let items = KnowledgeShareRepo::list_with_author(&state.pool).await?;
    Ok(Json(items))
}

/// POST /api/v1/knowledge-share
///
/// Multipart form with required `subject` and `description` text fields and
/// an optional `document` file.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<KnowledgeShareCreated>> {
    let mut subject = String::new();
    let mut description = String::new();
    let mut document: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "subject" => {
                subject = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "description" => {
                description = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "document" => {
                let Some(filename) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let extension = allowed_extension(&filename)?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if data.len() > MAX_UPLOAD_BYTES {
                    return Err(AppError::BadRequest("File too large".into()));
                }
                if !data.is_empty() {
                    document = Some((extension, data.to_vec()));
                }
            }
            _ => {}
        }
    }

    if subject.trim().is_empty() || description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Subject and description are required".into(),
        ));
    }

    let stored = match document {
        Some((extension, data)) => Some(store_document(&state, &extension, &data).await?),
        None => None,
    };

    let input = CreateKnowledgeShare {
        subject: subject.trim().to_string(),
        description: description.trim().to_string(),
        document: stored,
        user_id: auth.user_id,
    };
    let item = match KnowledgeShareRepo::create(&state.pool, &input).await {
        Ok(item) => item,
        Err(e) => {
            if let Some(name) = &input.document {
                discard_document(&state.config.upload_dir, name).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        knowledge_share_id = item.id,
        user_id = auth.user_id,
        document = ?item.document,
        "Knowledge share item created"
    );
    Ok(Json(KnowledgeShareCreated {
        id: item.id,
        message: "Knowledge share item created successfully",
    }))
}

/// GET /api/v1/knowledge-share/{id}/download
pub async fn download(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = KnowledgeShareRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Knowledge share item",
            id,
        }))?;

    // Only the final path component is trusted.
    let file_name = item
        .document
        .as_deref()
        .and_then(|d| FsPath::new(d).file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Knowledge share document",
            id,
        }))?;

    let data = match tokio::fs::read(state.config.upload_dir.join(&file_name)).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(knowledge_share_id = id, file = %file_name, "Document missing on disk");
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Knowledge share file",
                id,
            }));
        }
        Err(e) => return Err(AppError::InternalError(e.to_string())),
    };

    Ok((
        [
            (CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        data,
    ))
}

/// Remove a stored upload whose record was never written.
async fn discard_document(dir: &FsPath, name: &str) {
    if let Err(e) = tokio::fs::remove_file(dir.join(name)).await {
        tracing::warn!(file = %name, error = %e, "Failed to remove orphaned upload");
    }
}

/// Write an accepted upload into the upload directory and return its stored name.
async fn store_document(state: &AppState, extension: &str, data: &[u8]) -> AppResult<String> {
    let dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let name = stored_file_name(
        chrono::Utc::now().timestamp_millis(),
        &Uuid::new_v4().simple().to_string(),
        extension,
    );
    tokio::fs::write(dir.join(&name), data)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::debug!(file = %name, bytes = data.len(), "Stored knowledge share document");
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn discarded_document_is_removed_from_disk() {
        let dir = std::env::temp_dir().join(format!("signoff-discard-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("orphan.pdf"), b"%PDF").await.unwrap();

        discard_document(&dir, "orphan.pdf").await;

        assert!(!dir.join("orphan.pdf").exists());
        // A second attempt only logs.
        discard_document(&dir, "orphan.pdf").await;
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}

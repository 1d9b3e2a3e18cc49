//! Handlers for ticket attachments.
//!
//! Uploads are nested under a ticket (`/tickets/{id}/attachments`); reads go
//! through `/tickets/attachments/{id}/{download,view}`.

use std::io;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::Json;
use mesa_core::attachment::{
    is_inline_viewable, sanitize_filename, validate_file_with_limit, FileMeta,
};
use mesa_core::error::CoreError;
use mesa_core::types::DbId;
use mesa_db::models::attachment::{Attachment, AttachmentView, CreateAttachment};
use mesa_db::models::user::UserRef;
use mesa_db::repositories::{AttachmentRepo, UserRepo};
use serde::Serialize;

use super::tickets::load_visible_ticket;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::storage::AttachmentStorage;

/// Multipart field carrying files.
const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub attachments: Vec<AttachmentView>,
}

struct PendingFile {
    meta: FileMeta,
    bytes: Vec<u8>,
}

/// GET /api/tickets/{id}/attachments
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<Json<Vec<AttachmentView>>> {
    load_visible_ticket(&state, &user, ticket_id).await?;
    Ok(Json(
        AttachmentRepo::list_by_ticket(&state.pool, ticket_id).await?,
    ))
}

/// POST /api/tickets/{id}/attachments
///
/// Multipart form with one or more `files` fields. Every file is checked
/// before any is stored, so a bad file rejects the whole request.
pub async fn upload(
    user: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    load_visible_ticket(&state, &user, ticket_id).await?;
    if !user.permissions().can_upload_files {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot upload files".into(),
        )));
    }

    let max_files = state.config.max_files_per_upload;
    let mut pending: Vec<PendingFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        if pending.len() == max_files {
            return Err(AppError::BadRequest(format!(
                "At most {max_files} files can be uploaded at once"
            )));
        }
        let name = sanitize_filename(field.file_name().unwrap_or("file"));
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let meta = FileMeta::new(name, mime_type, bytes.len() as u64);
        validate_file_with_limit(&meta, state.config.max_upload_bytes)?;
        pending.push(PendingFile {
            meta,
            bytes: bytes.to_vec(),
        });
    }

    if pending.is_empty() {
        return Err(AppError::BadRequest(format!(
            "No files found in the '{FILES_FIELD}' field"
        )));
    }

    let uploader = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    let uploader = UserRef::from(&uploader);

    let mut attachments = Vec::with_capacity(pending.len());
    for file in pending {
        let attachment = store(&state, ticket_id, user.user_id, &file).await?;
        attachments.push(AttachmentView {
            attachment,
            uploader: uploader.clone(),
        });
    }

    tracing::info!(ticket_id, user_id = user.user_id, count = attachments.len(), "Attachments uploaded");
    Ok((StatusCode::CREATED, Json(UploadResponse { attachments })))
}

/// Write one file to disk and record it, removing the file again if the
/// insert fails.
async fn store(
    state: &AppState,
    ticket_id: DbId,
    user_id: DbId,
    file: &PendingFile,
) -> AppResult<Attachment> {
    let storage_path = AttachmentStorage::new_relative_path(ticket_id, &file.meta.name);
    state.storage.save(&storage_path, &file.bytes).await?;

    let input = CreateAttachment {
        ticket_id,
        filename: file.meta.name.clone(),
        mime_type: file.meta.mime_type.clone(),
        size_bytes: file.bytes.len() as i64,
        storage_path: storage_path.clone(),
        uploaded_by: user_id,
    };
    match AttachmentRepo::create(&state.pool, &input).await {
        Ok(attachment) => Ok(attachment),
        Err(e) => {
            if let Err(cleanup) = state.storage.remove(&storage_path).await {
                tracing::warn!(path = %storage_path, error = %cleanup, "Failed to remove orphaned upload");
            }
            Err(e.into())
        }
    }
}

/// GET /api/tickets/attachments/{id}/download
pub async fn download(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(HeaderMap, Vec<u8>)> {
    let attachment = find_visible(&state, &user, id).await?;
    let bytes = read_file(&state, &attachment).await?;
    let headers = file_headers(&attachment, "attachment")?;
    Ok((headers, bytes))
}

/// GET /api/tickets/attachments/{id}/view
///
/// Inline rendering; only images and PDFs.
pub async fn view(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(HeaderMap, Vec<u8>)> {
    let attachment = find_visible(&state, &user, id).await?;
    if !is_inline_viewable(&attachment.mime_type) {
        return Err(AppError::BadRequest(format!(
            "Files of type {} cannot be previewed; download them instead",
            attachment.mime_type
        )));
    }
    let bytes = read_file(&state, &attachment).await?;
    let headers = file_headers(&attachment, "inline")?;
    Ok((headers, bytes))
}

async fn find_visible(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Attachment> {
    let attachment = AttachmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attachment",
            id,
        }))?;
    load_visible_ticket(state, user, attachment.ticket_id).await?;
    Ok(attachment)
}

async fn read_file(state: &AppState, attachment: &Attachment) -> AppResult<Vec<u8>> {
    match state.storage.read(&attachment.storage_path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(attachment_id = attachment.id, path = %attachment.storage_path, "Attachment file missing on disk");
            Err(AppError::Core(CoreError::NotFound {
                entity: "Attachment file",
                id: attachment.id,
            }))
        }
        Err(e) => Err(e.into()),
    }
}

fn file_headers(attachment: &Attachment, disposition: &str) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&attachment.mime_type)
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);
    let value = content_disposition(disposition, &attachment.filename);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&value)
            .map_err(|e| AppError::InternalError(format!("Invalid header value: {e}")))?,
    );
    Ok(headers)
}

/// `Content-Disposition` value with an ASCII `filename` and, for non-ASCII
/// names, an RFC 5987 `filename*`.
fn content_disposition(disposition: &str, filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    if ascii == filename {
        return format!("{disposition}; filename=\"{ascii}\"");
    }
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect();
    format!("{disposition}; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

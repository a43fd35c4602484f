//! File tree handlers.
//!
//! Every handler takes the owner from the verified token; ids in paths and
//! bodies are only ever looked up within that owner's tree.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};

use crate::tree::{build_zip, Download, SqliteNodeStore, TreeService, UploadRequest};
use crate::web::dto::{
    ApiResponse, CreateFolderRequest, ListQuery, MessageResponse, NodeResponse, RenameRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Build a `Content-Disposition: attachment` value that cannot inject
/// headers. Non-ASCII names get an RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let plain = filename.is_ascii()
        && !filename
            .chars()
            .any(|c| c.is_control() || c == '"' || c == '\\');
    if plain {
        return format!("attachment; filename=\"{filename}\"");
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

fn attachment(
    content_type: &str,
    filename: &str,
    content: Vec<u8>,
) -> Result<Response<Body>, ApiError> {
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition_header(filename))
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            ApiError::internal("Failed to build response")
        })
}

/// POST /api/folder - Create a folder.
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NodeResponse>>), ApiError> {
    let store = SqliteNodeStore::new(state.db.pool());
    let node = TreeService::new(&store)
        .create_folder(user.owner(), &req.name, req.parent_id.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(node.into()))))
}

/// POST /api/file - Upload a file.
///
/// Multipart fields: `file` (required), `parent_id`/`parentId`,
/// `relative_path`/`relativePath`.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<NodeResponse>>), ApiError> {
    let mut upload = UploadRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read multipart field");
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                upload.filename = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    tracing::warn!(error = %e, "Failed to read file content");
                    ApiError::bad_request("Failed to read file")
                })?;
                upload.content = Some(bytes.to_vec());
            }
            "parent_id" | "parentId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid parent_id"))?;
                upload.parent_id = Some(text);
            }
            "relative_path" | "relativePath" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid relative_path"))?;
                upload.relative_path = Some(text);
            }
            _ => {}
        }
    }

    if upload.content.is_none() {
        return Err(ApiError::bad_request("No file uploaded"));
    }

    let store = SqliteNodeStore::new(state.db.pool());
    let node = TreeService::new(&store)
        .upload_file(user.owner(), upload)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(node.into()))))
}

/// GET /api/files - List children of a folder (root level by default).
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<NodeResponse>>>, ApiError> {
    let store = SqliteNodeStore::new(state.db.pool());
    let nodes = TreeService::new(&store)
        .list(user.owner(), query.parent_id.as_deref())
        .await?;

    Ok(Json(ApiResponse::new(
        nodes.into_iter().map(NodeResponse::from).collect(),
    )))
}

/// PUT /api/file/:id - Rename a file or folder.
pub async fn rename_node(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<RenameRequest>,
) -> Result<Json<ApiResponse<NodeResponse>>, ApiError> {
    let store = SqliteNodeStore::new(state.db.pool());
    let node = TreeService::new(&store)
        .rename(user.owner(), &id, &req.name)
        .await?;

    Ok(Json(ApiResponse::new(node.into())))
}

/// DELETE /api/file/:id - Delete a node and everything below it.
pub async fn delete_node(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let store = SqliteNodeStore::new(state.db.pool());
    TreeService::new(&store).delete(user.owner(), &id).await?;

    Ok(Json(ApiResponse::new(MessageResponse::new("Deleted successfully"))))
}

/// GET /api/download/:id - Download a file, or a folder as a zip archive.
pub async fn download(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let store = SqliteNodeStore::new(state.db.pool());
    let download = TreeService::new(&store).download(user.owner(), &id).await?;

    match download {
        Download::File { name, content } => {
            let content_type = mime_guess::from_path(&name)
                .first_or_octet_stream()
                .to_string();
            attachment(&content_type, &name, content)
        }
        Download::Archive { name, entries } => {
            let archive = tokio::task::spawn_blocking(move || build_zip(&entries))
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Archive task failed");
                    ApiError::internal("Failed to build archive")
                })??;
            attachment("application/zip", &name, archive)
        }
    }
}

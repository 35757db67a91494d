//! Image uploads for the CMS and the static route that serves them back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use mime::Mime;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::ServiceError;
use crate::http::extract::ApiPath;

pub const UPLOAD_FIELD: &str = "file";
/// Headroom for multipart boundaries and part headers above the file cap.
const ENVELOPE_BYTES: usize = 64 * 1024;

/// Accepted image types and the extension used when storing them.
const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("multipart field 'file' is required")]
    MissingFile,
    #[error("file exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("unsupported file type '{0}'; allowed: jpeg, png, webp, gif")]
    UnsupportedType(String),
    #[error("malformed upload: {0}")]
    Malformed(String),
    #[error("unable to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::MissingFile | UploadError::Malformed(_) => StatusCode::BAD_REQUEST,
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn from_multipart(err: MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge { limit }
        } else {
            UploadError::Malformed(err.body_text())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredUpload {
    pub url: String,
    pub size: usize,
    pub content_type: String,
}

/// Writes accepted images into the upload directory under generated names.
#[derive(Debug, Clone)]
pub struct UploadStore {
    directory: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(directory: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            directory: directory.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.directory.clone(), config.max_bytes)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Resolves the part's declared type, falling back to the filename when the client sent
    /// nothing useful, and checks it against the allow-list.
    pub fn accepted_type(
        &self,
        declared: Option<&str>,
        filename: Option<&str>,
    ) -> Result<(Mime, &'static str), UploadError> {
        let declared = declared
            .and_then(|value| value.parse::<Mime>().ok())
            .filter(|mime| *mime != mime::APPLICATION_OCTET_STREAM);

        let resolved = match declared {
            Some(mime) => mime,
            None => filename
                .and_then(|name| mime_guess::from_path(name).first())
                .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        };

        ALLOWED_TYPES
            .iter()
            .find(|(essence, _)| *essence == resolved.essence_str())
            .map(|(_, extension)| (resolved.clone(), *extension))
            .ok_or_else(|| UploadError::UnsupportedType(resolved.essence_str().to_string()))
    }

    pub async fn save(
        &self,
        bytes: &[u8],
        content_type: &Mime,
        extension: &str,
    ) -> Result<StoredUpload, UploadError> {
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }

        tokio::fs::create_dir_all(&self.directory).await?;
        let name = format!(
            "{}-{}.{extension}",
            Utc::now().format("%Y%m%d%H%M%S"),
            Uuid::new_v4().simple()
        );
        tokio::fs::write(self.directory.join(&name), bytes).await?;

        info!(file = %name, size = bytes.len(), "upload stored");
        Ok(StoredUpload {
            url: format!("/uploads/{name}"),
            size: bytes.len(),
            content_type: content_type.essence_str().to_string(),
        })
    }

    /// Reads a stored file. Names that could escape the upload directory are treated as missing.
    pub async fn open(&self, name: &str) -> Result<(Vec<u8>, Mime), ServiceError> {
        if !is_safe_name(name) {
            return Err(ServiceError::NotFound("file"));
        }

        let path = self.directory.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let mime = mime_guess::from_path(&path).first_or_octet_stream();
                Ok((bytes, mime))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ServiceError::NotFound("file"))
            }
            Err(err) => Err(UploadError::Io(err).into()),
        }
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}

/// `POST /api/admin/upload`. Callers wrap this router with session checks.
pub fn uploads_admin_router(store: Arc<UploadStore>) -> Router {
    let body_limit = store.max_bytes() + ENVELOPE_BYTES;
    Router::new()
        .route(
            "/api/admin/upload",
            post(upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(store)
}

/// `GET /uploads/:name` for previously stored files.
pub fn uploads_router(store: Arc<UploadStore>) -> Router {
    Router::new()
        .route("/uploads/:name", get(serve_upload))
        .with_state(store)
}

async fn upload(
    State(store): State<Arc<UploadStore>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<StoredUpload>), ServiceError> {
    let mut multipart =
        multipart.map_err(|rejection| UploadError::Malformed(rejection.body_text()))?;
    let limit = store.max_bytes();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| UploadError::from_multipart(err, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let (content_type, extension) =
            store.accepted_type(field.content_type(), field.file_name())?;
        let bytes = read_limited(field, limit).await?;
        if bytes.is_empty() {
            return Err(UploadError::MissingFile.into());
        }
        let stored = store.save(&bytes, &content_type, extension).await?;
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(UploadError::MissingFile.into())
}

async fn read_limited(mut field: Field<'_>, limit: usize) -> Result<Vec<u8>, UploadError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|err| UploadError::from_multipart(err, limit))?
    {
        if bytes.len() + chunk.len() > limit {
            return Err(UploadError::TooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn serve_upload(
    State(store): State<Arc<UploadStore>>,
    ApiPath(name): ApiPath<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let (bytes, mime) = store.open(&name).await?;
    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UploadStore {
        UploadStore::new("unused", 16)
    }

    #[test]
    fn declared_type_wins_over_filename() {
        let (mime, extension) = store()
            .accepted_type(Some("image/png"), Some("photo.jpg"))
            .expect("png allowed");
        assert_eq!(mime.essence_str(), "image/png");
        assert_eq!(extension, "png");
    }

    #[test]
    fn octet_stream_falls_back_to_filename() {
        let (mime, extension) = store()
            .accepted_type(Some("application/octet-stream"), Some("Plan.JPEG"))
            .expect("jpeg guessed");
        assert_eq!(mime.essence_str(), "image/jpeg");
        assert_eq!(extension, "jpg");
    }

    #[test]
    fn rejects_types_outside_allow_list() {
        let err = store()
            .accepted_type(Some("image/svg+xml"), Some("logo.svg"))
            .expect_err("svg rejected");
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let err = store()
            .accepted_type(None, None)
            .expect_err("unknown rejected");
        assert!(matches!(err, UploadError::UnsupportedType(_)));
    }

    #[test]
    fn unsafe_names_are_rejected() {
        assert!(is_safe_name("20250101120000-abc.png"));
        assert!(!is_safe_name("../secrets.env"));
        assert!(!is_safe_name("nested/file.png"));
        assert!(!is_safe_name("..\\file.png"));
        assert!(!is_safe_name(".hidden"));
        assert!(!is_safe_name(""));
    }

    #[tokio::test]
    async fn save_enforces_cap_and_writes_named_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = UploadStore::new(dir.path(), 8);

        let err = store
            .save(&[0u8; 9], &mime::IMAGE_PNG, "png")
            .await
            .expect_err("too large");
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let stored = store
            .save(b"GIF89a", &mime::IMAGE_GIF, "gif")
            .await
            .expect("stored");
        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.url.ends_with(".gif"));
        assert_eq!(stored.size, 6);

        let name = stored.url.trim_start_matches("/uploads/");
        let (bytes, mime) = store.open(name).await.expect("readable");
        assert_eq!(bytes, b"GIF89a");
        assert_eq!(mime.essence_str(), "image/gif");
    }
}

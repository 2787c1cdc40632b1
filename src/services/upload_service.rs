// src/services/upload_service.rs - thumbnail intake and on-disk storage
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use actix_multipart::{Field, Multipart};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use mime::Mime;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;

use crate::errors::{ApiError, ApiResult};

pub const THUMBNAIL_FIELD: &str = "thumbnail";
pub const MAX_THUMBNAIL_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;
/// Parts accepted in one post form: three text fields and a thumbnail, with room for strays.
pub const MAX_FORM_PARTS: usize = 8;
/// URL prefix (and `Post.thumbnail` prefix) under which stored files are served.
pub const PUBLIC_PREFIX: &str = "storage";

const ACCEPTED_TYPES: [&str; 2] = ["image/jpeg", "image/png"];
const MAX_NAME_ATTEMPTS: u32 = 16;

/// A thumbnail held in memory until the rest of the form has been validated.
#[derive(Debug)]
pub struct PendingUpload {
    pub original_name: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub disk_path: PathBuf,
    pub public_path: String,
}

/// Text fields of a post form plus its optional thumbnail.
#[derive(Debug, Default)]
pub struct PostForm {
    pub fields: Map<String, Value>,
    pub thumbnail: Option<PendingUpload>,
}

pub fn is_accepted_type(content_type: &Mime) -> bool {
    ACCEPTED_TYPES.contains(&content_type.essence_str())
}

/// `<ISO-8601 timestamp, colons as dashes>_<original name>`
pub fn storage_name(now: DateTime<Utc>, original_name: &str) -> String {
    candidate_name(now, original_name, 0)
}

/// Attempt `n > 0` becomes `<timestamp>-<n>_<original name>`.
fn candidate_name(now: DateTime<Utc>, original_name: &str, attempt: u32) -> String {
    let stamp = now
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace(':', "-");
    match attempt {
        0 => format!("{}_{}", stamp, sanitize_name(original_name)),
        n => format!("{}-{}_{}", stamp, n, sanitize_name(original_name)),
    }
}

fn sanitize_name(original_name: &str) -> &str {
    Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(THUMBNAIL_FIELD)
}

async fn read_limited(field: &mut Field, limit: usize, too_large: impl Fn() -> ApiError) -> ApiResult<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?;
        if buf.len() + chunk.len() > limit {
            return Err(too_large());
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn thumbnail_too_large() -> ApiError {
    ApiError::PayloadTooLarge("Thumbnail exceeds the 5 MiB limit".to_string())
}

impl PostForm {
    /// A file part may only fill the single `thumbnail` slot, and only with an accepted type.
    fn claim_thumbnail(&self, name: &str, original_name: &str, content_type: &Mime) -> ApiResult<()> {
        if name != THUMBNAIL_FIELD || self.thumbnail.is_some() {
            return Err(ApiError::Validation(format!("Unexpected field \"{}\"", name)));
        }
        if !is_accepted_type(content_type) {
            log::warn!("rejected thumbnail {} of type {}", original_name, content_type);
            return Err(ApiError::UploadRejected(
                "Only image/jpeg and image/png thumbnails are accepted".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct UploadService {
    storage_dir: PathBuf,
}

impl UploadService {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Drains a multipart body. Type and size of the thumbnail are enforced while streaming;
    /// nothing touches the disk here.
    pub async fn read_post_form(mut payload: Multipart) -> ApiResult<PostForm> {
        let mut form = PostForm::default();
        let mut parts = 0;

        while let Some(item) = payload.next().await {
            let mut field =
                item.map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?;

            parts += 1;
            if parts > MAX_FORM_PARTS {
                return Err(ApiError::PayloadTooLarge("Too many form fields".to_string()));
            }

            let name = field.name().unwrap_or_default().to_string();
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);

            match filename {
                Some(original_name) => {
                    let content_type = field
                        .content_type()
                        .cloned()
                        .unwrap_or(mime::APPLICATION_OCTET_STREAM);
                    if !original_name.is_empty() {
                        form.claim_thumbnail(&name, &original_name, &content_type)?;
                    }

                    let bytes = read_limited(&mut field, MAX_THUMBNAIL_BYTES, thumbnail_too_large).await?;

                    if original_name.is_empty() {
                        // browsers send a file input with nothing selected as filename="" and no body
                        if bytes.is_empty() {
                            continue;
                        }
                        form.claim_thumbnail(&name, &original_name, &content_type)?;
                    }

                    form.thumbnail = Some(PendingUpload {
                        original_name,
                        content_type,
                        bytes,
                    });
                }
                None => {
                    let bytes = read_limited(&mut field, MAX_TEXT_FIELD_BYTES, || {
                        ApiError::PayloadTooLarge(format!("Field \"{}\" is too large", name))
                    })
                    .await?;
                    if name == THUMBNAIL_FIELD && bytes.is_empty() {
                        continue;
                    }
                    let text = String::from_utf8(bytes).map_err(|_| {
                        ApiError::Validation(format!("\"{}\" must be a string", name))
                    })?;
                    form.fields.insert(name, Value::String(text));
                }
            }
        }

        Ok(form)
    }

    /// Writes the upload into the storage directory under a name no other file holds.
    pub async fn persist(&self, upload: PendingUpload) -> ApiResult<StoredFile> {
        self.persist_at(Utc::now(), upload).await
    }

    async fn persist_at(&self, now: DateTime<Utc>, upload: PendingUpload) -> ApiResult<StoredFile> {
        tokio::fs::create_dir_all(&self.storage_dir).await.map_err(|e| {
            log::error!("failed to create {}: {}", self.storage_dir.display(), e);
            ApiError::Internal("Failed to prepare file storage".to_string())
        })?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = candidate_name(now, &upload.original_name, attempt);
            let disk_path = self.storage_dir.join(&name);

            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&disk_path)
                .await;
            let mut file = match file {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    log::error!("failed to create {}: {}", disk_path.display(), e);
                    return Err(ApiError::Internal("Failed to save thumbnail".to_string()));
                }
            };

            let written = match file.write_all(&upload.bytes).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                log::error!("failed to write {}: {}", disk_path.display(), e);
                let _ = tokio::fs::remove_file(&disk_path).await;
                return Err(ApiError::Internal("Failed to save thumbnail".to_string()));
            }

            log::info!("stored thumbnail {} ({} bytes)", name, upload.bytes.len());
            return Ok(StoredFile {
                disk_path,
                public_path: format!("{}/{}", PUBLIC_PREFIX, name),
            });
        }

        log::error!(
            "no free storage name for {} after {} attempts",
            upload.original_name, MAX_NAME_ATTEMPTS
        );
        Err(ApiError::Internal("Failed to save thumbnail".to_string()))
    }

    pub async fn discard(&self, stored: &StoredFile) {
        if let Err(e) = tokio::fs::remove_file(&stored.disk_path).await {
            log::warn!("failed to remove {}: {}", stored.disk_path.display(), e);
        }
    }

    /// Maps a public `storage/<name>` path back to the file on disk.
    pub fn locate(&self, public_path: &str) -> Option<StoredFile> {
        let name = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        self.resolve(name).map(|disk_path| StoredFile {
            disk_path,
            public_path: public_path.to_string(),
        })
    }

    /// Disk path for a stored file name. Anything that is not a bare file name is refused.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let safe = Path::new(filename).file_name()?.to_str()?;
        (safe == filename).then(|| self.storage_dir.join(safe))
    }
}

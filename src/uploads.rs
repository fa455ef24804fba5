use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use axum::http::HeaderMap;
use bytes::Bytes;
use chrono::NaiveDate;
use regex::Regex;
use uuid::Uuid;

static UNSAFE_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// A parsed `multipart/form-data` body: text fields plus any file parts.
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(|s| s.trim()).unwrap_or("")
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Parse multipart form data using multer.
pub async fn parse_multipart(headers: &HeaderMap, body: Bytes) -> Result<MultipartForm, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = HashMap::new();
    let mut files = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let name = field.name().unwrap_or("unknown").to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("File read error: {e}"))?;
                files.insert(name, UploadedFile { file_name, data });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| format!("Field read error: {e}"))?;
                fields.insert(name, value);
            }
        }
    }

    Ok(MultipartForm { fields, files })
}

/// Strip directories and anything outside `[A-Za-z0-9._-]` from a client-supplied name.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned = UNSAFE_FILENAME_RE.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Write `file` under `{root}/{category}/` and return its public path `/{category}/{name}`.
pub async fn store(root: &Path, category: &str, file: &UploadedFile) -> Result<String, String> {
    let dir = root.join(category);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;

    let stored_name = format!("{}-{}", Uuid::now_v7(), sanitize_file_name(&file.file_name));
    let path = dir.join(&stored_name);
    tokio::fs::write(&path, &file.data)
        .await
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;

    tracing::info!("Saved upload {}", path.display());
    Ok(format!("/{category}/{stored_name}"))
}

/// Remove a file previously written by [`store`], given its public path.
pub async fn discard(root: &Path, public_path: &str) {
    let path = root.join(public_path.trim_start_matches('/'));
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("Failed to remove orphaned upload {}: {e}", path.display());
    }
}

/// `2026-10-17` -> `Sat Oct 17 2026`, the display form content dates are stored in.
pub fn display_date(raw: &str) -> Result<String, String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{raw}', expected YYYY-MM-DD"))?;
    Ok(date.format("%a %b %d %Y").to_string())
}

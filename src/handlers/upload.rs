//! POST /api/upload: validate an image and store it under a fresh, collision-resistant name.

use crate::error::AppError;
use crate::extractors::Guard;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use rand::Rng;
use regex::Regex;
use serde::Serialize;

pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
pub const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];
pub const DEFAULT_FOLDER: &str = "products";

const TOKEN_LEN: usize = 11;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
    pub success: bool,
    pub url: String,
    pub path: String,
    pub file_name: String,
}

struct UploadedFile {
    name: String,
    content_type: String,
    bytes: Bytes,
}

fn base36_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Extension of the client's file name, falling back to the one implied by the MIME type.
fn extension(file_name: &str, content_type: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => match content_type {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
        .to_string(),
    }
}

/// `{millis}_{base36 token}.{ext}`
pub fn object_name(file_name: &str, content_type: &str, millis: i64) -> String {
    format!(
        "{}_{}.{}",
        millis,
        base36_token(TOKEN_LEN),
        extension(file_name, content_type)
    )
}

/// Folder segments of letters, digits, `-` and `_`; blank means the default folder.
pub fn normalize_folder(raw: Option<&str>) -> Result<String, AppError> {
    let folder = raw.map(|f| f.trim().trim_matches('/')).unwrap_or("");
    if folder.is_empty() {
        return Ok(DEFAULT_FOLDER.to_string());
    }
    let re = Regex::new(r"^[A-Za-z0-9_\-]+(/[A-Za-z0-9_\-]+)*$")
        .map_err(|_| AppError::validation("invalid pattern for folder"))?;
    if !re.is_match(folder) {
        return Err(AppError::validation("invalid folder"));
    }
    Ok(folder.to_string())
}

fn validate(file: &UploadedFile) -> Result<(), AppError> {
    if !ALLOWED_TYPES.contains(&file.content_type.as_str()) {
        return Err(AppError::validation(
            "unsupported file type, only JPG/PNG/WEBP are allowed",
        ));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::validation("file size must not exceed 2MB"));
    }
    Ok(())
}

pub async fn upload(
    _guard: Guard,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadBody>, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut folder: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(|e| AppError::validation(e.body_text()))?;
                file = Some(UploadedFile {
                    name,
                    content_type,
                    bytes,
                });
            }
            "folder" => {
                folder = Some(field.text().await.map_err(|e| AppError::validation(e.body_text()))?);
            }
            _ => {}
        }
    }
    let file = file.ok_or_else(|| AppError::validation("no file provided"))?;
    validate(&file)?;
    let folder = normalize_folder(folder.as_deref())?;

    let file_name = object_name(&file.name, &file.content_type, chrono::Utc::now().timestamp_millis());
    let path = format!("{}/{}", folder, file_name);
    state
        .storage
        .put_new(&path, file.bytes, &file.content_type)
        .await?;
    tracing::info!(path = %path, "image uploaded");
    Ok(Json(UploadBody {
        success: true,
        url: state.storage.public_url(&path),
        path,
        file_name,
    }))
}

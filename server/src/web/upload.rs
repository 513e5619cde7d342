// server/src/web/upload.rs

//! Order submissions arrive either as JSON or as multipart forms carrying
//! text fields plus image files. Both become the same request DTO.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest};
use futures_util::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{AppError, Result};

/// Upper bound for JSON bodies and for each uploaded file.
pub const MAX_BODY_BYTES: usize = 256 * 1024;
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "heic"];

/// Public path under which stored uploads are served.
pub fn public_path(file_name: &str) -> String {
  format!("/uploads/{file_name}")
}

/// Reads a create-order body into `T`, storing at most `max_images` images
/// in `upload_dir`. Returns the request and the public paths of the images.
pub async fn read_submission<T: DeserializeOwned>(
  req: &HttpRequest,
  payload: web::Payload,
  upload_dir: &Path,
  max_images: usize,
) -> Result<(T, Vec<String>)> {
  let is_multipart = req
    .headers()
    .get(actix_web::http::header::CONTENT_TYPE)
    .and_then(|h| h.to_str().ok())
    .is_some_and(|ct| ct.starts_with("multipart/form-data"));

  if is_multipart {
    read_multipart(Multipart::new(req.headers(), payload), upload_dir, max_images).await
  } else {
    let body = read_body(payload).await?;
    let request = serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
    Ok((request, Vec::new()))
  }
}

async fn read_body(mut payload: web::Payload) -> Result<web::BytesMut> {
  let mut body = web::BytesMut::new();
  while let Some(chunk) = payload.next().await {
    let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Unreadable body: {e}")))?;
    if body.len() + chunk.len() > MAX_BODY_BYTES {
      return Err(AppError::BadRequest("Request body too large".to_string()));
    }
    body.extend_from_slice(&chunk);
  }
  Ok(body)
}

async fn read_multipart<T: DeserializeOwned>(
  mut multipart: Multipart,
  upload_dir: &Path,
  max_images: usize,
) -> Result<(T, Vec<String>)> {
  let mut fields = Map::new();
  let mut images = Vec::new();

  while let Some(mut field) = multipart.try_next().await.map_err(multipart_err)? {
    let (name, file_name) = match field.content_disposition() {
      Some(cd) => (
        cd.get_name().unwrap_or_default().to_string(),
        cd.get_filename().map(str::to_string),
      ),
      None => continue,
    };

    let Some(file_name) = file_name else {
      let mut value = Vec::new();
      while let Some(chunk) = field.try_next().await.map_err(multipart_err)? {
        if value.len() + chunk.len() > MAX_BODY_BYTES {
          return Err(AppError::BadRequest(format!("Field '{name}' is too large")));
        }
        value.extend_from_slice(&chunk);
      }
      fields.insert(name, Value::String(String::from_utf8_lossy(&value).into_owned()));
      continue;
    };

    // Browsers send an empty file part when no file was chosen.
    if file_name.is_empty() {
      while field.try_next().await.map_err(multipart_err)?.is_some() {}
      continue;
    }
    if images.len() >= max_images {
      return Err(AppError::validation(&name, format!("at most {max_images} image(s) are accepted")));
    }
    if let Some(mime) = field.content_type() {
      if mime.type_().as_str() != "image" {
        return Err(AppError::validation(&name, "only image files are accepted"));
      }
    }

    let stored = format!("{}.{}", Uuid::new_v4(), extension(&file_name));
    tokio::fs::create_dir_all(upload_dir)
      .await
      .map_err(|e| AppError::Internal(format!("upload directory unavailable: {e}")))?;
    let path = upload_dir.join(&stored);
    let mut file = tokio::fs::File::create(&path)
      .await
      .map_err(|e| AppError::Internal(format!("could not store upload: {e}")))?;
    let mut written = 0usize;
    while let Some(chunk) = field.try_next().await.map_err(multipart_err)? {
      written += chunk.len();
      if written > MAX_IMAGE_BYTES {
        drop(file);
        let _ = tokio::fs::remove_file(&path).await;
        return Err(AppError::validation(&name, "image is larger than 10 MB"));
      }
      file
        .write_all(&chunk)
        .await
        .map_err(|e| AppError::Internal(format!("could not store upload: {e}")))?;
    }
    file
      .flush()
      .await
      .map_err(|e| AppError::Internal(format!("could not store upload: {e}")))?;
    debug!(field = %name, bytes = written, file = %stored, "Upload stored.");
    images.push(public_path(&stored));
  }

  if !images.is_empty() {
    info!(count = images.len(), "Order images stored.");
  }
  let request = serde_json::from_value(Value::Object(fields))
    .map_err(|e| AppError::BadRequest(format!("Invalid form fields: {e}")))?;
  Ok((request, images))
}

fn multipart_err(e: actix_multipart::MultipartError) -> AppError {
  AppError::BadRequest(format!("Malformed multipart body: {e}"))
}

/// Lower-cased image extension of `file_name`, `jpg` when unknown.
fn extension(file_name: &str) -> String {
  Path::new(file_name)
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase)
    .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
    .unwrap_or_else(|| "jpg".to_string())
}

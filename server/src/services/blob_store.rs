// server/src/services/blob_store.rs

//! Where uploaded files (rider licences) end up.

use crate::errors::AppError;
use anyhow::{bail, Context};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[async_trait]
pub trait BlobStore: Send + Sync {
  /// Stores `bytes` under `key` (a relative, `/`-separated path) and returns
  /// the URL the file is reachable under.
  async fn put(&self, key: &str, bytes: Vec<u8>) -> anyhow::Result<String>;

  async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
}

fn check_key(key: &str) -> anyhow::Result<()> {
  let path = Path::new(key);
  if key.is_empty() || !path.components().all(|c| matches!(c, Component::Normal(_))) {
    bail!("invalid blob key '{}'", key);
  }
  Ok(())
}

/// Files under a root directory, served as `/uploads/<key>`.
pub struct LocalDiskBlobStore {
  root: PathBuf,
}

impl LocalDiskBlobStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

#[async_trait]
impl BlobStore for LocalDiskBlobStore {
  #[instrument(name = "blob_store::put", skip(self, bytes), fields(size = bytes.len()))]
  async fn put(&self, key: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
    check_key(key)?;
    let path = self.root.join(key);
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(&path, bytes)
      .await
      .with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "Blob written.");
    Ok(format!("/uploads/{}", key))
  }

  async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
    check_key(key)?;
    match tokio::fs::read(self.root.join(key)).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e).with_context(|| format!("reading blob '{}'", key)),
    }
  }
}

#[derive(Default)]
pub struct MemoryBlobStore {
  blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.blobs.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.blobs.lock().is_empty()
  }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
  async fn put(&self, key: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
    check_key(key)?;
    self.blobs.lock().insert(key.to_string(), bytes);
    Ok(format!("/uploads/{}", key))
  }

  async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(self.blobs.lock().get(key).cloned())
  }
}

/// A decoded upload and the file extension its content calls for.
#[derive(Debug, PartialEq, Eq)]
pub struct Upload {
  pub bytes: Vec<u8>,
  pub extension: &'static str,
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
  match mime {
    "image/png" => Some("png"),
    "image/jpeg" | "image/jpg" => Some("jpg"),
    "image/webp" => Some("webp"),
    "application/pdf" => Some("pdf"),
    _ => None,
  }
}

fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
  if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
    Some("png")
  } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
    Some("jpg")
  } else if bytes.starts_with(b"%PDF") {
    Some("pdf")
  } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
    Some("webp")
  } else {
    None
  }
}

/// Decodes a base64 upload, plain or as a `data:<mime>;base64,` URL. Only
/// images and PDFs up to [`MAX_UPLOAD_BYTES`] are accepted.
pub fn decode_upload(raw: &str) -> Result<Upload, AppError> {
  let raw = raw.trim();
  let (declared, payload) = match raw.strip_prefix("data:") {
    Some(rest) => {
      let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::Validation("Malformed data URL in upload.".to_string()))?;
      let mime = meta.strip_suffix(";base64").ok_or_else(|| {
        AppError::Validation("Uploads must be base64 encoded.".to_string())
      })?;
      (Some(mime.to_ascii_lowercase()), payload)
    }
    None => (None, raw),
  };

  let bytes = general_purpose::STANDARD
    .decode(payload)
    .map_err(|_| AppError::Validation("Upload is not valid base64.".to_string()))?;
  if bytes.is_empty() {
    return Err(AppError::Validation("Upload is empty.".to_string()));
  }
  if bytes.len() > MAX_UPLOAD_BYTES {
    return Err(AppError::Validation(format!(
      "Upload exceeds the {} MB limit.",
      MAX_UPLOAD_BYTES / (1024 * 1024)
    )));
  }

  let extension = match declared.as_deref() {
    Some(mime) => extension_for_mime(mime),
    None => sniff_extension(&bytes),
  }
  .ok_or_else(|| AppError::Validation("Only PNG, JPEG, WebP or PDF uploads are accepted.".to_string()))?;

  Ok(Upload { bytes, extension })
}

#[cfg(test)]
mod tests {
  use super::*;

  const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

  #[test]
  fn plain_base64_is_sniffed() {
    let encoded = general_purpose::STANDARD.encode(PNG_HEADER);
    let upload = decode_upload(&encoded).unwrap();
    assert_eq!(upload.extension, "png");
    assert_eq!(upload.bytes, PNG_HEADER);
  }

  #[test]
  fn data_url_uses_declared_type() {
    let encoded = format!("data:application/pdf;base64,{}", general_purpose::STANDARD.encode(b"%PDF-1.7"));
    assert_eq!(decode_upload(&encoded).unwrap().extension, "pdf");
  }

  #[test]
  fn unknown_content_is_rejected() {
    let encoded = general_purpose::STANDARD.encode(b"just some text");
    assert!(matches!(decode_upload(&encoded), Err(AppError::Validation(_))));
    assert!(matches!(decode_upload("%%%"), Err(AppError::Validation(_))));
  }

  #[tokio::test]
  async fn keys_cannot_escape_the_root() {
    let store = MemoryBlobStore::new();
    assert!(store.put("../etc/passwd", vec![1]).await.is_err());
    assert!(store.put("/abs", vec![1]).await.is_err());
    let url = store.put("licenses/a.png", vec![1, 2]).await.unwrap();
    assert_eq!(url, "/uploads/licenses/a.png");
    assert_eq!(store.get("licenses/a.png").await.unwrap(), Some(vec![1, 2]));
  }
}

//! Disk-backed asset store — the stand-in for an external media host.
//!
//! Handlers see a two-phase capability: upload the asset, then mutate the
//! record that references it. Replacement uploads the new object first and
//! deletes the old one afterwards, so a failed upload can never lose the
//! only copy; the worst case is a temporarily orphaned old object.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AssetError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("asset url not served by this host: {0}")]
  ForeignUrl(String),
}

pub type Result<T, E = AssetError> = std::result::Result<T, E>;

/// Stores uploaded bytes under a media root and hands out public URLs.
///
/// Files are named by fresh UUIDs (original extension kept), so an upload
/// can never clobber an existing asset and URLs carry no caller input.
#[derive(Debug, Clone)]
pub struct AssetStore {
  root:     PathBuf,
  base_url: String,
}

impl AssetStore {
  /// `base_url` is the public prefix the router serves `root` under,
  /// e.g. `http://localhost:8000/media`.
  pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
    let mut base_url = base_url.into();
    while base_url.ends_with('/') {
      base_url.pop();
    }
    Self { root: root.into(), base_url }
  }

  /// Create the media root if it does not exist yet.
  pub async fn ensure_root(&self) -> Result<()> {
    tokio::fs::create_dir_all(&self.root).await?;
    Ok(())
  }

  /// Persist `bytes` and return the public URL. A failed write leaves no
  /// partial file behind.
  pub async fn store(&self, original_name: &str, bytes: Bytes) -> Result<String> {
    let ext = Path::new(original_name)
      .extension()
      .map(|e| format!(".{}", e.to_string_lossy()))
      .unwrap_or_default();
    let file_name = format!("{}{ext}", Uuid::new_v4());
    let path = self.root.join(&file_name);

    if let Err(e) = tokio::fs::write(&path, &bytes).await {
      let _ = tokio::fs::remove_file(&path).await;
      return Err(e.into());
    }

    Ok(format!("{}/{file_name}", self.base_url))
  }

  /// Delete the object behind `url`. Missing files are fine — the caller
  /// only cares that the object is gone.
  pub async fn delete(&self, url: &str) -> Result<()> {
    let prefix = format!("{}/", self.base_url);
    let file_name = url
      .strip_prefix(&prefix)
      .ok_or_else(|| AssetError::ForeignUrl(url.to_owned()))?;

    // URLs are minted by `store`, so anything with a path separator in the
    // remainder was not one of ours.
    if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
      return Err(AssetError::ForeignUrl(url.to_owned()));
    }

    match tokio::fs::remove_file(self.root.join(file_name)).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }

  /// Upload a replacement, then drop the old object best-effort. Returns
  /// the new URL. The record update referencing the new URL is the
  /// caller's second phase.
  pub async fn replace(
    &self,
    old_url: &str,
    original_name: &str,
    bytes: Bytes,
  ) -> Result<String> {
    let new_url = self.store(original_name, bytes).await?;
    if let Err(e) = self.delete(old_url).await {
      tracing::warn!(url = old_url, error = %e, "failed to delete replaced asset");
    }
    Ok(new_url)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn assets() -> (tempfile::TempDir, AssetStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = AssetStore::new(dir.path(), "http://media.test/media/");
    (dir, store)
  }

  #[tokio::test]
  async fn store_keeps_extension_and_serves_under_base_url() {
    let (_dir, assets) = assets();
    let url = assets
      .store("cat.png", Bytes::from_static(b"img"))
      .await
      .unwrap();
    assert!(url.starts_with("http://media.test/media/"), "{url}");
    assert!(url.ends_with(".png"), "{url}");
  }

  #[tokio::test]
  async fn delete_removes_the_file_and_tolerates_repeats() {
    let (dir, assets) = assets();
    let url = assets
      .store("cat.png", Bytes::from_static(b"img"))
      .await
      .unwrap();

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    assets.delete(&url).await.unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assets.delete(&url).await.unwrap();
  }

  #[tokio::test]
  async fn delete_rejects_foreign_urls() {
    let (_dir, assets) = assets();
    assert!(assets.delete("http://elsewhere.test/x.png").await.is_err());
    assert!(
      assets
        .delete("http://media.test/media/../../etc/passwd")
        .await
        .is_err()
    );
  }

  #[tokio::test]
  async fn replace_uploads_before_deleting() {
    let (dir, assets) = assets();
    let old = assets
      .store("a.png", Bytes::from_static(b"old"))
      .await
      .unwrap();

    let new = assets
      .replace(&old, "b.png", Bytes::from_static(b"new"))
      .await
      .unwrap();

    assert_ne!(old, new);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
  }
}

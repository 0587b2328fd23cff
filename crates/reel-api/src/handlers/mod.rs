//! Request handlers, one module per resource.

pub mod comments;
pub mod dashboard;
pub mod health;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path id, reporting a clean 400 for anything malformed.
pub(crate) fn parse_id(s: &str, what: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(s).map_err(|_| ApiError::BadRequest(format!("invalid {what} id")))
}

/// Require a non-blank text field; returns the trimmed value.
pub(crate) fn require_text(
  value: Option<String>,
  what: &str,
) -> Result<String, ApiError> {
  match value {
    Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
    _ => Err(ApiError::BadRequest(format!("{what} is required"))),
  }
}

/// Typed owner comparison; authenticated-but-not-owner is 403.
pub(crate) fn ensure_owner(
  owner_id: Uuid,
  actor_id: Uuid,
  what: &str,
) -> Result<(), ApiError> {
  if owner_id != actor_id {
    return Err(ApiError::Forbidden(format!("you do not own this {what}")));
  }
  Ok(())
}

/// An uploaded file part: original filename plus its bytes.
pub(crate) type FilePart = (String, Bytes);

/// A fully-drained multipart body. Field names are normalised to
/// snake_case so clients may send either `cover_image` or `coverImage`.
#[derive(Default)]
pub(crate) struct FormData {
  texts: HashMap<String, String>,
  files: HashMap<String, FilePart>,
}

impl FormData {
  pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
    let mut form = Self::default();

    while let Some(field) = multipart
      .next_field()
      .await
      .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
      let name = snake_name(field.name().unwrap_or_default());
      if name.is_empty() {
        continue;
      }

      if let Some(file_name) = field.file_name() {
        let file_name = file_name.to_owned();
        let bytes = field
          .bytes()
          .await
          .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
        form.files.insert(name, (file_name, bytes));
      } else {
        let text = field
          .text()
          .await
          .map_err(|e| ApiError::BadRequest(format!("failed to read field: {e}")))?;
        form.texts.insert(name, text);
      }
    }

    Ok(form)
  }

  pub fn text(&self, name: &str) -> Option<String> {
    self.texts.get(name).cloned()
  }

  pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
    self.files.remove(name)
  }

  pub fn require_file(&mut self, name: &str) -> Result<FilePart, ApiError> {
    self
      .take_file(name)
      .ok_or_else(|| ApiError::BadRequest(format!("{name} file is required")))
  }
}

/// `coverImage` → `cover_image`; snake_case input passes through.
fn snake_name(name: &str) -> String {
  let mut out = String::with_capacity(name.len() + 2);
  for c in name.chars() {
    if c.is_ascii_uppercase() {
      out.push('_');
      out.push(c.to_ascii_lowercase());
    } else {
      out.push(c);
    }
  }
  out
}

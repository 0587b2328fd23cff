//! Pagination and listing-query types.
//!
//! Sort keys are an allow-list: a caller-supplied key is parsed into
//! [`VideoSortKey`] before any query is built, and anything unrecognised is
//! rejected up front. Raw caller strings never reach the storage layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Page request ────────────────────────────────────────────────────────────

/// A validated page request: both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  page:  u32,
  limit: u32,
}

/// Upper bound on page size; larger requests are clamped rather than failed.
pub const MAX_PAGE_LIMIT: u32 = 100;

impl PageRequest {
  pub fn new(page: u32, limit: u32) -> Result<Self> {
    if page < 1 || limit < 1 {
      return Err(Error::InvalidPage);
    }
    Ok(Self { page, limit: limit.min(MAX_PAGE_LIMIT) })
  }

  pub fn page(self) -> u32 { self.page }

  pub fn limit(self) -> u32 { self.limit }

  /// Row offset of the first item on this page.
  pub fn offset(self) -> u64 { u64::from(self.page - 1) * u64::from(self.limit) }
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: 1, limit: 10 } }
}

// ─── Page of results ─────────────────────────────────────────────────────────

/// One page of results plus the metadata a client needs to paginate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  pub total:       u64,
  pub page:        u32,
  pub limit:       u32,
  pub total_pages: u64,
  pub has_next:    bool,
  pub has_prev:    bool,
}

impl<T> Page<T> {
  /// Assemble a page from the fetched slice and the total matching count.
  pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
    let total_pages = total.div_ceil(u64::from(request.limit()));
    Self {
      items,
      total,
      page: request.page(),
      limit: request.limit(),
      total_pages,
      has_next: u64::from(request.page()) < total_pages,
      has_prev: request.page() > 1,
    }
  }
}

// ─── Sort allow-list ─────────────────────────────────────────────────────────

/// The sortable video fields. Parsed from caller input; never interpolated
/// from a raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSortKey {
  #[default]
  CreatedAt,
  Views,
  Duration,
  Title,
}

impl VideoSortKey {
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "created_at" => Ok(Self::CreatedAt),
      "views" => Ok(Self::Views),
      "duration" => Ok(Self::Duration),
      "title" => Ok(Self::Title),
      other => Err(Error::UnknownSortKey(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
  Asc,
  #[default]
  Desc,
}

impl SortDirection {
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "asc" => Ok(Self::Asc),
      "desc" => Ok(Self::Desc),
      other => Err(Error::UnknownSortDirection(other.to_owned())),
    }
  }
}

// ─── Listing query ───────────────────────────────────────────────────────────

/// Parameters for [`crate::store::MediaStore::list_videos`].
#[derive(Debug, Clone, Default)]
pub struct VideoQuery {
  /// Case-insensitive unanchored substring match over title and
  /// description. No relevance ranking.
  pub text:      Option<String>,
  /// Restrict to one owner's videos.
  pub owner_id:  Option<Uuid>,
  pub sort_key:  VideoSortKey,
  pub direction: SortDirection,
  pub page:      PageRequest,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_request_rejects_zero() {
    assert!(PageRequest::new(0, 10).is_err());
    assert!(PageRequest::new(1, 0).is_err());
    assert!(PageRequest::new(1, 1).is_ok());
  }

  #[test]
  fn page_request_clamps_limit() {
    let req = PageRequest::new(1, 10_000).unwrap();
    assert_eq!(req.limit(), MAX_PAGE_LIMIT);
  }

  #[test]
  fn offset_skips_prior_pages() {
    let req = PageRequest::new(3, 10).unwrap();
    assert_eq!(req.offset(), 20);
  }

  #[test]
  fn page_metadata() {
    let req = PageRequest::new(2, 10).unwrap();
    let page = Page::new(vec![0u8; 10], 25, req);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next);
    assert!(page.has_prev);

    let last = Page::new(vec![0u8; 5], 25, PageRequest::new(3, 10).unwrap());
    assert!(!last.has_next);
  }

  #[test]
  fn sort_key_allow_list() {
    assert_eq!(VideoSortKey::parse("views").unwrap(), VideoSortKey::Views);
    assert!(VideoSortKey::parse("views; DROP TABLE videos").is_err());
    assert!(VideoSortKey::parse("owner_id").is_err());
  }
}

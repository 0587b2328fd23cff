//! Error types for `reel-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown sort key: {0:?}")]
  UnknownSortKey(String),

  #[error("unknown sort direction: {0:?}")]
  UnknownSortDirection(String),

  #[error("page and limit must both be at least 1")]
  InvalidPage,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

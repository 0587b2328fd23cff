//! Core types and trait definitions for the Reel video platform.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// Async trait methods are written against return-position impl Trait;
// suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod comment;
pub mod error;
pub mod page;
pub mod playlist;
pub mod relation;
pub mod store;
pub mod tweet;
pub mod user;
pub mod video;

pub use error::{Error, Result};

//! Core types and trait definitions for the Showcase submission portal.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! document store and the object store are reached only through the
//! [`store::PortalStore`] and [`blob::BlobStore`] traits; every operation the
//! portal offers is a plain async function generic over those two seams.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod accounts;
pub mod application;
pub mod blob;
pub mod error;
pub mod lifecycle;
pub mod picker;
pub mod profile;
pub mod session;
pub mod store;
pub mod submission;
pub mod tag;
pub mod upload;
pub mod validate;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;

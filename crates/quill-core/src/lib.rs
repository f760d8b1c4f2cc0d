//! Core types and trait definitions for the Quill notes service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod account;
pub mod error;
pub mod note;
pub mod store;

pub use error::{Error, Result};

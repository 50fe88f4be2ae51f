//! Framestore - stores base64 data-URI images on disk behind a small HTTP API
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod images;
pub mod server;

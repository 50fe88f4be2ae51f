//! Image storage module.
//!
//! Persists decoded data-URI images as flat files and reads them back for
//! listing and retrieval.

mod storage;

pub use storage::{ImageStore, StoredImage};

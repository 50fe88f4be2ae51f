//! framestore-core: shared error type and the image data-URI codec.
//!
//! The server crate depends on this for the [`Error`] taxonomy that maps onto
//! HTTP statuses and for parsing/encoding `data:image/...;base64,` strings.

pub mod data_uri;
pub mod error;

// Re-export the most commonly used items at the crate root.
pub use data_uri::{DataUri, ImageFormat};
pub use error::{Error, Result};

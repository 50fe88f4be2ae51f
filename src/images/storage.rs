//! Filesystem-level image storage.
//!
//! Images live as flat files in a single directory. The directory listing is
//! the index: there is no metadata database, and any file with a recognized
//! image extension counts as a stored image.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use framestore_core::{DataUri, Error, ImageFormat, Result};

/// An image read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Name of the file inside the storage directory.
    pub filename: String,
    /// Text after the last `.` in the filename, case preserved. Empty when
    /// the name has no extension.
    pub format: String,
    /// Raw file content.
    pub data: Vec<u8>,
}

impl StoredImage {
    /// Re-encode the content as a `data:image/<format>;base64,` URI.
    pub fn to_data_uri(&self) -> DataUri {
        DataUri::from_bytes(self.format.clone(), &self.data)
    }
}

/// Filesystem manager for uploaded images.
///
/// Filenames follow `frame-<unix millis>-<counter>.<format>`. The counter is
/// owned by the store, starts at zero and is never persisted, so names are
/// unique for the lifetime of one store instance.
#[derive(Debug)]
pub struct ImageStore {
    base_dir: PathBuf,
    counter: AtomicU64,
}

impl ImageStore {
    /// Open the store, creating the directory (and any parents) if needed.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        tracing::info!("Image storage directory: {}", base_dir.display());

        Ok(Self {
            base_dir,
            counter: AtomicU64::new(0),
        })
    }

    /// Directory images are stored in.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Produce the next filename for an image of the given format.
    ///
    /// Every call consumes one counter value, so two calls within the same
    /// millisecond still yield different names.
    pub fn generate_filename(&self, format: &str) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis();
        format!("frame-{millis}-{seq}.{format}")
    }

    /// Decode a data URI and write it under a freshly generated name.
    ///
    /// # Returns
    ///
    /// The filename the image was stored as.
    pub async fn store(&self, image: &DataUri) -> Result<String> {
        let data = image.decode_payload();
        let filename = self.generate_filename(&image.format);
        let path = self.base_dir.join(&filename);

        tokio::fs::write(&path, &data).await?;

        tracing::debug!(filename = %filename, bytes = data.len(), "Stored image");
        Ok(filename)
    }

    /// List stored image filenames in directory order.
    ///
    /// Only names ending in `.png`, `.jpg` or `.jpeg` (case-sensitive) are
    /// returned. Names that are not valid UTF-8 are skipped.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.base_dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if ImageFormat::from_filename(&name).is_some() {
                names.push(name);
            }
        }

        tracing::debug!(count = names.len(), "Listed images");
        Ok(names)
    }

    /// Read a stored image by filename.
    ///
    /// Names that cannot refer to a file directly inside the storage
    /// directory are reported as not found.
    pub async fn read(&self, filename: &str) -> Result<StoredImage> {
        if !is_plain_filename(filename) {
            return Err(Error::not_found(filename));
        }

        let path = self.base_dir.join(filename);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(filename));
            }
            Err(e) => return Err(Error::storage(e)),
        };

        let format = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string();

        tracing::debug!(filename = %filename, bytes = data.len(), "Read image");
        Ok(StoredImage {
            filename: filename.to_string(),
            format,
            data,
        })
    }
}

/// True when `name` is a single path component with no directory parts.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

//! `data:image/<format>;base64,<payload>` codec and the recognized image
//! extensions.

use std::fmt;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::error::{Error, Result, INVALID_IMAGE_DATA};

const PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// Decoder for payloads that have already been stripped of padding and
/// foreign characters.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Image extensions that count as stored images when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpg,
    Jpeg,
}

impl ImageFormat {
    /// Returns the file extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
        }
    }

    /// Returns all recognized formats.
    pub fn all() -> &'static [ImageFormat] {
        &[ImageFormat::Png, ImageFormat::Jpg, ImageFormat::Jpeg]
    }

    /// Match a filename against the recognized extensions.
    ///
    /// The check is case-sensitive: `a.PNG` is not an image.
    pub fn from_filename(name: &str) -> Option<ImageFormat> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::all().iter().copied().find(|f| f.extension() == ext)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A parsed image data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared image type, e.g. `png` or `jpeg`.
    pub format: String,
    /// Base64 text following the `;base64,` marker, untouched.
    pub payload: String,
}

impl DataUri {
    /// Parse a `data:image/<format>;base64,<payload>` string.
    ///
    /// `<format>` must be one or more ASCII word characters. The payload is
    /// not inspected here.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || Error::Validation(INVALID_IMAGE_DATA.into());

        let rest = input.strip_prefix(PREFIX).ok_or_else(invalid)?;
        let (format, payload) = rest.split_once(BASE64_MARKER).ok_or_else(invalid)?;

        if format.is_empty() || !format.chars().all(is_word_char) {
            return Err(invalid());
        }

        Ok(Self {
            format: format.to_string(),
            payload: payload.to_string(),
        })
    }

    /// Build a data URI from raw bytes.
    pub fn from_bytes(format: impl Into<String>, data: &[u8]) -> Self {
        Self {
            format: format.into(),
            payload: STANDARD.encode(data),
        }
    }

    /// Decode the payload into raw bytes.
    ///
    /// Decoding never fails. Characters outside the base64 alphabet are
    /// skipped, URL-safe `-` and `_` are read as `+` and `/`, the first `=`
    /// ends the payload, and a lone trailing character that cannot form a
    /// byte is dropped. Whatever comes out is what gets stored.
    pub fn decode_payload(&self) -> Vec<u8> {
        let mut cleaned = String::with_capacity(self.payload.len());
        for c in self.payload.chars() {
            match c {
                'A'..='Z' | 'a'..='z' | '0'..='9' | '+' | '/' => cleaned.push(c),
                '-' => cleaned.push('+'),
                '_' => cleaned.push('/'),
                '=' => break,
                _ => {}
            }
        }

        if cleaned.len() % 4 == 1 {
            cleaned.pop();
        }

        LENIENT.decode(cleaned.as_bytes()).unwrap_or_default()
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}{BASE64_MARKER}{}", self.format, self.payload)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

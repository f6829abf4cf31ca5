//! Character portrait payload

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

/// Image formats an avatar may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

/// Raw avatar bytes, serialized as base64.
///
/// Serialization fails for payloads that carry no known image signature,
/// which callers exporting a character treat as a recoverable error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar(Vec<u8>);

impl Avatar {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sniff the image format from the leading magic bytes
    pub fn format(&self) -> Option<ImageFormat> {
        let b = self.0.as_slice();
        if b.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if b.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if b.starts_with(b"GIF87a") || b.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if b.len() >= 12 && &b[0..4] == b"RIFF" && &b[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else {
            None
        }
    }
}

impl Serialize for Avatar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.format().is_none() {
            return Err(ser::Error::custom(format!(
                "avatar payload of {} bytes is not a recognized image",
                self.0.len()
            )));
        }
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Avatar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Self)
            .map_err(|e| de::Error::custom(format!("invalid avatar encoding: {}", e)))
    }
}

//! Loading the image payload from disk.
//!
//! The bytes are read once and sent untouched. The media type is taken from
//! an explicit override, otherwise sniffed from the file's magic bytes, and
//! only as a last resort guessed from the extension.

use crate::config::LimitsConfig;
use crate::error::AnalyzeError;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Image formats the Gemini API accepts as inline data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MediaType {
    Jpeg,
    Png,
    Webp,
    Heic,
    Heif,
}

impl MediaType {
    /// MIME string sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Webp => "image/webp",
            MediaType::Heic => "image/heic",
            MediaType::Heif => "image/heif",
        }
    }

    /// Parse a MIME string or a short format name ("jpg", "png", ...).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        let name = s.strip_prefix("image/").unwrap_or(&s);
        match name {
            "jpeg" | "jpg" | "pjpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "heic" => Some(Self::Heic),
            "heif" => Some(Self::Heif),
            _ => None,
        }
    }

    /// Guess from a file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Identify the format from the leading bytes of the file.
    ///
    /// Returns `Err(name)` when the bytes belong to a recognised image format
    /// that the API does not accept, and `Ok(None)` when nothing matches.
    pub fn sniff(header: &[u8]) -> Result<Option<Self>, &'static str> {
        if header.len() < 4 {
            return Ok(None);
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Ok(Some(Self::Jpeg));
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Ok(Some(Self::Png));
        }

        // WebP: RIFF....WEBP
        if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
            return Ok(Some(Self::Webp));
        }

        // HEIC/HEIF: ftyp box at offset 4, brand at offset 8
        if header.len() >= 12 && &header[4..8] == b"ftyp" {
            return match &header[8..12] {
                b"heic" | b"heix" | b"hevc" | b"hevx" | b"heim" | b"heis" => Ok(Some(Self::Heic)),
                b"mif1" | b"msf1" | b"heif" => Ok(Some(Self::Heif)),
                b"avif" | b"avis" => Err("avif"),
                _ => Ok(None),
            };
        }

        if header.starts_with(b"GIF8") {
            return Err("gif");
        }
        if header.starts_with(b"BM") {
            return Err("bmp");
        }
        if header.starts_with(&[b'I', b'I', 0x2A, 0x00])
            || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
        {
            return Err("tiff");
        }

        Ok(None)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for MediaType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unsupported media type: {value}"))
    }
}

/// An image read from disk, ready to send to a provider.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Where the bytes came from
    pub path: PathBuf,
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// Declared media type
    pub media_type: MediaType,
}

impl ImageInput {
    /// Build an input from bytes already in memory.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self {
            path: path.into(),
            bytes,
            media_type,
        }
    }

    /// Read an image from disk.
    ///
    /// Checks:
    /// - File exists and is a regular, readable file
    /// - File size is within limits and non-zero
    /// - Media type is known (override, magic bytes, then extension)
    pub async fn load(
        path: &Path,
        limits: &LimitsConfig,
        media_type_override: Option<MediaType>,
    ) -> Result<Self, AnalyzeError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AnalyzeError::FileNotFound(path.to_path_buf()));
            }
            Err(e) => {
                return Err(AnalyzeError::FileRead {
                    path: path.to_path_buf(),
                    message: format!("Cannot read metadata: {e}"),
                });
            }
        };

        if !metadata.is_file() {
            return Err(AnalyzeError::FileRead {
                path: path.to_path_buf(),
                message: "Not a regular file".to_string(),
            });
        }

        let max_bytes = limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(AnalyzeError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len().div_ceil(1024 * 1024),
                max_mb: limits.max_file_size_mb,
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AnalyzeError::FileRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if bytes.is_empty() {
            return Err(AnalyzeError::FileRead {
                path: path.to_path_buf(),
                message: "File is empty".to_string(),
            });
        }

        let media_type = Self::resolve_media_type(path, &bytes, media_type_override)?;
        tracing::debug!(
            "Loaded {:?} ({} bytes, {})",
            path,
            bytes.len(),
            media_type
        );

        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            media_type,
        })
    }

    fn resolve_media_type(
        path: &Path,
        bytes: &[u8],
        media_type_override: Option<MediaType>,
    ) -> Result<MediaType, AnalyzeError> {
        let header = &bytes[..bytes.len().min(12)];
        let sniffed = MediaType::sniff(header);

        if let Some(declared) = media_type_override {
            if let Ok(Some(actual)) = sniffed {
                if actual != declared {
                    tracing::warn!(
                        "Declared media type {declared} does not match file contents ({actual}); \
                         the API may reject the request"
                    );
                }
            }
            return Ok(declared);
        }

        match sniffed {
            Ok(Some(media_type)) => Ok(media_type),
            Err(format) => Err(AnalyzeError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: format.to_string(),
            }),
            Ok(None) => MediaType::from_extension(path).ok_or_else(|| {
                AnalyzeError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: path
                        .extension()
                        .map(|e| e.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "unknown".to_string()),
                }
            }),
        }
    }

    /// Base64 (standard alphabet, padded) encoding of the bytes.
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

//! Profile photo reading: file or uploaded bytes → inline `data:` URL.

use std::path::PathBuf;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("could not read photo: {0}")]
    Io(#[from] std::io::Error),

    #[error("photo is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("not a recognised image")]
    NotAnImage,

    #[error("photo read timed out after {0}s")]
    Timeout(u64),
}

#[derive(Debug, Clone)]
pub enum PhotoSource {
    Path(PathBuf),
    Bytes {
        content_type: Option<String>,
        data: Bytes,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct PhotoLimits {
    pub max_bytes: usize,
    pub timeout: Duration,
}

/// Reads the photo and encodes it as `data:<mime>;base64,<payload>`.
pub async fn read_photo(source: PhotoSource, limits: PhotoLimits) -> Result<String, PhotoError> {
    match tokio::time::timeout(limits.timeout, read_and_encode(source, limits.max_bytes)).await {
        Ok(result) => result,
        Err(_) => Err(PhotoError::Timeout(limits.timeout.as_secs())),
    }
}

async fn read_and_encode(source: PhotoSource, max_bytes: usize) -> Result<String, PhotoError> {
    let (declared, data) = match source {
        PhotoSource::Path(path) => {
            let size = tokio::fs::metadata(&path).await?.len() as usize;
            if size > max_bytes {
                return Err(PhotoError::TooLarge { size, max: max_bytes });
            }
            (None, Bytes::from(tokio::fs::read(&path).await?))
        }
        PhotoSource::Bytes { content_type, data } => (content_type, data),
    };

    if data.len() > max_bytes {
        return Err(PhotoError::TooLarge {
            size: data.len(),
            max: max_bytes,
        });
    }

    let mime = sniff_image_mime(&data)
        .map(str::to_string)
        .or_else(|| declared.filter(|ct| ct.starts_with("image/")))
        .ok_or(PhotoError::NotAnImage)?;

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(&data)))
}

/// Image type from the leading magic bytes.
fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]) {
        Some("image/png")
    } else if data.starts_with(&[0xff, 0xd8, 0xff]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

//! Image entries.
//!
//! Pixel decoding is left to whichever codec the caller plugs in through
//! `ImageDecoder`. The default `SniffingImageDecoder` identifies the container
//! from its magic bytes, reads PNG dimensions from the IHDR chunk, and keeps
//! the encoded bytes untouched.

use crate::error::SmlmError;

const PNG_MAGIC: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
const TIFF_LE_MAGIC: &[u8; 4] = b"II*\0";
const TIFF_BE_MAGIC: &[u8; 4] = b"MM\0*";
const JPEG_MAGIC: &[u8; 3] = b"\xFF\xD8\xFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Tiff,
    Jpeg,
    Unknown,
}

/// An image payload as returned by an `ImageDecoder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub format: ImageFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// The encoded payload exactly as stored in the archive.
    pub bytes: Vec<u8>,
}

/// External image-decoding collaborator.
///
/// This crate ships no pixel codec. `SniffingImageDecoder` only identifies the
/// container and keeps the encoded bytes; callers that need decoded pixels
/// supply their own implementation through `ArchiveLoader::with_image_decoder`.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, name: &str, bytes: Vec<u8>) -> Result<ImageData, SmlmError>;
}

pub struct SniffingImageDecoder;

impl ImageDecoder for SniffingImageDecoder {
    fn decode(&self, name: &str, bytes: Vec<u8>) -> Result<ImageData, SmlmError> {
        if bytes.is_empty() {
            return Err(SmlmError::ImageDecode(format!("'{}' is empty", name)));
        }

        let format = sniff_format(&bytes);
        let (width, height) = match format {
            ImageFormat::Png => {
                let (w, h) = png_dimensions(&bytes).ok_or_else(|| {
                    SmlmError::ImageDecode(format!("'{}' has a truncated PNG header", name))
                })?;
                (Some(w), Some(h))
            }
            _ => (None, None),
        };

        log::debug!("Image '{}': {:?} {:?}x{:?}", name, format, width, height);
        Ok(ImageData {
            format,
            width,
            height,
            bytes,
        })
    }
}

pub fn sniff_format(bytes: &[u8]) -> ImageFormat {
    if bytes.starts_with(PNG_MAGIC) {
        ImageFormat::Png
    } else if bytes.starts_with(TIFF_LE_MAGIC) || bytes.starts_with(TIFF_BE_MAGIC) {
        ImageFormat::Tiff
    } else if bytes.starts_with(JPEG_MAGIC) {
        ImageFormat::Jpeg
    } else {
        ImageFormat::Unknown
    }
}

/// Width and height from the IHDR chunk, which must directly follow the signature.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let ihdr = bytes.get(8..24)?;
    if &ihdr[4..8] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(ihdr[8..12].try_into().ok()?);
    let height = u32::from_be_bytes(ihdr[12..16].try_into().ok()?);
    Some((width, height))
}

/// Signature plus IHDR chunk of a PNG, enough for the sniffing decoder.
#[cfg(test)]
pub(crate) fn tiny_png_header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 0, 0, 0, 0]);
    bytes
}

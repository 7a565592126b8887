// src/capture/encoder.rs
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use log::info;
use std::io::Read;
use std::path::Path;

use crate::error::ClassifyError;

/// MIME type used when the bytes do not reveal their format.
pub const FALLBACK_MIME: &str = "image/jpeg";

/// An image ready to be inlined into a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    /// Standard base64 with padding, no data-URI prefix.
    pub data: String,
}

impl EncodedImage {
    /// Encode raw image bytes. The MIME type is sniffed when not given.
    pub fn from_bytes(bytes: &[u8], mime_type: Option<&str>) -> Result<Self, ClassifyError> {
        if bytes.is_empty() {
            return Err(ClassifyError::EmptyImage);
        }
        let mime_type = match mime_type {
            Some(mime) if !mime.is_empty() => mime.to_string(),
            _ => sniff_mime(bytes).to_string(),
        };
        Ok(Self {
            mime_type,
            data: general_purpose::STANDARD.encode(bytes),
        })
    }

    /// Accept `data:<mime>;base64,<payload>` or a bare base64 payload.
    ///
    /// The prefix is stripped and the payload passed through as-is once it is known to
    /// decode.
    pub fn from_data_uri(text: &str) -> Result<Self, ClassifyError> {
        let text = text.trim();
        let (declared_mime, payload) = match text.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| ClassifyError::InvalidImage("data URI has no payload".into()))?;
                let mut params = header.split(';');
                let mime = params.next().unwrap_or_default();
                if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
                    return Err(ClassifyError::InvalidImage(
                        "data URI is not base64-encoded".into(),
                    ));
                }
                (Some(mime).filter(|m| !m.is_empty()), payload)
            }
            None => (None, text),
        };

        let bytes = general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ClassifyError::InvalidImage(format!("invalid base64: {e}")))?;
        if bytes.is_empty() {
            return Err(ClassifyError::EmptyImage);
        }

        let mime_type = declared_mime
            .map(str::to_string)
            .unwrap_or_else(|| sniff_mime(&bytes).to_string());
        Ok(Self {
            mime_type,
            data: payload.to_string(),
        })
    }

    /// Decoded size of the payload in bytes.
    pub fn byte_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| *b == b'=').count();
        self.data.len() / 4 * 3 - padding
    }
}

/// Guess the MIME type from the leading magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Tiff) => "image/tiff",
        _ => FALLBACK_MIME,
    }
}

/// Check if a file path points to an image type the picker offers.
pub fn is_supported_extension(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tif", "tiff"];

/// Read an image file from disk and encode it.
pub fn load_image_file(path: &Path, mime_type: Option<&str>) -> Result<EncodedImage, ClassifyError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ClassifyError::InvalidImage(format!("cannot read {}: {e}", path.display())))?;
    let image = EncodedImage::from_bytes(&bytes, mime_type)?;
    info!("Loaded {} ({}, {} bytes)", path.display(), image.mime_type, bytes.len());
    Ok(image)
}

/// Read an image from stdin: either raw bytes or a data URI.
pub fn read_image_from<R: Read>(mut reader: R, mime_type: Option<&str>) -> Result<EncodedImage, ClassifyError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ClassifyError::InvalidImage(format!("cannot read input: {e}")))?;

    if bytes.starts_with(b"data:") {
        let text = String::from_utf8(bytes)
            .map_err(|_| ClassifyError::InvalidImage("data URI is not valid UTF-8".into()))?;
        let mut image = EncodedImage::from_data_uri(&text)?;
        if let Some(mime) = mime_type {
            image.mime_type = mime.to_string();
        }
        return Ok(image);
    }

    EncodedImage::from_bytes(&bytes, mime_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn encodes_bytes_as_standard_base64() {
        let image = EncodedImage::from_bytes(b"hello", Some("image/png")).unwrap();
        assert_eq!(image.data, "aGVsbG8=");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.byte_len(), 5);
    }

    #[test]
    fn sniffs_mime_from_magic_bytes() {
        assert_eq!(sniff_mime(PNG_MAGIC), "image/png");
        assert_eq!(sniff_mime(JPEG_MAGIC), "image/jpeg");
        assert_eq!(sniff_mime(b"GIF89a......"), "image/gif");
        assert_eq!(sniff_mime(b"plain text"), FALLBACK_MIME);
    }

    #[test]
    fn empty_bytes_are_rejected() {
        assert!(matches!(EncodedImage::from_bytes(&[], None), Err(ClassifyError::EmptyImage)));
    }

    #[test]
    fn data_uri_prefix_is_stripped() {
        let image = EncodedImage::from_data_uri("data:image/webp;base64,aGVsbG8=").unwrap();
        assert_eq!(image.mime_type, "image/webp");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[test]
    fn bare_payload_gets_sniffed_mime() {
        let payload = general_purpose::STANDARD.encode(PNG_MAGIC);
        let image = EncodedImage::from_data_uri(&payload).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, payload);
    }

    #[test]
    fn malformed_data_uris_are_rejected() {
        for text in [
            "data:image/png;base64",
            "data:image/png,aGVsbG8=",
            "data:image/png;base64,***",
            "data:image/png;base64,",
        ] {
            assert!(EncodedImage::from_data_uri(text).is_err(), "{text:?}");
        }
    }

    #[test]
    fn reader_dispatches_on_data_prefix() {
        let from_uri = read_image_from(&b"data:image/gif;base64,aGVsbG8="[..], None).unwrap();
        assert_eq!(from_uri.mime_type, "image/gif");
        assert_eq!(from_uri.data, "aGVsbG8=");

        let from_raw = read_image_from(JPEG_MAGIC, None).unwrap();
        assert_eq!(from_raw.mime_type, "image/jpeg");
        assert_eq!(from_raw.data, general_purpose::STANDARD.encode(JPEG_MAGIC));
    }

    #[test]
    fn loads_files_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(PNG_MAGIC).unwrap();

        let image = load_image_file(file.path(), None).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert!(is_supported_extension(file.path()));
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_image_file(Path::new("/definitely/not/here.jpg"), None).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidImage(_)));
    }

    #[test]
    fn supported_extensions() {
        assert!(is_supported_extension(Path::new("bottle.JPG")));
        assert!(is_supported_extension(Path::new("can.webp")));
        assert!(!is_supported_extension(Path::new("notes.txt")));
    }
}

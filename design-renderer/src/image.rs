//! Image decoding and data URI utilities.
//!
//! Uploads arrive as raw bytes with a MIME type, or as `data:` URIs stored in
//! an element's content. Everything is decoded to RGBA once and re-encoded
//! as PNG for embedding in the composed SVG.

use base64::Engine;
use image::ImageEncoder;

use crate::error::{RenderError, RenderResult};

/// Decoded RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
    /// Original format of the image.
    pub format: ImageFormat,
}

impl TextureData {
    /// Encode the pixels as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel buffer does not match the dimensions.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(
                &self.data,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| RenderError::Raster(format!("PNG encoding failed: {e}")))?;
        Ok(buf)
    }

    /// Encode the pixels as a `data:image/png;base64,...` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_png_data_uri(&self) -> RenderResult<String> {
        Ok(encode_data_uri("image/png", &self.to_png()?))
    }
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            "image/gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }
}

/// Whether a MIME type names an image (`image/*`).
#[must_use]
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim()
        .to_ascii_lowercase()
        .strip_prefix("image/")
        .is_some_and(|subtype| !subtype.is_empty())
}

/// Decode an image from raw bytes.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn load_image_from_bytes(data: &[u8]) -> RenderResult<TextureData> {
    let format = ImageFormat::from_magic_bytes(data);

    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::AssetLoad(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(TextureData {
        width,
        height,
        data: rgba.into_raw(),
        format,
    })
}

/// A parsed `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared media type, `text/plain` when omitted.
    pub mime: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Parse a `data:` URI, decoding its base64 or percent-encoded payload.
///
/// # Errors
///
/// Returns an error if the URI is malformed or the payload does not decode.
pub fn parse_data_uri(uri: &str) -> RenderResult<DataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::AssetLoad("Not a data URI".to_string()))?;

    let (metadata, encoded) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::AssetLoad("Invalid data URI: missing comma".to_string()))?;

    let mut params = metadata.split(';');
    let mime = match params.next() {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => "text/plain".to_string(),
    };
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| RenderError::AssetLoad(format!("Failed to decode base64: {e}")))?
    } else {
        percent_decode(encoded)?
    };

    Ok(DataUri { mime, bytes })
}

/// Decode an image carried in a data URI.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the image cannot be decoded.
pub fn load_image_from_data_uri(uri: &str) -> RenderResult<TextureData> {
    let parsed = parse_data_uri(uri)?;
    load_image_from_bytes(&parsed.bytes)
}

/// Build a base64 data URI from a MIME type and bytes.
#[must_use]
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::AssetLoad("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

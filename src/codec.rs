use anyhow::{Context, Result, anyhow};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

use crate::caption::CanvasDimensions;

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// A decoded-enough source image: raw bytes plus what the layout needs.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub dims: CanvasDimensions,
}

impl SourceImage {
    /// Mime types the SVG rasterizer can embed directly.
    pub fn is_embeddable(&self) -> bool {
        matches!(self.mime.as_str(), PNG_MIME | JPEG_MIME | "image/gif" | "image/webp")
    }
}

pub fn probe(bytes: Vec<u8>) -> Result<SourceImage> {
    let mime = sniff_mime(&bytes).unwrap_or(PNG_MIME).to_string();
    let image = image::load_from_memory(&bytes).with_context(|| "failed to decode input image")?;
    let (width, height) = image.dimensions();
    let dims = CanvasDimensions::new(width, height)?;
    Ok(SourceImage { bytes, mime, dims })
}

pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type())
}

/// Re-encodes `source` as PNG so it can be embedded in an SVG scene.
pub fn to_png(source: &SourceImage) -> Result<Vec<u8>> {
    let image =
        image::load_from_memory(&source.bytes).with_context(|| "failed to decode input image")?;
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .with_context(|| "failed to re-encode input image as png")?;
    Ok(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// `.jpg`/`.jpeg` save paths get JPEG; anything else, or no path, gets PNG.
    pub fn from_path(path: Option<&Path>) -> Self {
        let ext = path
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            OutputFormat::Png => PNG_MIME,
            OutputFormat::Jpeg => JPEG_MIME,
        }
    }
}

pub fn encode(image: RgbaImage, format: OutputFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            DynamicImage::ImageRgba8(image)
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .with_context(|| "failed to encode png")?;
        }
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
            let quality = jpeg_quality.clamp(1, 100);
            JpegEncoder::new_with_quality(&mut bytes, quality)
                .encode_image(&rgb)
                .with_context(|| "failed to encode jpeg")?;
        }
    }
    if bytes.is_empty() {
        return Err(anyhow!("encoder produced no data"));
    }
    Ok(bytes)
}

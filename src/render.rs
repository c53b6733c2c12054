use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use resvg::render;
use std::sync::Arc;
use tiny_skia::Pixmap;
use usvg::{Options, Tree};

use crate::caption::{CaptionLayout, Color, DrawInstruction, Paint};
use crate::codec::{self, OutputFormat, SourceImage};
use crate::font::system_font_db;

/// Paint settings shared by every instruction of one layout.
pub struct CaptionStyle<'a> {
    pub family: &'a str,
    pub size_px: u32,
    pub stroke_px: u32,
    pub fill_color: Color,
    pub stroke_color: Color,
}

impl<'a> CaptionStyle<'a> {
    pub fn for_layout(layout: &CaptionLayout, family: &'a str) -> Self {
        Self {
            family,
            size_px: layout.font.size_px,
            stroke_px: layout.metrics.stroke_px,
            fill_color: layout.fill_color,
            stroke_color: layout.stroke_color,
        }
    }
}

/// Builds an SVG scene: the source image as background, then every
/// instruction in order as a centered, top-aligned `<text>` element.
pub fn render_svg(
    image: &SourceImage,
    instructions: &[DrawInstruction],
    style: &CaptionStyle<'_>,
) -> Result<String> {
    let (mime, encoded) = if image.is_embeddable() {
        (image.mime.as_str(), BASE64.encode(&image.bytes))
    } else {
        (codec::PNG_MIME, BASE64.encode(codec::to_png(image)?))
    };
    let data_uri = format!("data:{};base64,{}", mime, encoded);
    let width = image.dims.width;
    let height = image.dims.height;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    ));
    svg.push_str(&format!(
        r#"<image href="{uri}" xlink:href="{uri}" x="0" y="0" width="{w}" height="{h}" preserveAspectRatio="none"/>"#,
        uri = data_uri,
        w = width,
        h = height
    ));

    let family = escape_xml(style.family);
    for instruction in instructions {
        let paint = match instruction.paint {
            Paint::Stroke => format!(
                r#"fill="none" stroke="{color}" stroke-opacity="{opacity}" stroke-width="{width}" stroke-linejoin="round""#,
                color = style.stroke_color.to_hex_rgb(),
                opacity = style.stroke_color.opacity(),
                width = style.stroke_px
            ),
            Paint::Fill => format!(
                r#"fill="{color}" fill-opacity="{opacity}""#,
                color = style.fill_color.to_hex_rgb(),
                opacity = style.fill_color.opacity()
            ),
        };
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" font-weight="bold" text-anchor="middle" dominant-baseline="text-before-edge" {paint}>{text}</text>"#,
            x = instruction.x,
            y = instruction.y,
            family = family,
            size = style.size_px,
            paint = paint,
            text = escape_xml(&instruction.line)
        ));
    }

    svg.push_str("</svg>");
    Ok(svg)
}

/// Rasterizes `svg` and encodes the result.
pub fn render_svg_bytes(
    svg: &str,
    format: OutputFormat,
    jpeg_quality: u8,
    font_data: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let mut db = system_font_db();
    if let Some(data) = font_data {
        db.load_font_data(data.to_vec());
    }
    let options = Options {
        fontdb: Arc::new(db),
        ..Options::default()
    };
    let tree = Tree::from_str(svg, &options).with_context(|| "failed to parse SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        Pixmap::new(size.width(), size.height()).ok_or_else(|| anyhow!("empty SVG size"))?;
    let mut pixmap_mut = pixmap.as_mut();
    render(&tree, tiny_skia::Transform::identity(), &mut pixmap_mut);
    let rgba = demultiply(pixmap);
    let image = image::RgbaImage::from_raw(size.width(), size.height(), rgba)
        .ok_or_else(|| anyhow!("failed to build image buffer from SVG"))?;
    codec::encode(image, format, jpeg_quality)
}

fn demultiply(pixmap: Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect()
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

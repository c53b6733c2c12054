use anyhow::{Context, Result, anyhow};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::fmt::Write;

pub const MIN_COLUMNS: u32 = 40;
pub const MAX_COLUMNS: u32 = 100;
const FALLBACK_COLUMNS: u32 = 80;
const UPPER_HALF_BLOCK: char = '\u{2580}';
const RESET: &str = "\x1b[0m";

/// Render width for the current terminal, from `COLUMNS` when it is set.
pub fn default_width() -> u32 {
    width_from_columns(std::env::var("COLUMNS").ok().as_deref())
}

pub(crate) fn width_from_columns(columns: Option<&str>) -> u32 {
    columns
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(FALLBACK_COLUMNS)
        .clamp(MIN_COLUMNS, MAX_COLUMNS)
}

/// Decodes `bytes` and draws them `width` cells wide with half-block glyphs.
pub fn render_image(bytes: &[u8], width: u32) -> Result<String> {
    let image = image::load_from_memory(bytes)
        .with_context(|| "failed to decode image for terminal output")?;
    render_rgba(&image.to_rgba8(), width)
}

/// Each cell shows two stacked pixels: the foreground color paints the upper
/// half block, the background color fills the lower half.
pub fn render_rgba(image: &RgbaImage, width: u32) -> Result<String> {
    if width == 0 {
        return Err(anyhow!("terminal width must be at least one column"));
    }
    let (src_w, src_h) = image.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(anyhow!("cannot render an empty image"));
    }

    let pixel_rows = ((src_h as f64 * width as f64 / src_w as f64).round() as u32).max(1);
    let cell_rows = pixel_rows.div_ceil(2);
    let resized = imageops::resize(image, width, cell_rows * 2, FilterType::Triangle);

    let mut out = String::new();
    for row in 0..cell_rows {
        if row > 0 {
            out.push('\n');
        }
        for x in 0..width {
            let [tr, tg, tb] = over_black(resized.get_pixel(x, row * 2));
            let [br, bg, bb] = over_black(resized.get_pixel(x, row * 2 + 1));
            let _ = write!(
                out,
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{}",
                tr, tg, tb, br, bg, bb, UPPER_HALF_BLOCK
            );
        }
        out.push_str(RESET);
    }
    Ok(out)
}

fn over_black(pixel: &Rgba<u8>) -> [u8; 3] {
    let [r, g, b, a] = pixel.0;
    let scale = |channel: u8| ((channel as u16 * a as u16 + 127) / 255) as u8;
    [scale(r), scale(g), scale(b)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_is_clamped_to_sane_range() {
        assert_eq!(width_from_columns(None), 80);
        assert_eq!(width_from_columns(Some("12")), 40);
        assert_eq!(width_from_columns(Some("250")), 100);
        assert_eq!(width_from_columns(Some(" 72 ")), 72);
        assert_eq!(width_from_columns(Some("wide")), 80);
        assert_eq!(width_from_columns(Some("0")), 80);
    }

    #[test]
    fn keeps_aspect_ratio_with_two_pixels_per_cell() {
        let image = RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 255]));
        let out = render_rgba(&image, 40).unwrap();
        // 40 columns => 20 pixel rows => 10 text rows
        assert_eq!(out.lines().count(), 10);
        let first = out.lines().next().unwrap();
        assert_eq!(first.matches(UPPER_HALF_BLOCK).count(), 40);
        assert!(first.ends_with(RESET));
        assert!(first.starts_with("\x1b[38;2;255;0;0m\x1b[48;2;255;0;0m"));
    }

    #[test]
    fn transparent_pixels_render_black() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
        let out = render_rgba(&image, 2).unwrap();
        assert!(out.starts_with("\x1b[38;2;0;0;0m\x1b[48;2;0;0;0m"));
    }

    #[test]
    fn zero_width_is_rejected() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        assert!(render_rgba(&image, 0).is_err());
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        assert!(render_image(b"nope", 40).is_err());
    }
}

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use ttf_parser::Face;
use ttf_parser::name_id;
use usvg::fontdb;

use crate::caption::{FontSpec, TextMeasurer};

/// Advance widths of one parsed font face.
#[derive(Clone)]
pub struct FontMetrics {
    data: Arc<Vec<u8>>,
    units_per_em: u16,
    space_advance: u16,
    family: Option<String>,
    face_index: u32,
}

impl FontMetrics {
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn measure_px(&self, text: &str, font_size: f64) -> f64 {
        let Ok(face) = Face::parse(&self.data, self.face_index) else {
            return estimate_text_width_units(text) * font_size;
        };
        let mut advance = 0u32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            if ch == ' ' {
                advance = advance.saturating_add(self.space_advance as u32);
                continue;
            }
            let glyph_advance = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
                .unwrap_or(self.space_advance);
            advance = advance.saturating_add(glyph_advance as u32);
        }
        let units = self.units_per_em.max(1) as f64;
        advance as f64 * (font_size / units)
    }
}

impl TextMeasurer for FontMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        self.measure_px(text, font.size_px as f64)
    }
}

/// Width guess from character classes, for when no font file is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMeasurer;

impl TextMeasurer for EstimatedMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        let scale = if font.bold { 1.08 } else { 1.0 };
        estimate_text_width_units(text) * font.size_px as f64 * scale
    }
}

pub struct ResolvedCaptionFont {
    pub metrics: FontMetrics,
    pub family: String,
}

pub fn load_font_metrics(path: &Path) -> Result<FontMetrics> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read font: {}", path.display()))?;
    load_font_metrics_from_data(&data)
        .map_err(|err| anyhow!("failed to parse font: {} ({})", path.display(), err))
}

/// Finds the font to caption with.
///
/// An explicit font file wins. Otherwise `family_list` is read like a CSS
/// `font-family` value and the first entry present in the system font
/// database is used, preferring a bold face.
pub fn resolve_caption_font(
    font_path: Option<&Path>,
    family_list: &str,
) -> Result<ResolvedCaptionFont> {
    if let Some(path) = font_path {
        let metrics = load_font_metrics(path)?;
        let family = metrics
            .family()
            .map(|name| name.to_string())
            .or_else(|| parse_family_list(family_list).into_iter().next())
            .unwrap_or_else(|| "sans-serif".to_string());
        return Ok(ResolvedCaptionFont { metrics, family });
    }

    let db = system_font_db();
    let candidates = parse_family_list(family_list);
    for candidate in &candidates {
        if let Ok(resolved) = load_font_metrics_from_family(&db, candidate) {
            return Ok(resolved);
        }
    }

    Err(anyhow!("no usable font found for '{}'", family_list))
}

pub(crate) fn system_font_db() -> fontdb::Database {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    db
}

/// Splits a CSS-style family list: `Impact, 'Arial Black', sans-serif`.
pub(crate) fn parse_family_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().trim_matches(|ch| ch == '\'' || ch == '"').trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}

fn estimate_char_units(ch: char) -> f64 {
    if ch.is_whitespace() {
        0.25
    } else if ch.is_ascii_uppercase() || ch.is_ascii_digit() {
        0.6
    } else if ch.is_ascii_alphanumeric() {
        0.55
    } else if ch.is_ascii() {
        0.35
    } else if matches!(
        ch as u32,
        0x4E00..=0x9FFF | 0x3040..=0x30FF | 0x31F0..=0x31FF
    ) {
        1.0
    } else {
        0.9
    }
}

fn estimate_text_width_units(text: &str) -> f64 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(estimate_char_units)
        .sum()
}

fn load_font_metrics_from_data(data: &[u8]) -> Result<FontMetrics> {
    let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
    (0..count)
        .find_map(|index| metrics_from_face(data, index).ok())
        .ok_or_else(|| anyhow!("failed to parse font data"))
}

fn metrics_from_face(data: &[u8], face_index: u32) -> Result<FontMetrics> {
    let face = Face::parse(data, face_index)
        .map_err(|err| anyhow!("failed to parse font face {}: {}", face_index, err))?;
    let units_per_em = face.units_per_em().max(1);
    let space_advance = face
        .glyph_index(' ')
        .and_then(|id| face.glyph_hor_advance(id))
        .unwrap_or(units_per_em / 2);
    Ok(FontMetrics {
        data: Arc::new(data.to_vec()),
        units_per_em,
        space_advance,
        family: extract_family_name(&face),
        face_index,
    })
}

fn generic_family(name: &str) -> Option<fontdb::Family<'_>> {
    match name.to_ascii_lowercase().as_str() {
        "sans-serif" => Some(fontdb::Family::SansSerif),
        "serif" => Some(fontdb::Family::Serif),
        "monospace" => Some(fontdb::Family::Monospace),
        "cursive" => Some(fontdb::Family::Cursive),
        "fantasy" => Some(fontdb::Family::Fantasy),
        _ => None,
    }
}

fn load_font_metrics_from_family(
    db: &fontdb::Database,
    family: &str,
) -> Result<ResolvedCaptionFont> {
    let generic = generic_family(family);
    let families = [generic.unwrap_or(fontdb::Family::Name(family))];
    let bold = fontdb::Query {
        families: &families,
        weight: fontdb::Weight::BOLD,
        ..Default::default()
    };
    let regular = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&bold)
        .or_else(|| db.query(&regular))
        .ok_or_else(|| anyhow!("font not found: {}", family))?;
    let (data, face_index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| anyhow!("failed to load font data: {}", family))?;
    let metrics = metrics_from_face(&data, face_index)?;
    let resolved_family = metrics
        .family()
        .map(|name| name.to_string())
        .or_else(|| {
            db.face(id)
                .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
        })
        .unwrap_or_else(|| family.to_string());
    Ok(ResolvedCaptionFont {
        metrics,
        family: resolved_family,
    })
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}

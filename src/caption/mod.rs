//! Caption layout engine.
//!
//! Turns caption strings plus canvas dimensions into an ordered list of
//! [`DrawInstruction`]s. Nothing in here touches fonts, pixels or files: text
//! width comes from a caller-supplied [`TextMeasurer`], and painting is left
//! to whoever consumes the instructions.

mod color;
mod error;
mod metrics;
mod place;
mod select;
mod wrap;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use color::{Color, ParseColorError};
pub use error::{CaptionError, CaptionResult};
pub use metrics::compute_metrics;
pub use place::place;
pub use select::{
    PanelGrid, comparison_panels, compose, layout, multicomparison_rows, resolve_rows,
};
pub use wrap::wrap;

pub const ELLIPSIS: &str = "...";
pub const ROW_COUNT: usize = 5;

pub(crate) const MARGIN_RANGE: (f64, f64) = (0.0, 0.2);
pub(crate) const FONT_SIZE_RANGE: (f64, f64) = (0.02, 0.16);
pub(crate) const MIN_FONT_PX: u32 = 12;
pub(crate) const REFERENCE_FONT_PX: f64 = 48.0;
pub(crate) const LINE_HEIGHT_FACTOR: f64 = 1.1;
pub(crate) const PANEL_PADDING_FRACTION: f64 = 0.08;

pub const DEFAULT_FONT_FAMILY: &str =
    "Impact, 'Arial Black', Arial, Helvetica, sans-serif, 'Fira Code'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasDimensions {
    pub width: u32,
    pub height: u32,
}

impl CanvasDimensions {
    pub fn new(width: u32, height: u32) -> CaptionResult<Self> {
        let dims = Self { width, height };
        dims.validate()?;
        Ok(dims)
    }

    pub(crate) fn validate(&self) -> CaptionResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptionError::invalid_input(format!(
                "canvas must be non-empty (got {}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Caller-facing sizing and styling knobs. Numeric fields may hold any value;
/// [`LayoutConfig::clamped`] folds them into range before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Outer margin as a fraction of image height.
    pub margin_fraction: f64,
    /// Base font size as a fraction of image height.
    pub font_size_fraction: f64,
    /// Outline thickness at a 48px reference font.
    pub stroke_weight: f64,
    pub max_lines_per_box: u32,
    pub uppercase: bool,
    pub font_family: String,
    pub fill_color: Color,
    pub stroke_color: Color,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_fraction: 0.05,
            font_size_fraction: 0.1,
            stroke_weight: 5.0,
            max_lines_per_box: 2,
            uppercase: true,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            fill_color: Color::WHITE,
            stroke_color: Color::BLACK,
        }
    }
}

impl LayoutConfig {
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f64, fallback: f64| {
            if value.is_finite() { value } else { fallback }
        };
        let font_family = if self.font_family.trim().is_empty() {
            defaults.font_family
        } else {
            self.font_family.clone()
        };
        Self {
            margin_fraction: finite_or(self.margin_fraction, defaults.margin_fraction)
                .clamp(MARGIN_RANGE.0, MARGIN_RANGE.1),
            font_size_fraction: finite_or(self.font_size_fraction, defaults.font_size_fraction)
                .clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1),
            stroke_weight: finite_or(self.stroke_weight, defaults.stroke_weight).max(0.0),
            max_lines_per_box: self.max_lines_per_box.max(1),
            uppercase: self.uppercase,
            font_family,
            fill_color: self.fill_color,
            stroke_color: self.stroke_color,
        }
    }

    pub(crate) fn transform(&self, text: &str) -> String {
        if self.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub margin_px: f64,
    pub base_font_px: u32,
    pub stroke_px: u32,
    pub line_height_px: u32,
    pub box_width_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rectangle {
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// Where one caption's wrapped lines go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptionSlot {
    /// Free-floating block centered on `x_center`, first line at `y_top`.
    Anchor { x_center: f64, y_top: f64 },
    /// Block centered inside `rect`, kept at least `padding` below its top.
    Panel { rect: Rectangle, padding: u32 },
}

impl CaptionSlot {
    pub fn max_width(&self, metrics: &DerivedMetrics) -> f64 {
        match self {
            CaptionSlot::Anchor { .. } => metrics.box_width_px,
            CaptionSlot::Panel { rect, padding } => {
                (rect.w as f64 - *padding as f64 * 2.0).max(0.0)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Paint {
    Stroke,
    Fill,
}

/// One text draw, horizontally centered on `x` with its top at `y`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawInstruction {
    pub line: String,
    pub x: f64,
    pub y: f64,
    pub paint: Paint,
}

impl DrawInstruction {
    pub fn is_stroke(&self) -> bool {
        self.paint == Paint::Stroke
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    #[default]
    Classic,
    Comparison,
    Multicomparison,
}

impl LayoutVariant {
    pub const NAMES: [&'static str; 3] = ["classic", "comparison", "multicomparison"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutVariant::Classic => "classic",
            LayoutVariant::Comparison => "comparison",
            LayoutVariant::Multicomparison => "multicomparison",
        }
    }

    pub fn slot_count(&self) -> usize {
        match self {
            LayoutVariant::Classic | LayoutVariant::Comparison => 2,
            LayoutVariant::Multicomparison => ROW_COUNT,
        }
    }
}

impl FromStr for LayoutVariant {
    type Err = CaptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(LayoutVariant::Classic),
            "comparison" => Ok(LayoutVariant::Comparison),
            "multicomparison" => Ok(LayoutVariant::Multicomparison),
            other => Err(CaptionError::invalid_input(format!(
                "unknown layout '{}' (expected one of: {})",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Font the captions are measured and drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontSpec {
    pub family: String,
    pub size_px: u32,
    pub bold: bool,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> f64;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, &FontSpec) -> f64,
{
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        self(text, font)
    }
}

pub struct CaptionRequest<'a> {
    pub dims: CanvasDimensions,
    pub layout: LayoutVariant,
    pub captions: Vec<String>,
    pub config: LayoutConfig,
    pub measurer: &'a dyn TextMeasurer,
}

/// Everything a glyph renderer needs to paint one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionLayout {
    pub layout: LayoutVariant,
    pub dims: CanvasDimensions,
    pub metrics: DerivedMetrics,
    pub font: FontSpec,
    pub fill_color: Color,
    pub stroke_color: Color,
    pub instructions: Vec<DrawInstruction>,
}

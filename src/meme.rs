use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::caption::{
    self, CaptionLayout, CaptionRequest, LayoutVariant, ROW_COUNT, TextMeasurer, resolve_rows,
};
use crate::codec::{self, OutputFormat};
use crate::font::{EstimatedMeasurer, ResolvedCaptionFont, resolve_caption_font};
use crate::render::{CaptionStyle, render_svg, render_svg_bytes};
use crate::settings::{LayoutOverrides, Settings};
use crate::terminal;

#[derive(Debug, Clone, Default)]
pub struct MemeOptions {
    pub input: PathBuf,
    pub layout: String,
    pub top_text: String,
    pub bottom_text: String,
    /// Ordered multicomparison rows; wins over `row_values` when non-empty.
    pub rows: Vec<String>,
    pub row_values: [Option<String>; ROW_COUNT],
    pub overrides: LayoutOverrides,
    pub save: Option<PathBuf>,
    pub terminal_width: Option<u32>,
    pub layout_json: Option<PathBuf>,
}

impl MemeOptions {
    pub fn captions(&self, variant: LayoutVariant) -> Vec<String> {
        match variant {
            LayoutVariant::Classic | LayoutVariant::Comparison => {
                vec![self.top_text.clone(), self.bottom_text.clone()]
            }
            LayoutVariant::Multicomparison => resolve_rows(&self.rows, &self.row_values),
        }
    }
}

pub struct GeneratedMeme {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub layout: CaptionLayout,
}

#[derive(Debug)]
pub struct MemeOutput {
    pub buffer: Vec<u8>,
    pub meme: String,
    pub saved: Option<PathBuf>,
}

/// Captions the input image and returns the encoded result.
pub fn generate_meme(options: &MemeOptions, settings: &Settings) -> Result<GeneratedMeme> {
    let layout_name = if options.layout.trim().is_empty() {
        LayoutVariant::default().as_str()
    } else {
        options.layout.as_str()
    };
    let variant: LayoutVariant = layout_name.parse()?;

    let bytes = read_input(&options.input)?;
    let source = codec::probe(bytes)?;
    info!(
        "input: {}x{} (mime={})",
        source.dims.width, source.dims.height, source.mime
    );

    let mut config = settings.caption.clone();
    options.overrides.apply(&mut config);

    let font_path = options
        .overrides
        .font_path
        .as_deref()
        .or(settings.font_path.as_deref());
    let font = load_font(font_path, &config.font_family)?;
    let measurer: &dyn TextMeasurer = match &font {
        Some(font) => &font.metrics,
        None => &EstimatedMeasurer,
    };
    let family = font
        .as_ref()
        .map(|font| font.family.clone())
        .unwrap_or_else(|| config.font_family.clone());

    let request = CaptionRequest {
        dims: source.dims,
        layout: variant,
        captions: options.captions(variant),
        config,
        measurer,
    };
    let layout = caption::compose(&request)?;
    info!(
        "layout: {} ({} instructions, font {}px)",
        layout.layout,
        layout.instructions.len(),
        layout.font.size_px
    );

    let style = CaptionStyle::for_layout(&layout, &family);
    let svg = render_svg(&source, &layout.instructions, &style)?;
    let format = OutputFormat::from_path(options.save.as_deref());
    let font_data = match (font_path, &font) {
        (Some(_), Some(font)) => Some(font.metrics.data()),
        _ => None,
    };
    let bytes = render_svg_bytes(&svg, format, settings.jpeg_quality, font_data)?;

    Ok(GeneratedMeme {
        bytes,
        format,
        layout,
    })
}

/// Generates the meme, renders it for the terminal and writes any requested files.
pub fn run(options: &MemeOptions, settings: &Settings) -> Result<MemeOutput> {
    let generated = generate_meme(options, settings)?;

    let width = options
        .terminal_width
        .or(settings.terminal_width)
        .unwrap_or_else(terminal::default_width);
    let meme = terminal::render_image(&generated.bytes, width)?;

    if let Some(path) = &options.layout_json {
        let json = serde_json::to_vec_pretty(&generated.layout)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write layout json: {}", path.display()))?;
        info!("wrote layout {}", path.display());
    }

    let saved = match &options.save {
        Some(path) => {
            fs::write(path, &generated.bytes)
                .with_context(|| format!("failed to save image: {}", path.display()))?;
            info!("saved {} ({})", path.display(), generated.format.mime());
            Some(path.clone())
        }
        None => None,
    };

    Ok(MemeOutput {
        buffer: generated.bytes,
        meme,
        saved,
    })
}

/// Splits `--rows` values on commas. A comma is kept as text when a `]`
/// follows it before any `[`, so `"C [x, y],D"` yields two rows.
pub fn split_row_list(values: &[String]) -> Vec<String> {
    let mut rows = Vec::new();
    for value in values {
        let mut start = 0;
        for (idx, ch) in value.char_indices() {
            if ch == ',' && !closes_bracket_ahead(&value[idx + 1..]) {
                rows.push(value[start..idx].to_string());
                start = idx + 1;
            }
        }
        rows.push(value[start..].to_string());
    }
    rows
}

fn closes_bracket_ahead(rest: &str) -> bool {
    rest.chars()
        .find(|ch| *ch == '[' || *ch == ']')
        .is_some_and(|ch| ch == ']')
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    let is_file = fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(anyhow!(
            "input not found or not a file: {}",
            path.display()
        ));
    }
    fs::read(path).with_context(|| format!("failed to read input: {}", path.display()))
}

fn load_font(font_path: Option<&Path>, family_list: &str) -> Result<Option<ResolvedCaptionFont>> {
    match resolve_caption_font(font_path, family_list) {
        Ok(font) => {
            info!("font: {}", font.family);
            Ok(Some(font))
        }
        Err(err) if font_path.is_none() => {
            warn!("{}; falling back to estimated text widths", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

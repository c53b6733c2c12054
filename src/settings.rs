use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::caption::{Color, LayoutConfig};
use crate::codec::DEFAULT_JPEG_QUALITY;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");
const BASE_DIR_ENV: &str = "TERMEME_DIR";
const LOCAL_SETTINGS_FILE: &str = "termeme.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub caption: LayoutConfig,
    pub font_path: Option<PathBuf>,
    pub terminal_width: Option<u32>,
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            caption: LayoutConfig::default(),
            font_path: None,
            terminal_width: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    caption: Option<CaptionSettings>,
    output: Option<OutputSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct CaptionSettings {
    margin: Option<f64>,
    font_size: Option<f64>,
    stroke: Option<f64>,
    max_lines: Option<u32>,
    uppercase: Option<bool>,
    font_family: Option<String>,
    font_color: Option<Color>,
    stroke_color: Option<Color>,
    font_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputSettings {
    terminal_width: Option<u32>,
    jpeg_quality: Option<u8>,
}

/// Explicit per-run overrides, typically from command-line flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutOverrides {
    pub margin: Option<f64>,
    pub font_size: Option<f64>,
    pub stroke: Option<f64>,
    pub max_lines: Option<u32>,
    pub no_upper: bool,
    pub font_family: Option<String>,
    pub font_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub font_path: Option<PathBuf>,
}

impl LayoutOverrides {
    pub fn apply(&self, config: &mut LayoutConfig) {
        if let Some(margin) = self.margin {
            config.margin_fraction = margin;
        }
        if let Some(size) = self.font_size {
            config.font_size_fraction = size;
        }
        if let Some(stroke) = self.stroke {
            config.stroke_weight = stroke;
        }
        if let Some(max_lines) = self.max_lines {
            config.max_lines_per_box = max_lines;
        }
        if self.no_upper {
            config.uppercase = false;
        }
        if let Some(family) = &self.font_family {
            if !family.trim().is_empty() {
                config.font_family = family.clone();
            }
        }
        if let Some(color) = self.font_color {
            config.fill_color = color;
        }
        if let Some(color) = self.stroke_color {
            config.stroke_color = color;
        }
    }
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    load_settings_in(settings_dir().as_deref(), extra_path)
}

/// Same as [`load_settings`] with the per-user directory given explicitly.
pub fn load_settings_in(home: Option<&Path>, extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    if let Some(home) = home {
        ensure_home_settings_file(home)?;
    }

    let mut ordered_paths = vec![PathBuf::from(LOCAL_SETTINGS_FILE)];
    if let Some(home) = home {
        ordered_paths.push(home.join("settings.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed = parse_settings(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
            debug!("loaded settings {}", path.display());
        }
    }

    Ok(settings)
}

fn parse_settings(content: &str) -> Result<SettingsFile> {
    Ok(toml::from_str(content)?)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(caption) = incoming.caption {
            let config = &mut self.caption;
            if let Some(margin) = caption.margin {
                config.margin_fraction = margin;
            }
            if let Some(size) = caption.font_size {
                config.font_size_fraction = size;
            }
            if let Some(stroke) = caption.stroke {
                config.stroke_weight = stroke;
            }
            if let Some(max_lines) = caption.max_lines {
                config.max_lines_per_box = max_lines;
            }
            if let Some(uppercase) = caption.uppercase {
                config.uppercase = uppercase;
            }
            if let Some(family) = caption.font_family {
                if !family.trim().is_empty() {
                    config.font_family = family;
                }
            }
            if let Some(color) = caption.font_color {
                config.fill_color = color;
            }
            if let Some(color) = caption.stroke_color {
                config.stroke_color = color;
            }
            if let Some(path) = caption.font_path {
                if !path.trim().is_empty() {
                    self.font_path = Some(PathBuf::from(path));
                }
            }
        }
        if let Some(output) = incoming.output {
            if let Some(width) = output.terminal_width {
                if width > 0 {
                    self.terminal_width = Some(width);
                }
            }
            if let Some(quality) = output.jpeg_quality {
                if quality > 0 {
                    self.jpeg_quality = quality.min(100);
                }
            }
        }
    }
}

fn ensure_home_settings_file(home: &Path) -> Result<()> {
    fs::create_dir_all(home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn settings_dir() -> Option<PathBuf> {
    if let Some(dir) = non_empty_env(BASE_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    non_empty_env("HOME").map(|home| Path::new(&home).join(".termeme"))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

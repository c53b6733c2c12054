use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use termeme::caption::{Color, LayoutVariant};
use termeme::{LayoutOverrides, MemeOptions};

#[derive(Parser, Debug)]
#[command(
    name = "termeme",
    version,
    about = "Caption an image meme-style and preview it in the terminal",
    override_usage = "termeme -i <INPUT> [--layout <TYPE>] [text options] [render options]"
)]
struct Cli {
    /// Path to a local image file
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Top caption text (classic/comparison)
    #[arg(short = 't', long = "top-text", alias = "topText", default_value = "")]
    top_text: String,

    /// Bottom caption text (classic/comparison)
    #[arg(short = 'b', long = "bottom-text", alias = "bottomText", default_value = "")]
    bottom_text: String,

    /// Meme layout
    #[arg(
        short = 'l',
        long = "layout",
        default_value = "classic",
        value_parser = LayoutVariant::NAMES
    )]
    layout: String,

    /// Text for multicomparison rows, in order (repeat --rows or comma-separate)
    #[arg(long = "rows", num_args = 1..)]
    rows: Vec<String>,

    /// Row 1 text (alternative to --rows)
    #[arg(long = "row1")]
    row1: Option<String>,

    /// Row 2 text
    #[arg(long = "row2")]
    row2: Option<String>,

    /// Row 3 text
    #[arg(long = "row3")]
    row3: Option<String>,

    /// Row 4 text
    #[arg(long = "row4")]
    row4: Option<String>,

    /// Row 5 text
    #[arg(long = "row5")]
    row5: Option<String>,

    /// Maximum wrapped lines per caption box
    #[arg(long = "max-lines", alias = "maxLines")]
    max_lines: Option<u32>,

    /// Terminal render width in columns
    #[arg(short = 'w', long = "width")]
    width: Option<u32>,

    /// Export the meme to a file (.png, or .jpg/.jpeg for JPEG)
    #[arg(long = "save-img", alias = "saveImg")]
    save_img: Option<PathBuf>,

    /// Keep caption text as typed instead of uppercasing it
    #[arg(long = "no-upper", alias = "noUpper")]
    no_upper: bool,

    /// Outer margin as a fraction of image height (0-0.2)
    #[arg(short = 'm', long = "margin")]
    margin: Option<f64>,

    /// Outline thickness, scaled from a 48px font
    #[arg(short = 's', long = "stroke")]
    stroke: Option<f64>,

    /// Base font size as a fraction of image height (0.02-0.16)
    #[arg(long = "font-size", alias = "fontSize")]
    font_size: Option<f64>,

    /// Font family list used for text
    #[arg(long = "font-family", alias = "fontFamily")]
    font_family: Option<String>,

    /// Font file to use instead of looking up the family list
    #[arg(long = "font-path")]
    font_path: Option<PathBuf>,

    /// Text fill color (hexadecimal)
    #[arg(long = "font-color", alias = "fontColor")]
    font_color: Option<Color>,

    /// Text outline color (hexadecimal)
    #[arg(long = "stroke-color", alias = "strokeColor")]
    stroke_color: Option<Color>,

    /// Write the computed caption layout as JSON
    #[arg(long = "layout-json")]
    layout_json: Option<PathBuf>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "settings")]
    settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    termeme::logging::init(cli.verbose)?;
    let settings = termeme::load_settings(cli.settings.as_deref())?;

    let options = MemeOptions {
        input: cli.input,
        layout: cli.layout,
        top_text: cli.top_text,
        bottom_text: cli.bottom_text,
        rows: termeme::split_row_list(&cli.rows),
        row_values: [cli.row1, cli.row2, cli.row3, cli.row4, cli.row5],
        overrides: LayoutOverrides {
            margin: cli.margin,
            font_size: cli.font_size,
            stroke: cli.stroke,
            max_lines: cli.max_lines,
            no_upper: cli.no_upper,
            font_family: cli.font_family,
            font_color: cli.font_color,
            stroke_color: cli.stroke_color,
            font_path: cli.font_path,
        },
        save: cli.save_img,
        terminal_width: cli.width.filter(|width| *width > 0),
        layout_json: cli.layout_json,
    };

    let output = termeme::run(&options, &settings)?;
    println!("{}", output.meme);
    if let Some(saved) = output.saved {
        eprintln!("\nSaved image to: {}", saved.display());
    }
    Ok(())
}

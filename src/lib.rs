//! Meme captioning for the terminal.
//!
//! The [`caption`] module holds the layout engine; the remaining modules wire
//! it to real fonts, images and terminal output.

pub mod caption;
pub mod codec;
pub mod font;
pub mod logging;
pub mod meme;
pub mod render;
pub mod settings;
pub mod terminal;

pub use caption::{
    CaptionError, CaptionLayout, CaptionRequest, CaptionResult, CanvasDimensions, DrawInstruction,
    LayoutConfig, LayoutVariant, TextMeasurer,
};
pub use meme::{GeneratedMeme, MemeOptions, MemeOutput, generate_meme, run, split_row_list};
pub use settings::{LayoutOverrides, Settings, load_settings};

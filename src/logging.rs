use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Logs go to stderr so stdout carries only the rendered meme.
/// Warnings always show; `verbose` adds the per-stage info and debug lines.
pub fn init(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(verbose)
        .without_time()
        .try_init();
    Ok(())
}

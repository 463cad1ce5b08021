//! Font loading for annotation labels.

use std::path::Path;

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use tracing::debug;

/// Loads a TrueType or OpenType font file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid font.
pub fn load_font(path: &Path) -> Result<FontArc> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read font: {}", path.display()))?;
    let font = FontArc::try_from_vec(data)
        .with_context(|| format!("Invalid font file: {}", path.display()))?;
    debug!("Loaded font {}", path.display());
    Ok(font)
}

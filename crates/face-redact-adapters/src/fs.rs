//! Filesystem adapter for loading and saving images.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, TimeZone};
use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

/// Supported image extensions.
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Prefix of generated output file names.
const OUTPUT_PREFIX: &str = "output";
/// Timestamp part of generated output file names.
const OUTPUT_TIMESTAMP: &str = "%y%m%d%H%M%S";

/// Checks if a path has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    extension(path).is_some_and(|e| RASTER_EXTENSIONS.contains(&e.as_str()))
}

/// Loads an image and converts it to 8-bit RGB, or 8-bit RGBA when the file
/// carries an alpha channel.
///
/// # Errors
///
/// Returns an error if the file has an unsupported extension or cannot be
/// decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !is_supported_image(path) {
        bail!("Unsupported file type: {}", path.display());
    }

    let image =
        image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;
    debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    Ok(normalize(image))
}

/// Loads the image pasted over faces by the overlay strategy. Its alpha
/// channel is kept.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded.
pub fn load_overlay(path: &Path) -> Result<DynamicImage> {
    let image = load_image(path).context("Failed to load overlay image")?;
    if !image.color().has_alpha() {
        warn!(
            "Overlay image {} has no alpha channel and will be rejected",
            path.display()
        );
    }
    Ok(image)
}

/// Writes `image` to `path`, the format chosen by its extension. JPEG output
/// has the alpha channel dropped first.
///
/// # Errors
///
/// Returns an error if the extension is unknown or encoding fails.
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("Unknown output format: {}", path.display()))?;

    let encoded = match format {
        ImageFormat::Jpeg if image.color().has_alpha() => {
            debug!("Dropping alpha channel for {format:?} output");
            DynamicImage::ImageRgb8(image.to_rgb8())
        }
        _ => image.clone(),
    };

    encoded
        .save_with_format(path, format)
        .with_context(|| format!("Failed to write image: {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// `<dir>/output<yyMMddHHmmss>.<ext>` for the current local time.
#[must_use]
pub fn timestamped_output_path(dir: &Path, ext: &str) -> PathBuf {
    dir.join(output_file_name(&Local::now(), ext))
}

/// `output<yyMMddHHmmss>.<ext>` for the given instant.
#[must_use]
pub fn output_file_name<Tz>(at: &DateTime<Tz>, ext: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{OUTPUT_PREFIX}{}.{}",
        at.format(OUTPUT_TIMESTAMP),
        ext.trim_start_matches('.')
    )
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

fn normalize(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("test.jpg")));
        assert!(is_supported_image(Path::new("test.JPEG")));
        assert!(is_supported_image(Path::new("smiley.png")));
        assert!(!is_supported_image(Path::new("test.cr2")));
        assert!(!is_supported_image(Path::new("test.txt")));
        assert!(!is_supported_image(Path::new("test")));
    }

    #[test]
    fn test_output_file_name() {
        let at = Utc
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 1)
            .single()
            .unwrap_or_else(|| panic!("valid date"));
        assert_eq!(output_file_name(&at, "jpg"), "output240307090501.jpg");
        assert_eq!(output_file_name(&at, ".png"), "output240307090501.png");
    }

    #[test]
    fn test_normalize_color_types() {
        let gray = normalize(DynamicImage::new_luma8(2, 2));
        assert!(matches!(gray, DynamicImage::ImageRgb8(_)));

        let gray_alpha = normalize(DynamicImage::new_luma_a8(2, 2));
        assert!(matches!(gray_alpha, DynamicImage::ImageRgba8(_)));

        let wide = normalize(DynamicImage::new_rgba16(2, 2));
        assert!(matches!(wide, DynamicImage::ImageRgba8(_)));
    }
}

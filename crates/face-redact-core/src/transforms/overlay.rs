//! Fixed-image overlay transform (e.g. a smiley pasted over each face).

use std::sync::Arc;

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use super::{region_bounds, RegionTransform};
use crate::compositor;
use crate::domain::{FaceRegion, TransformError};

/// Stretches an alpha-carrying image to the region and composites it on top.
///
/// Aspect ratio is not preserved.
#[derive(Debug, Clone)]
pub struct OverlayTransform {
    image: Arc<DynamicImage>,
}

impl OverlayTransform {
    /// Creates an overlay transform. The image must carry an alpha channel;
    /// this is checked when the transform is applied.
    #[must_use]
    pub fn new(image: impl Into<Arc<DynamicImage>>) -> Self {
        Self {
            image: image.into(),
        }
    }

    /// The overlay image as supplied.
    #[must_use]
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

impl RegionTransform for OverlayTransform {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn apply(
        &self,
        image: &DynamicImage,
        region: &FaceRegion,
    ) -> Result<DynamicImage, TransformError> {
        let bounds = region_bounds(image, region.rect)?;

        if !self.image.color().has_alpha() {
            return Err(TransformError::ChannelMismatch);
        }
        if self.image.width() == 0 || self.image.height() == 0 {
            return Err(TransformError::ResamplingFailure(
                "overlay image is empty".into(),
            ));
        }

        debug!(
            "Overlaying {}x{} image onto {}",
            self.image.width(),
            self.image.height(),
            region.rect
        );

        let fitted = self
            .image
            .resize_exact(bounds.width, bounds.height, FilterType::Triangle);
        let composed = compositor::overlay(image, &fitted, region.rect.origin())?;

        // The background was opaque wherever the input had no alpha, so
        // dropping the channel again is lossless.
        Ok(match image {
            DynamicImage::ImageRgb8(_) => DynamicImage::ImageRgb8(composed.to_rgb8()),
            _ => composed,
        })
    }
}

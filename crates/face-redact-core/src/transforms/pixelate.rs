//! Mosaic (pixelation) transform.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Pixel};
use tracing::debug;

use super::{transform_region, PatchOp, RegionTransform};
use crate::domain::{FaceRegion, TransformError};

/// Default mosaic resolution per side.
pub const DEFAULT_SAMPLE_SIZE: u32 = 10;

/// Shrinks the region to `sample_size` x `sample_size` and scales it back up
/// with block replication, so the region holds at most `sample_size²` colors.
///
/// Applying it twice is not guaranteed to equal applying it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelateTransform {
    sample_size: u32,
}

impl PixelateTransform {
    /// Creates a mosaic with `sample_size` blocks per side.
    #[must_use]
    pub const fn new(sample_size: u32) -> Self {
        Self { sample_size }
    }

    /// Blocks per side.
    #[must_use]
    pub const fn sample_size(&self) -> u32 {
        self.sample_size
    }
}

impl Default for PixelateTransform {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_SIZE)
    }
}

impl PatchOp for PixelateTransform {
    fn patch<P>(
        &self,
        region: &ImageBuffer<P, Vec<u8>>,
    ) -> Result<ImageBuffer<P, Vec<u8>>, TransformError>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        if self.sample_size == 0 {
            return Err(TransformError::ResamplingFailure(
                "pixelation sample size must be at least 1".into(),
            ));
        }

        let (width, height) = region.dimensions();
        let side = self.sample_size;
        let small = imageops::resize(region, side, side, FilterType::Triangle);
        Ok(imageops::resize(&small, width, height, FilterType::Nearest))
    }
}

impl RegionTransform for PixelateTransform {
    fn name(&self) -> &'static str {
        "pixelate"
    }

    fn apply(
        &self,
        image: &DynamicImage,
        region: &FaceRegion,
    ) -> Result<DynamicImage, TransformError> {
        debug!(
            "Pixelating {} into {}x{} blocks",
            region.rect, self.sample_size, self.sample_size
        );
        transform_region(image, region.rect, self)
    }
}

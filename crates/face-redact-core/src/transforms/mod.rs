//! Region transforms.
//!
//! Each transform takes an image and a face region and returns a new image in
//! which only that region has changed (annotation labels excepted). The
//! [`Strategy`] enum is the configured, tagged form of the four transforms.

mod annotate;
mod blur;
mod overlay;
mod pixelate;
mod strategy;

use image::{imageops, DynamicImage, ImageBuffer, Pixel};

use crate::domain::{FaceRegion, Rect, RegionBounds, TransformError};

pub use annotate::{AnnotateStyle, AnnotateTransform};
pub use blur::{box_blur, BlurTransform, DEFAULT_KERNEL_SIZE};
pub use overlay::OverlayTransform;
pub use pixelate::{PixelateTransform, DEFAULT_SAMPLE_SIZE};
pub use strategy::{Strategy, StrategyKind};

/// Trait for region transforms applied to detected faces.
pub trait RegionTransform: Send + Sync {
    /// Returns the name of this transform.
    fn name(&self) -> &'static str;

    /// Returns a copy of `image` with `region` transformed.
    ///
    /// # Errors
    ///
    /// Returns an error if the region does not fit the image, the image is not
    /// 8-bit RGB/RGBA, or the transform's parameters cannot be honoured.
    fn apply(
        &self,
        image: &DynamicImage,
        region: &FaceRegion,
    ) -> Result<DynamicImage, TransformError>;
}

/// An operation on an extracted sub-image that returns a same-sized patch.
trait PatchOp {
    fn patch<P>(
        &self,
        region: &ImageBuffer<P, Vec<u8>>,
    ) -> Result<ImageBuffer<P, Vec<u8>>, TransformError>
    where
        P: Pixel<Subpixel = u8> + 'static;
}

/// Rejects anything but 8-bit RGB and RGBA.
fn check_color_type(image: &DynamicImage) -> Result<(), TransformError> {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Ok(()),
        other => Err(TransformError::UnsupportedColorType(format!(
            "{:?}",
            other.color()
        ))),
    }
}

/// Validates `rect` against `image` and returns its bounds.
fn region_bounds(image: &DynamicImage, rect: Rect) -> Result<RegionBounds, TransformError> {
    check_color_type(image)?;
    rect.bounds_in(image.width(), image.height())
}

/// Cuts `rect` out of `image`, runs `op` on it and writes the patch back
/// into a copy of `image`.
fn transform_region<O: PatchOp>(
    image: &DynamicImage,
    rect: Rect,
    op: &O,
) -> Result<DynamicImage, TransformError> {
    let bounds = region_bounds(image, rect)?;
    match image {
        DynamicImage::ImageRgb8(buf) => {
            Ok(DynamicImage::ImageRgb8(replace_region(buf, bounds, op)?))
        }
        DynamicImage::ImageRgba8(buf) => {
            Ok(DynamicImage::ImageRgba8(replace_region(buf, bounds, op)?))
        }
        other => Err(TransformError::UnsupportedColorType(format!(
            "{:?}",
            other.color()
        ))),
    }
}

fn replace_region<P, O>(
    buf: &ImageBuffer<P, Vec<u8>>,
    bounds: RegionBounds,
    op: &O,
) -> Result<ImageBuffer<P, Vec<u8>>, TransformError>
where
    P: Pixel<Subpixel = u8> + 'static,
    O: PatchOp,
{
    let sub =
        imageops::crop_imm(buf, bounds.x, bounds.y, bounds.width, bounds.height).to_image();
    let patch = op.patch(&sub)?;

    let mut out = buf.clone();
    imageops::replace(&mut out, &patch, i64::from(bounds.x), i64::from(bounds.y));
    Ok(out)
}

//! Box blur transform.
//!
//! Averages every pixel of the region over a square `kernel_size` window.
//! The window is clipped to the region, so near its edges (and for regions
//! smaller than the kernel) the average runs over the pixels that exist.
//! Pixels outside the region never contribute.

use image::{DynamicImage, ImageBuffer, Pixel};
use tracing::debug;

use super::{transform_region, PatchOp, RegionTransform};
use crate::domain::{FaceRegion, TransformError};

/// Default kernel side in pixels.
pub const DEFAULT_KERNEL_SIZE: u32 = 15;

/// Box blur over a square kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurTransform {
    kernel_size: u32,
}

impl BlurTransform {
    /// Creates a blur with the given kernel side. A side of 1 is the identity.
    #[must_use]
    pub const fn new(kernel_size: u32) -> Self {
        Self { kernel_size }
    }

    /// Kernel side in pixels.
    #[must_use]
    pub const fn kernel_size(&self) -> u32 {
        self.kernel_size
    }
}

impl Default for BlurTransform {
    fn default() -> Self {
        Self::new(DEFAULT_KERNEL_SIZE)
    }
}

impl PatchOp for BlurTransform {
    fn patch<P>(
        &self,
        region: &ImageBuffer<P, Vec<u8>>,
    ) -> Result<ImageBuffer<P, Vec<u8>>, TransformError>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        box_blur(region, self.kernel_size)
    }
}

impl RegionTransform for BlurTransform {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn apply(
        &self,
        image: &DynamicImage,
        region: &FaceRegion,
    ) -> Result<DynamicImage, TransformError> {
        debug!("Blurring {} with kernel {}", region.rect, self.kernel_size);
        transform_region(image, region.rect, self)
    }
}

/// Mean filter with a `kernel` x `kernel` window anchored at its center
/// (`kernel / 2`), clipped to the image. Every channel, alpha included, is
/// filtered independently.
///
/// # Errors
///
/// Returns [`TransformError::ResamplingFailure`] if `kernel` is zero.
pub fn box_blur<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    kernel: u32,
) -> Result<ImageBuffer<P, Vec<u8>>, TransformError>
where
    P: Pixel<Subpixel = u8>,
{
    if kernel == 0 {
        return Err(TransformError::ResamplingFailure(
            "blur kernel size must be at least 1".into(),
        ));
    }
    if kernel == 1 {
        return Ok(src.clone());
    }

    let (w, h) = src.dimensions();
    let (w, h) = (w as usize, h as usize);
    let channels = usize::from(P::CHANNEL_COUNT);
    let kernel = kernel as usize;
    let raw: &[u8] = src;

    // Horizontal window sums.
    let mut rows = vec![0u64; w * h * channels];
    let mut prefix = vec![0u64; (w + 1) * channels];
    for y in 0..h {
        let line = &raw[y * w * channels..(y + 1) * w * channels];
        for x in 0..w {
            for c in 0..channels {
                prefix[(x + 1) * channels + c] =
                    prefix[x * channels + c] + u64::from(line[x * channels + c]);
            }
        }
        for x in 0..w {
            let (start, end) = window(x, kernel, w);
            for c in 0..channels {
                rows[(y * w + x) * channels + c] =
                    prefix[end * channels + c] - prefix[start * channels + c];
            }
        }
    }

    // Vertical window sums over the horizontal sums, then divide.
    let mut out = src.clone();
    let dst: &mut [u8] = &mut out;
    let mut column = vec![0u64; h + 1];
    for x in 0..w {
        let (x_start, x_end) = window(x, kernel, w);
        let x_count = (x_end - x_start) as u64;
        for c in 0..channels {
            for y in 0..h {
                column[y + 1] = column[y] + rows[(y * w + x) * channels + c];
            }
            for y in 0..h {
                let (y_start, y_end) = window(y, kernel, h);
                let count = x_count * (y_end - y_start) as u64;
                let sum = column[y_end] - column[y_start];
                dst[(y * w + x) * channels + c] = rounded_mean(sum, count);
            }
        }
    }

    Ok(out)
}

/// Clipped window `[start, end)` of side `kernel` around index `i`.
fn window(i: usize, kernel: usize, len: usize) -> (usize, usize) {
    let half = kernel / 2;
    let start = i.saturating_sub(half);
    let end = (i + kernel - half).min(len);
    (start, end)
}

#[allow(clippy::cast_possible_truncation)]
fn rounded_mean(sum: u64, count: u64) -> u8 {
    // Mean of u8 samples never exceeds 255.
    ((sum + count / 2) / count) as u8
}

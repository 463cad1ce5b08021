//! Alpha compositing of a foreground image onto a background.
//!
//! Both images are brought to straight-alpha RGBA first, whatever their
//! native layout. The foreground is pasted onto a transparent canvas the size
//! of the background, using its own alpha as the paste mask, and the canvas
//! is then composited over the background with the Porter-Duff "over"
//! operator.

use image::{imageops, DynamicImage, Rgba, RgbaImage};
use tracing::trace;

use crate::domain::{Point, TransformError};

/// Fill of the intermediate canvas: white, fully transparent.
const CLEAR: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Composites `foreground` onto `background` with its top-left corner at `point`.
///
/// The result always has the size of `background` and is RGBA. Parts of the
/// foreground that fall outside the background are dropped. Neither input is
/// modified.
///
/// # Errors
///
/// Returns [`TransformError::ChannelMismatch`] if `foreground` has no alpha
/// channel.
pub fn overlay(
    background: &DynamicImage,
    foreground: &DynamicImage,
    point: Point,
) -> Result<DynamicImage, TransformError> {
    if !foreground.color().has_alpha() {
        return Err(TransformError::ChannelMismatch);
    }

    let base = background.to_rgba8();
    let canvas = paste_masked(base.width(), base.height(), &foreground.to_rgba8(), point);

    Ok(DynamicImage::ImageRgba8(alpha_composite(&base, &canvas)))
}

/// Pastes `src` at `point` onto a clear `width` x `height` canvas, blending
/// every channel (alpha included) by the source alpha.
fn paste_masked(width: u32, height: u32, src: &RgbaImage, point: Point) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, CLEAR);

    let Some((xs, ys)) = visible_span(src.dimensions(), (width, height), point) else {
        trace!("Foreground at ({}, {}) misses the canvas", point.x, point.y);
        return canvas;
    };

    for sy in ys.0..ys.1 {
        for sx in xs.0..xs.1 {
            let fg = src.get_pixel(sx, sy);
            let mask = fg.0[3];
            if mask == 0 {
                continue;
            }
            let (dx, dy) = offset(sx, sy, point);
            let dst = canvas.get_pixel_mut(dx, dy);
            for (d, &s) in dst.0.iter_mut().zip(fg.0.iter()) {
                *d = mix(s, *d, mask);
            }
        }
    }

    canvas
}

/// Source-pixel ranges `[start, end)` in x and y that land on the canvas.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn visible_span(
    (src_w, src_h): (u32, u32),
    (dst_w, dst_h): (u32, u32),
    point: Point,
) -> Option<((u32, u32), (u32, u32))> {
    let axis = |len: u32, dst_len: u32, at: i64| -> Option<(u32, u32)> {
        let start = at.saturating_neg().clamp(0, i64::from(len));
        let end = i64::from(dst_len).saturating_sub(at).clamp(0, i64::from(len));
        // Both ends are within 0..=len, so they fit back into u32.
        (start < end).then_some((start as u32, end as u32))
    };

    Some((axis(src_w, dst_w, point.x)?, axis(src_h, dst_h, point.y)?))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn offset(sx: u32, sy: u32, point: Point) -> (u32, u32) {
    // Only called for coordinates inside the visible span.
    (
        (i64::from(sx) + point.x) as u32,
        (i64::from(sy) + point.y) as u32,
    )
}

/// `(s * m + d * (255 - m)) / 255`, rounded.
#[allow(clippy::cast_possible_truncation)]
fn mix(s: u8, d: u8, m: u8) -> u8 {
    let m = u32::from(m);
    ((u32::from(s) * m + u32::from(d) * (255 - m) + 127) / 255) as u8
}

/// Porter-Duff `src` over `dst` in straight alpha. Both images share a size.
fn alpha_composite(dst: &RgbaImage, src: &RgbaImage) -> RgbaImage {
    let mut out = dst.clone();
    imageops::overlay(&mut out, src, 0, 0);
    out
}

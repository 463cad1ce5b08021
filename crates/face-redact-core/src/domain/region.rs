//! Rectangles and placement points in image pixel coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TransformError;

/// Axis-aligned rectangle `(x1, y1)`-`(x2, y2)`, right and bottom edges exclusive.
///
/// Construction does not validate anything: detectors are free to report
/// boxes that leave the image. Use [`Rect::bounds_in`] before touching pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x1: i32,
    /// Top edge (inclusive).
    pub y1: i32,
    /// Right edge (exclusive).
    pub x2: i32,
    /// Bottom edge (exclusive).
    pub y2: i32,
}

impl Rect {
    /// Creates a rectangle from its corner coordinates.
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Signed width, `x2 - x1`. Non-positive for malformed rectangles.
    #[must_use]
    pub fn width(&self) -> i64 {
        i64::from(self.x2) - i64::from(self.x1)
    }

    /// Signed height, `y2 - y1`. Non-positive for malformed rectangles.
    #[must_use]
    pub fn height(&self) -> i64 {
        i64::from(self.y2) - i64::from(self.y1)
    }

    /// Top-left corner as a placement point.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(i64::from(self.x1), i64::from(self.y1))
    }

    /// Checks that the rectangle is non-empty and lies inside a
    /// `width` x `height` image, returning its unsigned bounds.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidRegion`] otherwise.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn bounds_in(&self, width: u32, height: u32) -> Result<RegionBounds, TransformError> {
        let inside = self.x1 >= 0
            && self.y1 >= 0
            && self.width() > 0
            && self.height() > 0
            && i64::from(self.x2) <= i64::from(width)
            && i64::from(self.y2) <= i64::from(height);

        if !inside {
            return Err(TransformError::InvalidRegion {
                rect: *self,
                width,
                height,
            });
        }

        // All four values are non-negative and bounded by u32 dimensions here.
        Ok(RegionBounds {
            x: self.x1 as u32,
            y: self.y1 as u32,
            width: self.width() as u32,
            height: self.height() as u32,
        })
    }

    /// Intersects the rectangle with a `width` x `height` image.
    ///
    /// Returns `None` when nothing of the rectangle is left.
    #[must_use]
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let max_x = i64::from(width);
        let max_y = i64::from(height);
        let x1 = i64::from(self.x1).clamp(0, max_x);
        let y1 = i64::from(self.y1).clamp(0, max_y);
        let x2 = i64::from(self.x2).clamp(0, max_x);
        let y2 = i64::from(self.y2).clamp(0, max_y);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        let to_i32 = |v: i64| i32::try_from(v).unwrap_or(i32::MAX);
        Some(Self::new(to_i32(x1), to_i32(y1), to_i32(x2), to_i32(y2)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// A validated rectangle expressed as unsigned offset and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels, always > 0.
    pub width: u32,
    /// Height in pixels, always > 0.
    pub height: u32,
}

/// Placement offset of a foreground image on a background.
///
/// May be negative; whatever falls outside the background is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset in background pixels.
    pub x: i64,
    /// Vertical offset in background pixels.
    pub y: i64,
}

impl Point {
    /// Creates a placement point.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

//! Bounding-box and label annotation.

use std::fmt;

use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, ImageBuffer, Pixel, Rgb, Rgba};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect as DrawRect;
use tracing::debug;

use super::{region_bounds, RegionTransform};
use crate::domain::{FaceRegion, RegionBounds, TransformError};

/// Horizontal offset of the label from the box's left edge.
const LABEL_DX: i32 = -1;
/// Gap between the label's baseline and the box's top edge.
const LABEL_GAP: i32 = 4;

/// Drawing parameters for [`AnnotateTransform`].
#[derive(Clone)]
pub struct AnnotateStyle {
    /// Box outline color (RGB).
    pub box_color: [u8; 3],
    /// Outline thickness in pixels, drawn inward from the region edge.
    pub line_width: u32,
    /// Label text color (RGB).
    pub label_color: [u8; 3],
    /// Font for labels. Without one, labels are skipped.
    pub font: Option<FontArc>,
    /// Label height in pixels.
    pub font_size: f32,
}

impl Default for AnnotateStyle {
    fn default() -> Self {
        Self {
            box_color: [255, 0, 0],
            line_width: 2,
            label_color: [0, 255, 0],
            font: None,
            font_size: 20.0,
        }
    }
}

impl fmt::Debug for AnnotateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotateStyle")
            .field("box_color", &self.box_color)
            .field("line_width", &self.line_width)
            .field("label_color", &self.label_color)
            .field("font", &self.font.as_ref().map(|_| "<font>"))
            .field("font_size", &self.font_size)
            .finish()
    }
}

/// Draws the region outline and, when given one, a text label just above it.
///
/// Unlike the other transforms this may change pixels outside the region:
/// the label sits above the top-left corner and is cut off at the image
/// border without being moved.
#[derive(Debug, Clone, Default)]
pub struct AnnotateTransform {
    style: AnnotateStyle,
}

impl AnnotateTransform {
    /// Creates an annotator with the given style.
    #[must_use]
    pub const fn new(style: AnnotateStyle) -> Self {
        Self { style }
    }

    /// The drawing style.
    #[must_use]
    pub const fn style(&self) -> &AnnotateStyle {
        &self.style
    }

    fn draw<P>(
        &self,
        canvas: &mut ImageBuffer<P, Vec<u8>>,
        bounds: RegionBounds,
        label: Option<&str>,
        box_color: P,
        label_color: P,
    ) where
        P: Pixel<Subpixel = u8>,
    {
        let (x, y) = (to_i32(bounds.x), to_i32(bounds.y));

        for inset in 0..self.style.line_width {
            let width = bounds.width.saturating_sub(2 * inset);
            let height = bounds.height.saturating_sub(2 * inset);
            if width == 0 || height == 0 {
                break;
            }
            let step = to_i32(inset);
            let outline = DrawRect::at(x + step, y + step).of_size(width, height);
            draw_hollow_rect_mut(canvas, outline, box_color);
        }

        let Some(text) = label else {
            return;
        };
        let Some(font) = &self.style.font else {
            debug!("No font configured, skipping label {text:?}");
            return;
        };

        let scale = PxScale::from(self.style.font_size);
        let (_, text_height) = text_size(scale, font, text);
        let top = y - LABEL_GAP - to_i32(text_height);
        draw_text_mut(canvas, label_color, x + LABEL_DX, top, scale, font, text);
    }
}

impl RegionTransform for AnnotateTransform {
    fn name(&self) -> &'static str {
        "annotate"
    }

    fn apply(
        &self,
        image: &DynamicImage,
        region: &FaceRegion,
    ) -> Result<DynamicImage, TransformError> {
        let bounds = region_bounds(image, region.rect)?;
        let label = region.label.as_deref();
        let [br, bg, bb] = self.style.box_color;
        let [lr, lg, lb] = self.style.label_color;

        debug!("Annotating {} (label: {:?})", region.rect, label);

        let mut out = image.clone();
        match &mut out {
            DynamicImage::ImageRgb8(buf) => {
                self.draw(buf, bounds, label, Rgb([br, bg, bb]), Rgb([lr, lg, lb]));
            }
            DynamicImage::ImageRgba8(buf) => {
                let box_color = Rgba([br, bg, bb, 255]);
                self.draw(buf, bounds, label, box_color, Rgba([lr, lg, lb, 255]));
            }
            other => {
                return Err(TransformError::UnsupportedColorType(format!(
                    "{:?}",
                    other.color()
                )));
            }
        }
        Ok(out)
    }
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;
    use crate::domain::Rect;

    const BG: Rgb<u8> = Rgb([10, 10, 10]);

    fn blank() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, BG))
    }

    fn labelled(font_size: f32) -> AnnotateTransform {
        let font = FontArc::try_from_slice(include_bytes!(
            "../../tests/fixtures/DejaVuSansMono.ttf"
        ))
        .unwrap_or_else(|e| panic!("{e}"));
        AnnotateTransform::new(AnnotateStyle {
            font: Some(font),
            font_size,
            ..AnnotateStyle::default()
        })
    }

    /// Pixels outside `rect` that differ from the background.
    fn changed_outside(out: &RgbImage, rect: Rect) -> Vec<(u32, u32, Rgb<u8>)> {
        out.enumerate_pixels()
            .filter(|&(x, y, px)| {
                let (x, y) = (i64::from(x), i64::from(y));
                let inside = (i64::from(rect.x1)..i64::from(rect.x2)).contains(&x)
                    && (i64::from(rect.y1)..i64::from(rect.y2)).contains(&y);
                !inside && *px != BG
            })
            .map(|(x, y, px)| (x, y, *px))
            .collect()
    }

    #[test]
    fn test_draws_outline_of_configured_width() {
        let out = AnnotateTransform::default()
            .apply(&blank(), &FaceRegion::new(Rect::new(10, 10, 30, 40)))
            .unwrap_or_else(|e| panic!("{e}"))
            .to_rgb8();

        let red = Rgb([255, 0, 0]);
        let bg = Rgb([10, 10, 10]);
        // Two pixel thick outline, drawn inward.
        assert_eq!(*out.get_pixel(10, 10), red);
        assert_eq!(*out.get_pixel(11, 11), red);
        assert_eq!(*out.get_pixel(29, 39), red);
        assert_eq!(*out.get_pixel(28, 20), red);
        assert_eq!(*out.get_pixel(12, 12), bg);
        assert_eq!(*out.get_pixel(20, 25), bg);
        // Nothing leaks outside the region.
        assert_eq!(*out.get_pixel(9, 10), bg);
        assert_eq!(*out.get_pixel(30, 39), bg);
        assert_eq!(*out.get_pixel(20, 40), bg);
    }

    #[test]
    fn test_label_without_font_is_skipped() {
        let region = FaceRegion::new(Rect::new(10, 20, 30, 40)).with_label("M,42");
        let out = AnnotateTransform::default()
            .apply(&blank(), &region)
            .unwrap_or_else(|e| panic!("{e}"))
            .to_rgb8();

        // Above the box nothing changes.
        for y in 0..20 {
            for x in 0..50 {
                assert_eq!(*out.get_pixel(x, y), Rgb([10, 10, 10]));
            }
        }
    }

    #[test]
    fn test_label_drawn_above_box() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(80, 80, BG));
        let rect = Rect::new(20, 40, 60, 70);
        let out = labelled(20.0)
            .apply(&image, &FaceRegion::new(rect).with_label("M,31"))
            .unwrap_or_else(|e| panic!("{e}"))
            .to_rgb8();

        let label = changed_outside(&out, rect);
        assert!(!label.is_empty(), "no label pixels drawn");
        assert!(label.iter().all(|&(_, y, _)| y < 40), "label overlaps the box");
        let lowest = label.iter().map(|&(_, y, _)| y).max().unwrap_or(0);
        assert!(lowest >= 36, "label baseline too high: lowest row {lowest}");
        assert!(label.iter().all(|&(x, _, _)| x >= 19));
        // Fully covered glyph pixels carry the label color.
        assert!(label
            .iter()
            .any(|&(_, _, px)| px.0[1] >= 200 && px.0[0] <= 60 && px.0[2] <= 60));
        // The box itself is still drawn.
        assert_eq!(*out.get_pixel(20, 40), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_label_at_top_edge_is_clipped() {
        let rect = Rect::new(0, 0, 30, 30);
        let out = labelled(20.0)
            .apply(&blank(), &FaceRegion::new(rect).with_label("F,25"))
            .unwrap_or_else(|e| panic!("{e}"))
            .to_rgb8();

        assert_eq!(out.dimensions(), (50, 50));
        assert_eq!(*out.get_pixel(0, 0), Rgb([255, 0, 0]));
        assert!(changed_outside(&out, rect).is_empty());
    }

    #[test]
    fn test_label_partly_above_image_is_clipped() {
        let rect = Rect::new(5, 8, 40, 45);
        let out = labelled(20.0)
            .apply(&blank(), &FaceRegion::new(rect).with_label("M,64"))
            .unwrap_or_else(|e| panic!("{e}"))
            .to_rgb8();

        let label = changed_outside(&out, rect);
        assert!(!label.is_empty());
        assert!(label.iter().all(|&(_, y, _)| y < 8));
    }

    #[test]
    fn test_font_without_label_draws_box_only() {
        let rect = Rect::new(10, 20, 30, 40);
        let out = labelled(20.0)
            .apply(&blank(), &FaceRegion::new(rect))
            .unwrap_or_else(|e| panic!("{e}"))
            .to_rgb8();
        assert!(changed_outside(&out, rect).is_empty());
    }

    #[test]
    fn test_thin_region_stops_insetting() {
        let style = AnnotateStyle {
            line_width: 5,
            ..AnnotateStyle::default()
        };
        let out = AnnotateTransform::new(style)
            .apply(&blank(), &FaceRegion::new(Rect::new(0, 0, 3, 50)))
            .unwrap_or_else(|e| panic!("{e}"))
            .to_rgb8();
        assert_eq!(*out.get_pixel(1, 25), Rgb([255, 0, 0]));
        assert_eq!(*out.get_pixel(3, 25), Rgb([10, 10, 10]));
    }

    #[test]
    fn test_input_not_mutated() {
        let img = blank();
        let before = img.to_rgb8();
        let _ = AnnotateTransform::default().apply(&img, &FaceRegion::new(Rect::new(0, 0, 5, 5)));
        assert_eq!(img.to_rgb8(), before);
    }

    #[test]
    fn test_rejects_invalid_region() {
        let result =
            AnnotateTransform::default().apply(&blank(), &FaceRegion::new(Rect::new(5, 5, 5, 9)));
        assert!(matches!(result, Err(TransformError::InvalidRegion { .. })));
    }
}

//! Synthetic image and face builders for testing.

use face_redact_core::{DetectedFace, Rect, Sex};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use serde_json::{json, Value};

/// Builder for creating synthetic test images.
///
/// Photos are 8-bit RGB; overlay images are 8-bit RGBA.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    // === Photos ===

    /// Creates a black and white checkerboard with 8 pixel cells.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> DynamicImage {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Creates a checkerboard with custom cell size.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> DynamicImage {
        let cell = cell_size.max(1);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    /// Creates a single-color image.
    #[must_use]
    pub fn uniform(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    /// Creates a red/green gradient over x/y with constant blue.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let r = (u32::from(u8::MAX) * x / width.max(1)) as u8;
            let g = (u32::from(u8::MAX) * y / height.max(1)) as u8;
            Rgb([r, g, 96])
        });
        DynamicImage::ImageRgb8(img)
    }

    /// Creates deterministic high-frequency noise; every pixel differs from
    /// its neighbours.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn noise(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let v = x
                .wrapping_mul(2_654_435_761)
                .wrapping_add(y.wrapping_mul(2_246_822_519))
                .rotate_left(13);
            Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    // === Overlay images ===

    /// Creates a yellow disc on a fully transparent square, like a smiley
    /// sticker.
    #[must_use]
    pub fn smiley(size: u32) -> DynamicImage {
        let r = f64::from(size) / 2.0;
        let img = RgbaImage::from_fn(size, size, |x, y| {
            let dx = f64::from(x) + 0.5 - r;
            let dy = f64::from(y) + 0.5 - r;
            if dx.mul_add(dx, dy * dy) <= r * r {
                Rgba([255, 214, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    /// Creates a single-color RGBA image.
    #[must_use]
    pub fn uniform_rgba(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
    }
}

/// Builder for [`DetectedFace`] values.
#[derive(Debug, Clone)]
pub struct FaceBuilder {
    face: DetectedFace,
}

impl FaceBuilder {
    /// Starts a face with the given bounding box.
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            face: DetectedFace::new(Rect::new(x1, y1, x2, y2)),
        }
    }

    /// Sets the age.
    #[must_use]
    pub const fn age(mut self, age: u32) -> Self {
        self.face.age = Some(age);
        self
    }

    /// Sets sex to male.
    #[must_use]
    pub const fn male(mut self) -> Self {
        self.face.sex = Some(Sex::Male);
        self
    }

    /// Sets sex to female.
    #[must_use]
    pub const fn female(mut self) -> Self {
        self.face.sex = Some(Sex::Female);
        self
    }

    /// Sets the detection score.
    #[must_use]
    pub const fn score(mut self, score: f32) -> Self {
        self.face.score = Some(score);
        self
    }

    /// Returns the face.
    #[must_use]
    pub fn build(self) -> DetectedFace {
        self.face
    }
}

/// Renders faces in the JSON face-list format read by the CLI.
#[must_use]
pub fn faces_json(faces: &[DetectedFace]) -> String {
    let records: Vec<Value> = faces
        .iter()
        .map(|f| {
            let mut record = json!({
                "bbox": [f.bbox.x1, f.bbox.y1, f.bbox.x2, f.bbox.y2],
            });
            if let Some(score) = f.score {
                record["score"] = json!(score);
            }
            if let Some(age) = f.age {
                record["age"] = json!(age);
            }
            if let Some(sex) = f.sex {
                record["sex"] = json!(sex.to_string());
            }
            record
        })
        .collect();
    Value::Array(records).to_string()
}

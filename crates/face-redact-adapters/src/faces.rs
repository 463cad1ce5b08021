//! Face list adapter: detections produced ahead of time by an external
//! detector and stored as JSON.
//!
//! The expected document is an array of objects:
//!
//! ```json
//! [{"bbox": [12.7, 30.2, 96.0, 128.9], "score": 0.87, "age": 31, "sex": "M"}]
//! ```
//!
//! Box coordinates are truncated towards zero. `score`, `age` and `sex` are
//! optional.

use std::path::Path;

use anyhow::{Context, Result};
use face_redact_core::{DetectedFace, FaceDetector, Rect, Sex};
use image::DynamicImage;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct FaceRecord {
    bbox: [f64; 4],
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    sex: Option<Sex>,
}

impl From<FaceRecord> for DetectedFace {
    fn from(record: FaceRecord) -> Self {
        let [x1, y1, x2, y2] = record.bbox.map(truncate);
        Self {
            bbox: Rect::new(x1, y1, x2, y2),
            score: record.score,
            age: record.age,
            sex: record.sex,
        }
    }
}

/// Float-to-int casts saturate, NaN becomes 0.
#[allow(clippy::cast_possible_truncation)]
fn truncate(v: f64) -> i32 {
    v.trunc() as i32
}

/// Detector that returns a fixed list of faces read from JSON, whatever the
/// image.
#[derive(Debug, Clone, Default)]
pub struct JsonFaceSource {
    faces: Vec<DetectedFace>,
}

impl JsonFaceSource {
    /// Reads a face list from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read face list: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse face list: {}", path.display()))
    }

    /// Parses a face list from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a list of face records.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<FaceRecord> = serde_json::from_str(json)?;
        Ok(Self {
            faces: records.into_iter().map(DetectedFace::from).collect(),
        })
    }

    /// The faces in file order.
    #[must_use]
    pub fn faces(&self) -> &[DetectedFace] {
        &self.faces
    }
}

impl FaceDetector for JsonFaceSource {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectedFace>> {
        debug!(
            "Returning {} stored faces for {}x{} image",
            self.faces.len(),
            image.width(),
            image.height()
        );
        Ok(self.faces.clone())
    }
}

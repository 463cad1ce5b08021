//! SeetaFace frontal detector via the `rustface` crate.

use std::io::Cursor;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use face_redact_core::{DetectedFace, FaceDetector, Rect};
use image::DynamicImage;
use tracing::debug;

/// Smallest face side the detector looks for, in pixels.
const MIN_FACE_SIZE: u32 = 20;
/// Classifier score a window needs to count as a face.
const SCORE_THRESHOLD: f64 = 2.0;
/// Scale step between pyramid levels.
const PYRAMID_SCALE: f32 = 0.8;
/// Sliding window step in pixels.
const WINDOW_STEP: u32 = 4;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// Reports bounding boxes and scores only; age and sex stay unset, so
/// annotation draws boxes without labels.
pub struct RustfaceDetector {
    model_data: Vec<u8>,
}

impl RustfaceDetector {
    /// Loads the SeetaFace model (e.g. `seeta_fd_frontal_v1.0.bin`) from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid model.
    pub fn from_path(path: &Path) -> Result<Self> {
        let model_data = std::fs::read(path)
            .with_context(|| format!("Failed to read face model: {}", path.display()))?;
        rustface::read_model(Cursor::new(&model_data))
            .map_err(|e| anyhow!("Invalid face model {}: {e}", path.display()))?;
        debug!("Loaded SeetaFace model from {}", path.display());
        Ok(Self { model_data })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectedFace>> {
        let model = rustface::read_model(Cursor::new(&self.model_data))
            .map_err(|e| anyhow!("Invalid face model: {e}"))?;
        let mut detector = rustface::create_detector_with_model(model);
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESHOLD);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE);
        detector.set_slide_window_step(WINDOW_STEP, WINDOW_STEP);

        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
        debug!("SeetaFace found {} faces", faces.len());

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                let x2 = bbox.x().saturating_add(to_i32(bbox.width()));
                let y2 = bbox.y().saturating_add(to_i32(bbox.height()));
                #[allow(clippy::cast_possible_truncation)]
                let score = face.score() as f32;
                DetectedFace::new(Rect::new(bbox.x(), bbox.y(), x2, y2)).with_score(score)
            })
            .collect())
    }
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

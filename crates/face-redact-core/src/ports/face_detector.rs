//! Face detection port.

use crate::domain::DetectedFace;

/// Port for detecting faces in a decoded image.
///
/// Called once per run. The returned order is the order in which faces are
/// processed; the core never re-sorts it.
pub trait FaceDetector: Send + Sync {
    /// Returns the faces found in `image`, possibly none.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn detect(&self, image: &image::DynamicImage) -> anyhow::Result<Vec<DetectedFace>>;
}

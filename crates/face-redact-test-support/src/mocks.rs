//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use face_redact_core::{DetectedFace, FaceDetector};
use image::DynamicImage;

/// Mock implementation of `FaceDetector` for testing.
///
/// Returns pre-built faces (or an error) and tracks calls for assertions.
pub struct MockFaceDetector {
    faces: Vec<DetectedFace>,
    fail_with: Option<String>,
    call_count: Arc<Mutex<usize>>,
}

impl MockFaceDetector {
    /// Creates a detector that always reports `faces`.
    #[must_use]
    pub fn new(faces: Vec<DetectedFace>) -> Self {
        Self {
            faces,
            fail_with: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a detector that finds nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Creates a detector that always fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::empty()
        }
    }

    /// Returns the number of times `detect` has been called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self
            .call_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<DetectedFace>> {
        *self
            .call_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;

        match self.fail_with {
            Some(ref message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(self.faces.clone()),
        }
    }
}

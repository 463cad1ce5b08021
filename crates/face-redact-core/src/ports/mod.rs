//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod face_detector;

pub use face_detector::FaceDetector;

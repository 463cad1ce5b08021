//! Test support utilities for face-redact.
//!
//! Provides mocks, synthetic image builders, and face builders for testing
//! the region transforms and the redact pipeline.
//!
//! # Example
//!
//! ```
//! use face_redact_test_support::{FaceBuilder, MockFaceDetector, SyntheticImageBuilder};
//!
//! // Create a synthetic photo and a face inside it
//! let photo = SyntheticImageBuilder::checkerboard(128, 128);
//! let face = FaceBuilder::new(10, 10, 60, 70).age(31).male().build();
//!
//! // Create a mock detector that reports it
//! let detector = MockFaceDetector::new(vec![face]);
//! ```

mod builders;
mod mocks;

pub use builders::{faces_json, FaceBuilder, SyntheticImageBuilder};
pub use mocks::MockFaceDetector;

//! Core domain types for face region transforms.

mod error;
mod face;
mod region;

pub use error::TransformError;
pub use face::{DetectedFace, FaceRegion, Sex};
pub use region::{Point, Rect, RegionBounds};

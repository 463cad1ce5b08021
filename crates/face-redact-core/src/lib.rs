//! Face Redact Core - region transforms for detected faces
//!
//! This crate contains the domain types, the face detector port, the alpha
//! compositor, and the four region strategies (blur, pixelate, image overlay,
//! annotate) together with the applier that runs one of them over every face
//! of an image.

pub mod applier;
pub mod compositor;
pub mod config;
pub mod domain;
pub mod ports;
pub mod transforms;

pub use applier::{FaceRegionApplier, RegionPolicy};
pub use config::TransformConfig;
pub use domain::{DetectedFace, FaceRegion, Point, Rect, Sex, TransformError};
pub use ports::FaceDetector;
pub use transforms::{AnnotateStyle, RegionTransform, Strategy, StrategyKind};

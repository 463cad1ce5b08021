//! Face Redact Adapters - External adapters for face-redact.
//!
//! This crate provides adapters for:
//! - Filesystem image loading, saving and output naming
//! - Face lists stored as JSON
//! - Font loading for annotation labels
//! - The SeetaFace detector (`rustface` feature)

pub mod faces;
pub mod fonts;
pub mod fs;
#[cfg(feature = "rustface")]
pub mod rustface_backend;

pub use faces::JsonFaceSource;
pub use fonts::load_font;
pub use fs::{load_image, load_overlay, save_image, timestamped_output_path};
#[cfg(feature = "rustface")]
pub use rustface_backend::RustfaceDetector;

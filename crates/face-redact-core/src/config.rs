//! Transform configuration.

use std::sync::Arc;

use image::DynamicImage;

use crate::applier::RegionPolicy;
use crate::transforms::{AnnotateStyle, DEFAULT_KERNEL_SIZE, DEFAULT_SAMPLE_SIZE};

/// Parameters for every strategy, plus the region policy used when applying
/// them. Only the fields relevant to the selected strategy are read.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Blur kernel side in pixels.
    pub kernel_size: u32,
    /// Pixelation blocks per side.
    pub sample_size: u32,
    /// Image pasted over each face by the overlay strategy.
    pub overlay_image: Option<Arc<DynamicImage>>,
    /// Annotation colors, line width and font.
    pub annotate: AnnotateStyle,
    /// How rectangles reaching outside the image are handled.
    pub region_policy: RegionPolicy,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            sample_size: DEFAULT_SAMPLE_SIZE,
            overlay_image: None,
            annotate: AnnotateStyle::default(),
            region_policy: RegionPolicy::default(),
        }
    }
}

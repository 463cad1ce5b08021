//! Tagged strategy selection.

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::{AnnotateTransform, BlurTransform, OverlayTransform, PixelateTransform, RegionTransform};
use crate::config::TransformConfig;
use crate::domain::{FaceRegion, TransformError};

/// Names of the available strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Box blur.
    Blur,
    /// Mosaic.
    #[default]
    Pixelate,
    /// Fixed image overlay.
    Overlay,
    /// Bounding box and label.
    Annotate,
}

impl StrategyKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 4] = [Self::Blur, Self::Pixelate, Self::Overlay, Self::Annotate];

    /// Lowercase name as used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Pixelate => "pixelate",
            Self::Overlay => "overlay",
            Self::Annotate => "annotate",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown strategy '{s}', expected one of: blur, pixelate, overlay, annotate")
            })
    }
}

/// One configured region transform. Selected once per run and applied to
/// every face.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Box blur.
    Blur(BlurTransform),
    /// Mosaic.
    Pixelate(PixelateTransform),
    /// Fixed image overlay.
    ImageOverlay(OverlayTransform),
    /// Bounding box and label.
    Annotate(AnnotateTransform),
}

impl Strategy {
    /// Builds the strategy named by `kind` from the shared configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MissingParameter`] when `kind` is
    /// [`StrategyKind::Overlay`] and no overlay image is configured.
    pub fn from_config(kind: StrategyKind, config: &TransformConfig) -> Result<Self, TransformError> {
        Ok(match kind {
            StrategyKind::Blur => Self::Blur(BlurTransform::new(config.kernel_size)),
            StrategyKind::Pixelate => Self::Pixelate(PixelateTransform::new(config.sample_size)),
            StrategyKind::Overlay => {
                let image = config
                    .overlay_image
                    .clone()
                    .ok_or(TransformError::MissingParameter("overlay image"))?;
                Self::ImageOverlay(OverlayTransform::new(image))
            }
            StrategyKind::Annotate => Self::Annotate(AnnotateTransform::new(config.annotate.clone())),
        })
    }

    /// The kind this strategy was built from.
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::Blur(_) => StrategyKind::Blur,
            Self::Pixelate(_) => StrategyKind::Pixelate,
            Self::ImageOverlay(_) => StrategyKind::Overlay,
            Self::Annotate(_) => StrategyKind::Annotate,
        }
    }

    fn inner(&self) -> &dyn RegionTransform {
        match self {
            Self::Blur(t) => t,
            Self::Pixelate(t) => t,
            Self::ImageOverlay(t) => t,
            Self::Annotate(t) => t,
        }
    }
}

impl RegionTransform for Strategy {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn apply(
        &self,
        image: &DynamicImage,
        region: &FaceRegion,
    ) -> Result<DynamicImage, TransformError> {
        self.inner().apply(image, region)
    }
}

//! Sequential application of one strategy to every detected face.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TransformConfig;
use crate::domain::{DetectedFace, FaceRegion, Rect, TransformError};
use crate::transforms::{RegionTransform, Strategy, StrategyKind};

/// What to do with a detector rectangle that reaches outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionPolicy {
    /// Reject it with [`TransformError::InvalidRegion`].
    #[default]
    Strict,
    /// Intersect it with the image first. An empty intersection is still
    /// rejected.
    Clamp,
}

impl std::str::FromStr for RegionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "clamp" => Ok(Self::Clamp),
            other => Err(format!(
                "unknown region policy '{other}', expected 'strict' or 'clamp'"
            )),
        }
    }
}

/// Applies a single region transform to a list of faces, in list order.
///
/// Every face sees the output of the previous one, so overlapping regions
/// compose. The first failure aborts the run and no partial result is
/// returned.
pub struct FaceRegionApplier {
    transform: Box<dyn RegionTransform>,
    policy: RegionPolicy,
}

impl FaceRegionApplier {
    /// Creates an applier with the strict region policy.
    pub fn new(transform: impl RegionTransform + 'static) -> Self {
        Self {
            transform: Box::new(transform),
            policy: RegionPolicy::Strict,
        }
    }

    /// Builds the strategy named by `kind` and takes the region policy from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Fails if the strategy cannot be built, see [`Strategy::from_config`].
    pub fn from_config(kind: StrategyKind, config: &TransformConfig) -> Result<Self, TransformError> {
        let strategy = Strategy::from_config(kind, config)?;
        Ok(Self::new(strategy).with_policy(config.region_policy))
    }

    /// Sets the region policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RegionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active region policy.
    #[must_use]
    pub const fn policy(&self) -> RegionPolicy {
        self.policy
    }

    /// Name of the wrapped transform.
    #[must_use]
    pub fn transform_name(&self) -> &'static str {
        self.transform.name()
    }

    /// Runs the transform over `faces` and returns the final image. With no
    /// faces the result is an unchanged copy of `image`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised for any face.
    pub fn run(
        &self,
        image: &DynamicImage,
        faces: &[DetectedFace],
    ) -> Result<DynamicImage, TransformError> {
        let mut current = image.clone();

        for (index, face) in faces.iter().enumerate() {
            let rect = self.resolve(face.bbox, &current)?;
            let mut region = FaceRegion::new(rect);
            region.label = face.label();

            debug!(
                "Face {index}: {} {} (label: {:?})",
                self.transform.name(),
                rect,
                region.label
            );

            current = self.transform.apply(&current, &region)?;
        }

        Ok(current)
    }

    fn resolve(&self, rect: Rect, image: &DynamicImage) -> Result<Rect, TransformError> {
        let (width, height) = (image.width(), image.height());
        match self.policy {
            RegionPolicy::Strict => Ok(rect),
            RegionPolicy::Clamp => {
                let clamped = rect.clamp_to(width, height).ok_or(TransformError::InvalidRegion {
                    rect,
                    width,
                    height,
                })?;
                if clamped != rect {
                    debug!("Clamped {rect} to {clamped}");
                }
                Ok(clamped)
            }
        }
    }
}

impl std::fmt::Debug for FaceRegionApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceRegionApplier")
            .field("transform", &self.transform.name())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use image::{Rgb, RgbImage};

    use super::*;
    use crate::domain::Sex;
    use crate::transforms::PixelateTransform;

    fn gradient() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(64, 48, |x, y| {
            Rgb([(x * 4) as u8, (y * 5) as u8, ((x ^ y) * 3) as u8])
        }))
    }

    /// Records the regions it sees and leaves the image alone.
    #[derive(Default)]
    struct Recorder {
        calls: Arc<AtomicUsize>,
        labels: Arc<std::sync::Mutex<Vec<Option<String>>>>,
    }

    impl RegionTransform for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn apply(
            &self,
            image: &DynamicImage,
            region: &FaceRegion,
        ) -> Result<DynamicImage, TransformError> {
            region.rect.bounds_in(image.width(), image.height())?;
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut labels) = self.labels.lock() {
                labels.push(region.label.clone());
            }
            Ok(image.clone())
        }
    }

    #[test]
    fn test_no_faces_returns_copy() {
        let img = gradient();
        let applier = FaceRegionApplier::new(PixelateTransform::default());
        let out = applier.run(&img, &[]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(out.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn test_faces_processed_in_order_with_labels() {
        let recorder = Recorder::default();
        let labels = Arc::clone(&recorder.labels);
        let applier = FaceRegionApplier::new(recorder);

        let faces = [
            DetectedFace::new(Rect::new(0, 0, 10, 10))
                .with_age(31)
                .with_sex(Sex::Male),
            DetectedFace::new(Rect::new(5, 5, 20, 20)).with_age(40),
        ];
        applier.run(&gradient(), &faces).unwrap_or_else(|e| panic!("{e}"));

        let seen = labels.lock().map(|l| l.clone()).unwrap_or_default();
        assert_eq!(seen, vec![Some("M,31".to_string()), None]);
    }

    #[test]
    fn test_first_error_aborts() {
        let recorder = Recorder::default();
        let calls = Arc::clone(&recorder.calls);
        let applier = FaceRegionApplier::new(recorder);

        let faces = [
            DetectedFace::new(Rect::new(0, 0, 10, 10)),
            DetectedFace::new(Rect::new(60, 0, 70, 10)),
            DetectedFace::new(Rect::new(0, 0, 10, 10)),
        ];
        let result = applier.run(&gradient(), &faces);

        assert!(matches!(result, Err(TransformError::InvalidRegion { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clamp_policy_intersects() {
        let applier =
            FaceRegionApplier::new(PixelateTransform::new(2)).with_policy(RegionPolicy::Clamp);
        let img = gradient();
        let out = applier
            .run(&img, &[DetectedFace::new(Rect::new(-10, -10, 8, 8))])
            .unwrap_or_else(|e| panic!("{e}"))
            .to_rgb8();

        let orig = img.to_rgb8();
        assert_eq!(out.get_pixel(8, 8), orig.get_pixel(8, 8));
        assert_eq!(out.get_pixel(0, 0), out.get_pixel(3, 3));
    }

    #[test]
    fn test_clamp_policy_rejects_disjoint() {
        let applier =
            FaceRegionApplier::new(PixelateTransform::default()).with_policy(RegionPolicy::Clamp);
        let result = applier.run(&gradient(), &[DetectedFace::new(Rect::new(70, 0, 90, 10))]);
        assert!(matches!(result, Err(TransformError::InvalidRegion { .. })));
    }

    #[test]
    fn test_from_config_takes_policy() {
        let config = TransformConfig {
            region_policy: RegionPolicy::Clamp,
            ..TransformConfig::default()
        };
        let applier = FaceRegionApplier::from_config(StrategyKind::Blur, &config)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(applier.policy(), RegionPolicy::Clamp);
        assert_eq!(applier.transform_name(), "blur");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Clamp".parse::<RegionPolicy>(), Ok(RegionPolicy::Clamp));
        assert_eq!("strict".parse::<RegionPolicy>(), Ok(RegionPolicy::Strict));
        assert!("loose".parse::<RegionPolicy>().is_err());
    }
}

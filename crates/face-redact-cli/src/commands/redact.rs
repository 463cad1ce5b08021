//! Redact command - apply one strategy to every face of an image.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use face_redact_adapters::{
    load_font, load_image, load_overlay, save_image, timestamped_output_path, JsonFaceSource,
};
use face_redact_core::{
    AnnotateStyle, FaceDetector, FaceRegionApplier, RegionPolicy, StrategyKind, TransformConfig,
};
use tracing::{debug, info};

use crate::config::AppConfig;

/// Hardcoded default values.
mod defaults {
    pub const OUTPUT_FORMAT: &str = "jpg";
}

/// Parse a size that must be at least one pixel.
fn parse_size(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid size"))?;
    if value >= 1 {
        Ok(value)
    } else {
        Err("size must be at least 1".to_string())
    }
}

/// Parse a positive font size.
fn parse_font_size(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{value} is not a positive font size"))
    }
}

/// Arguments for redacting one image.
#[derive(Args, Clone)]
pub struct RedactArgs {
    /// Image to process
    pub input: PathBuf,

    /// Strategy applied to every face [default: pixelate]
    #[arg(short, long, value_name = "blur|pixelate|overlay|annotate")]
    pub strategy: Option<StrategyKind>,

    /// JSON face list: [{"bbox": [x1, y1, x2, y2], "age": 31, "sex": "M"}, ...]
    #[arg(long, value_name = "FILE")]
    pub faces: Option<PathBuf>,

    /// SeetaFace model used to detect faces (requires the `rustface` feature)
    #[arg(long, value_name = "FILE")]
    pub face_model: Option<PathBuf>,

    /// Blur kernel size in pixels [default: 15]
    #[arg(long, value_parser = parse_size)]
    pub kernel_size: Option<u32>,

    /// Pixelation blocks per side [default: 10]
    #[arg(long, value_parser = parse_size)]
    pub sample_size: Option<u32>,

    /// Image with alpha channel pasted over faces by the overlay strategy
    #[arg(long, value_name = "FILE")]
    pub overlay: Option<PathBuf>,

    /// Font for annotation labels; labels are skipped without one
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Annotation label height in pixels [default: 20]
    #[arg(long, value_parser = parse_font_size)]
    pub font_size: Option<f32>,

    /// Annotation box line width in pixels [default: 2]
    #[arg(long, value_parser = parse_size)]
    pub line_width: Option<u32>,

    /// Handling of face boxes reaching outside the image [default: strict]
    #[arg(long, value_name = "strict|clamp")]
    pub region_policy: Option<RegionPolicy>,

    /// Output file (overrides --output-dir and --format)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory for the timestamped output file [default: .]
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Extension of the timestamped output file [default: jpg]
    #[arg(long, value_name = "EXT")]
    pub format: Option<String>,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl RedactArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods and core)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        // Invalid strings were already reported by `AppConfig::validate`.
        if args.strategy.is_none() {
            args.strategy = config.strategy.kind.as_ref().and_then(|s| s.parse().ok());
        }
        if args.region_policy.is_none() {
            args.region_policy = config
                .strategy
                .region_policy
                .as_ref()
                .and_then(|s| s.parse().ok());
        }

        args.kernel_size = args
            .kernel_size
            .or(config.blur.kernel_size.filter(|&k| k > 0));
        args.sample_size = args
            .sample_size
            .or(config.pixelate.sample_size.filter(|&s| s > 0));
        args.line_width = args
            .line_width
            .or(config.annotate.line_width.filter(|&w| w > 0));
        args.font_size = args.font_size.or(config
            .annotate
            .font_size
            .filter(|&s| s > 0.0 && s.is_finite()));

        if args.overlay.is_none() {
            args.overlay.clone_from(&config.overlay.image);
        }
        if args.font.is_none() {
            args.font.clone_from(&config.annotate.font);
        }
        if args.face_model.is_none() {
            args.face_model.clone_from(&config.detection.model);
        }
        if args.output_dir.is_none() {
            args.output_dir.clone_from(&config.output.dir);
        }
        if args.format.is_none() {
            args.format.clone_from(&config.output.format);
        }

        // Colors have no CLI flags and are read from here.
        args.config = Some(config.clone());

        args
    }

    /// Get strategy with fallback to pixelate.
    fn strategy(&self) -> StrategyKind {
        self.strategy.unwrap_or_default()
    }

    /// Get output extension with fallback to JPEG.
    fn format(&self) -> &str {
        self.format
            .as_deref()
            .unwrap_or(defaults::OUTPUT_FORMAT)
    }
}

/// Result of running the redact command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct RedactResult {
    /// Number of faces processed.
    pub faces: usize,
    /// Where the image was written.
    pub output: PathBuf,
}

/// Run the redact command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &RedactArgs) -> Result<RedactResult> {
    let kind = args.strategy();
    info!("Redacting {} with {kind}", args.input.display());

    let image = load_image(&args.input)?;
    let detector = build_detector(args)?;
    let config = build_transform_config(args, kind)?;
    let applier = FaceRegionApplier::from_config(kind, &config)?;

    let faces = detector.detect(&image).context("Face detection failed")?;
    info!("Number of faces: {}", faces.len());

    let redacted = applier
        .run(&image, &faces)
        .with_context(|| format!("Failed to {kind} faces in {}", args.input.display()))?;

    let output = match args.output {
        Some(ref path) => path.clone(),
        None => {
            let dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            timestamped_output_path(&dir, args.format())
        }
    };
    save_image(&redacted, &output)?;
    info!("Wrote {}", output.display());
    println!("{}", output.display());

    Ok(RedactResult {
        faces: faces.len(),
        output,
    })
}

/// Pick the face source: a JSON face list wins over a detector model.
fn build_detector(args: &RedactArgs) -> Result<Box<dyn FaceDetector>> {
    if let Some(ref path) = args.faces {
        debug!("Reading faces from {}", path.display());
        return Ok(Box::new(JsonFaceSource::from_path(path)?));
    }

    match args.face_model {
        Some(ref model) => model_detector(model),
        None => bail!("No face source given. Use --faces <FILE> or --face-model <FILE>."),
    }
}

#[cfg(feature = "rustface")]
fn model_detector(model: &std::path::Path) -> Result<Box<dyn FaceDetector>> {
    debug!("Detecting faces with {}", model.display());
    Ok(Box::new(face_redact_adapters::RustfaceDetector::from_path(
        model,
    )?))
}

#[cfg(not(feature = "rustface"))]
fn model_detector(model: &std::path::Path) -> Result<Box<dyn FaceDetector>> {
    bail!(
        "Cannot use face model {}: built without the `rustface` feature",
        model.display()
    )
}

/// Build the core configuration from merged args. Files are only loaded for
/// the strategy that needs them.
fn build_transform_config(args: &RedactArgs, kind: StrategyKind) -> Result<TransformConfig> {
    let mut config = TransformConfig::default();
    let file = args.config.as_ref();

    if let Some(k) = args.kernel_size {
        config.kernel_size = k;
    }
    if let Some(s) = args.sample_size {
        config.sample_size = s;
    }
    if let Some(policy) = args.region_policy {
        config.region_policy = policy;
    }

    match kind {
        StrategyKind::Overlay => {
            let Some(ref path) = args.overlay else {
                bail!("The overlay strategy needs an image. Use --overlay <FILE>.");
            };
            config.overlay_image = Some(Arc::new(load_overlay(path)?));
        }
        StrategyKind::Annotate => {
            let defaults = AnnotateStyle::default();
            config.annotate = AnnotateStyle {
                box_color: file
                    .and_then(|c| c.annotate.box_color)
                    .unwrap_or(defaults.box_color),
                line_width: args.line_width.unwrap_or(defaults.line_width),
                label_color: file
                    .and_then(|c| c.annotate.label_color)
                    .unwrap_or(defaults.label_color),
                font: args.font.as_deref().map(load_font).transpose()?,
                font_size: args.font_size.unwrap_or(defaults.font_size),
            };
        }
        StrategyKind::Blur | StrategyKind::Pixelate => {}
    }

    Ok(config)
}

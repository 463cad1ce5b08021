//! Configuration file support for face-redact.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/face-redact/config.toml` (lowest priority)
//! - Project-local: `.face-redact.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use face_redact_core::{RegionPolicy, StrategyKind};
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Strategy selection.
    pub strategy: StrategyConfig,
    /// Blur settings.
    pub blur: BlurConfig,
    /// Pixelation settings.
    pub pixelate: PixelateConfig,
    /// Image overlay settings.
    pub overlay: OverlayConfig,
    /// Annotation settings.
    pub annotate: AnnotateConfig,
    /// Face source settings.
    pub detection: DetectionConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// Strategy selection.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Strategy name: "blur", "pixelate", "overlay" or "annotate".
    pub kind: Option<String>,
    /// Out-of-bounds handling: "strict" or "clamp".
    pub region_policy: Option<String>,
}

/// Blur configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Kernel side in pixels.
    pub kernel_size: Option<u32>,
}

/// Pixelation configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PixelateConfig {
    /// Mosaic blocks per side.
    pub sample_size: Option<u32>,
}

/// Image overlay configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Image with alpha channel pasted over each face.
    pub image: Option<PathBuf>,
}

/// Annotation configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// Box color as `[r, g, b]`.
    pub box_color: Option<[u8; 3]>,
    /// Box line width in pixels.
    pub line_width: Option<u32>,
    /// Label color as `[r, g, b]`.
    pub label_color: Option<[u8; 3]>,
    /// TrueType/OpenType font for labels.
    pub font: Option<PathBuf>,
    /// Label height in pixels.
    pub font_size: Option<f32>,
}

/// Face source configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// SeetaFace model file (`rustface` builds only).
    pub model: Option<PathBuf>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for timestamped output files.
    pub dir: Option<PathBuf>,
    /// Output file extension, e.g. "jpg" or "png".
    pub format: Option<String>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/face-redact/config.toml`
    /// 2. Project-local: `.face-redact.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref kind) = self.strategy.kind {
            kind.parse::<StrategyKind>()
                .map_err(|e| format!("strategy.kind: {e}"))?;
        }
        if let Some(ref policy) = self.strategy.region_policy {
            policy
                .parse::<RegionPolicy>()
                .map_err(|e| format!("strategy.region_policy: {e}"))?;
        }

        if self.blur.kernel_size == Some(0) {
            return Err("blur.kernel_size must be at least 1".to_string());
        }
        if self.pixelate.sample_size == Some(0) {
            return Err("pixelate.sample_size must be at least 1".to_string());
        }
        if self.annotate.line_width == Some(0) {
            return Err("annotate.line_width must be at least 1".to_string());
        }
        if let Some(size) = self.annotate.font_size {
            if !(size > 0.0 && size.is_finite()) {
                return Err(format!("annotate.font_size must be positive, got {size}"));
            }
        }

        if let Some(ref f) = self.output.format {
            if !face_redact_adapters::fs::is_supported_image(Path::new(&format!("output.{f}"))) {
                return Err(format!("output.format '{f}' is not a supported image type"));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // Strategy
        self.strategy.kind = other.strategy.kind.or_else(|| self.strategy.kind.take());
        self.strategy.region_policy = other
            .strategy
            .region_policy
            .or_else(|| self.strategy.region_policy.take());

        // Blur / pixelate
        self.blur.kernel_size = other.blur.kernel_size.or(self.blur.kernel_size);
        self.pixelate.sample_size = other.pixelate.sample_size.or(self.pixelate.sample_size);

        // Overlay
        self.overlay.image = other.overlay.image.or_else(|| self.overlay.image.take());

        // Annotate
        self.annotate.box_color = other.annotate.box_color.or(self.annotate.box_color);
        self.annotate.line_width = other.annotate.line_width.or(self.annotate.line_width);
        self.annotate.label_color = other.annotate.label_color.or(self.annotate.label_color);
        self.annotate.font = other.annotate.font.or_else(|| self.annotate.font.take());
        self.annotate.font_size = other.annotate.font_size.or(self.annotate.font_size);

        // Detection
        self.detection.model = other.detection.model.or_else(|| self.detection.model.take());

        // Output
        self.output.dir = other.output.dir.or_else(|| self.output.dir.take());
        self.output.format = other.output.format.or_else(|| self.output.format.take());
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("face-redact").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.face-redact.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".face-redact.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.strategy.kind.is_none());
        assert!(config.blur.kernel_size.is_none());
        assert!(config.annotate.font.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: AppConfig = toml::from_str("").expect("parse empty config");
        assert!(config.pixelate.sample_size.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r"
[strategy]
kind = 'annotate'
region_policy = 'clamp'

[blur]
kernel_size = 21

[pixelate]
sample_size = 8

[overlay]
image = 'smiley.png'

[annotate]
box_color = [0, 0, 255]
line_width = 3
label_color = [255, 255, 0]
font = '/usr/share/fonts/DejaVuSans.ttf'
font_size = 24.0

[detection]
model = 'seeta_fd_frontal_v1.0.bin'

[output]
dir = 'out'
format = 'png'
";
        let config: AppConfig = toml::from_str(toml).expect("parse full config");

        assert_eq!(config.strategy.kind.as_deref(), Some("annotate"));
        assert_eq!(config.strategy.region_policy.as_deref(), Some("clamp"));
        assert_eq!(config.blur.kernel_size, Some(21));
        assert_eq!(config.pixelate.sample_size, Some(8));
        assert_eq!(config.overlay.image, Some(PathBuf::from("smiley.png")));
        assert_eq!(config.annotate.box_color, Some([0, 0, 255]));
        assert_eq!(config.annotate.line_width, Some(3));
        assert_eq!(config.annotate.label_color, Some([255, 255, 0]));
        assert_eq!(config.annotate.font_size, Some(24.0));
        assert_eq!(
            config.detection.model,
            Some(PathBuf::from("seeta_fd_frontal_v1.0.bin"))
        );
        assert_eq!(config.output.dir, Some(PathBuf::from("out")));
        assert_eq!(config.output.format.as_deref(), Some("png"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_configs() {
        let mut base: AppConfig = toml::from_str(
            r"
[blur]
kernel_size = 9

[pixelate]
sample_size = 6
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[blur]
kernel_size = 31

[strategy]
kind = 'blur'
",
        )
        .expect("parse override");

        base.merge(override_config);

        // Kernel overridden
        assert_eq!(base.blur.kernel_size, Some(31));
        // Pixelate preserved from base
        assert_eq!(base.pixelate.sample_size, Some(6));
        // Strategy added from override
        assert_eq!(base.strategy.kind.as_deref(), Some("blur"));
    }

    #[test]
    fn test_merge_empty_override_preserves_base() {
        let mut base: AppConfig = toml::from_str(
            r"
[overlay]
image = 'smiley.png'

[annotate]
box_color = [1, 2, 3]
",
        )
        .expect("parse base");

        base.merge(AppConfig::default());

        assert_eq!(base.overlay.image, Some(PathBuf::from("smiley.png")));
        assert_eq!(base.annotate.box_color, Some([1, 2, 3]));
    }

    #[test]
    fn test_merge_empty_base_accepts_override() {
        let mut base = AppConfig::default();
        let override_config: AppConfig = toml::from_str(
            r"
[output]
format = 'png'
",
        )
        .expect("parse override");

        base.merge(override_config);

        assert_eq!(base.output.format.as_deref(), Some("png"));
    }

    // === Invalid TOML Graceful Fallback ===

    #[test]
    fn test_invalid_toml_syntax_handled() {
        let toml = r"
[blur
kernel_size = 5
";
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "invalid TOML should return error");
    }

    #[test]
    fn test_invalid_field_type_handled() {
        let toml = r#"
[annotate]
box_color = "red"
"#;
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "type mismatch should return error");
    }

    #[test]
    fn test_color_component_out_of_range() {
        let toml = r"
[annotate]
label_color = [0, 300, 0]
";
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    // === Validation Tests ===

    #[test]
    fn test_validate_unknown_strategy() {
        let mut config = AppConfig::default();
        config.strategy.kind = Some("smudge".to_string());

        let result = config.validate();
        assert!(result.unwrap_err().contains("strategy.kind"));
    }

    #[test]
    fn test_validate_unknown_region_policy() {
        let mut config = AppConfig::default();
        config.strategy.region_policy = Some("loose".to_string());

        let result = config.validate();
        assert!(result.unwrap_err().contains("strategy.region_policy"));
    }

    #[test]
    fn test_validate_zero_sizes() {
        let mut config = AppConfig::default();
        config.blur.kernel_size = Some(0);
        assert!(config.validate().unwrap_err().contains("blur.kernel_size"));

        let mut config = AppConfig::default();
        config.pixelate.sample_size = Some(0);
        assert!(config.validate().unwrap_err().contains("pixelate.sample_size"));

        let mut config = AppConfig::default();
        config.annotate.line_width = Some(0);
        assert!(config.validate().unwrap_err().contains("annotate.line_width"));
    }

    #[test]
    fn test_validate_font_size() {
        let mut config = AppConfig::default();
        config.annotate.font_size = Some(-3.0);
        assert!(config.validate().unwrap_err().contains("annotate.font_size"));
    }

    #[test]
    fn test_validate_output_format_invalid() {
        let mut config = AppConfig::default();
        config.output.format = Some("xml".to_string());
        assert!(config.validate().unwrap_err().contains("output.format"));
    }

    #[test]
    fn test_validate_empty_config_passes() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_find_config_in_parents() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(".face-redact.toml"), "").unwrap();

        let found = find_config_in_parents(&nested).unwrap();
        assert_eq!(found, temp.path().join(".face-redact.toml"));
    }
}

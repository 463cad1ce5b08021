//! Errors raised by the region-transform operators.

use thiserror::Error;

use super::Rect;

/// Precondition violations detected by a transform. Operators fail fast on
/// these instead of repairing the input.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("region {rect} is empty or outside the {width}x{height} image")]
    InvalidRegion {
        /// The offending rectangle.
        rect: Rect,
        /// Width of the image it was applied to.
        width: u32,
        /// Height of the image it was applied to.
        height: u32,
    },

    #[error("cannot resample: {0}")]
    ResamplingFailure(String),

    #[error("foreground image has no alpha channel")]
    ChannelMismatch,

    #[error("unsupported color type {0}, expected 8-bit RGB or RGBA")]
    UnsupportedColorType(String),

    #[error("missing {0}")]
    MissingParameter(&'static str),
}

//! Detected faces as handed over by a detection backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Rect;

/// Categorical sex attribute inferred by a detector.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    /// Rendered as `M`.
    #[serde(rename = "M", alias = "male")]
    Male,
    /// Rendered as `F`.
    #[serde(rename = "F", alias = "female")]
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => f.write_str("M"),
            Self::Female => f.write_str("F"),
        }
    }
}

/// A single face reported by a detector. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    /// Face bounding box in image pixels.
    pub bbox: Rect,
    /// Detection confidence, if the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Estimated age in years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Estimated sex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
}

impl DetectedFace {
    /// Creates a face with only a bounding box.
    #[must_use]
    pub const fn new(bbox: Rect) -> Self {
        Self {
            bbox,
            score: None,
            age: None,
            sex: None,
        }
    }

    /// Sets the age attribute.
    #[must_use]
    pub const fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the sex attribute.
    #[must_use]
    pub const fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    /// Sets the detection score.
    #[must_use]
    pub const fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// `"<sex>,<age>"`, only when both attributes are known.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match (self.sex, self.age) {
            (Some(sex), Some(age)) => Some(format!("{sex},{age}")),
            _ => None,
        }
    }
}

/// What a region transform gets to work on for one face: where, and
/// optionally what to write next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceRegion {
    /// Rectangle to transform.
    pub rect: Rect,
    /// Text label for annotating transforms; ignored by the others.
    pub label: Option<String>,
}

impl FaceRegion {
    /// A region without a label.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self { rect, label: None }
    }

    /// Attaches a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl From<Rect> for FaceRegion {
    fn from(rect: Rect) -> Self {
        Self::new(rect)
    }
}

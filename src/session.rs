//! State and handlers behind the Load, Detect and Save actions.
//!
//! The GUI owns one [`Session`] and forwards button presses to it. Every
//! handler either succeeds and updates the session or returns a
//! [`SessionError`] and leaves it untouched.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info};

use crate::detection::{DetectError, Detector};
use crate::models::Prediction;

/// Result line shown before any detection has run on the loaded image
pub const RESULT_PLACEHOLDER: &str = "Result: -";
/// Result line when the model found nothing
pub const NO_DETECTION: &str = "No object detected";
/// Extension used when a save path has none
pub const DEFAULT_SAVE_EXTENSION: &str = "png";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Please load an image first!")]
    NoImageLoaded,
    #[error("No image to save!")]
    NothingToSave,
    #[error("Failed to open image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to save image {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error(transparent)]
    Detect(#[from] DetectError),
}

impl SessionError {
    /// Missing-precondition errors are shown as warnings, everything else as
    /// an error
    pub fn is_warning(&self) -> bool {
        matches!(self, SessionError::NoImageLoaded | SessionError::NothingToSave)
    }
}

/// Display-only renaming of one class label, matched case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRemap {
    pub from: String,
    pub to: String,
}

impl LabelRemap {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn apply<'a>(&'a self, label: &'a str) -> &'a str {
        if label.to_lowercase() == self.from.to_lowercase() {
            &self.to
        } else {
            label
        }
    }
}

impl Default for LabelRemap {
    fn default() -> Self {
        Self::new("doll", "oyuncak")
    }
}

impl FromStr for LabelRemap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once('=')
            .ok_or_else(|| format!("expected FROM=TO, got `{}`", s))?;
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            return Err(format!("both sides of `{}` must be non-empty", s));
        }
        Ok(Self::new(from, to))
    }
}

impl fmt::Display for LabelRemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.from, self.to)
    }
}

/// Result line for a detection: remapped, upper-cased label and the
/// confidence with two decimals
pub fn format_detection(label: &str, confidence: f32, remap: &LabelRemap) -> String {
    format!(
        "Detected: {} | Confidence: {:.2}",
        remap.apply(label).to_uppercase(),
        confidence
    )
}

/// The currently loaded and displayed image
#[derive(Debug, Clone)]
pub struct Session {
    loaded_path: Option<PathBuf>,
    current_image: Option<RgbImage>,
    result_text: String,
    remap: LabelRemap,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(LabelRemap::default())
    }
}

impl Session {
    pub fn new(remap: LabelRemap) -> Self {
        Self {
            loaded_path: None,
            current_image: None,
            result_text: RESULT_PLACEHOLDER.to_string(),
            remap,
        }
    }

    pub fn loaded_path(&self) -> Option<&Path> {
        self.loaded_path.as_deref()
    }

    /// The buffer currently shown in the preview; Save writes exactly this
    pub fn current_image(&self) -> Option<&RgbImage> {
        self.current_image.as_ref()
    }

    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    /// Decode `path` and make it the current image
    pub fn load(&mut self, path: &Path) -> Result<&RgbImage, SessionError> {
        let image = image::open(path)
            .map_err(|source| SessionError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        info!(
            "Loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        self.loaded_path = Some(path.to_path_buf());
        self.result_text = RESULT_PLACEHOLDER.to_string();
        Ok(self.current_image.insert(image))
    }

    /// The path detection should run on
    pub fn detect_target(&self) -> Result<PathBuf, SessionError> {
        self.loaded_path.clone().ok_or(SessionError::NoImageLoaded)
    }

    /// Run the detector on the loaded file and show its first result set
    pub fn detect(&mut self, detector: &dyn Detector) -> Result<&str, SessionError> {
        let path = self.detect_target()?;
        let predictions = detector.predict(&path)?;
        self.apply_predictions(predictions)
    }

    /// Show detector output: the first detection of the first result set
    /// becomes the result line and the plotted image replaces the current
    /// buffer
    pub fn apply_predictions(
        &mut self,
        predictions: Vec<Prediction>,
    ) -> Result<&str, SessionError> {
        let prediction = predictions
            .into_iter()
            .next()
            .ok_or(SessionError::Detect(DetectError::NoResults))?;

        let text = match prediction.first() {
            Some(detection) => {
                format_detection(&prediction.label(detection), detection.confidence, &self.remap)
            }
            None => NO_DETECTION.to_string(),
        };

        debug!(
            "Applying {} detections: {}",
            prediction.detections.len(),
            text
        );
        self.current_image = Some(prediction.plot());
        self.result_text = text;
        Ok(&self.result_text)
    }

    /// Encode the current buffer to `path`. A path without an extension gets
    /// `.png`. Returns the path actually written.
    pub fn save(&self, path: &Path) -> Result<PathBuf, SessionError> {
        let image = self.current_image.as_ref().ok_or(SessionError::NothingToSave)?;

        let path = if path.extension().is_none() {
            path.with_extension(DEFAULT_SAVE_EXTENSION)
        } else {
            path.to_path_buf()
        };

        image.save(&path).map_err(|source| SessionError::Encode {
            path: path.clone(),
            source,
        })?;

        info!("Saved {}", path.display());
        Ok(path)
    }
}

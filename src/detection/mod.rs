pub mod annotate;
pub mod preprocessing;
pub mod yolo;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::models::{ClassNames, Prediction};

pub use yolo::{MIN_INPUT_SIZE, YoloConfig, YoloDetector};

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("model file not found: {}", .0.display())]
    ModelMissing(PathBuf),
    #[error("failed to load model {}: {message}", .path.display())]
    ModelLoad { path: PathBuf, message: String },
    #[error("failed to read class names {}: {source}", .path.display())]
    Labels {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("model input size {0} is below the minimum of {min}", min = MIN_INPUT_SIZE)]
    InputSize(u32),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output shape {0:?}")]
    OutputShape(Vec<usize>),
    #[error("detector returned no results")]
    NoResults,
    #[error("detection worker failed: {0}")]
    Worker(String),
}

/// Object detector operating on image files.
///
/// `predict` returns one result set per input image; for a single path that
/// is normally exactly one `Prediction`.
pub trait Detector: Send + Sync {
    fn predict(&self, path: &Path) -> Result<Vec<Prediction>, DetectError>;

    fn class_names(&self) -> &ClassNames;
}

/// Run `predict` on a blocking worker so the caller's executor stays free
pub async fn predict_in_background(
    detector: Arc<dyn Detector>,
    path: PathBuf,
) -> Result<Vec<Prediction>, DetectError> {
    debug!("Dispatching detection for {}", path.display());
    tokio::task::spawn_blocking(move || detector.predict(&path))
        .await
        .map_err(|e| DetectError::Worker(e.to_string()))?
}

use std::path::PathBuf;
use std::sync::Arc;

use crate::detection::DetectError;
use crate::models::Prediction;

#[derive(Debug, Clone)]
pub enum Message {
    LoadPressed,
    DetectPressed,
    SavePressed,
    ImagePicked(Option<PathBuf>),
    SavePathPicked(Option<PathBuf>),
    /// Outcome of a background detection on the given image
    Detected(PathBuf, Result<Vec<Prediction>, Arc<DetectError>>),
    DialogClosed,
}

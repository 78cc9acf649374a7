use std::path::PathBuf;

use clap::Parser;

use crate::detection::{MIN_INPUT_SIZE, YoloConfig};
use crate::session::LabelRemap;

/// Extension of the class names file looked up next to the model
pub const NAMES_EXTENSION: &str = "names";

#[derive(Parser, Debug, Clone)]
#[command(name = "detectview")]
#[command(about = "Load an image, run an object detection model on it and save the annotated result")]
pub struct Config {
    /// Path to the detection model weights
    #[arg(long, value_name = "FILE", default_value = "best.rten")]
    pub model: PathBuf,

    /// Class names file, one name per line [default: model path with a .names extension]
    #[arg(long, value_name = "FILE")]
    pub labels: Option<PathBuf>,

    /// Minimum confidence for a detection to be kept
    #[arg(long, value_name = "THRESHOLD", default_value_t = 0.25)]
    pub confidence: f32,

    /// IoU above which overlapping boxes of the same class are suppressed
    #[arg(long, value_name = "THRESHOLD", default_value_t = 0.7)]
    pub iou: f32,

    /// Square input size the model was exported with
    #[arg(
        long,
        value_name = "PIXELS",
        default_value_t = 640,
        value_parser = clap::value_parser!(u32).range(MIN_INPUT_SIZE as i64..)
    )]
    pub input_size: u32,

    /// Maximum number of detections kept per image
    #[arg(long, value_name = "COUNT", default_value_t = 300)]
    pub max_detections: usize,

    /// Display-only renaming of one class label
    #[arg(long, value_name = "FROM=TO", default_value = "doll=oyuncak")]
    pub rename: LabelRemap,

    /// Run once on this image without opening a window
    #[arg(long, value_name = "IMAGE")]
    pub input: Option<PathBuf>,

    /// Where to save the annotated image in headless mode
    #[arg(long, value_name = "FILE", requires = "input")]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn labels_path(&self) -> PathBuf {
        self.labels
            .clone()
            .unwrap_or_else(|| self.model.with_extension(NAMES_EXTENSION))
    }

    pub fn detector_config(&self) -> YoloConfig {
        YoloConfig {
            model_path: self.model.clone(),
            labels_path: self.labels_path(),
            input_size: self.input_size,
            confidence_threshold: self.confidence,
            iou_threshold: self.iou,
            max_detections: self.max_detections,
        }
    }
}

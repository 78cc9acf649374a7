use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use tracing::{debug, info, warn};

use crate::detection::preprocessing::{Letterbox, letterbox};
use crate::detection::{DetectError, Detector};
use crate::models::{BoundingBox, ClassNames, Detection, Prediction};

/// Number of box coordinates preceding the class scores in each anchor row
const BOX_VALUES: usize = 4;

/// Smallest square input accepted; YOLO heads downsample by up to 32
pub const MIN_INPUT_SIZE: u32 = 32;

/// Detector settings
#[derive(Debug, Clone)]
pub struct YoloConfig {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

/// YOLOv8-style detector executed with rten
pub struct YoloDetector {
    model: Model,
    config: YoloConfig,
    names: Arc<ClassNames>,
}

impl YoloDetector {
    pub fn new(config: YoloConfig) -> Result<Self, DetectError> {
        if config.input_size < MIN_INPUT_SIZE {
            return Err(DetectError::InputSize(config.input_size));
        }
        if !config.model_path.exists() {
            return Err(DetectError::ModelMissing(config.model_path.clone()));
        }

        info!("Loading model from {}", config.model_path.display());
        let model = Model::load_file(&config.model_path).map_err(|e| DetectError::ModelLoad {
            path: config.model_path.clone(),
            message: e.to_string(),
        })?;

        let names = Arc::new(load_class_names(&config.labels_path)?);
        info!(
            "Model loaded ({} class names, input {}x{})",
            names.len(),
            config.input_size,
            config.input_size
        );

        Ok(Self {
            model,
            config,
            names,
        })
    }

    fn infer(&self, input: &Letterbox) -> Result<(Vec<usize>, Vec<f32>), DetectError> {
        let size = self.config.input_size as usize;
        let tensor = NdTensor::from_data([1, 3, size, size], input.to_nchw());

        let output = self
            .model
            .run_one(tensor.view().into(), None)
            .map_err(|e| DetectError::Inference(e.to_string()))?;
        let output: NdTensor<f32, 3> = output
            .try_into()
            .map_err(|e| DetectError::Inference(format!("{e:?}")))?;

        Ok((output.shape().to_vec(), output.to_vec()))
    }
}

impl Detector for YoloDetector {
    fn predict(&self, path: &Path) -> Result<Vec<Prediction>, DetectError> {
        let image = image::open(path)
            .map_err(|source| DetectError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        let started = Instant::now();
        let input = letterbox(&image, self.config.input_size);
        let (shape, data) = self.infer(&input)?;
        let candidates = decode(&shape, &data, self.config.confidence_threshold)?;

        let mut detections: Vec<Detection> = candidates
            .into_iter()
            .map(|d| Detection {
                bbox: input.to_source(&d.bbox),
                ..d
            })
            .collect();
        detections = non_max_suppression(detections, self.config.iou_threshold);
        detections.truncate(self.config.max_detections);

        debug!(
            "Detected {} objects in {} ({:.1?})",
            detections.len(),
            path.display(),
            started.elapsed()
        );

        Ok(vec![Prediction::new(image, detections, self.names.clone())])
    }

    fn class_names(&self) -> &ClassNames {
        &self.names
    }
}

/// Read a names file, falling back to numeric names when it does not exist
pub fn load_class_names(path: &Path) -> Result<ClassNames, DetectError> {
    if !path.exists() {
        warn!(
            "Class names file {} not found, using numeric class names",
            path.display()
        );
        return Ok(ClassNames::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| DetectError::Labels {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ClassNames::parse(&contents))
}

/// Decode a raw `[1, 4 + classes, anchors]` output (or its transpose) into
/// candidate detections in model input coordinates.
///
/// The layout is inferred from the shape: YOLOv8 exports have far more
/// anchors than classes, so the longer axis is taken as the anchor axis.
pub fn decode(shape: &[usize], data: &[f32], threshold: f32) -> Result<Vec<Detection>, DetectError> {
    let [batch, a, b] = shape else {
        return Err(DetectError::OutputShape(shape.to_vec()));
    };
    let (batch, a, b) = (*batch, *a, *b);
    if batch != 1 || a.min(b) <= BOX_VALUES || data.len() != a * b {
        return Err(DetectError::OutputShape(shape.to_vec()));
    }

    let transposed = a > b;
    let (rows, anchors) = if transposed { (b, a) } else { (a, b) };
    let value = |row: usize, anchor: usize| {
        if transposed {
            data[anchor * rows + row]
        } else {
            data[row * anchors + anchor]
        }
    };

    let mut detections = Vec::new();
    for anchor in 0..anchors {
        let (class_id, confidence) = (BOX_VALUES..rows)
            .map(|row| (row - BOX_VALUES, value(row, anchor)))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        if confidence < threshold {
            continue;
        }

        detections.push(Detection {
            class_id,
            confidence,
            bbox: BoundingBox::from_center(
                value(0, anchor),
                value(1, anchor),
                value(2, anchor),
                value(3, anchor),
            ),
        });
    }

    Ok(detections)
}

/// Class-aware non-maximum suppression. Output is sorted by confidence,
/// highest first.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::new();
    for det in detections {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == det.class_id && k.bbox.iou(&det.bbox) > iou_threshold);
        if !suppressed {
            kept.push(det);
        }
    }

    kept
}

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use detectview::{BoundingBox, ClassNames, DetectError, Detection, Detector, Prediction};
use image::{ImageBuffer, Rgb};
use tempfile::NamedTempFile;

/// Creates a 100x100 image of one colour and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image(color: [u8; 3]) -> NamedTempFile {
    let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb(color));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Creates a temp file with a .png suffix that is not a decodable image
pub fn create_corrupt_image() -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp file");
    std::fs::write(file.path(), b"definitely not a png").expect("Failed to write temp file");
    file
}

/// Class table used by the stub detector
pub fn test_names() -> Arc<ClassNames> {
    Arc::new(ClassNames::new(vec!["cat".to_string(), "doll".to_string()]))
}

pub const DOLL: usize = 1;

/// Builds a detection of a centred 40x40 box
pub fn make_detection(class_id: usize, confidence: f32) -> Detection {
    Detection {
        class_id,
        confidence,
        bbox: BoundingBox::from_center(50.0, 50.0, 40.0, 40.0),
    }
}

/// Detector returning fixed detections for whatever image it is given
pub struct StubDetector {
    detections: Vec<Detection>,
    names: Arc<ClassNames>,
    calls: AtomicUsize,
}

impl StubDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            names: test_names(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for StubDetector {
    fn predict(&self, path: &Path) -> Result<Vec<Prediction>, DetectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let image = image::open(path)
            .map_err(|source| DetectError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        Ok(vec![Prediction::new(
            image,
            self.detections.clone(),
            self.names.clone(),
        )])
    }

    fn class_names(&self) -> &ClassNames {
        &self.names
    }
}

/// Detector whose inference always fails
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn predict(&self, _path: &Path) -> Result<Vec<Prediction>, DetectError> {
        Err(DetectError::Inference("stub failure".to_string()))
    }

    fn class_names(&self) -> &ClassNames {
        static EMPTY: std::sync::OnceLock<ClassNames> = std::sync::OnceLock::new();
        EMPTY.get_or_init(ClassNames::default)
    }
}

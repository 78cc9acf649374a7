use std::sync::Arc;

use image::RgbImage;

/// Bounding box in source image pixels, stored as corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BoundingBox {
    /// Build a box from YOLO-style centre coordinates
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x_min: cx - width / 2.0,
            y_min: cy - height / 2.0,
            x_max: cx + width / 2.0,
            y_max: cy + height / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        (self.x_max - self.x_min).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y_max - self.y_min).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x_min.max(other.x_min);
        let y1 = self.y_min.max(other.y_min);
        let x2 = self.x_max.min(other.x_max);
        let y2 = self.y_max.min(other.y_max);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Clamp the box to an image of the given size
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            x_min: self.x_min.clamp(0.0, w),
            y_min: self.y_min.clamp(0.0, h),
            x_max: self.x_max.clamp(0.0, w),
            y_max: self.y_max.clamp(0.0, h),
        }
    }
}

/// A single object found by the detector
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Class index to class name table exposed by a detector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Parse a names file: one class per line, blank lines skipped
    pub fn parse(contents: &str) -> Self {
        let names = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Name for a class index. Unknown indices render as `class{id}`.
    pub fn name(&self, class_id: usize) -> String {
        self.names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class{}", class_id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One result set: the image the detector ran on plus the boxes it found,
/// ordered by descending confidence
#[derive(Debug, Clone)]
pub struct Prediction {
    pub image: RgbImage,
    pub detections: Vec<Detection>,
    pub names: Arc<ClassNames>,
}

impl Prediction {
    pub fn new(image: RgbImage, detections: Vec<Detection>, names: Arc<ClassNames>) -> Self {
        Self {
            image,
            detections,
            names,
        }
    }

    /// The highest-confidence detection, if any
    pub fn first(&self) -> Option<&Detection> {
        self.detections.first()
    }

    /// Class name of a detection in this result set
    pub fn label(&self, detection: &Detection) -> String {
        self.names.name(detection.class_id)
    }

    /// Render a copy of the source image with every box and label drawn in
    pub fn plot(&self) -> RgbImage {
        crate::detection::annotate::Annotator::default().plot(self)
    }
}

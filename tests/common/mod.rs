mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from detectview for tests
pub use detectview::{
    BoundingBox, ClassNames, DetectError, Detection, Detector, LabelRemap, Prediction, Session,
    SessionError,
};

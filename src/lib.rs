pub mod config;
pub mod detection;
pub mod models;
pub mod preview;
pub mod session;

pub use config::Config;
pub use detection::{DetectError, Detector, YoloConfig, YoloDetector};
pub use models::{BoundingBox, ClassNames, Detection, Prediction};
pub use session::{LabelRemap, Session, SessionError};

#[cfg(feature = "gui")]
pub mod gui;

use std::sync::Arc;

use iced::widget::{column, container, image, row};
use iced::{Alignment::Center, ContentFit, Element, Length, Task, Theme};
use tracing::{debug, info};

use super::{AppState, Message, dialogs, widgets};
use crate::detection::{DetectError, Detector, predict_in_background};
use crate::session::{LabelRemap, Session, SessionError};

pub const WINDOW_TITLE: &str = "YOLOv8 Cat & Oyuncak Detection";
pub const WINDOW_WIDTH: f32 = 900.0;
pub const WINDOW_HEIGHT: f32 = 700.0;

const PREVIEW_HINT: &str = "Load an image to start";

pub struct DetectApp {
    state: AppState,
}

impl DetectApp {
    pub fn new(detector: Result<Arc<dyn Detector>, String>, remap: LabelRemap) -> Self {
        Self {
            state: AppState::new(Session::new(remap), detector),
        }
    }

    pub fn title(&self) -> String {
        WINDOW_TITLE.to_string()
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoadPressed => dialogs::pick_image(),
            Message::ImagePicked(None) | Message::SavePathPicked(None) => Task::none(),
            Message::ImagePicked(Some(path)) => match self.state.session.load(&path) {
                Ok(_) => {
                    self.state.refresh_preview();
                    Task::none()
                }
                Err(e) => dialogs::report(&e),
            },
            Message::DetectPressed => {
                let path = match self.state.session.detect_target() {
                    Ok(path) => path,
                    Err(e) => return dialogs::report(&e),
                };
                let detector = match &self.state.detector {
                    Ok(detector) => detector.clone(),
                    Err(reason) => {
                        return dialogs::show_error(format!("Model is not available: {}", reason));
                    }
                };

                info!("Running detection on {}", path.display());
                self.state.busy = true;
                let target = path.clone();
                Task::perform(predict_in_background(detector, path), move |result| {
                    Message::Detected(target, result.map_err(Arc::new))
                })
            }
            Message::Detected(path, result) => {
                self.state.busy = false;
                // Another image was loaded while this one was being processed
                if self.state.session.loaded_path() != Some(path.as_path()) {
                    debug!("Discarding stale detection for {}", path.display());
                    return Task::none();
                }
                let applied: Result<(), SessionError> = match result {
                    Ok(predictions) => self.state.session.apply_predictions(predictions).map(|_| ()),
                    Err(e) => Err(unwrap_shared(e).into()),
                };
                match applied {
                    Ok(()) => {
                        debug!("Result: {}", self.state.session.result_text());
                        self.state.refresh_preview();
                        Task::none()
                    }
                    Err(e) => dialogs::report(&e),
                }
            }
            Message::SavePressed => match self.state.session.current_image() {
                Some(_) => dialogs::pick_save_path(),
                None => dialogs::report(&SessionError::NothingToSave),
            },
            Message::SavePathPicked(Some(path)) => match self.state.session.save(&path) {
                Ok(saved) => dialogs::saved(&saved),
                Err(e) => dialogs::report(&e),
            },
            Message::DialogClosed => Task::none(),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let idle = !self.state.busy;
        let enabled = |message: Message| idle.then_some(message);

        let preview: Element<'_, Message> = match &self.state.preview {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Contain)
                .into(),
            None => widgets::preview_hint(PREVIEW_HINT),
        };

        let buttons = row![
            widgets::action_button("Load Image", enabled(Message::LoadPressed)),
            widgets::action_button(
                if idle { "Detect" } else { "Detecting..." },
                enabled(Message::DetectPressed)
            ),
            widgets::action_button("Save Result", enabled(Message::SavePressed)),
        ]
        .spacing(20);

        let content = column![
            widgets::preview_frame(preview),
            widgets::result_line(self.state.session.result_text()),
            buttons,
        ]
        .spacing(20)
        .padding(20)
        .align_x(Center);

        container(content)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(widgets::window_style)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Recover the error from a message payload; only the GUI holds the `Arc`
fn unwrap_shared(err: Arc<DetectError>) -> DetectError {
    Arc::try_unwrap(err).unwrap_or_else(|shared| DetectError::Worker(shared.to_string()))
}

/// Open the main window and run the event loop until it is closed
pub fn run(detector: Result<Arc<dyn Detector>, String>, remap: LabelRemap) -> iced::Result {
    info!("Starting GUI");
    iced::application(
        move || DetectApp::new(detector.clone(), remap.clone()),
        DetectApp::update,
        DetectApp::view,
    )
    .title(DetectApp::title)
    .theme(DetectApp::theme)
    .window_size((WINDOW_WIDTH, WINDOW_HEIGHT))
    .resizable(false)
    .run()
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use ::image::{Rgb, RgbImage};
    use tempfile::TempDir;

    use super::*;
    use crate::models::{BoundingBox, ClassNames, Detection, Prediction};
    use crate::session::RESULT_PLACEHOLDER;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    /// Reports one doll in the top-left quarter of any image
    struct DollDetector {
        names: Arc<ClassNames>,
    }

    impl DollDetector {
        fn shared() -> Arc<dyn Detector> {
            Arc::new(Self {
                names: Arc::new(ClassNames::new(vec!["cat".into(), "doll".into()])),
            })
        }
    }

    impl Detector for DollDetector {
        fn predict(&self, path: &Path) -> Result<Vec<Prediction>, DetectError> {
            let image = ::image::open(path)
                .map_err(|source| DetectError::Image {
                    path: path.to_path_buf(),
                    source,
                })?
                .to_rgb8();
            let doll = Detection {
                class_id: 1,
                confidence: 0.87,
                bbox: BoundingBox { x_min: 10.0, y_min: 10.0, x_max: 50.0, y_max: 50.0 },
            };
            Ok(vec![Prediction::new(image, vec![doll], self.names.clone())])
        }

        fn class_names(&self) -> &ClassNames {
            &self.names
        }
    }

    fn write_image(dir: &TempDir, name: &str, color: Rgb<u8>) -> anyhow::Result<PathBuf> {
        let path = dir.path().join(name);
        RgbImage::from_pixel(100, 100, color).save(&path)?;
        Ok(path)
    }

    fn pixel(app: &DetectApp, x: u32, y: u32) -> Option<Rgb<u8>> {
        app.state.session.current_image().map(|img| *img.get_pixel(x, y))
    }

    #[test]
    fn test_detection_result_is_applied_to_loaded_image() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let first = write_image(&dir, "first.png", RED)?;
        let detector = DollDetector::shared();
        let mut app = DetectApp::new(Ok(detector.clone()), LabelRemap::default());

        let _ = app.update(Message::ImagePicked(Some(first.clone())));
        let _ = app.update(Message::DetectPressed);
        assert!(app.state.busy);

        let predictions = detector.predict(&first)?;
        let _ = app.update(Message::Detected(first.clone(), Ok(predictions)));

        assert!(!app.state.busy);
        assert_eq!(app.state.session.result_text(), "Detected: OYUNCAK | Confidence: 0.87");
        assert_ne!(pixel(&app, 10, 30), Some(RED));
        assert!(app.state.preview.is_some());

        Ok(())
    }

    #[test]
    fn test_stale_detection_is_discarded_after_reload() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let first = write_image(&dir, "first.png", RED)?;
        let second = write_image(&dir, "second.png", BLUE)?;
        let detector = DollDetector::shared();
        let mut app = DetectApp::new(Ok(detector.clone()), LabelRemap::default());

        // 1. Detection starts on the first image
        let _ = app.update(Message::ImagePicked(Some(first.clone())));
        let _ = app.update(Message::DetectPressed);
        assert!(app.state.busy);

        // 2. A file dialog opened earlier delivers the second image
        let _ = app.update(Message::ImagePicked(Some(second.clone())));

        // 3. The first image's result arrives late
        let predictions = detector.predict(&first)?;
        let _ = app.update(Message::Detected(first, Ok(predictions)));

        assert!(!app.state.busy);
        assert_eq!(app.state.session.loaded_path(), Some(second.as_path()));
        assert_eq!(app.state.session.result_text(), RESULT_PLACEHOLDER);
        // No box was drawn over the second image
        assert_eq!(pixel(&app, 10, 30), Some(BLUE));

        Ok(())
    }

    #[test]
    fn test_detect_without_model_leaves_state_untouched() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let first = write_image(&dir, "first.png", RED)?;
        let mut app = DetectApp::new(
            Err("model file not found: best.rten".to_string()),
            LabelRemap::default(),
        );

        let _ = app.update(Message::ImagePicked(Some(first.clone())));
        let _ = app.update(Message::DetectPressed);

        assert!(!app.state.busy);
        assert_eq!(app.state.session.loaded_path(), Some(first.as_path()));
        assert_eq!(app.state.session.result_text(), RESULT_PLACEHOLDER);
        assert_eq!(pixel(&app, 10, 30), Some(RED));

        Ok(())
    }

    #[test]
    fn test_detect_without_image_does_not_start() {
        let mut app = DetectApp::new(Ok(DollDetector::shared()), LabelRemap::default());

        let _ = app.update(Message::DetectPressed);

        assert!(!app.state.busy);
        assert!(app.state.session.current_image().is_none());
        assert!(app.state.preview.is_none());
    }
}

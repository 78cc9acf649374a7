use std::sync::Arc;

use iced::widget::image::Handle;

use crate::detection::Detector;
use crate::preview;
use crate::session::Session;

pub struct AppState {
    pub session: Session,
    /// The loaded detector, or why it could not be loaded
    pub detector: Result<Arc<dyn Detector>, String>,
    pub preview: Option<Handle>,
    /// A detection is running in the background
    pub busy: bool,
}

impl AppState {
    pub fn new(session: Session, detector: Result<Arc<dyn Detector>, String>) -> Self {
        Self {
            session,
            detector,
            preview: None,
            busy: false,
        }
    }

    /// Rebuild the preview from the session's current buffer
    pub fn refresh_preview(&mut self) {
        self.preview = self.session.current_image().map(|img| {
            let rendered = preview::render_preview(img);
            Handle::from_rgba(rendered.width, rendered.height, rendered.pixels)
        });
    }
}

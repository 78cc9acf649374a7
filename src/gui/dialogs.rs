use std::path::Path;

use iced::Task;
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageLevel};
use tracing::{debug, error, warn};

use crate::gui::Message;
use crate::session::SessionError;

const IMAGE_FILTER_NAME: &str = "Images";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub fn pick_image() -> Task<Message> {
    Task::perform(
        async {
            AsyncFileDialog::new()
                .set_title("Open Image")
                .add_filter(IMAGE_FILTER_NAME, IMAGE_EXTENSIONS)
                .pick_file()
                .await
        },
        |handle| Message::ImagePicked(handle.map(|h| h.path().to_path_buf())),
    )
}

pub fn pick_save_path() -> Task<Message> {
    Task::perform(
        async {
            AsyncFileDialog::new()
                .set_title("Save Image")
                .add_filter(IMAGE_FILTER_NAME, IMAGE_EXTENSIONS)
                .save_file()
                .await
        },
        |handle| Message::SavePathPicked(handle.map(|h| h.path().to_path_buf())),
    )
}

// Dialogs are built when the task is first polled, not when it is created
fn show(level: MessageLevel, title: &'static str, description: String) -> Task<Message> {
    Task::perform(
        async move {
            AsyncMessageDialog::new()
                .set_level(level)
                .set_title(title)
                .set_description(description)
                .set_buttons(MessageButtons::Ok)
                .show()
                .await
        },
        |_| Message::DialogClosed,
    )
}

pub fn info(title: &'static str, description: impl Into<String>) -> Task<Message> {
    show(MessageLevel::Info, title, description.into())
}

pub fn show_error(description: impl Into<String>) -> Task<Message> {
    show(MessageLevel::Error, "Error", description.into())
}

/// Warning dialog for unmet preconditions, error dialog for failures
pub fn report(err: &SessionError) -> Task<Message> {
    if err.is_warning() {
        warn!("{}", err);
        show(MessageLevel::Warning, "Warning", err.to_string())
    } else {
        error!("{}", err);
        show_error(err.to_string())
    }
}

pub fn saved(path: &Path) -> Task<Message> {
    debug!("Confirming save of {}", path.display());
    info("Saved", "Image saved successfully!")
}

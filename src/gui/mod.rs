mod app;
mod dialogs;
mod message;
mod state;
mod widgets;

pub use app::{DetectApp, run};
pub use message::Message;
pub use state::AppState;

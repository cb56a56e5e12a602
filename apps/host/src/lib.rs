pub mod app;
pub mod config;
pub mod dialogs;
pub mod scene;
pub mod window;

pub use app::{Editor, UI_CONTEXT};
pub use config::{load_settings, Settings};

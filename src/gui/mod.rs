//! GUI module - User interface components

mod app;
mod nav_panel;
mod pages;

pub use app::MeteoForecasterApp;
pub use nav_panel::{NavigationAction, NavigationPanel};
pub use pages::{PageAction, PageViewer};

//! UI layer for the desktop wizard: app shell, step screens and shared widgets.

pub mod app;
pub mod steps;
pub mod widgets;

pub use app::DesktopWizardApp;

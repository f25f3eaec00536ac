//! UI layer for desktop GUI: app shell, tab panels and shared widgets.

pub mod app;
pub mod panels;
pub mod widgets;

pub use app::LoanPredictorApp;

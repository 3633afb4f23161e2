//! Terminal UI layer for LeadLens.
//!
//! Provides themes, bar-chart views and the main application event loop
//! built on top of [`ratatui`] for rendering lead dashboards in the
//! terminal.

pub mod app;
pub mod chart_view;
pub mod themes;

pub use lens_core as core;

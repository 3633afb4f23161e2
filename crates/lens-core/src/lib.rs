//! Core domain layer for LeadLens.
//!
//! Defines the lead record and time-window model, error types, CLI settings
//! with last-used persistence, timezone-aware timestamp parsing and the
//! number formatting helpers shared by the other crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{LensError, Result};

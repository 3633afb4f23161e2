//! Data layer for LeadLens.
//!
//! Loads recruiting lead extracts from CSV, selects time windows,
//! aggregates counts per calendar period and assembles the dashboard
//! view model consumed by the UI crate.

pub mod aggregator;
pub mod analysis;
pub mod export;
pub mod reader;
pub mod window;

//! Runtime layer for LeadLens: cached access to the loaded dataset.

pub mod data_manager;

pub use data_manager::DataManager;

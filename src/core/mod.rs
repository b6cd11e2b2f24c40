//! Configuration, request model and the processing pipeline

pub mod config;
pub mod delivery;
pub mod models;
pub mod processor;

pub use processor::RequestProcessor;

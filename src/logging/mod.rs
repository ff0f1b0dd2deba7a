// file: src/logging/mod.rs
// version: 1.0.0
// guid: 4b8d2f61-e07a-4c39-95b1-6a3e0d7c8f29

//! Logging system for the package uploader

pub mod logger;

pub use logger::init_logger;

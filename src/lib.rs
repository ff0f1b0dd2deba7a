// file: src/lib.rs
// version: 1.0.0
// guid: 62b0e9d4-7a13-4c8f-b5e6-0d9c2f4a7e13

//! # pkg-uploader
//!
//! Publishes pre-built conda package archives to an anaconda.org channel.
//! The archives are located under the build output directory, an optional
//! conda environment is activated, and the `anaconda upload` tool is run with
//! the token taken from the environment. The tool's exit status is passed
//! through unchanged.

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod logging;
pub mod publish;
pub mod runner;

pub use error::{Result, UploadError};

// file: src/cli/mod.rs
// version: 1.0.0
// guid: 1e7c3b94-60fa-4d2e-b8a5-f93d0c6e2a71

//! Command line interface for the package uploader

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::*;

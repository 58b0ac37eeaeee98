//! Error types for Flowbox operations.
//!
//! This module provides the main error type [`FlowboxError`] which wraps the
//! error conditions a host can run into when it creates an editor or exports
//! its scene. Interactive misuse (clicks that hit nothing, drops outside any
//! zone) is not an error: the editor absorbs it.

use std::io;

use thiserror::Error;

use flowbox_core::model::ModelError;

/// The main error type for Flowbox operations.
#[derive(Debug, Error)]
pub enum FlowboxError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for FlowboxError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

//! Error adapter for converting FlowboxError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use flowbox::FlowboxError;

/// Adapter giving a [`FlowboxError`] a diagnostic code and help text.
pub struct ErrorAdapter<'a>(pub &'a FlowboxError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            FlowboxError::Io(_) => "flowbox::io",
            FlowboxError::Model(_) => "flowbox::model",
            FlowboxError::Config(_) => "flowbox::config",
            FlowboxError::Export(_) => "flowbox::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            FlowboxError::Model(_) => {
                "only choose, when, otherwise, foreach and sequence nodes may have children, and ids must be unique"
            }
            FlowboxError::Config(_) => {
                "check the TOML syntax and the node types (receive, reply, invoke, transform, choose, when, otherwise, foreach, sequence)"
            }
            FlowboxError::Io(_) | FlowboxError::Export(_) => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Wrap a [`FlowboxError`] for rendering by miette.
pub fn to_reportable(err: &FlowboxError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}

#[cfg(test)]
mod tests {
    use flowbox::model::{ModelError, NodeId};

    use super::*;

    #[test]
    fn test_codes_follow_variants() {
        let err = FlowboxError::Model(ModelError::DuplicateId(NodeId::new(3)));
        let adapter = to_reportable(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "flowbox::model");
        assert!(adapter.help().is_some());
        assert_eq!(adapter.to_string(), "Invalid model: node id #3 is used more than once");
    }

    #[test]
    fn test_io_errors_have_no_help() {
        let err = FlowboxError::Io(std::io::Error::other("disk full"));
        let adapter = to_reportable(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "flowbox::io");
        assert!(adapter.help().is_none());
    }

    #[test]
    fn test_renders_with_graphical_handler() {
        let err = FlowboxError::Config("bad color".to_string());
        let mut out = String::new();

        miette::GraphicalReportHandler::new()
            .render_report(&mut out, &to_reportable(&err))
            .unwrap();

        assert!(out.contains("flowbox::config"));
        assert!(out.contains("bad color"));
    }
}

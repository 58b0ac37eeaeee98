//! CLI logic for the Flowbox headless editor.
//!
//! The CLI loads a diagram model, replays an optional event script through an
//! [`Editor`] and writes an SVG snapshot of the final scene.

pub mod error_adapter;
pub mod script;

mod args;
mod config;

pub use args::Args;

use std::path::Path;

use log::info;

use flowbox::{Editor, FlowboxError, context::LoggingDirectEdit};

/// Run the Flowbox CLI application
///
/// # Errors
///
/// Returns `FlowboxError` for:
/// - File I/O errors
/// - Configuration, model or script parsing errors
/// - Malformed models (leaves with children, duplicate ids)
/// - Export errors
pub fn run(args: &Args) -> Result<(), FlowboxError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let diagram = script::load_diagram(&args.input)?;

    let mut editor = Editor::with_svg(diagram, Box::new(LoggingDirectEdit::default()), &app_config)?;

    if let Some(events) = &args.events {
        let script = script::load_script(events)?;
        script.replay(&mut editor);
    }

    editor.write_svg(Path::new(&args.output))?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}

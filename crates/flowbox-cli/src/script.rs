//! Model and event script files.
//!
//! The model file lists the top-level nodes as `[[nodes]]` tables. The event
//! script is a list of `[[events]]` tables tagged by `kind`:
//!
//! ```toml
//! [[events]]
//! kind = "mouse_down"
//! x = 55.0
//! y = 50.0
//!
//! [[events]]
//! kind = "key_up"
//! key = 46
//!
//! [[events]]
//! kind = "commit"
//! value = "Charge card"
//! ```

use std::{fs, path::Path};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use flowbox::{
    Editor, FlowboxError,
    geometry::Point,
    model::Diagram,
    state::{InputEvent, Key},
};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to parse model file {path}: {message}")]
    Model { path: String, message: String },

    #[error("Failed to parse event script {path}: {message}")]
    Events { path: String, message: String },
}

impl From<ScriptError> for FlowboxError {
    fn from(err: ScriptError) -> Self {
        FlowboxError::Config(err.to_string())
    }
}

/// One scripted user action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    MouseDown { x: f32, y: f32 },
    MouseMove { x: f32, y: f32 },
    MouseUp { x: f32, y: f32 },
    DoubleClick { x: f32, y: f32 },
    KeyUp { key: u32 },
    /// Confirms the pending direct edit, as the edit component would.
    Commit { value: String },
}

impl ScriptEvent {
    /// Replays the action on `editor`.
    pub fn apply(&self, editor: &mut Editor) {
        match self {
            Self::MouseDown { x, y } => editor.dispatch(InputEvent::MouseDown(Point::new(*x, *y))),
            Self::MouseMove { x, y } => editor.dispatch(InputEvent::MouseMove(Point::new(*x, *y))),
            Self::MouseUp { x, y } => editor.dispatch(InputEvent::MouseUp(Point::new(*x, *y))),
            Self::DoubleClick { x, y } => {
                editor.dispatch(InputEvent::DoubleClick(Point::new(*x, *y)))
            }
            Self::KeyUp { key } => editor.dispatch(InputEvent::KeyUp(Key::from_code(*key))),
            Self::Commit { value } => {
                if !editor.commit_direct_edit(value) {
                    debug!(value = value; "Commit ignored, no direct edit pending");
                }
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventScript {
    #[serde(default)]
    events: Vec<ScriptEvent>,
}

impl EventScript {
    pub fn events(&self) -> &[ScriptEvent] {
        &self.events
    }

    /// Replays every event in order.
    pub fn replay(&self, editor: &mut Editor) {
        for event in &self.events {
            event.apply(editor);
            debug!(event:? = event, state = editor.state_name(); "Event replayed");
        }
        info!(events = self.events.len(), state = editor.state_name(); "Script replayed");
    }
}

/// Reads a diagram model.
///
/// # Errors
///
/// Returns [`FlowboxError::Io`] if the file cannot be read and
/// [`FlowboxError::Config`] if it is not a valid model, including unknown node
/// types.
pub fn load_diagram(path: impl AsRef<Path>) -> Result<Diagram, FlowboxError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let diagram: Diagram = toml::from_str(&content).map_err(|err| ScriptError::Model {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    info!(path = path.display().to_string(), nodes = diagram.nodes().len(); "Model loaded");
    Ok(diagram)
}

/// Reads an event script.
///
/// # Errors
///
/// Returns [`FlowboxError::Io`] if the file cannot be read and
/// [`FlowboxError::Config`] if it is not a valid script.
pub fn load_script(path: impl AsRef<Path>) -> Result<EventScript, FlowboxError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let script: EventScript = toml::from_str(&content).map_err(|err| ScriptError::Events {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_kinds() {
        let script: EventScript = toml::from_str(
            r#"
            [[events]]
            kind = "mouse_down"
            x = 1.0
            y = 2.0

            [[events]]
            kind = "key_up"
            key = 46

            [[events]]
            kind = "commit"
            value = "Done"
            "#,
        )
        .unwrap();

        assert_eq!(
            script.events(),
            &[
                ScriptEvent::MouseDown { x: 1.0, y: 2.0 },
                ScriptEvent::KeyUp { key: 46 },
                ScriptEvent::Commit {
                    value: "Done".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_event_kind_is_rejected() {
        let result: Result<EventScript, _> = toml::from_str(
            r#"
            [[events]]
            kind = "scroll"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_model_with_nested_nodes() {
        let diagram: Diagram = toml::from_str(
            r#"
            [[nodes]]
            type = "receive"
            label = "Order"

            [[nodes]]
            type = "choose"

            [[nodes.children]]
            type = "when"

            [[nodes.children.children]]
            type = "invoke"
            label = "Charge"
            "#,
        )
        .unwrap();

        assert_eq!(diagram.nodes().len(), 2);
        assert_eq!(
            diagram.node_at(&[1, 0, 0]).and_then(|node| node.label()),
            Some("Charge")
        );
    }
}

//! Flowbox - the core of an interactive structural diagram editor.
//!
//! A diagram is a tree of typed process-flow nodes (receive, invoke, choose,
//! sequence, foreach, ...). Flowbox projects that tree onto nested boxes, lays
//! them out, and drives an interaction state machine that lets a user select,
//! delete, rename and drag nodes, including fresh nodes dragged off a palette.
//!
//! The host feeds normalised [`state::InputEvent`]s into an [`Editor`] and
//! renders through a [`surface::RenderSurface`]. [`surface::SvgSurface`] is an
//! in-memory implementation that can be exported as an SVG document.

pub mod boxes;
pub mod config;
pub mod context;
pub mod export;
pub mod layout;
pub mod palette;
pub mod state;
pub mod surface;

mod error;

pub use flowbox_core::{color, geometry, model, text};

pub use error::FlowboxError;

use std::{mem, path::Path};

use log::{debug, info};
use svg::Document;

use flowbox_core::model::Diagram;

use boxes::BoxNode;
use config::AppConfig;
use context::{Context, DirectEditComponent};
use state::{InputEvent, InteractionState};
use surface::{RenderSurface, SvgSurface};

/// An editing session: the shared [`Context`] and the current interaction
/// state.
///
/// # Examples
///
/// ```rust
/// use flowbox::{
///     Editor,
///     config::{AppConfig, EditorConfig, MeasurerKind, PaletteConfig, StyleConfig, TextConfig},
///     context::LoggingDirectEdit,
///     model::{Diagram, DiagramNode, NodeKind},
///     state::InputEvent,
/// };
///
/// let diagram = Diagram::new(vec![
///     DiagramNode::new(NodeKind::Receive).with_label("Order"),
///     DiagramNode::new(NodeKind::Reply).with_label("Done"),
/// ]);
/// let config = AppConfig::new(
///     EditorConfig::default(),
///     TextConfig::default().with_measurer(MeasurerKind::Monospace),
///     StyleConfig::default(),
///     PaletteConfig::default(),
/// );
/// let mut editor = Editor::with_svg(
///     diagram,
///     Box::new(LoggingDirectEdit::default()),
///     &config,
/// )
/// .expect("valid diagram");
///
/// let center = editor.root().children()[0].bounds().center();
/// editor.dispatch(InputEvent::MouseDown(center));
/// assert_eq!(editor.state_name(), "detect_drag");
/// assert_eq!(editor.selection(), Some(&[0][..]));
///
/// editor.dispatch(InputEvent::MouseUp(center));
/// assert_eq!(editor.state_name(), "idle");
/// ```
#[derive(Debug)]
pub struct Editor<S: RenderSurface = SvgSurface> {
    context: Context<S>,
    state: InteractionState,
}

impl<S: RenderSurface> Editor<S> {
    /// Creates an editor for `diagram` rendering on `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowboxError::Model`] if the diagram is malformed.
    pub fn new(
        diagram: Diagram,
        surface: S,
        component: Box<dyn DirectEditComponent>,
        config: &AppConfig,
    ) -> Result<Self, FlowboxError> {
        let context = Context::new(
            diagram,
            surface,
            config.text().build_measurer(),
            component,
            &config.palette().items(),
            *config.editor(),
        )?;
        info!(
            nodes = context.diagram().nodes().len(),
            palette_items = context.palette().templates().len();
            "Editor created"
        );
        Ok(Self {
            context,
            state: InteractionState::default(),
        })
    }

    /// Feeds one input event through the state machine.
    pub fn dispatch(&mut self, event: InputEvent) {
        let state = mem::replace(&mut self.state, InteractionState::Idle);
        self.state = state.handle(event, &mut self.context);
    }

    /// Applies a value confirmed in the direct-edit component. Returns false
    /// when no edit is pending.
    pub fn commit_direct_edit(&mut self, value: &str) -> bool {
        self.context.commit_direct_edit(value)
    }

    pub fn cancel_direct_edit(&mut self) {
        debug!("Direct edit cancelled by host");
        self.context.cancel_direct_edit();
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn context(&self) -> &Context<S> {
        &self.context
    }

    pub fn diagram(&self) -> &Diagram {
        self.context.diagram()
    }

    /// Root of the box tree.
    pub fn root(&self) -> &BoxNode {
        self.context.root()
    }

    /// Path of the selected box in the box tree, which is also its path in
    /// the diagram.
    pub fn selection(&self) -> Option<&[usize]> {
        self.context.selection()
    }

    pub fn surface(&self) -> &S {
        self.context.surface()
    }
}

impl Editor<SvgSurface> {
    /// Creates an editor backed by an [`SvgSurface`] styled from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowboxError::Config`] for invalid style colors and
    /// [`FlowboxError::Model`] for a malformed diagram.
    pub fn with_svg(
        diagram: Diagram,
        component: Box<dyn DirectEditComponent>,
        config: &AppConfig,
    ) -> Result<Self, FlowboxError> {
        let style = config.svg_style().map_err(FlowboxError::Config)?;
        Self::new(diagram, SvgSurface::new(style), component, config)
    }

    /// The current scene as an SVG document.
    pub fn render_svg(&self) -> Document {
        self.surface().to_document()
    }

    /// Writes the current scene to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowboxError::Export`] if the file cannot be written.
    pub fn write_svg(&self, path: &Path) -> Result<(), FlowboxError> {
        export::write_document(path, &self.render_svg())?;
        info!(path:% = path.display(); "Snapshot written");
        Ok(())
    }
}

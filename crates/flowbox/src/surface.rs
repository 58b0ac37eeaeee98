//! Rendering surface contract.
//!
//! The editor never draws pixels itself. Every box owns a *scope* on a
//! [`RenderSurface`]: a group that can be translated, given a background
//! frame, a label or connector edges, flagged as selected, cleared and
//! removed. Hosts implement the trait on top of whatever graphics stack they
//! use; [`SvgSurface`] is an in-memory implementation that can export the
//! current scene as an SVG document.
//!
//! Scopes form a tree. Removing or clearing a scope releases all of its
//! descendants, which is how a whole box tree is released before it is
//! rebuilt.

mod svg;

pub use svg::{SvgStyle, SvgSurface};

use flowbox_core::geometry::{Point, Size};

/// Handle of a drawing scope created by a [`RenderSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// A connector edge between two points in the owning scope's coordinates.
pub type Connector = (Point, Point);

/// Capability object used by boxes to manifest themselves visually.
pub trait RenderSurface {
    /// Creates a child scope of `parent` (or a top-level scope) tagged with a
    /// style class.
    fn create_scope(&mut self, parent: Option<ScopeId>, class: &str) -> ScopeId;

    /// Sets the scope's offset relative to its parent scope.
    fn set_translation(&mut self, scope: ScopeId, offset: Point);

    /// Sizes the rounded background frame drawn at the scope's origin.
    fn set_frame(&mut self, scope: ScopeId, size: Size);

    /// Shows `text` centred inside a box of `size`.
    fn set_label(&mut self, scope: ScopeId, text: &str, size: Size);

    /// Replaces the connector edges drawn in the scope.
    fn set_connectors(&mut self, scope: ScopeId, connectors: &[Connector]);

    /// Toggles the "selected" visual class.
    fn set_selected(&mut self, scope: ScopeId, selected: bool);

    /// Removes every child scope and every shape of the scope, keeping the
    /// scope itself.
    fn clear_scope(&mut self, scope: ScopeId);

    /// Removes the scope and all of its children.
    fn remove_scope(&mut self, scope: ScopeId);
}

/// The three top-level scopes of an editor, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLayers {
    /// Box tree of the diagram plus the drop-zone cursor.
    pub nodes: ScopeId,
    /// Drag feedback.
    pub feedback: ScopeId,
    /// The palette of new node templates.
    pub palette: ScopeId,
}

impl SurfaceLayers {
    /// Creates the layer scopes on `surface`.
    pub fn create(surface: &mut dyn RenderSurface) -> Self {
        Self {
            nodes: surface.create_scope(None, "nodes"),
            feedback: surface.create_scope(None, "feedback"),
            palette: surface.create_scope(None, "palette-layer"),
        }
    }
}

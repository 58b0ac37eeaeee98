use std::collections::HashMap;

use log::{debug, trace};
use svg::{
    Document,
    node::element::{Definitions, Group, Line, Marker, Path, Rectangle, Text},
};

use flowbox_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
};

use super::{Connector, RenderSurface, ScopeId};

const ARROW_MARKER_ID: &str = "flowbox-arrow";
const FRAME_CORNER_RADIUS: f32 = 5.0;
const DOCUMENT_MARGIN: f32 = 10.0;

/// Visual settings of an [`SvgSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct SvgStyle {
    background_color: Color,
    selection_color: Color,
    cursor_color: Color,
    stroke_color: Color,
    font_family: String,
    font_size: u16,
}

impl SvgStyle {
    pub fn new(background_color: Color, selection_color: Color, cursor_color: Color) -> Self {
        Self {
            background_color,
            selection_color,
            cursor_color,
            ..Self::default()
        }
    }

    /// Sets the font used for labels (builder style).
    pub fn with_font(mut self, font_family: impl Into<String>, font_size: u16) -> Self {
        self.font_family = font_family.into();
        self.font_size = font_size;
        self
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn selection_color(&self) -> Color {
        self.selection_color
    }

    pub fn cursor_color(&self) -> Color {
        self.cursor_color
    }
}

impl Default for SvgStyle {
    fn default() -> Self {
        let parse = |css: &str| Color::new(css).unwrap_or_default();
        Self {
            background_color: parse("#f4f6fa"),
            selection_color: parse("#ff8c00"),
            cursor_color: parse("#1e90ff"),
            stroke_color: parse("#5a6270"),
            font_family: "Arial".to_string(),
            font_size: 15,
        }
    }
}

#[derive(Debug, Default)]
struct ScopeState {
    parent: Option<ScopeId>,
    class: String,
    children: Vec<ScopeId>,
    translation: Point,
    frame: Option<Size>,
    label: Option<(String, Size)>,
    connectors: Vec<Connector>,
    selected: bool,
}

impl ScopeState {
    fn clear_shapes(&mut self) {
        self.frame = None;
        self.label = None;
        self.connectors.clear();
        self.selected = false;
    }
}

/// In-memory scene graph implementing [`RenderSurface`].
///
/// Scopes are kept in creation order per parent, which is also their paint
/// order. The scene can be inspected through the query methods or exported
/// with [`SvgSurface::to_document`].
#[derive(Debug, Default)]
pub struct SvgSurface {
    scopes: HashMap<ScopeId, ScopeState>,
    roots: Vec<ScopeId>,
    next_id: u32,
    style: SvgStyle,
}

impl SvgSurface {
    pub fn new(style: SvgStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn style(&self) -> &SvgStyle {
        &self.style
    }

    /// Number of live scopes.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn contains(&self, scope: ScopeId) -> bool {
        self.scopes.contains_key(&scope)
    }

    pub fn class_of(&self, scope: ScopeId) -> Option<&str> {
        self.scopes.get(&scope).map(|state| state.class.as_str())
    }

    pub fn is_selected(&self, scope: ScopeId) -> bool {
        self.scopes.get(&scope).is_some_and(|state| state.selected)
    }

    pub fn translation(&self, scope: ScopeId) -> Option<Point> {
        self.scopes.get(&scope).map(|state| state.translation)
    }

    pub fn frame(&self, scope: ScopeId) -> Option<Size> {
        self.scopes.get(&scope).and_then(|state| state.frame)
    }

    pub fn label(&self, scope: ScopeId) -> Option<&str> {
        self.scopes
            .get(&scope)
            .and_then(|state| state.label.as_ref())
            .map(|(text, _)| text.as_str())
    }

    pub fn connectors(&self, scope: ScopeId) -> &[Connector] {
        self.scopes
            .get(&scope)
            .map_or(&[], |state| state.connectors.as_slice())
    }

    pub fn children(&self, scope: ScopeId) -> &[ScopeId] {
        self.scopes
            .get(&scope)
            .map_or(&[], |state| state.children.as_slice())
    }

    /// Live scopes tagged with `class`.
    pub fn scopes_with_class(&self, class: &str) -> Vec<ScopeId> {
        let mut scopes: Vec<_> = self
            .scopes
            .iter()
            .filter(|(_, state)| state.class == class)
            .map(|(id, _)| *id)
            .collect();
        scopes.sort();
        scopes
    }

    /// Sum of the translations from the top-level scope down to `scope`.
    pub fn absolute_position(&self, scope: ScopeId) -> Option<Point> {
        let mut state = self.scopes.get(&scope)?;
        let mut position = state.translation;
        while let Some(parent) = state.parent {
            state = self.scopes.get(&parent)?;
            position = position.add_point(state.translation);
        }
        Some(position)
    }

    /// Renders the whole scene into an SVG document sized to its content.
    pub fn to_document(&self) -> Document {
        let extent = self
            .roots
            .iter()
            .filter_map(|root| self.extent(*root, Point::default()))
            .reduce(|a, b| a.merge(&b))
            .unwrap_or_default();
        let width = extent.max_x().max(0.0) + DOCUMENT_MARGIN;
        let height = extent.max_y().max(0.0) + DOCUMENT_MARGIN;
        debug!(width = width, height = height; "Rendering SVG document");

        let mut doc = Document::new()
            .set("viewBox", (0.0, 0.0, width, height))
            .set("width", width)
            .set("height", height)
            .add(self.marker_definitions());

        for root in &self.roots {
            if let Some(group) = self.render_scope(*root) {
                doc = doc.add(group);
            }
        }
        doc
    }

    fn extent(&self, scope: ScopeId, origin: Point) -> Option<Bounds> {
        let state = self.scopes.get(&scope)?;
        let origin = origin.add_point(state.translation);
        let own = state
            .frame
            .or(state.label.as_ref().map(|(_, size)| *size))
            .map(|size| Bounds::new_from_top_left(origin, size));
        state
            .children
            .iter()
            .filter_map(|child| self.extent(*child, origin))
            .fold(own, |acc, child| match acc {
                Some(bounds) => Some(bounds.merge(&child)),
                None => Some(child),
            })
    }

    fn marker_definitions(&self) -> Definitions {
        let arrow = Marker::new()
            .set("id", ARROW_MARKER_ID)
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", self.style.stroke_color.to_string()),
            );
        Definitions::new().add(arrow)
    }

    fn render_scope(&self, scope: ScopeId) -> Option<Group> {
        let state = self.scopes.get(&scope)?;
        let class = if state.selected {
            format!("{} node-selected", state.class)
        } else {
            state.class.clone()
        };
        let mut group = Group::new().set("class", class).set(
            "transform",
            format!(
                "translate({}, {})",
                state.translation.x(),
                state.translation.y()
            ),
        );

        if let Some(size) = state.frame {
            let fill = if state.class == "cursor" {
                self.style.cursor_color
            } else {
                self.style.background_color
            };
            let stroke = if state.selected {
                self.style.selection_color
            } else {
                self.style.stroke_color
            };
            group = group.add(
                Rectangle::new()
                    .set("width", size.width())
                    .set("height", size.height())
                    .set("rx", FRAME_CORNER_RADIUS)
                    .set("fill", fill.to_string())
                    .set("stroke", stroke.to_string())
                    .set("stroke-width", if state.selected { 2 } else { 1 }),
            );
        }

        for (from, to) in &state.connectors {
            group = group.add(
                Line::new()
                    .set("x1", from.x())
                    .set("y1", from.y())
                    .set("x2", to.x())
                    .set("y2", to.y())
                    .set("stroke", self.style.stroke_color.to_string())
                    .set("marker-end", format!("url(#{ARROW_MARKER_ID})")),
            );
        }

        if let Some((text, size)) = &state.label {
            group = group.add(
                Text::new("")
                    .set("x", size.width() / 2.0)
                    .set("y", size.height() / 2.0)
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "middle")
                    .set("font-family", self.style.font_family.as_str())
                    .set("font-size", self.style.font_size)
                    .add(svg::node::Text::new(text.as_str())),
            );
        }

        for child in &state.children {
            if let Some(child_group) = self.render_scope(*child) {
                group = group.add(child_group);
            }
        }
        Some(group)
    }

    fn remove_descendants(&mut self, scope: ScopeId) {
        let children = self
            .scopes
            .get_mut(&scope)
            .map(|state| std::mem::take(&mut state.children))
            .unwrap_or_default();
        for child in children {
            self.remove_descendants(child);
            self.scopes.remove(&child);
        }
    }
}

impl RenderSurface for SvgSurface {
    fn create_scope(&mut self, parent: Option<ScopeId>, class: &str) -> ScopeId {
        self.next_id += 1;
        let id = ScopeId::new(self.next_id);
        let parent = parent.filter(|parent| self.scopes.contains_key(parent));
        match parent {
            Some(parent) => {
                if let Some(state) = self.scopes.get_mut(&parent) {
                    state.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        self.scopes.insert(
            id,
            ScopeState {
                parent,
                class: class.to_string(),
                ..ScopeState::default()
            },
        );
        trace!(scope = id.get(), class = class; "Scope created");
        id
    }

    fn set_translation(&mut self, scope: ScopeId, offset: Point) {
        if let Some(state) = self.scopes.get_mut(&scope) {
            state.translation = offset;
        }
    }

    fn set_frame(&mut self, scope: ScopeId, size: Size) {
        if let Some(state) = self.scopes.get_mut(&scope) {
            state.frame = Some(size);
        }
    }

    fn set_label(&mut self, scope: ScopeId, text: &str, size: Size) {
        if let Some(state) = self.scopes.get_mut(&scope) {
            state.label = Some((text.to_string(), size));
        }
    }

    fn set_connectors(&mut self, scope: ScopeId, connectors: &[Connector]) {
        if let Some(state) = self.scopes.get_mut(&scope) {
            state.connectors = connectors.to_vec();
        }
    }

    fn set_selected(&mut self, scope: ScopeId, selected: bool) {
        if let Some(state) = self.scopes.get_mut(&scope) {
            state.selected = selected;
        }
    }

    fn clear_scope(&mut self, scope: ScopeId) {
        self.remove_descendants(scope);
        if let Some(state) = self.scopes.get_mut(&scope) {
            state.clear_shapes();
        }
    }

    fn remove_scope(&mut self, scope: ScopeId) {
        self.remove_descendants(scope);
        let Some(state) = self.scopes.remove(&scope) else {
            return;
        };
        match state.parent.and_then(|parent| self.scopes.get_mut(&parent)) {
            Some(parent) => parent.children.retain(|child| *child != scope),
            None => self.roots.retain(|root| *root != scope),
        }
        trace!(scope = scope.get(); "Scope removed");
    }
}

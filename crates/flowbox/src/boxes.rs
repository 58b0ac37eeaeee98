//! The box tree: geometric projection of the diagram model.
//!
//! Every [`BoxNode`] owns a scope on the render surface, a size, a position
//! relative to its parent box and absolute bounds in editor space. Boxes built
//! from the model record the [`NodeId`] of the node they stand for; the
//! diagram root and the palette are synthetic and carry none.
//!
//! The tree is always derived from the model by [`build_box_tree`]: child `i`
//! of a box stands for child `i` of its model node. Boxes are addressed by
//! [`BoxPath`]s, which therefore double as model paths for the diagram tree.

mod zone;

pub use zone::{Wrap, Zone};

use log::debug;

use flowbox_core::{
    geometry::{Bounds, Insets, Point, Size},
    model::{Diagram, DiagramNode, NodeId, NodeKind},
    text::TextMeasurer,
};

use crate::{
    context::DirectEdit,
    layout::{self, LayoutParams},
    surface::{Connector, RenderSurface, ScopeId},
};

/// Child indices from the root box down to a box.
pub type BoxPath = Vec<usize>;

/// Padding between a leaf's label and its frame.
pub const LEAF_PADDING: f32 = 10.0;

/// A label together with its measured size.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    text: String,
    text_size: Size,
}

impl Label {
    pub fn measure(text: impl Into<String>, measurer: &dyn TextMeasurer) -> Self {
        let text = text.into();
        let text_size = measurer.measure(&text);
        Self { text, text_size }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_size(&self) -> Size {
        self.text_size
    }

    fn box_size(&self) -> Size {
        self.text_size.add_padding(Insets::uniform(LEAF_PADDING))
    }
}

/// The box variants.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    /// Synthetic root holding the top-level chain.
    Diagram,
    /// Synthetic root of the palette.
    Palette,
    Sequence,
    Choose,
    Repeat,
    /// Leaf sized from its label.
    Simple(Label),
}

impl BoxKind {
    /// Box variant standing for a model node.
    fn for_node(node: &DiagramNode, measurer: &dyn TextMeasurer) -> Self {
        match node.kind() {
            NodeKind::Receive | NodeKind::Reply | NodeKind::Invoke | NodeKind::Transform => {
                Self::Simple(Label::measure(display_label(node), measurer))
            }
            NodeKind::Choose => Self::Choose,
            NodeKind::When | NodeKind::Otherwise | NodeKind::Sequence => Self::Sequence,
            NodeKind::Foreach => Self::Repeat,
        }
    }

    /// Style class of the box's scope.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Diagram => "diagram",
            Self::Palette => "palette",
            Self::Sequence => "sequence",
            Self::Choose => "choose",
            Self::Repeat => "repeat",
            Self::Simple(_) => "simple",
        }
    }

    /// Pure layout containers and synthetic roots never become the selection.
    pub fn is_selectable(&self) -> bool {
        match self {
            Self::Choose | Self::Repeat | Self::Simple(_) => true,
            Self::Diagram | Self::Palette | Self::Sequence => false,
        }
    }
}

/// Text shown for a node: its label, or its type name when it has none.
pub fn display_label(node: &DiagramNode) -> &str {
    node.label().unwrap_or_else(|| node.kind().name())
}

/// One positioned box.
#[derive(Debug)]
pub struct BoxNode {
    kind: BoxKind,
    node: Option<NodeId>,
    scope: ScopeId,
    rel_position: Point,
    size: Size,
    bounds: Bounds,
    children: Vec<BoxNode>,
}

/// Builds a fresh box tree for `diagram` under the `layer` scope and lays it
/// out, so the result is immediately usable for hit testing.
pub fn build_box_tree(
    diagram: &Diagram,
    layer: ScopeId,
    surface: &mut dyn RenderSurface,
    measurer: &dyn TextMeasurer,
) -> BoxNode {
    let mut root = BoxNode::new(BoxKind::Diagram, None, Some(layer), surface);
    root.children = diagram
        .nodes()
        .iter()
        .map(|node| BoxNode::from_node(node, root.scope, surface, measurer))
        .collect();
    root.layout(surface);
    debug!(
        top_level = root.children.len(),
        width = root.size.width(),
        height = root.size.height();
        "Box tree built"
    );
    root
}

impl BoxNode {
    fn new(
        kind: BoxKind,
        node: Option<NodeId>,
        parent: Option<ScopeId>,
        surface: &mut dyn RenderSurface,
    ) -> Self {
        let scope = surface.create_scope(parent, kind.class());
        let size = match &kind {
            BoxKind::Simple(label) => label.box_size(),
            _ => Size::default(),
        };
        Self {
            kind,
            node,
            scope,
            rel_position: Point::default(),
            size,
            bounds: Bounds::default(),
            children: Vec::new(),
        }
    }

    /// Recursively builds the boxes of `node` under `parent`.
    fn from_node(
        node: &DiagramNode,
        parent: ScopeId,
        surface: &mut dyn RenderSurface,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let kind = BoxKind::for_node(node, measurer);
        let mut boxed = Self::new(kind, Some(node.id()), Some(parent), surface);
        boxed.children = node
            .children()
            .iter()
            .map(|child| Self::from_node(child, boxed.scope, surface, measurer))
            .collect();
        boxed
    }

    /// Builds the palette root with one leaf per template. Items carry no
    /// node id; item `i` stands for template `i`.
    pub(crate) fn palette(
        templates: &[DiagramNode],
        layer: ScopeId,
        surface: &mut dyn RenderSurface,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let mut root = Self::new(BoxKind::Palette, None, Some(layer), surface);
        root.children = templates
            .iter()
            .map(|template| {
                let label = Label::measure(display_label(template), measurer);
                Self::new(BoxKind::Simple(label), None, Some(root.scope), surface)
            })
            .collect();
        root
    }

    pub fn kind(&self) -> &BoxKind {
        &self.kind
    }

    /// Id of the model node this box stands for.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Absolute bounds in editor space.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Position relative to the parent box.
    pub fn rel_position(&self) -> Point {
        self.rel_position
    }

    /// Bounds relative to the parent box.
    pub fn rel_bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.rel_position, self.size)
    }

    pub fn children(&self) -> &[BoxNode] {
        &self.children
    }

    pub fn is_selectable(&self) -> bool {
        self.kind.is_selectable()
    }

    /// Label text of a leaf.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            BoxKind::Simple(label) => Some(label.text()),
            _ => None,
        }
    }

    /// Recomputes the size of this box and the positions of its descendants.
    ///
    /// The synthetic roots also anchor themselves at the origin, which
    /// refreshes the absolute bounds of the whole tree.
    pub fn layout(&mut self, surface: &mut dyn RenderSurface) {
        match &self.kind {
            BoxKind::Simple(label) => {
                self.size = label.box_size();
                surface.set_frame(self.scope, self.size);
                surface.set_label(self.scope, &label.text, self.size);
            }
            BoxKind::Sequence => {
                if self.children.is_empty() {
                    self.size = Size::new(20.0, 20.0);
                    surface.set_connectors(self.scope, &[]);
                } else {
                    self.size = layout::arrange(&mut self.children, &LayoutParams::SEQUENCE, surface);
                    let connectors: Vec<Connector> = self
                        .children
                        .windows(2)
                        .map(|pair| (pair[0].rel_bounds().mid_east(), pair[1].rel_bounds().mid_west()))
                        .collect();
                    surface.set_connectors(self.scope, &connectors);
                }
            }
            BoxKind::Choose => {
                self.size = if self.children.is_empty() {
                    Size::new(40.0, 40.0)
                } else {
                    layout::arrange(&mut self.children, &LayoutParams::CHOOSE, surface)
                };
                surface.set_frame(self.scope, self.size);
            }
            BoxKind::Repeat => {
                self.size = layout::arrange(&mut self.children, &LayoutParams::REPEAT, surface);
                surface.set_frame(self.scope, self.size);
            }
            BoxKind::Diagram => {
                self.size = layout::arrange(&mut self.children, &LayoutParams::DIAGRAM, surface);
                self.set_position(Point::default());
            }
            BoxKind::Palette => {
                self.size = layout::arrange(&mut self.children, &LayoutParams::PALETTE, surface);
                self.set_position(Point::default());
            }
        }
    }

    /// Moves the box to `origin` in editor space, recursively updating the
    /// absolute bounds of its descendants.
    pub fn set_position(&mut self, origin: Point) {
        self.bounds = Bounds::new_from_top_left(origin, self.size);
        for child in &mut self.children {
            let child_origin = origin.add_point(child.rel_position);
            child.set_position(child_origin);
        }
    }

    /// Places the box relative to its parent.
    pub fn set_relative_position(&mut self, position: Point, surface: &mut dyn RenderSurface) {
        self.rel_position = position;
        surface.set_translation(self.scope, position);
    }

    /// Overrides the height after layout (the palette spans the full editor
    /// height).
    pub(crate) fn set_height(&mut self, height: f32) {
        self.size = self.size.with_height(height);
        self.bounds = self.bounds.with_size(self.size);
    }

    /// Innermost box containing `point`: children are searched before the
    /// box itself. Returns the path relative to this box.
    pub fn find_element(&self, point: Point) -> Option<BoxPath> {
        for (index, child) in self.children.iter().enumerate() {
            if let Some(mut path) = child.find_element(point) {
                path.insert(0, index);
                return Some(path);
            }
        }
        self.bounds.contains(point).then(Vec::new)
    }

    /// Box at `path` relative to this box.
    pub fn get(&self, path: &[usize]) -> Option<&BoxNode> {
        path.iter()
            .try_fold(self, |boxed, &index| boxed.children.get(index))
    }

    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut BoxNode> {
        let mut boxed = self;
        for &index in path {
            boxed = boxed.children.get_mut(index)?;
        }
        Some(boxed)
    }

    /// Calls `f` on this box and every descendant, parents first.
    pub fn visit(&self, f: &mut impl FnMut(&BoxNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Direct-edit descriptor of a leaf: the label's box in editor space and
    /// its current value.
    pub fn direct_edit(&self) -> Option<DirectEdit> {
        let BoxKind::Simple(label) = &self.kind else {
            return None;
        };
        let text_size = label.text_size();
        let origin = Point::new(
            self.bounds.min_x() + (self.size.width() - text_size.width()) / 2.0,
            self.bounds.min_y() + LEAF_PADDING,
        );
        Some(DirectEdit::new(
            Bounds::new_from_top_left(origin, text_size),
            label.text(),
        ))
    }

    /// Replaces the label of a leaf and resizes it. The caller re-lays out
    /// the tree afterwards. Returns false for non-leaf boxes.
    pub fn set_label(&mut self, text: &str, measurer: &dyn TextMeasurer) -> bool {
        let BoxKind::Simple(label) = &mut self.kind else {
            return false;
        };
        *label = Label::measure(text, measurer);
        self.size = label.box_size();
        true
    }

    /// Detaches child `index` and releases its rendering resources.
    pub(crate) fn remove_child(
        &mut self,
        index: usize,
        surface: &mut dyn RenderSurface,
    ) -> Option<BoxNode> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        surface.remove_scope(child.scope);
        Some(child)
    }

    /// Returns true when the children of this box stand, in order and
    /// recursively, for `nodes`.
    pub fn mirrors(&self, nodes: &[DiagramNode]) -> bool {
        self.children.len() == nodes.len()
            && self
                .children
                .iter()
                .zip(nodes)
                .all(|(boxed, node)| boxed.node == Some(node.id()) && boxed.mirrors(node.children()))
    }

    /// Leaf whose layout always yields `size`.
    #[cfg(test)]
    pub(crate) fn fixed(surface: &mut dyn RenderSurface, size: Size) -> Self {
        let padding = 2.0 * LEAF_PADDING;
        let label = Label {
            text: String::new(),
            text_size: Size::new(size.width() - padding, size.height() - padding),
        };
        let mut boxed = Self::new(BoxKind::Simple(label), None, None, surface);
        boxed.layout(surface);
        boxed
    }
}

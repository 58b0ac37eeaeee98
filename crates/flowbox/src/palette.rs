//! The palette of new node templates.
//!
//! The palette is a vertical column of leaf boxes docked at the left edge of
//! the editor. It is only a drag source: pressing an item starts a drag of a
//! fresh copy of the item's template. When closed it slides left until only a
//! thin strip stays visible; moving the pointer onto that strip opens it.

use log::debug;
use serde::Deserialize;

use flowbox_core::{
    geometry::{Bounds, Point},
    model::{DiagramNode, ModelError, NodeKind},
    text::TextMeasurer,
};

use crate::{
    boxes::BoxNode,
    surface::{RenderSurface, ScopeId},
};

/// One entry of the palette catalogue.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaletteItem {
    #[serde(default)]
    label: Option<String>,

    #[serde(rename = "type")]
    kind: NodeKind,

    #[serde(default)]
    children: Vec<PaletteItem>,
}

impl PaletteItem {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            label: None,
            kind,
            children: Vec::new(),
        }
    }

    /// Sets the label (builder style).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Appends a child template (builder style).
    pub fn with_child(mut self, child: PaletteItem) -> Self {
        self.children.push(child);
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Checks that no leaf template, at any depth, carries children.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::TemplateWithChildren`] for the first offending
    /// template.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.kind.is_container() && !self.children.is_empty() {
            return Err(ModelError::TemplateWithChildren(self.kind));
        }
        self.children.iter().try_for_each(Self::validate)
    }

    /// The template as a model node without ids.
    pub fn to_node(&self) -> DiagramNode {
        let node = DiagramNode::new(self.kind)
            .with_children(self.children.iter().map(Self::to_node).collect());
        match &self.label {
            Some(label) => node.with_label(label.as_str()),
            None => node,
        }
    }
}

/// The built-in catalogue.
pub fn default_catalogue() -> Vec<PaletteItem> {
    vec![
        PaletteItem::new(NodeKind::Receive).with_label("Receive"),
        PaletteItem::new(NodeKind::Invoke).with_label("Invoke"),
        PaletteItem::new(NodeKind::Choose).with_label("Choose"),
        PaletteItem::new(NodeKind::Foreach)
            .with_label("Foreach")
            .with_child(PaletteItem::new(NodeKind::Sequence)),
        PaletteItem::new(NodeKind::Reply).with_label("Reply"),
        PaletteItem::new(NodeKind::Transform).with_label("Transform"),
    ]
}

/// The palette box and its templates.
#[derive(Debug)]
pub struct Palette {
    root: BoxNode,
    templates: Vec<DiagramNode>,
    open: bool,
    trigger_width: f32,
    height: f32,
}

impl Palette {
    /// Builds and lays out the palette under `layer`. It starts closed.
    pub fn new(
        items: &[PaletteItem],
        layer: ScopeId,
        surface: &mut dyn RenderSurface,
        measurer: &dyn TextMeasurer,
        trigger_width: f32,
        height: f32,
    ) -> Self {
        let templates: Vec<_> = items.iter().map(PaletteItem::to_node).collect();
        let root = BoxNode::palette(&templates, layer, surface, measurer);
        let mut palette = Self {
            root,
            templates,
            open: false,
            trigger_width,
            height,
        };
        palette.layout(surface);
        palette
    }

    /// Lays the items out, stretches the column to the full height and
    /// closes the palette.
    pub fn layout(&mut self, surface: &mut dyn RenderSurface) {
        self.root.layout(surface);
        self.root.set_height(self.height);
        surface.set_frame(self.root.scope(), self.root.size());
        self.close(surface);
    }

    pub fn open(&mut self, surface: &mut dyn RenderSurface) {
        self.open = true;
        surface.set_translation(self.root.scope(), Point::default());
        debug!("Palette opened");
    }

    pub fn close(&mut self, surface: &mut dyn RenderSurface) {
        self.open = false;
        let offset = Point::new(self.trigger_width - self.root.size().width(), 0.0);
        surface.set_translation(self.root.scope(), offset);
        debug!("Palette closed");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Bounds of the open palette in editor space.
    pub fn bounds(&self) -> Bounds {
        self.root.bounds()
    }

    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    pub fn root(&self) -> &BoxNode {
        &self.root
    }

    pub fn templates(&self) -> &[DiagramNode] {
        &self.templates
    }

    /// Index of the item under `point`. Hits on the column itself, outside
    /// every item, return `None`.
    pub fn item_at(&self, point: Point) -> Option<usize> {
        match self.root.find_element(point)?.as_slice() {
            [index] => Some(*index),
            _ => None,
        }
    }

    /// Bounds of item `index` in editor space.
    pub fn item_bounds(&self, index: usize) -> Option<Bounds> {
        self.root.children().get(index).map(BoxNode::bounds)
    }

    pub fn template(&self, index: usize) -> Option<&DiagramNode> {
        self.templates.get(index)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use flowbox_core::text::MonospaceMeasurer;

    use super::*;
    use crate::surface::SvgSurface;

    fn palette(surface: &mut SvgSurface) -> Palette {
        let layer = surface.create_scope(None, "palette-layer");
        Palette::new(
            &default_catalogue(),
            layer,
            surface,
            &MonospaceMeasurer::new(10.0, 20.0),
            10.0,
            1000.0,
        )
    }

    #[test]
    fn test_default_catalogue_order() {
        let kinds: Vec<_> = default_catalogue().iter().map(PaletteItem::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Receive,
                NodeKind::Invoke,
                NodeKind::Choose,
                NodeKind::Foreach,
                NodeKind::Reply,
                NodeKind::Transform
            ]
        );
    }

    #[test]
    fn test_validate_rejects_nested_leaf_with_children() {
        assert!(default_catalogue().iter().all(|item| item.validate().is_ok()));

        let item = PaletteItem::new(NodeKind::Foreach).with_child(
            PaletteItem::new(NodeKind::Invoke).with_child(PaletteItem::new(NodeKind::Reply)),
        );

        assert_eq!(
            item.validate(),
            Err(ModelError::TemplateWithChildren(NodeKind::Invoke))
        );
    }

    #[test]
    fn test_foreach_template_carries_empty_sequence() {
        let foreach = default_catalogue()[3].to_node();
        assert_eq!(foreach.children().len(), 1);
        assert_eq!(foreach.children()[0].kind(), NodeKind::Sequence);
        assert!(foreach.children()[0].label().is_none());
    }

    #[test]
    fn test_layout_sizes_column_and_starts_closed() {
        let mut surface = SvgSurface::default();
        let palette = palette(&mut surface);

        // Widest label is "Transform": 9 chars, plus leaf padding and column margins.
        let width = 15.0 + 90.0 + 20.0 + 15.0;
        assert_approx_eq!(f32, palette.bounds().width(), width);
        assert_approx_eq!(f32, palette.bounds().height(), 1000.0);
        assert_eq!(palette.bounds().min_point(), Point::default());
        assert!(!palette.is_open());
        assert_eq!(
            surface.translation(palette.root().scope()),
            Some(Point::new(10.0 - width, 0.0))
        );
    }

    #[test]
    fn test_open_resets_translation() {
        let mut surface = SvgSurface::default();
        let mut palette = palette(&mut surface);

        palette.open(&mut surface);

        assert!(palette.is_open());
        assert_eq!(
            surface.translation(palette.root().scope()),
            Some(Point::default())
        );
    }

    #[test]
    fn test_item_at_hits_items_only() {
        let mut surface = SvgSurface::default();
        let palette = palette(&mut surface);

        let invoke = palette.item_bounds(1).unwrap();
        assert_eq!(palette.item_at(invoke.center()), Some(1));
        assert_eq!(palette.template(1).unwrap().kind(), NodeKind::Invoke);

        // Inside the column margin, outside every item.
        assert_eq!(palette.item_at(Point::new(2.0, 2.0)), None);
        assert_eq!(palette.item_at(Point::new(500.0, 2.0)), None);
    }
}

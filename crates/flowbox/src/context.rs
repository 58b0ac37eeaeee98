//! The editing session shared by all interaction states.
//!
//! [`Context`] owns the model, the box tree mirroring it, the palette, the
//! rendering surface and the transient interaction data (selection, drop
//! target, pending direct edit). Every structural edit goes through one of
//! two paths, both of which keep the box tree mirroring the model:
//!
//! - removals detach the same child from both trees in one step, then re-run
//!   layout;
//! - insertions splice the model and rebuild the box tree wholesale.

use std::fmt;

use log::{debug, info, warn};

use flowbox_core::{
    geometry::{Bounds, Point},
    model::{Diagram, DiagramNode, IdGenerator, ModelError, NodeId, NodeKind},
    text::TextMeasurer,
};

use crate::{
    boxes::{self, BoxNode, BoxPath, Zone},
    config::EditorConfig,
    palette::{Palette, PaletteItem},
    surface::{RenderSurface, ScopeId, SurfaceLayers},
};

/// Descriptor handed to the direct-edit component: where to show the editor
/// (in editor space) and the value to start from.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectEdit {
    bounds: Bounds,
    value: String,
}

impl DirectEdit {
    pub fn new(bounds: Bounds, value: impl Into<String>) -> Self {
        Self {
            bounds,
            value: value.into(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Host component showing an in-place text editor.
///
/// When the user confirms, the host calls
/// [`Editor::commit_direct_edit`](crate::Editor::commit_direct_edit) with the
/// new value.
pub trait DirectEditComponent: fmt::Debug {
    fn start(&mut self, edit: &DirectEdit);

    /// Dismisses the active edit without committing.
    fn cancel(&mut self);
}

/// Direct-edit component that only logs requests. Used by headless hosts.
#[derive(Debug, Default)]
pub struct LoggingDirectEdit {
    active: Option<DirectEdit>,
}

impl LoggingDirectEdit {
    pub fn active(&self) -> Option<&DirectEdit> {
        self.active.as_ref()
    }
}

impl DirectEditComponent for LoggingDirectEdit {
    fn start(&mut self, edit: &DirectEdit) {
        info!(value = edit.value(); "Direct edit started");
        self.active = Some(edit.clone());
    }

    fn cancel(&mut self) {
        if let Some(edit) = self.active.take() {
            info!(value = edit.value(); "Direct edit cancelled");
        }
    }
}

/// Where a dragged node came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOrigin {
    parent: BoxPath,
    index: usize,
    restore: DiagramNode,
}

impl DragOrigin {
    /// Path of the container the node was removed from.
    pub fn parent(&self) -> &[usize] {
        &self.parent
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Subtree put back when the drag is cancelled.
    pub fn restore(&self) -> &DiagramNode {
        &self.restore
    }
}

/// The node carried by a drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPayload {
    node: DiagramNode,
    origin: Option<DragOrigin>,
}

impl DragPayload {
    /// Payload of a fresh palette clone: it has nowhere to snap back to.
    pub fn from_palette(node: DiagramNode) -> Self {
        Self { node, origin: None }
    }

    pub fn node(&self) -> &DiagramNode {
        &self.node
    }

    pub fn origin(&self) -> Option<&DragOrigin> {
        self.origin.as_ref()
    }
}

/// Record of a removed selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    removed: DiagramNode,
    original_bounds: Bounds,
    parent: BoxPath,
    index: usize,
    escalated: bool,
}

impl Removal {
    /// The subtree detached from the model: the selected node, or its whole
    /// `when` branch when the removal escalated.
    pub fn removed(&self) -> &DiagramNode {
        &self.removed
    }

    /// Bounds of the selected box before removal.
    pub fn original_bounds(&self) -> Bounds {
        self.original_bounds
    }

    pub fn parent(&self) -> &[usize] {
        &self.parent
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    /// The node the user selected.
    pub fn dragged_node(&self) -> &DiagramNode {
        match (self.escalated, self.removed.children().first()) {
            (true, Some(child)) => child,
            _ => &self.removed,
        }
    }

    /// Turns the removal into a drag payload that can snap back.
    pub fn into_payload(self) -> DragPayload {
        DragPayload {
            node: self.dragged_node().clone(),
            origin: Some(DragOrigin {
                parent: self.parent,
                index: self.index,
                restore: self.removed,
            }),
        }
    }
}

/// Result of releasing a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The node landed in a drop zone.
    Inserted,
    /// No zone: the node went back where it came from.
    Restored,
    /// No zone and no origin: the palette clone was dropped.
    Discarded,
}

/// The editing session.
#[derive(Debug)]
pub struct Context<S: RenderSurface> {
    diagram: Diagram,
    root: BoxNode,
    palette: Palette,
    selection: Option<BoxPath>,
    drag_target: Option<BoxPath>,
    editing: Option<BoxPath>,
    ids: IdGenerator,
    surface: S,
    layers: SurfaceLayers,
    measurer: Box<dyn TextMeasurer>,
    component: Box<dyn DirectEditComponent>,
    settings: EditorConfig,
}

impl<S: RenderSurface> Context<S> {
    /// Validates the model, assigns missing ids and builds the box tree and
    /// the palette on `surface`.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if a leaf node or a leaf palette template has
    /// children, or if two nodes share an id.
    pub fn new(
        mut diagram: Diagram,
        mut surface: S,
        measurer: Box<dyn TextMeasurer>,
        component: Box<dyn DirectEditComponent>,
        palette_items: &[PaletteItem],
        settings: EditorConfig,
    ) -> Result<Self, ModelError> {
        diagram.validate()?;
        palette_items.iter().try_for_each(PaletteItem::validate)?;
        let ids = diagram.assign_ids()?;

        let layers = SurfaceLayers::create(&mut surface);
        let root = boxes::build_box_tree(&diagram, layers.nodes, &mut surface, measurer.as_ref());
        let palette = Palette::new(
            palette_items,
            layers.palette,
            &mut surface,
            measurer.as_ref(),
            settings.palette_trigger_width(),
            settings.palette_height(),
        );

        Ok(Self {
            diagram,
            root,
            palette,
            selection: None,
            drag_target: None,
            editing: None,
            ids,
            surface,
            layers,
            measurer,
            component,
            settings,
        })
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn root(&self) -> &BoxNode {
        &self.root
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn layers(&self) -> SurfaceLayers {
        self.layers
    }

    pub fn settings(&self) -> &EditorConfig {
        &self.settings
    }

    /// Path of the selected box.
    pub fn selection(&self) -> Option<&[usize]> {
        self.selection.as_deref()
    }

    pub fn selected_box(&self) -> Option<&BoxNode> {
        self.root.get(self.selection.as_deref()?)
    }

    /// Path of the box under the pointer during a drag.
    pub fn drag_target(&self) -> Option<&[usize]> {
        self.drag_target.as_deref()
    }

    pub fn is_direct_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Innermost box under `point`.
    pub fn hit(&self, point: Point) -> Option<BoxPath> {
        self.root.find_element(point)
    }

    /// Selects the innermost selectable box under `point`, clearing any
    /// previous highlight. Returns true if something got selected.
    pub fn select_element(&mut self, point: Point) -> bool {
        let surface = &mut self.surface;
        self.root
            .visit(&mut |boxed| surface.set_selected(boxed.scope(), false));

        self.selection = self
            .root
            .find_element(point)
            .filter(|path| self.root.get(path).is_some_and(BoxNode::is_selectable));
        if let Some(boxed) = self.selected_box() {
            let scope = boxed.scope();
            self.surface.set_selected(scope, true);
        }
        debug!(selection:? = self.selection; "Selection updated");
        self.selection.is_some()
    }

    /// Direct-edit descriptor of the box under `point`.
    pub fn direct_edit_at(&self, point: Point) -> Option<(BoxPath, DirectEdit)> {
        let path = self.root.find_element(point)?;
        let edit = self.root.get(&path)?.direct_edit()?;
        Some((path, edit))
    }

    /// Hands `edit` to the direct-edit component and remembers its target.
    pub fn start_direct_edit(&mut self, path: BoxPath, edit: &DirectEdit) {
        debug!(path:? = path; "Starting direct edit");
        self.editing = Some(path);
        self.component.start(edit);
    }

    /// Applies a confirmed edit to the model and the box, then re-lays out.
    /// Returns false when no edit is pending.
    pub fn commit_direct_edit(&mut self, value: &str) -> bool {
        let Some(path) = self.editing.take() else {
            debug!("No pending direct edit to commit");
            return false;
        };
        let (Some(node), Some(boxed)) = (self.diagram.node_at_mut(&path), self.root.get_mut(&path))
        else {
            debug!(path:? = path; "Direct edit target vanished");
            return false;
        };
        node.set_label(value);
        boxed.set_label(value, self.measurer.as_ref());
        self.root.layout(&mut self.surface);
        info!(node_id:? = node_id_at(&self.diagram, &path), value = value; "Label changed");
        true
    }

    /// Dismisses the pending edit without touching the model.
    pub fn cancel_direct_edit(&mut self) {
        self.component.cancel();
        self.editing = None;
    }

    /// Removes the selection from the model and the box tree.
    ///
    /// When the selection is the only child of a `when` branch whose parent
    /// has other branches, the whole branch is removed instead, so empty
    /// branches do not pile up. Returns `None` when nothing is selected.
    pub fn remove_selection(&mut self) -> Option<Removal> {
        let mut path = self.selection.take()?;
        let original_bounds = self.root.get(&path)?.bounds();

        let escalated = self.should_escalate(&path);
        if escalated {
            path.pop();
        }
        let (&index, parent) = path.split_last()?;
        let removed = self.remove_at(parent, index)?;
        self.root.layout(&mut self.surface);
        self.drag_target = None;

        info!(
            node_id:? = removed.id(),
            kind:% = removed.kind(),
            escalated = escalated;
            "Node removed"
        );
        Some(Removal {
            removed,
            original_bounds,
            parent: parent.to_vec(),
            index,
            escalated,
        })
    }

    fn should_escalate(&self, path: &[usize]) -> bool {
        let Some((_, parent)) = path.split_last() else {
            return false;
        };
        let Some(branch) = self.diagram.node_at(parent) else {
            return false;
        };
        if branch.kind() != NodeKind::When || branch.children().len() != 1 {
            return false;
        }
        let Some((_, grandparent)) = parent.split_last() else {
            return false;
        };
        let siblings = if grandparent.is_empty() {
            self.diagram.nodes().len()
        } else {
            self.diagram
                .node_at(grandparent)
                .map_or(0, |node| node.children().len())
        };
        siblings > 1
    }

    /// Detaches child `index` of the container at `parent` from both trees.
    fn remove_at(&mut self, parent: &[usize], index: usize) -> Option<DiagramNode> {
        let children = self.diagram.children_at_mut(parent)?;
        let parent_box = self.root.get_mut(parent)?;
        if index >= children.len() || index >= parent_box.children().len() {
            return None;
        }
        let node = children.remove(index);
        parent_box.remove_child(index, &mut self.surface);
        Some(node)
    }

    /// Records the box under the pointer as the drop target.
    pub fn set_drag_target(&mut self, target: Option<BoxPath>) {
        self.drag_target = target;
    }

    /// Zone of the current drop target under `point`, with its container path
    /// rooted at the diagram.
    pub fn drop_zone(&self, point: Point) -> Option<Zone> {
        let target = self.drag_target.as_deref()?;
        let zone = self.root.get(target)?.find_zone(point)?;
        Some(zone.with_prefix(target))
    }

    /// Drops `payload` at `point`.
    ///
    /// If the drop target has a zone there, the wrapped node is spliced into
    /// the zone's container. Otherwise a node that came from the diagram is
    /// put back where it was and a palette clone is discarded. The box tree is
    /// rebuilt after every model change.
    pub fn may_insert_node(&mut self, point: Point, payload: DragPayload) -> InsertOutcome {
        let zone = self
            .drop_zone(point)
            .filter(|zone| self.diagram.node_at(zone.container()).is_some());

        let DragPayload { node, origin } = payload;
        let node_id = node.id();
        let inserted = zone.and_then(|zone| match zone.wrap().apply(node, &mut self.ids) {
            Ok(node) => Some((zone, node)),
            Err(err) => {
                warn!(node_id:? = node_id, err:err = err; "Drop rejected");
                None
            }
        });

        let outcome = match (inserted, origin) {
            (Some((zone, node)), _) => {
                info!(
                    node_id:? = node.id(),
                    container:? = zone.container(),
                    index = zone.index();
                    "Node inserted"
                );
                splice(&mut self.diagram, zone.container(), zone.index(), node);
                InsertOutcome::Inserted
            }
            (None, Some(origin)) => {
                debug!(parent:? = origin.parent, index = origin.index; "Drop missed, restoring node");
                splice(&mut self.diagram, &origin.parent, origin.index, origin.restore);
                InsertOutcome::Restored
            }
            (None, None) => {
                debug!(node_id:? = node_id; "Drop missed, discarding palette clone");
                InsertOutcome::Discarded
            }
        };

        if outcome == InsertOutcome::Discarded {
            self.drag_target = None;
        } else {
            self.rebuild();
        }
        outcome
    }

    /// Replaces the box tree with a fresh one built from the model.
    pub fn rebuild(&mut self) {
        self.surface.clear_scope(self.layers.nodes);
        self.root = boxes::build_box_tree(
            &self.diagram,
            self.layers.nodes,
            &mut self.surface,
            self.measurer.as_ref(),
        );
        self.selection = None;
        self.drag_target = None;
        debug_assert!(self.root.mirrors(self.diagram.nodes()));
    }

    pub fn open_palette(&mut self) {
        self.palette.open(&mut self.surface);
    }

    pub fn close_palette(&mut self) {
        self.palette.close(&mut self.surface);
    }

    /// Fresh copy of the template under `point`, with its item's bounds.
    pub fn clone_palette_item(&mut self, point: Point) -> Option<(DiagramNode, Bounds)> {
        let index = self.palette.item_at(point)?;
        let bounds = self.palette.item_bounds(index)?;
        let node = match self.palette.template(index)?.clone_with_fresh_ids(&mut self.ids) {
            Ok(node) => node,
            Err(err) => {
                warn!(err:err = err; "Palette item not cloned");
                return None;
            }
        };
        debug!(kind:% = node.kind(), node_id:? = node.id(); "Palette item cloned");
        Some((node, bounds))
    }

    /// Draws the drag feedback: a frame the size of `bounds` at its position.
    pub fn create_feedback(&mut self, bounds: Bounds) -> ScopeId {
        let scope = self
            .surface
            .create_scope(Some(self.layers.feedback), "drag-element");
        self.surface.set_frame(scope, bounds.to_size());
        self.surface.set_translation(scope, bounds.min_point());
        scope
    }

    pub fn move_feedback(&mut self, scope: ScopeId, position: Point) {
        self.surface.set_translation(scope, position);
    }

    pub fn clear_feedback(&mut self) {
        self.surface.clear_scope(self.layers.feedback);
    }

    /// Draws a zone indicator in the nodes layer.
    pub fn show_cursor(&mut self, indicator: Bounds) -> ScopeId {
        let scope = self.surface.create_scope(Some(self.layers.nodes), "cursor");
        self.surface.set_frame(scope, indicator.to_size());
        self.surface.set_translation(scope, indicator.min_point());
        scope
    }

    pub fn remove_cursor(&mut self, scope: ScopeId) {
        self.surface.remove_scope(scope);
    }
}

fn node_id_at(diagram: &Diagram, path: &[usize]) -> Option<NodeId> {
    diagram.node_at(path).map(DiagramNode::id)
}

/// Inserts `node` into the child list at `container`, clamping the index.
fn splice(diagram: &mut Diagram, container: &[usize], index: usize, node: DiagramNode) {
    if let Some(children) = diagram.children_at_mut(container) {
        let index = index.min(children.len());
        children.insert(index, node);
    }
}

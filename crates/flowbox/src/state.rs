//! The interaction state machine.
//!
//! The editor is always in one of five [`InteractionState`]s. Each input event
//! is handled by the current state, which may edit the shared [`Context`] and
//! returns the next state:
//!
//! ```text
//!   Idle ──press on selectable box──► DetectDrag ──moved past threshold──► DragItem
//!   Idle ──double click on leaf─────► DirectEdit
//!   Idle ──pointer at left edge─────► OnPalette ──press on item──────────► DragItem
//!   DragItem ──release──► Idle
//! ```
//!
//! Transitions run synchronously; there is no terminal state.

use log::{debug, trace};

use flowbox_core::geometry::{Bounds, Point};

use crate::{
    context::{Context, DragPayload},
    surface::{RenderSurface, ScopeId},
};

/// A key released by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Other(u32),
}

impl Key {
    /// Key code of the Delete key.
    pub const DELETE_CODE: u32 = 46;

    pub fn from_code(code: u32) -> Self {
        match code {
            Self::DELETE_CODE => Self::Delete,
            other => Self::Other(other),
        }
    }
}

/// A normalised input event. Points are in editor coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseDown(Point),
    MouseMove(Point),
    MouseUp(Point),
    KeyUp(Key),
    DoubleClick(Point),
}

/// An in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragItem {
    payload: DragPayload,
    /// Pointer position relative to the dragged box's top-left corner.
    offset: Point,
    feedback: ScopeId,
    cursor: Option<ScopeId>,
}

impl DragItem {
    /// Starts dragging `payload`, drawn as a frame of `bounds` grabbed at
    /// `point`. Closes the palette and forgets any stale drop target.
    fn start<S: RenderSurface>(
        payload: DragPayload,
        bounds: Bounds,
        point: Point,
        ctx: &mut Context<S>,
    ) -> Self {
        let feedback = ctx.create_feedback(bounds);
        ctx.close_palette();
        ctx.set_drag_target(None);
        debug!(node_id:? = payload.node().id(); "Drag started");
        Self {
            payload,
            offset: point.sub_point(bounds.min_point()),
            feedback,
            cursor: None,
        }
    }

    pub fn payload(&self) -> &DragPayload {
        &self.payload
    }

    /// Zone indicator currently shown, if any.
    pub fn cursor(&self) -> Option<ScopeId> {
        self.cursor
    }

    pub fn feedback(&self) -> ScopeId {
        self.feedback
    }

    fn handle<S: RenderSurface>(
        mut self,
        event: InputEvent,
        ctx: &mut Context<S>,
    ) -> InteractionState {
        match event {
            InputEvent::MouseMove(point) => {
                ctx.move_feedback(self.feedback, point.sub_point(self.offset));
                let target = ctx.hit(point);
                trace!(hit:? = target; "Drag hit test");
                if target.as_deref() != ctx.drag_target() {
                    ctx.set_drag_target(target);
                    if let Some(cursor) = self.cursor.take() {
                        ctx.remove_cursor(cursor);
                    }
                    if let Some(zone) = ctx.drop_zone(point) {
                        self.cursor = Some(ctx.show_cursor(zone.indicator()));
                    }
                }
                InteractionState::DragItem(self)
            }
            InputEvent::MouseUp(point) => {
                ctx.clear_feedback();
                if let Some(cursor) = self.cursor.take() {
                    ctx.remove_cursor(cursor);
                }
                let outcome = ctx.may_insert_node(point, self.payload);
                debug!(outcome:? = outcome; "Drag finished");
                InteractionState::Idle
            }
            InputEvent::MouseDown(_) | InputEvent::KeyUp(_) | InputEvent::DoubleClick(_) => {
                InteractionState::DragItem(self)
            }
        }
    }
}

/// The interaction states.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A selectable box was pressed; waiting to see if the press becomes a
    /// drag.
    DetectDrag { start: Point },
    DragItem(DragItem),
    /// A direct edit was started. Stays here after the edit completes until
    /// the next event is delegated to [`InteractionState::Idle`].
    DirectEdit,
    /// The palette is open.
    OnPalette,
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DetectDrag { .. } => "detect_drag",
            Self::DragItem(_) => "drag_item",
            Self::DirectEdit => "direct_edit",
            Self::OnPalette => "on_palette",
        }
    }

    /// Handles `event` and returns the next state.
    pub fn handle<S: RenderSurface>(self, event: InputEvent, ctx: &mut Context<S>) -> Self {
        let from = self.name();
        let next = match self {
            Self::Idle => idle(event, ctx),
            Self::DetectDrag { start } => detect_drag(start, event, ctx),
            Self::DragItem(drag) => drag.handle(event, ctx),
            Self::DirectEdit => direct_edit(event, ctx),
            Self::OnPalette => on_palette(event, ctx),
        };
        if from != next.name() {
            debug!(from = from, to = next.name(), event:? = event; "State transition");
        }
        next
    }
}

fn idle<S: RenderSurface>(event: InputEvent, ctx: &mut Context<S>) -> InteractionState {
    match event {
        InputEvent::MouseDown(point) => {
            if ctx.select_element(point) {
                InteractionState::DetectDrag { start: point }
            } else {
                InteractionState::Idle
            }
        }
        InputEvent::MouseMove(point) => {
            if point.x() < ctx.settings().palette_trigger_width() {
                ctx.open_palette();
                InteractionState::OnPalette
            } else {
                InteractionState::Idle
            }
        }
        InputEvent::KeyUp(Key::Delete) => {
            if ctx.remove_selection().is_none() {
                debug!("Nothing selected to delete");
            }
            InteractionState::Idle
        }
        InputEvent::DoubleClick(point) => match ctx.direct_edit_at(point) {
            Some((path, edit)) => {
                ctx.start_direct_edit(path, &edit);
                InteractionState::DirectEdit
            }
            None => InteractionState::Idle,
        },
        InputEvent::MouseUp(_) | InputEvent::KeyUp(Key::Other(_)) => InteractionState::Idle,
    }
}

fn detect_drag<S: RenderSurface>(
    start: Point,
    event: InputEvent,
    ctx: &mut Context<S>,
) -> InteractionState {
    let InputEvent::MouseMove(point) = event else {
        return InteractionState::Idle;
    };
    if start.distance(point) <= ctx.settings().drag_threshold() {
        return InteractionState::DetectDrag { start };
    }
    match ctx.remove_selection() {
        Some(removal) => {
            let bounds = removal.original_bounds();
            InteractionState::DragItem(DragItem::start(removal.into_payload(), bounds, point, ctx))
        }
        None => InteractionState::Idle,
    }
}

fn direct_edit<S: RenderSurface>(event: InputEvent, ctx: &mut Context<S>) -> InteractionState {
    match event {
        InputEvent::MouseDown(_) | InputEvent::MouseUp(_) => {
            if ctx.is_direct_editing() {
                ctx.cancel_direct_edit();
            }
            idle(event, ctx)
        }
        InputEvent::MouseMove(_) | InputEvent::DoubleClick(_) => {
            if ctx.is_direct_editing() {
                InteractionState::DirectEdit
            } else {
                idle(event, ctx)
            }
        }
        InputEvent::KeyUp(_) => InteractionState::DirectEdit,
    }
}

fn on_palette<S: RenderSurface>(event: InputEvent, ctx: &mut Context<S>) -> InteractionState {
    match event {
        InputEvent::MouseDown(point) => match ctx.clone_palette_item(point) {
            Some((node, bounds)) => InteractionState::DragItem(DragItem::start(
                DragPayload::from_palette(node),
                bounds,
                point,
                ctx,
            )),
            None => InteractionState::OnPalette,
        },
        InputEvent::MouseMove(point) => {
            if ctx.palette().contains(point) {
                InteractionState::OnPalette
            } else {
                ctx.close_palette();
                InteractionState::Idle
            }
        }
        InputEvent::MouseUp(_) | InputEvent::KeyUp(_) | InputEvent::DoubleClick(_) => {
            InteractionState::OnPalette
        }
    }
}

#[cfg(test)]
mod tests {
    use flowbox_core::{
        model::{Diagram, DiagramNode, NodeKind},
        text::MonospaceMeasurer,
    };

    use super::*;
    use crate::{
        config::EditorConfig,
        context::LoggingDirectEdit,
        palette::default_catalogue,
        surface::SvgSurface,
    };

    fn context() -> Context<SvgSurface> {
        Context::new(
            Diagram::new(vec![
                DiagramNode::new(NodeKind::Receive).with_label("In"),
                DiagramNode::new(NodeKind::Sequence)
                    .with_child(DiagramNode::new(NodeKind::Invoke).with_label("A"))
                    .with_child(DiagramNode::new(NodeKind::Invoke).with_label("B")),
            ]),
            SvgSurface::default(),
            Box::new(MonospaceMeasurer::new(10.0, 20.0)),
            Box::new(LoggingDirectEdit::default()),
            &default_catalogue(),
            EditorConfig::default(),
        )
        .unwrap()
    }

    fn center(ctx: &Context<SvgSurface>, path: &[usize]) -> Point {
        ctx.root().get(path).unwrap().bounds().center()
    }

    fn run(
        ctx: &mut Context<SvgSurface>,
        state: InteractionState,
        events: &[InputEvent],
    ) -> InteractionState {
        events
            .iter()
            .fold(state, |state, event| state.handle(*event, ctx))
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code(46), Key::Delete);
        assert_eq!(Key::from_code(8), Key::Other(8));
    }

    #[test]
    fn test_mouse_down_on_selectable_box_detects_drag() {
        let mut ctx = context();
        let point = center(&ctx, &[0]);

        let state = InteractionState::Idle.handle(InputEvent::MouseDown(point), &mut ctx);

        assert_eq!(state, InteractionState::DetectDrag { start: point });
    }

    #[test]
    fn test_mouse_down_on_background_stays_idle() {
        let mut ctx = context();
        let state =
            InteractionState::Idle.handle(InputEvent::MouseDown(Point::new(500.0, 500.0)), &mut ctx);
        assert_eq!(state, InteractionState::Idle);
        assert!(ctx.selection().is_none());
    }

    #[test]
    fn test_detect_drag_aborts_on_any_other_event() {
        let mut ctx = context();
        let start = Point::new(50.0, 50.0);
        for event in [
            InputEvent::MouseDown(start),
            InputEvent::MouseUp(start),
            InputEvent::KeyUp(Key::Delete),
            InputEvent::DoubleClick(start),
        ] {
            let state = InteractionState::DetectDrag { start }.handle(event, &mut ctx);
            assert_eq!(state, InteractionState::Idle);
        }
    }

    #[test]
    fn test_delete_removes_selection_in_idle() {
        let mut ctx = context();
        let point = center(&ctx, &[1, 0]);

        let state = run(
            &mut ctx,
            InteractionState::Idle,
            &[
                InputEvent::MouseDown(point),
                InputEvent::MouseUp(point),
                InputEvent::KeyUp(Key::Delete),
            ],
        );

        assert_eq!(state, InteractionState::Idle);
        assert_eq!(ctx.diagram().nodes()[1].children().len(), 1);
        assert!(ctx.selection().is_none());
    }

    #[test]
    fn test_other_keys_do_nothing() {
        let mut ctx = context();
        let point = center(&ctx, &[0]);
        ctx.select_element(point);

        let state = InteractionState::Idle.handle(InputEvent::KeyUp(Key::Other(13)), &mut ctx);

        assert_eq!(state, InteractionState::Idle);
        assert_eq!(ctx.diagram().nodes().len(), 2);
    }

    #[test]
    fn test_moving_to_left_edge_opens_palette() {
        let mut ctx = context();

        let state = InteractionState::Idle.handle(InputEvent::MouseMove(Point::new(5.0, 300.0)), &mut ctx);

        assert_eq!(state, InteractionState::OnPalette);
        assert!(ctx.palette().is_open());

        let state = state.handle(InputEvent::MouseMove(Point::new(900.0, 300.0)), &mut ctx);
        assert_eq!(state, InteractionState::Idle);
        assert!(!ctx.palette().is_open());
    }

    #[test]
    fn test_palette_press_starts_drag_without_origin() {
        let mut ctx = context();
        let state = InteractionState::Idle.handle(InputEvent::MouseMove(Point::new(5.0, 5.0)), &mut ctx);
        let item = ctx.palette().item_bounds(4).unwrap().center();

        let state = state.handle(InputEvent::MouseDown(item), &mut ctx);

        let InteractionState::DragItem(drag) = &state else {
            panic!("expected a drag, got {state:?}");
        };
        assert_eq!(drag.payload().node().kind(), NodeKind::Reply);
        assert!(drag.payload().node().id().is_assigned());
        assert!(drag.payload().origin().is_none());
        assert!(!ctx.palette().is_open());
    }

    #[test]
    fn test_palette_press_outside_items_stays() {
        let mut ctx = context();
        let state = InteractionState::OnPalette.handle(InputEvent::MouseDown(Point::new(2.0, 2.0)), &mut ctx);
        assert_eq!(state, InteractionState::OnPalette);
    }

    #[test]
    fn test_drag_shows_cursor_over_zone_and_drops() {
        let mut ctx = context();
        let source = center(&ctx, &[0]);
        let sequence = ctx.root().get(&[1]).unwrap().bounds();
        // Right margin of the sequence, past the last child.
        let target = Point::new(sequence.max_x() - 2.0, sequence.center().y());

        let state = run(
            &mut ctx,
            InteractionState::Idle,
            &[
                InputEvent::MouseDown(source),
                InputEvent::MouseMove(source.add_point(Point::new(10.0, 0.0))),
            ],
        );
        assert_eq!(state.name(), "drag_item");
        assert_eq!(ctx.diagram().nodes().len(), 1);

        // The first item is gone, so the sequence moved; resolve it again.
        let sequence = ctx.root().get(&[0]).unwrap().bounds();
        let target = Point::new(sequence.max_x() - 2.0, target.y());
        let state = state.handle(InputEvent::MouseMove(target), &mut ctx);
        let InteractionState::DragItem(drag) = &state else {
            panic!("expected a drag, got {state:?}");
        };
        let cursor = drag.cursor().unwrap();
        assert_eq!(ctx.surface().class_of(cursor), Some("cursor"));

        let state = state.handle(InputEvent::MouseUp(target), &mut ctx);

        assert_eq!(state, InteractionState::Idle);
        let children = ctx.diagram().nodes()[0].children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[2].label(), Some("In"));
        assert!(ctx.surface().scopes_with_class("cursor").is_empty());
        assert!(ctx.surface().scopes_with_class("drag-element").is_empty());
    }

    #[test]
    fn test_drag_ignores_other_events() {
        let mut ctx = context();
        let source = center(&ctx, &[0]);
        let state = run(
            &mut ctx,
            InteractionState::Idle,
            &[
                InputEvent::MouseDown(source),
                InputEvent::MouseMove(source.add_point(Point::new(0.0, 10.0))),
                InputEvent::MouseDown(source),
                InputEvent::KeyUp(Key::Delete),
                InputEvent::DoubleClick(source),
            ],
        );
        assert_eq!(state.name(), "drag_item");
    }

    #[test]
    fn test_double_click_on_leaf_starts_direct_edit() {
        let mut ctx = context();
        let point = center(&ctx, &[0]);

        let state = InteractionState::Idle.handle(InputEvent::DoubleClick(point), &mut ctx);

        assert_eq!(state, InteractionState::DirectEdit);
        assert!(ctx.is_direct_editing());

        // Moves and key presses are ignored while the edit is active.
        let state = state.handle(InputEvent::MouseMove(Point::new(2.0, 2.0)), &mut ctx);
        assert_eq!(state, InteractionState::DirectEdit);
        let state = state.handle(InputEvent::KeyUp(Key::Delete), &mut ctx);
        assert_eq!(state, InteractionState::DirectEdit);

        // A press elsewhere cancels and behaves like Idle.
        let state = state.handle(InputEvent::MouseDown(Point::new(500.0, 500.0)), &mut ctx);
        assert_eq!(state, InteractionState::Idle);
        assert!(!ctx.is_direct_editing());
        assert_eq!(ctx.diagram().nodes()[0].label(), Some("In"));
    }

    #[test]
    fn test_direct_edit_delegates_after_commit() {
        let mut ctx = context();
        let point = center(&ctx, &[0]);
        let state = InteractionState::Idle.handle(InputEvent::DoubleClick(point), &mut ctx);
        assert!(ctx.commit_direct_edit("Start"));

        let state = state.handle(InputEvent::MouseMove(Point::new(5.0, 300.0)), &mut ctx);

        assert_eq!(state, InteractionState::OnPalette);
    }

    #[test]
    fn test_double_click_on_container_stays_idle() {
        let mut ctx = context();
        let sequence = ctx.root().get(&[1]).unwrap().bounds();
        let margin = Point::new(sequence.min_x() + 2.0, sequence.center().y());

        let state = InteractionState::Idle.handle(InputEvent::DoubleClick(margin), &mut ctx);

        assert_eq!(state, InteractionState::Idle);
        assert!(!ctx.is_direct_editing());
    }
}

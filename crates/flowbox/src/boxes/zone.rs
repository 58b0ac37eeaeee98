//! Drop zones of composite boxes.

use log::trace;

use flowbox_core::{
    geometry::{Bounds, Point, Size},
    model::{DiagramNode, IdGenerator, ModelError, NodeKind},
};

use super::{BoxKind, BoxNode, BoxPath};

/// Thickness of a zone indicator bar.
const INDICATOR_THICKNESS: f32 = 6.0;
/// Distance from the end of a child to the indicator that follows it.
const INDICATOR_OFFSET: f32 = 10.0;

/// Transform applied to a node before it is spliced into a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    /// The node is inserted as is.
    Identity,
    /// The node becomes the only child of a new `when` branch.
    When,
}

impl Wrap {
    pub fn apply(
        self,
        node: DiagramNode,
        ids: &mut IdGenerator,
    ) -> Result<DiagramNode, ModelError> {
        match self {
            Self::Identity => Ok(node),
            Self::When => {
                let branch = DiagramNode::new(NodeKind::When).with_id(ids.next_id()?);
                Ok(branch.with_child(node))
            }
        }
    }
}

/// A candidate insertion point inside a composite box.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    container: BoxPath,
    index: usize,
    indicator: Bounds,
    wrap: Wrap,
}

impl Zone {
    /// Path of the box whose node receives the insertion, relative to the
    /// box the zone was resolved on.
    pub fn container(&self) -> &[usize] {
        &self.container
    }

    /// Insertion index in the container's children.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Thin bar marking the insertion point, in editor space.
    pub fn indicator(&self) -> Bounds {
        self.indicator
    }

    pub fn wrap(&self) -> Wrap {
        self.wrap
    }

    /// Re-roots the container path under `prefix`.
    pub(crate) fn with_prefix(mut self, prefix: &[usize]) -> Self {
        let mut container = prefix.to_vec();
        container.append(&mut self.container);
        self.container = container;
        self
    }
}

impl BoxNode {
    /// Zone of this box under `point`, if the box accepts drops.
    ///
    /// Sequences accept siblings along their chain, choices accept new
    /// branches, repeats forward to their body. Leaves and the synthetic roots
    /// are never drop targets.
    pub fn find_zone(&self, point: Point) -> Option<Zone> {
        let zone = match &self.kind {
            BoxKind::Sequence => Some(self.horizontal_zone(point)),
            BoxKind::Choose => Some(self.vertical_zone(point)),
            BoxKind::Repeat => self
                .children
                .first()
                .and_then(|body| body.find_zone(point))
                .map(|zone| zone.with_prefix(&[0])),
            BoxKind::Simple(_) | BoxKind::Diagram | BoxKind::Palette => None,
        };
        trace!(zone:? = zone; "Zone resolved");
        zone
    }

    fn horizontal_zone(&self, point: Point) -> Zone {
        let mut index = 0;
        let mut x = self.bounds.min_x();
        for child in &self.children {
            if point.x() < child.bounds.center().x() {
                break;
            }
            index += 1;
            x = child.bounds.max_x() + INDICATOR_OFFSET;
        }
        if index >= self.children.len() {
            x = self.bounds.max_x();
        }
        Zone {
            container: Vec::new(),
            index,
            indicator: Bounds::new_from_top_left(
                Point::new(x - INDICATOR_THICKNESS / 2.0, self.bounds.min_y()),
                Size::new(INDICATOR_THICKNESS, self.bounds.height()),
            ),
            wrap: Wrap::Identity,
        }
    }

    fn vertical_zone(&self, point: Point) -> Zone {
        let mut index = 0;
        let mut y = self.bounds.min_y();
        for child in &self.children {
            if point.y() < child.bounds.center().y() {
                break;
            }
            index += 1;
            y = child.bounds.max_y() + INDICATOR_OFFSET;
        }
        if index >= self.children.len() {
            y = self.bounds.max_y();
        }
        Zone {
            container: Vec::new(),
            index,
            indicator: Bounds::new_from_top_left(
                Point::new(self.bounds.min_x(), y - INDICATOR_THICKNESS / 2.0),
                Size::new(self.bounds.width(), INDICATOR_THICKNESS),
            ),
            wrap: Wrap::When,
        }
    }
}

//! Generic box-arranging algorithm.
//!
//! Every composite box lays its children out in a single line, either along
//! the horizontal or the vertical axis. [`arrange`] implements that line
//! layout once; the box variants only differ in the [`LayoutParams`] they
//! pass to it.
//!
//! The algorithm is post-order: children are laid out first so their sizes
//! are known, then the container sizes itself from them and places each child
//! relative to its own top-left corner.

use log::trace;

use flowbox_core::geometry::{Alignment, Insets, Point, Size};

use crate::{boxes::BoxNode, surface::RenderSurface};

/// Orientation, alignment, gap and margin of a line layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    horizontal: bool,
    alignment: Alignment,
    gap: f32,
    margin: Insets,
}

impl LayoutParams {
    /// Top-level chain of the diagram.
    pub const DIAGRAM: Self = Self::new(true, Alignment::Center, 20.0, Insets::uniform(30.0));

    /// Horizontal chain of a sequence-like container.
    pub const SEQUENCE: Self = Self::new(
        true,
        Alignment::Center,
        20.0,
        Insets::new(0.0, 10.0, 0.0, 10.0),
    );

    /// Single-child wrapper of a `foreach`.
    pub const REPEAT: Self = Self::new(
        true,
        Alignment::Center,
        20.0,
        Insets::new(10.0, 0.0, 10.0, 0.0),
    );

    /// Vertical stack of the branches of a `choose`.
    pub const CHOOSE: Self = Self::new(
        false,
        Alignment::Top,
        20.0,
        Insets::new(10.0, 0.0, 10.0, 30.0),
    );

    /// Vertical list of palette items.
    pub const PALETTE: Self = Self::new(
        false,
        Alignment::Center,
        10.0,
        Insets::new(10.0, 15.0, 10.0, 15.0),
    );

    pub const fn new(horizontal: bool, alignment: Alignment, gap: f32, margin: Insets) -> Self {
        Self {
            horizontal,
            alignment,
            gap,
            margin,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.horizontal
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn margin(&self) -> Insets {
        self.margin
    }

    /// Returns a copy with another alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn main_extent(&self, size: Size) -> f32 {
        if self.horizontal {
            size.width()
        } else {
            size.height()
        }
    }

    fn cross_extent(&self, size: Size) -> f32 {
        if self.horizontal {
            size.height()
        } else {
            size.width()
        }
    }
}

/// Lays out `children` and returns the size of the container holding them.
///
/// Each child is laid out first, then positioned relative to the container's
/// top-left corner. Children are placed one after the other along the main
/// axis with `gap` between consecutive children; on the cross axis they are
/// placed according to the alignment inside the widest child's extent.
pub fn arrange(
    children: &mut [BoxNode],
    params: &LayoutParams,
    surface: &mut dyn RenderSurface,
) -> Size {
    for child in children.iter_mut() {
        child.layout(surface);
    }

    let gaps = children.len().saturating_sub(1) as f32 * params.gap;
    let main_total = children
        .iter()
        .map(|child| params.main_extent(child.size()))
        .sum::<f32>()
        + gaps;
    let cross_total = children
        .iter()
        .map(|child| params.cross_extent(child.size()))
        .fold(0.0_f32, f32::max);

    let margin = params.margin;
    let mut cursor = if params.horizontal {
        margin.left()
    } else {
        margin.top()
    };
    for child in children.iter_mut() {
        let size = child.size();
        let offset = params
            .alignment
            .cross_offset(cross_total, params.cross_extent(size));
        let position = if params.horizontal {
            Point::new(cursor, margin.top() + offset)
        } else {
            Point::new(margin.left() + offset, cursor)
        };
        child.set_relative_position(position, surface);
        cursor += params.main_extent(size) + params.gap;
    }

    let size = if params.horizontal {
        Size::new(main_total, cross_total)
    } else {
        Size::new(cross_total, main_total)
    }
    .add_padding(margin);
    trace!(
        children = children.len(),
        width = size.width(),
        height = size.height();
        "Arranged container"
    );
    size
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::{boxes::BoxNode, surface::SvgSurface};

    fn leaves(surface: &mut SvgSurface, sizes: &[(f32, f32)]) -> Vec<BoxNode> {
        sizes
            .iter()
            .map(|(w, h)| BoxNode::fixed(surface, Size::new(*w, *h)))
            .collect()
    }

    #[test]
    fn test_horizontal_size_sums_main_axis_and_maxes_cross_axis() {
        let mut surface = SvgSurface::default();
        let mut children = leaves(&mut surface, &[(40.0, 20.0), (60.0, 40.0)]);

        let size = arrange(&mut children, &LayoutParams::SEQUENCE, &mut surface);

        assert_approx_eq!(f32, size.width(), 10.0 + 40.0 + 20.0 + 60.0 + 10.0);
        assert_approx_eq!(f32, size.height(), 40.0);
    }

    #[test]
    fn test_horizontal_center_alignment_offsets_cross_axis() {
        let mut surface = SvgSurface::default();
        let mut children = leaves(&mut surface, &[(40.0, 20.0), (60.0, 40.0)]);

        arrange(&mut children, &LayoutParams::SEQUENCE, &mut surface);

        assert_eq!(children[0].rel_position(), Point::new(10.0, 10.0));
        assert_eq!(children[1].rel_position(), Point::new(70.0, 0.0));
    }

    #[test]
    fn test_vertical_leading_alignment_keeps_left_edge() {
        let mut surface = SvgSurface::default();
        let mut children = leaves(&mut surface, &[(40.0, 20.0), (60.0, 40.0)]);

        let size = arrange(&mut children, &LayoutParams::CHOOSE, &mut surface);

        assert_eq!(children[0].rel_position(), Point::new(30.0, 10.0));
        assert_eq!(children[1].rel_position(), Point::new(30.0, 50.0));
        assert_approx_eq!(f32, size.width(), 30.0 + 60.0);
        assert_approx_eq!(f32, size.height(), 10.0 + 20.0 + 20.0 + 40.0 + 10.0);
    }

    #[test]
    fn test_trailing_alignment_places_against_far_edge() {
        let mut surface = SvgSurface::default();
        let mut children = leaves(&mut surface, &[(40.0, 20.0), (60.0, 40.0)]);
        let bottom = LayoutParams::SEQUENCE.with_alignment(Alignment::Bottom);

        arrange(&mut children, &bottom, &mut surface);

        assert_eq!(children[0].rel_position(), Point::new(10.0, 20.0));
        assert_eq!(children[1].rel_position(), Point::new(70.0, 0.0));
    }

    #[test]
    fn test_right_alignment_in_vertical_container() {
        let mut surface = SvgSurface::default();
        let mut children = leaves(&mut surface, &[(40.0, 20.0), (60.0, 40.0)]);
        let right = LayoutParams::CHOOSE.with_alignment(Alignment::Right);

        arrange(&mut children, &right, &mut surface);

        assert_eq!(children[0].rel_position(), Point::new(50.0, 10.0));
        assert_eq!(children[1].rel_position(), Point::new(30.0, 50.0));
    }

    #[test]
    fn test_zero_extent_child_still_gets_gaps() {
        let mut surface = SvgSurface::default();
        let mut children = leaves(&mut surface, &[(0.0, 0.0), (10.0, 10.0)]);

        let size = arrange(&mut children, &LayoutParams::SEQUENCE, &mut surface);

        assert_approx_eq!(f32, size.width(), 10.0 + 0.0 + 20.0 + 10.0 + 10.0);
        assert_eq!(children[1].rel_position().x(), 30.0);
    }

    #[test]
    fn test_positions_are_pushed_to_surface() {
        let mut surface = SvgSurface::default();
        let mut children = leaves(&mut surface, &[(40.0, 20.0)]);

        arrange(&mut children, &LayoutParams::DIAGRAM, &mut surface);

        assert_eq!(
            surface.translation(children[0].scope()),
            Some(Point::new(30.0, 30.0))
        );
    }
}

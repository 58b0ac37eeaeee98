//! Geometric primitives for box layout, hit testing and drop zones.
//!
//! This module provides the small set of geometric types the editor works
//! with when it positions boxes, resolves which box is under the pointer and
//! decides where a dragged node may land.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in editor space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangle defined by minimum and maximum coordinates
//! - [`Insets`] - Margin values for four sides
//! - [`Alignment`] - Cross-axis placement of a child inside its container
//!
//! # Coordinate System
//!
//! Flowbox uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner of the editor at `(0, 0)`
//! - **X-axis**: Increases rightward
//! - **Y-axis**: Increases downward

use serde::Deserialize;

/// A 2D point in editor coordinate space.
///
/// # Examples
///
/// ```
/// # use flowbox_core::geometry::Point;
/// let down = Point::new(100.0, 100.0);
/// let moved = Point::new(106.0, 100.0);
///
/// assert_eq!(down.distance(moved), 6.0);
/// assert_eq!(moved.sub_point(down).x(), 6.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Creates a new size with the specified height
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Returns a new Size with padding added to both width and height
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates.
///
/// Containment is half-open: the minimum edges belong to the bounds, the
/// maximum edges do not, so two adjacent boxes never both contain a point on
/// their shared edge.
///
/// # Examples
///
/// ```
/// # use flowbox_core::geometry::{Bounds, Point, Size};
/// let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(40.0, 20.0));
///
/// assert!(bounds.contains(Point::new(10.0, 20.0)));
/// assert!(!bounds.contains(Point::new(50.0, 30.0)));
/// assert_eq!(bounds.mid_west(), Point::new(10.0, 30.0));
/// assert_eq!(bounds.mid_east(), Point::new(50.0, 30.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Midpoint of the left edge.
    pub fn mid_west(self) -> Point {
        Point::new(self.min_x, self.center().y)
    }

    /// Midpoint of the right edge.
    pub fn mid_east(self) -> Point {
        Point::new(self.max_x, self.center().y)
    }

    /// Returns a copy with the same top-left corner and a new size.
    pub fn with_size(self, size: Size) -> Self {
        Self::new_from_top_left(self.min_point(), size)
    }

    /// Returns true if the point lies inside the bounds (half-open on the max edges).
    pub fn contains(self, point: Point) -> bool {
        self.min_x <= point.x && self.min_y <= point.y && point.x < self.max_x && point.y < self.max_y
    }

    /// Merges two bounds to create a larger bounds that contains both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }
}

/// Represents spacing around an element (padding, margin, etc.)
/// with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates uniform insets with the same value for all sides
    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Returns the top inset value
    pub fn top(self) -> f32 {
        self.top
    }

    /// Returns the right inset value
    pub fn right(self) -> f32 {
        self.right
    }

    /// Returns the bottom inset value
    pub fn bottom(self) -> f32 {
        self.bottom
    }

    /// Returns the left inset value
    pub fn left(self) -> f32 {
        self.left
    }

    fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

/// Cross-axis placement of a child inside a container.
///
/// `Top` and `Left` place the child at the leading edge, `Bottom` and `Right`
/// at the trailing edge, `Center` in the middle. Which pair is meaningful
/// depends on the container's orientation: a horizontal container aligns on
/// the vertical axis (`Top`/`Center`/`Bottom`), a vertical one on the
/// horizontal axis (`Left`/`Center`/`Right`).
///
/// # Examples
///
/// ```
/// # use flowbox_core::geometry::Alignment;
/// assert_eq!(Alignment::Top.cross_offset(40.0, 10.0), 0.0);
/// assert_eq!(Alignment::Center.cross_offset(40.0, 10.0), 15.0);
/// assert_eq!(Alignment::Bottom.cross_offset(40.0, 10.0), 30.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Top,
    Left,
    Center,
    Bottom,
    Right,
}

impl Alignment {
    /// Offset of a child of extent `extent` inside `available` cross-axis space.
    pub fn cross_offset(self, available: f32, extent: f32) -> f32 {
        match self {
            Self::Top | Self::Left => 0.0,
            Self::Center => (available - extent) / 2.0,
            Self::Bottom | Self::Right => available - extent,
        }
    }
}

//! Centralized geometry for placement and transform math
//!
//! This module provides the pure calculations shared between the drag
//! controller, the ghost renderer, and the animation engine: rectangles,
//! 2D affine transforms, layout-axis inference, and the placement
//! calculator that decides where a dragged item lands.
//!
//! All functions here are pure (no I/O, no side effects) and can be
//! tested independently of any host integration.

use serde::{Deserialize, Serialize};

/// Pixel slack allowed when inferring a horizontal layout from two
/// siblings: the second item may start up to this many pixels before the
/// first item's trailing edge and still count as "on the same row".
pub const AXIS_INFERENCE_SLACK: f64 = 5.0;

/// Rects within this distance on both axes are treated as unmoved.
pub const RECT_TOLERANCE: f64 = 1.0;

// ============================================================================
// Point / Rect
// ============================================================================

/// A point in host coordinates (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A measured bounding-box snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Midpoint along the given axis
    #[inline]
    pub fn midpoint(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.left + self.width / 2.0,
            Axis::Vertical => self.top + self.height / 2.0,
        }
    }

    /// Extent of the rect along the given axis
    #[inline]
    pub fn length(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }

    /// Rect shifted by (dx, dy) without changing its size
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            top: self.top + dy,
            left: self.left + dx,
            ..*self
        }
    }

    /// Position-equality within `RECT_TOLERANCE` on both axes
    pub fn same_position(&self, other: &Rect) -> bool {
        (self.top - other.top).abs() <= RECT_TOLERANCE
            && (self.left - other.left).abs() <= RECT_TOLERANCE
    }
}

// ============================================================================
// Layout axis
// ============================================================================

/// Primary layout axis of a list container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Infer the layout axis of a container.
///
/// A declared axis (the flex-direction analog) always wins. Otherwise the
/// relative position of the first two items decides: a second item that
/// starts at or after the first item's trailing edge (minus a small slack)
/// implies a horizontal layout. With fewer than two items the container is
/// treated as vertical.
pub fn infer_axis(declared: Option<Axis>, first: Option<Rect>, second: Option<Rect>) -> Axis {
    if let Some(axis) = declared {
        return axis;
    }
    match (first, second) {
        (Some(a), Some(b)) if b.left >= a.right() - AXIS_INFERENCE_SLACK => Axis::Horizontal,
        _ => Axis::Vertical,
    }
}

// ============================================================================
// Placement calculator
// ============================================================================

/// Where the dragged item should be inserted relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Decide where the dragged item lands relative to `target`.
///
/// The pointer is projected onto the layout axis and compared against the
/// target's midpoint. A symmetric dead-zone of width
/// `target_length * (1 - swap_threshold)` centered on the midpoint
/// suppresses the decision; `swap_threshold = 1` removes the dead-zone
/// entirely, so every off-center position decides.
///
/// With `invert_swap` the geometry flips: the decision zones sit at the
/// target's edges (each `target_length * inverted_threshold / 2` wide) and
/// the center becomes the dead-zone.
pub fn placement(
    pointer: Point,
    target: Rect,
    axis: Axis,
    swap_threshold: f64,
    invert_swap: bool,
    inverted_threshold: f64,
) -> Option<Placement> {
    let p = match axis {
        Axis::Horizontal => pointer.x,
        Axis::Vertical => pointer.y,
    };
    let start = match axis {
        Axis::Horizontal => target.left,
        Axis::Vertical => target.top,
    };
    let len = target.length(axis);
    if len <= 0.0 {
        return None;
    }

    if invert_swap {
        let zone = len * inverted_threshold.clamp(0.0, 1.0) / 2.0;
        if p >= start + len - zone {
            return Some(Placement::After);
        }
        if p <= start + zone {
            return Some(Placement::Before);
        }
        return None;
    }

    let mid = start + len / 2.0;
    let dead = len * (1.0 - swap_threshold.clamp(0.0, 1.0));
    if p > mid + dead / 2.0 {
        Some(Placement::After)
    } else if p < mid - dead / 2.0 {
        Some(Placement::Before)
    } else {
        None
    }
}

// ============================================================================
// 2D affine transforms
// ============================================================================

/// An explicit 2D affine transform `(a, b, c, d, e, f)`:
///
/// ```text
/// | a c e |   | x |
/// | b d f | * | y |
/// | 0 0 1 |   | 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2 {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Matrix product `self * other` (apply `other` first)
    pub fn multiply(&self, other: &Affine2) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// The translation components `(e, f)`
    #[inline]
    pub fn translation(&self) -> (f64, f64) {
        (self.e, self.f)
    }

    /// Decompose into per-axis scale factors, ignoring rotation/skew.
    ///
    /// Returns the column norms, which equal the scale factors for any
    /// rotation-free transform. Degenerate (zero-length) columns decompose
    /// to a scale of 1 so callers never divide by zero.
    pub fn decompose_scale(&self) -> (f64, f64) {
        let sx = (self.a * self.a + self.b * self.b).sqrt();
        let sy = (self.c * self.c + self.d * self.d).sqrt();
        let sx = if sx > 0.0 { sx } else { 1.0 };
        let sy = if sy > 0.0 { sy } else { 1.0 };
        (sx, sy)
    }

    /// Parse a transform from a style-like expression.
    ///
    /// Understands `matrix(a, b, c, d, e, f)`, `scale(x)`, `scale(x, y)`,
    /// and `translate(x, y)`. Anything else yields `None`; callers fall
    /// back to the identity transform.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value == "none" {
            return Some(Self::IDENTITY);
        }
        let open = value.find('(')?;
        let close = value.rfind(')')?;
        if close <= open {
            return None;
        }
        let name = value[..open].trim();
        let args: Vec<f64> = value[open + 1..close]
            .split(',')
            .map(|s| s.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;

        match (name, args.as_slice()) {
            ("matrix", [a, b, c, d, e, f]) => Some(Self {
                a: *a,
                b: *b,
                c: *c,
                d: *d,
                e: *e,
                f: *f,
            }),
            ("scale", [s]) => Some(Self::scale(*s, *s)),
            ("scale", [sx, sy]) => Some(Self::scale(*sx, *sy)),
            ("translate", [tx, ty]) => Some(Self::translate(*tx, *ty)),
            _ => None,
        }
    }
}

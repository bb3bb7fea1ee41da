//! Geometry primitives
//!
//! Axis-aligned rectangles over N dimensions, scalar-generic so the same
//! predicates serve integer tree bounds (`Rect<i64, N>`) and floating
//! physics state (`Rect<f64, N>`). Vectors are nalgebra fixed-size
//! vectors.

use nalgebra::{ClosedAdd, ClosedSub, SVector, Scalar};
use num_traits::{One, Zero};

/// A position in N-dimensional space.
pub type Point<S, const N: usize> = SVector<S, N>;

/// A displacement or extent in N-dimensional space.
pub type Vector<S, const N: usize> = SVector<S, N>;

/// An axis-aligned rectangle: position (minimum corner) plus size.
///
/// Also used as a spacetime rectangle, where the last axis is time in
/// microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<S: Scalar, const N: usize> {
    /// Minimum corner.
    pub pos: Point<S, N>,
    /// Extent along each axis; the far corner is `pos + size`.
    pub size: Vector<S, N>,
}

fn min_scalar<S: PartialOrd>(a: S, b: S) -> S {
    if b < a {
        b
    } else {
        a
    }
}

fn max_scalar<S: PartialOrd>(a: S, b: S) -> S {
    if b > a {
        b
    } else {
        a
    }
}

impl<S, const N: usize> Rect<S, N>
where
    S: Scalar + Copy + PartialOrd + ClosedAdd + ClosedSub + Zero + One,
{
    /// Create a rect from a minimum corner and a size.
    pub fn new(pos: Point<S, N>, size: Vector<S, N>) -> Self {
        Self { pos, size }
    }

    // Open interval overlap on one axis: a's near edge falls inside b or
    // vice versa.
    fn half_overlap(a: &Self, b: &Self, axis: usize) -> bool {
        a.pos[axis] >= b.pos[axis] && a.pos[axis] < b.pos[axis] + b.size[axis]
    }

    fn axis_overlap(a: &Self, b: &Self, axis: usize) -> bool {
        Self::half_overlap(a, b, axis) || Self::half_overlap(b, a, axis)
    }

    // Zero-gap adjacency on one axis in either direction.
    fn axis_touch(a: &Self, b: &Self, axis: usize) -> bool {
        a.pos[axis] + a.size[axis] == b.pos[axis] || b.pos[axis] + b.size[axis] == a.pos[axis]
    }

    /// Whether `self` and `other` share interior area on every axis.
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..N).all(|i| Self::axis_overlap(self, other, i))
    }

    /// Whether `self` and `other` are adjacent with zero gap and no
    /// interior intersection.
    ///
    /// Rects touch when they are *touching only* on at least one axis and
    /// touching or overlapping on all N axes.
    pub fn touches(&self, other: &Self) -> bool {
        let mut touch_only = 0;
        let mut touch_or_overlap = 0;
        for i in 0..N {
            let touch = Self::axis_touch(self, other, i);
            let overlap = Self::axis_overlap(self, other, i);
            if touch && !overlap {
                touch_only += 1;
            }
            if touch || overlap {
                touch_or_overlap += 1;
            }
        }
        touch_only > 0 && touch_or_overlap == N
    }

    /// The lowest axis index along which `self` and `other` have a
    /// zero-gap touch, if any.
    pub fn touching_axis(&self, other: &Self) -> Option<usize> {
        (0..N).find(|&i| Self::axis_touch(self, other, i))
    }

    /// Whether `point` lies within the half-open extent of the rect.
    pub fn contains_point(&self, point: &Point<S, N>) -> bool {
        (0..N).all(|i| point[i] >= self.pos[i] && point[i] < self.pos[i] + self.size[i])
    }

    /// Whether `other` lies entirely within `self`. Contains its own
    /// bounds: `r.contains_rect(&r)` always holds.
    pub fn contains_rect(&self, other: &Self) -> bool {
        (0..N).all(|i| {
            let far = other.pos[i] + other.size[i] - S::one();
            other.pos[i] >= self.pos[i]
                && other.pos[i] < self.pos[i] + self.size[i]
                && far >= self.pos[i]
                && far < self.pos[i] + self.size[i]
        })
    }

    /// The intersection of `self` and `other`. On any axis without
    /// overlap the result has zero extent there.
    pub fn overlap(&self, other: &Self) -> Self {
        let mut result = *self;
        for i in 0..N {
            result.size[i] = S::zero();
            if Self::half_overlap(self, other, i) {
                result.pos[i] = self.pos[i];
                result.size[i] =
                    min_scalar(self.size[i], other.pos[i] + other.size[i] - self.pos[i]);
            } else if Self::half_overlap(other, self, i) {
                result.pos[i] = other.pos[i];
                result.size[i] =
                    min_scalar(other.size[i], self.pos[i] + self.size[i] - other.pos[i]);
            }
        }
        result
    }

    /// The smallest rect containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        let mut result = *self;
        for i in 0..N {
            result.pos[i] = min_scalar(self.pos[i], other.pos[i]);
            let far = max_scalar(
                self.pos[i] + self.size[i],
                other.pos[i] + other.size[i],
            );
            result.size[i] = far - result.pos[i];
        }
        result
    }
}

impl<S: Scalar + Copy> Rect<S, 2> {
    /// Convenience constructor for the 2-D case.
    pub fn from_xywh(x: S, y: S, w: S, h: S) -> Self {
        Self {
            pos: Point::<S, 2>::new(x, y),
            size: Vector::<S, 2>::new(w, h),
        }
    }
}

impl<const N: usize> Rect<f64, N> {
    /// Truncate to the integer grid used by the search tree.
    pub fn to_i64(&self) -> Rect<i64, N> {
        Rect {
            pos: self.pos.map(|v| v as i64),
            size: self.size.map(|v| v as i64),
        }
    }
}

impl<const N: usize> Rect<i64, N> {
    /// Widen to floating point for physics math.
    pub fn to_f64(&self) -> Rect<f64, N> {
        Rect {
            pos: self.pos.map(|v| v as f64),
            size: self.size.map(|v| v as f64),
        }
    }
}

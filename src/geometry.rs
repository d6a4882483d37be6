//! Segment and polygon intersection, shared by collision checks and ray sensing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A road border or any other two-point obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment(pub Point, pub Point);

impl Segment {
    #[inline]
    pub fn points(&self) -> [Point; 2] {
        [self.0, self.1]
    }
}

/// Where two segments cross, and how far along the first one that is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub point: Point,
    /// 0 at the first segment's start, 1 at its end
    pub offset: f64,
}

/// Linear interpolation that returns `a` exactly at `t = 0` and `b` exactly at `t = 1`
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1. - t) + b * t
}

/// Intersection of segments `p1-p2` and `q1-q2`.
///
/// Solves `p1 + (p2 - p1)t = q1 + (q2 - q1)u` for `t` and `u`. Parallel and
/// collinear segments have a zero denominator and never intersect, even when
/// they overlap.
pub fn segment_intersection(p1: Point, p2: Point, q1: Point, q2: Point) -> Option<Intersection> {
    let t_num = (q2.y - q1.y) * (p1.x - q1.x) - (p1.y - q1.y) * (q2.x - q1.x);
    let u_num = (q1.x - p1.x) * (p1.y - p2.y) - (q1.y - p1.y) * (p1.x - p2.x);
    let den = (p2.y - p1.y) * (q2.x - q1.x) - (q2.y - q1.y) * (p2.x - p1.x);

    if den == 0. {
        return None;
    }

    let t = t_num / den;
    let u = u_num / den;
    if !(0. ..=1.).contains(&t) || !(0. ..=1.).contains(&u) {
        return None;
    }

    Some(Intersection {
        point: Point::new(lerp(p1.x, p2.x, t), lerp(p1.y, p2.y, t)),
        offset: t,
    })
}

/// Whether any edge of `a` crosses any edge of `b`. Both are closed cycles,
/// so a two-point "polygon" is a segment traversed both ways.
pub fn polygons_intersect(a: &[Point], b: &[Point]) -> bool {
    a.iter().enumerate().any(|(i, &p1)| {
        let p2 = a[(i + 1) % a.len()];
        b.iter().enumerate().any(|(j, &q1)| {
            let q2 = b[(j + 1) % b.len()];
            segment_intersection(p1, p2, q1, q2).is_some()
        })
    })
}

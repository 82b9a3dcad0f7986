//! Curves attached to routed edges.
//!
//! A [`Spline`] is a list of control points plus enough metadata for a front end to evaluate
//! it. Two kinds exist: interpolating curves that pass through every control point (natural
//! cubic, or a polyline for degree 1) and clamped uniform B-splines that only pass through the
//! first and the last control point.

use serde::{Deserialize, Serialize};

use crate::Vec3;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplineKind {
    Interpolated,
    BSpline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    pub control_points: Vec<Vec3>,
    pub degree: usize,
    pub kind: SplineKind,
    /// Straightening factor the control points were derived with, if any.
    pub tension: Option<f32>,
}

impl Spline {
    pub fn line(a: Vec3, b: Vec3) -> Self {
        Self {
            control_points: vec![a, b],
            degree: 1,
            kind: SplineKind::Interpolated,
            tension: None,
        }
    }

    /// A curve through every point of `points`.
    pub fn interpolate_cubic_natural(points: Vec<Vec3>) -> Self {
        let degree = points.len().saturating_sub(1).clamp(1, 3);
        Self {
            control_points: points,
            degree,
            kind: SplineKind::Interpolated,
            tension: None,
        }
    }

    /// A clamped uniform B-spline. The degree is capped at `points.len() - 1`.
    pub fn bspline(points: Vec<Vec3>, degree: usize) -> Self {
        let degree = degree.min(points.len().saturating_sub(1)).max(1);
        Self {
            control_points: points,
            degree,
            kind: SplineKind::BSpline,
            tension: None,
        }
    }

    /// Pulls interior control points towards the chord between the first and the last one;
    /// the end points stay where they are.
    ///
    /// `beta == 1` keeps the control points, `beta == 0` yields a straight line.
    pub fn with_tension(mut self, beta: f32) -> Result<Self> {
        check_tension(beta)?;
        let n = self.control_points.len();
        if n > 2 {
            let first = self.control_points[0];
            let chord = self.control_points[n - 1] - first;
            let last = (n - 1) as f32;
            for (i, p) in self.control_points.iter_mut().enumerate().take(n - 1).skip(1) {
                let straight = first + chord * (i as f32 / last);
                *p = *p * beta + straight * (1.0 - beta);
            }
        }
        self.tension = Some(beta);
        Ok(self)
    }

    pub fn first(&self) -> Option<Vec3> {
        self.control_points.first().copied()
    }

    pub fn last(&self) -> Option<Vec3> {
        self.control_points.last().copied()
    }

    /// Evaluates the curve into a polyline with `segments` samples per control point span.
    pub fn sample(&self, segments: usize) -> Vec<Vec3> {
        let n = self.control_points.len();
        if n < 2 {
            return self.control_points.clone();
        }
        let segments = segments.max(1);
        match (self.kind, self.degree) {
            (_, 1) => sample_polyline(&self.control_points, segments),
            (SplineKind::Interpolated, _) => sample_natural_cubic(&self.control_points, segments),
            (SplineKind::BSpline, degree) => {
                let knots = clamped_uniform_knots(n, degree);
                let total = segments * (n - 1);
                (0..=total)
                    .map(|s| de_boor(&self.control_points, degree, &knots, s as f32 / total as f32))
                    .collect()
            }
        }
    }

    /// Drops control points closer than `epsilon` to the polygon through their kept neighbors.
    ///
    /// Never adds points and keeps the kind of the curve; the degree is capped by the remaining
    /// point count. A negative `epsilon` counts as zero.
    pub fn simplify(&self, epsilon: f32) -> Self {
        let points = rdp(&self.control_points, epsilon);
        if points.len() == self.control_points.len() {
            return self.clone();
        }
        let simplified = match self.kind {
            SplineKind::Interpolated if self.degree == 1 => Self {
                control_points: points,
                degree: 1,
                kind: SplineKind::Interpolated,
                tension: None,
            },
            SplineKind::Interpolated => Self::interpolate_cubic_natural(points),
            SplineKind::BSpline => Self::bspline(points, self.degree),
        };
        Self {
            tension: self.tension,
            ..simplified
        }
    }
}

pub(crate) fn check_tension(tension: f32) -> Result<()> {
    if (0.0..=1.0).contains(&tension) {
        Ok(())
    } else {
        Err(Error::InvalidTension { tension })
    }
}

fn sample_polyline(points: &[Vec3], segments: usize) -> Vec<Vec3> {
    let mut out = Vec::with_capacity(segments * (points.len() - 1) + 1);
    for w in points.windows(2) {
        for s in 0..segments {
            out.push(w[0].lerp(&w[1], s as f32 / segments as f32));
        }
    }
    out.extend(points.last().copied());
    out
}

fn sample_natural_cubic(points: &[Vec3], segments: usize) -> Vec<Vec3> {
    let n = points.len();

    // Second derivatives with uniform parameter spacing; M[0] = M[n-1] = 0.
    let mut m = vec![Vec3::zeros(); n];
    if n > 2 {
        let inner = n - 2;
        let mut c = vec![0.0f32; inner];
        let mut d = vec![Vec3::zeros(); inner];
        for i in 0..inner {
            let rhs = (points[i + 2] - points[i + 1] * 2.0 + points[i]) * 6.0;
            if i == 0 {
                c[i] = 1.0 / 4.0;
                d[i] = rhs / 4.0;
            } else {
                let denom = 4.0 - c[i - 1];
                c[i] = 1.0 / denom;
                d[i] = (rhs - d[i - 1]) / denom;
            }
        }
        m[inner] = d[inner - 1];
        for i in (0..inner - 1).rev() {
            m[i + 1] = d[i] - m[i + 2] * c[i];
        }
    }

    let mut out = Vec::with_capacity(segments * (n - 1) + 1);
    for i in 0..n - 1 {
        for s in 0..segments {
            let t = s as f32 / segments as f32;
            let u = 1.0 - t;
            out.push(
                points[i] * u
                    + points[i + 1] * t
                    + m[i] * ((u * u * u - u) / 6.0)
                    + m[i + 1] * ((t * t * t - t) / 6.0),
            );
        }
    }
    out.push(points[n - 1]);
    out
}

fn clamped_uniform_knots(n: usize, degree: usize) -> Vec<f32> {
    let inner = (n - degree) as f32;
    (0..n + degree + 1)
        .map(|i| {
            if i <= degree {
                0.0
            } else if i >= n {
                1.0
            } else {
                (i - degree) as f32 / inner
            }
        })
        .collect()
}

fn de_boor(points: &[Vec3], p: usize, knots: &[f32], u: f32) -> Vec3 {
    let n = points.len();
    let k = if u >= 1.0 {
        n - 1
    } else {
        (p..n).rfind(|&k| knots[k] <= u).unwrap_or(p)
    };

    let mut d: Vec<Vec3> = (0..=p).map(|j| points[j + k - p]).collect();
    for r in 1..=p {
        for j in (r..=p).rev() {
            let lo = knots[j + k - p];
            let hi = knots[j + 1 + k - r];
            let alpha = if hi > lo { (u - lo) / (hi - lo) } else { 0.0 };
            d[j] = d[j - 1] * (1.0 - alpha) + d[j] * alpha;
        }
    }
    d[p]
}

/// Ramer–Douglas–Peucker simplification. Keeps the first and the last point.
pub fn rdp(points: &[Vec3], epsilon: f32) -> Vec<Vec3> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let epsilon = epsilon.max(0.0);

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;
    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        let mut max_dist = 0.0f32;
        let mut index = start;
        for i in start + 1..end {
            let dist = distance_to_segment(points[i], points[start], points[end]);
            if dist > max_dist {
                max_dist = dist;
                index = i;
            }
        }
        if index != start && max_dist > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn distance_to_segment(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

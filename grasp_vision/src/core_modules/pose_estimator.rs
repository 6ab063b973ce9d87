// THEORY:
// The `pose_estimator` module answers the question "where is the object and
// how is it tilted?" for a single selected blob. It fits the minimum-area
// oriented rectangle around the blob's contour and derives the angle pair the
// rest of the system reports.
//
// Key architectural principles:
// 1.  **Hull Then Calipers**: The minimum-area enclosing rectangle of a point
//     set always has one side collinear with an edge of the set's convex hull.
//     So the estimator first reduces the contour to its convex hull, then
//     rotates a caliper frame over each hull edge and keeps the orientation
//     with the smallest enclosing area.
// 2.  **Pinned Conventions**: Geometry is only useful downstream if its
//     conventions are explicit. This module pins two of them:
//     - The rotation angle lies in (-90°, 0°), or is exactly 0° when the width
//       reference side is axis-horizontal. `size.0` (width) is always the
//       extent along the direction `(cos angle, sin angle)`; `size.1` (height)
//       is the extent along the perpendicular. Neither is guaranteed to be
//       the longer of the two.
//     - `corners()` emits the four vertices in a fixed cyclic order such that
//       sides (0,1) and (2,3) have length `size.0` and sides (1,2) and (3,0)
//       have length `size.1`. The axis-line builder depends on this order.
// 3.  **Deterministic Ties**: A square-like blob admits several minimum
//     rectangles. Candidate areas are compared with a strict `<`, so the
//     first minimal hull edge in traversal order wins. Callers get *one*
//     consistent, reproducible answer, never a failure.
// 4.  **Total Function**: Degenerate inputs (a single point, a collinear
//     contour) produce a zero-extent rectangle instead of panicking. The
//     area gate upstream makes these unreachable in the normal pipeline.

use crate::core_modules::contour_extractor::Point;
use imageproc::geometry::convex_hull;
use imageproc::point::Point as HullPoint;
use serde::{Deserialize, Serialize};

/// The minimum-area rectangle, at any rotation, enclosing a contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedRect {
    /// Rectangle center in pixel coordinates.
    pub center: (f64, f64),
    /// (width, height): extents along the angle direction and its
    /// perpendicular. Unordered as a pair; compare them before assuming
    /// which side is long.
    pub size: (f64, f64),
    /// Rotation in degrees, strictly between -90° and 0°, or exactly 0° for
    /// a rectangle whose width side is axis-horizontal (verticals fold to 0°
    /// with the size pair swapped).
    pub angle: f64,
}

/// The complementary tilt angles reported for a detection.
/// By construction `horizontal + vertical = 90`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleReport {
    /// Degrees off horizontal, folded to a non-negative magnitude.
    pub horizontal: f64,
    /// Degrees off vertical: `90 - horizontal`.
    pub vertical: f64,
}

impl OrientedRect {
    /// The four corners in the pinned cyclic order: starting at
    /// `center - hw*u - hh*v` and walking the width side first, where
    /// `u = (cos angle, sin angle)` and `v` is its perpendicular.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let a = self.angle.to_radians();
        let (ux, uy) = (a.cos(), a.sin());
        let (vx, vy) = (-uy, ux);
        let (hw, hh) = (self.size.0 / 2.0, self.size.1 / 2.0);
        let (cx, cy) = self.center;
        [
            (cx - hw * ux - hh * vx, cy - hw * uy - hh * vy),
            (cx + hw * ux - hh * vx, cy + hw * uy - hh * vy),
            (cx + hw * ux + hh * vx, cy + hw * uy + hh * vy),
            (cx - hw * ux + hh * vx, cy - hw * uy + hh * vy),
        ]
    }

    /// The corners truncated to integer pixel coordinates, in the same
    /// cyclic order as `corners()`.
    pub fn corner_points(&self) -> [Point; 4] {
        self.corners().map(|(x, y)| Point {
            x: x as i32,
            y: y as i32,
        })
    }

    /// Folds the signed rotation into the complementary angle pair.
    pub fn angles(&self) -> AngleReport {
        let horizontal = if self.angle < 0.0 { -self.angle } else { self.angle };
        AngleReport {
            horizontal,
            vertical: 90.0 - horizontal,
        }
    }
}

pub mod pose_estimator {
    use super::*;

    /// Fits the minimum-area oriented rectangle around a set of contour points.
    ///
    /// Empty input yields a zero rectangle at the origin; a single point
    /// yields a zero-extent rectangle centered on it.
    pub fn min_area_rect(points: &[Point]) -> OrientedRect {
        match points {
            [] => {
                return OrientedRect {
                    center: (0.0, 0.0),
                    size: (0.0, 0.0),
                    angle: 0.0,
                };
            }
            [p] => {
                return OrientedRect {
                    center: (p.x as f64, p.y as f64),
                    size: (0.0, 0.0),
                    angle: 0.0,
                };
            }
            _ => {}
        }

        let hull_points: Vec<HullPoint<i32>> =
            points.iter().map(|p| HullPoint::new(p.x, p.y)).collect();
        let hull = convex_hull(hull_points);

        if hull.len() == 1 {
            return OrientedRect {
                center: (hull[0].x as f64, hull[0].y as f64),
                size: (0.0, 0.0),
                angle: 0.0,
            };
        }

        // Rotating calipers: evaluate the enclosing rectangle aligned with
        // each hull edge and keep the smallest. Strict `<` makes the first
        // minimal edge win, which pins the tie-break for squares.
        let mut best_area = f64::INFINITY;
        let mut best_frame = (1.0, 0.0); // unit edge direction (ux, uy)
        let mut best_extents = (0.0, 0.0, 0.0, 0.0); // (umin, umax, vmin, vmax)

        let n = hull.len();
        for i in 0..n {
            let p = hull[i];
            let q = hull[(i + 1) % n];
            let (ex, ey) = ((q.x - p.x) as f64, (q.y - p.y) as f64);
            let len = (ex * ex + ey * ey).sqrt();
            if len == 0.0 {
                continue;
            }
            let (ux, uy) = (ex / len, ey / len);
            let (vx, vy) = (-uy, ux);

            let mut umin = f64::INFINITY;
            let mut umax = f64::NEG_INFINITY;
            let mut vmin = f64::INFINITY;
            let mut vmax = f64::NEG_INFINITY;
            for h in &hull {
                let (hx, hy) = (h.x as f64, h.y as f64);
                let du = hx * ux + hy * uy;
                let dv = hx * vx + hy * vy;
                umin = umin.min(du);
                umax = umax.max(du);
                vmin = vmin.min(dv);
                vmax = vmax.max(dv);
            }

            let area = (umax - umin) * (vmax - vmin);
            if area < best_area {
                best_area = area;
                best_frame = (ux, uy);
                best_extents = (umin, umax, vmin, vmax);
            }
        }

        let (ux, uy) = best_frame;
        let (vx, vy) = (-uy, ux);
        let (umin, umax, vmin, vmax) = best_extents;

        let cu = (umin + umax) / 2.0;
        let cv = (vmin + vmax) / 2.0;
        let center = (cu * ux + cv * vx, cu * uy + cv * vy);
        let extent_u = umax - umin;
        let extent_v = vmax - vmin;

        let (angle, size) = normalize_orientation(ux, uy, extent_u, extent_v);
        OrientedRect { center, size, angle }
    }

    /// Folds a caliper edge direction into the pinned angle convention.
    ///
    /// Each 90° step of folding swaps which extent counts as "width", so the
    /// returned `size.0` is always the extent along `(cos angle, sin angle)`.
    fn normalize_orientation(
        ux: f64,
        uy: f64,
        extent_u: f64,
        extent_v: f64,
    ) -> (f64, (f64, f64)) {
        // Integer contour points make axis-aligned edges exact; resolve them
        // without trigonometry so an upright rectangle reports exactly 0°.
        let phi = if uy == 0.0 {
            if ux > 0.0 { 0.0 } else { 180.0 }
        } else if ux == 0.0 {
            if uy > 0.0 { 90.0 } else { -90.0 }
        } else {
            uy.atan2(ux).to_degrees()
        };

        let remainder = phi.rem_euclid(90.0);
        let (angle, steps) = if remainder == 0.0 {
            (0.0, (phi / 90.0).round() as i64)
        } else {
            let angle = remainder - 90.0;
            (angle, ((phi - angle) / 90.0).round() as i64)
        };

        let size = if steps.rem_euclid(2) == 1 {
            (extent_v, extent_u)
        } else {
            (extent_u, extent_v)
        };
        (angle, size)
    }
}

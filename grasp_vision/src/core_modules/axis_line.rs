// THEORY:
// The `axis_line` module turns an oriented rectangle into the single most
// useful overlay for a grasping or aiming consumer: the segment running along
// the enclosed object's long axis. The segment joins the midpoints of the
// rectangle's two *short* sides, so it spans the object lengthwise.
//
// Key architectural principles:
// 1.  **Order Dependence, Made Explicit**: The builder relies on the corner
//     order pinned by the pose estimator: sides (0,1) and (2,3) have length
//     `width`, sides (1,2) and (3,0) have length `height`. Which pair is
//     "short" is decided purely by comparing the size pair.
// 2.  **Deterministic Tie**: When width equals height there is no short side.
//     The `width < height` comparison then falls through to the else branch
//     and picks sides (1,2) and (3,0). This is an arbitrary but deterministic
//     choice, a documented ambiguity rather than a defect.
// 3.  **Integer Output**: Midpoints are computed on the truncated integer
//     corners with truncated averaging, matching the raster coordinates the
//     renderer draws in.

use crate::core_modules::contour_extractor::Point;
use serde::{Deserialize, Serialize};

/// The segment joining the midpoints of a rectangle's two short sides,
/// indicating the enclosed object's long-axis direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLine {
    pub start: Point,
    pub end: Point,
}

pub mod axis_line {
    use super::*;

    /// Builds the long-axis segment from integer rectangle corners and the
    /// rectangle's (width, height) pair.
    pub fn build_axis_line(corners: &[Point; 4], size: (f64, f64)) -> AxisLine {
        let (width, height) = size;
        let (first, second) = if width < height {
            // Sides (0,1) and (2,3) have length `width`, the short one.
            ((corners[0], corners[1]), (corners[2], corners[3]))
        } else {
            // Height is shorter, or the pair is tied: sides (1,2) and (3,0).
            ((corners[1], corners[2]), (corners[3], corners[0]))
        };
        AxisLine {
            start: midpoint(first.0, first.1),
            end: midpoint(second.0, second.1),
        }
    }

    /// Truncated integer midpoint of two raster points.
    fn midpoint(p: Point, q: Point) -> Point {
        Point {
            x: (p.x + q.x) / 2,
            y: (p.y + q.y) / 2,
        }
    }
}

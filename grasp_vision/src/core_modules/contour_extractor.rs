// THEORY:
// The `contour_extractor` module is the first stage of the geometric pipeline.
// Its purpose is to transform a flat binary mask (foreground vs. background)
// into a set of structured `Contour` objects, one per connected foreground
// region. A contour is the bridge between raster data and geometry: every
// later stage (blob selection, pose estimation, axis construction) operates
// on contours, never on raw pixels.
//
// Key architectural principles:
// 1.  **Outer Boundaries Only**: The extractor walks the outer border of each
//     connected region using Suzuki-Abe border following. Interior holes are
//     irrelevant to pose extraction (a mug and a disc have the same grasp
//     rectangle), so hole borders are discarded.
// 2.  **Vertex Simplification**: Border following emits every boundary pixel.
//     Most of those are redundant: a straight run of pixels is fully described
//     by its two endpoints. The extractor collapses collinear runs so each
//     contour keeps only the vertices necessary to represent the boundary
//     shape. This keeps downstream hull and area computations cheap.
// 3.  **Pure Function**: Extraction has no side effects and no state. The same
//     mask always produces the same contours, in the same order.
// 4.  **Geometric Area**: A contour knows its enclosed area via the shoelace
//     formula. This is the planar polygon area, not a pixel count, and it is
//     unchanged by the collinear simplification above.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use serde::{Deserialize, Serialize};

/// A simple struct to represent a 2D point on the pixel raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// An ordered, closed polyline approximating the outer boundary of one
/// connected foreground region. Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Boundary vertices in tracing order. The polyline is implicitly closed:
    /// the last vertex connects back to the first.
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// The enclosed polygon area (shoelace formula, absolute value).
    /// Degenerate contours (fewer than 3 vertices, or collinear) have area 0.
    pub fn area(&self) -> f64 {
        let pts = &self.points;
        let n = pts.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice_area: i64 = 0;
        for i in 0..n {
            let p = pts[i];
            let q = pts[(i + 1) % n];
            twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
        }
        twice_area.abs() as f64 / 2.0
    }
}

/// Extracts the simplified outer contours of all connected foreground regions.
/// Foreground is any non-zero mask value. May return an empty vector.
pub fn extract_contours(mask: &GrayImage) -> Vec<Contour> {
    // Border following classifies a region flush against the raster edge as
    // a hole border, which would make edge-touching objects vanish. A
    // one-pixel background margin keeps every region on an outer border;
    // the coordinate shift is undone when the points are converted.
    let padded = pad_with_background(mask);
    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point { x: p.x - 1, y: p.y - 1 })
                .collect();
            Contour::new(simplify_closed(points))
        })
        .collect()
}

/// Copies the mask into a buffer one background pixel wider on each side.
fn pad_with_background(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    for (x, y, pixel) in mask.enumerate_pixels() {
        padded.put_pixel(x + 1, y + 1, *pixel);
    }
    padded
}

/// Removes vertices that sit in the middle of a straight boundary run.
///
/// A vertex survives unless its incoming and outgoing directions are collinear
/// *and* pointing the same way. The direction check keeps the tips of
/// one-pixel-wide spurs, where the trace reverses onto itself.
fn simplify_closed(points: Vec<Point>) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points;
    }

    let mut kept = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let curr = points[i];
        let next = points[(i + 1) % n];

        let (dx1, dy1) = ((curr.x - prev.x) as i64, (curr.y - prev.y) as i64);
        let (dx2, dy2) = ((next.x - curr.x) as i64, (next.y - curr.y) as i64);
        let cross = dx1 * dy2 - dy1 * dx2;
        let dot = dx1 * dx2 + dy1 * dy2;

        // `dot < 0` keeps genuine reversals while still dropping exact
        // duplicate vertices (zero-length segments have dot == 0).
        if cross != 0 || dot < 0 {
            kept.push(curr);
        }
    }

    // A fully collinear trace with no reversal would drop every vertex.
    if kept.is_empty() { points } else { kept }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn mask_with_rect(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        let mut mask = GrayImage::new(w, h);
        for y in y0..=y1 {
            for x in x0..=x1 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        mask
    }

    #[test]
    fn empty_mask_yields_no_contours() {
        let mask = GrayImage::new(32, 32);
        assert!(extract_contours(&mask).is_empty());
    }

    #[test]
    fn filled_rectangle_simplifies_to_four_corners() {
        let mask = mask_with_rect(20, 20, 5, 5, 14, 14);
        let contours = extract_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 4);
        // Border vertices span 5..=14 on both axes: a 9x9 polygon.
        assert_eq!(contours[0].area(), 81.0);
    }

    #[test]
    fn interior_holes_are_ignored() {
        let mut mask = mask_with_rect(24, 24, 2, 2, 19, 19);
        for y in 8..=13 {
            for x in 8..=13 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        let contours = extract_contours(&mask);
        assert_eq!(contours.len(), 1);
    }

    #[test]
    fn edge_touching_region_is_still_outer() {
        // A region flush against the raster corner must not be mistaken for
        // a hole border and dropped.
        let mask = mask_with_rect(80, 80, 0, 0, 59, 59);
        let contours = extract_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 4);
        assert!(contours[0].points.contains(&Point { x: 0, y: 0 }));
        assert_eq!(contours[0].area(), 3481.0);
    }

    #[test]
    fn two_regions_yield_two_contours() {
        let mut mask = mask_with_rect(40, 40, 2, 2, 10, 10);
        for y in 20..=30 {
            for x in 20..=30 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        assert_eq!(extract_contours(&mask).len(), 2);
    }

    #[test]
    fn shoelace_area_of_triangle() {
        let contour = Contour::new(vec![
            Point { x: 0, y: 0 },
            Point { x: 4, y: 0 },
            Point { x: 0, y: 4 },
        ]);
        assert_eq!(contour.area(), 8.0);
    }

    #[test]
    fn degenerate_contours_have_zero_area() {
        let line = Contour::new(vec![Point { x: 0, y: 0 }, Point { x: 9, y: 0 }]);
        assert_eq!(line.area(), 0.0);
        let collinear = Contour::new(vec![
            Point { x: 0, y: 0 },
            Point { x: 5, y: 5 },
            Point { x: 10, y: 10 },
        ]);
        assert_eq!(collinear.area(), 0.0);
    }

    #[test]
    fn simplify_collapses_straight_runs_but_keeps_spur_tips() {
        // A horizontal out-and-back trace, as produced by a 1px-wide line.
        let trace = vec![
            Point { x: 0, y: 0 },
            Point { x: 1, y: 0 },
            Point { x: 2, y: 0 },
            Point { x: 3, y: 0 },
            Point { x: 2, y: 0 },
            Point { x: 1, y: 0 },
        ];
        let simplified = simplify_closed(trace);
        assert_eq!(simplified, vec![Point { x: 0, y: 0 }, Point { x: 3, y: 0 }]);
    }
}

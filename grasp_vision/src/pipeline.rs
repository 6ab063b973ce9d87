// THEORY:
// The `pipeline` module is the final, top-level API for the pose-extraction
// engine. It chains the geometric stages (contour extraction -> dominant blob
// selection -> minimum-rectangle pose -> long-axis line) into one synchronous,
// stateless call per frame, and exposes the tagged three-way report the
// caller branches on. The pipeline itself performs no I/O and no drawing;
// acquiring frames, segmenting them into masks, and rendering the results are
// the caller's concern.
//
// The configuration is an explicit immutable value passed in at construction,
// not module-level state. It also carries the HSV color bounds consumed by
// the *external* segmenter, so the caller and the segmenter share one source
// of truth for what "the target color" means.

use crate::core_modules::axis_line::axis_line::build_axis_line;
use crate::core_modules::blob_selector::blob_selector::select_dominant;
use crate::core_modules::contour_extractor::extract_contours;
use crate::core_modules::pose_estimator::pose_estimator::min_area_rect;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export key data structures for the public API.
pub use crate::core_modules::axis_line::AxisLine;
pub use crate::core_modules::blob_selector::{Blob, BlobSelection};
pub use crate::core_modules::contour_extractor::{Contour, Point};
pub use crate::core_modules::pose_estimator::{AngleReport, OrientedRect};

/// Minimum enclosed area (in squared pixel units) a blob must exceed to be
/// treated as a valid detection.
pub const DEFAULT_MIN_BLOB_AREA: f64 = 500.0;

/// An inclusive lower/upper pair of HSV bounds, in OpenCV's 8-bit HSV
/// convention (hue 0..=180, saturation and value 0..=255).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

/// The color-classification bounds the external segmenter applies.
///
/// Hue wraps around at the top of its range, so a color sitting on the wrap
/// boundary (like red) needs two hue windows whose masks are OR-ed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBounds {
    /// The window at the low end of the hue circle.
    pub primary: HsvRange,
    /// The window at the high end of the hue circle, covering the wrap.
    pub wrapped: HsvRange,
}

impl Default for ColorBounds {
    /// Bounds for a saturated red target.
    fn default() -> Self {
        Self {
            primary: HsvRange {
                lower: [0, 100, 100],
                upper: [10, 255, 255],
            },
            wrapped: HsvRange {
                lower: [160, 100, 100],
                upper: [180, 255, 255],
            },
        }
    }
}

/// Configuration for the VisionPipeline, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum blob area; the dominant blob must strictly exceed this.
    pub min_blob_area: f64,
    /// HSV bounds for the caller's segmenter. Not used by the core stages,
    /// but carried here so every consumer applies the same criterion.
    pub color_bounds: ColorBounds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_blob_area: DEFAULT_MIN_BLOB_AREA,
            color_bounds: ColorBounds::default(),
        }
    }
}

/// A configuration that cannot produce meaningful detections.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("minimum blob area must be finite and non-negative, got {0}")]
    InvalidMinArea(f64),
    #[error("inverted HSV range: lower {lower:?} exceeds upper {upper:?}")]
    InvertedRange { lower: [u8; 3], upper: [u8; 3] },
}

impl PipelineConfig {
    /// Checks the configuration before the pipeline is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_blob_area.is_finite() || self.min_blob_area < 0.0 {
            return Err(ConfigError::InvalidMinArea(self.min_blob_area));
        }
        for range in [&self.color_bounds.primary, &self.color_bounds.wrapped] {
            if range.lower.iter().zip(&range.upper).any(|(lo, hi)| lo > hi) {
                return Err(ConfigError::InvertedRange {
                    lower: range.lower,
                    upper: range.upper,
                });
            }
        }
        Ok(())
    }
}

/// The full pose data package for a detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Rectangle center in pixel coordinates.
    pub center: (f64, f64),
    /// Rectangle (width, height); unordered as a pair.
    pub size: (f64, f64),
    /// Raw rotation angle in the negative-degrees convention: in (-90°, 0°),
    /// or exactly 0° when the width side is axis-horizontal.
    pub angle: f64,
    /// Degrees off horizontal, non-negative.
    pub horizontal_angle: f64,
    /// Degrees off vertical; `horizontal_angle + vertical_angle == 90`.
    pub vertical_angle: f64,
    /// The rectangle's corners, truncated to integers, in the cyclic order
    /// pinned by the pose estimator.
    pub corners: [Point; 4],
    /// Segment along the object's long axis (short-side midpoints).
    pub axis_line: AxisLine,
    /// The selected blob's contour, for boundary overlays.
    pub contour: Contour,
    /// The selected blob's enclosed area.
    pub area: f64,
}

/// The primary output of the vision pipeline for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PoseReport {
    /// No foreground region matched the color criterion.
    NoObjectDetected,
    /// The dominant region's area was at or below the configured minimum.
    ObjectTooSmall,
    /// A valid target with its full pose data.
    Detected(Detection),
}

/// The main, top-level struct for the pose-extraction engine.
///
/// Holds nothing but the immutable configuration: every frame is analyzed
/// from scratch, so identical masks produce bit-identical reports.
pub struct VisionPipeline {
    config: PipelineConfig,
}

impl VisionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyzes one frame's binary mask and reports the frame outcome.
    /// Foreground is any non-zero mask value.
    pub fn analyze(&self, mask: &GrayImage) -> PoseReport {
        // Stage 1: Outer-boundary contour extraction.
        let contours = extract_contours(mask);
        log::debug!("extracted {} outer contour(s)", contours.len());

        // Stage 2: Dominant blob selection with the area gate.
        let blob = match select_dominant(contours, self.config.min_blob_area) {
            BlobSelection::NoContours => return PoseReport::NoObjectDetected,
            BlobSelection::TooSmall => return PoseReport::ObjectTooSmall,
            BlobSelection::Selected(blob) => blob,
        };

        // Stage 3: Minimum-area oriented rectangle and the angle pair.
        let rect = min_area_rect(&blob.contour.points);
        let angles = rect.angles();
        let corners = rect.corner_points();

        // Stage 4: Long-axis line from the short-side midpoints.
        let axis = build_axis_line(&corners, rect.size);

        log::debug!(
            "detected blob: area={:.1} center=({:.1},{:.1}) angle={:.1}",
            blob.area,
            rect.center.0,
            rect.center.1,
            rect.angle
        );

        PoseReport::Detected(Detection {
            center: rect.center,
            size: rect.size,
            angle: rect.angle,
            horizontal_angle: angles.horizontal,
            vertical_angle: angles.vertical,
            corners,
            axis_line: axis,
            contour: blob.contour,
            area: blob.area,
        })
    }
}

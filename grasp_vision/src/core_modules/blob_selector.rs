// THEORY:
// The `blob_selector` module is the gatekeeper between contour extraction and
// pose estimation. A frame may contain any number of foreground regions: the
// target object, color-similar clutter, or nothing at all. The selector's job
// is to reduce that set to *at most one* usable blob, and to make the "no
// usable blob" cases explicit values rather than implicit absences.
//
// Key architectural principles:
// 1.  **Dominance**: Exactly one contour, the one with maximum enclosed area,
//     is considered per frame. The target is assumed to be the visually
//     dominant color-matched region; everything smaller is clutter.
// 2.  **Area Gate**: Even the dominant contour is rejected when its area does
//     not exceed the configured minimum. Tiny regions are almost always
//     segmentation noise, and a pose fitted to them would be meaningless.
// 3.  **Three-Way Outcome**: The result is a tagged enum with exactly three
//     states: no contours at all, a dominant contour that is too small, or a
//     selected blob. Downstream stages only ever run on the selected case.
//     "Nothing visible" is an ordinary frame state here, never an error.
// 4.  **Stateless Utility**: Selection is a pure function of one frame's
//     contour set and a threshold. Ties on area resolve to the contour
//     extracted first, so repeated runs on the same mask pick the same blob.

use crate::core_modules::contour_extractor::Contour;
use serde::{Deserialize, Serialize};

/// A contour together with its computed enclosed area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub contour: Contour,
    /// Planar polygon area of the contour, in squared pixel units.
    pub area: f64,
}

/// The three-way outcome of dominant-blob selection for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlobSelection {
    /// The contour set was empty: nothing matched the color criterion.
    NoContours,
    /// The largest contour's area was at or below the minimum. Carries no
    /// blob: an undersized region is unusable by construction.
    TooSmall,
    /// The dominant blob, ready for pose estimation.
    Selected(Blob),
}

pub mod blob_selector {
    use super::*;

    /// Picks the largest-area contour and gates it against `min_area`.
    ///
    /// The blob is selected only when its area strictly exceeds the minimum;
    /// an area exactly equal to the threshold is rejected as too small.
    pub fn select_dominant(contours: Vec<Contour>, min_area: f64) -> BlobSelection {
        if contours.is_empty() {
            return BlobSelection::NoContours;
        }

        let mut best: Option<Blob> = None;
        for contour in contours {
            let area = contour.area();
            let replace = match &best {
                Some(blob) => area > blob.area,
                None => true,
            };
            if replace {
                best = Some(Blob { contour, area });
            }
        }

        // `contours` was non-empty, so `best` is always populated here.
        match best {
            Some(blob) if blob.area > min_area => BlobSelection::Selected(blob),
            _ => BlobSelection::TooSmall,
        }
    }
}

// End-to-end checks of the full pipeline on synthetic masks: the frame-level
// outcomes, the angle conventions, and reproducibility.

use grasp_vision::pipeline::{PipelineConfig, PoseReport, VisionPipeline};
use image::{GrayImage, Luma};

fn pipeline() -> VisionPipeline {
    let config = PipelineConfig::default();
    config.validate().expect("default config must be valid");
    VisionPipeline::new(config)
}

fn filled_square_mask() -> GrayImage {
    // A filled axis-aligned square spanning rows/cols 50..=149.
    let mut mask = GrayImage::new(200, 200);
    for y in 50..150 {
        for x in 50..150 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

fn small_disc_mask() -> GrayImage {
    // A filled disc of radius 10: area ~314, under the 500 minimum.
    let mut mask = GrayImage::new(120, 120);
    let (cx, cy, r2) = (60i32, 60i32, 100i32);
    for y in 0..120i32 {
        for x in 0..120i32 {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r2 {
                mask.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
    }
    mask
}

fn rotated_rect_mask() -> GrayImage {
    // A filled 100x40 rectangle tilted 30 degrees from horizontal.
    let mut mask = GrayImage::new(300, 300);
    let (cx, cy) = (150.0, 150.0);
    let theta = 30f64.to_radians();
    let (ux, uy) = (theta.cos(), theta.sin());
    for y in 0..300 {
        for x in 0..300 {
            let (dx, dy) = (x as f64 - cx, y as f64 - cy);
            let du = dx * ux + dy * uy;
            let dv = -dx * uy + dy * ux;
            if du.abs() <= 50.0 && dv.abs() <= 20.0 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }
    mask
}

#[test]
fn scenario_axis_aligned_square() {
    let report = pipeline().analyze(&filled_square_mask());
    let detection = match report {
        PoseReport::Detected(d) => d,
        other => panic!("expected Detected, got {other:?}"),
    };

    assert_eq!(detection.center, (99.5, 99.5));
    assert_eq!(detection.size, (99.0, 99.0));
    assert_eq!(detection.angle, 0.0);
    assert_eq!(detection.horizontal_angle, 0.0);
    assert_eq!(detection.vertical_angle, 90.0);
    assert_eq!(detection.area, 9801.0);

    // The pinned corner order for an upright rectangle.
    let expected = [(50, 50), (149, 50), (149, 149), (50, 149)];
    for (corner, (x, y)) in detection.corners.iter().zip(expected) {
        assert_eq!((corner.x, corner.y), (x, y));
    }

    // Square tie: the axis line joins the midpoints of sides (1,2) and (3,0).
    assert_eq!((detection.axis_line.start.x, detection.axis_line.start.y), (149, 99));
    assert_eq!((detection.axis_line.end.x, detection.axis_line.end.y), (50, 99));
}

#[test]
fn scenario_empty_mask() {
    let mask = GrayImage::new(160, 120);
    assert_eq!(pipeline().analyze(&mask), PoseReport::NoObjectDetected);
}

#[test]
fn scenario_undersized_disc() {
    assert_eq!(pipeline().analyze(&small_disc_mask()), PoseReport::ObjectTooSmall);
}

#[test]
fn scenario_rotated_rectangle() {
    let report = pipeline().analyze(&rotated_rect_mask());
    let detection = match report {
        PoseReport::Detected(d) => d,
        other => panic!("expected Detected, got {other:?}"),
    };

    // Side lengths recover the generating rectangle up to rasterization.
    let short = detection.size.0.min(detection.size.1);
    let long = detection.size.0.max(detection.size.1);
    assert!((36.0..=44.0).contains(&short), "short side {short}");
    assert!((96.0..=104.0).contains(&long), "long side {long}");

    assert!(
        (55.0..=65.0).contains(&detection.horizontal_angle),
        "horizontal {}",
        detection.horizontal_angle
    );
    assert_eq!(detection.horizontal_angle + detection.vertical_angle, 90.0);

    // The axis line spans the long side and runs near 30 degrees.
    let dx = (detection.axis_line.end.x - detection.axis_line.start.x) as f64;
    let dy = (detection.axis_line.end.y - detection.axis_line.start.y) as f64;
    let length = (dx * dx + dy * dy).sqrt();
    assert!((90.0..=110.0).contains(&length), "axis length {length}");
    let tilt = dy.atan2(dx).to_degrees().abs();
    let tilt = tilt.min(180.0 - tilt);
    assert!((25.0..=35.0).contains(&tilt), "axis tilt {tilt}");
}

#[test]
fn scenario_object_flush_against_frame_edge() {
    // An object partially out of frame leaves foreground touching the raster
    // boundary; it must still be detected with the correct rectangle.
    let mut mask = GrayImage::new(80, 80);
    for y in 0..60 {
        for x in 0..60 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }

    let detection = match pipeline().analyze(&mask) {
        PoseReport::Detected(d) => d,
        other => panic!("expected Detected, got {other:?}"),
    };

    assert_eq!(detection.center, (29.5, 29.5));
    assert_eq!(detection.size, (59.0, 59.0));
    assert_eq!(detection.angle, 0.0);
    assert_eq!(detection.area, 3481.0);
    let expected = [(0, 0), (59, 0), (59, 59), (0, 59)];
    for (corner, (x, y)) in detection.corners.iter().zip(expected) {
        assert_eq!((corner.x, corner.y), (x, y));
    }
}

#[test]
fn no_detection_when_every_region_is_small() {
    // Two separate small blobs; the larger one is still under the gate.
    let mut mask = GrayImage::new(100, 100);
    for y in 10..25 {
        for x in 10..25 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    for y in 60..70 {
        for x in 60..70 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    assert_eq!(pipeline().analyze(&mask), PoseReport::ObjectTooSmall);
}

#[test]
fn identical_masks_produce_identical_reports() {
    let mask = rotated_rect_mask();
    let pipeline = pipeline();
    assert_eq!(pipeline.analyze(&mask), pipeline.analyze(&mask));
}

#[test]
fn angle_pair_always_sums_to_ninety() {
    let masks = [filled_square_mask(), rotated_rect_mask()];
    let pipeline = pipeline();
    for mask in &masks {
        if let PoseReport::Detected(d) = pipeline.analyze(mask) {
            assert!(d.horizontal_angle >= 0.0 && d.horizontal_angle <= 90.0);
            assert_eq!(d.vertical_angle, 90.0 - d.horizontal_angle);
        } else {
            panic!("expected a detection");
        }
    }
}

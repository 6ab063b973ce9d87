use anyhow::{Context, Result};
use grasp_vision::pipeline::{
    ColorBounds, Detection, HsvRange, PipelineConfig, PoseReport, VisionPipeline,
};
use image::GrayImage;
use opencv::{
    core::{self, Mat, Point as CvPoint, Scalar, Size, Vector},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::env;

/// Outcome of one iteration of the outer frame loop.
enum LoopSignal {
    Continue,
    Stop,
}

fn main() -> Result<()> {
    env_logger::init();

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    let camera_index: i32 = if args.len() > 1 {
        args[1]
            .parse()
            .context("camera index must be an integer")?
    } else {
        0
    };

    // --- 2. Video I/O Initialization ---
    let mut cap = VideoCapture::new(camera_index, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        anyhow::bail!("error opening camera {camera_index}");
    }

    // --- 3. Vision Pipeline Initialization ---
    let config = PipelineConfig::default();
    config.validate()?;
    let pipeline = VisionPipeline::new(config.clone());

    println!("'q' to quit");

    // --- 4. Main Processing Loop ---
    // One frame is fully segmented and analyzed per iteration. The capture
    // handle is dropped (and so released) on every exit path, and window
    // teardown runs whether the loop stopped normally or with an error.
    let result = run_capture_loop(&mut cap, &pipeline, &config.color_bounds);
    if let Err(e) = highgui::destroy_all_windows() {
        log::warn!("window teardown failed: {e}");
    }
    result?;

    println!("Processing complete.");
    Ok(())
}

/// Drives the frame loop until a stop signal or an error.
fn run_capture_loop(
    cap: &mut VideoCapture,
    pipeline: &VisionPipeline,
    bounds: &ColorBounds,
) -> Result<()> {
    loop {
        match process_frame(cap, pipeline, bounds)? {
            LoopSignal::Continue => {}
            LoopSignal::Stop => return Ok(()),
        }
    }
}

/// Runs one full capture -> segment -> analyze -> render cycle.
fn process_frame(
    cap: &mut VideoCapture,
    pipeline: &VisionPipeline,
    bounds: &ColorBounds,
) -> Result<LoopSignal> {
    let mut frame = Mat::default();
    if !cap.read(&mut frame)? || frame.empty() {
        // Acquisition failure is fatal to the loop; the core is never
        // invoked for this cycle.
        log::warn!("frame acquisition failed, stopping");
        return Ok(LoopSignal::Stop);
    }

    // --- 5. Color Segmentation (upstream of the core) ---
    let mask = segment_target_color(&frame, bounds)?;
    let mask_image = mask_to_gray_image(&mask)?;

    // --- 6. Core Pipeline ---
    let report = pipeline.analyze(&mask_image);

    // --- 7. Visualization & Console Reporting ---
    let mut output = frame.clone();
    match &report {
        PoseReport::Detected(detection) => {
            draw_detection(&mut output, detection)?;
            println!(
                "Center: ({}, {}) | Horizontal: {:.1} deg | Vertical: {:.1} deg",
                detection.center.0 as i32,
                detection.center.1 as i32,
                detection.horizontal_angle,
                detection.vertical_angle
            );
        }
        PoseReport::ObjectTooSmall => draw_status(&mut output, "Object too small")?,
        PoseReport::NoObjectDetected => draw_status(&mut output, "No object detected")?,
    }

    highgui::imshow("Original", &output)?;
    highgui::imshow("Mask", &mask)?;

    // --- 8. Cooperative Shutdown Check ---
    let key = highgui::wait_key(1)?;
    if key == 'q' as i32 {
        return Ok(LoopSignal::Stop);
    }
    Ok(LoopSignal::Continue)
}

/// Builds the binary foreground mask for the configured target color:
/// BGR -> HSV, one in-range pass per hue window (the hue circle wraps, so a
/// boundary color needs two), OR-combined, then a morphological open and
/// close with a 5x5 kernel to suppress speckle noise.
fn segment_target_color(frame: &Mat, bounds: &ColorBounds) -> Result<Mat> {
    let mut hsv = Mat::default();
    imgproc::cvt_color(frame, &mut hsv, imgproc::COLOR_BGR2HSV, 0)?;

    let primary = in_hsv_range(&hsv, &bounds.primary)?;
    let wrapped = in_hsv_range(&hsv, &bounds.wrapped)?;
    let mut combined = Mat::default();
    core::bitwise_or(&primary, &wrapped, &mut combined, &core::no_array())?;

    let kernel = imgproc::get_structuring_element(
        imgproc::MORPH_RECT,
        Size::new(5, 5),
        CvPoint::new(-1, -1),
    )?;
    let border_value = imgproc::morphology_default_border_value()?;
    let mut opened = Mat::default();
    imgproc::morphology_ex(
        &combined,
        &mut opened,
        imgproc::MORPH_OPEN,
        &kernel,
        CvPoint::new(-1, -1),
        1,
        core::BORDER_CONSTANT,
        border_value,
    )?;
    let mut cleaned = Mat::default();
    imgproc::morphology_ex(
        &opened,
        &mut cleaned,
        imgproc::MORPH_CLOSE,
        &kernel,
        CvPoint::new(-1, -1),
        1,
        core::BORDER_CONSTANT,
        border_value,
    )?;
    Ok(cleaned)
}

fn in_hsv_range(hsv: &Mat, range: &HsvRange) -> Result<Mat> {
    let lower = Scalar::new(
        range.lower[0] as f64,
        range.lower[1] as f64,
        range.lower[2] as f64,
        0.0,
    );
    let upper = Scalar::new(
        range.upper[0] as f64,
        range.upper[1] as f64,
        range.upper[2] as f64,
        0.0,
    );
    let mut mask = Mat::default();
    core::in_range(hsv, &lower, &upper, &mut mask)?;
    Ok(mask)
}

/// Bridges the OpenCV CV_8UC1 mask into the `image` buffer the core consumes.
fn mask_to_gray_image(mask: &Mat) -> Result<GrayImage> {
    let size = mask.size()?;
    let data = mask.data_bytes()?.to_vec();
    GrayImage::from_raw(size.width as u32, size.height as u32, data)
        .context("mask buffer dimensions mismatch")
}

/// Draws the full detection overlay: contour (green), minimum-area box
/// (blue), center dot (red), long-axis line (yellow), and text readout.
fn draw_detection(output: &mut Mat, detection: &Detection) -> Result<()> {
    let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
    let blue = Scalar::new(255.0, 0.0, 0.0, 0.0);
    let red = Scalar::new(0.0, 0.0, 255.0, 0.0);
    let yellow = Scalar::new(0.0, 255.0, 255.0, 0.0);
    let white = Scalar::new(255.0, 255.0, 255.0, 0.0);

    let contour: Vector<CvPoint> = detection
        .contour
        .points
        .iter()
        .map(|p| CvPoint::new(p.x, p.y))
        .collect();
    let mut contours: Vector<Vector<CvPoint>> = Vector::new();
    contours.push(contour);
    imgproc::polylines(output, &contours, true, green, 2, imgproc::LINE_8, 0)?;

    let corners: Vector<CvPoint> = detection
        .corners
        .iter()
        .map(|p| CvPoint::new(p.x, p.y))
        .collect();
    let mut boxes: Vector<Vector<CvPoint>> = Vector::new();
    boxes.push(corners);
    imgproc::polylines(output, &boxes, true, blue, 2, imgproc::LINE_8, 0)?;

    let center = CvPoint::new(detection.center.0 as i32, detection.center.1 as i32);
    imgproc::circle(output, center, 5, red, -1, imgproc::LINE_8, 0)?;

    imgproc::line(
        output,
        CvPoint::new(detection.axis_line.start.x, detection.axis_line.start.y),
        CvPoint::new(detection.axis_line.end.x, detection.axis_line.end.y),
        yellow,
        2,
        imgproc::LINE_8,
        0,
    )?;

    let lines = [
        format!("Center: ({}, {})", center.x, center.y),
        format!("Angle (horiz): {:.1} deg", detection.horizontal_angle),
        format!("Angle (vert): {:.1} deg", detection.vertical_angle),
    ];
    for (i, text) in lines.iter().enumerate() {
        imgproc::put_text(
            output,
            text,
            CvPoint::new(10, 30 + 30 * i as i32),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.6,
            white,
            2,
            imgproc::LINE_8,
            false,
        )?;
    }
    Ok(())
}

/// Draws the red status line for frames with no usable detection.
fn draw_status(output: &mut Mat, message: &str) -> Result<()> {
    imgproc::put_text(
        output,
        message,
        CvPoint::new(10, 30),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.7,
        Scalar::new(0.0, 0.0, 255.0, 0.0),
        2,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}

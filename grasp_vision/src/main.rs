// This file is an example of how to use the `grasp_vision` library.
// The main library entry point is `src/lib.rs`; the live camera front-end
// lives in the `visual_tester` crate.

use grasp_vision::pipeline::{PipelineConfig, VisionPipeline};
use image::{GrayImage, Luma};

fn main() {
    println!("Grasp Vision Engine - Example Runner");

    // A synthetic mask standing in for a segmented camera frame: one filled
    // rectangle of target-colored foreground.
    let mut mask = GrayImage::new(320, 240);
    for y in 80..160 {
        for x in 100..240 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }

    let pipeline = VisionPipeline::new(PipelineConfig::default());
    let report = pipeline.analyze(&mask);
    println!("Report: {report:?}");
}

// THEORY:
// This file is the main entry point for the `grasp_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API that will be exposed to external consumers (like the
// `visual_tester` binary).
//
// The primary goal is to export the `VisionPipeline` and its associated data
// structures (`PipelineConfig`, `PoseReport`, etc.) as the clean, high-level
// interface for the entire pose-extraction engine. The geometric internals
// (`core_modules`) stay encapsulated behind that surface, providing a clean
// separation of concerns: the library computes pose data from binary masks,
// and consumers decide how to acquire frames and what to do with the result.

pub mod core_modules;
pub mod pipeline;

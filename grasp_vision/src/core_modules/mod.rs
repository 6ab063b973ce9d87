pub mod axis_line;
pub mod blob_selector;
pub mod contour_extractor;
pub mod pose_estimator;

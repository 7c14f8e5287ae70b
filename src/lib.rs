// THEORY:
// This file is the main entry point for the `object_extract` library crate.
//
// The crate turns a tap on a letterboxed picture into a segmentation request and
// summarizes the mask that comes back. The geometry (aspect-fit mapping, mask
// scanning, inverse downsample scaling) lives in `core_modules` as pure functions.
// The `pipeline` module wires that geometry to a pluggable `SegmentationService`
// and is the interface most consumers need.

pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use crate::core_modules::geometry::{NOT_FOUND, Point, Rect, Size};
pub use crate::error::{ExtractError, Result};
pub use crate::pipeline::{MaskReport, ObjectRecognizer, PipelineConfig};

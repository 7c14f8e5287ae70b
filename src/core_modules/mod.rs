pub mod coordinate_mapper;
pub mod downsample;
pub mod geometry;
pub mod instance_mask;
pub mod mask_image;
pub mod mask_scanner;
pub mod segmentation;
pub mod utils;

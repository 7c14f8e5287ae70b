// THEORY:
// Scanning a full-resolution mask pixel by pixel is wasteful when all we want is a
// representative point. The mask is first shrunk so its longest side equals
// `max_dimension`, scanned there, and the hit is scaled back with
// `coordinate_mapper::scale_coordinate`, which computes the same factor.
//
// The `Triangle` filter blends neighbours, so a thin foreground structure survives as
// a faint but non-zero sample instead of vanishing between two nearest-neighbour picks.

use image::imageops::{self, FilterType};

use crate::core_modules::coordinate_mapper::coordinate_mapper::downsample_size;
use crate::core_modules::mask_image::MaskImage;
use crate::error::{ExtractError, Result};

/// Resizes `mask` so its longest side is `max_dimension` pixels.
pub fn downsample_mask(mask: &MaskImage, max_dimension: f64) -> Result<MaskImage> {
    if mask.is_empty() {
        return Err(ExtractError::invalid("cannot downsample an empty mask"));
    }
    let target = downsample_size(mask.size(), max_dimension)?;
    let width = (target.width.round() as u32).max(1);
    let height = (target.height.round() as u32).max(1);

    let resized = imageops::resize(&mask.to_luma(), width, height, FilterType::Triangle);
    Ok(MaskImage::from(resized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_side_becomes_target() {
        let mask = MaskImage::zeroed(300, 150);
        let small = downsample_mask(&mask, 150.0).unwrap();
        assert_eq!((small.width(), small.height()), (150, 75));
    }

    #[test]
    fn thin_side_never_collapses() {
        let mask = MaskImage::zeroed(1000, 1);
        let small = downsample_mask(&mask, 150.0).unwrap();
        assert_eq!((small.width(), small.height()), (150, 1));
    }

    #[test]
    fn solid_mask_stays_solid() {
        let mask = MaskImage::from_samples(40, 20, vec![255; 800]).unwrap();
        let small = downsample_mask(&mask, 10.0).unwrap();
        assert!(small.to_luma().pixels().all(|p| p.0[0] > 0));
    }

    #[test]
    fn rejects_non_positive_target() {
        let mask = MaskImage::zeroed(4, 4);
        assert!(matches!(downsample_mask(&mask, 0.0), Err(ExtractError::InvalidInput(_))));
    }
}

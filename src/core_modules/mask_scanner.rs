// THEORY:
// The `MaskScanner` answers one question about a segmentation result: "does this mask
// contain anything, and where does it start?" It walks the mask in raster order (rows
// top to bottom, columns left to right) and stops at the first non-zero sample.
//
// It is a stateless, read-only utility, like the blob finder it sits next to. The same
// mask always yields the same answer, and the worst case reads exactly
// `width * height` samples.
//
// An empty mask has nothing to scan and is rejected. A mask of all zeros is a normal
// outcome: the tagged form returns `None`, and the sentinel form returns `(-1, -1)`.

pub mod mask_scanner {
    use crate::core_modules::geometry::{NOT_FOUND, Point};
    use crate::core_modules::mask_image::MaskImage;
    use crate::error::{ExtractError, Result};

    /// The first non-zero sample in raster order, or `None` if the mask is all zeros.
    pub fn find_first_non_zero(mask: &MaskImage) -> Result<Option<Point>> {
        if mask.is_empty() {
            return Err(ExtractError::invalid(format!(
                "cannot scan a {}x{} mask",
                mask.width(),
                mask.height()
            )));
        }

        for y in 0..mask.height() {
            if let Some(x) = mask.row(y).position(|sample| sample != 0) {
                return Ok(Some(Point::new(x as f64, y as f64)));
            }
        }
        Ok(None)
    }

    /// Sentinel form of [`find_first_non_zero`]: returns [`NOT_FOUND`] for an all-zero mask.
    pub fn first_non_zero_pixel(mask: &MaskImage) -> Result<Point> {
        Ok(find_first_non_zero(mask)?.unwrap_or(NOT_FOUND))
    }

}

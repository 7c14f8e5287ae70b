// THEORY:
// `MaskImage` is the "dumb" data container for a segmentation result: a 2D grid of
// 8-bit samples where 0 is background and anything else is foreground (or, for an
// instance label map, the id of an instance).
//
// Platform pixel buffers are rarely tightly packed. A row may be padded past its last
// pixel, and a pixel may carry more than one byte. The container therefore records
// `bytes_per_row` and `bytes_per_pixel` and always reads the first byte of a pixel as
// its sample. Construction validates that the buffer is large enough for the declared
// geometry, so every later read is in bounds.

use image::GrayImage;

use crate::core_modules::geometry::Size;
use crate::error::{ExtractError, Result};

/// An 8-bit mask with explicit row and pixel strides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskImage {
    width: u32,
    height: u32,
    bytes_per_row: usize,
    bytes_per_pixel: usize,
    data: Vec<u8>,
}

impl MaskImage {
    /// Creates a mask over a strided buffer.
    pub fn new(
        width: u32,
        height: u32,
        bytes_per_row: usize,
        bytes_per_pixel: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        if bytes_per_pixel == 0 {
            return Err(ExtractError::invalid("bytes per pixel must be at least 1"));
        }
        let overflow =
            || ExtractError::invalid(format!("{width}x{height} mask geometry overflows"));
        let row_content = (width as usize).checked_mul(bytes_per_pixel).ok_or_else(overflow)?;
        if bytes_per_row < row_content {
            return Err(ExtractError::invalid(format!(
                "row stride {bytes_per_row} is shorter than {row_content} bytes of pixels"
            )));
        }
        // Rows are addressed even when they hold no pixels, so the check runs for width 0 too.
        if height > 0 {
            let required = (height as usize - 1)
                .checked_mul(bytes_per_row)
                .and_then(|rows| rows.checked_add(row_content))
                .ok_or_else(overflow)?;
            if data.len() < required {
                return Err(ExtractError::invalid(format!(
                    "buffer holds {} bytes, {width}x{height} mask needs {required}",
                    data.len()
                )));
            }
        }
        Ok(Self {
            width,
            height,
            bytes_per_row,
            bytes_per_pixel,
            data,
        })
    }

    /// Creates a tightly packed single-channel mask.
    pub fn from_samples(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        Self::new(width, height, width as usize, 1, samples)
    }

    /// An all-zero tightly packed mask.
    pub fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bytes_per_row: width as usize,
            bytes_per_pixel: 1,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The sample at `(x, y)`. Panics if the coordinate is outside the mask.
    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> u8 {
        self.data[self.offset(x, y)]
    }

    /// The sample at `(x, y)`, or `None` outside the mask.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.sample(x, y))
    }

    /// Overwrites the sample at `(x, y)`. Panics if the coordinate is outside the mask.
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        let offset = self.offset(x, y);
        self.data[offset] = value;
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        let (width, height) = (self.width, self.height);
        assert!(x < width && y < height, "({x}, {y}) outside {width}x{height} mask");
        y as usize * self.bytes_per_row + x as usize * self.bytes_per_pixel
    }

    /// The samples of row `y`, left to right.
    pub fn row(&self, y: u32) -> impl Iterator<Item = u8> + '_ {
        let start = y as usize * self.bytes_per_row;
        let end = start + self.width as usize * self.bytes_per_pixel;
        self.data[start..end].iter().step_by(self.bytes_per_pixel).copied()
    }

    /// Copies the samples into a tightly packed luma image.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| image::Luma([self.sample(x, y)]))
    }
}

impl From<GrayImage> for MaskImage {
    fn from(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            bytes_per_row: width as usize,
            bytes_per_pixel: 1,
            data: image.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strided_buffer_reads_first_byte_of_pixel() {
        // 2x2 mask, 2 bytes per pixel, 1 padding byte per row.
        let data = vec![
            0, 9, 7, 9, 0, //
            3, 9, 0, 9, 0,
        ];
        let mask = MaskImage::new(2, 2, 5, 2, data).unwrap();
        assert_eq!(mask.sample(0, 0), 0);
        assert_eq!(mask.sample(1, 0), 7);
        assert_eq!(mask.sample(0, 1), 3);
        assert_eq!(mask.row(1).collect::<Vec<_>>(), vec![3, 0]);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = MaskImage::new(4, 4, 4, 1, vec![0; 15]);
        assert!(matches!(err, Err(ExtractError::InvalidInput(_))));
    }

    #[test]
    fn short_stride_is_rejected() {
        let err = MaskImage::new(4, 1, 3, 1, vec![0; 16]);
        assert!(matches!(err, Err(ExtractError::InvalidInput(_))));
    }

    #[test]
    fn overflowing_geometry_is_rejected() {
        let err = MaskImage::new(4, 2, 8, usize::MAX / 2, vec![0; 16]);
        assert!(matches!(err, Err(ExtractError::InvalidInput(_))));
        let err = MaskImage::new(1, u32::MAX, usize::MAX / 2, 1, vec![0; 16]);
        assert!(matches!(err, Err(ExtractError::InvalidInput(_))));
    }

    #[test]
    fn zero_width_still_checks_row_stride_against_buffer() {
        let err = MaskImage::new(0, 3, 10, 1, vec![]);
        assert!(matches!(err, Err(ExtractError::InvalidInput(_))));

        let mask = MaskImage::new(0, 3, 10, 1, vec![0; 20]).unwrap();
        assert_eq!(mask.row(2).count(), 0);
    }

    #[test]
    fn last_row_may_omit_padding() {
        assert!(MaskImage::new(2, 2, 4, 1, vec![0; 6]).is_ok());
    }

    #[test]
    fn luma_conversion_keeps_samples() {
        let mask = MaskImage::new(2, 1, 3, 1, vec![1, 2, 0]).unwrap();
        let luma = mask.to_luma();
        assert_eq!(luma.into_raw(), vec![1, 2]);
        let back = MaskImage::from(GrayImage::from_raw(2, 1, vec![1, 2]).unwrap());
        assert_eq!(back.sample(1, 0), 2);
    }

    #[test]
    fn get_outside_is_none() {
        let mask = MaskImage::zeroed(2, 2);
        assert_eq!(mask.get(2, 0), None);
        assert_eq!(mask.get(1, 1), Some(0));
    }
}

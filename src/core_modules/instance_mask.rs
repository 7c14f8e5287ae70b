// THEORY:
// A foreground-instance segmenter does not hand back a yes/no mask. It hands back a
// label map: every pixel carries the id of the object it belongs to, with 0 for the
// background. `InstanceMask` wraps such a map and answers the two questions a tap
// interaction needs:
//
// 1.  **Which object did the user tap?** The normalized tap is projected onto the
//     map's last valid column/row (`width - 1`, `height - 1`) and the label under it
//     is read. Tapping the background selects every instance.
// 2.  **What does the selection look like?** `mask_for` turns a set of instance ids
//     into a binary mask (255 inside, 0 outside) ready for display or scanning.

use crate::core_modules::coordinate_mapper::coordinate_mapper::image_point_for_normalized_point;
use crate::core_modules::geometry::Point;
use crate::core_modules::mask_image::MaskImage;
use crate::core_modules::segmentation::InstanceSelector;
use crate::error::{ExtractError, Result};

/// Sample value written for selected pixels in a generated mask.
pub const MASK_ON: u8 = 255;

/// A label map whose non-zero samples are instance ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceMask {
    labels: MaskImage,
}

impl InstanceMask {
    pub fn new(labels: MaskImage) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &MaskImage {
        &self.labels
    }

    /// Every instance id present in the map, ascending.
    pub fn all_instances(&self) -> Vec<u8> {
        let mut seen = [false; 256];
        for y in 0..self.labels.height() {
            for label in self.labels.row(y) {
                seen[label as usize] = true;
            }
        }
        (1..=u8::MAX).filter(|label| seen[*label as usize]).collect()
    }

    /// The label under a normalized point.
    pub fn label_at(&self, normalized: Point) -> Result<u8> {
        if self.labels.is_empty() {
            return Err(ExtractError::invalid("label map is empty"));
        }
        if !normalized.is_normalized() {
            return Err(ExtractError::invalid(format!(
                "({}, {}) is not a normalized point",
                normalized.x, normalized.y
            )));
        }
        let max_x = (self.labels.width() - 1) as f64;
        let max_y = (self.labels.height() - 1) as f64;
        let pixel = image_point_for_normalized_point(normalized, max_x, max_y);
        Ok(self.labels.sample(pixel.x as u32, pixel.y as u32))
    }

    /// Turns a selector into the concrete set of instance ids it refers to.
    pub fn resolve(&self, selector: &InstanceSelector) -> Result<Vec<u8>> {
        match selector {
            InstanceSelector::All => Ok(self.all_instances()),
            InstanceSelector::At(point) => match self.label_at(*point)? {
                0 => Ok(self.all_instances()),
                label => Ok(vec![label]),
            },
        }
    }

    /// A binary mask: [`MASK_ON`] where the label is in `instances`, 0 elsewhere.
    pub fn mask_for(&self, instances: &[u8]) -> MaskImage {
        let mut selected = [false; 256];
        for &label in instances {
            selected[label as usize] = true;
        }
        // Background is never part of a selection.
        selected[0] = false;

        let (width, height) = (self.labels.width(), self.labels.height());
        let mut mask = MaskImage::zeroed(width, height);
        for y in 0..height {
            for (x, label) in self.labels.row(y).enumerate() {
                if selected[label as usize] {
                    mask.set(x as u32, y, MASK_ON);
                }
            }
        }
        mask
    }
}

// THEORY:
// The `pipeline` module is the top-level API of the crate. It strings the pieces of a
// tap-to-mask interaction together behind one struct, `ObjectRecognizer`:
//
// Stage 1: Tap mapping. A tap in the display view becomes a normalized selector, or
//          nothing at all if it landed in the letterbox margin.
// Stage 2: Segmentation. The selector and picture go to the `SegmentationService`.
//          A failure stops here; the core never runs on a missing mask.
// Stage 3: Location. The mask is downsampled, scanned for its first non-zero pixel,
//          and that pixel is scaled back into original mask coordinates.
//
// Only stage 2 is async. Stages 1 and 3 are the pure geometry from `core_modules`.

use image::{DynamicImage, GenericImageView};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core_modules::coordinate_mapper::coordinate_mapper::{self, TapLocation};
use crate::core_modules::downsample::downsample_mask;
use crate::core_modules::geometry::{Point, Size};
use crate::core_modules::mask_scanner::mask_scanner;
use crate::error::{ExtractError, Result};

// Re-export key data structures for the public API.
pub use crate::core_modules::mask_image::MaskImage;
pub use crate::core_modules::segmentation::{
    FailureReason, InstanceSelector, Outcome, SegmentationService,
};

const DEFAULT_MAX_DIMENSION: f64 = 150.0;
/// Largest rendition side the pipeline will allocate.
const MAX_DIMENSION_LIMIT: f64 = 16384.0;

/// Configuration for the ObjectRecognizer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Longest side, in pixels, of the rendition a mask is scanned in.
    pub max_dimension: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that `max_dimension` is a usable rendition size.
    pub fn validate(&self) -> Result<()> {
        let max_dimension = self.max_dimension;
        if !(max_dimension > 0.0 && max_dimension <= MAX_DIMENSION_LIMIT) {
            return Err(ExtractError::invalid(format!(
                "max_dimension must be in (0, {MAX_DIMENSION_LIMIT}], got {max_dimension}"
            )));
        }
        Ok(())
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

/// A generated mask together with where its content starts.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskReport {
    pub mask: MaskImage,
    /// Size of the rendition the scan ran on.
    pub downsampled_size: Size,
    /// First non-zero pixel in the downsampled rendition.
    pub first_pixel_downsampled: Option<Point>,
    /// The same pixel in original mask coordinates.
    pub first_pixel_original: Option<Point>,
}

/// Drives a segmentation service and summarizes the masks it returns.
pub struct ObjectRecognizer<S: SegmentationService> {
    service: S,
    config: PipelineConfig,
}

impl<S: SegmentationService> ObjectRecognizer<S> {
    pub fn new(service: S, config: PipelineConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Maps a view tap to an instance selector. `None` means the tap missed the picture.
    pub fn tap_selector(
        &self,
        tap: Point,
        image_size: Size,
        view_size: Size,
    ) -> Result<Option<InstanceSelector>> {
        debug!(?image_size, ?view_size, "mapping tap");
        let display_rect = coordinate_mapper::aspect_fit_rect(image_size, view_size)?;
        debug!(?display_rect, ?tap, "image position in view");

        match coordinate_mapper::normalized_tap_location(tap, image_size, view_size)? {
            TapLocation::OnImage(normalized) => {
                debug!(?normalized, "normalized tap position");
                Ok(Some(InstanceSelector::At(normalized)))
            }
            TapLocation::NotOnImage => {
                debug!("tap outside image");
                Ok(None)
            }
        }
    }

    /// Segments the instances picked by `selector` and locates the resulting mask.
    pub async fn recognize_objects(
        &self,
        image: &DynamicImage,
        selector: InstanceSelector,
    ) -> Result<MaskReport> {
        let outcome = self.service.segment_instances(image, selector).await;
        self.finish(outcome)
    }

    /// Handles a tap: no report when the tap misses the picture.
    pub async fn recognize_at_tap(
        &self,
        image: &DynamicImage,
        tap: Point,
        view_size: Size,
    ) -> Result<Option<MaskReport>> {
        let (width, height) = image.dimensions();
        let image_size = Size::new(width as f64, height as f64);
        match self.tap_selector(tap, image_size, view_size)? {
            Some(selector) => Ok(Some(self.recognize_objects(image, selector).await?)),
            None => Ok(None),
        }
    }

    /// Segments the people in `image` and locates the resulting mask.
    pub async fn recognize_people(&self, image: &DynamicImage) -> Result<MaskReport> {
        let outcome = self.service.segment_people(image).await;
        self.finish(outcome)
    }

    fn finish(&self, outcome: Outcome) -> Result<MaskReport> {
        match outcome {
            Outcome::Found(mask) => self.locate(mask),
            Outcome::Failed(reason) => {
                warn!(%reason, "segmentation failed");
                Err(ExtractError::Segmentation(reason))
            }
        }
    }

    /// Downsamples `mask`, finds its first non-zero pixel and maps it back.
    pub fn locate(&self, mask: MaskImage) -> Result<MaskReport> {
        self.config.validate()?;
        let max_dimension = self.config.max_dimension;
        let downsampled = downsample_mask(&mask, max_dimension)?;
        let first_pixel_downsampled = mask_scanner::find_first_non_zero(&downsampled)?;

        let original_size = mask.size();
        let first_pixel_original = first_pixel_downsampled
            .map(|point| {
                let size = original_size;
                coordinate_mapper::scale_coordinate(point, size, size, max_dimension)
            })
            .transpose()?;

        match (first_pixel_downsampled, first_pixel_original) {
            (Some(downsampled_point), Some(original_point)) => {
                info!(?downsampled_point, ?original_point, "located mask")
            }
            _ => info!("mask is empty"),
        }

        Ok(MaskReport {
            mask,
            downsampled_size: downsampled.size(),
            first_pixel_downsampled,
            first_pixel_original,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_150() {
        assert_eq!(PipelineConfig::default().max_dimension, 150.0);
    }

    #[test]
    fn config_parses_from_toml() {
        let config = PipelineConfig::from_toml_str("max_dimension = 64.0").unwrap();
        assert_eq!(config.max_dimension, 64.0);
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn config_rejects_non_positive_dimension() {
        let err = PipelineConfig::from_toml_str("max_dimension = 0.0");
        assert!(matches!(err, Err(ExtractError::InvalidInput(_))));
        let err = PipelineConfig::from_toml_str("max_dimension = \"big\"");
        assert!(matches!(err, Err(ExtractError::Config(_))));
    }

    #[test]
    fn config_rejects_unbounded_dimension() {
        for source in ["max_dimension = inf", "max_dimension = nan", "max_dimension = 1e12"] {
            let err = PipelineConfig::from_toml_str(source);
            assert!(matches!(err, Err(ExtractError::InvalidInput(_))), "{source}");
        }
    }

    #[test]
    fn locate_refuses_infinite_dimension_without_allocating() {
        struct NoService;

        #[async_trait::async_trait]
        impl SegmentationService for NoService {
            async fn segment_instances(
                &self,
                _image: &DynamicImage,
                _selector: InstanceSelector,
            ) -> Outcome {
                Outcome::Failed(FailureReason::Unsupported)
            }
        }

        let config = PipelineConfig {
            max_dimension: f64::INFINITY,
        };
        let recognizer = ObjectRecognizer::new(NoService, config);
        let err = recognizer.locate(MaskImage::zeroed(4, 2));
        assert!(matches!(err, Err(ExtractError::InvalidInput(_))));
    }
}

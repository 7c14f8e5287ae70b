// THEORY:
// Mask generation itself (foreground instances, people) belongs to a closed ML service.
// This module is the narrow boundary around it. The rest of the crate never sees the
// service, only the `Outcome` it delivers.
//
// Key principles:
// 1.  **Capability trait**: `SegmentationService` is the only way into the service.
//     Anything that can turn a picture and a selector into a mask can stand behind it:
//     a platform binding, a model runner, or the file-backed `LabelMapService`.
// 2.  **Asynchrony stays at the edge**: the service call is async because the real
//     work is long-running. Once a mask is materialized, the core runs synchronously.
// 3.  **Outcome as a sum type**: success with a mask or failure with a reason. Callers
//     branch on it; there is no observer to register.

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use thiserror::Error;

use crate::core_modules::geometry::Point;
use crate::core_modules::instance_mask::InstanceMask;
use crate::core_modules::mask_image::MaskImage;

/// Which detected objects the caller wants isolated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstanceSelector {
    /// Every detected instance.
    All,
    /// The instance under a normalized point, or every instance if the point is background.
    At(Point),
}

/// Why the service could not produce a mask.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("no instances detected")]
    NoInstances,
    #[error("picture is {image_width}x{image_height}, label map is {mask_width}x{mask_height}")]
    SizeMismatch {
        image_width: u32,
        image_height: u32,
        mask_width: u32,
        mask_height: u32,
    },
    #[error("request not supported by this service")]
    Unsupported,
    #[error("{0}")]
    Service(String),
}

/// The result a segmentation service delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Found(MaskImage),
    Failed(FailureReason),
}

#[async_trait]
pub trait SegmentationService: Send + Sync {
    /// Produces a mask of the foreground instances picked by `selector`.
    async fn segment_instances(&self, image: &DynamicImage, selector: InstanceSelector) -> Outcome;

    /// Produces a mask of the people in `image`.
    async fn segment_people(&self, _image: &DynamicImage) -> Outcome {
        Outcome::Failed(FailureReason::Unsupported)
    }
}

/// Serves masks from a precomputed instance label map, and optionally a person label map.
#[derive(Debug, Clone)]
pub struct LabelMapService {
    labels: InstanceMask,
    people: Option<InstanceMask>,
}

impl LabelMapService {
    pub fn new(labels: InstanceMask) -> Self {
        Self { labels, people: None }
    }

    /// Serves `people` from `segment_people`; every non-zero label counts as a person.
    pub fn with_people(mut self, people: InstanceMask) -> Self {
        self.people = Some(people);
        self
    }

    pub fn labels(&self) -> &InstanceMask {
        &self.labels
    }

    fn check_size(image: &DynamicImage, labels: &InstanceMask) -> Result<(), FailureReason> {
        let (image_width, image_height) = image.dimensions();
        let map = labels.labels();
        if (image_width, image_height) != (map.width(), map.height()) {
            return Err(FailureReason::SizeMismatch {
                image_width,
                image_height,
                mask_width: map.width(),
                mask_height: map.height(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SegmentationService for LabelMapService {
    async fn segment_instances(&self, image: &DynamicImage, selector: InstanceSelector) -> Outcome {
        serve(image, &self.labels, selector)
    }

    async fn segment_people(&self, image: &DynamicImage) -> Outcome {
        match &self.people {
            Some(people) => serve(image, people, InstanceSelector::All),
            None => Outcome::Failed(FailureReason::Unsupported),
        }
    }
}

fn serve(image: &DynamicImage, labels: &InstanceMask, selector: InstanceSelector) -> Outcome {
    if let Err(reason) = LabelMapService::check_size(image, labels) {
        return Outcome::Failed(reason);
    }
    let instances = match labels.resolve(&selector) {
        Ok(instances) => instances,
        Err(err) => return Outcome::Failed(FailureReason::Service(err.to_string())),
    };
    if instances.is_empty() {
        return Outcome::Failed(FailureReason::NoInstances);
    }
    Outcome::Found(labels.mask_for(&instances))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> LabelMapService {
        #[rustfmt::skip]
        let labels = vec![
            0, 1, 1, 0,
            0, 0, 2, 2,
        ];
        LabelMapService::new(InstanceMask::new(MaskImage::from_samples(4, 2, labels).unwrap()))
    }

    #[tokio::test]
    async fn all_selector_masks_every_instance() {
        let picture = DynamicImage::new_luma8(4, 2);
        let outcome = service().segment_instances(&picture, InstanceSelector::All).await;
        let Outcome::Found(mask) = outcome else {
            panic!("expected a mask");
        };
        assert_eq!(mask.row(0).collect::<Vec<_>>(), vec![0, 255, 255, 0]);
        assert_eq!(mask.row(1).collect::<Vec<_>>(), vec![0, 0, 255, 255]);
    }

    #[tokio::test]
    async fn mismatched_picture_fails() {
        let picture = DynamicImage::new_luma8(8, 2);
        let outcome = service().segment_instances(&picture, InstanceSelector::All).await;
        assert!(matches!(outcome, Outcome::Failed(FailureReason::SizeMismatch { .. })));
    }

    #[tokio::test]
    async fn empty_label_map_fails() {
        let service = LabelMapService::new(InstanceMask::new(MaskImage::zeroed(2, 2)));
        let picture = DynamicImage::new_luma8(2, 2);
        let outcome = service.segment_instances(&picture, InstanceSelector::All).await;
        assert_eq!(outcome, Outcome::Failed(FailureReason::NoInstances));
    }

    #[tokio::test]
    async fn people_are_unsupported_without_a_person_map() {
        let picture = DynamicImage::new_luma8(4, 2);
        let outcome = service().segment_people(&picture).await;
        assert_eq!(outcome, Outcome::Failed(FailureReason::Unsupported));
    }

    #[tokio::test]
    async fn person_map_is_served_for_people() {
        #[rustfmt::skip]
        let people = vec![
            0, 0, 0, 3,
            0, 5, 0, 0,
        ];
        let people = InstanceMask::new(MaskImage::from_samples(4, 2, people).unwrap());
        let service = service().with_people(people);
        let picture = DynamicImage::new_luma8(4, 2);

        let Outcome::Found(mask) = service.segment_people(&picture).await else {
            panic!("expected a person mask");
        };
        assert_eq!(mask.row(0).collect::<Vec<_>>(), vec![0, 0, 0, 255]);
        assert_eq!(mask.row(1).collect::<Vec<_>>(), vec![0, 255, 0, 0]);
    }

    #[tokio::test]
    async fn person_map_must_match_picture() {
        let people = InstanceMask::new(MaskImage::from_samples(2, 1, vec![1, 1]).unwrap());
        let service = service().with_people(people);
        let picture = DynamicImage::new_luma8(4, 2);
        let outcome = service.segment_people(&picture).await;
        assert!(matches!(outcome, Outcome::Failed(FailureReason::SizeMismatch { .. })));
    }
}

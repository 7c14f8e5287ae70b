// THEORY:
// The `CoordinateMapper` is the geometric bridge between the three coordinate spaces a
// tap-to-mask interaction passes through:
//
// 1.  **Display space**: the raw tap position inside a view that shows the picture in
//     "aspect fit" mode. The picture is uniformly scaled and centered, so part of the
//     view may be letterbox margin.
// 2.  **Normalized space**: the same position expressed as a fraction (0..1) of the
//     picture's own width and height. This is what the segmentation service accepts as
//     an instance selector, independent of the picture's resolution.
// 3.  **Pixel space**: integer-ish positions in a full-resolution image or mask. A mask
//     is scanned in a downsampled copy (longest side = `max_dimension`), so a coordinate
//     found there must be scaled back before it means anything in the original.
//
// The scale rule for aspect fit picks its axis by comparing the image's own width and
// height, not by taking min(scaleX, scaleY). For a view whose aspect ratio diverges
// sharply from the image's, the resulting rectangle overflows the view. The rule is
// kept exactly as the display layer observes it so taps map to the same pixels.
//
// Everything here is a stateless pure function. Degenerate inputs are rejected before
// any division happens.

pub mod coordinate_mapper {
    use crate::core_modules::geometry::{Point, Rect, Size};
    use crate::error::{ExtractError, Result};

    /// Where a tap landed relative to the displayed picture.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum TapLocation {
        /// The tap hit the picture; the point is normalized to the picture's size.
        OnImage(Point),
        /// The tap hit the letterbox margin. Not an error.
        NotOnImage,
    }

    impl TapLocation {
        pub fn point(&self) -> Option<Point> {
            match self {
                TapLocation::OnImage(point) => Some(*point),
                TapLocation::NotOnImage => None,
            }
        }
    }

    fn ensure_image_size(image_size: Size) -> Result<()> {
        if image_size.is_degenerate() {
            return Err(ExtractError::invalid(format!(
                "image size {}x{} has no area",
                image_size.width, image_size.height
            )));
        }
        Ok(())
    }

    fn ensure_long_side_target(size: Size, long_side_target: f64) -> Result<f64> {
        if !(long_side_target > 0.0 && long_side_target.is_finite()) {
            return Err(ExtractError::invalid(format!(
                "long side target must be positive and finite, got {long_side_target}"
            )));
        }
        let long_side = size.long_side();
        if !(long_side > 0.0 && long_side.is_finite()) {
            return Err(ExtractError::invalid(format!(
                "size {}x{} has no long side",
                size.width, size.height
            )));
        }
        Ok(long_side_target / long_side)
    }

    /// The uniform factor that maps image pixels onto the view.
    pub fn aspect_fit_scale(image_size: Size, view_size: Size) -> Result<f64> {
        ensure_image_size(image_size)?;
        let scale = if image_size.width > image_size.height {
            view_size.width / image_size.width
        } else {
            view_size.height / image_size.height
        };
        Ok(scale)
    }

    /// The sub-rectangle of the view the picture occupies, centered in the view.
    pub fn aspect_fit_rect(image_size: Size, view_size: Size) -> Result<Rect> {
        let scale = aspect_fit_scale(image_size, view_size)?;
        Ok(fit_rect_for_scale(image_size, view_size, scale))
    }

    fn fit_rect_for_scale(image_size: Size, view_size: Size, scale: f64) -> Rect {
        let width = image_size.width * scale;
        let height = image_size.height * scale;
        Rect::new(
            (view_size.width - width) / 2.0,
            (view_size.height - height) / 2.0,
            width,
            height,
        )
    }

    /// Converts a tap in view coordinates into a normalized position on the picture.
    pub fn normalized_tap_location(
        tap: Point,
        image_size: Size,
        view_size: Size,
    ) -> Result<TapLocation> {
        let scale = aspect_fit_scale(image_size, view_size)?;
        if !(scale > 0.0) {
            return Err(ExtractError::invalid(format!(
                "view size {}x{} cannot display an image",
                view_size.width, view_size.height
            )));
        }

        let display_rect = fit_rect_for_scale(image_size, view_size, scale);
        if !display_rect.contains(tap) {
            return Ok(TapLocation::NotOnImage);
        }

        let px = (tap.x - display_rect.min_x()) / scale;
        let py = (tap.y - display_rect.min_y()) / scale;

        // Edge taps can land a rounding error past 1.0.
        let nx = (px / image_size.width).clamp(0.0, 1.0);
        let ny = (py / image_size.height).clamp(0.0, 1.0);
        Ok(TapLocation::OnImage(Point::new(nx, ny)))
    }

    /// Maps a pixel found in a downsampled rendition back into original-size pixels.
    ///
    /// `from_size` is the original size the downsample was computed from. `to_size`
    /// names the destination space; the inverse scale depends only on `from_size`.
    pub fn scale_coordinate(
        point: Point,
        from_size: Size,
        _to_size: Size,
        long_side_target: f64,
    ) -> Result<Point> {
        let scale = ensure_long_side_target(from_size, long_side_target)?;
        Ok(Point::new((point.x / scale).floor(), (point.y / scale).floor()))
    }

    /// The size of a rendition whose longest side is `max_dimension`.
    pub fn downsample_size(size: Size, max_dimension: f64) -> Result<Size> {
        let scale = ensure_long_side_target(size, max_dimension)?;
        if size.width > size.height {
            Ok(Size::new(max_dimension, size.height * scale))
        } else {
            Ok(Size::new(size.width * scale, max_dimension))
        }
    }

    /// Projects a normalized point into a `width` x `height` pixel grid.
    ///
    /// Callers reading a buffer pass `width - 1` and `height - 1` so that 1.0 lands on
    /// the last valid column and row.
    pub fn image_point_for_normalized_point(point: Point, width: f64, height: f64) -> Point {
        Point::new(point.x * width, point.y * height)
    }

}

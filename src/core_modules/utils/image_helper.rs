pub mod image_helper {
    use std::path::Path;

    use image::ImageEncoder;

    use crate::core_modules::mask_image::MaskImage;
    use crate::error::Result;

    /// Writes a mask to `path` as an 8-bit grayscale PNG.
    pub fn save_mask(path: impl AsRef<Path>, mask: &MaskImage) -> Result<()> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        let luma = mask.to_luma();

        let (width, height) = luma.dimensions();
        encoder.write_image(luma.as_raw(), width, height, image::ExtendedColorType::L8)?;

        Ok(())
    }

    /// Reads any supported image file as a mask, keeping the first luma channel.
    pub fn load_mask(path: impl AsRef<Path>) -> Result<MaskImage> {
        let image = image::open(path)?;
        Ok(MaskImage::from(image.into_luma8()))
    }
}

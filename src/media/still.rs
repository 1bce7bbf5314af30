use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use log::{debug, info};

use crate::error::ImportError;

/// Decode an uploaded image and bring it within `min..=max` pixels per side.
///
/// Images below `min` on either side are refused. Images above `max` are
/// downscaled, preserving the aspect ratio, before they ever reach the canvas.
pub fn decode_still(bytes: &[u8], min: u32, max: u32) -> Result<RgbaImage, ImportError> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = (decoded.width(), decoded.height());
    debug!("Decoded image: {}x{}", width, height);

    if width < min || height < min {
        return Err(ImportError::TooSmall { width, height, min });
    }
    Ok(bound_size(decoded, max).into_rgba8())
}

/// Downscale into a `max`x`max` box if needed. Never upscales.
pub fn bound_size(image: DynamicImage, max: u32) -> DynamicImage {
    if image.width() <= max && image.height() <= max {
        return image;
    }
    let resized = image.resize(max, max, FilterType::Triangle);
    info!(
        "🖼️ Downscaled {}x{} to {}x{}",
        image.width(),
        image.height(),
        resized.width(),
        resized.height()
    );
    resized
}

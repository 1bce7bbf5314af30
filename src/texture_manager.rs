use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use thiserror::Error;

/// Errors that can occur during texture upload
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Invalid texture dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),
}

/// Convert a decoded frame into something egui can upload
pub fn color_image(frame: &RgbaImage) -> Result<ColorImage, TextureGenerationError> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureGenerationError::InvalidDimensions(width, height));
    }
    Ok(ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        frame.as_raw(),
    ))
}

/// One GPU texture per media object, replaced when the object's frame changes.
///
/// Video frames reuse the same handle via `TextureHandle::set`, so playback
/// does not allocate a texture per frame.
#[derive(Default)]
pub struct TextureManager {
    /// element id -> (frame version, texture)
    textures: HashMap<usize, (u64, TextureHandle)>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for `element_id` showing frame `version`, uploading `frame`
    /// only when the cached version is stale.
    pub fn texture_for(
        &mut self,
        ctx: &Context,
        element_id: usize,
        version: u64,
        frame: &RgbaImage,
    ) -> Result<TextureId, TextureGenerationError> {
        if let Some((cached, handle)) = self.textures.get_mut(&element_id) {
            if *cached != version {
                handle.set(color_image(frame)?, TextureOptions::LINEAR);
                *cached = version;
            }
            return Ok(handle.id());
        }

        let name = format!("media_{element_id}");
        let handle = ctx.load_texture(name, color_image(frame)?, TextureOptions::LINEAR);
        let id = handle.id();
        self.textures.insert(element_id, (version, handle));
        Ok(id)
    }

    /// Drop textures whose objects are gone from the canvas
    pub fn retain(&mut self, mut alive: impl FnMut(usize) -> bool) {
        let before = self.textures.len();
        self.textures.retain(|id, _| alive(*id));
        let dropped = before - self.textures.len();
        if dropped > 0 {
            log::debug!("Released {dropped} texture(s)");
        }
    }

    pub fn cache_size(&self) -> usize {
        self.textures.len()
    }
}

//! Turning uploaded files into scene objects.

#[cfg(target_arch = "wasm32")]
pub mod browser_video;
#[cfg(not(target_arch = "wasm32"))]
pub mod h264;
pub mod still;
pub mod video;

use std::path::Path;
use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use log::info;

use crate::element::{Element, MediaObject, MIN_ELEMENT_SIZE, SceneObject};
use crate::error::ImportError;
use crate::settings::Settings;
use video::{LoadState, VideoDecoder, VideoHandle, platform_decoder};

pub const IMAGE_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
pub const VIDEO_MIME_TYPES: [&str; 3] = ["video/mp4", "video/webm", "video/quicktime"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Which import path a MIME type takes, if it is allowed at all
pub fn classify(mime: &str) -> Option<MediaKind> {
    let mime = mime.trim().to_ascii_lowercase();
    if IMAGE_MIME_TYPES.contains(&mime.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_MIME_TYPES.contains(&mime.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// MIME type implied by a file name, for drops that carry no MIME type
pub fn mime_from_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "mp4" | "m4v" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        "mov" | "qt" => Some("video/quicktime"),
        _ => None,
    }
}

/// A file handed to the importer, by upload or by drag-and-drop
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl IncomingFile {
    /// Fills in the MIME type from the name when it is missing.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let mut mime = mime.into();
        if mime.is_empty() {
            mime = mime_from_name(&name).unwrap_or_default().to_owned();
        }
        Self {
            name,
            mime,
            bytes: bytes.into(),
        }
    }
}

/// Largest rect with the aspect ratio of `natural` that fits in `fraction` of
/// `canvas` on both axes, centered on the canvas. Never larger than `natural`.
///
/// Very thin media would fit below [`MIN_ELEMENT_SIZE`] on its short side;
/// such rects are scaled up to the minimum instead and may overflow the bound.
pub fn fit_rect(natural: Vec2, canvas: Vec2, fraction: f32) -> Rect {
    let bound = canvas * fraction;
    let fitted = (bound.x / natural.x).min(bound.y / natural.y).min(1.0);
    let floor = MIN_ELEMENT_SIZE / natural.min_elem();
    let size = natural * fitted.max(floor);
    Rect::from_center_size(Pos2::new(canvas.x / 2.0, canvas.y / 2.0), size)
}

/// A video whose source is still opening
#[derive(Debug)]
pub struct PendingVideo {
    name: String,
    mime: String,
    handle: VideoHandle,
}

impl PendingVideo {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// What an import produced
#[derive(Debug)]
pub enum Imported {
    Ready(SceneObject),
    /// Hand it back to [`MediaImporter::resume`] on later frames
    Loading(PendingVideo),
}

pub struct MediaImporter {
    min_dimension: u32,
    max_dimension: u32,
    fit_fraction: f32,
    fade_in_secs: f32,
    decoder: Box<dyn VideoDecoder>,
}

impl std::fmt::Debug for MediaImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaImporter")
            .field("min_dimension", &self.min_dimension)
            .field("max_dimension", &self.max_dimension)
            .field("fit_fraction", &self.fit_fraction)
            .field("fade_in_secs", &self.fade_in_secs)
            .finish_non_exhaustive()
    }
}

impl MediaImporter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            min_dimension: settings.min_dimension,
            max_dimension: settings.max_dimension,
            fit_fraction: settings.fit_fraction,
            fade_in_secs: settings.fade_in_secs,
            decoder: platform_decoder(settings.max_dimension),
        }
    }

    /// Use another decoder for the video path
    pub fn with_decoder(mut self, decoder: Box<dyn VideoDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Build a scene object for `file`, fitted and centered on a canvas of
    /// `canvas_size`. The object starts transparent and fades in.
    ///
    /// Videos whose decoder opens asynchronously come back as
    /// [`Imported::Loading`].
    pub fn import(&self, file: &IncomingFile, canvas_size: Vec2) -> Result<Imported, ImportError> {
        check_canvas(canvas_size)?;
        let kind = classify(&file.mime).ok_or_else(|| ImportError::UnsupportedType(file.mime.clone()))?;

        match kind {
            MediaKind::Image => {
                let frame = still::decode_still(&file.bytes, self.min_dimension, self.max_dimension)?;
                let rect = self.placement(&frame, canvas_size);
                Ok(Imported::Ready(self.finish(&file.name, kind, MediaObject::still(frame, rect))))
            }
            MediaKind::Video => {
                let handle = VideoHandle::new(self.decoder.open(Arc::clone(&file.bytes), &file.mime)?);
                let pending = PendingVideo {
                    name: file.name.clone(),
                    mime: file.mime.clone(),
                    handle,
                };
                self.resume(pending, canvas_size)
            }
        }
    }

    /// Place a loading video once its first frame is available.
    pub fn resume(&self, mut pending: PendingVideo, canvas_size: Vec2) -> Result<Imported, ImportError> {
        check_canvas(canvas_size)?;
        match pending.handle.load_state() {
            LoadState::Loading => Ok(Imported::Loading(pending)),
            LoadState::Failed(reason) => Err(ImportError::Video {
                mime: pending.mime,
                reason,
            }),
            LoadState::Ready => {
                let first = pending.handle.first_frame().cloned().ok_or_else(|| ImportError::Video {
                    mime: pending.mime.clone(),
                    reason: "stream has no frames".to_owned(),
                })?;
                let first = still::bound_size(first.into(), self.max_dimension).into_rgba8();
                let rect = self.placement(&first, canvas_size);
                let media = MediaObject::video(pending.handle, first, rect);
                Ok(Imported::Ready(self.finish(&pending.name, MediaKind::Video, media)))
            }
        }
    }

    fn finish(&self, name: &str, kind: MediaKind, media: MediaObject) -> SceneObject {
        let rect = media.rect();
        info!(
            "Imported {} as {:?}: {:.0}x{:.0} at ({:.0}, {:.0})",
            name,
            kind,
            rect.width(),
            rect.height(),
            rect.min.x,
            rect.min.y
        );
        SceneObject::image(media.with_fade_in(self.fade_in_secs))
    }

    fn placement(&self, frame: &image::RgbaImage, canvas_size: Vec2) -> Rect {
        let natural = Vec2::new(frame.width() as f32, frame.height() as f32);
        fit_rect(natural, canvas_size, self.fit_fraction)
    }
}

fn check_canvas(size: Vec2) -> Result<(), ImportError> {
    if size.x <= 0.0 || size.y <= 0.0 {
        Err(ImportError::NoCanvasArea)
    } else {
        Ok(())
    }
}

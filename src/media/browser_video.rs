//! Videos decoded by the browser.
//!
//! The upload becomes a blob URL on a hidden `<video>` element. Frames are
//! sampled by drawing the element into an off-screen 2D canvas and reading
//! the pixels back. The element loads asynchronously, so the source reports
//! [`LoadState::Loading`] until it has a frame.

use std::sync::Arc;

use eframe::wasm_bindgen::{JsCast as _, JsValue};
use image::RgbaImage;
use log::{debug, warn};
use web_sys::{Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlCanvasElement, HtmlMediaElement, HtmlVideoElement, Url};

use super::video::{FrameSource, LoadState, VideoDecoder};
use crate::error::ImportError;

#[derive(Debug, Clone, Copy)]
pub struct BrowserVideoDecoder {
    max_dimension: u32,
}

impl BrowserVideoDecoder {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl VideoDecoder for BrowserVideoDecoder {
    fn open(&self, bytes: Arc<[u8]>, mime: &str) -> Result<Box<dyn FrameSource>, ImportError> {
        let video = BrowserVideo::load(&bytes, mime, self.max_dimension).map_err(|err| ImportError::Video {
            mime: mime.to_owned(),
            reason: describe(&err),
        })?;
        Ok(Box::new(video))
    }
}

pub struct BrowserVideo {
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    url: Option<String>,
    max_dimension: u32,
    first: Option<RgbaImage>,
    current: Option<(usize, RgbaImage)>,
}

impl BrowserVideo {
    fn load(bytes: &[u8], mime: &str, max_dimension: u32) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;

        let video: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
        video.set_muted(true);
        video.set_loop(true);
        video.set_preload("auto");
        video.set_attribute("playsinline", "")?;
        video.set_src(&url);
        video.load();

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        debug!("Loading {mime} video from {url}");
        Ok(Self {
            video,
            canvas,
            context,
            url: Some(url),
            max_dimension,
            first: None,
            current: None,
        })
    }

    /// Draw the element's current frame into the canvas and read it back,
    /// bounded to `max_dimension` per side.
    fn sample(&self) -> Result<Option<RgbaImage>, JsValue> {
        let (width, height) = (self.video.video_width(), self.video.video_height());
        if width == 0 || height == 0 {
            return Ok(None);
        }
        let scale = (self.max_dimension as f64 / width.max(height) as f64).min(1.0);
        let width = ((width as f64 * scale).round() as u32).max(1);
        let height = ((height as f64 * scale).round() as u32).max(1);

        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.context.draw_image_with_html_video_element_and_dw_and_dh(
            &self.video,
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        )?;
        let pixels = self
            .context
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))?
            .data();
        Ok(RgbaImage::from_raw(width, height, pixels.0))
    }

    /// Changes whenever the element moves to another frame
    fn position_index(&self) -> usize {
        (self.video.current_time() * 1000.0) as usize
    }
}

impl FrameSource for BrowserVideo {
    fn load_state(&mut self) -> LoadState {
        if self.first.is_some() {
            return LoadState::Ready;
        }
        if let Some(error) = self.video.error() {
            return LoadState::Failed(format!("media error {}: {}", error.code(), error.message()));
        }
        if self.video.ready_state() < HtmlMediaElement::HAVE_CURRENT_DATA {
            return LoadState::Loading;
        }
        match self.sample() {
            Ok(Some(frame)) => {
                self.current = Some((self.position_index(), frame.clone()));
                self.first = Some(frame);
                LoadState::Ready
            }
            Ok(None) => LoadState::Loading,
            Err(err) => LoadState::Failed(describe(&err)),
        }
    }

    fn first_frame(&self) -> Option<&RgbaImage> {
        self.first.as_ref()
    }

    fn frame_at(&mut self, _secs: f64) -> Option<(usize, &RgbaImage)> {
        self.url.as_ref()?;
        // The element keeps its own clock; `secs` only matters to in-memory clips
        let index = self.position_index();
        if self.current.as_ref().is_none_or(|(shown, _)| *shown != index) {
            match self.sample() {
                Ok(Some(frame)) => self.current = Some((index, frame)),
                Ok(None) => {}
                Err(err) => warn!("Sampling video frame failed: {}", describe(&err)),
            }
        }
        self.current.as_ref().map(|(index, frame)| (*index, frame))
    }

    fn set_playing(&mut self, playing: bool) {
        if playing {
            if let Err(err) = self.video.play() {
                warn!("Video refused to play: {}", describe(&err));
            }
        } else if let Err(err) = self.video.pause() {
            warn!("Video refused to pause: {}", describe(&err));
        }
    }

    fn dispose(&mut self) {
        let Some(url) = self.url.take() else {
            return;
        };
        let _ = self.video.pause();
        self.video.remove_attribute("src").ok();
        self.video.load();
        if let Err(err) = Url::revoke_object_url(&url) {
            warn!("Could not revoke {url}: {}", describe(&err));
        }
        self.first = None;
        self.current = None;
    }

    fn is_disposed(&self) -> bool {
        self.url.is_none()
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

//! Video stand-ins.
//!
//! A video on the canvas is a still image whose pixels are replaced by the
//! frame source's current frame on every tick while the object is "playing".

use std::io::Cursor;
use std::sync::Arc;

use image::{AnimationDecoder, ImageFormat, RgbaImage};

use super::still::bound_size;
use crate::error::ImportError;

/// Progress of a source that opens asynchronously
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Something that can produce frames for a playback position.
pub trait FrameSource {
    /// Sources that decode while opening are ready right away. Others (the
    /// browser's media element) report `Loading` until the first frame exists.
    fn load_state(&mut self) -> LoadState {
        LoadState::Ready
    }

    /// Frame shown before playback starts
    fn first_frame(&self) -> Option<&RgbaImage>;

    /// Frame at `secs` of playback, with an index that changes whenever the
    /// frame does. Loops.
    fn frame_at(&mut self, secs: f64) -> Option<(usize, &RgbaImage)>;

    /// Playback started or stopped
    fn set_playing(&mut self, _playing: bool) {}

    /// Release buffered media. Further calls return no frames.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// Turns uploaded bytes into a [`FrameSource`].
pub trait VideoDecoder {
    fn open(&self, bytes: Arc<[u8]>, mime: &str) -> Result<Box<dyn FrameSource>, ImportError>;
}

/// The decoder for the platform we run on. Frames are bounded to
/// `max_dimension` pixels per side.
pub fn platform_decoder(max_dimension: u32) -> Box<dyn VideoDecoder> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(super::browser_video::BrowserVideoDecoder::new(max_dimension))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(NativeVideoDecoder::new(max_dimension))
    }
}

/// H.264 in MP4/QuickTime through openh264, plus animated images uploaded
/// with a video type. WebM streams need the browser decoder.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct NativeVideoDecoder {
    max_dimension: u32,
}

#[cfg(not(target_arch = "wasm32"))]
impl NativeVideoDecoder {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl VideoDecoder for NativeVideoDecoder {
    fn open(&self, bytes: Arc<[u8]>, mime: &str) -> Result<Box<dyn FrameSource>, ImportError> {
        if super::h264::is_iso_media(&bytes) {
            let stream = super::h264::H264Stream::open(bytes, self.max_dimension).map_err(|reason| ImportError::Video {
                mime: mime.to_owned(),
                reason,
            })?;
            return Ok(Box::new(stream));
        }
        AnimationFrameDecoder::new(self.max_dimension).open(bytes, mime)
    }
}

/// Decodes containers the `image` crate understands as animations
/// (GIF, animated WebP, APNG). Anything else is reported as undecodable.
#[derive(Debug, Clone, Copy)]
pub struct AnimationFrameDecoder {
    max_dimension: u32,
}

impl AnimationFrameDecoder {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl VideoDecoder for AnimationFrameDecoder {
    fn open(&self, bytes: Arc<[u8]>, mime: &str) -> Result<Box<dyn FrameSource>, ImportError> {
        let video_error = |reason: String| ImportError::Video {
            mime: mime.to_owned(),
            reason,
        };

        let format = image::guess_format(&bytes).map_err(|err| video_error(err.to_string()))?;
        let cursor = Cursor::new(&bytes[..]);
        let frames = match format {
            ImageFormat::Gif => image::codecs::gif::GifDecoder::new(cursor)?
                .into_frames()
                .collect_frames()?,
            ImageFormat::WebP => image::codecs::webp::WebPDecoder::new(cursor)?
                .into_frames()
                .collect_frames()?,
            ImageFormat::Png => image::codecs::png::PngDecoder::new(cursor)?
                .apng()?
                .into_frames()
                .collect_frames()?,
            other => return Err(video_error(format!("no decoder for {other:?} streams"))),
        };

        let clip = DecodedClip::new(
            frames
                .into_iter()
                .map(|frame| {
                    let (numer, denom) = frame.delay().numer_denom_ms();
                    let delay_secs = if denom == 0 { 0.0 } else { f64::from(numer) / f64::from(denom) / 1000.0 };
                    (delay_secs, frame.into_buffer())
                })
                .collect(),
            bytes,
            self.max_dimension,
        );
        if clip.frames.is_empty() {
            return Err(video_error("stream has no frames".to_owned()));
        }
        log::debug!("Decoded clip: {} frames, {:.2}s", clip.frames.len(), clip.duration);
        Ok(Box::new(clip))
    }
}

/// Frames held fully in memory
pub struct DecodedClip {
    /// (start time, pixels), sorted by start time
    frames: Vec<(f64, RgbaImage)>,
    duration: f64,
    // The upload itself stays alive with the clip and is released on dispose
    bytes: Option<Arc<[u8]>>,
}

/// Browsers clamp tiny GIF delays to this, so do we
const MIN_FRAME_DELAY: f64 = 0.02;
const DEFAULT_FRAME_DELAY: f64 = 0.1;

impl DecodedClip {
    /// Build from (delay, frame) pairs in display order. Frames larger than
    /// `max_dimension` on either side are downscaled once, here.
    pub fn new(frames: Vec<(f64, RgbaImage)>, bytes: Arc<[u8]>, max_dimension: u32) -> Self {
        let mut start = 0.0;
        let frames: Vec<(f64, RgbaImage)> = frames
            .into_iter()
            .map(|(delay, image)| {
                let at = start;
                let delay = if delay <= 0.0 { DEFAULT_FRAME_DELAY } else { delay.max(MIN_FRAME_DELAY) };
                start += delay;
                (at, bound_size(image.into(), max_dimension).into_rgba8())
            })
            .collect();
        Self {
            frames,
            duration: start,
            bytes: Some(bytes),
        }
    }
}

impl FrameSource for DecodedClip {
    fn first_frame(&self) -> Option<&RgbaImage> {
        self.frames.first().map(|(_, image)| image)
    }

    fn frame_at(&mut self, secs: f64) -> Option<(usize, &RgbaImage)> {
        if self.frames.is_empty() {
            return None;
        }
        let t = if self.duration > 0.0 { secs.max(0.0) % self.duration } else { 0.0 };
        // Last frame whose start time is <= t
        let index = self.frames.partition_point(|(start, _)| *start <= t).saturating_sub(1);
        self.frames.get(index).map(|(_, image)| (index, image))
    }

    fn dispose(&mut self) {
        self.frames.clear();
        self.bytes = None;
    }

    fn is_disposed(&self) -> bool {
        self.bytes.is_none()
    }
}

/// Owns a frame source plus the simulated playback state.
pub struct VideoHandle {
    source: Box<dyn FrameSource>,
    playing: bool,
    /// Frame clock value at which the current play run started
    started_at: Option<f64>,
    /// Playback position accumulated by earlier play runs
    offset: f64,
    last_frame: Option<usize>,
}

impl std::fmt::Debug for VideoHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoHandle")
            .field("playing", &self.playing)
            .field("offset", &self.offset)
            .field("last_frame", &self.last_frame)
            .field("disposed", &self.source.is_disposed())
            .finish_non_exhaustive()
    }
}

impl VideoHandle {
    pub fn new(source: Box<dyn FrameSource>) -> Self {
        Self {
            source,
            playing: false,
            started_at: None,
            offset: 0.0,
            last_frame: Some(0),
        }
    }

    pub fn load_state(&mut self) -> LoadState {
        if self.source.is_disposed() {
            return LoadState::Failed("source was released".to_owned());
        }
        self.source.load_state()
    }

    pub fn first_frame(&self) -> Option<&RgbaImage> {
        self.source.first_frame()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Flip between playing and paused. Returns the new state.
    pub fn toggle(&mut self, now: f64) -> bool {
        if self.playing {
            self.pause(now);
        } else if !self.source.is_disposed() {
            self.playing = true;
            self.started_at = Some(now);
            self.source.set_playing(true);
        }
        self.playing
    }

    pub fn pause(&mut self, now: f64) {
        if let Some(started) = self.started_at.take() {
            self.offset += (now - started).max(0.0);
        }
        if self.playing {
            self.source.set_playing(false);
        }
        self.playing = false;
    }

    /// Sample the frame for `now`. Returns it only when it differs from the
    /// frame sampled last time; nothing is returned once paused.
    pub fn poll(&mut self, now: f64) -> Option<RgbaImage> {
        if !self.playing {
            return None;
        }
        let started = *self.started_at.get_or_insert(now);
        let position = self.offset + (now - started).max(0.0);
        let (index, frame) = self.source.frame_at(position)?;
        if self.last_frame == Some(index) {
            return None;
        }
        self.last_frame = Some(index);
        Some(frame.clone())
    }

    fn dispose(&mut self) {
        if !self.source.is_disposed() {
            log::debug!("Releasing video frames");
            self.source.dispose();
        }
        self.playing = false;
        self.started_at = None;
    }
}

impl Drop for VideoHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(value: u8) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba([value, value, value, 255]))
    }

    fn clip() -> DecodedClip {
        DecodedClip::new(
            vec![(0.5, solid(0)), (0.5, solid(100)), (1.0, solid(200))],
            Arc::from(vec![1u8, 2, 3]),
            64,
        )
    }

    #[test]
    fn frames_loop_over_duration() {
        let mut clip = clip();
        assert_eq!(clip.duration, 2.0);
        assert_eq!(clip.frame_at(0.0).map(|(i, _)| i), Some(0));
        assert_eq!(clip.frame_at(0.7).map(|(i, _)| i), Some(1));
        assert_eq!(clip.frame_at(1.2).map(|(i, _)| i), Some(2));
        assert_eq!(clip.frame_at(2.1).map(|(i, _)| i), Some(0));
    }

    #[test]
    fn playback_only_samples_while_playing() {
        let mut handle = VideoHandle::new(Box::new(clip()));
        assert_eq!(handle.poll(0.0), None);

        assert!(handle.toggle(10.0));
        // Still on frame 0, already displayed
        assert_eq!(handle.poll(10.1), None);
        let frame = handle.poll(10.6).expect("second frame");
        assert_eq!(frame.get_pixel(0, 0)[0], 100);

        assert!(!handle.toggle(10.7));
        assert_eq!(handle.poll(11.5), None);

        // Resumes where it paused (0.7s in), not from the start
        handle.toggle(20.0);
        let frame = handle.poll(20.4).expect("third frame");
        assert_eq!(frame.get_pixel(0, 0)[0], 200);
    }

    #[test]
    fn dispose_releases_frames_and_stops() {
        let mut handle = VideoHandle::new(Box::new(clip()));
        handle.toggle(0.0);
        handle.dispose();
        assert!(!handle.is_playing());
        assert!(handle.first_frame().is_none());
        assert!(!handle.toggle(1.0));
        assert!(matches!(handle.load_state(), LoadState::Failed(_)));
    }

    #[test]
    fn every_frame_is_bounded() {
        let big = RgbaImage::from_pixel(400, 100, Rgba([9, 9, 9, 255]));
        let mut clip = DecodedClip::new(vec![(0.1, big.clone()), (0.1, big)], Arc::from(vec![0u8]), 200);
        assert_eq!(clip.first_frame().map(|frame| frame.dimensions()), Some((200, 50)));
        let (index, frame) = clip.frame_at(0.15).expect("second frame");
        assert_eq!((index, frame.dimensions()), (1, (200, 50)));
    }

    #[test]
    fn rejects_non_animation_containers() {
        let bytes: Arc<[u8]> = Arc::from(b"RIFF\x00\x00\x00\x00AVI LIST".to_vec());
        let result = AnimationFrameDecoder::new(512).open(bytes, "video/mp4");
        assert!(matches!(result, Err(ImportError::Video { .. })));
    }
}

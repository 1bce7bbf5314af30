use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;

use super::Element;
use crate::animation::FadeIn;
use crate::element::common;
use crate::media::video::VideoHandle;

/// Where the pixels of a media object come from
#[derive(Debug)]
pub enum MediaSource {
    Still,
    Video(VideoHandle),
}

/// An imported image, or the still frame standing in for a video.
#[derive(Debug)]
pub struct MediaObject {
    source: MediaSource,
    frame: Arc<RgbaImage>,
    // Bumped whenever `frame` changes so textures can be refreshed
    frame_version: u64,
    rect: Rect,
    opacity: f32,
    fade: Option<FadeIn>,
}

impl MediaObject {
    pub fn still(frame: RgbaImage, rect: Rect) -> Self {
        Self::new(MediaSource::Still, frame, rect)
    }

    pub fn video(handle: VideoHandle, first_frame: RgbaImage, rect: Rect) -> Self {
        Self::new(MediaSource::Video(handle), first_frame, rect)
    }

    fn new(source: MediaSource, frame: RgbaImage, rect: Rect) -> Self {
        Self {
            source,
            frame: Arc::new(frame),
            frame_version: 0,
            rect,
            opacity: 1.0,
            fade: None,
        }
    }

    /// Start fully transparent and fade in over `secs`.
    pub fn with_fade_in(mut self, secs: f32) -> Self {
        self.opacity = 0.0;
        self.fade = Some(FadeIn::new(secs));
        self
    }

    pub fn is_video(&self) -> bool {
        matches!(self.source, MediaSource::Video(_))
    }

    pub fn is_playing(&self) -> bool {
        matches!(&self.source, MediaSource::Video(handle) if handle.is_playing())
    }

    pub fn frame(&self) -> &Arc<RgbaImage> {
        &self.frame
    }

    pub fn frame_version(&self) -> u64 {
        self.frame_version
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Toggle simulated playback. `None` for still images.
    pub fn toggle_playback(&mut self, now: f64) -> Option<bool> {
        match &mut self.source {
            MediaSource::Video(handle) => Some(handle.toggle(now)),
            MediaSource::Still => None,
        }
    }

    pub fn stop_playback(&mut self, now: f64) {
        if let MediaSource::Video(handle) = &mut self.source {
            handle.pause(now);
        }
    }

    /// Advance the fade and resample video. Returns true while another frame
    /// is needed.
    pub fn tick(&mut self, now: f64) -> bool {
        let mut animating = false;

        if let Some(fade) = &mut self.fade {
            self.opacity = fade.sample(now);
            if fade.is_finished(now) {
                self.opacity = 1.0;
                self.fade = None;
            } else {
                animating = true;
            }
        }

        if let MediaSource::Video(handle) = &mut self.source {
            if handle.is_playing() {
                if let Some(frame) = handle.poll(now) {
                    self.frame = Arc::new(frame);
                    self.frame_version += 1;
                }
                animating = true;
            }
        }

        animating
    }

    /// Moving never changes the size, so it cannot fail
    pub fn translate(&mut self, delta: Vec2) {
        self.rect = self.rect.translate(delta);
    }

    pub fn resize(&mut self, new_rect: Rect) -> Result<(), String> {
        common::validate_rect(&new_rect)?;
        self.rect = new_rect;
        Ok(())
    }
}

impl Element for MediaObject {
    fn element_type(&self) -> &'static str {
        if self.is_video() { "video" } else { "image" }
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.rect.contains(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_reaches_full_opacity_and_stops_ticking() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::splat(20.0));
        let mut media = MediaObject::still(RgbaImage::new(20, 20), rect).with_fade_in(0.2);
        assert_eq!(media.opacity(), 0.0);

        assert!(media.tick(1.0));
        assert!(media.tick(1.1));
        assert!(media.opacity() > 0.0 && media.opacity() < 1.0);
        assert!(!media.tick(1.3));
        assert_eq!(media.opacity(), 1.0);
        assert!(!media.is_fading());
    }

    #[test]
    fn stills_do_not_play() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::splat(20.0));
        let mut media = MediaObject::still(RgbaImage::new(20, 20), rect);
        assert_eq!(media.toggle_playback(0.0), None);
        assert_eq!(media.element_type(), "image");
    }

    #[test]
    fn resize_rejects_degenerate_rects() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::splat(20.0));
        let mut media = MediaObject::still(RgbaImage::new(20, 20), rect);
        assert!(media.resize(Rect::from_min_size(Pos2::ZERO, Vec2::new(1.0, 30.0))).is_err());
        assert_eq!(media.rect(), rect);
    }

    #[test]
    fn thin_media_still_moves() {
        let rect = Rect::from_min_size(Pos2::new(80.0, 297.0), Vec2::new(640.0, 5.0));
        let mut media = MediaObject::still(RgbaImage::new(2000, 16), rect);
        media.translate(Vec2::new(50.0, 50.0));
        assert_eq!(media.rect().min, Pos2::new(130.0, 347.0));
        assert_eq!(media.rect().size(), rect.size());
    }
}

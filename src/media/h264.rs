//! H.264 video in MP4/QuickTime containers, decoded lazily with openh264.
//!
//! Only the current frame is kept. Playing forward decodes one sample per
//! frame change; looping back to the start restarts the decoder.

use std::io::Cursor;
use std::sync::Arc;

use image::RgbaImage;
use log::{debug, warn};
use mp4::{MediaType, Mp4Reader};
use openh264::decoder::Decoder;
use openh264::formats::YUVSource;

use super::still::bound_size;
use super::video::FrameSource;

const START_CODE: [u8; 4] = [0, 0, 0, 1];
/// Samples are assumed to carry 4-byte NAL length prefixes, as every muxer
/// in common use writes them.
const NAL_LENGTH_SIZE: usize = 4;
const DEFAULT_FRAME_SECS: f64 = 1.0 / 30.0;

/// ISO base media files (MP4, M4V, QuickTime) open with an `ftyp` box
pub fn is_iso_media(bytes: &[u8]) -> bool {
    bytes.get(4..8) == Some(b"ftyp".as_slice())
}

enum Step {
    Picture(RgbaImage),
    /// The decoder swallowed the sample without emitting a picture yet
    Buffered,
    End,
}

pub struct H264Stream {
    reader: Option<Mp4Reader<Cursor<Arc<[u8]>>>>,
    decoder: Decoder,
    track_id: u32,
    sample_count: u32,
    frame_secs: f64,
    duration: f64,
    /// SPS and PPS in Annex B form, sent ahead of every sync sample
    parameter_sets: Vec<u8>,
    max_dimension: u32,
    /// 1-based id of the next sample to feed
    next_sample: u32,
    /// Pictures produced since the decoder was last (re)started
    decoded: usize,
    first: Option<RgbaImage>,
    current: Option<RgbaImage>,
}

impl H264Stream {
    /// Parse the container and decode the first picture.
    pub fn open(bytes: Arc<[u8]>, max_dimension: u32) -> Result<Self, String> {
        let size = bytes.len() as u64;
        let reader = Mp4Reader::read_header(Cursor::new(bytes), size).map_err(|err| err.to_string())?;

        let track = reader
            .tracks()
            .values()
            .find(|track| matches!(track.media_type(), Ok(MediaType::H264)))
            .ok_or_else(|| "no H.264 video track".to_owned())?;
        let track_id = track.track_id();
        let sample_count = track.sample_count();
        if sample_count == 0 {
            return Err("video track has no samples".to_owned());
        }

        let mut parameter_sets = Vec::new();
        for set in [track.sequence_parameter_set(), track.picture_parameter_set()] {
            let set = set.map_err(|err| err.to_string())?;
            parameter_sets.extend_from_slice(&START_CODE);
            parameter_sets.extend_from_slice(set);
        }

        let total = track.duration().as_secs_f64();
        let frame_secs = if total > 0.0 {
            total / f64::from(sample_count)
        } else {
            DEFAULT_FRAME_SECS
        };
        debug!(
            "H.264 track {}: {}x{}, {} samples, {:.2}s",
            track_id,
            track.width(),
            track.height(),
            sample_count,
            total
        );

        let mut stream = Self {
            reader: Some(reader),
            decoder: Decoder::new().map_err(|err| err.to_string())?,
            track_id,
            sample_count,
            frame_secs,
            duration: frame_secs * f64::from(sample_count),
            parameter_sets,
            max_dimension,
            next_sample: 1,
            decoded: 0,
            first: None,
            current: None,
        };

        let first = loop {
            match stream.step()? {
                Step::Picture(picture) => break picture,
                Step::Buffered => {}
                Step::End => return Err("stream has no decodable frames".to_owned()),
            }
        };
        stream.first = Some(first.clone());
        stream.current = Some(first);
        Ok(stream)
    }

    fn restart(&mut self) -> Result<(), String> {
        self.decoder = Decoder::new().map_err(|err| err.to_string())?;
        self.next_sample = 1;
        self.decoded = 0;
        Ok(())
    }

    /// Feed the next sample to the decoder
    fn step(&mut self) -> Result<Step, String> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(Step::End);
        };
        if self.next_sample > self.sample_count {
            return Ok(Step::End);
        }
        let sample = reader
            .read_sample(self.track_id, self.next_sample)
            .map_err(|err| err.to_string())?;
        let first_sample = self.next_sample == 1;
        self.next_sample += 1;
        let Some(sample) = sample else {
            return Ok(Step::Buffered);
        };

        let mut annex_b = Vec::with_capacity(sample.bytes.len() + self.parameter_sets.len());
        if first_sample || sample.is_sync {
            annex_b.extend_from_slice(&self.parameter_sets);
        }
        length_prefixed_to_annex_b(&sample.bytes, &mut annex_b)?;

        let mut picture = None;
        for unit in split_annex_b(&annex_b) {
            if let Some(yuv) = self.decoder.decode(unit).map_err(|err| err.to_string())? {
                let (width, height) = yuv.dimensions();
                let mut rgba = vec![0; width * height * 4];
                yuv.write_rgba8(&mut rgba);
                picture = RgbaImage::from_raw(width as u32, height as u32, rgba);
            }
        }

        Ok(match picture {
            Some(picture) => {
                self.decoded += 1;
                Step::Picture(bound_size(picture.into(), self.max_dimension).into_rgba8())
            }
            None => Step::Buffered,
        })
    }

    /// Decode forward until `target` pictures past the start have been shown
    fn seek(&mut self, target: usize) -> Result<(), String> {
        if target + 1 < self.decoded {
            self.restart()?;
        }
        while self.decoded <= target {
            match self.step()? {
                Step::Picture(picture) => self.current = Some(picture),
                Step::Buffered => {}
                Step::End => break,
            }
        }
        Ok(())
    }
}

impl FrameSource for H264Stream {
    fn first_frame(&self) -> Option<&RgbaImage> {
        self.first.as_ref()
    }

    fn frame_at(&mut self, secs: f64) -> Option<(usize, &RgbaImage)> {
        self.reader.as_ref()?;
        let t = if self.duration > 0.0 { secs.max(0.0) % self.duration } else { 0.0 };
        let last = self.sample_count.saturating_sub(1) as usize;
        let target = ((t / self.frame_secs) as usize).min(last);
        if let Err(err) = self.seek(target) {
            warn!("Video decoding stopped: {err}");
        }
        let index = self.decoded.saturating_sub(1);
        self.current.as_ref().map(|frame| (index, frame))
    }

    fn dispose(&mut self) {
        self.reader = None;
        self.first = None;
        self.current = None;
    }

    fn is_disposed(&self) -> bool {
        self.reader.is_none()
    }
}

/// Replace the length prefix of every NAL unit with a start code
fn length_prefixed_to_annex_b(data: &[u8], out: &mut Vec<u8>) -> Result<(), String> {
    let mut rest = data;
    while !rest.is_empty() {
        if rest.len() < NAL_LENGTH_SIZE {
            return Err("truncated NAL length".to_owned());
        }
        let (prefix, tail) = rest.split_at(NAL_LENGTH_SIZE);
        let len = prefix.iter().fold(0usize, |len, byte| (len << 8) | usize::from(*byte));
        if len > tail.len() {
            return Err("NAL unit overruns its sample".to_owned());
        }
        out.extend_from_slice(&START_CODE);
        out.extend_from_slice(&tail[..len]);
        rest = &tail[len..];
    }
    Ok(())
}

/// NAL units of an Annex B stream, each with its start code
fn split_annex_b(data: &[u8]) -> Vec<&[u8]> {
    let mut starts = Vec::new();
    let mut i = 0;
    while i + 3 <= data.len() {
        if data[i..i + 3] == [0, 0, 1] {
            // Include the leading zero of a 4-byte start code
            starts.push(if i > 0 && data[i - 1] == 0 { i - 1 } else { i });
            i += 3;
        } else {
            i += 1;
        }
    }
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(data.len());
            &data[start..end]
        })
        .collect()
}

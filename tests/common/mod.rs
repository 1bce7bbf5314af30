#![allow(dead_code)]

use eframe_whiteboard::brush::BrushSettings;
use eframe_whiteboard::media::IncomingFile;
use eframe_whiteboard::settings::Settings;
use eframe_whiteboard::state::EditorModel;
use egui::{Color32, Pos2};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255])))
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn png_file(name: &str, width: u32, height: u32) -> IncomingFile {
    IncomingFile::new(name, "image/png", png(width, height))
}

pub fn model() -> EditorModel {
    EditorModel::new(&Settings::default(), BrushSettings::new(Color32::BLUE, 6))
}

/// Press, drag through `points`, release
pub fn draw(model: &mut EditorModel, points: &[(f32, f32)]) {
    let (first, rest) = points.split_first().unwrap();
    model.pointer_down(Pos2::new(first.0, first.1), 0.0);
    for (x, y) in rest {
        model.pointer_move(Pos2::new(*x, *y), 0.0);
    }
    let last = points.last().unwrap();
    model.pointer_up(Pos2::new(last.0, last.1), 0.0);
}

/// Encode one solid-color frame per entry of `colors` as H.264 and mux the
/// result into an MP4 with `frame_ms` per frame.
#[cfg(not(target_arch = "wasm32"))]
pub fn h264_mp4(width: u16, height: u16, colors: &[[u8; 3]], frame_ms: u32) -> Vec<u8> {
    use mp4::{AvcConfig, MediaConfig, Mp4Config, Mp4Sample, Mp4Writer, TrackConfig, TrackType};
    use openh264::encoder::Encoder;
    use openh264::formats::{RgbSliceU8, YUVBuffer};

    let (w, h) = (usize::from(width), usize::from(height));
    let mut encoder = Encoder::new().unwrap();
    let mut sps = Vec::new();
    let mut pps = Vec::new();
    let mut samples = Vec::new();
    for color in colors {
        let rgb: Vec<u8> = color.iter().copied().cycle().take(w * h * 3).collect();
        let yuv = YUVBuffer::from_rgb_source(RgbSliceU8::new(&rgb, (w, h)));
        let encoded = encoder.encode(&yuv).unwrap().to_vec();

        let mut sample = Vec::new();
        let mut is_sync = false;
        for unit in annex_b_units(&encoded) {
            match unit[0] & 0x1f {
                7 => sps = unit.to_vec(),
                8 => pps = unit.to_vec(),
                kind => {
                    is_sync |= kind == 5;
                    sample.extend_from_slice(&(unit.len() as u32).to_be_bytes());
                    sample.extend_from_slice(unit);
                }
            }
        }
        if !sample.is_empty() {
            samples.push((sample, is_sync));
        }
    }

    let config = Mp4Config {
        major_brand: str::parse("isom").unwrap(),
        minor_version: 512,
        compatible_brands: vec![str::parse("isom").unwrap(), str::parse("avc1").unwrap()],
        timescale: 1000,
    };
    let mut writer = Mp4Writer::write_start(std::io::Cursor::new(Vec::new()), &config).unwrap();
    writer
        .add_track(&TrackConfig {
            track_type: TrackType::Video,
            timescale: 1000,
            language: String::from("und"),
            media_conf: MediaConfig::AvcConfig(AvcConfig {
                width,
                height,
                seq_param_set: sps,
                pic_param_set: pps,
            }),
        })
        .unwrap();
    for (n, (sample, is_sync)) in samples.into_iter().enumerate() {
        writer
            .write_sample(
                1,
                &Mp4Sample {
                    start_time: n as u64 * u64::from(frame_ms),
                    duration: frame_ms,
                    rendering_offset: 0,
                    is_sync,
                    bytes: bytes::Bytes::from(sample),
                },
            )
            .unwrap();
    }
    writer.write_end().unwrap();
    writer.into_writer().into_inner()
}

/// NAL units of an Annex B stream, start codes stripped
#[cfg(not(target_arch = "wasm32"))]
fn annex_b_units(data: &[u8]) -> Vec<&[u8]> {
    let mut starts = Vec::new();
    let mut i = 0;
    while i + 3 <= data.len() {
        if data[i..i + 3] == [0, 0, 1] {
            starts.push(i + 3);
            i += 3;
        } else {
            i += 1;
        }
    }
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let mut end = starts.get(n + 1).map_or(data.len(), |next| next - 3);
            while end > start && data[end - 1] == 0 {
                end -= 1;
            }
            &data[start..end]
        })
        .collect()
}

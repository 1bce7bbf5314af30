mod common;

use std::sync::Arc;

use eframe_whiteboard::element::{Element, SceneObject};
use eframe_whiteboard::error::ImportError;
use eframe_whiteboard::media::video::{DecodedClip, FrameSource, LoadState, VideoDecoder};
use eframe_whiteboard::media::{Imported, IncomingFile, MediaImporter};
use eframe_whiteboard::settings::Settings;
use eframe_whiteboard::tools::Tool;
use egui::Vec2;
use image::{Rgba, RgbaImage};

fn ready(imported: Imported) -> SceneObject {
    match imported {
        Imported::Ready(object) => object,
        Imported::Loading(pending) => panic!("{} is still loading", pending.name()),
    }
}

#[test]
fn oversized_images_are_downscaled_preserving_aspect() {
    let settings = Settings {
        max_dimension: 256,
        ..Settings::default()
    };
    let importer = MediaImporter::new(&settings);
    let object = ready(
        importer
            .import(&common::png_file("wide.png", 1024, 512), Vec2::new(2000.0, 2000.0))
            .unwrap(),
    );
    let media = object.as_media().unwrap();
    let (width, height) = media.frame().dimensions();
    assert!(width <= 256 && height <= 256);
    assert_eq!((width, height), (256, 128));
}

#[test]
fn tiny_images_add_nothing() {
    let mut model = common::model();
    assert_eq!(model.import_file(&common::png_file("dot.png", 10, 200), 0.0), None);
    assert!(model.canvas().is_empty());
    assert_eq!(model.tool(), Tool::Brush);

    let importer = MediaImporter::new(&Settings::default());
    let err = importer
        .import(&common::png_file("dot.png", 10, 200), Vec2::new(800.0, 600.0))
        .unwrap_err();
    assert!(matches!(err, ImportError::TooSmall { width: 10, height: 200, min: 16 }));
}

#[test]
fn import_switches_to_selection_and_activates_the_object() {
    let mut model = common::model();
    let id = model.import_file(&common::png_file("a.png", 400, 200), 0.0).unwrap();

    assert_eq!(model.tool(), Tool::Selection);
    assert!(!model.canvas().is_drawing_mode());
    assert_eq!(model.canvas().active_object(), Some(id));
    let object = model.canvas().get(id).unwrap();
    assert!(object.props().selectable && object.props().evented);
}

#[test]
fn imported_objects_are_fitted_and_centered() {
    let mut model = common::model();
    model.canvas_mut().set_size(Vec2::new(500.0, 1000.0));
    let id = model.import_file(&common::png_file("big.png", 1000, 1000), 0.0).unwrap();

    let rect = model.canvas().get(id).unwrap().rect();
    // 80% of the narrower axis
    assert!((rect.width() - 400.0).abs() < 0.5);
    assert!((rect.height() - 400.0).abs() < 0.5);
    assert!((rect.center().x - 250.0).abs() < 0.5);
    assert!((rect.center().y - 500.0).abs() < 0.5);
}

#[test]
fn imported_objects_fade_in() {
    let mut model = common::model();
    let id = model.import_file(&common::png_file("a.png", 64, 64), 10.0).unwrap();
    let opacity = |model: &eframe_whiteboard::EditorModel| model.canvas().get(id).unwrap().as_media().unwrap().opacity();
    assert_eq!(opacity(&model), 0.0);

    assert!(model.tick(10.0));
    assert!(model.tick(10.2));
    let halfway = opacity(&model);
    assert!(halfway > 0.0 && halfway < 1.0);

    assert!(!model.tick(11.0));
    assert_eq!(opacity(&model), 1.0);
}

#[test]
fn disallowed_types_are_rejected() {
    let importer = MediaImporter::new(&Settings::default());
    let file = IncomingFile::new("page.html", "text/html", b"<html>".to_vec());
    assert!(matches!(
        importer.import(&file, Vec2::new(800.0, 600.0)),
        Err(ImportError::UnsupportedType(_))
    ));
}

/// Two solid frames, 0.5s each
struct TwoFrameDecoder;

impl VideoDecoder for TwoFrameDecoder {
    fn open(&self, bytes: Arc<[u8]>, _mime: &str) -> Result<Box<dyn FrameSource>, ImportError> {
        let frames = vec![
            (0.5, RgbaImage::from_pixel(32, 24, Rgba([255, 0, 0, 255]))),
            (0.5, RgbaImage::from_pixel(32, 24, Rgba([0, 0, 255, 255]))),
        ];
        Ok(Box::new(DecodedClip::new(frames, bytes, 4096)))
    }
}

#[test]
fn videos_play_on_double_click() {
    let settings = Settings::default();
    let importer = MediaImporter::new(&settings).with_decoder(Box::new(TwoFrameDecoder));
    let mut model = common::model().with_importer(importer);

    let file = IncomingFile::new("clip.mp4", "", vec![0u8; 8]);
    let id = model.import_file(&file, 0.0).unwrap();
    assert_eq!(model.tool(), Tool::Selection);
    let center = model.canvas().get(id).unwrap().rect().center();

    let media = |model: &eframe_whiteboard::EditorModel| {
        let media = model.canvas().get(id).unwrap().as_media().unwrap();
        (media.is_playing(), *media.frame().get_pixel(0, 0))
    };
    assert_eq!(media(&model), (false, Rgba([255, 0, 0, 255])));

    assert_eq!(model.double_click(center, 1.0), Some(true));
    model.tick(1.0);
    model.tick(1.6);
    assert_eq!(media(&model), (true, Rgba([0, 0, 255, 255])));

    assert_eq!(model.double_click(center, 2.0), Some(false));
    model.tick(2.7);
    assert_eq!(media(&model), (false, Rgba([0, 0, 255, 255])));
}

#[test]
fn double_click_on_a_still_image_does_nothing() {
    let mut model = common::model();
    let id = model.import_file(&common::png_file("a.png", 64, 64), 0.0).unwrap();
    let center = model.canvas().get(id).unwrap().rect().center();
    assert_eq!(model.double_click(center, 0.0), None);
}

/// Opens like a browser media element: loading for `polls` checks, then
/// either ready with one frame or failed.
struct SlowDecoder {
    polls: usize,
    fails: bool,
}

struct SlowSource {
    polls_left: usize,
    fails: bool,
    frame: RgbaImage,
    disposed: bool,
}

impl FrameSource for SlowSource {
    fn load_state(&mut self) -> LoadState {
        if self.polls_left > 0 {
            self.polls_left -= 1;
            LoadState::Loading
        } else if self.fails {
            LoadState::Failed("unsupported codec".to_owned())
        } else {
            LoadState::Ready
        }
    }

    fn first_frame(&self) -> Option<&RgbaImage> {
        (self.polls_left == 0 && !self.fails).then_some(&self.frame)
    }

    fn frame_at(&mut self, _secs: f64) -> Option<(usize, &RgbaImage)> {
        Some((0, &self.frame))
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl VideoDecoder for SlowDecoder {
    fn open(&self, _bytes: Arc<[u8]>, _mime: &str) -> Result<Box<dyn FrameSource>, ImportError> {
        Ok(Box::new(SlowSource {
            polls_left: self.polls,
            fails: self.fails,
            frame: RgbaImage::from_pixel(40, 30, Rgba([0, 255, 0, 255])),
            disposed: false,
        }))
    }
}

fn model_with(decoder: SlowDecoder) -> eframe_whiteboard::EditorModel {
    let importer = MediaImporter::new(&Settings::default()).with_decoder(Box::new(decoder));
    common::model().with_importer(importer)
}

#[test]
fn loading_videos_are_placed_once_their_first_frame_arrives() {
    let mut model = model_with(SlowDecoder { polls: 2, fails: false });
    let file = IncomingFile::new("clip.webm", "video/webm", vec![0u8; 8]);

    assert_eq!(model.import_file(&file, 0.0), None);
    assert_eq!(model.pending_imports(), 1);
    assert_eq!(model.tool(), Tool::Brush);

    assert!(model.tick(0.1));
    assert!(model.canvas().is_empty());
    model.tick(0.2);

    assert_eq!(model.pending_imports(), 0);
    assert_eq!(model.canvas().len(), 1);
    assert_eq!(model.tool(), Tool::Selection);
    let id = model.canvas().active_object().unwrap();
    let media = model.canvas().get(id).unwrap().as_media().unwrap();
    assert!(media.is_video());
    assert_eq!(media.frame().dimensions(), (40, 30));
}

#[test]
fn videos_that_fail_to_load_are_dropped() {
    let mut model = model_with(SlowDecoder { polls: 1, fails: true });
    let file = IncomingFile::new("clip.mov", "", vec![0u8; 8]);

    assert_eq!(model.import_file(&file, 0.0), None);
    model.tick(0.1);
    assert_eq!(model.pending_imports(), 0);
    assert!(model.canvas().is_empty());
    assert_eq!(model.tool(), Tool::Brush);
}

#[test]
fn h264_clips_import_and_play() {
    let red_then_blue = common::h264_mp4(64, 48, &[[255, 0, 0], [0, 0, 255]], 500);
    let mut model = common::model();
    let file = IncomingFile::new("clip.mp4", "video/mp4", red_then_blue);

    let id = model.import_file(&file, 0.0).expect("video imported");
    let frame = |model: &eframe_whiteboard::EditorModel| {
        let media = model.canvas().get(id).unwrap().as_media().unwrap();
        assert!(media.is_video());
        (media.frame().dimensions(), *media.frame().get_pixel(32, 24))
    };
    let (size, first) = frame(&model);
    assert_eq!(size, (64, 48));
    assert!(first[0] > 150 && first[2] < 100, "first frame should be red, got {first:?}");

    let center = model.canvas().get(id).unwrap().rect().center();
    assert_eq!(model.double_click(center, 1.0), Some(true));
    model.tick(1.0);
    model.tick(1.6);
    let (_, second) = frame(&model);
    assert!(second[2] > 150 && second[0] < 100, "second frame should be blue, got {second:?}");
}

#[test]
fn broken_movie_files_add_nothing() {
    let mut model = common::model();
    let mut mp4 = vec![0, 0, 0, 0x18];
    mp4.extend_from_slice(b"ftypmp42");
    mp4.extend_from_slice(&[0; 16]);
    let file = IncomingFile::new("movie.mp4", "video/mp4", mp4);
    assert_eq!(model.import_file(&file, 0.0), None);
    assert_eq!(model.pending_imports(), 0);
    assert!(model.canvas().is_empty());
}

#[test]
fn thin_strips_can_be_dragged() {
    let mut model = common::model();
    model.canvas_mut().set_size(Vec2::new(800.0, 600.0));
    let id = model.import_file(&common::png_file("strip.png", 2000, 16), 0.0).unwrap();
    let before = model.canvas().get(id).unwrap().rect();
    assert!(before.height() >= eframe_whiteboard::element::MIN_ELEMENT_SIZE);

    let start = before.center();
    model.pointer_down(start, 0.0);
    model.pointer_move(start + Vec2::new(25.0, 25.0), 0.0);
    model.pointer_up(start + Vec2::new(50.0, 50.0), 0.0);

    let after = model.canvas().get(id).unwrap().rect();
    assert_eq!(after.min, before.min + Vec2::new(50.0, 50.0));
    assert_eq!(after.size(), before.size());

    model.undo(0.0);
    assert_eq!(model.canvas().get(id).unwrap().rect(), before);
}

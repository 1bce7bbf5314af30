mod common;

use eframe_whiteboard::tools::Tool;

fn kinds(model: &eframe_whiteboard::EditorModel) -> String {
    model
        .canvas()
        .objects()
        .iter()
        .map(|object| if object.is_image() { 'I' } else { 'S' })
        .collect()
}

#[test]
fn eraser_strokes_sink_below_every_image() {
    let mut model = common::model();
    model.set_tool(Tool::Brush);
    common::draw(&mut model, &[(1.0, 1.0), (2.0, 2.0)]);
    model.import_file(&common::png_file("a.png", 50, 50), 0.0).unwrap();
    model.set_tool(Tool::Brush);
    common::draw(&mut model, &[(3.0, 3.0), (4.0, 4.0)]);
    model.import_file(&common::png_file("b.png", 50, 50), 0.0).unwrap();
    assert_eq!(kinds(&model), "SISI");

    model.set_tool(Tool::Eraser);
    common::draw(&mut model, &[(10.0, 10.0), (90.0, 90.0)]);

    assert_eq!(kinds(&model), "SSSII");
    let objects = model.canvas().objects();
    let eraser_index = 0;
    assert!(objects[eraser_index].is_stroke());
    for (index, object) in objects.iter().enumerate() {
        if object.is_image() {
            assert!(index > eraser_index);
        }
    }
}

#[test]
fn images_keep_their_relative_order() {
    let mut model = common::model();
    let a = model.import_file(&common::png_file("a.png", 50, 50), 0.0).unwrap();
    model.set_tool(Tool::Brush);
    common::draw(&mut model, &[(3.0, 3.0), (4.0, 4.0)]);
    let b = model.import_file(&common::png_file("b.png", 50, 50), 0.0).unwrap();

    model.set_tool(Tool::Eraser);
    common::draw(&mut model, &[(10.0, 10.0), (20.0, 20.0)]);
    let order = model.canvas().order();
    assert_eq!(&order[order.len() - 2..], &[a, b]);
}

#[test]
fn repeated_raising_is_idempotent() {
    let mut model = common::model();
    model.import_file(&common::png_file("a.png", 50, 50), 0.0).unwrap();
    model.set_tool(Tool::Eraser);
    common::draw(&mut model, &[(10.0, 10.0), (20.0, 20.0)]);
    let once = model.canvas().order();

    model.canvas_mut().raise_images();
    assert_eq!(model.canvas().order(), once);
}

#[test]
fn brush_strokes_go_on_top() {
    let mut model = common::model();
    model.import_file(&common::png_file("a.png", 50, 50), 0.0).unwrap();
    model.set_tool(Tool::Brush);
    common::draw(&mut model, &[(10.0, 10.0), (20.0, 20.0)]);
    assert_eq!(kinds(&model), "IS");
}

#[test]
fn undoing_an_eraser_stroke_keeps_image_order() {
    let mut model = common::model();
    model.set_tool(Tool::Brush);
    common::draw(&mut model, &[(1.0, 1.0), (2.0, 2.0)]);
    model.import_file(&common::png_file("a.png", 50, 50), 0.0).unwrap();
    model.set_tool(Tool::Eraser);
    common::draw(&mut model, &[(10.0, 10.0), (20.0, 20.0)]);
    assert_eq!(kinds(&model), "SSI");

    model.undo(0.0);
    assert_eq!(kinds(&model), "SI");
}

#[test]
fn a_single_click_leaves_a_dot() {
    let mut model = common::model();
    common::draw(&mut model, &[(40.0, 40.0)]);
    let stroke = model.canvas().objects()[0].as_stroke().unwrap();
    assert_eq!(stroke.points().len(), 1);
}

#[test]
fn back_to_back_eraser_strokes_before_a_frame_stay_below_images() {
    let mut model = common::model();
    model.import_file(&common::png_file("a.png", 50, 50), 0.0).unwrap();
    model.import_file(&common::png_file("b.png", 50, 50), 0.0).unwrap();
    model.set_tool(Tool::Eraser);

    // No tick or render between the two gestures
    common::draw(&mut model, &[(10.0, 10.0), (20.0, 20.0)]);
    common::draw(&mut model, &[(30.0, 30.0), (40.0, 40.0)]);

    assert_eq!(kinds(&model), "SSII");
}

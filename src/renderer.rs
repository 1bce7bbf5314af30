use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke as EguiStroke, Vec2};

use crate::canvas::Canvas;
use crate::element::{Element, MediaObject, SceneObjectKind};
use crate::texture_manager::TextureManager;
use crate::tools::{Tool, ToolState};
use crate::widgets::resize_handle::draw_handles;

const UV: Rect = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

/// Paints the canvas and its overlays. Owns the GPU textures of the media objects.
#[derive(Default)]
pub struct Renderer {
    textures: TextureManager,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `canvas` into `screen_rect`, bottom to top, then the stroke being
    /// drawn and the selection handles.
    pub fn render(&mut self, painter: &Painter, screen_rect: Rect, canvas: &Canvas, tools: &ToolState) {
        let offset = screen_rect.min.to_vec2();
        let painter = painter.with_clip_rect(screen_rect);
        painter.rect_filled(screen_rect, 0.0, canvas.background());

        self.textures.retain(|id| canvas.get(id).is_some());

        for object in canvas.objects() {
            match object.kind() {
                SceneObjectKind::Image(media) => self.draw_media(&painter, object.id(), media, offset),
                SceneObjectKind::Stroke(stroke) => draw_stroke(&painter, stroke.points(), stroke.color(), stroke.width(), offset),
            }
        }

        if let Some(preview) = tools.preview_stroke() {
            let brush = preview.brush();
            draw_stroke(&painter, preview.points(), brush.color, brush.width as f32, offset);
        }

        if tools.current() == Tool::Selection {
            let active = canvas.active_object().and_then(|id| canvas.get(id));
            if let Some(object) = active.filter(|object| object.props().controls.corners) {
                if let Some(media) = object.as_media() {
                    draw_handles(&painter, media.rect().translate(offset));
                }
            }
        }
    }

    fn draw_media(&mut self, painter: &Painter, id: usize, media: &MediaObject, offset: Vec2) {
        let rect = media.rect().translate(offset);
        let texture = match self.textures.texture_for(painter.ctx(), id, media.frame_version(), media.frame()) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("Cannot draw object {id}: {err}");
                return;
            }
        };
        let tint = Color32::WHITE.gamma_multiply(media.opacity());
        painter.image(texture, rect, UV, tint);
        if media.is_video() && !media.is_playing() {
            draw_play_badge(painter, rect, media.opacity());
        }
    }
}

/// Round-capped polyline. A single point becomes a dot.
fn draw_stroke(painter: &Painter, points: &[Pos2], color: Color32, width: f32, offset: Vec2) {
    let Some(first) = points.first() else {
        return;
    };
    let radius = width / 2.0;
    if points.len() == 1 {
        painter.circle_filled(*first + offset, radius, color);
        return;
    }
    let screen: Vec<Pos2> = points.iter().map(|p| *p + offset).collect();
    painter.add(Shape::line(screen.clone(), EguiStroke::new(width, color)));
    // egui lines have butt caps
    for point in [screen[0], screen[screen.len() - 1]] {
        painter.circle_filled(point, radius, color);
    }
}

/// Triangle hint on paused videos
fn draw_play_badge(painter: &Painter, rect: Rect, opacity: f32) {
    let size = (rect.width().min(rect.height()) * 0.15).clamp(12.0, 48.0);
    let center = rect.center();
    painter.circle_filled(center, size, Color32::from_black_alpha(120).gamma_multiply(opacity));
    let triangle = vec![
        center + Vec2::new(-size * 0.35, -size * 0.5),
        center + Vec2::new(size * 0.55, 0.0),
        center + Vec2::new(-size * 0.35, size * 0.5),
    ];
    painter.add(Shape::convex_polygon(
        triangle,
        Color32::WHITE.gamma_multiply(opacity),
        EguiStroke::NONE,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushSettings;
    use crate::element::{SceneObject, Stroke};
    use egui::{Context, Id, LayerId, Order};
    use image::RgbaImage;

    #[test]
    fn renders_media_and_strokes_without_panicking() {
        let ctx = Context::default();
        let _ = ctx.run(Default::default(), |ctx| {
            let mut canvas = Canvas::new(Color32::WHITE);
            let mut tools = ToolState::new(BrushSettings::default());
            tools.attach(&mut canvas);
            let media = MediaObject::still(
                RgbaImage::new(20, 10),
                Rect::from_min_size(Pos2::new(5.0, 5.0), Vec2::new(20.0, 10.0)),
            );
            canvas.add(SceneObject::image(media));
            canvas.add(SceneObject::stroke(Stroke::new(
                vec![Pos2::new(1.0, 1.0), Pos2::new(30.0, 30.0)],
                canvas.freehand_brush(),
            )));

            let screen = Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::new(200.0, 100.0));
            let painter = Painter::new(ctx.clone(), LayerId::new(Order::Background, Id::new("test")), screen);
            let mut renderer = Renderer::new();
            renderer.render(&painter, screen, &canvas, &tools);
            assert_eq!(renderer.textures.cache_size(), 1);
        });
    }
}

use egui::{Color32, Pos2, Vec2};
use image::{Rgba, RgbaImage};

use crate::brush::Brush;
use crate::element::{Element, ObjectProps, SceneObject, Stroke};
use crate::tools::Tool;

/// The drawing surface: every scene object in paint order plus the canvas-wide
/// state (background, drawing mode, freehand brush, active object).
///
/// Coordinates are canvas-local, the origin is the top-left corner.
#[derive(Debug)]
pub struct Canvas {
    /// Paint order, later entries render on top
    objects: Vec<SceneObject>,
    background: Color32,
    default_background: Color32,
    drawing_mode: bool,
    freehand_brush: Brush,
    active: Option<usize>,
    size: Vec2,
}

impl Canvas {
    pub fn new(default_background: Color32) -> Self {
        Self {
            objects: Vec::new(),
            background: default_background,
            default_background,
            drawing_mode: true,
            freehand_brush: Brush {
                color: Color32::BLACK,
                width: 5,
            },
            active: None,
            size: Vec2::new(800.0, 600.0),
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id() == id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|object| object.id() == id)
    }

    /// Position in paint order
    pub fn index_of(&self, id: usize) -> Option<usize> {
        self.objects.iter().position(|object| object.id() == id)
    }

    pub fn add(&mut self, object: SceneObject) -> usize {
        let id = object.id();
        self.objects.push(object);
        id
    }

    /// Insert at `index` (clamped to the end)
    pub fn insert(&mut self, index: usize, object: SceneObject) -> usize {
        let id = object.id();
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
        id
    }

    /// Remove an object, returning it with its former paint position.
    pub fn remove(&mut self, id: usize) -> Option<(usize, SceneObject)> {
        let index = self.index_of(id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some((index, self.objects.remove(index)))
    }

    /// Remove every object and reset the background.
    ///
    /// Playing videos are paused. The removed objects and the previous
    /// background are handed back so the clear can be undone.
    pub fn clear(&mut self, now: f64) -> (Vec<SceneObject>, Color32) {
        for object in &mut self.objects {
            if let Some(media) = object.as_media_mut() {
                media.stop_playback(now);
            }
        }
        self.active = None;
        let background = std::mem::replace(&mut self.background, self.default_background);
        log::info!("Clearing canvas ({} objects)", self.objects.len());
        (std::mem::take(&mut self.objects), background)
    }

    /// Put back what [`Canvas::clear`] removed.
    pub fn restore(&mut self, objects: Vec<SceneObject>, background: Color32) {
        self.objects = objects;
        self.background = background;
        self.active = None;
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    pub fn set_background(&mut self, color: Color32) {
        self.background = color;
    }

    pub fn is_drawing_mode(&self) -> bool {
        self.drawing_mode
    }

    pub fn set_drawing_mode(&mut self, on: bool) {
        self.drawing_mode = on;
    }

    pub fn freehand_brush(&self) -> Brush {
        self.freehand_brush
    }

    pub fn set_freehand_brush(&mut self, brush: Brush) {
        self.freehand_brush = brush;
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn active_object(&self) -> Option<usize> {
        self.active
    }

    /// Make `id` the active object. Only selectable objects qualify;
    /// `None` clears the selection. Returns whether `id` became active.
    pub fn set_active(&mut self, id: Option<usize>) -> bool {
        match id {
            None => {
                self.active = None;
                true
            }
            Some(id) => {
                let selectable = self.get(id).is_some_and(|object| object.props().selectable);
                if selectable {
                    self.active = Some(id);
                }
                selectable
            }
        }
    }

    /// Clear the selection, returning what was active
    pub fn discard_active(&mut self) -> Option<usize> {
        self.active.take()
    }

    /// Topmost evented object under `pos`
    pub fn hit_test(&self, pos: Pos2) -> Option<usize> {
        self.objects
            .iter()
            .rev()
            .find(|object| object.props().evented && object.hit_test(pos))
            .map(SceneObject::id)
    }

    /// Add a completed freehand stroke.
    ///
    /// Strokes never take part in selection. An eraser stroke is painted in the
    /// background color, so it goes to the very bottom and every image is
    /// raised above all strokes, otherwise the eraser would paint over images.
    pub fn finish_stroke(&mut self, stroke: Stroke, tool: Tool) -> usize {
        let mut object = SceneObject::stroke(stroke);
        object.set_props(ObjectProps::INERT);
        let id = object.id();

        if tool == Tool::Eraser {
            self.objects.insert(0, object);
            self.raise_images();
        } else {
            self.objects.push(object);
        }
        log::debug!("Stroke {} finished with {:?}, {} objects", id, tool, self.objects.len());
        id
    }

    /// Stable partition: non-images first, then images, each group keeping its
    /// relative order. Running it twice changes nothing.
    pub fn raise_images(&mut self) {
        let (images, others): (Vec<SceneObject>, Vec<SceneObject>) =
            std::mem::take(&mut self.objects).into_iter().partition(SceneObject::is_image);
        self.objects = others;
        self.objects.extend(images);
    }

    /// Current paint order as ids
    pub fn order(&self) -> Vec<usize> {
        self.objects.iter().map(SceneObject::id).collect()
    }

    /// Rearrange into `order`, which must be a permutation of [`Canvas::order`].
    pub fn reorder(&mut self, order: &[usize]) -> bool {
        if order.len() != self.objects.len() || order.iter().any(|id| self.index_of(*id).is_none()) {
            return false;
        }
        let mut remaining = std::mem::take(&mut self.objects);
        for id in order {
            if let Some(index) = remaining.iter().position(|object| object.id() == *id) {
                self.objects.push(remaining.swap_remove(index));
            }
        }
        // Duplicated ids in `order` would leave objects behind; keep them
        self.objects.extend(remaining);
        true
    }

    /// Paint order with `id` moved to the top
    pub fn order_with_on_top(&self, id: usize) -> Vec<usize> {
        let mut order: Vec<usize> = self.order().into_iter().filter(|other| *other != id).collect();
        order.push(id);
        order
    }

    /// Toggle simulated playback of the video `id`. `None` if it isn't a video.
    pub fn toggle_playback(&mut self, id: usize, now: f64) -> Option<bool> {
        let playing = self.get_mut(id)?.as_media_mut()?.toggle_playback(now)?;
        log::info!("Video {} {}", id, if playing { "playing" } else { "paused" });
        Some(playing)
    }

    /// Advance fades and video playback. Returns true if another frame is needed.
    pub fn tick(&mut self, now: f64) -> bool {
        let mut animating = false;
        for object in &mut self.objects {
            if let Some(media) = object.as_media_mut() {
                animating |= media.tick(now);
            }
        }
        animating
    }

    /// Composite the scene into an RGBA buffer of canvas size.
    pub fn rasterize(&self) -> RgbaImage {
        let width = self.size.x.max(1.0).round() as u32;
        let height = self.size.y.max(1.0).round() as u32;
        let bg = self.background;
        let mut target = RgbaImage::from_pixel(width, height, Rgba([bg.r(), bg.g(), bg.b(), 255]));

        for object in &self.objects {
            if let Some(media) = object.as_media() {
                raster::draw_media(&mut target, media);
            } else if let Some(stroke) = object.as_stroke() {
                raster::draw_stroke(&mut target, stroke);
            }
        }
        target
    }

    /// [`Canvas::rasterize`] encoded as PNG
    pub fn export_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        self.rasterize()
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

mod raster {
    use egui::Pos2;
    use image::imageops::{self, FilterType};
    use image::{Rgba, RgbaImage};

    use crate::element::{Element, MediaObject, Stroke};

    pub(super) fn draw_media(target: &mut RgbaImage, media: &MediaObject) {
        let rect = media.rect();
        let width = rect.width().round().max(1.0) as u32;
        let height = rect.height().round().max(1.0) as u32;
        let frame = media.frame();
        let scaled = if (frame.width(), frame.height()) == (width, height) {
            (**frame).clone()
        } else {
            imageops::resize(&**frame, width, height, FilterType::Triangle)
        };

        let opacity = media.opacity();
        let x0 = rect.min.x.round() as i64;
        let y0 = rect.min.y.round() as i64;
        for (x, y, pixel) in scaled.enumerate_pixels() {
            let tx = x0 + i64::from(x);
            let ty = y0 + i64::from(y);
            if tx < 0 || ty < 0 || tx >= i64::from(target.width()) || ty >= i64::from(target.height()) {
                continue;
            }
            blend(target.get_pixel_mut(tx as u32, ty as u32), *pixel, opacity);
        }
    }

    /// Round caps and joins: every pixel within half the width of the path is painted.
    pub(super) fn draw_stroke(target: &mut RgbaImage, stroke: &Stroke) {
        let color = stroke.color();
        let pixel = Rgba([color.r(), color.g(), color.b(), color.a()]);
        let radius = stroke.width() / 2.0;
        let bounds = stroke.rect();

        let min_x = bounds.min.x.floor().max(0.0) as u32;
        let min_y = bounds.min.y.floor().max(0.0) as u32;
        let max_x = (bounds.max.x.ceil() as i64).clamp(0, i64::from(target.width())) as u32;
        let max_y = (bounds.max.y.ceil() as i64).clamp(0, i64::from(target.height())) as u32;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                if stroke.hit_test(center) || within(stroke, center, radius) {
                    blend(target.get_pixel_mut(x, y), pixel, 1.0);
                }
            }
        }
    }

    fn within(stroke: &Stroke, pos: Pos2, radius: f32) -> bool {
        // Thin strokes still cover at least the pixel they pass through
        radius < 0.5
            && stroke
                .points()
                .iter()
                .any(|p| (p.x - pos.x).abs() <= 0.5 && (p.y - pos.y).abs() <= 0.5)
    }

    fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, opacity: f32) {
        let alpha = f32::from(src[3]) / 255.0 * opacity;
        for channel in 0..3 {
            let value = f32::from(src[channel]) * alpha + f32::from(dst[channel]) * (1.0 - alpha);
            dst[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MediaObject;
    use egui::Rect;

    fn image_object(canvas: &mut Canvas, rect: Rect) -> usize {
        let mut object = SceneObject::image(MediaObject::still(RgbaImage::new(10, 10), rect));
        object.set_props(ObjectProps::MOVABLE);
        canvas.add(object)
    }

    #[test]
    fn hit_test_prefers_topmost_and_skips_inert() {
        let mut canvas = Canvas::new(Color32::WHITE);
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::splat(50.0));
        let bottom = image_object(&mut canvas, rect);
        let top = image_object(&mut canvas, rect);
        assert_eq!(canvas.hit_test(Pos2::new(10.0, 10.0)), Some(top));

        canvas.get_mut(top).unwrap().set_props(ObjectProps::INERT);
        assert_eq!(canvas.hit_test(Pos2::new(10.0, 10.0)), Some(bottom));
        assert_eq!(canvas.hit_test(Pos2::new(100.0, 100.0)), None);
    }

    #[test]
    fn only_selectable_objects_become_active() {
        let mut canvas = Canvas::new(Color32::WHITE);
        let id = image_object(&mut canvas, Rect::from_min_size(Pos2::ZERO, Vec2::splat(20.0)));
        assert!(canvas.set_active(Some(id)));
        assert_eq!(canvas.active_object(), Some(id));

        canvas.get_mut(id).unwrap().set_props(ObjectProps::PINNED);
        canvas.discard_active();
        assert!(!canvas.set_active(Some(id)));
        assert_eq!(canvas.active_object(), None);
    }

    #[test]
    fn reorder_rejects_foreign_ids() {
        let mut canvas = Canvas::new(Color32::WHITE);
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::splat(20.0));
        let a = image_object(&mut canvas, rect);
        let b = image_object(&mut canvas, rect);
        assert!(!canvas.reorder(&[a, 999_999]));
        assert!(canvas.reorder(&[b, a]));
        assert_eq!(canvas.order(), vec![b, a]);
        assert_eq!(canvas.order_with_on_top(b), vec![a, b]);
    }

    #[test]
    fn rasterize_paints_background_and_strokes() {
        let mut canvas = Canvas::new(Color32::from_rgb(10, 20, 30));
        canvas.set_size(Vec2::new(40.0, 20.0));
        let brush = Brush {
            color: Color32::RED,
            width: 4,
        };
        canvas.finish_stroke(Stroke::new(vec![Pos2::new(5.0, 10.0), Pos2::new(35.0, 10.0)], brush), Tool::Brush);

        let raster = canvas.rasterize();
        assert_eq!(raster.dimensions(), (40, 20));
        assert_eq!(*raster.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(*raster.get_pixel(20, 10), Rgba([255, 0, 0, 255]));
        assert!(canvas.export_png().unwrap().starts_with(&[0x89, b'P', b'N', b'G']));
    }
}

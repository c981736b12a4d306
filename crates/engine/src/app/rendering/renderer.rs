use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::canvas::Canvas;
use super::glyphs::{line_advance_px, text_width_px};
use super::{DrawList, PerspectiveCamera, Viewport};

const CLEAR_COLOR: [u8; 4] = [18, 22, 30, 255];
const LABEL_TEXT_SCALE: i32 = 2;
const LABEL_GAP_PX: i32 = 4;
const PANEL_TEXT_SCALE: i32 = 2;
const PANEL_PADDING: i32 = 12;
const PANEL_INSET: i32 = 8;
const PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 210];
const PANEL_BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];
const BANNER_TITLE_SCALE: i32 = 4;
const BANNER_DETAIL_SCALE: i32 = 2;
const BANNER_DETAIL_COLOR: [u8; 4] = [176, 198, 220, 255];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    camera: PerspectiveCamera,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport::new(size.width, size.height),
            camera: PerspectiveCamera::default(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            self.viewport = Viewport::new(width, height);
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport::new(width, height);
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> PerspectiveCamera {
        self.camera
    }

    pub fn render(&mut self, draw_list: &DrawList) -> Result<(), Error> {
        if self.viewport.is_empty() {
            return Ok(());
        }
        let viewport = self.viewport;
        let camera = self.camera;
        let mut canvas = Canvas::new(self.pixels.frame_mut(), viewport.width, viewport.height);
        compose_frame(&mut canvas, draw_list, &camera);
        self.pixels.render()
    }
}

/// Paints one frame: backdrop, billboards far to near, billboard labels,
/// inspector panel, banner.
pub(crate) fn compose_frame(canvas: &mut Canvas<'_>, draw_list: &DrawList, camera: &PerspectiveCamera) {
    let viewport = Viewport::new(canvas.width(), canvas.height());
    canvas.clear(CLEAR_COLOR);
    if viewport.is_empty() {
        return;
    }

    if let Some(backdrop) = draw_list.backdrop() {
        canvas.draw_image(0, 0, viewport.width as i32, viewport.height as i32, backdrop);
    }

    let ordered = draw_list.back_to_front();
    let mut labels = Vec::new();
    for billboard in &ordered {
        let Some(rect) = billboard_rect(billboard.position, billboard.scale, camera, viewport) else {
            continue;
        };
        canvas.draw_image(rect.left, rect.top, rect.width, rect.height, &billboard.image);
        if let Some(label) = &billboard.label {
            labels.push((rect, label));
        }
    }
    for (rect, label) in labels {
        let text_width = text_width_px(&label.text, LABEL_TEXT_SCALE);
        let x = rect.left + rect.width / 2 - text_width / 2;
        let y = rect.top - LABEL_GAP_PX - line_advance_px(LABEL_TEXT_SCALE);
        canvas.draw_text(x, y, &label.text, LABEL_TEXT_SCALE, label.color);
    }

    draw_panel(canvas, draw_list);
    draw_banner(canvas, draw_list);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

pub(crate) fn billboard_rect(
    position: crate::app::Vec3,
    scale: crate::app::Vec2,
    camera: &PerspectiveCamera,
    viewport: Viewport,
) -> Option<ScreenRect> {
    let (center_x, center_y, pixels_per_world) = camera.project(position, viewport)?;
    let width = (scale.x.abs() * pixels_per_world).round().max(1.0) as i32;
    let height = (scale.y.abs() * pixels_per_world).round().max(1.0) as i32;
    Some(ScreenRect {
        left: center_x.round() as i32 - width / 2,
        top: center_y.round() as i32 - height / 2,
        width,
        height,
    })
}

fn draw_panel(canvas: &mut Canvas<'_>, draw_list: &DrawList) {
    let lines = draw_list.panel();
    if lines.is_empty() {
        return;
    }
    let widest = lines
        .iter()
        .map(|line| text_width_px(&line.text, PANEL_TEXT_SCALE))
        .max()
        .unwrap_or(0);
    let line_height = line_advance_px(PANEL_TEXT_SCALE);
    let left = PANEL_PADDING - PANEL_INSET;
    let top = PANEL_PADDING - PANEL_INSET;
    let width = widest + PANEL_INSET * 2;
    let height = lines.len() as i32 * line_height + PANEL_INSET * 2;
    canvas.fill_rect(left, top, width, height, PANEL_BG_COLOR);
    canvas.outline_rect(left, top, width, height, PANEL_BORDER_COLOR);

    let mut y = PANEL_PADDING;
    for line in lines {
        canvas.draw_text(PANEL_PADDING, y, &line.text, PANEL_TEXT_SCALE, line.color);
        y += line_height;
    }
}

fn draw_banner(canvas: &mut Canvas<'_>, draw_list: &DrawList) {
    let Some(banner) = draw_list.banner() else {
        return;
    };
    let center_x = canvas.width() as i32 / 2;
    let center_y = canvas.height() as i32 / 2;
    let title_width = text_width_px(&banner.title, BANNER_TITLE_SCALE);
    let title_y = center_y - line_advance_px(BANNER_TITLE_SCALE);
    canvas.draw_text(
        center_x - title_width / 2,
        title_y,
        &banner.title,
        BANNER_TITLE_SCALE,
        banner.color,
    );
    if let Some(detail) = &banner.detail {
        let detail_width = text_width_px(detail, BANNER_DETAIL_SCALE);
        canvas.draw_text(
            center_x - detail_width / 2,
            center_y + LABEL_GAP_PX,
            detail,
            BANNER_DETAIL_SCALE,
            BANNER_DETAIL_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::{Banner, Label, SpriteImage, Vec2, Vec3};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn pixel(frame: &[u8], width: u32, x: i32, y: i32) -> [u8; 4] {
        let offset = ((y as u32 * width + x as u32) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn billboard_rect_scales_with_depth() {
        let camera = PerspectiveCamera::default();
        let viewport = Viewport::new(800, 600);
        let near = billboard_rect(Vec3::new(0.0, 0.0, 0.0), Vec2::new(1.0, 1.0), &camera, viewport)
            .expect("near rect");
        let far = billboard_rect(Vec3::new(0.0, 0.0, -5.0), Vec2::new(1.0, 1.0), &camera, viewport)
            .expect("far rect");

        assert!(far.width < near.width);
        assert_eq!(near.left + near.width / 2, 400);
        assert_eq!(near.top + near.height / 2, 300);
    }

    #[test]
    fn empty_frame_shows_clear_color() {
        let mut frame = vec![0u8; 16 * 16 * 4];
        let mut canvas = Canvas::new(&mut frame, 16, 16);
        compose_frame(&mut canvas, &DrawList::default(), &PerspectiveCamera::default());
        assert_eq!(pixel(&frame, 16, 8, 8), CLEAR_COLOR);
    }

    #[test]
    fn nearer_billboard_is_drawn_over_farther() {
        let mut draw_list = DrawList::default();
        draw_list.billboard(
            Arc::new(SpriteImage::solid(1, 1, BLUE)),
            Vec3::new(0.0, 0.0, 0.5),
            Vec2::new(1.0, 1.0),
            None,
        );
        draw_list.billboard(
            Arc::new(SpriteImage::solid(1, 1, RED)),
            Vec3::new(0.0, 0.0, -0.5),
            Vec2::new(2.0, 2.0),
            None,
        );
        let mut frame = vec![0u8; 64 * 64 * 4];
        let mut canvas = Canvas::new(&mut frame, 64, 64);
        compose_frame(&mut canvas, &draw_list, &PerspectiveCamera::default());

        assert_eq!(pixel(&frame, 64, 32, 32), BLUE);
    }

    #[test]
    fn backdrop_covers_the_viewport() {
        let mut draw_list = DrawList::default();
        draw_list.set_backdrop(Arc::new(SpriteImage::solid(2, 2, BLUE)));
        let mut frame = vec![0u8; 10 * 10 * 4];
        let mut canvas = Canvas::new(&mut frame, 10, 10);
        compose_frame(&mut canvas, &draw_list, &PerspectiveCamera::default());

        assert_eq!(pixel(&frame, 10, 0, 0), BLUE);
        assert_eq!(pixel(&frame, 10, 9, 9), BLUE);
    }

    #[test]
    fn panel_and_banner_draw_without_billboards() {
        let mut draw_list = DrawList::default();
        draw_list.panel_line("ITER 0", [255, 255, 255, 255]);
        draw_list.set_banner(Banner {
            title: "X".to_string(),
            detail: Some("press r".to_string()),
            color: RED,
        });
        let mut frame = vec![0u8; 200 * 120 * 4];
        let mut canvas = Canvas::new(&mut frame, 200, 120);
        compose_frame(&mut canvas, &draw_list, &PerspectiveCamera::default());

        assert_eq!(pixel(&frame, 200, 4, 4), PANEL_BORDER_COLOR);
        let banner_top = 60 - line_advance_px(BANNER_TITLE_SCALE);
        let banner_left = 100 - text_width_px("X", BANNER_TITLE_SCALE) / 2;
        assert_eq!(pixel(&frame, 200, banner_left, banner_top), RED);
    }

    #[test]
    fn label_is_drawn_above_its_billboard() {
        let mut draw_list = DrawList::default();
        draw_list.billboard(
            Arc::new(SpriteImage::solid(1, 1, BLUE)),
            Vec3::new(0.0, 0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Some(Label::new("I", RED)),
        );
        let camera = PerspectiveCamera::default();
        let viewport = Viewport::new(200, 200);
        let rect = billboard_rect(Vec3::new(0.0, 0.0, 0.0), Vec2::new(1.0, 1.0), &camera, viewport)
            .expect("rect");
        let mut frame = vec![0u8; 200 * 200 * 4];
        let mut canvas = Canvas::new(&mut frame, 200, 200);
        compose_frame(&mut canvas, &draw_list, &camera);

        let text_width = text_width_px("I", LABEL_TEXT_SCALE);
        let label_left = rect.left + rect.width / 2 - text_width / 2;
        let label_top = rect.top - LABEL_GAP_PX - line_advance_px(LABEL_TEXT_SCALE);
        assert_eq!(pixel(&frame, 200, label_left, label_top), RED);
    }
}

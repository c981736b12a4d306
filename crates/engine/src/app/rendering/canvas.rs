use crate::app::SpriteImage;

use super::glyphs::{glyph_advance_px, glyph_bits, glyph_lit, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Clipped drawing onto an RGBA8 frame. Every write outside the frame is
/// dropped.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let offset = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?
            .checked_mul(4)?;
        (offset + 4 <= self.frame.len()).then_some(offset)
    }

    /// Source-over blend; fully transparent colors are skipped and opaque
    /// colors overwrite.
    pub(crate) fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let alpha = color[3];
        if alpha == 0 {
            return;
        }
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        let dst = &mut self.frame[offset..offset + 4];
        if alpha == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        let a = alpha as u32;
        for channel in 0..3 {
            let blended = (color[channel] as u32 * a + dst[channel] as u32 * (255 - a)) / 255;
            dst[channel] = blended as u8;
        }
        dst[3] = 255;
    }

    pub(crate) fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: [u8; 4]) {
        let left = x.max(0);
        let top = y.max(0);
        let right = x.saturating_add(width).min(self.width as i32);
        let bottom = y.saturating_add(height).min(self.height as i32);
        for py in top..bottom {
            for px in left..right {
                self.blend_pixel(px, py, color);
            }
        }
    }

    pub(crate) fn outline_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: [u8; 4]) {
        if width <= 1 || height <= 1 {
            return;
        }
        self.fill_rect(x, y, width, 1, color);
        self.fill_rect(x, y + height - 1, width, 1, color);
        self.fill_rect(x, y, 1, height, color);
        self.fill_rect(x + width - 1, y, 1, height, color);
    }

    /// Nearest-neighbour stretch of `image` into the given rectangle.
    pub(crate) fn draw_image(
        &mut self,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        image: &SpriteImage,
    ) {
        if width <= 0 || height <= 0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let draw_left = left.max(0);
        let draw_top = top.max(0);
        let draw_right = left.saturating_add(width).min(self.width as i32);
        let draw_bottom = top.saturating_add(height).min(self.height as i32);
        let x_step = image.width() as f32 / width as f32;
        let y_step = image.height() as f32 / height as f32;

        for out_y in draw_top..draw_bottom {
            let src_y = (((out_y - top) as f32 * y_step) as u32).min(image.height() - 1);
            for out_x in draw_left..draw_right {
                let src_x = (((out_x - left) as f32 * x_step) as u32).min(image.width() - 1);
                if let Some(color) = image.pixel(src_x, src_y) {
                    self.blend_pixel(out_x, out_y, color);
                }
            }
        }
    }

    pub(crate) fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: [u8; 4]) {
        let scale = scale.max(1);
        let mut cursor = x;
        for ch in text.chars() {
            let bits = glyph_bits(ch);
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if glyph_lit(bits, col, row) {
                        self.fill_rect(cursor + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cursor += glyph_advance_px(scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn writes_outside_the_frame_are_dropped() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.fill_rect(-10, -10, 100, 2, [9, 9, 9, 255]);
        canvas.blend_pixel(4, 0, [1, 1, 1, 255]);
        canvas.draw_text(-50, 100, "offscreen", 3, [1, 1, 1, 255]);

        assert_eq!(pixel(&frame, 4, 3, 1), [9, 9, 9, 255]);
        assert_eq!(pixel(&frame, 4, 0, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn zero_sized_canvas_is_safe() {
        let mut frame = Vec::new();
        let mut canvas = Canvas::new(&mut frame, 0, 0);
        canvas.clear([1, 2, 3, 4]);
        canvas.fill_rect(0, 0, 5, 5, [1, 1, 1, 255]);
        canvas.draw_image(0, 0, 3, 3, &SpriteImage::solid(2, 2, [1, 1, 1, 255]));
        assert!(frame.is_empty());
    }

    #[test]
    fn half_alpha_blends_toward_source() {
        let mut frame = vec![0u8; 4];
        let mut canvas = Canvas::new(&mut frame, 1, 1);
        canvas.clear([0, 0, 0, 255]);
        canvas.blend_pixel(0, 0, [255, 100, 0, 128]);
        assert_eq!(pixel(&frame, 1, 0, 0), [128, 50, 0, 255]);
    }

    #[test]
    fn image_is_stretched_to_target_rect() {
        let rgba = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 0, 0, 0, 0,
        ];
        let image = SpriteImage::from_rgba(2, 2, rgba).expect("2x2 image");
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.draw_image(0, 0, 4, 4, &image);

        assert_eq!(pixel(&frame, 4, 1, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 4, 2, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 4, 0, 3), [0, 0, 255, 255]);
        assert_eq!(pixel(&frame, 4, 3, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn text_lights_glyph_pixels() {
        let mut frame = vec![0u8; 8 * 6 * 4];
        let mut canvas = Canvas::new(&mut frame, 8, 6);
        canvas.draw_text(0, 0, "T", 1, [255, 255, 255, 255]);

        assert_eq!(pixel(&frame, 8, 0, 0), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 8, 1, 4), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 8, 0, 4), [0, 0, 0, 0]);
    }
}

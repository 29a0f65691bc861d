//! Rasterizer for wireframe display lists

use super::layout::{Rgba, CELL};
use super::paint::PaintCommand;
use image::{Rgba as Pixel, RgbaImage};

/// Paint `commands` onto a white `width` x `height` CSS-pixel canvas
/// supersampled by `scale`.
///
/// Glyphs are drawn as filled cells ("greeked" text); whitespace is left blank.
pub fn rasterize(commands: &[PaintCommand], width: u32, height: u32, scale: f32) -> RgbaImage {
    let dev_w = ((width as f32 * scale).ceil() as u32).max(1);
    let dev_h = ((height as f32 * scale).ceil() as u32).max(1);
    let mut img = RgbaImage::from_pixel(dev_w, dev_h, Pixel([255, 255, 255, 255]));

    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                fill_rect(&mut img, *x as f32, *y as f32, *width as f32, *height as f32, *rgba, scale);
            }
            PaintCommand::Text { x, y, text, scale: text_scale, rgba } => {
                let cell = (CELL * text_scale) as f32;
                let unit = *text_scale as f32;
                for (row, line) in text.lines().enumerate() {
                    for (col, ch) in line.chars().enumerate() {
                        if ch.is_whitespace() {
                            continue;
                        }
                        let cx = *x as f32 + col as f32 * cell;
                        let cy = *y as f32 + row as f32 * cell;
                        fill_rect(&mut img, cx + unit, cy + unit, cell - 2.0 * unit, cell - 2.0 * unit, *rgba, scale);
                    }
                }
            }
        }
    }
    img
}

fn fill_rect(img: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, rgba: Rgba, scale: f32) {
    let (img_w, img_h) = img.dimensions();
    let x0 = ((x * scale).round().max(0.0) as u32).min(img_w);
    let y0 = ((y * scale).round().max(0.0) as u32).min(img_h);
    let x1 = (((x + w) * scale).round().max(0.0) as u32).min(img_w);
    let y1 = (((y + h) * scale).round().max(0.0) as u32).min(img_h);
    let (r, g, b, a) = rgba;
    for py in y0..y1 {
        for px in x0..x1 {
            let dst = img.get_pixel_mut(px, py);
            *dst = blend(*dst, Pixel([r, g, b, a]));
        }
    }
}

fn blend(dst: Pixel<u8>, src: Pixel<u8>) -> Pixel<u8> {
    let a = src.0[3] as u32;
    if a == 255 {
        return src;
    }
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
    Pixel([mix(src.0[0], dst.0[0]), mix(src.0[1], dst.0[1]), mix(src.0[2], dst.0[2]), 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_is_supersampled() {
        let img = rasterize(&[], 128, 64, 2.0);
        assert_eq!(img.dimensions(), (256, 128));
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn rects_land_at_device_coordinates() {
        let cmds = [PaintCommand::SolidRect { x: 10, y: 10, width: 5, height: 5, rgba: (0, 0, 255, 255) }];
        let img = rasterize(&cmds, 32, 32, 2.0);
        assert_eq!(img.get_pixel(20, 20).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(29, 29).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(30, 30).0, [255, 255, 255, 255]);
    }

    #[test]
    fn text_cells_skip_whitespace() {
        let cmds = [PaintCommand::Text { x: 0, y: 0, text: "a b".into(), scale: 1, rgba: (0, 0, 0, 255) }];
        let img = rasterize(&cmds, 24, 8, 1.0);
        assert_eq!(img.get_pixel(3, 3).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(11, 3).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(19, 3).0, [0, 0, 0, 255]);
    }
}

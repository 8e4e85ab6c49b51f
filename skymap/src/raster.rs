//! Software rasterizer for frames.

use image::{Rgb, RgbImage};

use crate::render::{DrawCommand, Frame, Glow};

/// Glows smaller than this still light the pixel under their center
const MIN_RASTER_RADIUS: f64 = 0.75;

/// How a glow combines with the pixels already drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Add the weighted color, saturating at 255
    #[default]
    Additive,
    /// Alpha-composite over the existing color
    Over,
}

/// Rasterize a frame with additive blending
pub fn rasterize(frame: &Frame) -> RgbImage {
    rasterize_with(frame, BlendMode::Additive)
}

pub fn rasterize_with(frame: &Frame, mode: BlendMode) -> RgbImage {
    let width = pixel_dimension(frame.size.width);
    let height = pixel_dimension(frame.size.height);
    let mut img = RgbImage::new(width, height);
    for command in &frame.commands {
        draw_command(&mut img, command, mode);
    }
    img
}

/// Execute one draw command against an image
pub fn draw_command(img: &mut RgbImage, command: &DrawCommand, mode: BlendMode) {
    match command {
        DrawCommand::Clear(color) => {
            let fill = Rgb(color.to_array());
            img.pixels_mut().for_each(|px| *px = fill);
        }
        DrawCommand::Glow(glow) => draw_glow(img, glow, mode),
    }
}

fn draw_glow(img: &mut RgbImage, glow: &Glow, mode: BlendMode) {
    if !(glow.x.is_finite() && glow.y.is_finite() && glow.alpha > 0.0) {
        return;
    }
    let radius = glow.radius.max(MIN_RASTER_RADIUS);
    let extent = glow.extent().max(radius);

    let x0 = (glow.x - extent).floor().max(0.0) as u32;
    let y0 = (glow.y - extent).floor().max(0.0) as u32;
    let x1 = ((glow.x + extent).ceil().max(0.0) as u32).min(img.width());
    let y1 = ((glow.y + extent).ceil().max(0.0) as u32).min(img.height());

    let color = glow.color.to_array();
    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f64 + 0.5 - glow.x;
            let dy = py as f64 + 0.5 - glow.y;
            let dist = dx.hypot(dy);
            if dist >= radius {
                continue;
            }
            let weight = glow.alpha.min(1.0) * (1.0 - dist / radius);
            let pixel = img.get_pixel_mut(px, py);
            for (dst, &src) in pixel.0.iter_mut().zip(color.iter()) {
                *dst = blend(*dst, src, weight, mode);
            }
        }
    }
}

fn blend(dst: u8, src: u8, weight: f64, mode: BlendMode) -> u8 {
    let value = match mode {
        BlendMode::Additive => dst as f64 + src as f64 * weight,
        BlendMode::Over => dst as f64 * (1.0 - weight) + src as f64 * weight,
    };
    value.round().clamp(0.0, 255.0) as u8
}

fn pixel_dimension(size: f64) -> u32 {
    if size.is_finite() && size > 0.0 {
        size.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

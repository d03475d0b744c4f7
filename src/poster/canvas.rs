use image::{Rgb, RgbImage};
use rand::Rng;
use resvg::tiny_skia::Pixmap;

/// Backgrounds for the offline poster.
pub const PALETTE: [Rgb<u8>; 4] = [
    Rgb([0x0f, 0x17, 0x2a]),
    Rgb([0x1c, 0x1c, 0x1c]),
    Rgb([0x1f, 0x29, 0x33]),
    Rgb([0x11, 0x18, 0x27]),
];

/// Share of black blended into photos so white text stays readable.
pub const DARKEN_ALPHA: f32 = 0.35;

pub fn pick_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb<u8> {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

pub fn solid_canvas(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Blend toward black: `c * (1 - alpha)`.
pub fn darken(img: &mut RgbImage, alpha: f32) {
    let keep = (1.0 - alpha).clamp(0.0, 1.0);
    for px in img.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = (*c as f32 * keep).round() as u8;
        }
    }
}

/// Source-over of a premultiplied RGBA overlay onto an opaque base of the same size.
pub fn composite_over(base: &mut RgbImage, overlay: &Pixmap) {
    if base.dimensions() != (overlay.width(), overlay.height()) {
        tracing::warn!(
            base = ?base.dimensions(),
            overlay = ?(overlay.width(), overlay.height()),
            "overlay size mismatch, skipping text"
        );
        return;
    }
    for (px, src) in base.pixels_mut().zip(overlay.data().chunks_exact(4)) {
        let a = src[3] as u16;
        if a == 0 {
            continue;
        }
        let inv = 255 - a;
        for i in 0..3 {
            let dst = px.0[i] as u16;
            px.0[i] = (src[i] as u16 + (dst * inv + 127) / 255).min(255) as u8;
        }
    }
}

//! Software rasterizer backing a [`Canvas`](crate::canvas::Canvas) with an
//! in-memory RGBA image.
//!
//! Coverage is binary (no anti-aliasing); every write is source-over
//! blended. Good enough for previews, thumbnails and headless rendering.

use crate::canvas::{Paint, Surface};
use crate::color::Rgba;
use crate::error::ParticlesError;
use glam::Vec2;
use image::{Rgba as Pixel, RgbaImage};
use std::path::Path;

/// A [`Surface`] that draws into an [`RgbaImage`].
#[derive(Debug, Clone)]
pub struct ImageSurface {
    pixels: RgbaImage,
    background: [u8; 4],
}

impl ImageSurface {
    /// Transparent surface of the given pixel size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            background: [0, 0, 0, 0],
        }
    }

    /// Color written by `clear_rect`.
    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background.to_bytes();
        for pixel in self.pixels.pixels_mut() {
            *pixel = Pixel(self.background);
        }
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Write the current pixels to disk. The format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParticlesError> {
        self.pixels.save(path)?;
        Ok(())
    }

    fn blend(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.pixels.width() as i64 || y >= self.pixels.height() as i64 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        *dst = Pixel(source_over(color, dst.0));
    }

    /// Pixel bounds of a box, clamped to the image.
    fn bounds(&self, min: Vec2, max: Vec2) -> (i64, i64, i64, i64) {
        let w = self.pixels.width() as i64;
        let h = self.pixels.height() as i64;
        (
            (min.x.floor() as i64).max(0),
            (min.y.floor() as i64).max(0),
            (max.x.ceil() as i64).min(w),
            (max.y.ceil() as i64).min(h),
        )
    }

    fn fill_where(&mut self, min: Vec2, max: Vec2, color: [u8; 4], inside: impl Fn(Vec2) -> bool) {
        let (x0, y0, x1, y1) = self.bounds(min, max);
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if inside(center) {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

/// Source-over compositing of straight-alpha RGBA bytes.
fn source_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    out
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn point_in_polygon(p: Vec2, points: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl Surface for ImageSurface {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let (x0, y0, x1, y1) = self.bounds(Vec2::new(x, y), Vec2::new(x + width, y + height));
        let background = Pixel(self.background);
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels.put_pixel(px as u32, py as u32, background);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        let r_sq = radius * radius;
        let reach = Vec2::splat(radius);
        self.fill_where(center - reach, center + reach, paint.fill.to_bytes(), |p| {
            p.distance_squared(center) <= r_sq
        });

        if let Some(stroke) = paint.stroke.filter(|s| s.width > 0.0) {
            let outer = radius + stroke.width;
            let reach = Vec2::splat(outer);
            self.fill_where(center - reach, center + reach, stroke.color.to_bytes(), |p| {
                let d = p.distance(center);
                d > radius && d <= outer
            });
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        if points.len() < 3 {
            return;
        }
        let min = points.iter().copied().fold(Vec2::splat(f32::MAX), Vec2::min);
        let max = points.iter().copied().fold(Vec2::splat(f32::MIN), Vec2::max);
        self.fill_where(min, max, paint.fill.to_bytes(), |p| point_in_polygon(p, points));

        if let Some(stroke) = paint.stroke.filter(|s| s.width > 0.0) {
            for i in 0..points.len() {
                let next = points[(i + 1) % points.len()];
                self.stroke_line(points[i], next, stroke.color, stroke.width);
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        let half = (width * 0.5).max(0.5);
        let reach = Vec2::splat(half);
        self.fill_where(from.min(to) - reach, from.max(to) + reach, color.to_bytes(), |p| {
            distance_to_segment(p, from, to) <= half
        });
    }

    fn draw_image(&mut self, image: &RgbaImage, center: Vec2, size: Vec2, opacity: f32) {
        if image.width() == 0 || image.height() == 0 || size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let origin = center - size * 0.5;
        let (x0, y0, x1, y1) = self.bounds(origin, origin + size);
        let scale = Vec2::new(image.width() as f32, image.height() as f32) / size;
        for y in y0..y1 {
            for x in x0..x1 {
                let local = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - origin) * scale;
                let sx = (local.x as u32).min(image.width() - 1);
                let sy = (local.y as u32).min(image.height() - 1);
                let mut src = image.get_pixel(sx, sy).0;
                src[3] = (src[3] as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
                self.blend(x, y, src);
            }
        }
    }

    fn snapshot(&self) -> Option<RgbaImage> {
        Some(self.pixels.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Stroke;
    use crate::color::Rgb;

    #[test]
    fn test_source_over() {
        assert_eq!(source_over([255, 0, 0, 255], [0, 0, 255, 255]), [255, 0, 0, 255]);
        assert_eq!(source_over([0, 0, 0, 0], [10, 20, 30, 255]), [10, 20, 30, 255]);
        let half = source_over([255, 255, 255, 128], [0, 0, 0, 255]);
        assert_eq!(half[3], 255);
        assert!(half[0] > 120 && half[0] < 136);
    }

    #[test]
    fn test_fill_circle() {
        let mut surface = ImageSurface::new(20, 20);
        surface.fill_circle(Vec2::new(10.0, 10.0), 4.0, &Paint::fill(Rgb::WHITE.with_alpha(1.0)));
        let img = surface.image();
        assert_eq!(img.get_pixel(10, 10).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(10, 16).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_circle_stroke_ring() {
        let mut surface = ImageSurface::new(20, 20);
        let paint = Paint {
            fill: Rgb::WHITE.with_alpha(1.0),
            stroke: Some(Stroke {
                color: Rgb::new(255, 0, 0).with_alpha(1.0),
                width: 2.0,
            }),
        };
        surface.fill_circle(Vec2::new(10.0, 10.0), 4.0, &paint);
        assert_eq!(surface.image().get_pixel(15, 10).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_clear_uses_background() {
        let mut surface = ImageSurface::new(4, 4).with_background(Rgb::new(1, 2, 3).with_alpha(1.0));
        surface.fill_circle(Vec2::new(2.0, 2.0), 2.0, &Paint::fill(Rgb::WHITE.with_alpha(1.0)));
        surface.clear_rect(0.0, 0.0, 4.0, 4.0);
        assert!(surface.image().pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }

    #[test]
    fn test_line_and_polygon() {
        let mut surface = ImageSurface::new(10, 10);
        surface.stroke_line(Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0), Rgb::WHITE.with_alpha(1.0), 1.0);
        assert_eq!(surface.image().get_pixel(3, 4).0[3], 255);
        assert_eq!(surface.image().get_pixel(3, 0).0[3], 0);

        let mut surface = ImageSurface::new(10, 10);
        let square = [
            Vec2::new(2.0, 2.0),
            Vec2::new(8.0, 2.0),
            Vec2::new(8.0, 8.0),
            Vec2::new(2.0, 8.0),
        ];
        surface.fill_polygon(&square, &Paint::fill(Rgb::WHITE.with_alpha(1.0)));
        assert_eq!(surface.image().get_pixel(5, 5).0[3], 255);
        assert_eq!(surface.image().get_pixel(9, 9).0[3], 0);
    }

    #[test]
    fn test_draw_image_scaled() {
        let mut sprite = RgbaImage::new(2, 2);
        for p in sprite.pixels_mut() {
            *p = Pixel([0, 255, 0, 255]);
        }
        let mut surface = ImageSurface::new(10, 10);
        surface.draw_image(&sprite, Vec2::new(5.0, 5.0), Vec2::new(4.0, 4.0), 1.0);
        assert_eq!(surface.image().get_pixel(5, 5).0, [0, 255, 0, 255]);
        assert_eq!(surface.image().get_pixel(0, 0).0[3], 0);
    }
}

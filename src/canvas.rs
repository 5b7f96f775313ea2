//! The drawing surface particles render into.
//!
//! [`Canvas`] is what the simulation talks to: it knows the logical size
//! and pixel ratio and forwards draw calls to an optional [`Surface`].
//! Without a surface every call is a no-op, so a population can be
//! simulated headless.
//!
//! Two surfaces ship with the crate:
//! - [`ImageSurface`](crate::raster::ImageSurface) rasterizes into an
//!   `image::RgbaImage`
//! - [`RecordingSurface`] records [`DrawCommand`]s, handy for tests and
//!   for hosts that replay commands into their own renderer

use crate::color::Rgba;
use glam::Vec2;
use image::RgbaImage;
use std::cell::RefCell;
use std::rc::Rc;

/// An outline drawn around a filled shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

/// Fill and optional stroke for a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub fill: Rgba,
    pub stroke: Option<Stroke>,
}

impl Paint {
    pub fn fill(fill: Rgba) -> Self {
        Self { fill, stroke: None }
    }
}

/// A 2D drawing backend.
pub trait Surface {
    /// Clear pixels in the given rectangle.
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);

    /// Fill a closed polygon (even-odd rule).
    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);

    /// Draw `image` scaled to `size`, centered on `center`.
    fn draw_image(&mut self, image: &RgbaImage, center: Vec2, size: Vec2, opacity: f32);

    /// Draw an SVG document. Surfaces that cannot render vector data ignore it.
    fn draw_svg(&mut self, _svg: &str, _center: Vec2, _size: Vec2, _opacity: f32) {}

    /// Copy of the current pixels, if this surface has any.
    fn snapshot(&self) -> Option<RgbaImage> {
        None
    }
}

/// The simulation's view of the drawing surface.
pub struct Canvas {
    surface: Option<Box<dyn Surface>>,
    /// Width in device pixels.
    pub width: f32,
    /// Height in device pixels.
    pub height: f32,
    /// Device pixels per logical pixel.
    pub pixel_ratio: f32,
}

impl Canvas {
    /// A canvas of the given device-pixel size with no surface attached.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            surface: None,
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_surface(mut self, surface: impl Surface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    pub fn set_surface(&mut self, surface: Option<Box<dyn Surface>>) {
        self.surface = surface;
    }

    #[inline]
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Clear the whole canvas.
    pub fn clear(&mut self) {
        let (w, h) = (self.width, self.height);
        if let Some(surface) = self.surface.as_mut() {
            surface.clear_rect(0.0, 0.0, w, h);
        }
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if let Some(surface) = self.surface.as_mut() {
            surface.fill_circle(center, radius, paint);
        }
    }

    pub fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        if let Some(surface) = self.surface.as_mut() {
            surface.fill_polygon(points, paint);
        }
    }

    pub fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        if let Some(surface) = self.surface.as_mut() {
            surface.stroke_line(from, to, color, width);
        }
    }

    pub fn draw_image(&mut self, image: &RgbaImage, center: Vec2, size: Vec2, opacity: f32) {
        if let Some(surface) = self.surface.as_mut() {
            surface.draw_image(image, center, size, opacity);
        }
    }

    pub fn draw_svg(&mut self, svg: &str, center: Vec2, size: Vec2, opacity: f32) {
        if let Some(surface) = self.surface.as_mut() {
            surface.draw_svg(svg, center, size, opacity);
        }
    }

    pub fn snapshot(&self) -> Option<RgbaImage> {
        self.surface.as_ref().and_then(|s| s.snapshot())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_ratio", &self.pixel_ratio)
            .field("has_surface", &self.has_surface())
            .finish()
    }
}

/// A draw call captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { x: f32, y: f32, width: f32, height: f32 },
    Circle { center: Vec2, radius: f32, paint: Paint },
    Polygon { points: Vec<Vec2>, paint: Paint },
    Line { from: Vec2, to: Vec2, color: Rgba, width: f32 },
    Image { center: Vec2, size: Vec2, opacity: f32 },
    Svg { svg: String, center: Vec2, size: Vec2, opacity: f32 },
}

/// Shared handle to the commands a [`RecordingSurface`] has captured.
///
/// Keep a clone before moving the surface into a canvas.
#[derive(Debug, Clone, Default)]
pub struct DrawLog(Rc<RefCell<Vec<DrawCommand>>>);

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, command: DrawCommand) {
        self.0.borrow_mut().push(command);
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Number of recorded commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }
}

/// A surface that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: DrawLog,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record into an existing log.
    pub fn with_log(log: DrawLog) -> Self {
        Self { log }
    }

    pub fn log(&self) -> DrawLog {
        self.log.clone()
    }
}

impl Surface for RecordingSurface {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.log.record(DrawCommand::Clear { x, y, width, height });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.log.record(DrawCommand::Circle {
            center,
            radius,
            paint: *paint,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        self.log.record(DrawCommand::Polygon {
            points: points.to_vec(),
            paint: *paint,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.log.record(DrawCommand::Line { from, to, color, width });
    }

    fn draw_image(&mut self, _image: &RgbaImage, center: Vec2, size: Vec2, opacity: f32) {
        self.log.record(DrawCommand::Image { center, size, opacity });
    }

    fn draw_svg(&mut self, svg: &str, center: Vec2, size: Vec2, opacity: f32) {
        self.log.record(DrawCommand::Svg {
            svg: svg.to_string(),
            center,
            size,
            opacity,
        });
    }
}

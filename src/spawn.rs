//! Spawn context for particle initialization.
//!
//! Every new particle is built from a [`SpawnContext`]: a short-lived view
//! of the container holding the options, canvas size, random source and
//! shape assets, plus where existing particles already sit.

use crate::container::SvgSource;
use crate::options::Options;
use glam::Vec2;
use image::RgbaImage;
use rand::rngs::SmallRng;
use rand::Rng;

/// A seed position for new particles, usually the pointer location.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coordinates {
    pub x: f32,
    pub y: f32,
}

impl Coordinates {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for Coordinates {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Coordinates> for Vec2 {
    fn from(c: Coordinates) -> Self {
        Vec2::new(c.x, c.y)
    }
}

/// Space taken by a particle, used to avoid spawning on top of others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub position: Vec2,
    pub radius: f32,
}

impl Footprint {
    #[inline]
    pub fn overlaps(&self, position: Vec2, radius: f32) -> bool {
        self.position.distance(position) < self.radius + radius
    }
}

/// Context handed to [`ParticleTrait::spawn`](crate::ParticleTrait::spawn).
pub struct SpawnContext<'a> {
    /// Index of the particle within this batch (0 to count-1).
    pub index: usize,
    /// Number of particles in this batch.
    pub count: usize,
    pub options: &'a Options,
    /// Canvas size in device pixels.
    pub canvas_size: Vec2,
    pushing: bool,
    occupied: &'a [Footprint],
    svg: &'a mut SvgSource,
    image: Option<&'a RgbaImage>,
    rng: &'a mut SmallRng,
}

impl<'a> SpawnContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        index: usize,
        count: usize,
        options: &'a Options,
        canvas_size: Vec2,
        pushing: bool,
        occupied: &'a [Footprint],
        svg: &'a mut SvgSource,
        image: Option<&'a RgbaImage>,
        rng: &'a mut SmallRng,
    ) -> Self {
        Self {
            index,
            count,
            options,
            canvas_size,
            pushing,
            occupied,
            svg,
            image,
            rng,
        }
    }

    /// Whether this particle is created by a bulk push rather than the
    /// initial `create`.
    #[inline]
    pub fn is_pushing(&self) -> bool {
        self.pushing
    }

    /// Particles that already exist, including earlier ones in this batch.
    #[inline]
    pub fn occupied(&self) -> &[Footprint] {
        self.occupied
    }

    /// Loaded SVG source for image shapes, if any.
    pub fn svg_source(&self) -> Option<&str> {
        self.svg.source.as_deref()
    }

    /// Count one more particle using the SVG source.
    pub fn register_svg_use(&mut self) {
        self.svg.count += 1;
    }

    /// Loaded raster image for image shapes, if any.
    pub fn image(&self) -> Option<&'a RgbaImage> {
        self.image
    }

    /// Direct access to the random source.
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut *self.rng
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `min..max`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if min < max {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Uniform random point on the canvas.
    pub fn random_position(&mut self) -> Vec2 {
        Vec2::new(self.random() * self.canvas_size.x, self.random() * self.canvas_size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_helpers() {
        let options = Options::default();
        let mut svg = SvgSource::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ctx = SpawnContext::new(0, 1, &options, Vec2::new(100.0, 50.0), false, &[], &mut svg, None, &mut rng);

        for _ in 0..100 {
            let p = ctx.random_position();
            assert!(p.x >= 0.0 && p.x < 100.0);
            assert!(p.y >= 0.0 && p.y < 50.0);
            let r = ctx.random_range(-0.5, 0.5);
            assert!((-0.5..0.5).contains(&r));
        }
        assert_eq!(ctx.random_range(2.0, 2.0), 2.0);
        assert!(!ctx.is_pushing());
    }

    #[test]
    fn test_svg_counter() {
        let options = Options::default();
        let mut svg = SvgSource {
            source: Some("<svg/>".into()),
            count: 0,
        };
        let mut rng = SmallRng::seed_from_u64(2);
        {
            let mut ctx = SpawnContext::new(0, 1, &options, Vec2::ONE, true, &[], &mut svg, None, &mut rng);
            assert_eq!(ctx.svg_source(), Some("<svg/>"));
            ctx.register_svg_use();
            assert!(ctx.is_pushing());
        }
        assert_eq!(svg.count, 1);
    }

    #[test]
    fn test_footprint_overlap() {
        let f = Footprint {
            position: Vec2::ZERO,
            radius: 2.0,
        };
        assert!(f.overlaps(Vec2::new(3.0, 0.0), 1.5));
        assert!(!f.overlaps(Vec2::new(3.0, 0.0), 1.0));
    }
}

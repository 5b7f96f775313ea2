//! The particle population manager.
//!
//! [`Particles`] owns the ordered population and drives the per-frame cycle:
//!
//! 1. [`draw`](Particles::draw) clears the canvas, runs
//!    [`update`](Particles::update), then draws every particle.
//! 2. `update` advances each particle (motion, parallax, opacity, size,
//!    out-of-canvas handling), applies the active pointer modes, and, when
//!    linking or attraction is on, sweeps every unordered pair once.
//!
//! Bulk changes ([`push`](Particles::push), [`remove`](Particles::remove))
//! redraw immediately when continuous motion is off, since no frame loop
//! would otherwise show them.

use crate::color::Rgb;
use crate::container::Container;
use crate::error::ParticlesError;
use crate::modes::InteractionMode;
use crate::particle::{Frame, Particle, ParticleTrait};
use crate::spawn::{Coordinates, Footprint};
use log::{debug, info};

/// An ordered population of particles.
///
/// Insertion order matters only for removal, which always evicts the
/// oldest particles first.
#[derive(Debug, Clone)]
pub struct Particles<P: ParticleTrait = Particle> {
    array: Vec<P>,
    pushing: bool,
    link_color: Option<Rgb>,
}

impl<P: ParticleTrait> Particles<P> {
    /// An empty population.
    pub fn new() -> Self {
        Self {
            array: Vec::new(),
            pushing: false,
            link_color: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.array.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.array.iter()
    }

    pub fn get(&self, index: usize) -> Option<&P> {
        self.array.get(index)
    }

    pub fn as_slice(&self) -> &[P] {
        &self.array
    }

    /// True only while [`push`](Self::push) is running.
    #[inline]
    pub fn is_pushing(&self) -> bool {
        self.pushing
    }

    /// Cached link color, once a link or grab line has resolved it.
    pub fn link_color(&self) -> Option<Rgb> {
        self.link_color
    }

    /// Append `options.particles.number.value` new particles.
    ///
    /// Adds to whatever is already there; call [`empty`](Self::empty) first
    /// for a fresh population.
    pub fn create(&mut self, container: &mut Container) {
        let count = container.options.particles.number.value;
        self.spawn_batch(container, count, None);
        debug!("created {} particles", count);
    }

    /// Advance every particle by `delta` and run pointer and pairwise
    /// effects.
    pub fn update(&mut self, container: &mut Container, delta: f32) {
        let options = &container.options;
        let hover = options.interactivity.events.onhover.mode;
        let click = options.interactivity.events.onclick.mode;
        let linked = options.particles.line_linked.enable;
        let attract = options.particles.movement.attract.enable;
        let bounce = options.particles.movement.bounce;

        let grab = hover.contains(InteractionMode::Grab);
        let bubble = hover.contains(InteractionMode::Bubble) || click.contains(InteractionMode::Bubble);
        let repulse = hover.contains(InteractionMode::Repulse) || click.contains(InteractionMode::Repulse);

        let population = self.array.len();
        let mut frame = Frame::new(container, &mut self.link_color, population);

        for i in 0..population {
            let (head, tail) = self.array.split_at_mut(i + 1);
            let p = &mut head[i];

            p.move_by(&mut frame, delta);
            p.move_parallax(&mut frame);
            p.update_opacity(&mut frame);
            p.update_size(&mut frame);
            p.fix_out_of_canvas_position(&mut frame);
            p.update_out_mode(&mut frame);

            if grab {
                p.grab(&mut frame);
            }
            if bubble {
                p.bubble(&mut frame);
            }
            if repulse {
                p.repulse(&mut frame);
            }

            if linked || attract {
                for p2 in tail.iter_mut() {
                    if linked {
                        p.link(p2, &mut frame);
                    }
                    if attract {
                        p.attract(p2, &mut frame);
                    }
                    if bounce {
                        p.bounce(p2, &mut frame);
                    }
                }
            }
        }
    }

    /// Clear the canvas, update, then draw every particle.
    pub fn draw(&mut self, container: &mut Container, delta: f32) {
        container.canvas.clear();

        self.update(container, delta);

        let mut frame = Frame::new(container, &mut self.link_color, self.array.len());
        for p in &self.array {
            p.draw(&mut frame);
        }
    }

    /// Drop every particle. Nothing is redrawn.
    pub fn empty(&mut self) {
        self.array.clear();
    }

    /// Append `count` particles, seeded at `position` when given.
    ///
    /// Spawned particles see [`is_pushing`](Self::is_pushing) through their
    /// spawn context. With continuous motion off the population is redrawn
    /// once, with a zero delta, before returning.
    pub fn push(&mut self, container: &mut Container, count: usize, position: Option<Coordinates>) {
        self.pushing = true;

        self.spawn_batch(container, count, position);
        debug!("pushed {} particles, population {}", count, self.array.len());

        if !container.options.particles.movement.enable {
            self.draw(container, 0.0);
        }

        self.pushing = false;
    }

    /// Remove the `count` oldest particles, or all of them if there are
    /// fewer. With continuous motion off the population is redrawn once.
    pub fn remove(&mut self, container: &mut Container, count: usize) {
        let n = count.min(self.array.len());
        self.array.drain(..n);
        debug!("removed {} particles, population {}", n, self.array.len());

        if !container.options.particles.movement.enable {
            self.draw(container, 0.0);
        }
    }

    /// Reset everything and restart.
    ///
    /// Cancels pending frames, drops the loaded shape assets, empties the
    /// population, clears the canvas and the link color, then awaits
    /// [`Container::start`]. A failed restart is returned as is.
    pub async fn refresh(&mut self, container: &mut Container) -> Result<(), ParticlesError> {
        info!("refreshing {} particles", self.array.len());

        container.cancel_animation_frames();

        container.svg.clear();
        container.img.clear();

        self.empty();

        container.canvas.clear();

        self.link_color = None;

        container.start(self).await
    }

    fn spawn_batch(&mut self, container: &mut Container, count: usize, position: Option<Coordinates>) {
        let mut occupied: Vec<Footprint> = self.array.iter().map(P::footprint).collect();
        self.array.reserve(count);

        for index in 0..count {
            let particle = {
                let mut ctx = container.spawn_context(index, count, self.pushing, &occupied);
                P::spawn(&mut ctx, position)
            };
            occupied.push(particle.footprint());
            self.array.push(particle);
        }
    }
}

impl<P: ParticleTrait> Default for Particles<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, P: ParticleTrait> IntoIterator for &'a Particles<P> {
    type Item = &'a P;
    type IntoIter = std::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.array.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, DrawCommand, DrawLog, RecordingSurface};
    use crate::options::Options;

    fn container(count: usize) -> Container {
        let mut options = Options::default();
        options.particles.number.value = count;
        Container::new(options, 400.0, 300.0).with_seed(7)
    }

    #[test]
    fn test_create_appends() {
        let mut container = container(5);
        let mut particles: Particles = Particles::new();
        particles.create(&mut container);
        particles.create(&mut container);
        assert_eq!(particles.len(), 10);
    }

    #[test]
    fn test_remove_is_oldest_first_and_saturating() {
        let mut container = container(0);
        let mut particles: Particles = Particles::new();
        for x in 0..4 {
            particles.push(&mut container, 1, Some(Coordinates::new(50.0 + x as f32 * 10.0, 50.0)));
        }

        particles.remove(&mut container, 2);
        let xs: Vec<f32> = particles.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![70.0, 80.0]);

        particles.remove(&mut container, 10);
        assert!(particles.is_empty());
        particles.remove(&mut container, 1);
        assert!(particles.is_empty());
    }

    #[test]
    fn test_push_seeds_position() {
        let mut container = container(0);
        let mut particles: Particles = Particles::new();
        particles.push(&mut container, 3, Some(Coordinates::new(120.0, 80.0)));
        assert_eq!(particles.len(), 3);
        assert!(particles.iter().all(|p| p.position == glam::Vec2::new(120.0, 80.0)));
        assert!(!particles.is_pushing());
    }

    #[test]
    fn test_push_zero_is_noop() {
        let mut container = container(0);
        let mut particles: Particles = Particles::new();
        particles.push(&mut container, 0, None);
        assert!(particles.is_empty());
    }

    #[test]
    fn test_draw_clears_then_draws_each() {
        let log = DrawLog::new();
        let mut container = container(4);
        container.options.particles.line_linked.enable = false;
        container.canvas = Canvas::new(400.0, 300.0).with_surface(RecordingSurface::with_log(log.clone()));
        let mut particles: Particles = Particles::new();
        particles.create(&mut container);

        particles.draw(&mut container, 1.0);
        let commands = log.take();
        assert!(matches!(commands[0], DrawCommand::Clear { .. }));
        assert_eq!(commands.iter().filter(|c| matches!(c, DrawCommand::Circle { .. })).count(), 4);
    }

    #[test]
    fn test_static_push_draws_immediately() {
        let log = DrawLog::new();
        let mut container = container(0);
        container.options.particles.movement.enable = false;
        container.canvas = Canvas::new(400.0, 300.0).with_surface(RecordingSurface::with_log(log.clone()));
        let mut particles: Particles = Particles::new();

        particles.push(&mut container, 2, None);
        assert_eq!(log.count(|c| matches!(c, DrawCommand::Clear { .. })), 1);

        particles.remove(&mut container, 1);
        assert_eq!(log.count(|c| matches!(c, DrawCommand::Clear { .. })), 2);
    }

    #[test]
    fn test_link_color_cached_and_cleared_on_refresh() {
        let mut container = container(2);
        container.options.particles.line_linked.distance = 1000.0;
        let mut particles: Particles = Particles::new();
        particles.create(&mut container);
        particles.update(&mut container, 0.0);
        assert_eq!(particles.link_color(), Some(Rgb::WHITE));

        pollster::block_on(particles.refresh(&mut container)).unwrap();
        assert!(particles.link_color().is_none());
        assert_eq!(particles.len(), 2);
    }
}

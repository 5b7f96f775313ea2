//! The particle contract and the built-in [`Particle`].
//!
//! A population is generic over [`ParticleTrait`]. The manager only decides
//! *when* each operation runs; what an operation does (how far a link
//! reaches, how hard repulse pushes) is entirely up to the particle type.
//!
//! Particles never hold a reference back to their container. Every
//! operation instead receives a [`Frame`]: a borrow of the container for the
//! duration of one call, plus the population's shared link color.

use crate::color::{Rgb, Rgba};
use crate::canvas::{Paint, Stroke};
use crate::container::Container;
use crate::modes::InteractionMode;
use crate::options::{OutMode, ShapeType};
use crate::spawn::{Coordinates, Footprint, SpawnContext};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::PI;
use std::fmt::Write as _;
use std::ops::{Deref, DerefMut};

/// Re-rolls allowed when looking for a spot that does not overlap an
/// existing particle.
const MAX_PLACEMENT_ATTEMPTS: usize = 32;

/// Borrowed context for one particle operation.
///
/// Dereferences to the [`Container`], so options, canvas, pointer and time
/// are all reachable as `frame.options`, `frame.canvas`, and so on.
pub struct Frame<'a> {
    /// The container. Use the field directly when borrowing two parts of
    /// it at once (e.g. drawing the loaded image onto the canvas).
    pub container: &'a mut Container,
    link_color: &'a mut Option<Rgb>,
    population: usize,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(container: &'a mut Container, link_color: &'a mut Option<Rgb>, population: usize) -> Self {
        Self {
            container,
            link_color,
            population,
        }
    }

    /// Number of particles in the population this frame.
    #[inline]
    pub fn population(&self) -> usize {
        self.population
    }

    /// Color for link and grab lines.
    ///
    /// Resolved once and cached on the population, unless the configured
    /// color is `random`, in which case every call picks a new one.
    pub fn link_rgb(&mut self) -> Rgb {
        let container = &mut *self.container;
        let value = &container.options.particles.line_linked.color;
        if value.is_random() {
            return Rgb::random(&mut container.rng);
        }
        if let Some(color) = *self.link_color {
            return color;
        }
        let color = value.resolve(&mut container.rng);
        *self.link_color = Some(color);
        color
    }

    /// Random f32 between 0.0 and 1.0 from the container's generator.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.container.rng.gen()
    }
}

impl Deref for Frame<'_> {
    type Target = Container;

    fn deref(&self) -> &Container {
        &*self.container
    }
}

impl DerefMut for Frame<'_> {
    fn deref_mut(&mut self) -> &mut Container {
        &mut *self.container
    }
}

/// Operations the population manager invokes on its particles.
///
/// All operations are synchronous and side-effect only. Pairwise
/// operations receive the peer with the higher index as `other` and may
/// mutate it. Everything except `spawn`, `footprint` and `draw` defaults to
/// a no-op.
pub trait ParticleTrait: Sized {
    /// Build a particle, seeded at `position` if given.
    fn spawn(ctx: &mut SpawnContext<'_>, position: Option<Coordinates>) -> Self;

    /// Where this particle sits and how much room it takes.
    fn footprint(&self) -> Footprint;

    /// Integrate motion over `delta` (60 Hz frame units).
    fn move_by(&mut self, _frame: &mut Frame<'_>, _delta: f32) {}

    fn move_parallax(&mut self, _frame: &mut Frame<'_>) {}

    fn update_opacity(&mut self, _frame: &mut Frame<'_>) {}

    fn update_size(&mut self, _frame: &mut Frame<'_>) {}

    /// Bring a particle that left the canvas back in.
    fn fix_out_of_canvas_position(&mut self, _frame: &mut Frame<'_>) {}

    /// Apply the configured out-of-canvas behaviour.
    fn update_out_mode(&mut self, _frame: &mut Frame<'_>) {}

    fn grab(&mut self, _frame: &mut Frame<'_>) {}

    fn bubble(&mut self, _frame: &mut Frame<'_>) {}

    fn repulse(&mut self, _frame: &mut Frame<'_>) {}

    fn link(&mut self, _other: &mut Self, _frame: &mut Frame<'_>) {}

    fn attract(&mut self, _other: &mut Self, _frame: &mut Frame<'_>) {}

    fn bounce(&mut self, _other: &mut Self, _frame: &mut Frame<'_>) {}

    fn draw(&self, frame: &mut Frame<'_>);
}

/// Ping-pong animation state for size or opacity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Oscillator {
    speed: f32,
    increasing: bool,
}

impl Oscillator {
    fn step(&mut self, value: &mut f32, max: f32, min: f32) {
        if self.increasing {
            if *value >= max {
                self.increasing = false;
            }
            *value += self.speed;
        } else {
            if *value <= min {
                self.increasing = true;
            }
            *value -= self.speed;
        }
        if *value < 0.0 {
            *value = 0.0;
        }
    }
}

/// The built-in canvas particle.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Velocity at spawn, restored after a click repulse.
    pub initial_velocity: Vec2,
    /// Parallax offset, applied when drawing.
    pub offset: Vec2,
    pub radius: f32,
    pub opacity: f32,
    /// Radius override while bubbled.
    pub radius_bubble: Option<f32>,
    /// Opacity override while bubbled.
    pub opacity_bubble: Option<f32>,
    pub color: Rgb,
    pub stroke_color: Rgb,
    pub shape: ShapeType,
    size_anim: Oscillator,
    opacity_anim: Oscillator,
    /// Recolored SVG for image shapes.
    svg: Option<String>,
    /// Width / height of the image shape.
    image_ratio: f32,
    destroyed: bool,
}

impl Particle {
    /// Whether the particle left the canvas in `destroy` out mode.
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Position including the parallax offset.
    #[inline]
    pub fn visual_position(&self) -> Vec2 {
        self.position + self.offset
    }

    /// Recolored SVG document, for SVG image shapes.
    pub fn svg(&self) -> Option<&str> {
        self.svg.as_deref()
    }

    fn reset_bubble(&mut self) {
        self.radius_bubble = None;
        self.opacity_bubble = None;
    }

    fn hover_bubble(&mut self, ratio: f32, target_size: f32, base_size: f32, target_opacity: f32, base_opacity: f32) {
        if target_size != base_size {
            if target_size > base_size {
                let size = self.radius + target_size * ratio;
                if size >= 0.0 {
                    self.radius_bubble = Some(size);
                }
            } else {
                let size = self.radius - (self.radius - target_size) * ratio;
                self.radius_bubble = Some(size.max(0.0));
            }
        }

        if target_opacity != base_opacity {
            if target_opacity > base_opacity {
                let opacity = target_opacity * ratio;
                if opacity > self.opacity && opacity <= target_opacity {
                    self.opacity_bubble = Some(opacity);
                }
            } else {
                let opacity = self.opacity - (base_opacity - target_opacity) * ratio;
                if opacity < self.opacity && opacity >= target_opacity {
                    self.opacity_bubble = Some(opacity);
                }
            }
        }
    }
}

/// Move a coordinate that spawned within `2r` of an edge one radius inward.
fn nudge_inside(value: f32, radius: f32, extent: f32) -> f32 {
    if value > extent - radius * 2.0 {
        value - radius
    } else if value < radius * 2.0 {
        value + radius
    } else {
        value
    }
}

/// One step of the click bubble for a single property.
///
/// While the bubble grows, particles in range ease from `base` toward
/// `target` over `duration`; once it peaks, bubbled particles ease back.
fn click_bubble_step(
    slot: &mut Option<f32>,
    target: f32,
    configured: f32,
    base: f32,
    in_range: bool,
    ending: bool,
    progress: f32,
) {
    if target == configured {
        return;
    }
    let value = base - progress * (base - target);
    if !ending {
        if !in_range {
            *slot = None;
        } else if slot.unwrap_or(base) != target {
            *slot = Some(value);
        }
    } else if slot.is_some() {
        *slot = Some(target + (target - value));
    }
}

/// Vertices of a regular (or star) polygon traced turtle-style from
/// `start`, `numerator / denominator` giving the number of points.
fn shape_points(start: Vec2, side: f32, numerator: f32, denominator: f32) -> Vec<Vec2> {
    let side_count = (numerator * denominator).round().max(0.0) as usize;
    let decimal_sides = numerator / denominator;
    let interior_degrees = 180.0 * (decimal_sides - 2.0) / decimal_sides;
    let turn = PI - PI * interior_degrees / 180.0;

    let mut points = Vec::with_capacity(side_count + 1);
    let mut cursor = start;
    let mut heading: f32 = 0.0;
    points.push(cursor);
    for _ in 0..side_count {
        cursor += Vec2::new(heading.cos(), heading.sin()) * side;
        points.push(cursor);
        heading += turn;
    }
    points
}

/// Replace every `#rgb`..`#rrggbb` color in an SVG document with `color`
/// at `opacity`.
pub fn recolor_svg(svg: &str, color: Rgb, opacity: f32) -> String {
    let mut out = String::with_capacity(svg.len());
    let mut rest = svg;
    while let Some(idx) = rest.find('#') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        let len = after.bytes().take(6).take_while(u8::is_ascii_hexdigit).count();
        if len >= 3 {
            let _ = write!(out, "rgba({},{},{},{})", color.r, color.g, color.b, opacity);
            rest = &after[len..];
        } else {
            out.push('#');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

impl ParticleTrait for Particle {
    fn spawn(ctx: &mut SpawnContext<'_>, position: Option<Coordinates>) -> Self {
        let options = ctx.options;
        let particles = &options.particles;
        let canvas = ctx.canvas_size;

        let size = &particles.size;
        let radius = if size.random { ctx.random() } else { 1.0 } * size.value;
        let size_anim = Oscillator {
            speed: size.anim.speed / 100.0 * if size.anim.sync { 1.0 } else { ctx.random() },
            increasing: false,
        };

        let mut spot = match position {
            Some(seed) => Vec2::from(seed),
            None => ctx.random_position(),
        };
        if position.is_none() && particles.movement.bounce {
            let mut attempts = 0;
            while attempts < MAX_PLACEMENT_ATTEMPTS && ctx.occupied().iter().any(|f| f.overlaps(spot, radius)) {
                spot = ctx.random_position();
                attempts += 1;
            }
        }
        spot.x = nudge_inside(spot.x, radius, canvas.x);
        spot.y = nudge_inside(spot.y, radius, canvas.y);

        let color = particles.color.value.resolve(ctx.rng());
        let stroke_color = particles.shape.stroke.color.resolve(ctx.rng());

        let opacity_options = &particles.opacity;
        let opacity = if opacity_options.random { ctx.random() } else { 1.0 } * opacity_options.value;
        let opacity_anim = Oscillator {
            speed: opacity_options.anim.speed / 100.0 * if opacity_options.anim.sync { 1.0 } else { ctx.random() },
            increasing: false,
        };

        let movement = &particles.movement;
        let base = movement.direction.base_velocity();
        let velocity = if movement.straight {
            let mut v = base;
            if movement.random {
                v.x *= ctx.random();
                v.y *= ctx.random();
            }
            v
        } else {
            base + Vec2::new(ctx.random() - 0.5, ctx.random() - 0.5)
        };

        let kinds = &particles.shape.kind;
        let shape = match kinds.len() {
            0 => ShapeType::Circle,
            1 => kinds[0],
            n => kinds[ctx.random_index(n)],
        };

        let image = &particles.shape.image;
        let image_ratio = if image.height > 0.0 { image.width / image.height } else { 1.0 };
        let svg = if shape == ShapeType::Image && image.is_svg() {
            ctx.svg_source().map(|source| recolor_svg(source, color, opacity))
        } else {
            None
        };
        if svg.is_some() {
            ctx.register_svg_use();
        }

        Particle {
            position: spot,
            velocity,
            initial_velocity: velocity,
            offset: Vec2::ZERO,
            radius,
            opacity,
            radius_bubble: None,
            opacity_bubble: None,
            color,
            stroke_color,
            shape,
            size_anim,
            opacity_anim,
            svg,
            image_ratio,
            destroyed: false,
        }
    }

    fn footprint(&self) -> Footprint {
        Footprint {
            position: self.position,
            radius: self.radius,
        }
    }

    fn move_by(&mut self, frame: &mut Frame<'_>, delta: f32) {
        let movement = &frame.options.particles.movement;
        if self.destroyed || !movement.enable {
            return;
        }
        self.position += self.velocity * (movement.speed / 2.0) * delta;
    }

    fn move_parallax(&mut self, frame: &mut Frame<'_>) {
        let hover = &frame.options.interactivity.events.onhover;
        let (force, smooth) = (hover.parallax.force, hover.parallax.smooth);
        if !hover.enable || !hover.parallax.enable || force <= 0.0 || smooth <= 0.0 {
            return;
        }
        let Some(pointer) = frame.interactivity.pointer.hover_position() else {
            return;
        };
        let center = frame.canvas.size() / 2.0;
        let target = (pointer - center) * (self.radius / force);
        self.offset += (target - self.offset) / smooth;
    }

    fn update_opacity(&mut self, frame: &mut Frame<'_>) {
        let opacity = &frame.options.particles.opacity;
        if opacity.anim.enable {
            self.opacity_anim.step(&mut self.opacity, opacity.value, opacity.anim.opacity_min);
        }
    }

    fn update_size(&mut self, frame: &mut Frame<'_>) {
        let size = &frame.options.particles.size;
        if size.anim.enable {
            self.size_anim.step(&mut self.radius, size.value, size.anim.size_min);
        }
    }

    fn fix_out_of_canvas_position(&mut self, frame: &mut Frame<'_>) {
        let mode = frame.options.particles.movement.out_mode;
        if self.destroyed || !matches!(mode, OutMode::Out | OutMode::Bounce) {
            return;
        }
        let size = frame.canvas.size();
        let r = self.radius;
        let (left, right, top, bottom) = if mode == OutMode::Bounce {
            (r, size.x, r, size.y)
        } else {
            (-r, size.x + r, -r, size.y + r)
        };

        if self.position.x - r > size.x {
            self.position = Vec2::new(left, frame.random() * size.y);
        } else if self.position.x + r < 0.0 {
            self.position = Vec2::new(right, frame.random() * size.y);
        }
        if self.position.y - r > size.y {
            self.position = Vec2::new(frame.random() * size.x, top);
        } else if self.position.y + r < 0.0 {
            self.position = Vec2::new(frame.random() * size.x, bottom);
        }
    }

    fn update_out_mode(&mut self, frame: &mut Frame<'_>) {
        if self.destroyed {
            return;
        }
        let size = frame.canvas.size();
        let r = self.radius;
        let p = self.position;
        match frame.options.particles.movement.out_mode {
            OutMode::Bounce => {
                if p.x + r > size.x {
                    self.velocity.x = -self.velocity.x.abs();
                } else if p.x - r < 0.0 {
                    self.velocity.x = self.velocity.x.abs();
                }
                if p.y + r > size.y {
                    self.velocity.y = -self.velocity.y.abs();
                } else if p.y - r < 0.0 {
                    self.velocity.y = self.velocity.y.abs();
                }
            }
            OutMode::Destroy => {
                if p.x - r > size.x || p.x + r < 0.0 || p.y - r > size.y || p.y + r < 0.0 {
                    self.destroyed = true;
                }
            }
            OutMode::Out | OutMode::None => {}
        }
    }

    fn grab(&mut self, frame: &mut Frame<'_>) {
        let options = &frame.options;
        let enabled = options.interactivity.events.onhover.enable;
        let grab = &options.interactivity.modes.grab;
        let (distance, max_opacity) = (grab.distance, grab.line_linked.opacity);
        let width = options.particles.line_linked.width;
        if self.destroyed || !enabled {
            return;
        }
        let Some(pointer) = frame.interactivity.pointer.hover_position() else {
            return;
        };

        let d = self.position.distance(pointer);
        if d > distance {
            return;
        }
        let opacity = max_opacity * (1.0 - d / distance);
        if opacity > 0.0 {
            let color = frame.link_rgb();
            frame
                .canvas
                .stroke_line(self.visual_position(), pointer, color.with_alpha(opacity), width);
        }
    }

    fn bubble(&mut self, frame: &mut Frame<'_>) {
        if self.destroyed {
            return;
        }
        let options = &frame.options;
        let events = &options.interactivity.events;
        let hover = events.onhover.enable && events.onhover.mode.contains(InteractionMode::Bubble);
        let click = events.onclick.enable && events.onclick.mode.contains(InteractionMode::Bubble);
        let bubble = &options.interactivity.modes.bubble;
        let (distance, target_size, target_opacity, duration) =
            (bubble.distance, bubble.size, bubble.opacity, bubble.duration);
        let base_size = options.particles.size.value;
        let base_opacity = options.particles.opacity.value;

        let pointer = &frame.interactivity.pointer;
        if hover {
            match pointer.hover_position() {
                Some(at) if self.position.distance(at) <= distance => {
                    let ratio = 1.0 - self.position.distance(at) / distance;
                    self.hover_bubble(ratio, target_size, base_size, target_opacity, base_opacity);
                }
                _ => self.reset_bubble(),
            }
        } else if click {
            let state = &frame.interactivity.click;
            if !state.bubble_clicking {
                self.reset_bubble();
                return;
            }
            let (Some(at), Some(clicked)) = (pointer.click_position, pointer.click_time) else {
                return;
            };
            let ending = state.bubble_duration_end;
            let progress = if duration > 0.0 {
                (frame.time.elapsed() - clicked) / duration
            } else {
                1.0
            };
            let in_range = self.position.distance(at) <= distance;

            let radius = self.radius;
            let opacity = self.opacity;
            click_bubble_step(&mut self.radius_bubble, target_size, base_size, radius, in_range, ending, progress);
            click_bubble_step(
                &mut self.opacity_bubble,
                target_opacity,
                base_opacity,
                opacity,
                in_range,
                ending,
                progress,
            );
        }
    }

    fn repulse(&mut self, frame: &mut Frame<'_>) {
        if self.destroyed {
            return;
        }
        let options = &frame.options;
        let events = &options.interactivity.events;
        let hover = events.onhover.enable && events.onhover.mode.contains(InteractionMode::Repulse);
        let click = events.onclick.enable && events.onclick.mode.contains(InteractionMode::Repulse);
        let distance = options.interactivity.modes.repulse.distance;
        let bounded = options.particles.movement.out_mode == OutMode::Bounce;
        let size = frame.canvas.size();
        let r = self.radius;

        let hover_at = if hover {
            frame.interactivity.pointer.hover_position()
        } else {
            None
        };

        if let Some(pointer) = hover_at {
            let away = self.position - pointer;
            let d = away.length();
            if d == 0.0 || distance <= 0.0 {
                return;
            }
            let factor = ((1.0 - (d / distance).powi(2)) * 100.0).clamp(0.0, 50.0);
            let target = self.position + away / d * factor;
            if bounded {
                if target.x - r > 0.0 && target.x + r < size.x {
                    self.position.x = target.x;
                }
                if target.y - r > 0.0 && target.y + r < size.y {
                    self.position.y = target.y;
                }
            } else {
                self.position = target;
            }
        } else if click {
            let population = frame.population();
            let click_at = frame.interactivity.pointer.click_position;
            let state = &mut frame.interactivity.click;
            if !state.repulse_finish {
                state.repulse_count += 1;
                if state.repulse_count >= population {
                    state.repulse_finish = true;
                }
            }

            if !state.repulse_clicking {
                self.velocity = self.initial_velocity;
                return;
            }
            let Some(at) = click_at else {
                return;
            };
            let reach = (distance / 6.0).powi(3);
            let toward = at - self.position;
            let d = toward.length_squared();
            if d == 0.0 || d > reach {
                return;
            }
            let force = -reach / d;
            let angle = toward.y.atan2(toward.x);
            self.velocity = Vec2::new(force * angle.cos(), force * angle.sin());

            if bounded {
                let next = self.position + self.velocity;
                if next.x + r > size.x || next.x - r < 0.0 {
                    self.velocity.x = -self.velocity.x;
                }
                if next.y + r > size.y || next.y - r < 0.0 {
                    self.velocity.y = -self.velocity.y;
                }
            }
        }
    }

    fn link(&mut self, other: &mut Self, frame: &mut Frame<'_>) {
        if self.destroyed || other.destroyed {
            return;
        }
        let line = &frame.options.particles.line_linked;
        let (distance, max_opacity, width) = (line.distance, line.opacity, line.width);

        let d = self.position.distance(other.position);
        if d > distance {
            return;
        }
        let opacity = max_opacity * (1.0 - d / distance);
        if opacity > 0.0 {
            let color = frame.link_rgb();
            frame.canvas.stroke_line(
                self.visual_position(),
                other.visual_position(),
                color.with_alpha(opacity),
                width,
            );
        }
    }

    fn attract(&mut self, other: &mut Self, frame: &mut Frame<'_>) {
        if self.destroyed || other.destroyed {
            return;
        }
        let options = &frame.options.particles;
        let attract = &options.movement.attract;
        let (rx, ry) = (attract.rotate_x * 1000.0, attract.rotate_y * 1000.0);
        let delta = self.position - other.position;
        if delta.length() > options.line_linked.distance || rx == 0.0 || ry == 0.0 {
            return;
        }
        let pull = Vec2::new(delta.x / rx, delta.y / ry);
        self.velocity -= pull;
        other.velocity += pull;
    }

    fn bounce(&mut self, other: &mut Self, _frame: &mut Frame<'_>) {
        if self.destroyed || other.destroyed {
            return;
        }
        if self.position.distance(other.position) <= self.radius + other.radius {
            self.velocity = -self.velocity;
            other.velocity = -other.velocity;
        }
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        if self.destroyed {
            return;
        }
        let r = self.radius_bubble.unwrap_or(self.radius);
        let opacity = self.opacity_bubble.unwrap_or(self.opacity);
        let at = self.visual_position();

        let shape = &frame.options.particles.shape;
        let stroke_width = shape.stroke.width;
        let sides = shape.polygon.nb_sides.max(3) as f32;
        let paint = Paint {
            fill: Rgba::new(self.color, opacity),
            stroke: (stroke_width > 0.0).then(|| Stroke {
                color: Rgba::new(self.stroke_color, opacity),
                width: stroke_width,
            }),
        };

        let container = &mut *frame.container;
        let canvas = &mut container.canvas;
        match self.shape {
            ShapeType::Circle => canvas.fill_circle(at, r, &paint),
            ShapeType::Edge => {
                let square = [
                    at + Vec2::new(-r, -r),
                    at + Vec2::new(r, -r),
                    at + Vec2::new(r, r),
                    at + Vec2::new(-r, r),
                ];
                canvas.fill_polygon(&square, &paint);
            }
            ShapeType::Triangle => {
                let points = shape_points(Vec2::new(at.x - r, at.y + r / 1.66), r * 2.0, 3.0, 2.0);
                canvas.fill_polygon(&points, &paint);
            }
            ShapeType::Polygon => {
                let start = Vec2::new(at.x - r / (sides / 3.5), at.y - r / (2.66 / 3.5));
                let points = shape_points(start, r * 2.66 / (sides / 3.0), sides, 1.0);
                canvas.fill_polygon(&points, &paint);
            }
            ShapeType::Star => {
                let start = Vec2::new(at.x - r * 2.0 / (sides / 4.0), at.y - r / (2.0 * 2.66 / 3.5));
                let points = shape_points(start, r * 2.0 * 2.66 / (sides / 3.0), sides, 2.0);
                canvas.fill_polygon(&points, &paint);
            }
            ShapeType::Image => {
                let size = Vec2::new(r * 2.0, r * 2.0 / self.image_ratio);
                if let Some(svg) = &self.svg {
                    canvas.draw_svg(svg, at, size, opacity);
                } else if let Some(image) = container.img.obj.as_ref() {
                    canvas.draw_image(image, at, size, opacity);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, DrawCommand, DrawLog, RecordingSurface};
    use crate::color::ColorValue;
    use crate::interactivity::PointerEvent;
    use crate::options::Options;

    fn container(options: Options) -> Container {
        Container::new(options, 200.0, 100.0).with_seed(11)
    }

    fn spawn_at(container: &mut Container, x: f32, y: f32) -> Particle {
        let mut ctx = container.spawn_context(0, 1, false, &[]);
        Particle::spawn(&mut ctx, Some(Coordinates::new(x, y)))
    }

    #[test]
    fn test_spawn_respects_options() {
        let mut options = Options::default();
        options.particles.size.value = 4.0;
        options.particles.opacity.value = 0.5;
        options.particles.color.value = ColorValue::Fixed(Rgb::new(1, 2, 3));
        let mut container = container(options);

        let p = spawn_at(&mut container, 50.0, 50.0);
        assert_eq!(p.radius, 4.0);
        assert_eq!(p.opacity, 0.5);
        assert_eq!(p.color, Rgb::new(1, 2, 3));
        assert_eq!(p.position, Vec2::new(50.0, 50.0));
        assert_eq!(p.velocity, p.initial_velocity);
        assert!(p.velocity.x.abs() <= 0.5 && p.velocity.y.abs() <= 0.5);
    }

    #[test]
    fn test_spawn_nudges_inside_edges() {
        let mut options = Options::default();
        options.particles.size.value = 5.0;
        let mut container = container(options);
        let p = spawn_at(&mut container, 199.0, 2.0);
        assert_eq!(p.position, Vec2::new(194.0, 7.0));
    }

    #[test]
    fn test_spawn_avoids_overlap_when_bouncing() {
        let mut options = Options::default();
        options.particles.size.value = 2.0;
        options.particles.movement.bounce = true;
        let mut container = container(options);
        let occupied = [Footprint {
            position: Vec2::new(100.0, 50.0),
            radius: 30.0,
        }];
        for _ in 0..20 {
            let mut ctx = container.spawn_context(0, 1, false, &occupied);
            let p = Particle::spawn(&mut ctx, None);
            // Nudging moves at most one radius
            assert!(p.position.distance(Vec2::new(100.0, 50.0)) >= 30.0);
        }
    }

    #[test]
    fn test_straight_direction() {
        let mut options = Options::default();
        options.particles.movement.straight = true;
        options.particles.movement.direction = crate::options::Direction::Right;
        let mut container = container(options);
        let p = spawn_at(&mut container, 10.0, 10.0);
        assert_eq!(p.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_move_by_scales_with_speed_and_delta() {
        let mut options = Options::default();
        options.particles.movement.speed = 4.0;
        let mut container = container(options);
        let mut p = spawn_at(&mut container, 50.0, 50.0);
        p.velocity = Vec2::new(1.0, -1.0);

        let mut link = None;
        let mut frame = Frame::new(&mut container, &mut link, 1);
        p.move_by(&mut frame, 0.5);
        assert_eq!(p.position, Vec2::new(51.0, 49.0));
    }

    #[test]
    fn test_out_mode_wraps_and_destroys() {
        let mut container = container(Options::default());
        let mut p = spawn_at(&mut container, 50.0, 50.0);
        p.position = Vec2::new(210.0, 50.0);
        {
            let mut link = None;
            let mut frame = Frame::new(&mut container, &mut link, 1);
            p.fix_out_of_canvas_position(&mut frame);
        }
        assert_eq!(p.position.x, -p.radius);

        container.options.particles.movement.out_mode = OutMode::Destroy;
        p.position = Vec2::new(-50.0, 50.0);
        let mut link = None;
        let mut frame = Frame::new(&mut container, &mut link, 1);
        p.update_out_mode(&mut frame);
        assert!(p.is_destroyed());
    }

    #[test]
    fn test_bounce_out_mode_reflects() {
        let mut options = Options::default();
        options.particles.movement.out_mode = OutMode::Bounce;
        let mut container = container(options);
        let mut p = spawn_at(&mut container, 50.0, 50.0);
        p.position = Vec2::new(199.0, 50.0);
        p.velocity = Vec2::new(1.0, 0.2);
        let mut link = None;
        let mut frame = Frame::new(&mut container, &mut link, 1);
        p.update_out_mode(&mut frame);
        assert_eq!(p.velocity, Vec2::new(-1.0, 0.2));
    }

    #[test]
    fn test_link_opacity_falls_off_with_distance() {
        let mut options = Options::default();
        options.particles.line_linked.distance = 100.0;
        options.particles.line_linked.opacity = 0.8;
        options.particles.line_linked.color = ColorValue::Fixed(Rgb::new(9, 9, 9));
        let log = DrawLog::new();
        let mut container = container(options);
        container.canvas = Canvas::new(200.0, 100.0).with_surface(RecordingSurface::with_log(log.clone()));

        let mut a = spawn_at(&mut container, 20.0, 50.0);
        let mut b = spawn_at(&mut container, 70.0, 50.0);
        let mut far = spawn_at(&mut container, 190.0, 50.0);

        let mut link = None;
        {
            let mut frame = Frame::new(&mut container, &mut link, 3);
            a.link(&mut b, &mut frame);
            a.link(&mut far, &mut frame);
        }
        assert_eq!(link, Some(Rgb::new(9, 9, 9)));

        let commands = log.take();
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            DrawCommand::Line { color, .. } => {
                assert!((color.alpha - 0.4).abs() < 1e-5);
                assert_eq!(color.color, Rgb::new(9, 9, 9));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_attract_is_symmetric() {
        let mut options = Options::default();
        options.particles.movement.attract.rotate_x = 1.0;
        options.particles.movement.attract.rotate_y = 1.0;
        let mut container = container(options);
        let mut a = spawn_at(&mut container, 40.0, 50.0);
        let mut b = spawn_at(&mut container, 60.0, 50.0);
        a.velocity = Vec2::ZERO;
        b.velocity = Vec2::ZERO;

        let mut link = None;
        let mut frame = Frame::new(&mut container, &mut link, 2);
        a.attract(&mut b, &mut frame);
        assert!((a.velocity.x - 0.02).abs() < 1e-6);
        assert!((b.velocity.x + 0.02).abs() < 1e-6);
        assert_eq!(a.velocity + b.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_bounce_reverses_touching_particles() {
        let mut options = Options::default();
        options.particles.size.value = 5.0;
        let mut container = container(options);
        let mut a = spawn_at(&mut container, 50.0, 50.0);
        let mut b = spawn_at(&mut container, 58.0, 50.0);
        a.velocity = Vec2::new(1.0, 0.0);
        b.velocity = Vec2::new(-1.0, 0.5);

        let mut link = None;
        let mut frame = Frame::new(&mut container, &mut link, 2);
        a.bounce(&mut b, &mut frame);
        assert_eq!(a.velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(1.0, -0.5));
    }

    #[test]
    fn test_hover_repulse_pushes_away() {
        let mut options = Options::default();
        options.interactivity.events.onhover.mode = crate::modes::ModeSet::single(InteractionMode::Repulse);
        options.interactivity.modes.repulse.distance = 100.0;
        let mut container = container(options);
        container.interactivity.pointer.apply(PointerEvent::Moved { x: 100.0, y: 50.0 }, 0.0);
        let mut p = spawn_at(&mut container, 110.0, 50.0);

        let mut link = None;
        let mut frame = Frame::new(&mut container, &mut link, 1);
        p.repulse(&mut frame);
        // factor = (1 - 0.01) * 100 clamped to 50
        assert!((p.position.x - 160.0).abs() < 1e-4);
        assert_eq!(p.position.y, 50.0);
    }

    #[test]
    fn test_click_repulse_counts_and_restores() {
        let mut options = Options::default();
        options.interactivity.events.onhover.enable = false;
        options.interactivity.events.onclick.mode = crate::modes::ModeSet::single(InteractionMode::Repulse);
        let mut container = container(options);
        let mut p = spawn_at(&mut container, 50.0, 50.0);
        p.velocity = Vec2::new(3.0, 3.0);

        let mut link = None;
        let mut frame = Frame::new(&mut container, &mut link, 2);
        p.repulse(&mut frame);
        assert_eq!(p.velocity, p.initial_velocity);
        assert_eq!(frame.interactivity.click.repulse_count, 1);
        assert!(!frame.interactivity.click.repulse_finish);
        p.repulse(&mut frame);
        assert!(frame.interactivity.click.repulse_finish);
    }

    #[test]
    fn test_hover_bubble_grows_and_resets() {
        let mut options = Options::default();
        options.particles.size.value = 3.0;
        options.interactivity.events.onhover.mode = crate::modes::ModeSet::single(InteractionMode::Bubble);
        options.interactivity.modes.bubble.distance = 100.0;
        options.interactivity.modes.bubble.size = 10.0;
        let mut container = container(options);
        container.interactivity.pointer.apply(PointerEvent::Moved { x: 50.0, y: 50.0 }, 0.0);
        let mut p = spawn_at(&mut container, 100.0, 50.0);

        {
            let mut link = None;
            let mut frame = Frame::new(&mut container, &mut link, 1);
            p.bubble(&mut frame);
        }
        assert_eq!(p.radius_bubble, Some(3.0 + 10.0 * 0.5));

        container.interactivity.pointer.apply(PointerEvent::Left, 0.0);
        let mut link = None;
        let mut frame = Frame::new(&mut container, &mut link, 1);
        p.bubble(&mut frame);
        assert!(p.radius_bubble.is_none());
    }

    #[test]
    fn test_click_bubble_step() {
        let mut slot = None;
        click_bubble_step(&mut slot, 10.0, 3.0, 3.0, true, false, 0.5);
        assert_eq!(slot, Some(6.5));
        click_bubble_step(&mut slot, 10.0, 3.0, 3.0, true, true, 1.5);
        assert_eq!(slot, Some(6.5));
        click_bubble_step(&mut slot, 10.0, 3.0, 3.0, false, false, 0.2);
        assert!(slot.is_none());
        // Nothing to animate when the bubble size equals the configured size
        click_bubble_step(&mut slot, 3.0, 3.0, 3.0, true, false, 0.5);
        assert!(slot.is_none());
    }

    #[test]
    fn test_oscillator_ping_pong() {
        let mut osc = Oscillator {
            speed: 1.0,
            increasing: false,
        };
        let mut value = 1.0;
        osc.step(&mut value, 2.0, 0.0);
        assert_eq!(value, 0.0);
        osc.step(&mut value, 2.0, 0.0);
        assert!(osc.increasing);
        assert_eq!(value, 0.0);
        osc.step(&mut value, 2.0, 0.0);
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_recolor_svg() {
        let svg = r##"<svg><path fill="#000000" stroke="#fff"/><text>#1</text></svg>"##;
        let out = recolor_svg(svg, Rgb::new(255, 0, 0), 0.5);
        assert_eq!(
            out,
            r##"<svg><path fill="rgba(255,0,0,0.5)" stroke="rgba(255,0,0,0.5)"/><text>#1</text></svg>"##
        );
    }

    #[test]
    fn test_shape_points_square_closes() {
        let points = shape_points(Vec2::ZERO, 1.0, 4.0, 1.0);
        assert_eq!(points.len(), 5);
        assert!(points[4].distance(points[0]) < 1e-5);
    }

    #[test]
    fn test_draw_uses_bubble_overrides() {
        let log = DrawLog::new();
        let mut container = container(Options::default());
        container.canvas = Canvas::new(200.0, 100.0).with_surface(RecordingSurface::with_log(log.clone()));
        let mut p = spawn_at(&mut container, 50.0, 50.0);
        p.radius_bubble = Some(9.0);
        p.opacity_bubble = Some(0.25);

        let mut link = None;
        let mut frame = Frame::new(&mut container, &mut link, 1);
        p.draw(&mut frame);
        match log.take().as_slice() {
            [DrawCommand::Circle { radius, paint, .. }] => {
                assert_eq!(*radius, 9.0);
                assert_eq!(paint.fill.alpha, 0.25);
                assert!(paint.stroke.is_none());
            }
            other => panic!("unexpected commands {:?}", other),
        }
    }
}

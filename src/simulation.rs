//! Simulation builder and runner.
//!
//! [`Simulation`] pairs a [`Container`] with its [`Particles`] and routes
//! host input (pointer events, resizes, fired frames) to them.

use crate::canvas::Surface;
use crate::container::Container;
use crate::error::ParticlesError;
use crate::interactivity::PointerEvent;
use crate::modes::InteractionMode;
use crate::options::Options;
use crate::particle::{Particle, ParticleTrait};
use crate::particles::Particles;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::spawn::Coordinates;
use log::{debug, warn};

/// A particle simulation builder.
///
/// Use method chaining to configure, then `start` it and feed it frames:
///
/// ```ignore
/// let scheduler = ManualScheduler::new();
/// let mut sim = Simulation::<Particle>::new()
///     .with_options(Options::from_path("particles.json")?)
///     .with_canvas_size(800.0, 600.0)
///     .with_scheduler(scheduler.clone());
///
/// pollster::block_on(sim.start())?;
/// loop {
///     for handle in scheduler.take_due() {
///         sim.handle_frame(handle);
///     }
/// }
/// ```
pub struct Simulation<P: ParticleTrait = Particle> {
    container: Container,
    particles: Particles<P>,
}

impl<P: ParticleTrait> Simulation<P> {
    /// Default options on an 800x600 canvas.
    pub fn new() -> Self {
        Self {
            container: Container::new(Options::default(), 800.0, 600.0),
            particles: Particles::new(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.container.set_options(options);
        self
    }

    /// Canvas size in logical pixels.
    pub fn with_canvas_size(mut self, width: f32, height: f32) -> Self {
        self.container.set_canvas_size(width, height);
        self
    }

    /// Device pixel ratio; only applied with `retina_detect`.
    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.container.set_pixel_ratio(ratio);
        self
    }

    pub fn with_surface(mut self, surface: impl Surface + 'static) -> Self {
        self.container.canvas.set_surface(Some(Box::new(surface)));
        self
    }

    pub fn with_scheduler(mut self, scheduler: impl FrameScheduler + 'static) -> Self {
        self.container.set_scheduler(Box::new(scheduler));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.container = self.container.with_seed(seed);
        self
    }

    /// Step time by a fixed amount per frame instead of wall-clock time.
    pub fn with_fixed_delta(mut self, seconds: f32) -> Self {
        self.container.time.set_fixed_delta(Some(seconds));
        self
    }

    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.container.time.set_time_scale(scale);
        self
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub fn particles(&self) -> &Particles<P> {
        &self.particles
    }

    /// Both halves at once, for driving the population directly.
    pub fn parts_mut(&mut self) -> (&mut Container, &mut Particles<P>) {
        (&mut self.container, &mut self.particles)
    }

    /// Load assets, create the population and schedule the first frame.
    pub async fn start(&mut self) -> Result<(), ParticlesError> {
        self.container.start(&mut self.particles).await
    }

    /// Tear everything down and start again.
    pub async fn refresh(&mut self) -> Result<(), ParticlesError> {
        self.particles.refresh(&mut self.container).await
    }

    /// Run a fired frame. Returns `false` for stale handles.
    pub fn handle_frame(&mut self, handle: FrameHandle) -> bool {
        self.container.handle_frame(handle, &mut self.particles)
    }

    /// Resize the canvas, in logical pixels.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.container.resize(width, height, &mut self.particles);
    }

    /// Feed a pointer event in logical pixels.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let ratio = self.container.pixel_ratio();
        let event = match event {
            PointerEvent::Moved { x, y } => PointerEvent::Moved {
                x: x * ratio,
                y: y * ratio,
            },
            PointerEvent::Clicked { x, y } => PointerEvent::Clicked {
                x: x * ratio,
                y: y * ratio,
            },
            PointerEvent::Left => PointerEvent::Left,
        };

        let now = self.container.time.elapsed();
        self.container.interactivity.pointer.apply(event, now);

        if let PointerEvent::Clicked { x, y } = event {
            self.click(Coordinates::new(x, y));
        }
    }

    fn click(&mut self, at: Coordinates) {
        let onclick = &self.container.options.interactivity.events.onclick;
        if !onclick.enable {
            return;
        }
        let modes = onclick.mode;
        let push_nb = self.container.options.interactivity.modes.push.particles_nb;
        let remove_nb = self.container.options.interactivity.modes.remove.particles_nb;
        let moving = self.container.options.particles.movement.enable;

        for mode in modes.iter() {
            debug!("click mode {} at ({}, {})", mode, at.x, at.y);
            match mode {
                InteractionMode::Push => {
                    if self.particles.is_pushing() {
                        warn!("push already in progress, click ignored");
                        continue;
                    }
                    if moving || push_nb == 1 {
                        self.particles.push(&mut self.container, push_nb, Some(at));
                    } else if push_nb > 1 {
                        self.particles.push(&mut self.container, push_nb, None);
                    }
                }
                InteractionMode::Remove => {
                    self.particles.remove(&mut self.container, remove_nb);
                }
                InteractionMode::Bubble => {
                    self.container.interactivity.click.bubble_clicking = true;
                }
                InteractionMode::Repulse => {
                    let click = &mut self.container.interactivity.click;
                    click.repulse_clicking = true;
                    click.repulse_count = 0;
                    click.repulse_finish = false;
                }
                InteractionMode::Grab => {}
            }
        }
    }

    /// Stop time and withdraw the pending draw frame.
    pub fn pause(&mut self) {
        self.container.time.pause();
        self.container.cancel_draw_frame();
    }

    /// Resume time and schedule a draw frame if none is pending.
    pub fn play(&mut self) {
        self.container.time.resume();
        if self.container.draw_anim_frame().is_none() && self.container.options.particles.movement.enable {
            self.container.request_draw_frame();
        }
    }
}

impl<P: ParticleTrait> Default for Simulation<P> {
    fn default() -> Self {
        Self::new()
    }
}

//! The container: everything a population runs inside.
//!
//! Holds the options snapshot, the canvas, pointer state, timing, the
//! random source, loaded shape assets and the animation-frame slots. The
//! population manager reads configuration through it and hands frame
//! scheduling and surface clearing to it.

use crate::canvas::Canvas;
use crate::error::ParticlesError;
use crate::interactivity::Interactivity;
use crate::options::{Options, ShapeType};
use crate::particle::ParticleTrait;
use crate::particles::Particles;
use crate::scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
use crate::spawn::{Footprint, SpawnContext};
use crate::time::Time;
use glam::Vec2;
use image::RgbaImage;
use log::{debug, info, trace, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Loaded SVG document for image shapes, plus how many particles use it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgSource {
    pub source: Option<String>,
    pub count: usize,
}

impl SvgSource {
    pub fn clear(&mut self) {
        self.source = None;
        self.count = 0;
    }
}

/// Decoded raster image for image shapes.
#[derive(Debug, Clone, Default)]
pub struct RasterSource {
    pub obj: Option<RgbaImage>,
}

impl RasterSource {
    pub fn clear(&mut self) {
        self.obj = None;
    }
}

/// Owns configuration, canvas, pointer state and frame scheduling.
pub struct Container {
    /// Live options, already scaled by the effective pixel ratio.
    pub options: Options,
    pub canvas: Canvas,
    pub interactivity: Interactivity,
    pub time: Time,
    pub svg: SvgSource,
    pub img: RasterSource,
    pub(crate) rng: SmallRng,
    /// Options as configured, before pixel-ratio scaling.
    source_options: Options,
    /// Canvas size in logical pixels.
    logical_size: Vec2,
    device_pixel_ratio: f32,
    scheduler: Box<dyn FrameScheduler>,
    draw_anim_frame: Option<FrameHandle>,
    check_anim_frame: Option<FrameHandle>,
}

impl Container {
    /// Container for a canvas of `width` x `height` logical pixels, with a
    /// [`ManualScheduler`] and an entropy-seeded random source.
    pub fn new(options: Options, width: f32, height: f32) -> Self {
        let mut container = Self {
            options: options.clone(),
            canvas: Canvas::new(width, height),
            interactivity: Interactivity::new(),
            time: Time::new(),
            svg: SvgSource::default(),
            img: RasterSource::default(),
            rng: SmallRng::from_entropy(),
            source_options: options,
            logical_size: Vec2::new(width, height),
            device_pixel_ratio: 1.0,
            scheduler: Box::new(ManualScheduler::new()),
            draw_anim_frame: None,
            check_anim_frame: None,
        };
        container.configure();
        container
    }

    pub fn with_scheduler(mut self, scheduler: impl FrameScheduler + 'static) -> Self {
        self.scheduler = Box::new(scheduler);
        self
    }

    /// Seed the random source for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn set_scheduler(&mut self, scheduler: Box<dyn FrameScheduler>) {
        self.scheduler = scheduler;
    }

    /// Replace the options. Takes effect immediately for the live snapshot;
    /// the population keeps its particles until the next refresh.
    pub fn set_options(&mut self, options: Options) {
        self.source_options = options;
        self.configure();
    }

    /// Options as configured, before pixel-ratio scaling.
    pub fn source_options(&self) -> &Options {
        &self.source_options
    }

    /// Set the host's device pixel ratio. Only used when `retina_detect`
    /// is enabled.
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = ratio.max(f32::EPSILON);
        self.configure();
    }

    /// Pixel ratio in effect: the device ratio with `retina_detect`, else 1.
    pub fn pixel_ratio(&self) -> f32 {
        if self.source_options.retina_detect {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }

    /// Canvas size in logical pixels.
    pub fn logical_size(&self) -> Vec2 {
        self.logical_size
    }

    /// Set the canvas size without touching the population.
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.logical_size = Vec2::new(width, height);
        self.configure();
    }

    /// Rebuild the live options and canvas size from the configured values.
    fn configure(&mut self) {
        let ratio = self.pixel_ratio();
        let mut options = self.source_options.clone();
        if ratio != 1.0 {
            options.apply_pixel_ratio(ratio);
        }
        self.options = options;
        self.canvas.pixel_ratio = ratio;
        self.canvas.resize(self.logical_size.x * ratio, self.logical_size.y * ratio);
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Pending draw-frame request, if any.
    pub fn draw_anim_frame(&self) -> Option<FrameHandle> {
        self.draw_anim_frame
    }

    /// Pending check-frame request (density re-check after a resize), if any.
    pub fn check_anim_frame(&self) -> Option<FrameHandle> {
        self.check_anim_frame
    }

    /// Start a simulation: load shape assets, create the population, apply
    /// density, then either schedule the first draw frame (continuous
    /// motion) or draw once.
    pub async fn start<P: ParticleTrait>(&mut self, particles: &mut Particles<P>) -> Result<(), ParticlesError> {
        self.load_assets()?;

        particles.create(self);
        self.apply_density(particles);

        if self.options.particles.movement.enable {
            self.cancel_draw_frame();
            self.request_draw_frame();
        } else {
            particles.draw(self, 0.0);
        }

        info!(
            "started with {} particles on a {}x{} canvas",
            particles.len(),
            self.canvas.width,
            self.canvas.height
        );
        Ok(())
    }

    /// Load the image shape source if an image shape is configured and it
    /// is not loaded yet.
    pub fn load_assets(&mut self) -> Result<(), ParticlesError> {
        let shape = &self.options.particles.shape;
        if !shape.kind.contains(&ShapeType::Image) {
            return Ok(());
        }
        let source = &shape.image;
        if source.src.is_empty() {
            warn!("image shape configured without an image src");
            return Ok(());
        }

        if source.is_svg() {
            if self.svg.source.is_none() {
                debug!("loading svg shape from {}", source.src);
                self.svg.source = Some(std::fs::read_to_string(&source.src)?);
            }
        } else if self.img.obj.is_none() {
            debug!("loading image shape from {}", source.src);
            self.img.obj = Some(image::open(&source.src)?.to_rgba8());
        }
        Ok(())
    }

    /// Withdraw a frame request. `None` and stale handles are ignored.
    pub fn cancel_animation(&mut self, handle: Option<FrameHandle>) {
        if let Some(handle) = handle {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Cancel both the check and the draw frame.
    pub fn cancel_animation_frames(&mut self) {
        let check = self.check_anim_frame.take();
        let draw = self.draw_anim_frame.take();
        self.cancel_animation(check);
        self.cancel_animation(draw);
    }

    pub(crate) fn cancel_draw_frame(&mut self) {
        let stale = self.draw_anim_frame.take();
        self.cancel_animation(stale);
    }

    pub(crate) fn request_draw_frame(&mut self) {
        let handle = self.scheduler.request_frame();
        trace!("requested draw frame {:?}", handle);
        self.draw_anim_frame = Some(handle);
    }

    pub(crate) fn request_check_frame(&mut self) {
        let stale = self.check_anim_frame.take();
        self.cancel_animation(stale);
        self.check_anim_frame = Some(self.scheduler.request_frame());
    }

    /// Run the callback for a fired frame.
    ///
    /// Returns `false` for handles that are neither the pending draw nor
    /// the pending check frame.
    pub fn handle_frame<P: ParticleTrait>(&mut self, handle: FrameHandle, particles: &mut Particles<P>) -> bool {
        if self.draw_anim_frame == Some(handle) {
            self.draw_anim_frame = None;
            self.time.update();
            self.update_click_state();
            let delta = self.time.frame_delta();
            particles.draw(self, delta);
            if self.options.particles.movement.enable && !self.time.is_paused() {
                self.request_draw_frame();
            }
            trace!(
                "frame {} drew {} particles ({:.1} fps)",
                self.time.frame(),
                particles.len(),
                self.time.fps()
            );
            true
        } else if self.check_anim_frame == Some(handle) {
            self.check_anim_frame = None;
            self.apply_density(particles);
            true
        } else {
            debug!("ignoring stale frame {:?}", handle);
            false
        }
    }

    /// Resize the canvas to `width` x `height` logical pixels.
    ///
    /// With `resize` events enabled, a static population is rebuilt for the
    /// new size right away; a moving one gets its density re-checked on the
    /// next check frame.
    pub fn resize<P: ParticleTrait>(&mut self, width: f32, height: f32, particles: &mut Particles<P>) {
        self.logical_size = Vec2::new(width, height);
        let ratio = self.pixel_ratio();
        self.canvas.resize(width * ratio, height * ratio);

        if !self.options.interactivity.events.resize {
            return;
        }
        if self.options.particles.movement.enable {
            self.request_check_frame();
        } else {
            particles.empty();
            particles.create(self);
            particles.draw(self, 0.0);
            self.apply_density(particles);
        }
    }

    /// Target population for the current canvas area, when density is on.
    pub fn density_target(&self) -> Option<usize> {
        let number = &self.options.particles.number;
        if !number.density.enable || number.density.value_area <= 0.0 {
            return None;
        }
        let mut area = self.canvas.width * self.canvas.height / 1000.0;
        let ratio = self.pixel_ratio();
        if ratio > 1.0 {
            area /= ratio * 2.0;
        }
        Some((area * number.value as f32 / number.density.value_area).round() as usize)
    }

    /// Push or remove particles until the population matches the density
    /// target.
    pub fn apply_density<P: ParticleTrait>(&mut self, particles: &mut Particles<P>) {
        let Some(target) = self.density_target() else {
            return;
        };
        let len = particles.len();
        if target > len {
            debug!("density: adding {} particles", target - len);
            particles.push(self, target - len, None);
        } else if target < len {
            debug!("density: removing {} particles", len - target);
            particles.remove(self, len - target);
        }
    }

    /// Advance the click bubble and click repulse timers.
    pub fn update_click_state(&mut self) {
        let Some(clicked) = self.interactivity.pointer.click_time else {
            return;
        };
        let spent = self.time.elapsed() - clicked;
        let modes = &self.options.interactivity.modes;
        let click = &mut self.interactivity.click;

        if click.bubble_clicking {
            let duration = modes.bubble.duration;
            if spent > duration {
                click.bubble_duration_end = true;
            }
            if spent > duration * 2.0 {
                click.bubble_clicking = false;
                click.bubble_duration_end = false;
            }
        }
        if click.repulse_clicking && spent > modes.repulse.duration {
            click.repulse_clicking = false;
        }
    }

    /// Build the spawn context for one new particle.
    pub(crate) fn spawn_context<'a>(
        &'a mut self,
        index: usize,
        count: usize,
        pushing: bool,
        occupied: &'a [Footprint],
    ) -> SpawnContext<'a> {
        SpawnContext::new(
            index,
            count,
            &self.options,
            self.canvas.size(),
            pushing,
            occupied,
            &mut self.svg,
            self.img.obj.as_ref(),
            &mut self.rng,
        )
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("canvas", &self.canvas)
            .field("draw_anim_frame", &self.draw_anim_frame)
            .field("check_anim_frame", &self.check_anim_frame)
            .field("svg_count", &self.svg.count)
            .finish_non_exhaustive()
    }
}

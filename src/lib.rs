//! # canvas-particles
//!
//! 2D canvas particle animations: a population of small shapes that drift,
//! link to their neighbours with fading lines, and react to the pointer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use canvas_particles::prelude::*;
//!
//! let scheduler = ManualScheduler::new();
//! let mut sim = Simulation::<Particle>::new()
//!     .with_options(Options::from_json(r#"{ "particles": { "number": { "value": 80 } } }"#)?)
//!     .with_canvas_size(800.0, 600.0)
//!     .with_surface(ImageSurface::new(800, 600))
//!     .with_scheduler(scheduler.clone());
//!
//! pollster::block_on(sim.start())?;
//!
//! for handle in scheduler.take_due() {
//!     sim.handle_frame(handle);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Population
//!
//! [`Particles`] owns the particles in insertion order. Each frame it clears
//! the canvas, advances every particle, applies pointer modes and sweeps
//! every unordered pair once for links, attraction and bounce.
//!
//! ### Container
//!
//! [`Container`] holds the options, the [`Canvas`], pointer state, timing and
//! frame requests. Particles reach it through a [`Frame`] borrow rather than
//! a stored back-reference.
//!
//! ### Custom particles
//!
//! The population is generic over [`ParticleTrait`]. The built-in
//! [`Particle`] follows the classic canvas-particle behaviour; implement the trait
//! for your own type to change what each operation does.
//!
//! ## Interaction Modes
//!
//! | Mode | Hover | Click |
//! |------|-------|-------|
//! | `grab` | line to the pointer | - |
//! | `bubble` | grow and fade near the pointer | timed bubble at the click |
//! | `repulse` | push away from the pointer | timed blast from the click |
//! | `push` | - | add particles at the click |
//! | `remove` | - | remove the oldest particles |

pub mod canvas;
pub mod color;
pub mod container;
pub mod error;
pub mod interactivity;
pub mod modes;
pub mod options;
mod particle;
mod particles;
pub mod raster;
pub mod scheduler;
mod simulation;
mod spawn;
pub mod time;

pub use canvas::{Canvas, DrawCommand, DrawLog, Paint, RecordingSurface, Stroke, Surface};
pub use color::{ColorValue, Rgb, Rgba};
pub use container::Container;
pub use error::ParticlesError;
pub use glam::Vec2;
pub use interactivity::{Interactivity, Pointer, PointerEvent, PointerStatus};
pub use modes::{InteractionMode, ModeSet};
pub use options::Options;
pub use particle::{recolor_svg, Frame, Particle, ParticleTrait};
pub use particles::Particles;
pub use raster::ImageSurface;
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use simulation::Simulation;
pub use spawn::{Coordinates, Footprint, SpawnContext};
pub use time::Time;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use canvas_particles::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::{Canvas, RecordingSurface, Surface};
    pub use crate::color::Rgb;
    pub use crate::container::Container;
    pub use crate::error::ParticlesError;
    pub use crate::interactivity::PointerEvent;
    pub use crate::modes::{InteractionMode, ModeSet};
    pub use crate::options::Options;
    pub use crate::particle::{Frame, Particle, ParticleTrait};
    pub use crate::particles::Particles;
    pub use crate::raster::ImageSurface;
    pub use crate::scheduler::{FrameScheduler, ManualScheduler};
    pub use crate::simulation::Simulation;
    pub use crate::spawn::{Coordinates, SpawnContext};
    pub use crate::time::Time;
    pub use crate::Vec2;
}

//! Headless demo: runs a population for a few seconds of simulated time,
//! sweeping the pointer across the canvas, and writes the last frame to a
//! PNG.
//!
//! ```text
//! cargo run -- [options.json] [out.png]
//! ```

use canvas_particles::prelude::*;
use log::info;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const FRAMES: u32 = 180;

fn main() -> Result<(), ParticlesError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let options = match args.next() {
        Some(path) => {
            info!("loading options from {}", path);
            Options::from_path(path)?
        }
        None => Options::default(),
    };
    let out = args.next().unwrap_or_else(|| "particles.png".to_string());

    let scheduler = ManualScheduler::new();
    let mut sim = Simulation::<Particle>::new()
        .with_options(options)
        .with_canvas_size(WIDTH as f32, HEIGHT as f32)
        .with_surface(ImageSurface::new(WIDTH, HEIGHT).with_background(Rgb::new(17, 17, 34).with_alpha(1.0)))
        .with_scheduler(scheduler.clone())
        .with_fixed_delta(1.0 / 60.0);

    pollster::block_on(sim.start())?;

    for frame in 0..FRAMES {
        let t = frame as f32 / FRAMES as f32;
        let x = t * WIDTH as f32;
        let y = HEIGHT as f32 * 0.5 + (t * std::f32::consts::TAU).sin() * HEIGHT as f32 * 0.25;
        sim.handle_pointer(PointerEvent::Moved { x, y });
        if frame == FRAMES / 2 {
            sim.handle_pointer(PointerEvent::Clicked { x, y });
        }

        for handle in scheduler.take_due() {
            sim.handle_frame(handle);
        }
    }

    let container = sim.container();
    info!(
        "{} particles after {} frames ({:.1} fps)",
        sim.particles().len(),
        container.time.frame(),
        container.time.fps()
    );

    if let Some(image) = container.canvas.snapshot() {
        image.save(&out)?;
        info!("wrote {}", out);
    }
    Ok(())
}

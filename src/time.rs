//! Frame clock for the draw loop.
//!
//! Particles move in 60 Hz frame units: a delta of `1.0` is one frame at
//! 60 fps. [`Time`] turns fired frames into those units, either from the
//! wall clock or from a fixed step. Elapsed time is the sum of the scaled
//! steps, so click timers and fixed-step runs are deterministic.
//!
//! ```ignore
//! let mut time = Time::new();
//! time.set_fixed_delta(Some(1.0 / 60.0));
//!
//! time.update();
//! assert_eq!(time.frame_delta(), 1.0);
//! ```

use std::time::{Duration, Instant};

/// Nominal frame rate the motion options are tuned for.
pub const TARGET_FPS: f32 = 60.0;

/// Longest wall-clock gap counted as a single step, in seconds.
pub const MAX_STEP: f32 = 0.25;

/// Weight of the newest sample in the fps moving average.
const FPS_SMOOTHING: f32 = 0.1;

/// Frame timing state.
#[derive(Debug, Clone)]
pub struct Time {
    /// Wall-clock instant of the last step; `None` before the first one.
    last_step: Option<Instant>,
    elapsed: f32,
    delta: f32,
    frame: u64,
    fps: f32,
    paused: bool,
    fixed_delta: Option<f32>,
    time_scale: f32,
}

impl Time {
    pub fn new() -> Self {
        Self {
            last_step: None,
            elapsed: 0.0,
            delta: 0.0,
            frame: 0,
            fps: 0.0,
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Advance by one fired frame and return `(elapsed, delta)` in seconds.
    ///
    /// The first wall-clock step has no previous frame to measure against
    /// and counts as one nominal frame. While paused nothing advances.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let measured = self.last_step.map(|last| now.duration_since(last).as_secs_f32());
        self.last_step = Some(now);

        if self.paused {
            self.delta = 0.0;
            return (self.elapsed, self.delta);
        }

        let raw = match self.fixed_delta {
            Some(step) => step,
            None => measured.unwrap_or(1.0 / TARGET_FPS).min(MAX_STEP),
        };
        if raw > 0.0 {
            let sample = 1.0 / raw;
            self.fps = if self.frame == 0 {
                sample
            } else {
                self.fps + (sample - self.fps) * FPS_SMOOTHING
            };
        }

        self.delta = raw * self.time_scale;
        self.elapsed += self.delta;
        self.frame += 1;
        (self.elapsed, self.delta)
    }

    /// Scaled simulation time since start, in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Scaled length of the last step, in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// The last step in 60 Hz frame units, as handed to the draw cycle.
    #[inline]
    pub fn frame_delta(&self) -> f32 {
        self.delta * TARGET_FPS
    }

    /// Frames stepped since start. Paused frames are not counted.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Smoothed frames per second of the unscaled steps.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn fixed_delta(&self) -> Option<f32> {
        self.fixed_delta
    }

    /// Freeze simulation time. Steps taken while paused have zero delta.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unfreeze. The next wall-clock step counts as one nominal frame.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_step = None;
        }
    }

    /// Step by `delta` seconds per frame instead of the wall clock. `None`
    /// returns to wall-clock timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.map(|d| d.max(0.0));
    }

    /// Multiplier on every step; negative values clamp to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Back to frame zero, keeping the fixed step and time scale.
    pub fn reset(&mut self) {
        *self = Self {
            fixed_delta: self.fixed_delta,
            time_scale: self.time_scale,
            ..Self::new()
        };
    }

    /// The last step as a [`Duration`].
    #[inline]
    pub fn delta_duration(&self) -> Duration {
        Duration::from_secs_f32(self.delta)
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_first_wall_clock_step_is_one_frame() {
        let mut time = Time::new();
        assert_eq!(time.frame(), 0);

        let (elapsed, delta) = time.update();
        assert_eq!(delta, 1.0 / TARGET_FPS);
        assert_eq!(elapsed, delta);
        assert!((time.frame_delta() - 1.0).abs() < 1e-6);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_wall_clock_step_measured_and_clamped() {
        let mut time = Time::new();
        time.update();
        thread::sleep(Duration::from_millis(10));
        time.update();
        assert!(time.delta() >= 0.01);
        assert!(time.delta() <= MAX_STEP);

        time.set_time_scale(1000.0);
        time.update();
        assert!(time.delta() <= MAX_STEP * 1000.0);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(0.1));
        time.update();

        time.pause();
        assert!(time.is_paused());
        time.update();
        time.update();
        assert_eq!(time.elapsed(), 0.1);
        assert_eq!(time.delta(), 0.0);
        assert_eq!(time.frame(), 1);

        time.resume();
        time.update();
        assert!((time.elapsed() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_time_scale() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(1.0 / 60.0));
        time.set_time_scale(2.0);
        time.update();
        assert!((time.frame_delta() - 2.0).abs() < 1e-4);
        // fps reflects the unscaled step
        assert!((time.fps() - 60.0).abs() < 1e-2);

        time.set_time_scale(-1.0);
        assert_eq!(time.time_scale(), 0.0);
    }

    #[test]
    fn test_fixed_delta_is_deterministic() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(1.0 / 60.0));

        thread::sleep(Duration::from_millis(20));
        for _ in 0..60 {
            time.update();
        }

        assert!((time.frame_delta() - 1.0).abs() < 1e-4);
        assert!((time.elapsed() - 1.0).abs() < 1e-4);
        assert_eq!(time.frame(), 60);
    }

    #[test]
    fn test_reset_keeps_step_settings() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(0.5));
        time.set_time_scale(0.5);
        time.update();
        time.pause();

        time.reset();
        assert_eq!(time.elapsed(), 0.0);
        assert_eq!(time.frame(), 0);
        assert!(!time.is_paused());
        assert_eq!(time.fixed_delta(), Some(0.5));

        time.update();
        assert_eq!(time.delta(), 0.25);
    }
}

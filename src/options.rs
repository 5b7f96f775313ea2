//! Simulation options.
//!
//! The layout follows the classic particle-config JSON format:
//!
//! ```json
//! {
//!   "particles": {
//!     "number": { "value": 80, "density": { "enable": true, "value_area": 800 } },
//!     "color": { "value": "#ffffff" },
//!     "shape": { "type": "circle" },
//!     "line_linked": { "enable": true, "distance": 150 },
//!     "move": { "enable": true, "speed": 6, "out_mode": "out" }
//!   },
//!   "interactivity": {
//!     "events": {
//!       "onhover": { "enable": true, "mode": "repulse" },
//!       "onclick": { "enable": true, "mode": "push" }
//!     }
//!   },
//!   "retina_detect": true
//! }
//! ```
//!
//! Every section is optional and falls back to its default.

use crate::color::ColorValue;
use crate::error::ParticlesError;
use crate::modes::{one_or_many, InteractionMode, ModeSet};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root of the options tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub particles: ParticlesOptions,
    pub interactivity: InteractivityOptions,
    /// Scale sizes and distances by the host pixel ratio.
    pub retina_detect: bool,
}

impl Options {
    /// Parse options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ParticlesError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse an options JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParticlesError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Scale every pixel-valued option by `ratio`.
    ///
    /// Call once, on a fresh snapshot; applying it twice scales twice.
    pub fn apply_pixel_ratio(&mut self, ratio: f32) {
        let p = &mut self.particles;
        p.size.value *= ratio;
        p.size.anim.speed *= ratio;
        p.movement.speed *= ratio;
        p.line_linked.distance *= ratio;
        p.line_linked.width *= ratio;
        p.shape.stroke.width *= ratio;

        let m = &mut self.interactivity.modes;
        m.grab.distance *= ratio;
        m.bubble.distance *= ratio;
        m.bubble.size *= ratio;
        m.repulse.distance *= ratio;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlesOptions {
    pub number: NumberOptions,
    pub color: ColorOptions,
    pub shape: ShapeOptions,
    pub opacity: OpacityOptions,
    pub size: SizeOptions,
    pub line_linked: LineLinkedOptions,
    #[serde(rename = "move")]
    pub movement: MoveOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberOptions {
    /// Particles created on start.
    pub value: usize,
    pub density: DensityOptions,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            value: 100,
            density: DensityOptions::default(),
        }
    }
}

/// Scale the population with the canvas area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityOptions {
    pub enable: bool,
    pub value_area: f32,
}

impl Default for DensityOptions {
    fn default() -> Self {
        Self {
            enable: false,
            value_area: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOptions {
    pub value: ColorValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Circle,
    Edge,
    Triangle,
    Polygon,
    Star,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeOptions {
    /// One shape or a list to pick from per particle.
    #[serde(rename = "type", deserialize_with = "one_or_many")]
    pub kind: Vec<ShapeType>,
    pub stroke: StrokeOptions,
    pub polygon: PolygonOptions,
    pub image: ImageOptions,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            kind: vec![ShapeType::Circle],
            stroke: StrokeOptions::default(),
            polygon: PolygonOptions::default(),
            image: ImageOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeOptions {
    pub width: f32,
    pub color: ColorValue,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            width: 0.0,
            color: ColorValue::Fixed(crate::color::Rgb::BLACK),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonOptions {
    pub nb_sides: u32,
}

impl Default for PolygonOptions {
    fn default() -> Self {
        Self { nb_sides: 5 }
    }
}

/// Image shape source. Paths ending in `.svg` are kept as text and
/// recolored per particle; anything else is decoded as a raster image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    pub src: String,
    pub width: f32,
    pub height: f32,
}

impl ImageOptions {
    pub fn is_svg(&self) -> bool {
        Path::new(&self.src)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            .unwrap_or(false)
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            src: String::new(),
            width: 100.0,
            height: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacityOptions {
    pub value: f32,
    pub random: bool,
    pub anim: OpacityAnimOptions,
}

impl Default for OpacityOptions {
    fn default() -> Self {
        Self {
            value: 1.0,
            random: false,
            anim: OpacityAnimOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacityAnimOptions {
    pub enable: bool,
    pub speed: f32,
    pub opacity_min: f32,
    pub sync: bool,
}

impl Default for OpacityAnimOptions {
    fn default() -> Self {
        Self {
            enable: false,
            speed: 2.0,
            opacity_min: 0.0,
            sync: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeOptions {
    pub value: f32,
    pub random: bool,
    pub anim: SizeAnimOptions,
}

impl Default for SizeOptions {
    fn default() -> Self {
        Self {
            value: 3.0,
            random: false,
            anim: SizeAnimOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeAnimOptions {
    pub enable: bool,
    pub speed: f32,
    pub size_min: f32,
    pub sync: bool,
}

impl Default for SizeAnimOptions {
    fn default() -> Self {
        Self {
            enable: false,
            speed: 20.0,
            size_min: 0.0,
            sync: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineLinkedOptions {
    pub enable: bool,
    pub distance: f32,
    pub color: ColorValue,
    pub opacity: f32,
    pub width: f32,
}

impl Default for LineLinkedOptions {
    fn default() -> Self {
        Self {
            enable: true,
            distance: 100.0,
            color: ColorValue::default(),
            opacity: 1.0,
            width: 1.0,
        }
    }
}

/// Initial drift direction of new particles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    None,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl Direction {
    /// Base velocity for this direction (screen coordinates, y down).
    pub fn base_velocity(self) -> Vec2 {
        match self {
            Direction::None => Vec2::ZERO,
            Direction::Top => Vec2::new(0.0, -1.0),
            Direction::TopRight => Vec2::new(0.5, -0.5),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::BottomRight => Vec2::new(0.5, 0.5),
            Direction::Bottom => Vec2::new(0.0, 1.0),
            Direction::BottomLeft => Vec2::new(-0.5, 0.5),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::TopLeft => Vec2::new(-0.5, -0.5),
        }
    }
}

/// What happens to a particle that leaves the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutMode {
    /// Re-enter from the opposite edge.
    #[default]
    Out,
    /// Reflect off the edges.
    Bounce,
    /// Park the particle once it has fully left.
    Destroy,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveOptions {
    /// Continuous motion. When disabled the population is static and
    /// only redrawn after explicit changes.
    pub enable: bool,
    pub speed: f32,
    pub direction: Direction,
    pub random: bool,
    pub straight: bool,
    pub out_mode: OutMode,
    /// Particles bounce off each other.
    pub bounce: bool,
    pub attract: AttractOptions,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            enable: true,
            speed: 2.0,
            direction: Direction::None,
            random: false,
            straight: false,
            out_mode: OutMode::Out,
            bounce: false,
            attract: AttractOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttractOptions {
    pub enable: bool,
    #[serde(rename = "rotateX")]
    pub rotate_x: f32,
    #[serde(rename = "rotateY")]
    pub rotate_y: f32,
}

impl Default for AttractOptions {
    fn default() -> Self {
        Self {
            enable: false,
            rotate_x: 3000.0,
            rotate_y: 3000.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractivityOptions {
    pub events: EventsOptions,
    pub modes: ModesOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsOptions {
    pub onhover: HoverOptions,
    pub onclick: ClickOptions,
    /// Re-apply density when the canvas is resized.
    pub resize: bool,
}

impl Default for EventsOptions {
    fn default() -> Self {
        Self {
            onhover: HoverOptions::default(),
            onclick: ClickOptions::default(),
            resize: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverOptions {
    pub enable: bool,
    pub mode: ModeSet,
    pub parallax: ParallaxOptions,
}

impl Default for HoverOptions {
    fn default() -> Self {
        Self {
            enable: true,
            mode: ModeSet::single(InteractionMode::Grab),
            parallax: ParallaxOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxOptions {
    pub enable: bool,
    pub force: f32,
    pub smooth: f32,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            enable: false,
            force: 2.0,
            smooth: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickOptions {
    pub enable: bool,
    pub mode: ModeSet,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            enable: true,
            mode: ModeSet::single(InteractionMode::Push),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModesOptions {
    pub grab: GrabOptions,
    pub bubble: BubbleOptions,
    pub repulse: RepulseOptions,
    pub push: PushOptions,
    pub remove: RemoveOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabOptions {
    pub distance: f32,
    pub line_linked: GrabLineOptions,
}

impl Default for GrabOptions {
    fn default() -> Self {
        Self {
            distance: 100.0,
            line_linked: GrabLineOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabLineOptions {
    pub opacity: f32,
}

impl Default for GrabLineOptions {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleOptions {
    pub distance: f32,
    pub size: f32,
    /// Seconds.
    pub duration: f32,
    pub opacity: f32,
}

impl Default for BubbleOptions {
    fn default() -> Self {
        Self {
            distance: 200.0,
            size: 80.0,
            duration: 0.4,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepulseOptions {
    pub distance: f32,
    /// Seconds.
    pub duration: f32,
}

impl Default for RepulseOptions {
    fn default() -> Self {
        Self {
            distance: 200.0,
            duration: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushOptions {
    pub particles_nb: usize,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self { particles_nb: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveOptions {
    pub particles_nb: usize,
}

impl Default for RemoveOptions {
    fn default() -> Self {
        Self { particles_nb: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_empty_json_gives_defaults() {
        let options = Options::from_json("{}").unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.particles.number.value, 100);
        assert!(options.particles.movement.enable);
    }

    #[test]
    fn test_classic_layout() {
        let json = r##"{
            "particles": {
                "number": { "value": 40, "density": { "enable": true, "value_area": 500 } },
                "color": { "value": ["#ff0000", "#00ff00"] },
                "shape": { "type": ["circle", "star"], "polygon": { "nb_sides": 6 } },
                "line_linked": { "enable": false },
                "move": {
                    "speed": 4,
                    "direction": "top-right",
                    "out_mode": "bounce",
                    "attract": { "enable": true, "rotateX": 600, "rotateY": 1200 }
                }
            },
            "interactivity": {
                "events": {
                    "onhover": { "enable": true, "mode": ["bubble", "repulse"] },
                    "onclick": { "enable": false, "mode": "remove" }
                },
                "modes": { "push": { "particles_nb": 7 } }
            },
            "retina_detect": true
        }"##;

        let options = Options::from_json(json).unwrap();
        let p = &options.particles;
        assert_eq!(p.number.value, 40);
        assert!(p.number.density.enable);
        assert_eq!(
            p.color.value,
            ColorValue::Palette(vec![Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)])
        );
        assert_eq!(p.shape.kind, vec![ShapeType::Circle, ShapeType::Star]);
        assert_eq!(p.shape.polygon.nb_sides, 6);
        assert!(!p.line_linked.enable);
        assert_eq!(p.line_linked.distance, 100.0);
        assert_eq!(p.movement.direction, Direction::TopRight);
        assert_eq!(p.movement.out_mode, OutMode::Bounce);
        assert_eq!(p.movement.attract.rotate_x, 600.0);

        let events = &options.interactivity.events;
        assert!(events.onhover.mode.contains(InteractionMode::Bubble));
        assert!(events.onhover.mode.contains(InteractionMode::Repulse));
        assert!(!events.onhover.mode.contains(InteractionMode::Grab));
        assert_eq!(events.onclick.mode, ModeSet::single(InteractionMode::Remove));
        assert_eq!(options.interactivity.modes.push.particles_nb, 7);
        assert!(options.retina_detect);
    }

    #[test]
    fn test_single_shape_string() {
        let options = Options::from_json(r#"{"particles": {"shape": {"type": "triangle"}}}"#).unwrap();
        assert_eq!(options.particles.shape.kind, vec![ShapeType::Triangle]);
    }

    #[test]
    fn test_invalid_json_is_options_error() {
        let err = Options::from_json(r#"{"particles": {"move": {"out_mode": "explode"}}}"#).unwrap_err();
        assert!(matches!(err, ParticlesError::Options(_)));
    }

    #[test]
    fn test_apply_pixel_ratio() {
        let mut options = Options::default();
        options.apply_pixel_ratio(2.0);
        assert_eq!(options.particles.size.value, 6.0);
        assert_eq!(options.particles.line_linked.distance, 200.0);
        assert_eq!(options.particles.movement.speed, 4.0);
        assert_eq!(options.interactivity.modes.repulse.distance, 400.0);
    }

    #[test]
    fn test_image_svg_detection() {
        let mut image = ImageOptions::default();
        image.src = "assets/logo.SVG".into();
        assert!(image.is_svg());
        image.src = "assets/logo.png".into();
        assert!(!image.is_svg());
    }
}

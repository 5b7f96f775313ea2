//! Colors used for particle fills, strokes and links.

use crate::error::ParticlesError;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ParticlesError> {
        let invalid = || ParticlesError::InvalidColor(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(digits[i..i + 1].repeat(2).as_str());
                Ok(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Rgb::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// `#rrggbb` representation.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Uniformly random color.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Rgb::new(rng.gen(), rng.gen(), rng.gen())
    }

    /// Attach an alpha value in `0.0..=1.0`.
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba::new(self, alpha)
    }
}

impl FromStr for Rgb {
    type Err = ParticlesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

/// An RGB color with a floating point alpha, as handed to a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub color: Rgb,
    pub alpha: f32,
}

impl Rgba {
    pub fn new(color: Rgb, alpha: f32) -> Self {
        Self {
            color,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Pack into `[r, g, b, a]` bytes.
    pub fn to_bytes(&self) -> [u8; 4] {
        [
            self.color.r,
            self.color.g,
            self.color.b,
            (self.alpha * 255.0).round() as u8,
        ]
    }
}

/// A configured color: fixed, random per particle, or picked from a palette.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColorValue {
    Fixed(Rgb),
    Random,
    Palette(Vec<Rgb>),
}

impl ColorValue {
    /// Pick a concrete color.
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> Rgb {
        match self {
            ColorValue::Fixed(c) => *c,
            ColorValue::Random => Rgb::random(rng),
            ColorValue::Palette(colors) if colors.is_empty() => Rgb::WHITE,
            ColorValue::Palette(colors) => colors[rng.gen_range(0..colors.len())],
        }
    }

    #[inline]
    pub fn is_random(&self) -> bool {
        matches!(self, ColorValue::Random)
    }
}

impl Default for ColorValue {
    fn default() -> Self {
        ColorValue::Fixed(Rgb::WHITE)
    }
}

impl From<Rgb> for ColorValue {
    fn from(c: Rgb) -> Self {
        ColorValue::Fixed(c)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColor {
    Name(String),
    List(Vec<String>),
    Rgb(Rgb),
}

fn parse_named(name: &str) -> Result<ColorValue, ParticlesError> {
    if name.eq_ignore_ascii_case("random") {
        Ok(ColorValue::Random)
    } else {
        Rgb::from_hex(name).map(ColorValue::Fixed)
    }
}

impl<'de> Deserialize<'de> for ColorValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match RawColor::deserialize(deserializer)? {
            RawColor::Name(name) => parse_named(&name).map_err(D::Error::custom),
            RawColor::List(names) => names
                .iter()
                .map(|s| Rgb::from_hex(s))
                .collect::<Result<Vec<_>, _>>()
                .map(ColorValue::Palette)
                .map_err(D::Error::custom),
            RawColor::Rgb(c) => Ok(ColorValue::Fixed(c)),
        }
    }
}

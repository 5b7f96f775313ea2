//! Error types for canvas-particles.
//!
//! The population manager itself never fails; errors come from the
//! collaborators around it: loading options, decoding shape images and
//! parsing colors.

use std::fmt;

/// Errors that can occur while configuring or (re)starting a simulation.
#[derive(Debug)]
pub enum ParticlesError {
    /// Failed to read a file from disk.
    Io(std::io::Error),
    /// Failed to decode a raster shape image.
    Image(image::ImageError),
    /// Options JSON was malformed or did not match the expected layout.
    Options(serde_json::Error),
    /// A color string could not be parsed.
    InvalidColor(String),
}

impl fmt::Display for ParticlesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticlesError::Io(e) => write!(f, "Failed to read file: {}", e),
            ParticlesError::Image(e) => write!(f, "Failed to load image: {}", e),
            ParticlesError::Options(e) => write!(f, "Invalid particle options: {}", e),
            ParticlesError::InvalidColor(s) => write!(f, "Invalid color '{}': expected #rgb or #rrggbb", s),
        }
    }
}

impl std::error::Error for ParticlesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParticlesError::Io(e) => Some(e),
            ParticlesError::Image(e) => Some(e),
            ParticlesError::Options(e) => Some(e),
            ParticlesError::InvalidColor(_) => None,
        }
    }
}

impl From<std::io::Error> for ParticlesError {
    fn from(e: std::io::Error) -> Self {
        ParticlesError::Io(e)
    }
}

impl From<image::ImageError> for ParticlesError {
    fn from(e: image::ImageError) -> Self {
        ParticlesError::Image(e)
    }
}

impl From<serde_json::Error> for ParticlesError {
    fn from(e: serde_json::Error) -> Self {
        ParticlesError::Options(e)
    }
}

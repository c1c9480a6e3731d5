//! Level adjustment
//!
//! A piecewise-linear tone curve: everything at or below `lower_bound` maps to
//! black, everything at or above `upper_bound` maps to white, and the span in
//! between is stretched linearly over the full 0..=255 range.

use crate::Effect;
use derivative::Derivative;
use derive_setters::Setters;
use image::GrayImage;

/// Multiplier turning the user facing range value into tone curve bounds.
pub const CONTRAST_FACTOR: f32 = 20.0;

/// Level adjustment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct LevelConfig {
    #[derivative(Default(value = "0"))]
    lower_bound: i32,

    #[derivative(Default(value = "255"))]
    upper_bound: i32,
}

impl LevelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds derived from the range slider: `-range * 20` and `255 + range * 20`.
    ///
    /// Fractional bounds are truncated toward zero.
    pub fn from_range(range: f32) -> Self {
        let spread = range * CONTRAST_FACTOR;
        Self {
            lower_bound: (-spread) as i32,
            upper_bound: (255.0 + spread) as i32,
        }
    }

    /// Bounds after clamping to `[0, 255]`.
    pub fn bounds(&self) -> (i32, i32) {
        (
            self.lower_bound.clamp(0, 255),
            self.upper_bound.clamp(0, 255),
        )
    }

    /// A degenerate curve (`lower >= upper` after clamping) passes images through.
    pub fn is_identity(&self) -> bool {
        let (lower, upper) = self.bounds();
        lower >= upper || (lower == 0 && upper == 255)
    }

    pub fn lut(&self) -> [u8; 256] {
        let (lower, upper) = self.bounds();
        let mut lut = [0u8; 256];

        if lower >= upper {
            for (i, v) in lut.iter_mut().enumerate() {
                *v = i as u8;
            }
            return lut;
        }

        let span = (upper - lower) as f32;
        for (i, v) in lut.iter_mut().enumerate() {
            let i = i as i32;
            *v = if i <= lower {
                0
            } else if i >= upper {
                255
            } else {
                ((i - lower) as f32 / span * 255.0).round() as u8
            };
        }

        lut
    }

    pub fn remap(&self, src: &GrayImage) -> GrayImage {
        let (lower, upper) = self.bounds();
        if lower >= upper {
            log::debug!(
                "degenerate level bounds ({}, {}), passing image through",
                self.lower_bound,
                self.upper_bound
            );
            return src.clone();
        }

        let lut = self.lut();
        let mut result = src.clone();
        for pixel in result.pixels_mut() {
            pixel[0] = lut[pixel[0] as usize];
        }
        result
    }
}

impl Effect for LevelConfig {
    fn apply(&self, image: GrayImage) -> Option<GrayImage> {
        if crate::is_empty(&image) {
            return None;
        }

        if self.is_identity() {
            return Some(image);
        }

        Some(self.remap(&image))
    }
}

/// Apply the tone curve `[lower_bound, upper_bound]` to a grayscale image.
pub fn remap(src: &GrayImage, lower_bound: i32, upper_bound: i32) -> GrayImage {
    LevelConfig::new()
        .with_lower_bound(lower_bound)
        .with_upper_bound(upper_bound)
        .remap(src)
}

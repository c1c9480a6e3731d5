//! Alpha stencil compositing
//!
//! The final grayscale composite becomes an RGBA image painted with a single
//! flat ink tone, where darker sketch pixels are more opaque:
//! `alpha = 255 - gray`.

use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, RgbaImage};
use rayon::prelude::*;

/// Which background the exported stencil is meant to sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilMode {
    /// Black ink, the "white" export.
    LightBackground,
    /// White ink, the "black" export.
    DarkBackground,
}

impl StencilMode {
    pub fn ink(&self) -> u8 {
        match self {
            StencilMode::LightBackground => 0,
            StencilMode::DarkBackground => 255,
        }
    }

    /// The background color the stencil is designed for.
    pub fn background(&self) -> [u8; 3] {
        let bg = 255 - self.ink();
        [bg, bg, bg]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StencilMode::LightBackground => "white",
            StencilMode::DarkBackground => "black",
        }
    }
}

/// `(ink, ink, ink, 255 - gray)` for every pixel.
pub fn composite(gray: &GrayImage, mode: StencilMode) -> RgbaImage {
    let ink = mode.ink();
    let (width, height) = gray.dimensions();

    let mut data = vec![0u8; gray.as_raw().len() * 4];
    data.par_chunks_exact_mut(4)
        .zip(gray.as_raw().par_iter())
        .for_each(|(pixel, &g)| {
            pixel.copy_from_slice(&[ink, ink, ink, 255 - g]);
        });

    RgbaImage::from_raw(width, height, data).unwrap_or_else(|| RgbaImage::new(width, height))
}

/// Color clearer configuration
///
/// Rewrites an RGBA image so that it keeps the same appearance over `target`
/// while using the least alpha possible: whatever matches the background
/// becomes transparent.
#[derive(Debug, Clone, Copy, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ColorClearer {
    #[derivative(Default(value = "[255, 255, 255]"))]
    target: [u8; 3],
}

impl ColorClearer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_mode(mode: StencilMode) -> Self {
        Self {
            target: mode.background(),
        }
    }

    pub fn apply(&self, image: &RgbaImage) -> RgbaImage {
        let target = self.target.map(|c| c as f64);
        let (width, height) = image.dimensions();
        let mut data = image.as_raw().clone();

        data.par_chunks_exact_mut(4).for_each(|pixel| {
            let alpha = pixel[3] as f64 / 255.0;
            let seen: [f64; 3] =
                std::array::from_fn(|i| target[i] * (1.0 - alpha) + pixel[i] as f64 * alpha);

            let min_alpha = (0..3)
                .map(|i| channel_min_alpha(seen[i], target[i]))
                .fold(0.0f64, f64::max);

            for i in 0..3 {
                let color = if min_alpha > 0.0 {
                    (seen[i] * 255.0 - target[i] * (255.0 - min_alpha)) / min_alpha
                } else {
                    seen[i]
                };
                pixel[i] = color.clamp(0.0, 255.0) as u8;
            }
            pixel[3] = min_alpha.clamp(0.0, 255.0) as u8;
        });

        RgbaImage::from_raw(width, height, data).unwrap_or_else(|| image.clone())
    }
}

fn channel_min_alpha(seen: f64, background: f64) -> f64 {
    if seen > background && background < 255.0 {
        (255.0 * (seen - background) / (255.0 - background)).ceil()
    } else if seen < background && background > 0.0 {
        (255.0 * (background - seen) / background).ceil()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    #[test]
    fn test_composite_light_background() {
        let gray = GrayImage::from_raw(3, 1, vec![0, 128, 255]).unwrap();
        let out = composite(&gray, StencilMode::LightBackground);
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([0, 0, 0, 127]));
        assert_eq!(*out.get_pixel(2, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_composite_dark_background() {
        let gray = GrayImage::from_pixel(2, 2, Luma([40]));
        let out = composite(&gray, StencilMode::DarkBackground);
        assert!(out.pixels().all(|p| *p == Rgba([255, 255, 255, 215])));
    }

    #[test]
    fn test_mode_background() {
        assert_eq!(StencilMode::LightBackground.background(), [255, 255, 255]);
        assert_eq!(StencilMode::DarkBackground.background(), [0, 0, 0]);
    }

    #[test]
    fn test_color_clearer_removes_background_color() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let out = ColorClearer::new().apply(&img);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_color_clearer_keeps_black_ink() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let out = ColorClearer::for_mode(StencilMode::LightBackground).apply(&img);
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_color_clearer_grey_on_white() {
        // 50% grey over white needs at least half opacity of pure black
        let img = RgbaImage::from_pixel(1, 1, Rgba([128, 128, 128, 255]));
        let out = ColorClearer::new().apply(&img);
        let p = out.get_pixel(0, 0);
        assert_eq!(p[3], 127);
        assert!(p[0] <= 1);
    }
}

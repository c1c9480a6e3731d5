//! Pencil sketch synthesis
//!
//! gray -> invert -> gaussian blur -> invert -> divide blend -> level remap.
//!
//! The double inversion around the blur followed by the divide blend is the
//! classic "color dodge" sketch: flat areas go to white while edges, where the
//! blurred copy differs from the unblurred gray, keep graphite-like strokes.
//! The tip size controls the blur extent and the range feeds the tone curve.

use crate::{Effect, Invert, level::LevelConfig};
use derivative::Derivative;
use derive_setters::Setters;
use image::{DynamicImage, GenericImageView, GrayImage};
use rayon::prelude::*;

pub const MIN_TIP_SIZE: u32 = 1;
pub const MAX_TIP_SIZE: u32 = 51;
pub const MIN_RANGE: f32 = -5.0;
pub const MAX_RANGE: f32 = 5.0;

/// The two user facing sketch controls.
#[derive(Debug, Clone, Copy, PartialEq, Derivative)]
#[derivative(Default)]
pub struct SketchParams {
    #[derivative(Default(value = "20"))]
    pub tip_size: u32,

    #[derivative(Default(value = "-1.5"))]
    pub range: f32,
}

impl SketchParams {
    pub fn new(tip_size: u32, range: f32) -> Self {
        Self { tip_size, range }
    }

    /// The blur kernel side actually used for `tip_size`.
    pub fn kernel_size(&self) -> u32 {
        odd_kernel_size(self.tip_size)
    }

    pub fn level(&self) -> LevelConfig {
        LevelConfig::from_range(self.range)
    }
}

/// Coerce an arbitrary tip size to an odd kernel side of at least 1.
pub fn odd_kernel_size(tip_size: u32) -> u32 {
    if tip_size % 2 == 0 {
        tip_size + 1
    } else {
        tip_size
    }
}

/// Sigma for a kernel of side `k` when none is given explicitly.
pub fn gaussian_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D gaussian weights of length `kernel_size` (coerced to odd).
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let size = odd_kernel_size(kernel_size);
    if size == 1 {
        return vec![1.0];
    }

    let sigma = gaussian_sigma(size);
    let half = (size / 2) as i32;
    let denom = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();

    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Mirror an out of range index back inside `0..len` without repeating the edge
/// sample (`dcb|abcd|cba`).
fn reflect_101(index: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }

    let mut i = index;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= len {
            i = 2 * (len - 1) - i;
        } else {
            return i as usize;
        }
    }
}

/// Gaussian blur configuration
#[derive(Debug, Clone, Copy, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GaussianBlurConfig {
    #[derivative(Default(value = "3"))]
    kernel_size: u32,
}

impl GaussianBlurConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kernel_size(&self) -> u32 {
        odd_kernel_size(self.kernel_size)
    }

    pub fn blur(&self, image: &GrayImage) -> GrayImage {
        let kernel = gaussian_kernel(self.kernel_size);
        if kernel.len() == 1 {
            return image.clone();
        }

        let (width, height) = (image.width() as usize, image.height() as usize);
        let half = (kernel.len() / 2) as i64;
        let src = image.as_raw();

        let mut horizontal = vec![0f32; width * height];
        horizontal
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let line = &src[y * width..(y + 1) * width];
                for (x, out) in row.iter_mut().enumerate() {
                    *out = kernel
                        .iter()
                        .enumerate()
                        .map(|(k, w)| {
                            let sx = reflect_101(x as i64 + k as i64 - half, width as i64);
                            line[sx] as f32 * w
                        })
                        .sum();
                }
            });

        let mut blurred = vec![0u8; width * height];
        blurred
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let value: f32 = kernel
                        .iter()
                        .enumerate()
                        .map(|(k, w)| {
                            let sy = reflect_101(y as i64 + k as i64 - half, height as i64);
                            horizontal[sy * width + x] * w
                        })
                        .sum();
                    *out = value.round().clamp(0.0, 255.0) as u8;
                }
            });

        GrayImage::from_raw(image.width(), image.height(), blurred)
            .unwrap_or_else(|| image.clone())
    }
}

impl Effect for GaussianBlurConfig {
    fn apply(&self, image: GrayImage) -> Option<GrayImage> {
        if crate::is_empty(&image) {
            return None;
        }

        Some(self.blur(&image))
    }
}

/// `round(0.299 R + 0.587 G + 0.114 B)`. Single channel input is used as is,
/// alpha is ignored.
pub fn luminance(src: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = src {
        return gray.clone();
    }

    let rgb = src.to_rgb8();
    let (width, height) = rgb.dimensions();
    let data: Vec<u8> = rgb
        .as_raw()
        .par_chunks_exact(3)
        .map(|p| {
            (0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32)
                .round()
                .min(255.0) as u8
        })
        .collect();

    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// `min(255, round(gray * 256 / divisor))`, a zero divisor yields 255.
pub fn divide_blend(gray: &GrayImage, divisor: &GrayImage) -> GrayImage {
    let data: Vec<u8> = gray
        .as_raw()
        .par_iter()
        .zip(divisor.as_raw().par_iter())
        .map(|(&g, &d)| {
            if d == 0 {
                255
            } else {
                let (g, d) = (g as u32, d as u32);
                ((g * 512 + d) / (2 * d)).min(255) as u8
            }
        })
        .collect();

    GrayImage::from_raw(gray.width(), gray.height(), data)
        .unwrap_or_else(|| GrayImage::new(gray.width(), gray.height()))
}

/// Pencil sketch configuration
#[derive(Debug, Clone, Copy, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct PencilSketchConfig {
    #[derivative(Default(value = "20"))]
    tip_size: u32,

    #[derivative(Default(value = "-1.5"))]
    range: f32,
}

impl PencilSketchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: SketchParams) -> Self {
        Self {
            tip_size: params.tip_size,
            range: params.range,
        }
    }

    pub fn params(&self) -> SketchParams {
        SketchParams::new(self.tip_size, self.range)
    }

    /// Render the sketch, or `None` for a zero area input.
    pub fn sketch(&self, src: &DynamicImage) -> Option<GrayImage> {
        if src.width() == 0 || src.height() == 0 {
            log::debug!("sketch skipped: empty input");
            return None;
        }

        let params = self.params();
        log::debug!(
            "sketch {}x{} tip_size={} kernel={} range={}",
            src.width(),
            src.height(),
            params.tip_size,
            params.kernel_size(),
            params.range
        );

        let gray = luminance(src);
        let inverted = Invert.apply(gray.clone())?;
        let blurred = GaussianBlurConfig::new()
            .with_kernel_size(params.kernel_size())
            .apply(inverted)?;
        let inverted_blur = Invert.apply(blurred)?;
        let sketch = divide_blend(&gray, &inverted_blur);

        params.level().apply(sketch)
    }
}

/// Synthesize a pencil sketch from `src`.
pub fn synthesize(src: &DynamicImage, tip_size: u32, range: f32) -> Option<GrayImage> {
    PencilSketchConfig::new()
        .with_tip_size(tip_size)
        .with_range(range)
        .sketch(src)
}

//! # Sketch Effect
//!
//! Pencil-sketch synthesis and stencil compositing for "bait" images.
//!
//! The pipeline turns a photo into a grayscale pencil sketch, burns text layers
//! into it and converts the result into an RGBA stencil whose alpha is the
//! inverse of the sketch brightness:
//!
//! ```no_run
//! use sketch_effect::{
//!     StencilMode, TextInk, TextLayer, TextLayers,
//!     sketch::PencilSketchConfig,
//!     stencil,
//!     text::{BitmapFont, OverlayConfig, burn_layers},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let photo = image::open("photo.jpg")?;
//! let mut sketch = PencilSketchConfig::new()
//!     .with_tip_size(21)
//!     .with_range(-1.5)
//!     .sketch(&photo)
//!     .ok_or(sketch_effect::SketchEffectError::EmptyInput)?;
//!
//! let mut layers = TextLayers::new();
//! layers.add(TextLayer::new("BAIT", 100, 40).with_ink(TextInk::Bait));
//! burn_layers(&mut sketch, &layers, 1.0, &BitmapFont, &OverlayConfig::default());
//!
//! stencil::composite(&sketch, StencilMode::LightBackground).save("bait_white.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`level`]: piecewise-linear tone curve (level remapping)
//! - [`sketch`]: grayscale, invert, blur, divide-blend pencil sketch
//! - [`text`]: text layers and glyph rasterization
//! - [`stencil`]: grayscale to alpha stencil, color clearer
//! - [`preview`]: aspect-preserving preview downscaling

pub mod level;
pub mod preview;
pub mod sketch;
pub mod stencil;
pub mod text;

pub use image::{DynamicImage, GrayImage, RgbaImage};
pub use level::LevelConfig;
pub use sketch::{PencilSketchConfig, SketchParams};
pub use stencil::{ColorClearer, StencilMode};
pub use text::{GlyphSource, LayerId, OutlineMode, TextInk, TextLayer, TextLayers};

pub type SketchEffectResult<T> = Result<T, SketchEffectError>;

#[derive(thiserror::Error, Debug)]
pub enum SketchEffectError {
    #[error("No image loaded or the image has zero area")]
    EmptyInput,

    #[error("Resized buffer does not match {width}x{height}")]
    ResizedBuffer { width: u32, height: u32 },

    #[error("Font load error: {0}")]
    FontLoad(String),

    #[error("Fast image buffer error: {0}")]
    FastImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Fast image resize error: {0}")]
    FastImageResize(#[from] fast_image_resize::ResizeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// A single-channel image stage.
///
/// Stages consume their input and hand back a freshly owned buffer, or `None`
/// when there is nothing to process.
pub trait Effect {
    fn apply(&self, image: GrayImage) -> Option<GrayImage>;
}

/// Photometric inversion, `255 - v` for every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invert;

impl Effect for Invert {
    fn apply(&self, mut image: GrayImage) -> Option<GrayImage> {
        if is_empty(&image) {
            return None;
        }

        for pixel in image.pixels_mut() {
            pixel[0] = 255 - pixel[0];
        }

        Some(image)
    }
}

pub(crate) fn is_empty<P: image::Pixel>(image: &image::ImageBuffer<P, Vec<P::Subpixel>>) -> bool {
    image.width() == 0 || image.height() == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_twice_is_identity() {
        let img = GrayImage::from_fn(16, 9, |x, y| image::Luma([(x * 13 + y * 7) as u8]));
        let once = Invert.apply(img.clone()).unwrap();
        assert_eq!(once.get_pixel(0, 0)[0], 255);
        assert_eq!(Invert.apply(once).unwrap(), img);
    }

    #[test]
    fn test_invert_empty() {
        assert!(Invert.apply(GrayImage::new(0, 4)).is_none());
    }
}

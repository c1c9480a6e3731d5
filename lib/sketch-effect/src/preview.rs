//! Preview sizing and downscaling.

use crate::SketchEffectResult;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use image::{DynamicImage, GrayImage, ImageBuffer, Pixel, RgbImage};

pub const PREVIEW_MAX_WIDTH: u32 = 600;
pub const PREVIEW_MAX_HEIGHT: u32 = 500;

/// Largest size inside `max_width x max_height` with the aspect ratio of
/// `width x height`. Never upscales and never returns a zero dimension.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (w, h)
}

fn resize_buffer<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    target: (u32, u32),
    pixel_type: PixelType,
) -> SketchEffectResult<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    if (width, height) == target {
        return Ok(image.clone());
    }

    let src = Image::from_vec_u8(width, height, image.as_raw().clone(), pixel_type)?;
    let mut dst = Image::new(target.0, target.1, pixel_type);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    Resizer::new().resize(&src, &mut dst, &options)?;

    ImageBuffer::from_raw(target.0, target.1, dst.into_vec()).ok_or(
        crate::SketchEffectError::ResizedBuffer {
            width: target.0,
            height: target.1,
        },
    )
}

pub fn downscale_gray(
    image: &GrayImage,
    max_width: u32,
    max_height: u32,
) -> SketchEffectResult<GrayImage> {
    let target = fit_within(image.width(), image.height(), max_width, max_height);
    resize_buffer(image, target, PixelType::U8)
}

/// Downscale any decoded image to an RGB preview source.
pub fn downscale_rgb(
    image: &DynamicImage,
    max_width: u32,
    max_height: u32,
) -> SketchEffectResult<RgbImage> {
    let rgb = image.to_rgb8();
    let target = fit_within(rgb.width(), rgb.height(), max_width, max_height);
    resize_buffer(&rgb, target, PixelType::U8x3)
}

// cargo test -p sketch-effect --test pipeline_test

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba};
use sketch_effect::{
    LevelConfig, OutlineMode, SketchParams, StencilMode, TextInk, TextLayer, TextLayers,
    level::remap,
    sketch::{GaussianBlurConfig, gaussian_kernel, synthesize},
    stencil::composite,
    text::{BitmapFont, OverlayConfig, burn_layers},
};

fn gradient(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]))
}

fn photo() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(64, 48, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgb([200, (x * 3) as u8, 40])
        } else {
            Rgb([20, 60, (y * 5) as u8])
        }
    }))
}

#[test]
fn test_degenerate_bounds_pass_through() {
    let img = gradient(40, 30);
    for (lower, upper) in [(100, 100), (200, 50), (255, 0), (-10, -5), (260, 270)] {
        assert_eq!(remap(&img, lower, upper), img, "bounds ({lower}, {upper})");
    }
}

#[test]
fn test_remap_is_monotonic() {
    for (lower, upper) in [(0, 255), (30, 225), (1, 2), (100, 101), (-50, 120), (90, 400)] {
        let lut = LevelConfig::new()
            .with_lower_bound(lower)
            .with_upper_bound(upper)
            .lut();
        assert!(
            lut.windows(2).all(|w| w[0] <= w[1]),
            "lut for ({lower}, {upper}) is not monotonic"
        );
    }
}

#[test]
fn test_identity_remap_is_idempotent() {
    let img = gradient(33, 17);
    let once = remap(&img, 0, 255);
    assert_eq!(once, img);
    assert_eq!(remap(&once, 0, 255), once);
}

#[test]
fn test_synthesize_is_deterministic() {
    let src = photo();
    let a = synthesize(&src, 21, -1.5).unwrap();
    let b = synthesize(&src, 21, -1.5).unwrap();
    assert_eq!(a.dimensions(), (64, 48));
    assert_eq!(a.as_raw(), b.as_raw());
}

#[test]
fn test_synthesize_keeps_edges_dark() {
    let sketch = synthesize(&photo(), 9, 0.0).unwrap();
    assert!(sketch.pixels().any(|p| p[0] < 255));
    assert!(sketch.pixels().any(|p| p[0] == 255));
}

#[test]
fn test_twin_stencils_share_alpha() {
    let gray = gradient(25, 25);
    let light = composite(&gray, StencilMode::LightBackground);
    let dark = composite(&gray, StencilMode::DarkBackground);

    for (l, d) in light.pixels().zip(dark.pixels()) {
        assert_eq!(l[3], d[3]);
        assert_eq!(&l.0[..3], &[0, 0, 0]);
        assert_eq!(&d.0[..3], &[255, 255, 255]);
    }
}

#[test]
fn test_alpha_round_trip() {
    let gray = gradient(31, 9);
    for mode in [StencilMode::LightBackground, StencilMode::DarkBackground] {
        let stencil = composite(&gray, mode);
        for (g, s) in gray.pixels().zip(stencil.pixels()) {
            assert_eq!(255 - s[3], g[0]);
        }
    }
}

#[test]
fn test_mid_grey_with_zero_range() {
    let params = SketchParams::new(21, 0.0);
    assert_eq!(params.level().bounds(), (0, 255));
    assert!(params.level().is_identity());

    let gray = GrayImage::from_pixel(4, 4, Luma([128]));
    let stencil = composite(&params.level().remap(&gray), StencilMode::LightBackground);
    assert_eq!(stencil.get_pixel(2, 2)[3], 127);
}

#[test]
fn test_bait_text_on_white_canvas() {
    let mut canvas = GrayImage::from_pixel(200, 200, Luma([255]));
    let mut layers = TextLayers::new();
    layers.add(
        TextLayer::new("BAIT", 100, 100)
            .with_font_size(40)
            .with_ink(TextInk::Bait),
    );

    burn_layers(&mut canvas, &layers, 1.0, &BitmapFont, &OverlayConfig::new());

    // 40px bitmap text is 160x40, centered on (100, 100)
    assert_eq!(canvas.get_pixel(22, 82)[0], 0);
    assert_eq!(canvas.get_pixel(5, 5)[0], 255);
    assert_eq!(canvas.get_pixel(100, 150)[0], 255);
    assert_eq!(canvas.get_pixel(190, 100)[0], 255);

    let stencil = composite(&canvas, StencilMode::LightBackground);
    assert_eq!(*stencil.get_pixel(22, 82), Rgba([0, 0, 0, 255]));
    assert_eq!(*stencil.get_pixel(5, 5), Rgba([0, 0, 0, 0]));
}

#[test]
fn test_erase_text_with_outline() {
    let mut canvas = GrayImage::from_pixel(200, 200, Luma([128]));
    let mut layers = TextLayers::new();
    layers.add(
        TextLayer::new("BAIT", 100, 100)
            .with_font_size(40)
            .with_ink(TextInk::Erase)
            .with_outline(OutlineMode::Opposite),
    );

    burn_layers(&mut canvas, &layers, 1.0, &BitmapFont, &OverlayConfig::new());

    assert_eq!(canvas.get_pixel(22, 82)[0], 255);
    assert_eq!(canvas.get_pixel(19, 82)[0], 0);
    assert_eq!(canvas.get_pixel(5, 5)[0], 128);
}

#[test]
fn test_layers_scaled_onto_preview() {
    let mut preview = GrayImage::from_pixel(100, 100, Luma([255]));
    let layers: TextLayers = [TextLayer::new("BAIT", 100, 100).with_font_size(40)]
        .into_iter()
        .collect();

    burn_layers(&mut preview, &layers, 0.5, &BitmapFont, &OverlayConfig::new());

    // Half scale: 20px text, 3px cells, 96x24 box centered on (50, 50)
    assert_eq!(preview.get_pixel(3, 39)[0], 0);
    assert_eq!(preview.get_pixel(50, 5)[0], 255);
}

#[test]
fn test_empty_input_yields_nothing() {
    let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
    assert!(synthesize(&empty, 20, -1.5).is_none());
}

#[test]
fn test_even_tip_size_uses_odd_kernel() {
    assert_eq!(SketchParams::new(4, 0.0).kernel_size(), 5);
    assert_eq!(gaussian_kernel(4).len(), 5);

    let mut impulse = GrayImage::new(11, 11);
    impulse.put_pixel(5, 5, Luma([255]));
    let blurred = GaussianBlurConfig::new().with_kernel_size(4).blur(&impulse);

    let lit: Vec<(u32, u32)> = blurred
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0)
        .map(|(x, y, _)| (x, y))
        .collect();

    let xs = lit.iter().map(|(x, _)| *x);
    let ys = lit.iter().map(|(_, y)| *y);
    assert_eq!((xs.clone().min(), xs.max()), (Some(3), Some(7)));
    assert_eq!((ys.clone().min(), ys.max()), (Some(3), Some(7)));
}

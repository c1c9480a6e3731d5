/// Pencil sketch example
/// Renders a few tip sizes and both stencil modes of one image.
///
/// cargo run -p sketch-effect --example pencil_sketch_demo [IMAGE]
use image::{DynamicImage, Rgb, RgbImage};
use sketch_effect::{
    OutlineMode, StencilMode, TextInk, TextLayer, TextLayers,
    sketch::PencilSketchConfig,
    stencil,
    text::{BitmapFont, GlyphSource, OutlineFont, OverlayConfig, burn_layers},
};
use std::path::Path;

fn sample_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(480, 320, |x, y| {
        let dx = x as f32 - 240.0;
        let dy = y as f32 - 160.0;
        if dx * dx + dy * dy < 100.0 * 100.0 {
            Rgb([230, 180, (y / 2) as u8])
        } else {
            Rgb([(x / 3) as u8, 90, 60])
        }
    }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    let img = match std::env::args().nth(1) {
        Some(path) => image::open(path)?,
        None => sample_image(),
    };

    for tip_size in [3, 9, 21, 51] {
        let sketch = PencilSketchConfig::new()
            .with_tip_size(tip_size)
            .sketch(&img)
            .ok_or("empty image")?;

        let filename = format!("pencil_sketch_tip{}.png", tip_size);
        sketch.save(output_dir.join(&filename))?;
        println!("✓ Generated {}", filename);
    }

    let mut sketch = PencilSketchConfig::new().sketch(&img).ok_or("empty image")?;

    let mut layers = TextLayers::new();
    layers.add(TextLayer::new("BAIT", img.width() as i32 / 2, 40).with_font_size(32));
    layers.add(
        TextLayer::new("knockout", img.width() as i32 / 2, img.height() as i32 - 40)
            .with_font_size(24)
            .with_ink(TextInk::Erase)
            .with_outline(OutlineMode::Opposite),
    );

    let font = OutlineFont::from_system();
    let glyphs: &dyn GlyphSource = match &font {
        Some(font) => font,
        None => &BitmapFont,
    };
    burn_layers(&mut sketch, &layers, 1.0, glyphs, &OverlayConfig::new());

    for mode in [StencilMode::LightBackground, StencilMode::DarkBackground] {
        let filename = format!("bait_{}.png", mode.name());
        stencil::composite(&sketch, mode).save(output_dir.join(&filename))?;
        println!("✓ Generated {}", filename);
    }

    println!("\n✓ All pencil sketches rendered successfully!");
    println!("  Images saved to: tmp/");

    Ok(())
}

// cargo test -p bait-maker --test session_test

use bait_maker::{EditorSession, ExportMode, SessionConfig, SessionError, logic::export};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use sketch_effect::{
    OutlineMode, SketchParams, TextInk, TextLayer, stencil::ColorClearer, text::BitmapFont,
};
use std::sync::Arc;

fn ready_session() -> EditorSession {
    let mut session = EditorSession::default();
    session.install_engine(Arc::new(BitmapFont));
    session
}

fn white_photo() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 200, Rgb([255, 255, 255])))
}

#[test]
fn test_engine_gate() {
    let mut session = EditorSession::default();
    assert!(session.recompute().unwrap_err().is_engine_not_ready());
    assert!(session.export(ExportMode::Both).unwrap_err().is_engine_not_ready());

    session.install_engine(Arc::new(BitmapFont));
    assert!(session.is_ready());
    assert_eq!(session.status(), "Ready");
}

#[test]
fn test_recompute_without_image() {
    let mut session = ready_session();
    let err = session.recompute().unwrap_err();
    assert!(err.is_empty_input());
    assert_eq!(session.status(), err.to_string());
}

#[test]
fn test_composite_needs_sketch() {
    let mut session = ready_session();
    session.load_image(white_photo(), None).unwrap();
    assert!(matches!(session.composite_gray(), Err(SessionError::NoSketch)));
}

#[test]
fn test_load_replaces_previous_image() {
    let mut session = ready_session();
    session.load_image(white_photo(), Some("first.jpg")).unwrap();
    session.recompute().unwrap();

    let second = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 20, Rgb([10, 20, 30])));
    session.load_image(second, Some("/photos/second.png")).unwrap();

    assert_eq!(session.source_dimensions(), Some((30, 20)));
    assert_eq!(session.image_stem(), Some("second"));
    assert!(session.sketch().is_none());
}

#[test]
fn test_bait_text_export() {
    let mut session = ready_session();
    session.load_image(white_photo(), Some("canvas.png")).unwrap();
    session.set_params(SketchParams::new(21, 0.0));
    session.add_layer(
        TextLayer::new("BAIT", 100, 100)
            .with_font_size(40)
            .with_ink(TextInk::Bait),
    );

    let artifacts = session.export(ExportMode::Both).unwrap();
    let names: Vec<_> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
    assert_eq!(names, vec!["canvas_bait_white.png", "canvas_bait_black.png"]);

    let white = image::load_from_memory(&artifacts[0].bytes).unwrap().to_rgba8();
    assert_eq!(white.dimensions(), (200, 200));
    assert_eq!(white.get_pixel(22, 82).0, [0, 0, 0, 255]);
    assert_eq!(white.get_pixel(5, 5).0, [0, 0, 0, 0]);

    let black = image::load_from_memory(&artifacts[1].bytes).unwrap().to_rgba8();
    assert_eq!(black.get_pixel(22, 82).0, [255, 255, 255, 255]);
    for (w, b) in white.pixels().zip(black.pixels()) {
        assert_eq!(w[3], b[3]);
    }

    assert!(session.status().contains("canvas_bait_white.png"));
}

#[test]
fn test_export_matches_composite() {
    let photo = DynamicImage::ImageRgb8(RgbImage::from_fn(48, 32, |x, y| {
        Rgb([(x * 5) as u8, (y * 7) as u8, ((x + y) * 3) as u8])
    }));

    let mut session = ready_session();
    session.load_image(photo, None).unwrap();
    session.recompute().unwrap();
    session.add_layer(
        TextLayer::new("x", 24, 16)
            .with_ink(TextInk::Erase)
            .with_outline(OutlineMode::Black),
    );

    let gray = session.composite_gray().unwrap();
    let artifacts = session.export(ExportMode::White).unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].file_name, "bait_white.png");

    let decoded = image::load_from_memory(&artifacts[0].bytes).unwrap().to_rgba8();
    for (g, p) in gray.pixels().zip(decoded.pixels()) {
        assert_eq!(255 - p[3], g[0]);
    }
}

#[test]
fn test_export_with_color_clearer() {
    let mut session = EditorSession::new(SessionConfig::default().with_color_clearer(true));
    session.install_engine(Arc::new(BitmapFont));
    session.load_image(white_photo(), None).unwrap();
    session.add_layer(TextLayer::new("I", 100, 100).with_font_size(16));

    let artifacts = session.export(ExportMode::White).unwrap();
    let decoded = image::load_from_memory(&artifacts[0].bytes).unwrap().to_rgba8();

    let plain = sketch_effect::stencil::composite(
        &session.composite_gray().unwrap(),
        sketch_effect::StencilMode::LightBackground,
    );
    assert_eq!(decoded, ColorClearer::new().apply(&plain));
}

#[test]
fn test_preview_layers_follow_scale() {
    let mut session = ready_session();
    session
        .load_image(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 800, Rgb([255, 255, 255]))),
            None,
        )
        .unwrap();
    session.add_layer(TextLayer::new("BAIT", 400, 400).with_font_size(160));

    let preview = session.render_preview().unwrap();
    assert_eq!(preview.image.dimensions(), (500, 500));
    assert!((preview.scale - 0.625).abs() < 1e-6);

    // 100px text at (250, 250): 13px cells, 416x104 box
    assert_eq!(preview.image.get_pixel(43, 199)[0], 0);
    assert!(preview.image.get_pixel(5, 5)[0] > 200);
}

#[test]
fn test_remove_active_layer() {
    let mut session = ready_session();
    let a = session.add_layer(TextLayer::new("a", 0, 0));
    let b = session.add_layer(TextLayer::new("b", 0, 0));
    assert_eq!(session.active_layer(), Some(b));

    session.set_active_layer(a).unwrap();
    assert_eq!(session.remove_layer(a).unwrap().content, "a");
    assert_eq!(session.active_layer(), None);
    assert!(matches!(
        session.update_layer(a, TextLayer::new("z", 0, 0)),
        Err(SessionError::UnknownLayer(_))
    ));
    assert_eq!(session.layers().len(), 1);
}

#[test]
fn test_write_artifacts() {
    let mut session = ready_session();
    session.load_image(white_photo(), Some("shot.png")).unwrap();
    let artifacts = session.export(ExportMode::Black).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested");
    let paths = export::write_artifacts(&out, &artifacts).unwrap();

    assert_eq!(paths, vec![out.join("shot_bait_black.png")]);
    let img = image::open(&paths[0]).unwrap();
    assert_eq!(img.dimensions(), (200, 200));
    assert!(img.to_luma_alpha8().pixels().all(|p| p[1] == 0));
}

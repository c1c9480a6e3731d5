//! Text layers
//!
//! Text is painted straight into the grayscale composite before the stencil
//! step, so the written tone decides the final opacity: 0 is solid ink and 255
//! punches a transparent hole through the sketch.

mod bitmap;
mod glyph;

pub use bitmap::BitmapFont;
pub use glyph::{GlyphMask, GlyphSource, MAX_MASK_PIXELS, OutlineFont, SYSTEM_FONT_PATHS};

use derivative::Derivative;
use derive_setters::Setters;
use image::GrayImage;
use imageproc::distance_transform::Norm;
use std::{fmt, str::FromStr};

pub const DEFAULT_FONT_SIZE: u32 = 20;
pub const DEFAULT_STROKE_DIVISOR: u32 = 8;
pub const MIN_STROKE_WIDTH: u32 = 2;
pub const MAX_FONT_SIZE: u32 = 2048;

/// Text taller than this many times the target's longest side can't fit, so
/// font sizes are capped there.
const MAX_FONT_TARGET_RATIO: u32 = 4;

/// Fill tone of a text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextInk {
    /// Black, opaque ink in the exported stencil.
    #[default]
    Bait,
    /// White, knocks a transparent hole through the sketch.
    Erase,
}

impl TextInk {
    pub fn tone(&self) -> u8 {
        match self {
            TextInk::Bait => 0,
            TextInk::Erase => 255,
        }
    }
}

impl fmt::Display for TextInk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextInk::Bait => write!(f, "bait"),
            TextInk::Erase => write!(f, "erase"),
        }
    }
}

impl FromStr for TextInk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bait" | "black" => Ok(TextInk::Bait),
            "erase" | "white" => Ok(TextInk::Erase),
            _ => Err(format!("unknown text ink `{s}`, expected bait or erase")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineMode {
    #[default]
    None,
    /// The tone opposite to the fill.
    Opposite,
    Black,
    White,
}

impl OutlineMode {
    /// Outline tone for a given fill, `None` when no outline is drawn.
    pub fn tone(&self, ink: TextInk) -> Option<u8> {
        match self {
            OutlineMode::None => None,
            OutlineMode::Opposite => Some(255 - ink.tone()),
            OutlineMode::Black => Some(0),
            OutlineMode::White => Some(255),
        }
    }
}

impl fmt::Display for OutlineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutlineMode::None => "none",
            OutlineMode::Opposite => "opposite",
            OutlineMode::Black => "black",
            OutlineMode::White => "white",
        };
        write!(f, "{name}")
    }
}

impl FromStr for OutlineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(OutlineMode::None),
            "opposite" => Ok(OutlineMode::Opposite),
            "black" => Ok(OutlineMode::Black),
            "white" => Ok(OutlineMode::White),
            _ => Err(format!(
                "unknown outline `{s}`, expected none, opposite, black or white"
            )),
        }
    }
}

/// A single line of text positioned in source image pixels.
///
/// `(x, y)` is the horizontal center and vertical middle of the line.
#[derive(Debug, Clone, PartialEq, Eq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct TextLayer {
    #[setters(into)]
    pub content: String,

    pub x: i32,

    pub y: i32,

    #[derivative(Default(value = "DEFAULT_FONT_SIZE"))]
    pub font_size: u32,

    pub ink: TextInk,

    pub outline: OutlineMode,
}

impl TextLayer {
    pub fn new(content: impl Into<String>, x: i32, y: i32) -> Self {
        Self::default().with_content(content).with_x(x).with_y(y)
    }

    /// Position and size multiplied by `scale`. The font size stays within
    /// `1..=MAX_FONT_SIZE`.
    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            x: (self.x as f32 * scale).round() as i32,
            y: (self.y as f32 * scale).round() as i32,
            font_size: ((self.font_size as f32 * scale).round() as u32).clamp(1, MAX_FONT_SIZE),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Insertion ordered text layers. Later layers paint over earlier ones.
#[derive(Debug, Clone, Default)]
pub struct TextLayers {
    next_id: u64,
    layers: Vec<(LayerId, TextLayer)>,
}

impl TextLayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, layer: TextLayer) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push((id, layer));
        id
    }

    pub fn get(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.iter().find(|(i, _)| *i == id).map(|(_, l)| l)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut TextLayer> {
        self.layers.iter_mut().find(|(i, _)| *i == id).map(|(_, l)| l)
    }

    /// Replace a layer in place, keeping its paint order.
    pub fn update(&mut self, id: LayerId, layer: TextLayer) -> bool {
        match self.get_mut(id) {
            Some(slot) => {
                *slot = layer;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: LayerId) -> Option<TextLayer> {
        let index = self.layers.iter().position(|(i, _)| *i == id)?;
        Some(self.layers.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.iter().map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextLayer> {
        self.layers.iter().map(|(_, l)| l)
    }

    pub fn iter_with_ids(&self) -> impl Iterator<Item = (LayerId, &TextLayer)> {
        self.layers.iter().map(|(id, l)| (*id, l))
    }
}

impl FromIterator<TextLayer> for TextLayers {
    fn from_iter<I: IntoIterator<Item = TextLayer>>(iter: I) -> Self {
        let mut layers = TextLayers::new();
        for layer in iter {
            layers.add(layer);
        }
        layers
    }
}

/// Overlay configuration
#[derive(Debug, Clone, Copy, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct OverlayConfig {
    /// Outline width is `max(2, font_size / stroke_divisor)`.
    #[derivative(Default(value = "DEFAULT_STROKE_DIVISOR"))]
    stroke_divisor: u32,
}

impl OverlayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stroke_width(&self, font_size: u32) -> u32 {
        (font_size / self.stroke_divisor.max(1)).max(MIN_STROKE_WIDTH)
    }
}

/// Map a point on a preview surface drawn at `scale` back to source pixels.
pub fn preview_to_source(x: i32, y: i32, scale: f32) -> (i32, i32) {
    if scale <= 0.0 {
        return (x, y);
    }

    (
        (x as f32 / scale).round() as i32,
        (y as f32 / scale).round() as i32,
    )
}

/// Burn every layer into `target` in insertion order.
///
/// Layer coordinates and font sizes are multiplied by `scale` first, so layers
/// kept in source coordinates can be drawn onto a downscaled preview.
pub fn burn_layers(
    target: &mut GrayImage,
    layers: &TextLayers,
    scale: f32,
    glyphs: &dyn GlyphSource,
    config: &OverlayConfig,
) {
    for layer in layers.iter() {
        burn_layer(target, layer, scale, glyphs, config);
    }
}

pub fn burn_layer(
    target: &mut GrayImage,
    layer: &TextLayer,
    scale: f32,
    glyphs: &dyn GlyphSource,
    config: &OverlayConfig,
) {
    if layer.content.is_empty() {
        return;
    }

    let mut layer = layer.scaled(scale);
    layer.font_size = layer.font_size.min(font_size_limit(target));

    let glyph = glyphs.rasterize_line(&layer.content, layer.font_size as f32);
    if glyph.is_empty() {
        log::debug!("nothing to burn for `{}`", layer.content);
        return;
    }

    let left = (layer.x as f32 - glyph.box_width / 2.0).round() as i32 + glyph.offset_x;
    let top = (layer.y as f32 - glyph.box_height / 2.0).round() as i32 + glyph.offset_y;
    let fill = layer.ink.tone();

    log::debug!(
        "burn `{}` at ({}, {}) size={} ink={} outline={}",
        layer.content,
        layer.x,
        layer.y,
        layer.font_size,
        layer.ink,
        layer.outline
    );

    if let Some(tone) = layer.outline.tone(layer.ink) {
        let radius = config
            .stroke_width(layer.font_size)
            .div_ceil(2)
            .min(u8::MAX as u32);
        let outline = dilate_mask(&glyph.coverage, radius);
        let pad = radius as i32;
        paint(target, &outline, left - pad, top - pad, tone);
    }

    paint(target, &glyph.coverage, left, top, fill);
}

fn font_size_limit(target: &GrayImage) -> u32 {
    target
        .width()
        .max(target.height())
        .saturating_mul(MAX_FONT_TARGET_RATIO)
        .clamp(1, MAX_FONT_SIZE)
}

/// Binary dilation of the glyph coverage, padded so the stroke is not clipped.
fn dilate_mask(coverage: &GrayImage, radius: u32) -> GrayImage {
    let (width, height) = coverage.dimensions();
    let mut padded = GrayImage::new(width + radius * 2, height + radius * 2);

    for (x, y, p) in coverage.enumerate_pixels() {
        if p[0] > 0 {
            padded.put_pixel(x + radius, y + radius, image::Luma([255]));
        }
    }

    imageproc::morphology::dilate(&padded, Norm::LInf, radius as u8)
}

/// Blend `tone` into `target` weighted by `mask`, with the mask's top-left
/// corner at `(left, top)`.
fn paint(target: &mut GrayImage, mask: &GrayImage, left: i32, top: i32, tone: u8) {
    let (tw, th) = (target.width() as i32, target.height() as i32);

    for (mx, my, m) in mask.enumerate_pixels() {
        let coverage = m[0] as i32;
        if coverage == 0 {
            continue;
        }

        let (x, y) = (left + mx as i32, top + my as i32);
        if x < 0 || y < 0 || x >= tw || y >= th {
            continue;
        }

        let pixel = target.get_pixel_mut(x as u32, y as u32);
        let current = pixel[0] as i32;
        let delta = tone as i32 - current;
        pixel[0] = (current + (delta * coverage + 127 * delta.signum()) / 255).clamp(0, 255) as u8;
    }
}

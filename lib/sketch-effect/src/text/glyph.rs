use crate::{SketchEffectError, SketchEffectResult};
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use image::GrayImage;
use std::path::Path;

/// Candidate sans serif fonts tried when no font path is configured.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Largest coverage mask a glyph source allocates for one line.
pub const MAX_MASK_PIXELS: u64 = 1 << 26;

/// Coverage of one rasterized line of text.
///
/// The line box is `box_width x box_height`, the box the layer position is
/// centered on. `coverage` may be offset from the box top-left corner by
/// `(offset_x, offset_y)` when glyphs overhang it.
#[derive(Debug, Clone, Default)]
pub struct GlyphMask {
    pub coverage: GrayImage,
    pub box_width: f32,
    pub box_height: f32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl GlyphMask {
    pub fn is_empty(&self) -> bool {
        self.coverage.width() == 0 || self.coverage.height() == 0
    }
}

/// Something that can turn a line of text into a coverage mask.
pub trait GlyphSource: Send + Sync {
    fn rasterize_line(&self, text: &str, font_size: f32) -> GlyphMask;
}

/// A scalable TrueType/OpenType font.
#[derive(Clone)]
pub struct OutlineFont {
    font: FontArc,
}

impl std::fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl OutlineFont {
    pub fn from_bytes(data: Vec<u8>) -> SketchEffectResult<Self> {
        let font =
            FontArc::try_from_vec(data).map_err(|e| SketchEffectError::FontLoad(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn load(path: impl AsRef<Path>) -> SketchEffectResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let font = Self::from_bytes(data)
            .map_err(|e| SketchEffectError::FontLoad(format!("{}: {e}", path.display())))?;
        log::info!("loaded font {}", path.display());
        Ok(font)
    }

    /// The first readable font from [`SYSTEM_FONT_PATHS`].
    pub fn from_system() -> Option<Self> {
        SYSTEM_FONT_PATHS
            .iter()
            .filter(|path| Path::new(path).is_file())
            .find_map(|path| match Self::load(path) {
                Ok(font) => Some(font),
                Err(e) => {
                    log::warn!("{e}");
                    None
                }
            })
    }
}

impl GlyphSource for OutlineFont {
    fn rasterize_line(&self, text: &str, font_size: f32) -> GlyphMask {
        let scale = PxScale::from(font_size.max(1.0));
        let scaled = self.font.as_scaled(scale);

        let mut caret = 0.0f32;
        let mut previous: Option<GlyphId> = None;
        let mut outlined = Vec::new();

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }

            let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(g) = self.font.outline_glyph(glyph) {
                outlined.push(g);
            }
        }

        let box_width = caret;
        let box_height = scaled.ascent() - scaled.descent();

        if outlined.is_empty() {
            return GlyphMask {
                box_width,
                box_height,
                ..Default::default()
            };
        }

        let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
        let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
        for g in &outlined {
            let b = g.px_bounds();
            min_x = min_x.min(b.min.x.floor() as i32);
            min_y = min_y.min(b.min.y.floor() as i32);
            max_x = max_x.max(b.max.x.ceil() as i32);
            max_y = max_y.max(b.max.y.ceil() as i32);
        }

        let width = (i64::from(max_x) - i64::from(min_x)).max(0) as u64;
        let height = (i64::from(max_y) - i64::from(min_y)).max(0) as u64;
        if width * height > MAX_MASK_PIXELS {
            log::warn!("`{text}` at {font_size}px exceeds the mask limit");
            return GlyphMask::default();
        }

        let (width, height) = (width as u32, height as u32);
        let mut coverage = GrayImage::new(width, height);

        for g in &outlined {
            let b = g.px_bounds();
            let (gx, gy) = (b.min.x as i32 - min_x, b.min.y as i32 - min_y);
            g.draw(|x, y, c| {
                let (px, py) = (gx + x as i32, gy + y as i32);
                if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                    return;
                }

                let value = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = coverage.get_pixel_mut(px as u32, py as u32);
                pixel[0] = pixel[0].max(value);
            });
        }

        GlyphMask {
            coverage,
            box_width,
            box_height,
            offset_x: min_x,
            offset_y: min_y,
        }
    }
}

use sketch_effect::text::{BitmapFont, GlyphSource, OutlineFont};
use std::{path::Path, sync::Arc};

/// Pick the glyph engine: the configured font, then a system font, then the
/// built-in bitmap font.
pub fn load_engine(font_path: Option<&Path>) -> Arc<dyn GlyphSource> {
    if let Some(path) = font_path {
        match OutlineFont::load(path) {
            Ok(font) => return Arc::new(font),
            Err(e) => log::warn!("{e}, falling back to a system font"),
        }
    }

    if let Some(font) = OutlineFont::from_system() {
        return Arc::new(font);
    }

    log::warn!("no scalable font found, using the built-in bitmap font");
    Arc::new(BitmapFont)
}

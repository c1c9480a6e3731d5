//! Editor session
//!
//! Holds everything the editor works on: at most one source image, at most one
//! full resolution sketch, the sketch parameters, the text layers and the glyph
//! engine. Replacing the image or recomputing the sketch drops the previous
//! buffer. Export buffers only live for the duration of [`EditorSession::export`].

use super::export::{self, ExportArtifact, ExportMode};
use crate::{SessionError, SessionResult};
use derive_setters::Setters;
use image::{DynamicImage, GenericImageView, GrayImage};
use sketch_effect::{
    ColorClearer, LayerId, PencilSketchConfig, SketchParams, TextLayer, TextLayers,
    preview::{self, PREVIEW_MAX_HEIGHT, PREVIEW_MAX_WIDTH},
    sketch::{MAX_RANGE, MAX_TIP_SIZE, MIN_RANGE, MIN_TIP_SIZE},
    stencil,
    text::{self, GlyphSource, OverlayConfig},
};
use std::{path::Path, sync::Arc, time::Instant};

#[derive(Debug, Clone, Copy, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct SessionConfig {
    #[derivative(Default(value = "PREVIEW_MAX_WIDTH"))]
    pub preview_max_width: u32,

    #[derivative(Default(value = "PREVIEW_MAX_HEIGHT"))]
    pub preview_max_height: u32,

    pub overlay: OverlayConfig,

    /// Run the color clearer over exported stencils.
    pub color_clearer: bool,
}

/// A downscaled composite for on-screen display.
#[derive(Debug, Clone)]
pub struct Preview {
    pub image: GrayImage,

    /// `preview width / source width`
    pub scale: f32,
}

impl Preview {
    /// Map a point on the preview back to source image pixels.
    pub fn to_source(&self, x: i32, y: i32) -> (i32, i32) {
        text::preview_to_source(x, y, self.scale)
    }
}

struct SourceImage {
    image: DynamicImage,
    stem: Option<String>,
}

pub struct EditorSession {
    config: SessionConfig,
    engine: Option<Arc<dyn GlyphSource>>,
    source: Option<SourceImage>,
    sketch: Option<GrayImage>,
    params: SketchParams,
    layers: TextLayers,
    active_layer: Option<LayerId>,
    status: String,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            engine: None,
            source: None,
            sketch: None,
            params: SketchParams::default(),
            layers: TextLayers::new(),
            active_layer: None,
            status: "Waiting for the image engine".to_string(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Install the glyph engine. Until then image operations are refused.
    pub fn install_engine(&mut self, engine: Arc<dyn GlyphSource>) {
        self.engine = Some(engine);
        self.set_status("Ready");
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        log::debug!("status: {}", self.status);
    }

    fn fail<T>(&mut self, err: SessionError) -> SessionResult<T> {
        log::warn!("{err}");
        self.set_status(err.to_string());
        Err(err)
    }

    fn ensure_ready(&mut self) -> SessionResult<Arc<dyn GlyphSource>> {
        match &self.engine {
            Some(engine) => Ok(engine.clone()),
            None => self.fail(SessionError::engine_not_ready()),
        }
    }

    /// Replace the current image. `name` is the file name, its stem
    /// prefixes exported files.
    pub fn load_image(&mut self, image: DynamicImage, name: Option<&str>) -> SessionResult<()> {
        self.ensure_ready()?;

        if image.width() == 0 || image.height() == 0 {
            return self.fail(SessionError::empty_input());
        }

        let stem = name
            .and_then(|n| Path::new(n).file_stem())
            .and_then(|s| s.to_str())
            .map(str::to_string);

        self.sketch = None;
        self.source = None;

        let (width, height) = image.dimensions();
        log::info!("loaded image {width}x{height} {:?}", name.unwrap_or_default());

        self.source = Some(SourceImage { image, stem });
        self.set_status(format!("Loaded {width}x{height} image"));
        Ok(())
    }

    pub fn load_path(&mut self, path: impl AsRef<Path>) -> SessionResult<()> {
        self.ensure_ready()?;

        let path = path.as_ref();
        let image = match image::open(path) {
            Ok(image) => image,
            Err(e) => return self.fail(e.into()),
        };

        let name = path.file_name().and_then(|n| n.to_str());
        self.load_image(image, name)
    }

    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }

    pub fn image_stem(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.stem.as_deref())
    }

    pub fn source_dimensions(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(|s| s.image.dimensions())
    }

    pub fn params(&self) -> SketchParams {
        self.params
    }

    /// Update the sketch parameters, clamped to the slider ranges. The current
    /// sketch is dropped when they change.
    pub fn set_params(&mut self, params: SketchParams) {
        let params = SketchParams::new(
            params.tip_size.clamp(MIN_TIP_SIZE, MAX_TIP_SIZE),
            params.range.clamp(MIN_RANGE, MAX_RANGE),
        );

        if params != self.params {
            self.params = params;
            self.sketch = None;
        }
    }

    pub fn sketch(&self) -> Option<&GrayImage> {
        self.sketch.as_ref()
    }

    /// Render the full resolution sketch of the current image.
    pub fn recompute(&mut self) -> SessionResult<()> {
        self.ensure_ready()?;

        let Some(source) = &self.source else {
            return self.fail(SessionError::empty_input());
        };

        let timer = Instant::now();
        let sketch = PencilSketchConfig::from_params(self.params).sketch(&source.image);

        match sketch {
            Some(sketch) => {
                log::debug!(
                    "sketch {}x{} rendered in {:.2?}",
                    sketch.width(),
                    sketch.height(),
                    timer.elapsed()
                );

                self.sketch = Some(sketch);
                self.set_status(format!(
                    "Sketch ready (tip size {}, range {})",
                    self.params.tip_size, self.params.range
                ));
                Ok(())
            }
            None => self.fail(SessionError::empty_input()),
        }
    }

    /// Run the pipeline on a downscaled copy of the image and burn the layers
    /// into it at preview scale.
    pub fn render_preview(&mut self) -> SessionResult<Preview> {
        let engine = self.ensure_ready()?;

        let Some(source) = &self.source else {
            return self.fail(SessionError::empty_input());
        };

        let source_width = source.image.width();
        let small = match preview::downscale_rgb(
            &source.image,
            self.config.preview_max_width,
            self.config.preview_max_height,
        ) {
            Ok(small) => small,
            Err(e) => return self.fail(e.into()),
        };

        let scale = small.width() as f32 / source_width as f32;
        let Some(mut image) =
            PencilSketchConfig::from_params(self.params).sketch(&DynamicImage::ImageRgb8(small))
        else {
            return self.fail(SessionError::empty_input());
        };

        text::burn_layers(
            &mut image,
            &self.layers,
            scale,
            engine.as_ref(),
            &self.config.overlay,
        );

        Ok(Preview { image, scale })
    }

    pub fn layers(&self) -> &TextLayers {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.get(id)
    }

    /// Append a layer on top of the others and make it active.
    pub fn add_layer(&mut self, layer: TextLayer) -> LayerId {
        let id = self.layers.add(layer);
        self.active_layer = Some(id);
        id
    }

    pub fn update_layer(&mut self, id: LayerId, layer: TextLayer) -> SessionResult<()> {
        if self.layers.update(id, layer) {
            Ok(())
        } else {
            self.fail(SessionError::UnknownLayer(id))
        }
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<TextLayer> {
        let removed = self.layers.remove(id);
        if self.active_layer == Some(id) {
            self.active_layer = None;
        }
        removed
    }

    pub fn clear_layers(&mut self) {
        self.layers.clear();
        self.active_layer = None;
    }

    pub fn active_layer(&self) -> Option<LayerId> {
        self.active_layer
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> SessionResult<()> {
        if self.layers.get(id).is_none() {
            return self.fail(SessionError::UnknownLayer(id));
        }

        self.active_layer = Some(id);
        Ok(())
    }

    /// Move the active layer to a point clicked on `preview`.
    pub fn place_active_layer(&mut self, preview: &Preview, x: i32, y: i32) -> SessionResult<()> {
        let Some(id) = self.active_layer else {
            return self.fail(SessionError::NoActiveLayer);
        };

        let (sx, sy) = preview.to_source(x, y);
        match self.layers.get_mut(id) {
            Some(layer) => {
                layer.x = sx;
                layer.y = sy;
                Ok(())
            }
            None => self.fail(SessionError::UnknownLayer(id)),
        }
    }

    /// A scratch copy of the sketch with every layer burned in.
    pub fn composite_gray(&self) -> SessionResult<GrayImage> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(SessionError::engine_not_ready)?;
        let mut gray = self.sketch.clone().ok_or(SessionError::NoSketch)?;

        text::burn_layers(
            &mut gray,
            &self.layers,
            1.0,
            engine.as_ref(),
            &self.config.overlay,
        );

        Ok(gray)
    }

    /// Encode the full resolution stencils for `mode`. The sketch is
    /// recomputed first if the parameters changed since the last render.
    pub fn export(&mut self, mode: ExportMode) -> SessionResult<Vec<ExportArtifact>> {
        self.ensure_ready()?;

        if self.sketch.is_none() {
            self.recompute()?;
        }

        let gray = match self.composite_gray() {
            Ok(gray) => gray,
            Err(e) => return self.fail(e),
        };

        let stem = self.image_stem().map(str::to_string);
        let mut artifacts = Vec::new();

        for stencil_mode in mode.stencil_modes() {
            let mut rgba = stencil::composite(&gray, stencil_mode);
            if self.config.color_clearer {
                rgba = ColorClearer::for_mode(stencil_mode).apply(&rgba);
            }

            let bytes = match export::encode_png(&rgba) {
                Ok(bytes) => bytes,
                Err(e) => return self.fail(e),
            };

            artifacts.push(ExportArtifact {
                file_name: export::artifact_name(stem.as_deref(), stencil_mode),
                mode: stencil_mode,
                bytes,
            });
        }

        let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
        log::info!("exported {}", names.join(", "));
        self.set_status(format!("Exported {}", names.join(", ")));

        Ok(artifacts)
    }
}

use crate::SessionResult;
use image::{ExtendedColorType, ImageEncoder, RgbaImage, codecs::png::PngEncoder};
use serde::{Deserialize, Serialize};
use sketch_effect::StencilMode;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Which stencils an export produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Black ink for light backgrounds.
    White,
    /// White ink for dark backgrounds.
    Black,
    #[default]
    Both,
}

impl ExportMode {
    pub fn stencil_modes(&self) -> Vec<StencilMode> {
        match self {
            ExportMode::White => vec![StencilMode::LightBackground],
            ExportMode::Black => vec![StencilMode::DarkBackground],
            ExportMode::Both => vec![StencilMode::LightBackground, StencilMode::DarkBackground],
        }
    }
}

/// One encoded PNG ready to be saved or offered for download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mode: StencilMode,
    pub bytes: Vec<u8>,
}

/// `{stem}_bait_{white|black}.png`, or `bait_{white|black}.png` without a stem.
pub fn artifact_name(stem: Option<&str>, mode: StencilMode) -> String {
    match stem.filter(|s| !s.is_empty()) {
        Some(stem) => format!("{stem}_bait_{}.png", mode.name()),
        None => format!("bait_{}.png", mode.name()),
    }
}

pub fn encode_png(image: &RgbaImage) -> SessionResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Write every artifact into `dir`, creating it if needed. Returns the
/// written paths in artifact order.
pub fn write_artifacts(dir: &Path, artifacts: &[ExportArtifact]) -> SessionResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = dir.join(&artifact.file_name);
        fs::write(&path, &artifact.bytes)?;
        log::info!("wrote {} ({} bytes)", path.display(), artifact.bytes.len());
        paths.push(path);
    }

    Ok(paths)
}

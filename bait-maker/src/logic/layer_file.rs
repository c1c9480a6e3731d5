//! Text layers stored as TOML:
//!
//! ```toml
//! [[layer]]
//! content = "BAIT"
//! x = 320
//! y = 40
//! font_size = 32
//! ink = "bait"
//! outline = "opposite"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use sketch_effect::{OutlineMode, TextInk, TextLayer, TextLayers};
use std::{fs, path::Path};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LayerFile {
    #[serde(default, rename = "layer")]
    pub layers: Vec<LayerEntry>,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LayerEntry {
    pub content: String,
    pub x: i32,
    pub y: i32,

    #[serde(default)]
    pub font_size: Option<u32>,

    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub ink: TextInk,

    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub outline: OutlineMode,
}

impl LayerEntry {
    pub fn to_layer(&self, default_font_size: u32) -> TextLayer {
        TextLayer::new(&self.content, self.x, self.y)
            .with_font_size(self.font_size.unwrap_or(default_font_size))
            .with_ink(self.ink)
            .with_outline(self.outline)
    }
}

impl LayerFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read layer file {} failed", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse layer file {} failed", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_layers(&self, default_font_size: u32) -> TextLayers {
        self.layers
            .iter()
            .map(|entry| entry.to_layer(default_font_size))
            .collect()
    }
}

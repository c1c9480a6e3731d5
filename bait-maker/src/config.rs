use crate::logic::{export::ExportMode, session::SessionConfig};
use anyhow::{Context, Result, bail};
use log::debug;
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use sketch_effect::{SketchParams, text::OverlayConfig};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const APP_NAME: &str = "bait-maker";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(skip)]
    pub is_first_run: bool,

    #[serde(default)]
    pub sketch: Sketch,

    #[serde(default)]
    pub preview: Preview,

    #[serde(default)]
    pub overlay: Overlay,

    #[serde(default)]
    pub export: Export,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Sketch {
    #[derivative(Default(value = "20"))]
    pub tip_size: u32,

    #[derivative(Default(value = "-1.5"))]
    pub range: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Preview {
    #[derivative(Default(value = "600"))]
    pub max_width: u32,

    #[derivative(Default(value = "500"))]
    pub max_height: u32,

    // ms
    #[derivative(Default(value = "150"))]
    pub debounce_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Overlay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    #[derivative(Default(value = "20"))]
    pub font_size: u32,

    #[derivative(Default(value = "8"))]
    pub stroke_divisor: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Export {
    #[derivative(Default(value = "PathBuf::from(\".\")"))]
    pub output_dir: PathBuf,

    pub mode: ExportMode,

    pub color_clearer: bool,
}

impl Config {
    /// Loads the configuration from `path`, or from the platform config
    /// directory when no path is given. A default file is written when the
    /// file is missing or cannot be parsed.
    pub fn init(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };

        if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("create config dir {} failed", dir.display()))?;
        }

        let mut config = Config {
            config_path,
            ..Default::default()
        };

        config.load().with_context(|| "load config file failed")?;
        debug!("{:?}", config);
        Ok(config)
    }

    fn load(&mut self) -> Result<()> {
        match fs::read_to_string(&self.config_path) {
            Ok(text) => match toml::from_str::<Config>(&text) {
                Ok(mut c) => {
                    c.config_path = self.config_path.clone();
                    c.is_first_run = self.is_first_run;
                    *self = c;

                    Ok(())
                }
                Err(e) => {
                    log::warn!(
                        "parse {} failed, writing defaults. {e}",
                        self.config_path.display()
                    );
                    self.is_first_run = true;

                    if let Some(bak_file) = &self.config_path.as_os_str().to_str() {
                        _ = fs::copy(&self.config_path, format!("{}.bak", bak_file));
                    }

                    self.save()
                }
            },
            Err(_) => {
                self.is_first_run = true;
                self.save()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| "save config failed".to_string())?),
            Err(e) => bail!(format!("convert config to toml format failed. {e:?}")),
        }
    }

    pub fn sketch_params(&self) -> SketchParams {
        SketchParams::new(self.sketch.tip_size, self.sketch.range)
    }

    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig::new().with_stroke_divisor(self.overlay.stroke_divisor)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.preview.debounce_ms)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_preview_max_width(self.preview.max_width)
            .with_preview_max_height(self.preview.max_height)
            .with_overlay(self.overlay_config())
            .with_color_clearer(self.export.color_clearer)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let app_dirs =
        AppDirs::new(Some(APP_NAME), true).context("no platform config directory available")?;
    Ok(app_dirs.config_dir.join(format!("{APP_NAME}.toml")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sketch.tip_size, 20);
        assert_eq!(config.sketch.range, -1.5);
        assert_eq!((config.preview.max_width, config.preview.max_height), (600, 500));
        assert_eq!(config.debounce(), Duration::from_millis(150));
        assert_eq!(config.overlay.font_size, 20);
        assert_eq!(config.export.mode, ExportMode::Both);
        assert!(!config.export.color_clearer);
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [sketch]
            tip_size = 7

            [export]
            mode = "black"
            "#,
        )
        .unwrap();

        assert_eq!(config.sketch.tip_size, 7);
        assert_eq!(config.sketch.range, -1.5);
        assert_eq!(config.export.mode, ExportMode::Black);
        assert_eq!(config.preview.debounce_ms, 150);
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut config = Config::default();
        config.overlay.font_path = Some(PathBuf::from("/tmp/font.ttf"));
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.overlay.font_path, config.overlay.font_path);
        assert_eq!(back.export.output_dir, PathBuf::from("."));
    }
}

//! Bait Maker
//!
//! Turns a photo into a pencil-sketch "bait" stencil: a transparent PNG whose
//! alpha follows the sketch darkness, with optional text burned in.
//!
//! # Architecture
//! - [`config`]: TOML configuration in the platform config directory
//! - [`logic::session`]: the editor session holding the current image, sketch and layers
//! - [`logic::debounce`]: last-write-wins delayed recompute
//! - [`logic::live`]: a shared session driven by debounced parameter edits
//! - [`logic::export`]: PNG encoding and file naming

#[macro_use]
extern crate derivative;

pub mod config;
pub mod logic;

pub use logic::{
    debounce::Debouncer,
    export::{ExportArtifact, ExportMode},
    live::LiveEditor,
    session::{EditorSession, Preview, SessionConfig},
};

use sketch_effect::{LayerId, SketchEffectError};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Effect(#[from] SketchEffectError),

    #[error("Glyph engine is not ready")]
    EngineNotReady,

    #[error("No sketch has been rendered yet")]
    NoSketch,

    #[error("No text layer {0}")]
    UnknownLayer(LayerId),

    #[error("No text layer is selected")]
    NoActiveLayer,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub fn empty_input() -> Self {
        SessionError::Effect(SketchEffectError::EmptyInput)
    }

    pub fn engine_not_ready() -> Self {
        SessionError::EngineNotReady
    }

    pub fn is_empty_input(&self) -> bool {
        matches!(self, SessionError::Effect(SketchEffectError::EmptyInput))
    }

    pub fn is_engine_not_ready(&self) -> bool {
        matches!(self, SessionError::EngineNotReady)
    }
}

/// Initializes the logger.
///
/// Each line carries a local timestamp, the level, the source file name and
/// line number. `RUST_LOG` overrides the default `info` filter.
pub fn init_logger() {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

//! Editor logic
//!
//! The session is the single owner of the current image, sketch and text
//! layers. The remaining modules drive it: debounced live edits, glyph engine
//! selection, layer files and PNG export.

pub mod debounce;
pub mod engine;
pub mod export;
pub mod layer_file;
pub mod live;
pub mod session;

//! Error types shared across the toolkit
//!
//! Lifecycle contract violations (drawing before `init_draw`, drawing a
//! disposed widget) are not represented here: they panic at the point of
//! violation, see [`crate::draw`].

use std::path::PathBuf;
use thiserror::Error;

/// The kind of registry a resource lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Program,
    Texture,
    Color,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Program => f.write_str("program"),
            ResourceKind::Texture => f.write_str("texture"),
            ResourceKind::Color => f.write_str("color"),
        }
    }
}

/// Errors raised by the graphics backend
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("unknown {0} handle")]
    UnknownHandle(&'static str),

    #[error("failed to compile program {name}: {reason}")]
    ProgramCompile { name: String, reason: String },

    #[error("texture upload failed: {0}")]
    TextureUpload(String),

    #[error("surface error: {0}")]
    Surface(String),
}

/// Resource manager errors
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{kind} '{id}' is not registered")]
    NotFound { kind: ResourceKind, id: String },

    #[error("{kind} '{id}' is already registered")]
    Duplicate { kind: ResourceKind, id: String },

    #[error("resource manager has already been disposed")]
    Disposed,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {reason}")]
    Image { path: PathBuf, reason: String },

    #[error("failed to parse palette {path}: {reason}")]
    Palette { path: PathBuf, reason: String },

    #[error("palette {path} has no entry for key '{key}'")]
    MissingColor { path: PathBuf, key: String },

    #[error("graphics error: {0}")]
    Gfx(#[from] GfxError),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

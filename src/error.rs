use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting the scene up. Nothing in the per-frame path returns one:
/// rendering problems degrade to wrong pixels and a log line instead.
#[derive(Debug, Error)]
pub enum ReefError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Malformed program state at field {field} ('{token}')")]
    StateParse { field: usize, token: String },

    #[error("Program state ended after {found} of {expected} fields")]
    StateTruncated { found: usize, expected: usize },

    #[error("Failed to load texture '{path}': {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to save image to '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to load OBJ '{path}': {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Degenerate UV parallelogram (determinant {determinant})")]
    DegenerateUv { determinant: f32 },

    #[error("GUI error: {0}")]
    Gui(String),
}

pub type Result<T> = std::result::Result<T, ReefError>;

use thiserror::Error;

/// Errors raised while turning a file into a scene object.
///
/// None of these are fatal: the importer logs them and the session carries on.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image too small ({width}x{height}, minimum {min}px)")]
    TooSmall { width: u32, height: u32, min: u32 },

    #[error("cannot decode video ({mime}): {reason}")]
    Video { mime: String, reason: String },

    #[error("canvas has no usable area")]
    NoCanvasArea,
}

/// Errors that can occur while applying an undoable command
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("no scene object with id {0}")]
    UnknownObject(usize),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("reorder does not match the current scene")]
    OrderMismatch,

    #[error("nothing to {0}")]
    EmptyHistory(&'static str),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected #rrggbb, got {0:?}")]
    Format(String),
}

/// Errors while loading the optional settings override file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unsupported output format for {}: expected .png or .svg", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("figure size must be positive, got {width}x{height}")]
    EmptyFigure { width: u32, height: u32 },
    #[error("drawing failed: {0}")]
    Drawing(String),
}

impl RenderError {
    pub(crate) fn drawing<E: std::fmt::Display>(err: E) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

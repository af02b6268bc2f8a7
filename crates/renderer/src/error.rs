//! Rendering errors.

use ofs_common::PlotError;
use thiserror::Error;

pub type RendererResult<T> = Result<T, RendererError>;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("invalid canvas size {width}x{height}")]
    CanvasSize { width: u32, height: u32 },

    #[error("grid {name} is empty or mis-shaped")]
    InvalidGrid { name: &'static str },

    #[error("arrow components have different shapes ({u_w}x{u_h} vs {v_w}x{v_h})")]
    ArrowShape {
        u_w: usize,
        u_h: usize,
        v_w: usize,
        v_h: usize,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RendererError> for PlotError {
    fn from(err: RendererError) -> Self {
        match err {
            RendererError::Io(e) => PlotError::Io(e),
            other => PlotError::Render(other.to_string()),
        }
    }
}

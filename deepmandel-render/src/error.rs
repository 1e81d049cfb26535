use thiserror::Error;

/// Errors originating from the frame-build pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid frame dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("build worker disconnected")]
    WorkerDisconnected,

    #[error(transparent)]
    Core(#[from] deepmandel_core::CoreError),
}

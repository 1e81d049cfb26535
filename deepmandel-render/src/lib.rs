pub mod buffer;
pub mod builder;
pub mod coalesce;
pub mod error;
pub mod worker;

pub use buffer::IterationGrid;
pub use builder::{build_frame, Precision};
pub use coalesce::{BuildState, Coalescer};
pub use error::RenderError;
pub use worker::{spawn_build_worker, BuildDriver, BuildJob, BuildRequest, BuildResponse};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;

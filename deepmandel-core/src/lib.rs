pub mod coord;
pub mod double_double;
pub mod error;
pub mod escape;
pub mod viewport;

// Re-export primary types for convenience.
pub use coord::{Coord, CoordDD};
pub use double_double::DoubleDouble;
pub use error::CoreError;
pub use escape::{
    escape_time, evaluate_extended, evaluate_scalar, EscapeArith, EscapeParams, ESCAPE_NORM_SQ,
};
pub use viewport::Viewport;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

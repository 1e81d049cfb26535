use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::double_double::DoubleDouble;
use crate::error::CoreError;

/// Squared divergence threshold: the orbit has escaped once `|z|² > 4`.
pub const ESCAPE_NORM_SQ: f64 = 4.0;

/// The arithmetic capability set needed by the escape-time recurrence.
///
/// The recurrence is written once, generic over this trait, and
/// instantiated for `f64` (the native path) and [`DoubleDouble`] (the
/// deep-zoom path). Keeping a single copy of the loop means the two
/// precision paths cannot drift apart.
pub trait EscapeArith:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
{
    const ZERO: Self;

    /// The escape test on a squared norm: `self > 4`.
    fn exceeds_escape_threshold(self) -> bool;
}

impl EscapeArith for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn exceeds_escape_threshold(self) -> bool {
        self > ESCAPE_NORM_SQ
    }
}

impl EscapeArith for DoubleDouble {
    const ZERO: Self = DoubleDouble::ZERO;

    /// Hi-first comparison with the lo-sign tie-break, so orbits whose
    /// squared norm differs from 4 by less than one native ulp are still
    /// classified correctly.
    #[inline]
    fn exceeds_escape_threshold(self) -> bool {
        self > ESCAPE_NORM_SQ
    }
}

/// Escape-time iteration of `z ← z² + c` from `z = 0`.
///
/// Returns the number of iterations before `|z|²` exceeded 4, capped at
/// `max_iterations`; a saturated count means the point is presumed inside
/// the set. The doubled cross term is computed as `(x + x)·y`, which needs
/// no doubling constant in either arithmetic.
///
/// Pure function of its inputs: identical arguments always produce
/// identical counts, bit-for-bit, and the loop bound guarantees
/// termination within `max_iterations` steps.
#[inline]
pub fn escape_time<T: EscapeArith>(x0: T, y0: T, max_iterations: u32) -> u32 {
    let mut x = T::ZERO;
    let mut y = T::ZERO;
    let mut x2 = T::ZERO;
    let mut y2 = T::ZERO;
    let mut iteration = 0;

    while !(x2 + y2).exceeds_escape_threshold() && iteration < max_iterations {
        y = (x + x) * y + y0;
        x = x2 - y2 + x0;
        x2 = x * x;
        y2 = y * y;
        iteration += 1;
    }

    iteration
}

/// Native-precision escape-time evaluation. One call per pixel/sample.
#[inline]
pub fn evaluate_scalar(x0: f64, y0: f64, max_iterations: u32) -> u32 {
    escape_time(x0, y0, max_iterations)
}

/// Extended-precision escape-time evaluation, for zoom depths where the
/// pixel spacing falls below native resolution.
#[inline]
pub fn evaluate_extended(x0: DoubleDouble, y0: DoubleDouble, max_iterations: u32) -> u32 {
    escape_time(x0, y0, max_iterations)
}

/// Validated iteration bound for a frame build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapeParams {
    pub max_iterations: u32,
}

impl EscapeParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

    pub fn new(max_iterations: u32) -> crate::Result<Self> {
        if max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(max_iterations));
        }
        Ok(Self { max_iterations })
    }
}

impl Default for EscapeParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::double_double::DoubleDouble;

/// A point on the parameter plane, native precision.
///
/// This is a lightweight `Copy` pair for the tight iteration loop. The
/// escape-time recurrence works on the components separately, so no complex
/// operator set is carried here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A parameter-plane point with double-double components (~31 decimal
/// digits per axis). Used by the deep-zoom path where `f64` alone cannot
/// distinguish adjacent pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordDD {
    pub x: DoubleDouble,
    pub y: DoubleDouble,
}

impl CoordDD {
    pub const ZERO: Self = Self {
        x: DoubleDouble::ZERO,
        y: DoubleDouble::ZERO,
    };

    #[inline]
    pub fn new(x: DoubleDouble, y: DoubleDouble) -> Self {
        Self { x, y }
    }

    /// Downcast to native precision (drops the low components).
    #[inline]
    pub fn to_coord(self) -> Coord {
        Coord::new(self.x.to_f64(), self.y.to_f64())
    }
}

impl From<Coord> for CoordDD {
    #[inline]
    fn from(c: Coord) -> Self {
        Self {
            x: DoubleDouble::from(c.x),
            y: DoubleDouble::from(c.y),
        }
    }
}

impl std::fmt::Display for CoordDD {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

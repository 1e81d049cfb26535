use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// A double-double floating-point number: ~31 significant decimal digits.
///
/// Stores a value as `hi + lo` using two `f64` components with the invariant
/// `hi == round(hi + lo)` and `|lo| ≤ ulp(hi)/2`. Arithmetic uses Knuth's
/// TwoSum and the Veltkamp-split Dekker product (error-free transformations)
/// to maintain full precision. The split formulation is used instead of FMA
/// so results are bit-reproducible on targets without a hardware fused
/// multiply-add.
///
/// Reference: Hida, Li, Bailey, "Library for Double-Double and Quad-Double
/// Arithmetic" (2001).
#[derive(Debug, Clone, Copy)]
pub struct DoubleDouble {
    pub hi: f64,
    pub lo: f64,
}

// ---------------------------------------------------------------------------
// Error-free building blocks
// ---------------------------------------------------------------------------

/// Knuth's TwoSum: error-free addition of two `f64` values.
/// Returns `(s, e)` where `s + e = a + b` exactly. Branchless; no magnitude
/// ordering required.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let v = s - a;
    let e = (a - (s - v)) + (b - v);
    (s, e)
}

/// Fast path for TwoSum when `|a| >= |b|`.
#[inline]
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

/// Veltkamp split: decompose `a` into `hi + lo` where `hi` carries the top
/// 26 mantissa bits and `lo` the rest, so products of halves are exact in
/// `f64`. The splitter is `2^⌈53/2⌉ + 1`.
#[inline]
fn split(a: f64) -> (f64, f64) {
    const SPLITTER: f64 = 134_217_729.0; // 2^27 + 1
    let t = SPLITTER * a;
    let hi = t - (t - a);
    let lo = a - hi;
    (hi, lo)
}

/// Dekker's TwoProd via `split`: error-free multiplication.
/// Returns `(p, e)` where `p + e = a * b` exactly.
#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let (a_hi, a_lo) = split(a);
    let (b_hi, b_lo) = split(b);
    let e = ((a_hi * b_hi - p) + a_hi * b_lo + a_lo * b_hi) + a_lo * b_lo;
    (p, e)
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl DoubleDouble {
    pub const ZERO: Self = Self { hi: 0.0, lo: 0.0 };

    #[inline]
    pub fn new(hi: f64, lo: f64) -> Self {
        Self { hi, lo }
    }

    /// The combined value as a single `f64` (loses the low-order bits).
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.hi + self.lo
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.hi > 0.0 || (self.hi == 0.0 && self.lo > 0.0)
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.hi < 0.0 || (self.hi == 0.0 && self.lo < 0.0)
    }
}

impl From<f64> for DoubleDouble {
    #[inline]
    fn from(val: f64) -> Self {
        Self { hi: val, lo: 0.0 }
    }
}

// ---------------------------------------------------------------------------
// Arithmetic: DD + DD, DD + f64
// ---------------------------------------------------------------------------

impl Add for DoubleDouble {
    type Output = Self;

    /// Full double-double addition. Two renormalization passes are needed:
    /// a single `quick_two_sum` leaves the low-pair error term outside
    /// `lo`'s precision budget.
    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (s1, s2) = two_sum(self.hi, rhs.hi);
        let (t1, t2) = two_sum(self.lo, rhs.lo);
        let s2 = s2 + t1;
        let (s1, s2) = quick_two_sum(s1, s2);
        let s2 = s2 + t2;
        let (hi, lo) = quick_two_sum(s1, s2);
        Self { hi, lo }
    }
}

/// Scalar addition: `DoubleDouble + f64`. Used for translation offsets
/// that are exactly representable at native precision.
impl Add<f64> for DoubleDouble {
    type Output = Self;

    #[inline]
    fn add(self, rhs: f64) -> Self {
        let (s, e) = two_sum(self.hi, rhs);
        let e = e + self.lo;
        let (hi, lo) = quick_two_sum(s, e);
        Self { hi, lo }
    }
}

impl AddAssign for DoubleDouble {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

// ---------------------------------------------------------------------------
// Arithmetic: DD - DD, DD - f64
// ---------------------------------------------------------------------------

impl Sub for DoubleDouble {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Sub<f64> for DoubleDouble {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: f64) -> Self {
        self + (-rhs)
    }
}

impl SubAssign for DoubleDouble {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

// ---------------------------------------------------------------------------
// Arithmetic: DD * DD, DD * f64
// ---------------------------------------------------------------------------

impl Mul for DoubleDouble {
    type Output = Self;

    /// Double-double multiplication. The `lo · lo` cross term is below
    /// working precision and dropped.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (p1, p2) = two_prod(self.hi, rhs.hi);
        let p2 = p2 + self.hi * rhs.lo + self.lo * rhs.hi;
        let (hi, lo) = quick_two_sum(p1, p2);
        Self { hi, lo }
    }
}

impl MulAssign for DoubleDouble {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

/// Scalar multiplication: `DoubleDouble * f64`.
impl Mul<f64> for DoubleDouble {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        let (p1, p2) = two_prod(self.hi, rhs);
        let p2 = p2 + self.lo * rhs;
        let (hi, lo) = quick_two_sum(p1, p2);
        Self { hi, lo }
    }
}

// ---------------------------------------------------------------------------
// Arithmetic: DD / f64
// ---------------------------------------------------------------------------

/// Scalar division via one Newton refinement of the reciprocal-multiply
/// estimate: compute a native quotient estimate, measure the residual in
/// double-double, and fold the correction back in.
///
/// Only a scalar divisor is supported. The error bound of the single
/// refinement step holds for a divisor exactly representable at native
/// precision (the uniform zoom factor); dividing by a general
/// `DoubleDouble` is deliberately not provided.
impl Div<f64> for DoubleDouble {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self {
        let xn = 1.0 / rhs;
        let yn = self.hi * xn;
        let (p, e) = two_prod(rhs, yn);
        let residual = (self - Self::new(p, e)).hi;
        let (c_hi, c_lo) = two_prod(xn, residual);
        Self::new(c_hi, c_lo) + yn
    }
}

// ---------------------------------------------------------------------------
// Arithmetic: negation
// ---------------------------------------------------------------------------

impl Neg for DoubleDouble {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

impl PartialEq for DoubleDouble {
    fn eq(&self, other: &Self) -> bool {
        self.hi == other.hi && self.lo == other.lo
    }
}

impl PartialOrd for DoubleDouble {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi) {
            Some(Ordering::Equal) => self.lo.partial_cmp(&other.lo),
            ord => ord,
        }
    }
}

impl PartialEq<f64> for DoubleDouble {
    fn eq(&self, other: &f64) -> bool {
        self.hi == *other && self.lo == 0.0
    }
}

/// Ordering against a plain scalar: compare `hi` first and, only when `hi`
/// equals the scalar exactly, break the tie on the sign of `lo`. This is
/// what lets the escape test separate values that straddle the threshold
/// by less than one native ulp.
impl PartialOrd<f64> for DoubleDouble {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        match self.hi.partial_cmp(other) {
            Some(Ordering::Equal) => self.lo.partial_cmp(&0.0),
            ord => ord,
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+.17e} + {:+.17e})", self.hi, self.lo)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dd(val: f64) -> DoubleDouble {
        DoubleDouble::from(val)
    }

    fn approx_eq_f64(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn approx_eq_dd(a: DoubleDouble, b: DoubleDouble, eps: f64) -> bool {
        let diff = a - b;
        diff.abs().hi < eps
    }

    // -- Error-free building blocks --

    #[test]
    fn two_sum_recovers_exact_error() {
        // 2^60 + 1: the 1 is entirely below the ulp of 2^60, so the exact
        // round-off error is 1.0.
        let a = 2f64.powi(60);
        let (s, e) = two_sum(a, 1.0);
        assert_eq!(s, a);
        assert_eq!(e, 1.0);

        // Operand order must not matter (Knuth's variant is unordered).
        let (s2, e2) = two_sum(1.0, a);
        assert_eq!(s2, s);
        assert_eq!(e2, e);
    }

    #[test]
    fn two_sum_matches_ordered_variant() {
        let samples = [
            (1.0, 1e-17),
            (3.14159, 2.5e-10),
            (1e8, -7.25),
            (-42.0, 1e-9),
            (2f64.powi(40), -2f64.powi(-40)),
        ];
        for &(a, b) in &samples {
            let (s, e) = two_sum(a, b);
            let (qs, qe) = quick_two_sum(a, b); // |a| >= |b| in all samples
            assert_eq!(s, qs, "sums differ for ({a}, {b})");
            assert_eq!(e, qe, "errors differ for ({a}, {b})");
        }
    }

    #[test]
    fn split_halves_recombine_exactly() {
        for &a in &[3.14159265358979, 1e-8, -123456.789, 2f64.powi(30) + 0.5] {
            let (hi, lo) = split(a);
            assert_eq!(hi + lo, a, "split must be exact for {a}");
        }
    }

    #[test]
    fn two_prod_recovers_exact_error() {
        // (1 + 2^-30)² = 1 + 2^-29 + 2^-60. The 2^-60 term does not fit in
        // one f64 next to the leading 1, so it must land in the error term.
        let a = 1.0 + 2f64.powi(-30);
        let (p, e) = two_prod(a, a);
        assert_eq!(p, 1.0 + 2f64.powi(-29));
        assert_eq!(e, 2f64.powi(-60));
    }

    #[test]
    fn two_prod_matches_fma_reference() {
        // mul_add computes the exact rounding error in one step; the split
        // formulation must agree bit-for-bit.
        let samples = [
            (3.7, 2.1),
            (1.0 + 1e-10, 1.0 - 1e-10),
            (-0.75, 0.1),
            (12345.6789, 0.000987654321),
        ];
        for &(a, b) in &samples {
            let (p, e) = two_prod(a, b);
            assert_eq!(p, a * b);
            assert_eq!(e, a.mul_add(b, -p), "error term differs for ({a}, {b})");
        }
    }

    // -- Construction --

    #[test]
    fn from_f64() {
        let d = dd(3.14);
        assert_eq!(d.hi, 3.14);
        assert_eq!(d.lo, 0.0);
    }

    #[test]
    fn zero_constant() {
        let z = DoubleDouble::ZERO;
        assert_eq!(z.hi, 0.0);
        assert_eq!(z.lo, 0.0);
    }

    #[test]
    fn to_f64_roundtrip() {
        let d = dd(2.718281828);
        assert_eq!(d.to_f64(), 2.718281828);
    }

    // -- Basic arithmetic --

    #[test]
    fn addition_simple() {
        let c = dd(1.0) + dd(2.0);
        assert!(approx_eq_f64(c.to_f64(), 3.0, 1e-15));
    }

    #[test]
    fn scalar_addition() {
        let c = dd(1.5) + 2.5;
        assert!(approx_eq_f64(c.to_f64(), 4.0, 1e-15));
    }

    #[test]
    fn subtraction_simple() {
        let c = dd(5.0) - dd(3.0);
        assert!(approx_eq_f64(c.to_f64(), 2.0, 1e-15));
    }

    #[test]
    fn scalar_subtraction() {
        let c = dd(5.0) - 3.0;
        assert!(approx_eq_f64(c.to_f64(), 2.0, 1e-15));
    }

    #[test]
    fn multiplication_simple() {
        let c = dd(3.0) * dd(4.0);
        assert!(approx_eq_f64(c.to_f64(), 12.0, 1e-15));
    }

    #[test]
    fn scalar_multiplication() {
        let c = dd(2.5) * 4.0;
        assert!(approx_eq_f64(c.to_f64(), 10.0, 1e-15));
    }

    #[test]
    fn scalar_division() {
        let c = dd(10.0) / 4.0;
        assert!(approx_eq_f64(c.to_f64(), 2.5, 1e-15));
    }

    #[test]
    fn division_refines_below_native_precision() {
        // 1/3 in double-double: hi is the f64 rounding of 1/3, lo must
        // carry the next ~53 bits of the true expansion.
        let third = dd(1.0) / 3.0;
        assert_eq!(third.hi, 1.0 / 3.0);
        assert!(third.lo != 0.0, "refinement should populate lo");
        // Multiplying back by 3 recovers 1 to double-double accuracy.
        let one = third * 3.0;
        assert!(approx_eq_dd(one, dd(1.0), 1e-31), "3 · (1/3) = {one}");
    }

    #[test]
    fn division_by_power_of_two_preserves_lo() {
        let a = DoubleDouble::new(1.0, 3e-17);
        let half = a / 2.0;
        assert!(approx_eq_dd(half * 2.0, a, 1e-32));
    }

    #[test]
    fn negation() {
        let b = -dd(7.0);
        assert_eq!(b.hi, -7.0);
        assert_eq!(b.lo, 0.0);
    }

    #[test]
    fn compound_assignment() {
        let mut a = dd(1.0);
        a += dd(2.0);
        a -= dd(0.5);
        a *= dd(4.0);
        assert!(approx_eq_f64(a.to_f64(), 10.0, 1e-15));
    }

    // -- Precision retention --

    #[test]
    fn precision_add_small_to_large() {
        // In f64: 1.0 + 1e-17 == 1.0 (the small part is lost).
        // In DD: the small part is preserved in lo.
        let a = dd(1.0);
        let sum = a + dd(1e-17);
        let diff = sum - a;
        let recovered = diff.hi + diff.lo;
        assert!(
            (recovered - 1e-17).abs() < 1e-32,
            "DD should retain 1e-17 after adding to 1.0: got {recovered}"
        );
    }

    #[test]
    fn precision_scalar_add_preserves_lo() {
        let a = DoubleDouble::new(2.0, 3e-17);
        let b = a + 1.0;
        let back = b - 1.0;
        assert!(approx_eq_dd(back, a, 1e-32), "round-trip lost lo: {back}");
    }

    #[test]
    fn precision_multiply() {
        // (1 + 1e-16)² = 1 + 2e-16 + 1e-32. f64 loses the 1e-32 term.
        let one_plus_eps = DoubleDouble::new(1.0, 1e-16);
        let sq = one_plus_eps * one_plus_eps;
        let expected = DoubleDouble::new(1.0, 2e-16) + dd(1e-32);
        assert!(
            approx_eq_dd(sq, expected, 1e-31),
            "DD multiply should retain ~31 digits: got {sq}, expected {expected}"
        );
    }

    #[test]
    fn precision_catastrophic_cancellation() {
        let a = DoubleDouble::new(1.0, 1e-20);
        let diff = a - dd(1.0);
        let val = diff.hi + diff.lo;
        assert!(
            (val - 1e-20).abs() < 1e-35,
            "DD subtraction should survive cancellation: got {val}"
        );
    }

    #[test]
    fn multiplication_is_commutative_bitwise() {
        let pairs = [
            (DoubleDouble::new(1.0, 1e-17), DoubleDouble::new(3.0, -2e-17)),
            (DoubleDouble::new(-0.75, 4e-18), DoubleDouble::new(0.1, 9e-19)),
            (dd(2.0), DoubleDouble::new(1.0, f64::EPSILON / 4.0)),
        ];
        for &(a, b) in &pairs {
            let ab = a * b;
            let ba = b * a;
            assert_eq!(ab.hi.to_bits(), ba.hi.to_bits());
            assert_eq!(ab.lo.to_bits(), ba.lo.to_bits());
        }
    }

    #[test]
    fn add_then_subtract_is_inverse() {
        let a = DoubleDouble::new(1.0, 3e-17);
        let b = DoubleDouble::new(-0.5, 7e-18);
        let round_trip = (a + b) - b;
        assert!(
            approx_eq_dd(round_trip, a, 1e-32),
            "(a + b) - b should recover a: got {round_trip}"
        );
    }

    // -- Sign helpers --

    #[test]
    fn is_positive_negative() {
        assert!(dd(1.0).is_positive());
        assert!(!dd(1.0).is_negative());
        assert!(dd(-1.0).is_negative());
        assert!(!dd(-1.0).is_positive());
        assert!(!DoubleDouble::ZERO.is_positive());
        assert!(!DoubleDouble::ZERO.is_negative());
    }

    #[test]
    fn abs_negative() {
        assert_eq!(dd(-3.0).abs(), dd(3.0));
    }

    // -- Ordering --

    #[test]
    fn ordering_hi_differs() {
        assert!(dd(2.0) > dd(1.0));
        assert!(dd(-1.0) < dd(1.0));
    }

    #[test]
    fn ordering_hi_equal_lo_differs() {
        let a = DoubleDouble::new(1.0, 1e-17);
        let b = DoubleDouble::new(1.0, 0.0);
        assert!(a > b);
    }

    #[test]
    fn scalar_ordering_tie_break() {
        // hi == threshold exactly: the sign of lo decides.
        assert!(DoubleDouble::new(4.0, 1e-20) > 4.0);
        assert!(!(DoubleDouble::new(4.0, -1e-20) > 4.0));
        assert!(!(DoubleDouble::new(4.0, 0.0) > 4.0));
        // hi alone decides when it differs.
        assert!(DoubleDouble::new(4.5, -1e-20) > 4.0);
        assert!(!(DoubleDouble::new(3.5, 1e-20) > 4.0));
    }

    #[test]
    fn equality() {
        assert_eq!(DoubleDouble::new(1.0, 2e-17), DoubleDouble::new(1.0, 2e-17));
        assert_eq!(dd(4.0), 4.0);
        assert_ne!(DoubleDouble::new(4.0, 1e-20), 4.0);
    }

    // -- Zero arithmetic --

    #[test]
    fn add_zero() {
        let a = dd(42.0);
        assert_eq!(a + DoubleDouble::ZERO, a);
    }

    #[test]
    fn mul_zero() {
        let b = dd(42.0) * DoubleDouble::ZERO;
        assert!(approx_eq_f64(b.to_f64(), 0.0, 1e-30));
    }

    #[test]
    fn mul_one() {
        let a = DoubleDouble::new(3.14, 1e-17);
        assert!(approx_eq_dd(a * dd(1.0), a, 1e-30));
    }
}

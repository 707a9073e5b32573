//! Numeric kernel for contact resolution
//!
//! Contact math only ever needs a distance or a unit direction derived from a
//! squared length, so it goes through an approximate reciprocal square root
//! instead of a full `sqrt` followed by a division.

use glam::Vec2;

/// Magic constant for the initial guess of `1/sqrt(x)`
const RSQRT_MAGIC: u32 = 0x5f37_59df;

/// Approximate `1/sqrt(x)` for a non-negative `x`
///
/// Bit-level initial guess refined by one Newton-Raphson step, so the result
/// is within ~0.2% of the exact value. `rsqrt(0.0)` is large but finite and
/// every caller multiplies it by a zero-length quantity in that case.
#[inline]
pub fn rsqrt(x: f32) -> f32 {
    let half = x * 0.5;
    let i = RSQRT_MAGIC.wrapping_sub(x.to_bits() >> 1);
    let y = f32::from_bits(i);
    y * (1.5 - half * y * y)
}

/// Rotate a vector by -90 degrees: `(x, y) -> (y, -x)`
#[inline]
pub fn rotate90(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

//! 26.6 fixed-point helpers.
//!
//! Glyph advances and offsets are stored with 6 fractional bits so that
//! accumulating a line's width is exact and independent of summation order.

/// One pixel in 26.6.
pub const ONE: i32 = 64;

/// Convert pixels to 26.6, rounding to the nearest 1/64.
pub fn from_f32(value: f32) -> i32 {
    (value * ONE as f32).round() as i32
}

/// Convert 26.6 to pixels.
pub fn to_f32(value: i32) -> f32 {
    value as f32 / ONE as f32
}

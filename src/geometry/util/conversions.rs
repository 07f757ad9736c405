//! Safe numeric conversions and decimal rounding.
//!
//! The colouring fold moves values between `f64` and `i64` several times per
//! beam. Every such step goes through these helpers so that non-finite or
//! out-of-range values surface as errors instead of silently saturating.

use num_traits::cast;

// Re-export error type
pub use super::ValueConversionError;

/// Largest number of decimal digits accepted by [`round_to_digits`].
///
/// `10^15` is the last power of ten below 2^53, so beyond this the scaled
/// value no longer has a fractional part to round.
pub const MAX_PRECISION_DIGITS: u32 = 15;

/// Round `value` to `digits` decimal digits, ties to even.
///
/// Ties-to-even keeps the rounding symmetric under negation, which the fold
/// relies on for beams mirrored about the origin. `digits` is clamped to
/// [`MAX_PRECISION_DIGITS`].
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::round_to_digits;
///
/// assert_eq!(round_to_digits(0.123_456_789, 3), 0.123);
/// assert_eq!(round_to_digits(2.5, 0), 2.0);
/// assert_eq!(round_to_digits(-2.5, 0), -2.0);
/// ```
#[must_use]
pub fn round_to_digits(value: f64, digits: u32) -> f64 {
    let digits = digits.min(MAX_PRECISION_DIGITS);
    if digits == 0 {
        return value.round_ties_even();
    }
    let scale = 10_f64.powi(digits as i32);
    (value * scale).round_ties_even() / scale
}

/// Safely convert an `f64` that is already integral into an `i64`.
///
/// # Errors
///
/// Returns `ValueConversionError::NonFinite` for NaN or infinite input and
/// `ValueConversionError::OutOfRange` if the value does not fit in `i64`.
///
/// # Examples
///
/// ```
/// use beam_reuse::geometry::util::safe_f64_to_i64;
///
/// assert_eq!(safe_f64_to_i64(-3.0).unwrap(), -3);
/// assert!(safe_f64_to_i64(f64::NAN).is_err());
/// assert!(safe_f64_to_i64(1e300).is_err());
/// ```
pub fn safe_f64_to_i64(value: f64) -> Result<i64, ValueConversionError> {
    if !value.is_finite() {
        return Err(ValueConversionError::NonFinite {
            value: format!("{value:?}"),
        });
    }
    cast::<f64, i64>(value).ok_or_else(|| ValueConversionError::OutOfRange {
        value: format!("{value:?}"),
        to_type: "i64",
    })
}

/// Round an `f64` to the nearest integer (ties to even) and convert it to `i64`.
///
/// # Errors
///
/// Same as [`safe_f64_to_i64`].
pub fn round_to_i64(value: f64) -> Result<i64, ValueConversionError> {
    safe_f64_to_i64(value.round_ties_even())
}

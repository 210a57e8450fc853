//! This module contains the pure kernel that renders a float as a fixed-width,
//! zero-padded decimal with exactly three fractional digits (`%0*.3f`).
//!
//! Output tiles are a strict grid: every field occupies exactly `width` bytes.
//! A value whose rendering is wider than its slot is truncated into place and
//! reported as `FieldFormatOverflow`, which callers count but never propagate.

use std::fmt::Write;

use crate::error::CsvTileError;

/// Number of fractional digits of every output field.
pub const FRACTION_DIGITS: usize = 3;

/// Renders `value` into `scratch` without any truncation.
fn render(value: f32, width: usize, scratch: &mut String) {
    scratch.clear();
    // Writing into a `String` cannot fail.
    let _ = if value.is_finite() {
        write!(scratch, "{:0width$.prec$}", value, width = width, prec = FRACTION_DIGITS)
    } else if value.is_nan() {
        write!(scratch, "{:>width$}", "nan", width = width)
    } else if value > 0.0 {
        write!(scratch, "{:>width$}", "inf", width = width)
    } else {
        write!(scratch, "{:>width$}", "-inf", width = width)
    };
}

/// Writes `value` into `slot`, which must be exactly the output field width.
///
/// `scratch` is a reusable formatting buffer so hot loops do not allocate.
pub fn write_fixed(value: f32, slot: &mut [u8], scratch: &mut String) -> Result<(), CsvTileError> {
    let width = slot.len();
    render(value, width, scratch);
    let text = scratch.as_bytes();

    if text.len() > width {
        slot.copy_from_slice(&text[..width]);
        return Err(CsvTileError::FieldFormatOverflow { value, width });
    }
    slot.copy_from_slice(text);
    Ok(())
}

//! This module contains the pure kernel that turns the bytes of one delimited
//! field into a float.
//!
//! It accepts decimal literals only: optional leading blanks, an optional sign,
//! decimal digits with an optional fraction and exponent, and the
//! case-insensitive `inf`, `infinity` and `nan` spellings. Hexadecimal floats
//! (`0x1A`, `0x1p3`) are not accepted: the literal ends at the `x`. Parsing stops
//! at the first byte that cannot extend the literal; the caller decides what to
//! do with it.

/// The result of reading one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRead {
    /// The parsed value, `0.0` when nothing could be parsed.
    pub value: f32,
    /// Bytes consumed, up to but excluding the terminating separator/EOL byte.
    pub consumed: usize,
    /// `true` when the field had to be resynchronized.
    pub malformed: bool,
}

//==================================================================================
// 1. Private Core Logic
//==================================================================================

#[inline]
fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[inline]
fn starts_with_ignore_case(bytes: &[u8], word: &[u8]) -> bool {
    bytes.len() >= word.len() && bytes[..word.len()].eq_ignore_ascii_case(word)
}

/// Returns the `(start, end)` span of the float literal at the head of `bytes`,
/// `start` skipping leading blanks. `None` if no literal is present.
fn literal_span(bytes: &[u8]) -> Option<(usize, usize)> {
    let start = bytes
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count();
    let mut i = start;

    if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let rest = &bytes[i..];
    if starts_with_ignore_case(rest, b"infinity") {
        return Some((start, i + 8));
    }
    if starts_with_ignore_case(rest, b"inf") || starts_with_ignore_case(rest, b"nan") {
        return Some((start, i + 3));
    }

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = count_digits(&bytes[i + 1..]);
        if int_digits + frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    // An exponent only counts when it carries at least one digit.
    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&bytes[j.min(bytes.len())..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }
    Some((start, i))
}

#[inline]
fn is_field_end(byte: u8, separator: u8) -> bool {
    byte == separator || byte == b'\n' || byte == b'\r'
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Parses the float literal at the head of `bytes`.
///
/// Returns the value and the number of bytes consumed (leading blanks included),
/// or `None` when zero bytes form a literal.
pub fn parse_float_prefix(bytes: &[u8]) -> Option<(f32, usize)> {
    let (start, end) = literal_span(bytes)?;
    // The span only covers ASCII bytes, so this conversion cannot fail.
    let text = std::str::from_utf8(&bytes[start..end]).ok()?;
    let value = text.parse::<f32>().ok()?;
    Some((value, end))
}

/// Scans forward from `from` for the next separator or line-terminator byte,
/// never looking past `limit` bytes. Returns the index where the scan stopped.
pub fn resync(bytes: &[u8], from: usize, separator: u8, limit: usize) -> usize {
    let bound = limit.min(bytes.len());
    if from >= bound {
        return bound.max(from.min(bytes.len()));
    }
    bytes[from..bound]
        .iter()
        .position(|&b| is_field_end(b, separator))
        .map_or(bound, |p| from + p)
}

/// Reads one field from the head of `bytes`.
///
/// A field is malformed when no literal can be parsed, or when the literal is
/// followed by something other than a separator, a line terminator, or the end
/// of the data. Malformed fields are resynchronized at the next separator, with
/// the scan bounded by `max_span` bytes.
pub fn read_field(bytes: &[u8], separator: u8, max_span: usize) -> FieldRead {
    match parse_float_prefix(bytes) {
        Some((value, consumed)) => match bytes.get(consumed) {
            Some(&next) if !is_field_end(next, separator) => FieldRead {
                value,
                consumed: resync(bytes, consumed, separator, max_span),
                malformed: true,
            },
            _ => FieldRead {
                value,
                consumed,
                malformed: false,
            },
        },
        None => FieldRead {
            value: 0.0,
            consumed: resync(bytes, 0, separator, max_span),
            malformed: true,
        },
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_literals() {
        assert_eq!(parse_float_prefix(b"3.25,1"), Some((3.25, 4)));
        assert_eq!(parse_float_prefix(b"-12\n"), Some((-12.0, 3)));
        assert_eq!(parse_float_prefix(b"+.5"), Some((0.5, 3)));
        assert_eq!(parse_float_prefix(b"7."), Some((7.0, 2)));
        assert_eq!(parse_float_prefix(b"  42,"), Some((42.0, 4)));
    }

    #[test]
    fn test_parse_exponents() {
        assert_eq!(parse_float_prefix(b"1e3,"), Some((1000.0, 3)));
        assert_eq!(parse_float_prefix(b"2.5E-1"), Some((0.25, 6)));
        // A dangling exponent marker is not part of the literal.
        assert_eq!(parse_float_prefix(b"4e,"), Some((4.0, 1)));
        assert_eq!(parse_float_prefix(b"4e+"), Some((4.0, 1)));
    }

    #[test]
    fn test_parse_special_values() {
        let (v, n) = parse_float_prefix(b"-inf,").unwrap();
        assert!(v.is_infinite() && v < 0.0);
        assert_eq!(n, 4);
        let (v, n) = parse_float_prefix(b"Infinity").unwrap();
        assert!(v.is_infinite());
        assert_eq!(n, 8);
        let (v, n) = parse_float_prefix(b"NaN").unwrap();
        assert!(v.is_nan());
        assert_eq!(n, 3);
    }

    #[test]
    fn test_parse_rejects_non_numbers() {
        assert_eq!(parse_float_prefix(b"abc"), None);
        assert_eq!(parse_float_prefix(b"."), None);
        assert_eq!(parse_float_prefix(b"-"), None);
        assert_eq!(parse_float_prefix(b""), None);
        assert_eq!(parse_float_prefix(b",1"), None);
    }

    #[test]
    fn test_hex_floats_are_not_literals() {
        assert_eq!(parse_float_prefix(b"0x1A,2"), Some((0.0, 1)));
        let read = read_field(b"0x1A,2", b',', 8);
        assert_eq!(read, FieldRead { value: 0.0, consumed: 4, malformed: true });
    }

    #[test]
    fn test_read_field_clean() {
        let read = read_field(b"1.5,2.5", b',', 8);
        assert_eq!(read, FieldRead { value: 1.5, consumed: 3, malformed: false });

        let read = read_field(b"9\r\n", b',', 8);
        assert_eq!(read, FieldRead { value: 9.0, consumed: 1, malformed: false });

        // End of data also terminates a field.
        let read = read_field(b"4", b',', 8);
        assert_eq!(read, FieldRead { value: 4.0, consumed: 1, malformed: false });
    }

    #[test]
    fn test_read_field_resyncs_on_garbage() {
        let read = read_field(b"abc,2", b',', 8);
        assert_eq!(read, FieldRead { value: 0.0, consumed: 3, malformed: true });

        let read = read_field(b"1.5xy,2", b',', 8);
        assert_eq!(read, FieldRead { value: 1.5, consumed: 5, malformed: true });

        // Resync stops at a line end rather than running into the next row.
        let read = read_field(b"zz\n1,2", b',', 8);
        assert_eq!(read, FieldRead { value: 0.0, consumed: 2, malformed: true });
    }

    #[test]
    fn test_read_field_resync_is_bounded() {
        let read = read_field(b"xxxxxxxxxxxxxxxx,1", b',', 5);
        assert!(read.malformed);
        assert_eq!(read.consumed, 5);
    }

    #[test]
    fn test_resync_past_the_end() {
        assert_eq!(resync(b"abc", 3, b',', 10), 3);
        assert_eq!(resync(b"abc", 0, b',', 10), 3);
    }
}

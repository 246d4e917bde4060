//! Record scanning over record-aligned byte ranges.
//!
//! Records look like `<key>;<value>\n` where the value has exactly one
//! fractional digit. Values come out scaled by ten (`-12.3` is `-123`) and keys
//! are borrowed straight from the scanned buffer.

use memchr::memchr;

use crate::boundary::TERMINATOR;
use crate::error::{Error, Result};

pub const DELIMITER: u8 = b';';
pub const DECIMAL_POINT: u8 = b'.';
pub const MAX_KEY_LEN: usize = 15;

/// Decodes `-?[0-9]+\.[0-9]` into tenths.
///
/// Nothing is validated. Any other shape yields an unspecified number, but
/// never a panic.
#[inline]
pub fn decode_value(bytes: &[u8]) -> i32 {
    let (sign, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (-1, rest),
        _ => (1, bytes),
    };

    let mut whole: i32 = 0;
    let mut i = 0;
    while i < digits.len() && digits[i] != DECIMAL_POINT {
        whole = whole
            .wrapping_mul(10)
            .wrapping_add(digits[i].wrapping_sub(b'0') as i32);
        i += 1;
    }
    let fraction = match digits.get(i + 1) {
        Some(d) => d.wrapping_sub(b'0') as i32,
        None => 0,
    };

    whole.wrapping_mul(10).wrapping_add(fraction).wrapping_mul(sign)
}

/// Unchecked record iterator.
///
/// `buf` must start on a record boundary. The last record may omit its
/// terminator. A trailing fragment without a delimiter ends the scan.
pub struct Records<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Records<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = (&'a [u8], i32);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.buf.get(self.pos..)?;
        if rest.is_empty() {
            return None;
        }

        let delimiter = memchr(DELIMITER, rest)?;
        let value_start = delimiter + 1;
        let line_end = match memchr(TERMINATOR, &rest[value_start..]) {
            Some(i) => value_start + i,
            None => rest.len(),
        };

        let key = &rest[..delimiter];
        let value = decode_value(&rest[value_start..line_end]);
        self.pos += line_end + 1;
        Some((key, value))
    }
}

/// Validating record iterator.
///
/// Enforces `[A-Za-z]{1,15};-?[0-9]+\.[0-9]` per line and reports the absolute
/// offset (`base` plus the position inside `buf`) of the first bad record.
pub struct CheckedRecords<'a> {
    buf: &'a [u8],
    base: usize,
    pos: usize,
    failed: bool,
}

impl<'a> CheckedRecords<'a> {
    pub fn new(buf: &'a [u8], base: usize) -> Self {
        Self {
            buf,
            base,
            pos: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for CheckedRecords<'a> {
    type Item = Result<(&'a [u8], i32)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.buf.len() {
            return None;
        }

        let rest = &self.buf[self.pos..];
        let line_len = memchr(TERMINATOR, rest).unwrap_or(rest.len());
        let offset = self.base + self.pos;
        self.pos += line_len + 1;

        let parsed =
            check_record(&rest[..line_len]).map_err(|reason| Error::Format { offset, reason });
        self.failed = parsed.is_err();
        Some(parsed)
    }
}

fn check_record(line: &[u8]) -> std::result::Result<(&[u8], i32), &'static str> {
    let delimiter = memchr(DELIMITER, line).ok_or("missing ';' delimiter")?;
    let key = &line[..delimiter];
    if key.is_empty() || key.len() > MAX_KEY_LEN || !key.iter().all(u8::is_ascii_alphabetic) {
        return Err("key must be 1 to 15 ASCII letters");
    }

    let value = &line[delimiter + 1..];
    let (negative, unsigned) = match value.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, value),
    };
    let point = memchr(DECIMAL_POINT, unsigned).ok_or("missing decimal point")?;
    let (whole, fraction) = (&unsigned[..point], &unsigned[point + 1..]);
    if whole.is_empty() || !whole.iter().all(u8::is_ascii_digit) {
        return Err("integer part must be one or more digits");
    }
    if fraction.len() != 1 || !fraction[0].is_ascii_digit() {
        return Err("expected exactly one fractional digit");
    }

    let whole: i32 = lexical_core::parse(whole).map_err(|_| "integer part out of range")?;
    let magnitude = whole
        .checked_mul(10)
        .and_then(|w| w.checked_add((fraction[0] - b'0') as i32))
        .ok_or("integer part out of range")?;

    Ok((key, if negative { -magnitude } else { magnitude }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tenths() {
        assert_eq!(decode_value(b"12.3"), 123);
        assert_eq!(decode_value(b"-12.3"), -123);
        assert_eq!(decode_value(b"0.0"), 0);
        assert_eq!(decode_value(b"-0.0"), 0);
        assert_eq!(decode_value(b"-0.4"), -4);
        assert_eq!(decode_value(b"99.9"), 999);
        assert_eq!(decode_value(b"-99.9"), -999);
        assert_eq!(decode_value(b"7.0"), 70);
        assert_eq!(decode_value(b"1234.5"), 12345);
    }

    #[test]
    fn decode_agrees_with_float_parse() {
        for whole in -99..=99 {
            for fraction in 0..=9 {
                let text = format!("{whole}.{fraction}");
                let expected: f64 = text.parse().unwrap();
                assert_eq!(decode_value(text.as_bytes()) as f64 / 10.0, expected, "{text}");
            }
        }
        for fraction in 0..=9 {
            let text = format!("-0.{fraction}");
            let expected: f64 = text.parse().unwrap();
            assert_eq!(decode_value(text.as_bytes()) as f64 / 10.0, expected, "{text}");
        }
    }

    #[test]
    fn garbage_does_not_panic() {
        decode_value(b"");
        decode_value(b"-");
        decode_value(b"99999999999999.9");
        decode_value(b"ab.c");
    }

    #[test]
    fn iterates_records() {
        let records: Vec<_> = Records::new(b"aa;12.3\nbb;-5.0\naa;7.1\n").collect();
        assert_eq!(
            records,
            vec![(&b"aa"[..], 123), (&b"bb"[..], -50), (&b"aa"[..], 71)]
        );
    }

    #[test]
    fn last_record_without_terminator() {
        let records: Vec<_> = Records::new(b"x;1.0\nyz;-3.4").collect();
        assert_eq!(records, vec![(&b"x"[..], 10), (&b"yz"[..], -34)]);
    }

    #[test]
    fn keys_borrow_the_buffer() {
        let buf = b"Hamburg;12.0\n".to_vec();
        let (key, _) = Records::new(&buf).next().unwrap();
        assert_eq!(key.as_ptr(), buf.as_ptr());
    }

    #[test]
    fn empty_range_has_no_records() {
        assert_eq!(Records::new(b"").count(), 0);
    }

    #[test]
    fn checked_accepts_valid_records() {
        let records: Vec<_> = CheckedRecords::new(b"aa;12.3\nbb;-5.0", 0)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records, vec![(&b"aa"[..], 123), (&b"bb"[..], -50)]);
    }

    fn first_violation(buf: &[u8], base: usize) -> (usize, &'static str) {
        match CheckedRecords::new(buf, base).find_map(|r| r.err()) {
            Some(Error::Format { offset, reason }) => (offset, reason),
            other => panic!("expected a format violation, got {other:?}"),
        }
    }

    #[test]
    fn checked_reports_offsets() {
        let (offset, reason) = first_violation(b"aa;1.0\nbb;1.23\n", 100);
        assert_eq!(offset, 107);
        assert_eq!(reason, "expected exactly one fractional digit");
    }

    #[test]
    fn checked_rejects_bad_shapes() {
        assert_eq!(first_violation(b"aa12.3\n", 0).1, "missing ';' delimiter");
        assert_eq!(first_violation(b";1.0\n", 0).1, "key must be 1 to 15 ASCII letters");
        assert_eq!(
            first_violation(b"abcdefghijklmnop;1.0\n", 0).1,
            "key must be 1 to 15 ASCII letters"
        );
        assert_eq!(first_violation(b"a1;1.0\n", 0).1, "key must be 1 to 15 ASCII letters");
        assert_eq!(first_violation(b"aa;12\n", 0).1, "missing decimal point");
        assert_eq!(
            first_violation(b"aa;-.5\n", 0).1,
            "integer part must be one or more digits"
        );
        assert_eq!(first_violation(b"aa;1.x\n", 0).1, "expected exactly one fractional digit");
        assert_eq!(first_violation(b"aa;1.0\n\n", 0).1, "missing ';' delimiter");
        assert_eq!(first_violation(b"aa;9999999999.0\n", 0).1, "integer part out of range");
    }

    #[test]
    fn checked_stops_after_first_error() {
        let results: Vec<_> = CheckedRecords::new(b"bad\nalso bad\n", 0).collect();
        assert_eq!(results.len(), 1);
    }
}

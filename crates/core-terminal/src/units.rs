//! Scaled typographic units: `number unit?` with a caller-supplied default.
//!
//! The number is the longest leading `[+-]?digits[.digits]` prefix; the unit
//! is a single suffix letter. A missing unit falls back to the caller's
//! default; a caller that passes no default makes the unit mandatory and the
//! parse fails without one. The parser returns the unconsumed remainder so
//! callers can continue scanning.

/// Typographic length unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Centimeter (`c`).
    Cm,
    /// Inch (`i`).
    In,
    /// Fraction of the page (`f`).
    Fs,
    /// Millimeter (`M`).
    Mm,
    /// Em (`m`).
    Em,
    /// En (`n`).
    En,
    /// Pica (`P`).
    Pc,
    /// Point (`p`).
    Pt,
    /// Basic unit (`u`).
    Bu,
    /// Vertical line (`v`).
    Vs,
}

/// A scaled length: magnitude plus unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaled {
    pub scale: f64,
    pub unit: Unit,
}

impl Scaled {
    pub fn new(scale: f64, unit: Unit) -> Self {
        Scaled { scale, unit }
    }
}

/// Longest `[+-]?digits[.digits]` prefix; at least one digit required.
fn split_number(src: &str) -> Option<(f64, usize)> {
    let b = src.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(&(b'+' | b'-'))) {
        i += 1;
    }
    let digits_from = i;
    while b.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    if b.get(i) == Some(&b'.') {
        i += 1;
        while b.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
    }
    if !src[digits_from..i].bytes().any(|c| c.is_ascii_digit()) {
        return None;
    }
    src[..i].parse::<f64>().ok().map(|v| (v, i))
}

/// Parse a scaled unit from the front of `src`.
///
/// On success returns the parsed value and the remainder of `src` past the
/// last consumed byte. Returns `None` when no digits were consumed, or when
/// the unit suffix is missing and `default` is `None`.
pub fn parse_scaled(src: &str, default: Option<Unit>) -> Option<(Scaled, &str)> {
    let (scale, used) = split_number(src)?;
    let rest = &src[used..];
    let (unit, rest) = match rest.as_bytes().first() {
        Some(&b'c') => (Unit::Cm, &rest[1..]),
        Some(&b'i') => (Unit::In, &rest[1..]),
        Some(&b'f') => (Unit::Fs, &rest[1..]),
        Some(&b'M') => (Unit::Mm, &rest[1..]),
        Some(&b'm') => (Unit::Em, &rest[1..]),
        Some(&b'n') => (Unit::En, &rest[1..]),
        Some(&b'P') => (Unit::Pc, &rest[1..]),
        Some(&b'p') => (Unit::Pt, &rest[1..]),
        Some(&b'u') => (Unit::Bu, &rest[1..]),
        Some(&b'v') => (Unit::Vs, &rest[1..]),
        _ => (default?, rest),
    };
    Some((Scaled { scale, unit }, rest))
}

//! Terminal capability record consumed by the table renderer, plus a plain
//! text implementation.
//!
//! The renderer never touches terminal internals: it drives output through
//! the [`Terminal`] trait (cursor advancement, character and word emission,
//! line termination, font stack) and asks the same trait for measurements
//! (`len`, `slen`, `sulen`). Any back end that can honor these eleven hooks
//! can host tables; [`TermWriter`] is the reference back end, writing plain
//! text into an internal buffer with `unicode-width` based measurement.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub mod units;
pub use units::{Scaled, Unit, parse_scaled};

/// Typeface selection for emitted words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Roman,
    Bold,
    Italic,
}

/// The capability record a terminal supplies to the table renderer.
///
/// Output hooks are stateful: `advance` moves right within the current
/// line, `letter`/`word` emit at the current position, and `endline` or
/// `flushln` terminate the line. Measurement hooks are pure.
pub trait Terminal {
    /// Move right by `n` columns (emitting padding).
    fn advance(&mut self, n: usize);
    /// Emit a single character at the current position.
    fn letter(&mut self, c: char);
    /// Emit a word verbatim at the current position.
    fn word(&mut self, s: &str);
    /// Hard line termination.
    fn endline(&mut self);
    /// Announce the number of output columns of the upcoming rows.
    fn setcol(&mut self, n: usize);
    /// Push a font; restore with [`Terminal::font_popq`].
    fn font_push(&mut self, font: Font);
    /// Pop the font stack back down to depth `prev`.
    fn font_popq(&mut self, prev: usize);
    /// Current font stack depth, for later `font_popq`.
    fn fonti(&self) -> usize;
    /// Terminate and flush the pending line.
    fn flushln(&mut self);
    /// Width of `n` blanks in the current font.
    fn len(&self, n: usize) -> usize;
    /// Display width of a string.
    fn slen(&self, s: &str) -> usize;
    /// Width of a scaled unit, in columns.
    fn sulen(&self, su: &Scaled) -> usize;
}

/// Plain text terminal: fixed-pitch, no styling, one basic unit = 1/24 of
/// a column, ten columns to the inch.
#[derive(Debug, Default)]
pub struct TermWriter {
    out: String,
    line: String,
    fonts: Vec<Font>,
    cols: usize,
}

impl TermWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far, as completed lines.
    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn into_output(mut self) -> String {
        self.end_pending();
        self.out
    }

    fn end_pending(&mut self) {
        if !self.line.is_empty() {
            let trimmed = self.line.trim_end_matches(' ');
            self.out.push_str(trimmed);
            self.out.push('\n');
            self.line.clear();
        }
    }
}

impl Terminal for TermWriter {
    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.line.push(' ');
        }
    }

    fn letter(&mut self, c: char) {
        self.line.push(c);
    }

    fn word(&mut self, s: &str) {
        self.line.push_str(s);
    }

    fn endline(&mut self) {
        let trimmed = self.line.trim_end_matches(' ');
        self.out.push_str(trimmed);
        self.out.push('\n');
        self.line.clear();
    }

    fn setcol(&mut self, n: usize) {
        self.cols = n;
    }

    fn font_push(&mut self, font: Font) {
        self.fonts.push(font);
    }

    fn font_popq(&mut self, prev: usize) {
        self.fonts.truncate(prev);
    }

    fn fonti(&self) -> usize {
        self.fonts.len()
    }

    fn flushln(&mut self) {
        self.endline();
    }

    fn len(&self, n: usize) -> usize {
        n
    }

    fn slen(&self, s: &str) -> usize {
        s.graphemes(true).map(UnicodeWidthStr::width).sum()
    }

    fn sulen(&self, su: &Scaled) -> usize {
        // Convert to basic units, then truncate to whole columns.
        let bu = match su.unit {
            Unit::Bu => su.scale,
            Unit::Em | Unit::En => su.scale * 24.0,
            Unit::In => su.scale * 240.0,
            Unit::Cm => su.scale * 240.0 / 2.54,
            Unit::Mm => su.scale * 240.0 / 25.4,
            Unit::Pc => su.scale * 40.0,
            Unit::Pt => su.scale * 10.0 / 3.0,
            Unit::Fs => su.scale * 65536.0,
            Unit::Vs => su.scale * 40.0,
        };
        if bu <= 0.0 {
            return 0;
        }
        ((bu + 0.01) as usize) / 24
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_trimmed_on_termination() {
        let mut t = TermWriter::new();
        t.advance(2);
        t.word("hi");
        t.advance(3);
        t.endline();
        assert_eq!(t.output(), "  hi\n");
    }

    #[test]
    fn interior_padding_survives() {
        let mut t = TermWriter::new();
        t.word("a");
        t.advance(3);
        t.letter('|');
        t.flushln();
        assert_eq!(t.output(), "a   |\n");
    }

    #[test]
    fn font_stack_push_and_popq() {
        let mut t = TermWriter::new();
        let prev = t.fonti();
        t.font_push(Font::Bold);
        t.font_push(Font::Italic);
        assert_eq!(t.fonti(), 2);
        t.font_popq(prev);
        assert_eq!(t.fonti(), 0);
    }

    #[test]
    fn measurement_is_display_width() {
        let t = TermWriter::new();
        assert_eq!(t.len(4), 4);
        assert_eq!(t.slen("abc"), 3);
        assert_eq!(t.slen("e\u{301}"), 1);
    }

    #[test]
    fn scaled_widths_in_columns() {
        let t = TermWriter::new();
        assert_eq!(t.sulen(&Scaled::new(10.0, Unit::En)), 10);
        assert_eq!(t.sulen(&Scaled::new(1.0, Unit::In)), 10);
        assert_eq!(t.sulen(&Scaled::new(24.0, Unit::Bu)), 1);
        assert_eq!(t.sulen(&Scaled::new(-3.0, Unit::En)), 0);
    }

    #[test]
    fn into_output_flushes_the_pending_line() {
        let mut t = TermWriter::new();
        t.word("tail");
        assert_eq!(t.into_output(), "tail\n");
    }
}

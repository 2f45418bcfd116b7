//! Per-span terminal rendering of solved tables.
//!
//! The renderer is driven one span at a time, the way spans stream out of a
//! parser. The first span triggers the column solve, optional centering,
//! and the opening frame rules; the last span emits the closing rules and
//! releases the column array so the renderer can host the next table.
//! Frame, centering, and skip-vertical state persist across spans.

use core_terminal::{Font, Terminal};
use tracing::trace;

use crate::calc::{numeric_intsz, solve};
use crate::layout::{
    CellFlags, CellPos, Col, DataCell, DataPos, LayoutCell, OptFlags, Opts, SpanPos, Table,
};

/// One emitted line of one cell.
enum CellLine {
    /// Repeat a rule character across the full cell width.
    Fill(char),
    /// A word with left padding; right padding is implicit.
    Word { padl: usize, text: String },
}

struct RCell<'a> {
    /// First output column of the cell content.
    start: usize,
    /// Content width, including any spanned columns and their gutters.
    width: usize,
    /// First table column this cell occupies.
    icol: usize,
    dp: Option<&'a DataCell>,
    lc: Option<&'a LayoutCell>,
    /// Vertical rules after this cell.
    vert: usize,
    lines: Vec<CellLine>,
}

/// Renders the spans of one table at a time onto a [`Terminal`].
pub struct TableRenderer {
    cols: Option<Vec<Col>>,
    offset: usize,
    base_offset: usize,
    rmargin: usize,
    /// Vertical space to suppress after a closed frame; persists until the
    /// caller consumes it.
    pub skipvsp: usize,
}

impl TableRenderer {
    pub fn new(offset: usize, rmargin: usize) -> Self {
        TableRenderer {
            cols: None,
            offset,
            base_offset: offset,
            rmargin,
            skipvsp: 0,
        }
    }

    /// Solved column geometry, while a table is in flight.
    pub fn cols(&self) -> Option<&[Col]> {
        self.cols.as_deref()
    }

    /// Render one span. Must be called for the table's spans in order;
    /// the first call solves the layout and the last call tears it down.
    pub fn render_span(&mut self, term: &mut dyn Terminal, table: &mut Table, idx: usize) {
        assert!(idx < table.spans.len(), "span index out of range");

        if self.cols.is_none() {
            let cols = solve(term, table, self.offset, self.rmargin);
            self.base_offset = self.offset;
            let opts = &table.opts;

            // Center the table as a whole.
            if opts.flags.contains(OptFlags::CENTRE) && opts.cols > 0 {
                let mut tsz = frame_overhead(opts);
                for c in cols.iter().take(opts.cols) {
                    tsz += c.width + 3;
                }
                tsz -= 3;
                if self.offset + tsz > self.rmargin {
                    tsz -= 1;
                }
                self.offset = if self.offset + self.rmargin > tsz {
                    (self.offset + self.rmargin - tsz) / 2
                } else {
                    0
                };
            }
            self.cols = Some(cols);
            trace!(offset = self.offset, "table layout solved");

            // Horizontal frame at the start of boxed tables.
            if opts.flags.contains(OptFlags::DBOX) {
                self.hrule(term, table, idx, 2);
            }
            if opts.flags.intersects(OptFlags::DBOX | OptFlags::BOX) {
                self.hrule(term, table, idx, 1);
            }
        }

        match table.spans[idx].pos {
            SpanPos::Horiz | SpanPos::DHoriz => {
                term.setcol(1);
                self.render_rule_row(term, table, idx);
            }
            SpanPos::Data => {
                // One column per data column plus the two frame columns.
                term.setcol(table.opts.cols + 2);
                self.render_data_row(term, table, idx);
            }
        }

        // Last span: close the frame and drop the column array.
        if idx + 1 == table.spans.len() {
            if table.opts.flags.intersects(OptFlags::BOX | OptFlags::DBOX) {
                self.hrule(term, table, idx, 1);
                self.skipvsp = 1;
            }
            if table.opts.flags.contains(OptFlags::DBOX) {
                self.hrule(term, table, idx, 2);
                self.skipvsp = 2;
            }
            self.cols = None;
            self.offset = self.base_offset;
            term.setcol(1);
        }
    }

    /// Frame character at the start of a row, if any.
    fn left_frame(&self, table: &Table, idx: usize, horiz: bool) -> Option<char> {
        let span = &table.spans[idx];
        let vert = table.layouts[span.layout].vert;
        let prev_vert = idx
            .checked_sub(1)
            .map(|i| table.layouts[table.spans[i].layout].vert)
            .unwrap_or(0);
        if vert > 0 || prev_vert > 0 || table.opts.flags.intersects(OptFlags::BOX | OptFlags::DBOX)
        {
            Some(if horiz { '+' } else { '|' })
        } else if horiz && table.opts.lvert > 0 {
            Some('-')
        } else {
            None
        }
    }

    fn right_frame(&self, table: &Table, idx: usize, horiz: bool) -> Option<char> {
        let last_vert = |layout: usize| {
            table.layouts[layout]
                .cells
                .last()
                .map(|c| c.vert)
                .unwrap_or(0)
        };
        let span = &table.spans[idx];
        let prev = idx.checked_sub(1).map(|i| table.spans[i].layout);
        if last_vert(span.layout) > 0
            || prev.map(last_vert).unwrap_or(0) > 0
            || table.opts.flags.intersects(OptFlags::BOX | OptFlags::DBOX)
        {
            Some(if horiz { '+' } else { '|' })
        } else if horiz && table.opts.rvert > 0 {
            Some('-')
        } else {
            None
        }
    }

    /// A whole-width rule span inside the table.
    fn render_rule_row(&mut self, term: &mut dyn Terminal, table: &Table, idx: usize) {
        term.advance(self.offset);
        if let Some(c) = self.left_frame(table, idx, true) {
            term.letter(c);
        }
        self.hrule_body(term, table, idx, 0);
        if let Some(c) = self.right_frame(table, idx, true) {
            term.letter(c);
        }
        term.endline();
    }

    /// Standalone frame rule: 1 = inner (with crossings), 2 = outer.
    fn hrule(&mut self, term: &mut dyn Terminal, table: &Table, idx: usize, kind: usize) {
        term.advance(self.offset);
        term.letter('+');
        self.hrule_body(term, table, idx, kind);
        term.letter('+');
        term.flushln();
    }

    fn hrule_body(&mut self, term: &mut dyn Terminal, table: &Table, idx: usize, kind: usize) {
        let span = &table.spans[idx];
        let line = if kind == 0 && span.pos == SpanPos::DHoriz {
            '='
        } else {
            '-'
        };
        let cross = if kind < 2 { '+' } else { '-' };
        let cols = self.cols.as_ref().expect("solver has run");

        let cur = &table.layouts[span.layout].cells;
        // Merge the previous row's vertical counts at each crossing,
        // unless both rows share one layout.
        let prev = idx.checked_sub(1).and_then(|i| {
            let pl = table.spans[i].layout;
            if pl == span.layout {
                None
            } else {
                Some(&table.layouts[pl].cells)
            }
        });

        for (i, c1) in cur.iter().enumerate() {
            tbl_char(term, line, cols[c1.col].width + 1);
            if i + 1 == cur.len() {
                break;
            }
            let mut vert = c1.vert;
            if let Some(p) = prev {
                if let Some(c2) = p.get(i) {
                    vert = vert.max(c2.vert);
                }
            }
            if vert > 0 {
                tbl_char(term, cross, vert);
            }
            if vert < 2 {
                tbl_char(term, line, 2 - vert);
            }
        }
    }

    fn render_data_row(&mut self, term: &mut dyn Terminal, table: &Table, idx: usize) {
        let opts = &table.opts;
        let span = &table.spans[idx];
        let row = &table.layouts[span.layout];
        let cols = self.cols.as_ref().expect("solver has run");

        let mut coloff = self.offset;
        if opts.flags.intersects(OptFlags::BOX | OptFlags::DBOX) || opts.lvert > 0 {
            coloff += 1;
        }

        // Match data cells to columns, consuming horizontal spans.
        let mut rcells: Vec<RCell> = Vec::new();
        let mut ci = 0;
        let mut ic = 0;
        let mut x = coloff;
        while ic < opts.cols {
            let dp = span.cells.get(ci);
            let (ncols, lc) = match dp {
                Some(dp) => {
                    let extra = dp.hspans.min(opts.cols - ic - 1);
                    (1 + extra, row.cells.get(dp.layout))
                }
                None => (1, row.cells.get(ic)),
            };
            let mut width = cols[ic].width;
            for k in 1..ncols {
                width += 3 + cols[ic + k].width;
            }
            let vert = row
                .cells
                .get(ic + ncols - 1)
                .map(|c| c.vert)
                .unwrap_or(0);
            rcells.push(RCell {
                start: x,
                width,
                icol: ic,
                dp,
                lc,
                vert,
                lines: Vec::new(),
            });
            x += width + 3;
            ic += ncols;
            if dp.is_some() {
                ci += 1;
            }
        }
        let right_x = rcells
            .last()
            .map(|c| c.start + c.width + 1)
            .unwrap_or(coloff + 1);

        // Fill every cell's line buffer.
        for i in 0..rcells.len() {
            let lines = cell_lines(
                term,
                opts,
                rcells[i].dp,
                rcells[i].lc,
                &cols[rcells[i].icol],
                rcells[i].width,
            );
            rcells[i].lines = lines;
        }

        // Emit as many physical lines as the tallest cell needs.
        let nlines = rcells
            .iter()
            .map(|c| c.lines.len())
            .max()
            .unwrap_or(0)
            .max(1);
        let lfc = self.left_frame(table, idx, false);
        let rfc = self.right_frame(table, idx, false);

        for li in 0..nlines {
            term.advance(self.offset);
            let mut viscol = self.offset;
            if let Some(c) = lfc {
                term.letter(c);
                viscol += 1;
            }
            for (gi, rc) in rcells.iter().enumerate() {
                match rc.lines.get(li) {
                    Some(CellLine::Fill(ch)) => {
                        term.advance(rc.start.saturating_sub(viscol));
                        tbl_char(term, *ch, rc.width);
                        viscol = rc.start + rc.width;
                    }
                    Some(CellLine::Word { padl, text }) => {
                        term.advance((rc.start + padl).saturating_sub(viscol));
                        let prev = term.fonti();
                        let flags = rc.lc.map(|l| l.flags).unwrap_or_default();
                        if flags.contains(CellFlags::BOLD) {
                            term.font_push(Font::Bold);
                        } else if flags.contains(CellFlags::ITALIC) {
                            term.font_push(Font::Italic);
                        }
                        term.word(text);
                        term.font_popq(prev);
                        viscol = rc.start + padl + term.slen(text);
                    }
                    None => {}
                }
                // Vertical rules between data cells.
                if gi + 1 < rcells.len() && rc.vert > 0 {
                    let barx = rc.start + rc.width + 1;
                    term.advance(barx.saturating_sub(viscol));
                    viscol = viscol.max(barx);
                    for _ in 0..rc.vert {
                        term.letter('|');
                        viscol += 1;
                    }
                }
            }
            if let Some(c) = rfc {
                let gap = if right_x > viscol { right_x - viscol } else { 1 };
                term.advance(gap);
                term.letter(c);
            }
            term.endline();
        }
    }
}

fn frame_overhead(opts: &Opts) -> usize {
    if opts.flags.intersects(OptFlags::BOX | OptFlags::DBOX) {
        2
    } else {
        (opts.lvert > 0) as usize + (opts.rvert > 0) as usize
    }
}

fn tbl_char(term: &mut dyn Terminal, c: char, n: usize) {
    for _ in 0..n {
        term.letter(c);
    }
}

/// Greedy single-space wrap, mirroring the solver's measurement.
fn wrap_text(term: &dyn Terminal, s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for w in s.split(' ').filter(|w| !w.is_empty()) {
        if cur.is_empty() {
            cur = w.to_string();
        } else if term.slen(&cur) + 1 + term.slen(w) <= width {
            cur.push(' ');
            cur.push_str(w);
        } else {
            lines.push(std::mem::take(&mut cur));
            cur = w.to_string();
        }
    }
    if !cur.is_empty() || lines.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Lay out the content of one cell into emitted lines.
fn cell_lines(
    term: &dyn Terminal,
    opts: &Opts,
    dp: Option<&DataCell>,
    lc: Option<&LayoutCell>,
    col: &Col,
    width: usize,
) -> Vec<CellLine> {
    let Some(dp) = dp else {
        return Vec::new();
    };
    match dp.pos {
        DataPos::None => return Vec::new(),
        DataPos::Horiz | DataPos::NHoriz => return vec![CellLine::Fill('-')],
        DataPos::DHoriz | DataPos::NDHoriz => return vec![CellLine::Fill('=')],
        DataPos::Data => {}
    }
    let pos = lc.map(|l| l.pos).unwrap_or(CellPos::Left);
    match pos {
        CellPos::Horiz => vec![CellLine::Fill('-')],
        CellPos::DHoriz => vec![CellLine::Fill('=')],
        CellPos::Down => Vec::new(),
        CellPos::Number => number_line(term, opts, dp, col, width),
        CellPos::Long | CellPos::Centre | CellPos::Left | CellPos::Right => {
            let s = dp.string.as_deref().unwrap_or("");
            let raw = if dp.block {
                wrap_text(term, s, width)
            } else {
                vec![s.to_string()]
            };
            raw.into_iter()
                .map(|text| {
                    let len = term.slen(&text);
                    let padr = width.saturating_sub(len);
                    let padl = match pos {
                        CellPos::Long => term.len(1),
                        CellPos::Centre => {
                            if padr < 2 {
                                0
                            } else {
                                padr / 2
                            }
                        }
                        CellPos::Right => padr,
                        _ => 0,
                    };
                    CellLine::Word { padl, text }
                })
                .collect()
        }
    }
}

/// Decimal-aligned single line: left-pad by the distance between this
/// cell's integer width and the column's maximum.
fn number_line(
    term: &dyn Terminal,
    opts: &Opts,
    dp: &DataCell,
    col: &Col,
    width: usize,
) -> Vec<CellLine> {
    let s = dp.string.as_deref().unwrap_or("");
    let sz = term.slen(s);
    let padl = match numeric_intsz(term, s, opts.decimal) {
        Some(intsz) if col.decimal > intsz && width > sz => {
            (col.decimal - intsz).min(width - sz)
        }
        _ => 0,
    };
    vec![CellLine::Word {
        padl,
        text: s.to_string(),
    }]
}

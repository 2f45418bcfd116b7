//! Two-pass column solver: per-cell accumulation over all data spans, then
//! reconciliation, equalization, and maximization into the right margin.

use core_terminal::{Terminal, Unit, parse_scaled};
use tracing::debug;

use crate::layout::{CellFlags, CellPos, Col, DataCell, OptFlags, Opts, SpanPos, Table};

/// Compute the column geometry for one table.
///
/// Pass 1 walks every data cell, absorbing explicit widths and spacings and
/// measuring literal and numeric content. Pass 2 reconciles numeric widths
/// with literal widths, equalizes EQUAL columns to their common maximum,
/// and distributes leftover margin space across WMAX columns.
///
/// Explicit width strings are parsed once and cached back into the layout
/// cell, which is why the table is borrowed mutably.
pub fn solve(term: &dyn Terminal, table: &mut Table, offset: usize, rmargin: usize) -> Vec<Col> {
    let Table {
        ref opts,
        ref mut layouts,
        ref spans,
    } = *table;

    let mut cols: Vec<Col> = vec![Col::default(); opts.cols];
    let mut maxcol: isize = -1;

    for sp in spans {
        if sp.pos != SpanPos::Data {
            continue;
        }
        let row = &mut layouts[sp.layout];
        for dp in &sp.cells {
            // A spanning cell sizes no single column.
            if dp.hspans > 0 {
                continue;
            }
            let lc = &mut row.cells[dp.layout];
            let icol = lc.col;
            while maxcol < icol as isize {
                maxcol += 1;
                cols[maxcol as usize].spacing = usize::MAX;
            }
            let col = &mut cols[icol];
            col.flags |= lc.flags;
            if lc.flags.contains(CellFlags::WIGN) {
                continue;
            }
            if lc.width == 0 {
                if let Some(wstr) = &lc.wstr {
                    if let Some((su, _)) = parse_scaled(wstr, Some(Unit::En)) {
                        lc.width = term.sulen(&su);
                    }
                }
            }
            if col.width < lc.width {
                col.width = lc.width;
            }
            if lc.spacing != usize::MAX
                && (col.spacing == usize::MAX || col.spacing < lc.spacing)
            {
                col.spacing = lc.spacing;
            }
            let mw = if !dp.block {
                0
            } else if lc.width != 0 {
                lc.width
            } else if rmargin != 0 {
                (rmargin + opts.cols / 2) / (opts.cols + 1)
            } else {
                0
            };
            calc_data(term, col, opts, lc.pos, dp, mw);
        }
    }

    if maxcol < 0 {
        return cols;
    }
    let maxcol = maxcol as usize;

    // Align numbers with text; count the columns to equalize and to
    // maximize; total the widths of the columns not being maximized.
    let mut necol = 0usize;
    let mut nxcol = 0usize;
    let mut ewidth = 0usize;
    let mut xwidth = 0usize;
    for (icol, col) in cols.iter_mut().enumerate().take(maxcol + 1) {
        if col.width > col.nwidth {
            col.decimal += (col.width - col.nwidth) / 2;
        } else {
            col.width = col.nwidth;
        }
        if col.spacing == usize::MAX || icol == maxcol {
            col.spacing = 3;
        }
        if col.flags.contains(CellFlags::EQUAL) {
            necol += 1;
            if ewidth < col.width {
                ewidth = col.width;
            }
        }
        if col.flags.contains(CellFlags::WMAX) {
            nxcol += 1;
        } else {
            xwidth += col.width;
        }
    }

    if necol > 0 {
        for col in cols.iter_mut().take(maxcol + 1) {
            if !col.flags.contains(CellFlags::EQUAL) || col.width == ewidth {
                continue;
            }
            if nxcol > 0 && rmargin > 0 {
                xwidth += ewidth - col.width;
            }
            col.width = ewidth;
        }
    }

    if nxcol > 0 && rmargin > 0 {
        xwidth += 3 * maxcol
            + if opts.flags.intersects(OptFlags::BOX | OptFlags::DBOX) {
                2
            } else {
                (opts.lvert > 0) as usize + (opts.rvert > 0) as usize
            };
        if rmargin <= offset + xwidth {
            debug!(rmargin, xwidth, "table already fills the margin, not maximizing");
            return cols;
        }
        let avail = rmargin - offset - xwidth;

        let mut placed = 0usize;
        let mut k = 0usize;
        let mut xcols: Vec<usize> = Vec::new();
        for (icol, col) in cols.iter_mut().enumerate().take(maxcol + 1) {
            if !col.flags.contains(CellFlags::WMAX) {
                continue;
            }
            k += 1;
            col.width = (avail as f64 * k as f64 / nxcol as f64 - placed as f64 + 0.4995) as usize;
            placed += col.width;
            xcols.push(icol);
        }

        // Match groff's distribution for five maximized columns;
        // identical geometry up to six.
        if nxcol == 5 {
            let quirk = avail % 5 + 2;
            if (quirk == 3 || quirk == 4) && cols[xcols[quirk - 1]].width > 0 {
                cols[xcols[quirk - 1]].width -= 1;
            }
        }
    }

    debug!(ncols = cols.len(), "column solve finished");
    cols
}

fn calc_data(
    term: &dyn Terminal,
    col: &mut Col,
    opts: &Opts,
    pos: CellPos,
    dp: &DataCell,
    mw: usize,
) {
    match pos {
        CellPos::Horiz | CellPos::DHoriz => {
            let sz = term.len(1);
            if col.width < sz {
                col.width = sz;
            }
        }
        CellPos::Long | CellPos::Centre | CellPos::Left | CellPos::Right => {
            calc_literal(term, col, dp, mw);
        }
        CellPos::Number => calc_number(term, col, opts, dp),
        CellPos::Down => {}
    }
}

/// Measure literal content. Block-mode cells wrap greedily on single
/// spaces into lines of at most `mw` columns; anything else is one line.
fn calc_literal(term: &dyn Terminal, col: &mut Col, dp: &DataCell, mw: usize) {
    let Some(s) = dp.string.as_deref() else {
        return;
    };
    if s.is_empty() {
        return;
    }
    let mut lsz = 0;
    let words: Vec<&str> = if mw == 0 {
        vec![s]
    } else {
        s.split(' ').filter(|w| !w.is_empty()).collect()
    };
    for w in words {
        let wsz = term.slen(w);
        if mw != 0 && lsz != 0 && lsz + 1 + wsz <= mw {
            lsz += 1 + wsz;
        } else {
            lsz = wsz;
        }
        if col.width < lsz {
            col.width = lsz;
        }
    }
}

/// Width of the integer part of a numeric cell, or `None` when the string
/// carries no digit and must be treated as a literal.
///
/// The `\&` token fixes both the last digit and the last point at its own
/// position. The decimal character only counts as a decimal point when a
/// digit is adjacent; otherwise the rightmost digit ends the integer part.
pub(crate) fn numeric_intsz(term: &dyn Terminal, s: &str, decimal: char) -> Option<usize> {
    let chars: Vec<(usize, char)> = s.char_indices().collect();
    let mut lastdigit: Option<usize> = None;
    let mut lastpoint: Option<usize> = None;
    for (i, &(bi, c)) in chars.iter().enumerate() {
        if c == '\\' && chars.get(i + 1).map(|&(_, c2)| c2) == Some('&') {
            lastdigit = Some(bi);
            lastpoint = Some(bi);
            break;
        } else if c == decimal {
            let next_digit = chars.get(i + 1).is_some_and(|&(_, c2)| c2.is_ascii_digit());
            let prev_digit = i > 0 && chars[i - 1].1.is_ascii_digit();
            if next_digit || prev_digit {
                lastpoint = Some(bi);
            }
        } else if c.is_ascii_digit() {
            lastdigit = Some(bi);
        }
    }
    let lastdigit = lastdigit?;
    let point = lastpoint.unwrap_or(lastdigit + 1);
    Some(term.slen(&s[..point]))
}

/// Measure a NUMBER cell: grow the column's integer-part width when this
/// cell has more integer digits than any before it, otherwise account for
/// the right shift this cell will need.
fn calc_number(term: &dyn Terminal, col: &mut Col, opts: &Opts, dp: &DataCell) {
    let Some(s) = dp.string.as_deref() else {
        return;
    };
    if s.is_empty() {
        return;
    }
    let mut totsz = term.slen(s);
    let Some(intsz) = numeric_intsz(term, s, opts.decimal) else {
        // Not a number after all.
        if col.width < totsz {
            col.width = totsz;
        }
        return;
    };
    if intsz > col.decimal {
        col.nwidth += intsz - col.decimal;
        col.decimal = intsz;
    } else {
        totsz += col.decimal - intsz;
    }
    if totsz > col.nwidth {
        col.nwidth = totsz;
    }
}

//! Table model: options, layout rows, data rows, and computed columns.
//!
//! A table is a list of layout rows (the format specification) and a list
//! of spans (the content). Each span references the layout row that formats
//! it; each data cell references the layout cell governing it by index into
//! that row. Computed [`Col`] records are the solver's output and exist
//! only while one table is being rendered.

use bitflags::bitflags;

bitflags! {
    /// Whole-table option bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OptFlags: u8 {
        const BOX = 1 << 0;
        const DBOX = 1 << 1;
        const CENTRE = 1 << 2;
    }
}

bitflags! {
    /// Layout-cell modifier bits; accumulated onto the computed column.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellFlags: u8 {
        /// Equalize this column with all other EQUAL columns.
        const EQUAL = 1 << 0;
        /// Maximize this column into the available width.
        const WMAX = 1 << 1;
        /// Ignore this column's content when computing widths.
        const WIGN = 1 << 2;
        const BOLD = 1 << 3;
        const ITALIC = 1 << 4;
    }
}

/// Table options shared by all spans of one table.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Declared number of columns.
    pub cols: usize,
    /// Decimal point character for NUMBER alignment.
    pub decimal: char,
    pub flags: OptFlags,
    /// Vertical rules at the left and right table edge.
    pub lvert: usize,
    pub rvert: usize,
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            cols: 0,
            decimal: '.',
            flags: OptFlags::empty(),
            lvert: 0,
            rvert: 0,
        }
    }
}

/// Position discriminator of a layout cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPos {
    Centre,
    Right,
    Left,
    Number,
    Long,
    Down,
    Horiz,
    DHoriz,
}

/// Format of one column within one layout row.
#[derive(Debug, Clone)]
pub struct LayoutCell {
    /// Column index this cell formats.
    pub col: usize,
    pub pos: CellPos,
    /// Explicit minimal width specification, as a scaled-unit string.
    pub wstr: Option<String>,
    /// Parsed width; 0 until the solver caches the parse of `wstr`.
    pub width: usize,
    /// Requested spacing to the next column; `usize::MAX` means unset.
    pub spacing: usize,
    /// Vertical rules between this column and the next.
    pub vert: usize,
    pub flags: CellFlags,
}

impl LayoutCell {
    pub fn new(col: usize, pos: CellPos) -> Self {
        LayoutCell {
            col,
            pos,
            wstr: None,
            width: 0,
            spacing: usize::MAX,
            vert: 0,
            flags: CellFlags::empty(),
        }
    }

    pub fn flags(mut self, flags: CellFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn width_spec(mut self, wstr: impl Into<String>) -> Self {
        self.wstr = Some(wstr.into());
        self
    }

    pub fn vert(mut self, n: usize) -> Self {
        self.vert = n;
        self
    }
}

/// One layout row: left-edge rule count plus the per-column cells.
#[derive(Debug, Clone, Default)]
pub struct LayoutRow {
    /// Vertical rules at the left edge of rows formatted by this layout.
    pub vert: usize,
    pub cells: Vec<LayoutCell>,
}

impl LayoutRow {
    pub fn new(cells: Vec<LayoutCell>) -> Self {
        LayoutRow { vert: 0, cells }
    }
}

/// Position discriminator of a data cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPos {
    None,
    Horiz,
    NHoriz,
    DHoriz,
    NDHoriz,
    Data,
}

/// Content of one cell in one data row.
#[derive(Debug, Clone)]
pub struct DataCell {
    pub pos: DataPos,
    pub string: Option<String>,
    /// Text block: wrapped into multiple lines instead of measured whole.
    pub block: bool,
    /// Additional columns this cell spans to the right.
    pub hspans: usize,
    /// Additional rows this cell spans downward.
    pub vspans: usize,
    /// Index of the governing cell in the span's layout row.
    pub layout: usize,
}

impl DataCell {
    pub fn text(layout: usize, s: impl Into<String>) -> Self {
        DataCell {
            pos: DataPos::Data,
            string: Some(s.into()),
            block: false,
            hspans: 0,
            vspans: 0,
            layout,
        }
    }

    pub fn block(layout: usize, s: impl Into<String>) -> Self {
        DataCell {
            block: true,
            ..Self::text(layout, s)
        }
    }

    pub fn empty(layout: usize) -> Self {
        DataCell {
            pos: DataPos::None,
            string: None,
            block: false,
            hspans: 0,
            vspans: 0,
            layout,
        }
    }

    pub fn spanning(mut self, extra: usize) -> Self {
        self.hspans = extra;
        self
    }
}

/// Position discriminator of a whole span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanPos {
    Data,
    Horiz,
    DHoriz,
}

/// One logical table row.
#[derive(Debug, Clone)]
pub struct Span {
    pub pos: SpanPos,
    /// Index of the layout row formatting this span.
    pub layout: usize,
    pub cells: Vec<DataCell>,
}

impl Span {
    pub fn data(layout: usize, cells: Vec<DataCell>) -> Self {
        Span {
            pos: SpanPos::Data,
            layout,
            cells,
        }
    }

    pub fn hrule(layout: usize) -> Self {
        Span {
            pos: SpanPos::Horiz,
            layout,
            cells: Vec::new(),
        }
    }

    pub fn dhrule(layout: usize) -> Self {
        Span {
            pos: SpanPos::DHoriz,
            layout,
            cells: Vec::new(),
        }
    }
}

/// A complete table block.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub opts: Opts,
    pub layouts: Vec<LayoutRow>,
    pub spans: Vec<Span>,
}

/// Computed geometry of one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Col {
    pub width: usize,
    /// Maximum total width of any numeric cell seen.
    pub nwidth: usize,
    /// Maximum integer-part width of any numeric cell seen.
    pub decimal: usize,
    /// Spacing to the next column; `usize::MAX` until absorbed or defaulted.
    pub spacing: usize,
    pub flags: CellFlags,
}

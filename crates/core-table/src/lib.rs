//! Table layout engine: a two-pass width and decimal-alignment solver plus
//! a per-span terminal renderer.
//!
//! The engine owns no terminal knowledge of its own; everything it emits or
//! measures goes through the `core-terminal` capability record. One
//! [`TableRenderer`] holds the solved column array for the duration of one
//! table and may render any number of tables sequentially.
//!
//! ```
//! use core_table::{DataCell, LayoutCell, LayoutRow, CellPos, Span, Table, TableRenderer};
//! use core_terminal::TermWriter;
//!
//! let mut table = Table::default();
//! table.opts.cols = 2;
//! table.layouts.push(LayoutRow::new(vec![
//!     LayoutCell::new(0, CellPos::Left),
//!     LayoutCell::new(1, CellPos::Left),
//! ]));
//! table.spans.push(Span::data(0, vec![
//!     DataCell::text(0, "ab"),
//!     DataCell::text(1, "c"),
//! ]));
//!
//! let mut term = TermWriter::new();
//! let mut renderer = TableRenderer::new(0, 65);
//! for idx in 0..table.spans.len() {
//!     renderer.render_span(&mut term, &mut table, idx);
//! }
//! assert_eq!(term.output(), "ab   c\n");
//! ```

pub mod calc;
pub mod layout;
pub mod render;

pub use calc::solve;
pub use layout::{
    CellFlags, CellPos, Col, DataCell, DataPos, LayoutCell, LayoutRow, OptFlags, Opts, Span,
    SpanPos, Table,
};
pub use render::TableRenderer;

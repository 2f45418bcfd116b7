//! Diagnostic sink: the capability a caller injects to receive validation
//! findings and to decide whether warnings abort the walk.
//!
//! Errors always abort the document. Warnings carry a kind and the sink's
//! return value decides whether validation continues; that return value is
//! the single "ignore warnings / warnings-as-errors" policy knob, so rules
//! never need to know what the caller considers fatal.

use tracing::{error, warn};

/// Classification of a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnKind {
    /// Structural or stylistic problem in the document source.
    Syntax,
    /// Accepted by this implementation but likely rejected elsewhere.
    Compat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning(WarnKind),
}

/// Receiver for validation diagnostics.
///
/// Both methods return whether the walk should continue. Implementations
/// of [`DiagSink::err`] conventionally return `false`; the method still
/// returns `bool` so rules can propagate the sink's verdict uniformly.
pub trait DiagSink {
    fn err(&mut self, line: usize, col: usize, msg: &str) -> bool;
    fn warn(&mut self, kind: WarnKind, line: usize, col: usize, msg: &str) -> bool;
}

/// One recorded finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: usize,
    pub col: usize,
    pub msg: String,
}

/// Collecting sink with a warnings-as-errors switch.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    fatal_warnings: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat every warning as fatal (the walk stops on the first one).
    pub fn fatal_warnings(mut self) -> Self {
        self.fatal_warnings = true;
        self
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Messages only, in emission order. Handy for assertions.
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.msg.as_str()).collect()
    }
}

impl DiagSink for Diagnostics {
    fn err(&mut self, line: usize, col: usize, msg: &str) -> bool {
        error!(line, col, "{msg}");
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            line,
            col,
            msg: msg.to_string(),
        });
        false
    }

    fn warn(&mut self, kind: WarnKind, line: usize, col: usize, msg: &str) -> bool {
        warn!(line, col, ?kind, "{msg}");
        self.entries.push(Diagnostic {
            severity: Severity::Warning(kind),
            line,
            col,
            msg: msg.to_string(),
        });
        !self.fatal_warnings
    }
}

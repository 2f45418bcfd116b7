//! Enumerated document sections and manual-volume sections.

/// Named sections of a document, in conventional order.
///
/// The `Ord` derive is load-bearing: section-ordering checks compare
/// variants directly, so new sections must be inserted in conventional
/// position. `Custom` sorts last and is exempt from ordering checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    /// Before the first section header; the initial state.
    Prologue,
    /// After the prologue but before the first named section.
    Body,
    Name,
    Library,
    Synopsis,
    Description,
    Implementation,
    ReturnValues,
    Environment,
    Files,
    ExitStatus,
    Examples,
    Diagnostics,
    Errors,
    SeeAlso,
    Standards,
    History,
    Authors,
    Caveats,
    Bugs,
    /// Any section title not in the conventional set.
    Custom,
}

impl Section {
    /// Map a section title onto its enumerated kind.
    pub fn from_title(title: &str) -> Section {
        match title {
            "NAME" => Section::Name,
            "LIBRARY" => Section::Library,
            "SYNOPSIS" => Section::Synopsis,
            "DESCRIPTION" => Section::Description,
            "IMPLEMENTATION NOTES" => Section::Implementation,
            "RETURN VALUES" => Section::ReturnValues,
            "ENVIRONMENT" => Section::Environment,
            "FILES" => Section::Files,
            "EXIT STATUS" => Section::ExitStatus,
            "EXAMPLES" => Section::Examples,
            "DIAGNOSTICS" => Section::Diagnostics,
            "ERRORS" => Section::Errors,
            "SEE ALSO" => Section::SeeAlso,
            "STANDARDS" => Section::Standards,
            "HISTORY" => Section::History,
            "AUTHORS" => Section::Authors,
            "CAVEATS" => Section::Caveats,
            "BUGS" => Section::Bugs,
            _ => Section::Custom,
        }
    }
}

/// Manual volume section, parsed from the `Dt` second argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Msec {
    #[default]
    Default,
    M1,
    M2,
    M3,
    M4,
    M5,
    M6,
    M7,
    M8,
    M9,
}

impl Msec {
    pub fn from_str(s: &str) -> Msec {
        match s {
            "1" => Msec::M1,
            "2" => Msec::M2,
            "3" => Msec::M3,
            "4" => Msec::M4,
            "5" => Msec::M5,
            "6" => Msec::M6,
            "7" => Msec::M7,
            "8" => Msec::M8,
            "9" => Msec::M9,
            _ => Msec::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Msec::Default => "?",
            Msec::M1 => "1",
            Msec::M2 => "2",
            Msec::M3 => "3",
            Msec::M4 => "4",
            Msec::M5 => "5",
            Msec::M6 => "6",
            Msec::M7 => "7",
            Msec::M8 => "8",
            Msec::M9 => "9",
        }
    }
}

//! The fixed macro token table and macro argument identifiers.
//!
//! Tokens are the small-integer identities attached to every non-text node.
//! The set and its conventional two-letter names are fixed at build time;
//! validation rule lists bind to tokens, never to spellings.

/// Identity of a semantic-dialect macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Token {
    Dd,
    Dt,
    Os,
    Sh,
    Ss,
    Pp,
    D1,
    Dl,
    Bd,
    Ed,
    Bl,
    El,
    It,
    Ad,
    An,
    Ar,
    Cd,
    Cm,
    Dv,
    Er,
    Ev,
    Ex,
    Fa,
    Fd,
    Fl,
    Fn,
    Ft,
    Ic,
    In,
    Li,
    Nd,
    Nm,
    Op,
    Ot,
    Pa,
    Rv,
    St,
    Va,
    Vt,
    Xr,
    PctA,
    PctB,
    PctD,
    PctI,
    PctJ,
    PctN,
    PctO,
    PctP,
    PctR,
    PctT,
    PctV,
    Ac,
    Ao,
    Aq,
    At,
    Bc,
    Bf,
    Bo,
    Bq,
    Bsx,
    Bx,
    Db,
    Dc,
    Do,
    Dq,
    Ec,
    Ef,
    Em,
    Eo,
    Fx,
    Ms,
    No,
    Ns,
    Nx,
    Ox,
    Pc,
    Pf,
    Po,
    Pq,
    Qc,
    Ql,
    Qo,
    Qq,
    Re,
    Rs,
    Sc,
    So,
    Sq,
    Sm,
    Sx,
    Sy,
    Tn,
    Ux,
    Xc,
    Xo,
    Fo,
    Fc,
    Oo,
    Oc,
    Bk,
    Ek,
    Bt,
    Hf,
    Fr,
    Ud,
}

impl Token {
    /// Conventional spelling, as it appears in source documents.
    pub fn name(self) -> &'static str {
        use Token::*;
        match self {
            Dd => "Dd",
            Dt => "Dt",
            Os => "Os",
            Sh => "Sh",
            Ss => "Ss",
            Pp => "Pp",
            D1 => "D1",
            Dl => "Dl",
            Bd => "Bd",
            Ed => "Ed",
            Bl => "Bl",
            El => "El",
            It => "It",
            Ad => "Ad",
            An => "An",
            Ar => "Ar",
            Cd => "Cd",
            Cm => "Cm",
            Dv => "Dv",
            Er => "Er",
            Ev => "Ev",
            Ex => "Ex",
            Fa => "Fa",
            Fd => "Fd",
            Fl => "Fl",
            Fn => "Fn",
            Ft => "Ft",
            Ic => "Ic",
            In => "In",
            Li => "Li",
            Nd => "Nd",
            Nm => "Nm",
            Op => "Op",
            Ot => "Ot",
            Pa => "Pa",
            Rv => "Rv",
            St => "St",
            Va => "Va",
            Vt => "Vt",
            Xr => "Xr",
            PctA => "%A",
            PctB => "%B",
            PctD => "%D",
            PctI => "%I",
            PctJ => "%J",
            PctN => "%N",
            PctO => "%O",
            PctP => "%P",
            PctR => "%R",
            PctT => "%T",
            PctV => "%V",
            Ac => "Ac",
            Ao => "Ao",
            Aq => "Aq",
            At => "At",
            Bc => "Bc",
            Bf => "Bf",
            Bo => "Bo",
            Bq => "Bq",
            Bsx => "Bsx",
            Bx => "Bx",
            Db => "Db",
            Dc => "Dc",
            Do => "Do",
            Dq => "Dq",
            Ec => "Ec",
            Ef => "Ef",
            Em => "Em",
            Eo => "Eo",
            Fx => "Fx",
            Ms => "Ms",
            No => "No",
            Ns => "Ns",
            Nx => "Nx",
            Ox => "Ox",
            Pc => "Pc",
            Pf => "Pf",
            Po => "Po",
            Pq => "Pq",
            Qc => "Qc",
            Ql => "Ql",
            Qo => "Qo",
            Qq => "Qq",
            Re => "Re",
            Rs => "Rs",
            Sc => "Sc",
            So => "So",
            Sq => "Sq",
            Sm => "Sm",
            Sx => "Sx",
            Sy => "Sy",
            Tn => "Tn",
            Ux => "Ux",
            Xc => "Xc",
            Xo => "Xo",
            Fo => "Fo",
            Fc => "Fc",
            Oo => "Oo",
            Oc => "Oc",
            Bk => "Bk",
            Ek => "Ek",
            Bt => "Bt",
            Hf => "Hf",
            Fr => "Fr",
            Ud => "Ud",
        }
    }
}

/// Identity of a macro argument flag (the `-ragged` in `.Bd -ragged`).
///
/// Only arguments the validator inspects are enumerated individually;
/// anything else parses as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroArg {
    // List types.
    Bullet,
    Dash,
    Enum,
    Hyphen,
    Item,
    Tag,
    Diag,
    Hang,
    Ohang,
    Inset,
    Column,
    // Display types.
    Ragged,
    Unfilled,
    Filled,
    Literal,
    File,
    // Shared modifiers.
    Offset,
    Width,
    Compact,
    Std,
    Split,
    Nosplit,
    Emphasis,
    Symbolic,
    Other,
}

impl MacroArg {
    pub fn name(self) -> &'static str {
        use MacroArg::*;
        match self {
            Bullet => "bullet",
            Dash => "dash",
            Enum => "enum",
            Hyphen => "hyphen",
            Item => "item",
            Tag => "tag",
            Diag => "diag",
            Hang => "hang",
            Ohang => "ohang",
            Inset => "inset",
            Column => "column",
            Ragged => "ragged",
            Unfilled => "unfilled",
            Filled => "filled",
            Literal => "literal",
            File => "file",
            Offset => "offset",
            Width => "width",
            Compact => "compact",
            Std => "std",
            Split => "split",
            Nosplit => "nosplit",
            Emphasis => "emphasis",
            Symbolic => "symbolic",
            Other => "?",
        }
    }

    /// True for the argument flags that select a list type on `Bl`.
    pub fn is_list_type(self) -> bool {
        use MacroArg::*;
        matches!(
            self,
            Bullet | Dash | Enum | Hyphen | Item | Tag | Diag | Hang | Ohang | Inset | Column
        )
    }

    /// True for the argument flags that select a display type on `Bd`.
    pub fn is_display_type(self) -> bool {
        use MacroArg::*;
        matches!(self, Ragged | Unfilled | Filled | Literal | File)
    }
}

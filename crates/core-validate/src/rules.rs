//! Per-token validation rule tables and the rules themselves.
//!
//! Counting checks that differ only in scope, severity, inequality, and
//! threshold are one generic [`CountCheck`] record; everything that needs
//! real logic is an ordinary function. Each token binds to at most one
//! pre-rule list and one post-rule list, fixed at build time in
//! [`valids`].

use std::time::{SystemTime, UNIX_EPOCH};

use core_tree::{MacroArg, Msec, NodeId, NodeKind, Section, Token};

use crate::{Validator, WarnKind};

pub(crate) type PreFn = fn(&mut Validator<'_>, NodeId) -> bool;
pub(crate) type PostFn = fn(&mut Validator<'_>) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Head,
    Body,
    Elem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lvl {
    Err,
    Warn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Op {
    fn holds(self, has: usize, want: usize) -> bool {
        match self {
            Op::Lt => has < want,
            Op::Le => has <= want,
            Op::Eq => has == want,
            Op::Ge => has >= want,
            Op::Gt => has > want,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Eq => "==",
            Op::Ge => ">=",
            Op::Gt => ">",
        }
    }
}

/// One synthesized child-count check.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CountCheck {
    pub scope: Scope,
    pub lvl: Lvl,
    pub op: Op,
    pub want: usize,
}

#[derive(Clone, Copy)]
pub(crate) enum Post {
    Count(CountCheck),
    Fn(PostFn),
}

#[derive(Clone, Copy)]
pub(crate) struct Valids {
    pub pre: &'static [PreFn],
    pub post: &'static [Post],
}

const fn count(scope: Scope, lvl: Lvl, op: Op, want: usize) -> Post {
    Post::Count(CountCheck {
        scope,
        lvl,
        op,
        want,
    })
}

// The synthesized family, named after what each member demands.
const HERR_EQ0: Post = count(Scope::Head, Lvl::Err, Op::Eq, 0);
const HERR_LE1: Post = count(Scope::Head, Lvl::Err, Op::Lt, 2);
const HERR_GE1: Post = count(Scope::Head, Lvl::Err, Op::Gt, 0);
const BWARN_GE1: Post = count(Scope::Body, Lvl::Warn, Op::Gt, 0);
const EERR_EQ0: Post = count(Scope::Elem, Lvl::Err, Op::Eq, 0);
const EERR_EQ1: Post = count(Scope::Elem, Lvl::Err, Op::Eq, 1);
const EERR_LE1: Post = count(Scope::Elem, Lvl::Err, Op::Lt, 2);
const EERR_LE2: Post = count(Scope::Elem, Lvl::Err, Op::Lt, 3);
const EERR_GE1: Post = count(Scope::Elem, Lvl::Err, Op::Gt, 0);
const EWARN_EQ0: Post = count(Scope::Elem, Lvl::Warn, Op::Eq, 0);
const EWARN_EQ1: Post = count(Scope::Elem, Lvl::Warn, Op::Eq, 1);
const EWARN_GE1: Post = count(Scope::Elem, Lvl::Warn, Op::Gt, 0);

// Pre-rule collections.
const PRES_PROLOGUE: &[PreFn] = &[pre_prologue];
const PRES_D1: &[PreFn] = &[pre_display];
const PRES_BD: &[PreFn] = &[pre_display, pre_bd];
const PRES_BL: &[PreFn] = &[pre_bl];
const PRES_IT: &[PreFn] = &[pre_it];
const PRES_SS: &[PreFn] = &[pre_ss];
const PRES_SH: &[PreFn] = &[pre_sh];
const PRES_CD: &[PreFn] = &[pre_cd];
const PRES_ER: &[PreFn] = &[pre_er];
const PRES_EX: &[PreFn] = &[pre_ex];
const PRES_RV: &[PreFn] = &[pre_rv];
const PRES_AN: &[PreFn] = &[pre_an];
const PRES_ST: &[PreFn] = &[pre_st];

// Post-rule collections.
const POSTS_TEXT: &[Post] = &[EERR_GE1];
const POSTS_WTEXT: &[Post] = &[EWARN_GE1];
const POSTS_NOTEXT: &[Post] = &[EERR_EQ0];
const POSTS_WLINE: &[Post] = &[BWARN_GE1, HERR_EQ0];
const POSTS_BOOL: &[Post] = &[EERR_EQ1, Post::Fn(post_bool)];
const POSTS_BD: &[Post] = &[HERR_EQ0, BWARN_GE1];
const POSTS_SH: &[Post] = &[HERR_GE1, BWARN_GE1, Post::Fn(post_sh)];
const POSTS_BL: &[Post] = &[HERR_EQ0, BWARN_GE1, Post::Fn(post_bl)];
const POSTS_IT: &[Post] = &[Post::Fn(post_it)];
const POSTS_IN: &[Post] = &[EWARN_EQ1];
const POSTS_SS: &[Post] = &[HERR_GE1];
const POSTS_PF: &[Post] = &[EERR_EQ1];
const POSTS_PP: &[Post] = &[EWARN_EQ0];
const POSTS_EX: &[Post] = &[EERR_LE1, Post::Fn(post_ex)];
const POSTS_AN: &[Post] = &[Post::Fn(post_an)];
const POSTS_AT: &[Post] = &[Post::Fn(post_at)];
const POSTS_XR: &[Post] = &[EERR_GE1, EERR_LE2, Post::Fn(post_xr)];
const POSTS_NM: &[Post] = &[Post::Fn(post_nm)];
const POSTS_BF: &[Post] = &[HERR_LE1, Post::Fn(post_bf)];
const POSTS_RS: &[Post] = &[HERR_EQ0, BWARN_GE1];
const POSTS_FO: &[Post] = &[BWARN_GE1];
const POSTS_BK: &[Post] = &[HERR_EQ0, BWARN_GE1];
const POSTS_DD: &[Post] = &[EERR_GE1, Post::Fn(post_prologue)];
const POSTS_PROLOGUE: &[Post] = &[Post::Fn(post_prologue)];

const NONE: Valids = Valids {
    pre: &[],
    post: &[],
};

/// The fixed binding of every macro token to its rule lists.
pub(crate) fn valids(tok: Token) -> Valids {
    use Token::*;
    match tok {
        Dd => Valids {
            pre: PRES_PROLOGUE,
            post: POSTS_DD,
        },
        Dt | Os => Valids {
            pre: PRES_PROLOGUE,
            post: POSTS_PROLOGUE,
        },
        Sh => Valids {
            pre: PRES_SH,
            post: POSTS_SH,
        },
        Ss => Valids {
            pre: PRES_SS,
            post: POSTS_SS,
        },
        Pp => Valids {
            pre: &[],
            post: POSTS_PP,
        },
        D1 | Dl => Valids {
            pre: PRES_D1,
            post: POSTS_WLINE,
        },
        Bd => Valids {
            pre: PRES_BD,
            post: POSTS_BD,
        },
        Bl => Valids {
            pre: PRES_BL,
            post: POSTS_BL,
        },
        It => Valids {
            pre: PRES_IT,
            post: POSTS_IT,
        },
        An => Valids {
            pre: PRES_AN,
            post: POSTS_AN,
        },
        Cd => Valids {
            pre: PRES_CD,
            post: POSTS_TEXT,
        },
        Er => Valids {
            pre: PRES_ER,
            post: POSTS_TEXT,
        },
        Ex => Valids {
            pre: PRES_EX,
            post: POSTS_EX,
        },
        Rv => Valids {
            pre: PRES_RV,
            post: POSTS_NOTEXT,
        },
        St => Valids {
            pre: PRES_ST,
            post: POSTS_NOTEXT,
        },
        Ad | Dv | Em | Ev | Fa | Fn | Ic | Li | Ms | Sx | Sy | Tn | Va | Vt | PctA | PctB
        | PctD | PctI | PctJ | PctN | PctO | PctP | PctR | PctT | PctV => Valids {
            pre: &[],
            post: POSTS_TEXT,
        },
        Fd | Ft | Nd => Valids {
            pre: &[],
            post: POSTS_WTEXT,
        },
        Bt | No | Ns | Ud => Valids {
            pre: &[],
            post: POSTS_NOTEXT,
        },
        Aq | Bq | Dq | Op | Pq | Ql | Qq | Sq => Valids {
            pre: &[],
            post: POSTS_WLINE,
        },
        Db | Sm => Valids {
            pre: &[],
            post: POSTS_BOOL,
        },
        In => Valids {
            pre: &[],
            post: POSTS_IN,
        },
        Pf => Valids {
            pre: &[],
            post: POSTS_PF,
        },
        Xr => Valids {
            pre: &[],
            post: POSTS_XR,
        },
        Nm => Valids {
            pre: &[],
            post: POSTS_NM,
        },
        At => Valids {
            pre: &[],
            post: POSTS_AT,
        },
        Bf => Valids {
            pre: &[],
            post: POSTS_BF,
        },
        Rs => Valids {
            pre: &[],
            post: POSTS_RS,
        },
        Fo => Valids {
            pre: &[],
            post: POSTS_FO,
        },
        Bk => Valids {
            pre: &[],
            post: POSTS_BK,
        },
        Ed | El | Ar | Cm | Fl | Ot | Pa | Ac | Ao | Bc | Bo | Bsx | Bx | Dc | Do | Ec | Ef
        | Eo | Fx | Nx | Ox | Pc | Po | Qc | Qo | Re | Sc | So | Ux | Xc | Xo | Fc | Oo | Oc
        | Ek | Hf | Fr => NONE,
    }
}

/// Evaluate one synthesized count check against the current node.
/// Head and body checks apply only when the current node has that kind;
/// element checks may only ever be bound to element macros.
pub(crate) fn run_count(v: &mut Validator, c: &CountCheck) -> bool {
    let last = v.tree.last;
    let kind = v.tree.node(last).kind;
    match c.scope {
        Scope::Head if kind != NodeKind::Head => return true,
        Scope::Body if kind != NodeKind::Body => return true,
        Scope::Elem => assert_eq!(kind, NodeKind::Elem, "element count check on {kind:?}"),
        _ => {}
    }
    let has = v.tree.child_count(last);
    if c.op.holds(has, c.want) {
        return true;
    }
    let noun = match c.scope {
        Scope::Elem => "line parameters",
        _ => "multiline parameters",
    };
    match c.lvl {
        Lvl::Err => v.err(&format!(
            "requires {noun} {} {} (has {has})",
            c.want,
            c.op.symbol()
        )),
        Lvl::Warn => v.warn(
            WarnKind::Syntax,
            &format!("suggests {noun} {} {} (has {has})", c.want, c.op.symbol()),
        ),
    }
}

// Shared helpers.

fn epoch_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(1)
}

fn check_parent(v: &mut Validator, node: NodeId, tok: Option<Token>, kind: NodeKind) -> bool {
    let ok = match v.tree.parent(node) {
        Some(p) => {
            let pn = v.tree.node(p);
            pn.kind == kind && (tok.is_none() || pn.tok == tok)
        }
        None => false,
    };
    if ok {
        return true;
    }
    let msg = match tok {
        Some(t) => format!("bad parent (expected `{}' {})", t.name(), kind.name()),
        None => format!("bad parent (expected {})", kind.name()),
    };
    v.nerr(node, &msg)
}

fn check_msec(v: &mut Validator, node: NodeId, allowed: &[Msec]) -> bool {
    if allowed.contains(&v.tree.meta.msec) {
        return true;
    }
    v.nwarn(node, WarnKind::Compat, "wrong manual section")
}

fn check_stdarg(v: &mut Validator, node: NodeId) -> bool {
    let args = v.tree.node(node).args();
    if args.len() == 1 && args[0].arg == MacroArg::Std {
        return true;
    }
    v.nwarn(node, WarnKind::Compat, "one argument suggested")
}

// Pre-child-parse rules.

/// Display blocks (`Bd`, `D1`, `Dl`) may not sit inside a `Bd` block.
fn pre_display(v: &mut Validator, node: NodeId) -> bool {
    if v.tree.node(node).kind != NodeKind::Block {
        return true;
    }
    let nested = v.tree.ancestors(node).any(|anc| {
        let n = v.tree.node(anc);
        n.kind == NodeKind::Block && n.tok == Some(Token::Bd)
    });
    if nested {
        return v.nerr(node, "displays may not be nested");
    }
    true
}

fn pre_bd(v: &mut Validator, node: NodeId) -> bool {
    exclusive_type(v, node, MacroArg::is_display_type)
}

fn pre_bl(v: &mut Validator, node: NodeId) -> bool {
    exclusive_type(v, node, MacroArg::is_list_type)
}

/// Exactly one type-selecting argument must be present on the block.
fn exclusive_type(v: &mut Validator, node: NodeId, is_type: fn(MacroArg) -> bool) -> bool {
    if v.tree.node(node).kind != NodeKind::Block {
        return true;
    }
    let mut ntype = 0;
    let mut dup = None;
    for a in v.tree.node(node).args() {
        if !is_type(a.arg) {
            continue;
        }
        ntype += 1;
        if ntype > 1 {
            dup = Some((a.line, a.col));
            break;
        }
    }
    if let Some((line, col)) = dup {
        return v.perr(line, col, "multiple types specified");
    }
    if ntype == 1 {
        return true;
    }
    v.err("no type specified")
}

fn pre_sh(v: &mut Validator, node: NodeId) -> bool {
    if v.tree.node(node).kind != NodeKind::Block {
        return true;
    }
    // A section header ends the prologue.
    if v.tree.meta.lastnamed == Section::Prologue {
        v.tree.meta.lastnamed = Section::Body;
    }
    check_parent(v, node, None, NodeKind::Root)
}

fn pre_ss(v: &mut Validator, node: NodeId) -> bool {
    if v.tree.node(node).kind != NodeKind::Block {
        return true;
    }
    check_parent(v, node, Some(Token::Sh), NodeKind::Body)
}

fn pre_it(v: &mut Validator, node: NodeId) -> bool {
    if v.tree.node(node).kind != NodeKind::Block {
        return true;
    }
    check_parent(v, node, Some(Token::Bl), NodeKind::Body)
}

fn pre_st(v: &mut Validator, node: NodeId) -> bool {
    if v.tree.node(node).args().len() == 1 {
        return true;
    }
    v.nerr(node, "one argument required")
}

fn pre_an(v: &mut Validator, node: NodeId) -> bool {
    if v.tree.node(node).args().len() <= 1 {
        return true;
    }
    v.nerr(node, "one argument allowed")
}

fn pre_rv(v: &mut Validator, node: NodeId) -> bool {
    if !check_msec(v, node, &[Msec::M2, Msec::M3]) {
        return false;
    }
    check_stdarg(v, node)
}

fn pre_ex(v: &mut Validator, node: NodeId) -> bool {
    if !check_msec(v, node, &[Msec::M1, Msec::M6, Msec::M8]) {
        return false;
    }
    check_stdarg(v, node)
}

fn pre_er(v: &mut Validator, node: NodeId) -> bool {
    check_msec(v, node, &[Msec::M2])
}

fn pre_cd(v: &mut Validator, node: NodeId) -> bool {
    check_msec(v, node, &[Msec::M4])
}

/// Prologue macros: only before the first section, in `Dd` - `Dt` - `Os`
/// order, at most once each. Order and repetition are both derived from
/// which meta fields have been recorded so far.
fn pre_prologue(v: &mut Validator, node: NodeId) -> bool {
    if v.tree.meta.lastnamed != Section::Prologue {
        return v.nerr(node, "prologue only");
    }

    let tok = v.tree.node(node).tok;
    let title = v.tree.meta.title.is_some();
    let date = v.tree.meta.date != 0;
    let in_order = match tok {
        Some(Token::Os) => title && date,
        Some(Token::Dt) => !title && date,
        Some(Token::Dd) => !title && !date,
        _ => unreachable!("prologue rule on non-prologue macro"),
    };
    if !in_order {
        return v.nerr(node, "prologue out-of-order");
    }

    let repeated = match tok {
        Some(Token::Os) => v.tree.meta.os.is_some(),
        Some(Token::Dd) => date,
        Some(Token::Dt) => title,
        _ => unreachable!(),
    };
    if repeated {
        return v.nerr(node, "prologue repetition");
    }
    true
}

// Post-child-parse rules.

/// Record the prologue macro's content into the document meta once its
/// parameters exist. Date-string parsing belongs to the parser; the
/// validator only needs "set" to be observable, so `Dd` stamps the moment
/// of capture.
fn post_prologue(v: &mut Validator) -> bool {
    let last = v.tree.last;
    match v.tree.node(last).tok {
        Some(Token::Dd) => {
            if v.tree.meta.date == 0 {
                v.tree.meta.date = epoch_now();
            }
        }
        Some(Token::Dt) => {
            let texts: Vec<String> = v
                .tree
                .children(last)
                .filter_map(|c| v.tree.node(c).text().map(str::to_string))
                .collect();
            v.tree.meta.title = Some(
                texts
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "UNTITLED".to_string()),
            );
            if let Some(m) = texts.get(1) {
                v.tree.meta.msec = Msec::from_str(m);
            }
            v.tree.meta.vol = texts.get(2).cloned();
        }
        Some(Token::Os) => {
            let mut os = String::new();
            v.tree.concat_text(last, &mut os, usize::MAX);
            v.tree.meta.os = Some(os);
        }
        _ => {}
    }
    true
}

/// `Bf` selects a font either by block argument or by head child, never
/// both and never neither; a head child must name a known font.
fn post_bf(v: &mut Validator) -> bool {
    let last = v.tree.last;
    if v.tree.node(last).kind != NodeKind::Block {
        return true;
    }
    let head = v.tree.block_head(last);
    let argc = v.tree.node(last).args().len();
    let head_child = v.tree.first_child(head);
    match argc {
        0 => match head_child {
            None => v.err("argument expected"),
            Some(c) => {
                if matches!(v.tree.node(c).text(), Some("Em" | "Li" | "Sm")) {
                    true
                } else {
                    v.nerr(c, "invalid font")
                }
            }
        },
        1 => match head_child {
            Some(c) => v.nerr(c, "argument and font child are exclusive"),
            None => true,
        },
        _ => v.err("one argument expected"),
    }
}

fn post_nm(v: &mut Validator) -> bool {
    let last = v.tree.last;
    if v.tree.first_child(last).is_some() {
        if v.tree.meta.name.is_none() {
            let mut name = String::new();
            v.tree.concat_text(last, &mut name, usize::MAX);
            v.tree.meta.name = Some(name);
        }
        return true;
    }
    if v.tree.meta.name.is_some() {
        return true;
    }
    v.err("not yet invoked with name")
}

fn post_xr(v: &mut Validator) -> bool {
    let last = v.tree.last;
    let Some(first) = v.tree.first_child(last) else {
        return true;
    };
    let Some(second) = v.tree.next_sibling(first) else {
        return true;
    };
    match v.tree.node(second).text() {
        Some(s) if Msec::from_str(s) != Msec::Default => true,
        _ => v.nerr(second, "invalid manual section"),
    }
}

const ATT_VERSIONS: &[&str] = &[
    "v1", "v2", "v3", "v4", "v5", "v6", "v7", "32v", "V.1", "V.2", "V.3", "V.4",
];

fn post_at(v: &mut Validator) -> bool {
    let last = v.tree.last;
    let Some(child) = v.tree.first_child(last) else {
        return true;
    };
    let ok = v
        .tree
        .node(child)
        .text()
        .is_some_and(|s| ATT_VERSIONS.contains(&s));
    if ok {
        return true;
    }
    v.err("require valid symbol")
}

/// `An` takes either a split-mode argument or author names, not both.
fn post_an(v: &mut Validator) -> bool {
    let last = v.tree.last;
    let argc = v.tree.node(last).args().len();
    let has_child = v.tree.first_child(last).is_some();
    if (argc != 0) != has_child {
        return true;
    }
    v.err("argument(s) expected")
}

fn post_ex(v: &mut Validator) -> bool {
    let last = v.tree.last;
    let has_child = v.tree.first_child(last).is_some();
    let args = v.tree.node(last).args();
    if args.is_empty() {
        if has_child {
            return true;
        }
        return v.err("argument(s) expected");
    }
    let std_only = args.len() == 1 && args[0].arg == MacroArg::Std;
    if has_child || !std_only {
        return v.err("argument(s) expected");
    }
    true
}

#[derive(PartialEq, Clone, Copy)]
enum ItShape {
    /// Content lives in the head (tag-style lists).
    Head,
    /// Content lives in the body (mark-style lists).
    Body,
    /// Column list: head phrases, no multiline body.
    Ohead,
}

fn post_it(v: &mut Validator) -> bool {
    let last = v.tree.last;
    if v.tree.node(last).kind != NodeKind::Block {
        return true;
    }

    // Item block -> list body -> list block; guaranteed by pre_it.
    let bl = v
        .tree
        .parent(last)
        .and_then(|p| v.tree.parent(p))
        .expect("list item outside a list");

    let mut shape = None;
    let mut sv = None;
    let mut ncols = 0usize;
    for a in v.tree.node(bl).args() {
        use MacroArg::*;
        let s = match a.arg {
            Tag | Diag | Hang | Ohang | Inset => ItShape::Head,
            Bullet | Dash | Enum | Hyphen | Item => ItShape::Body,
            Column => ItShape::Ohead,
            _ => continue,
        };
        shape = Some(s);
        sv = Some(a.arg);
        if a.arg == Column {
            ncols = a.values.len();
        }
        break;
    }
    let shape = shape.expect("list has no type");

    let head = v.tree.block_head(last);
    let body = v.tree.block_body(last);
    let head_used = v.tree.first_child(head).is_some();
    let body_used = v.tree.first_child(body).is_some();

    match shape {
        ItShape::Head => {
            if !head_used && !v.warn(WarnKind::Syntax, "argument(s) suggested") {
                return false;
            }
            if !body_used && !v.warn(WarnKind::Syntax, "multiline body suggested") {
                return false;
            }
        }
        ItShape::Body => {
            if head_used && !v.warn(WarnKind::Syntax, "no argument suggested") {
                return false;
            }
            if !body_used && !v.warn(WarnKind::Syntax, "multiline body suggested") {
                return false;
            }
        }
        ItShape::Ohead => {
            if !head_used && !v.warn(WarnKind::Syntax, "argument(s) suggested") {
                return false;
            }
            if body_used && !v.warn(WarnKind::Syntax, "no multiline body suggested") {
                return false;
            }
        }
    }

    if sv != Some(MacroArg::Column) {
        return true;
    }
    let have = v.tree.child_count(head);
    if have == ncols {
        return true;
    }
    v.err(&format!("need {ncols} columns (have {have})"))
}

fn post_bl(v: &mut Validator) -> bool {
    let last = v.tree.last;
    if v.tree.node(last).kind != NodeKind::Body {
        return true;
    }
    let bad = v.tree.children(last).find(|&c| {
        let n = v.tree.node(c);
        !(n.kind == NodeKind::Block && n.tok == Some(Token::It))
    });
    match bad {
        None => true,
        Some(n) => v.nerr(n, "bad child of parent list"),
    }
}

fn post_bool(v: &mut Validator) -> bool {
    let last = v.tree.last;
    let bad = v
        .tree
        .children(last)
        .find(|&c| !matches!(v.tree.node(c).text(), Some("on" | "off")));
    match bad {
        None => true,
        Some(n) => v.nerr(n, "expected boolean"),
    }
}

pub(crate) fn post_root(v: &mut Validator) -> bool {
    let root = v.tree.root();
    let Some(first) = v.tree.first_child(root) else {
        return v.err("document lacks data");
    };
    // A complete prologue always ends by recording the os string.
    if v.tree.meta.lastnamed == Section::Prologue || v.tree.meta.os.is_none() {
        return v.err("document lacks prologue");
    }
    let ok = {
        let n = v.tree.node(first);
        n.kind == NodeKind::Block && n.tok == Some(Token::Sh)
    };
    if ok {
        return true;
    }
    v.err("lacking post-prologue `Sh'")
}

fn post_sh(v: &mut Validator) -> bool {
    match v.tree.node(v.tree.last).kind {
        NodeKind::Head => post_sh_head(v),
        NodeKind::Body => post_sh_body(v),
        _ => true,
    }
}

/// Classify the section title, enforce conventional ordering, and advance
/// the `lastnamed` marker.
fn post_sh_head(v: &mut Validator) -> bool {
    let last = v.tree.last;
    let mut title = String::new();
    if !v.tree.concat_text(last, &mut title, 64) {
        return v.err("macro parameters too long");
    }
    let sec = Section::from_title(&title);

    if v.tree.meta.lastnamed == Section::Body && sec != Section::Name {
        return v.err("section NAME must be first");
    }
    if sec == Section::Custom {
        return true;
    }
    if sec == v.tree.meta.lastnamed {
        return v.warn(WarnKind::Syntax, "section repeated");
    }
    if sec < v.tree.meta.lastnamed {
        return v.warn(WarnKind::Syntax, "section out of conventional order");
    }
    v.tree.meta.lastnamed = sec;
    true
}

/// The NAME body should consist of `Nm` elements and text, ending in an
/// `Nd` description.
fn post_sh_body(v: &mut Validator) -> bool {
    let last = v.tree.last;
    if v.tree.meta.lastnamed != Section::Name {
        return true;
    }
    let children: Vec<NodeId> = v.tree.children(last).collect();
    let Some((&final_child, init)) = children.split_last() else {
        return v.warn(
            WarnKind::Compat,
            "section NAME should contain Nm and Nd",
        );
    };
    for &c in init {
        let ok = {
            let n = v.tree.node(c);
            (n.kind == NodeKind::Elem && n.tok == Some(Token::Nm)) || n.kind == NodeKind::Text
        };
        if !ok
            && !v.nwarn(
                c,
                WarnKind::Compat,
                "section NAME should contain Nm as initial body child",
            )
        {
            return false;
        }
    }
    let ends_in_nd = {
        let n = v.tree.node(final_child);
        n.kind == NodeKind::Elem && n.tok == Some(Token::Nd)
    };
    if ends_in_nd {
        return true;
    }
    v.warn(
        WarnKind::Compat,
        "section NAME should contain Nd as the last child",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Diagnostics;
    use core_tree::{Args, Tree};

    #[test]
    fn count_check_scope_gates_on_node_kind() {
        let mut tree = Tree::new();
        let root = tree.root();
        let sh = tree.block(root, Token::Sh, Args::new());
        tree.last = sh.body;
        let mut sink = Diagnostics::new();
        let mut v = Validator::new(&mut tree, &mut sink);
        // A head check against a body node does not apply.
        assert!(run_count(
            &mut v,
            &CountCheck {
                scope: Scope::Head,
                lvl: Lvl::Err,
                op: Op::Gt,
                want: 0,
            }
        ));
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn count_check_formats_the_canonical_message() {
        let mut tree = Tree::new();
        let root = tree.root();
        let ex = tree.elem(root, Token::Ex, Args::new());
        tree.text(ex, "a");
        tree.text(ex, "b");
        tree.last = ex;
        let mut sink = Diagnostics::new();
        let mut v = Validator::new(&mut tree, &mut sink);
        assert!(!run_count(
            &mut v,
            &CountCheck {
                scope: Scope::Elem,
                lvl: Lvl::Err,
                op: Op::Lt,
                want: 2,
            }
        ));
        assert_eq!(sink.messages(), vec!["requires line parameters 2 < (has 2)"]);
    }

    #[test]
    fn ops_compare_as_named() {
        assert!(Op::Lt.holds(1, 2));
        assert!(Op::Le.holds(2, 2));
        assert!(Op::Eq.holds(2, 2));
        assert!(Op::Ge.holds(2, 2));
        assert!(Op::Gt.holds(3, 2));
        assert!(!Op::Gt.holds(2, 2));
    }
}

use core_tree::{Arg, Args, MacroArg, Token, Tree};
use core_validate::{Diagnostics, Severity, validate};
use smallvec::smallvec;

fn display_args(arg: MacroArg) -> Args {
    smallvec![Arg::new(arg)]
}

#[test]
fn nested_displays_are_rejected() {
    let mut t = Tree::new();
    let root = t.root();
    let sh = t.block(root, Token::Sh, Args::new());
    t.text(sh.head, "NAME");
    let outer = t.block(sh.body, Token::Bd, display_args(MacroArg::Ragged));
    let inner = t.block(outer.body, Token::Bd, display_args(MacroArg::Literal));
    let _ = inner;

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(sink.has_errors());
    assert!(
        sink.messages().contains(&"displays may not be nested"),
        "got: {:?}",
        sink.messages()
    );
}

#[test]
fn quoted_displays_may_not_nest_either() {
    // D1 shares the display pre-rule with Bd.
    let mut t = Tree::new();
    let root = t.root();
    let sh = t.block(root, Token::Sh, Args::new());
    t.text(sh.head, "NAME");
    let bd = t.block(sh.body, Token::Bd, display_args(MacroArg::Unfilled));
    t.block(bd.body, Token::D1, Args::new());

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(sink.messages().contains(&"displays may not be nested"));
}

#[test]
fn sibling_displays_are_fine() {
    let mut t = Tree::new();
    let root = t.root();
    let sh = t.block(root, Token::Sh, Args::new());
    t.text(sh.head, "NAME");
    let first = t.block(sh.body, Token::Bd, display_args(MacroArg::Ragged));
    t.text(first.body, "one");
    let second = t.block(sh.body, Token::Bd, display_args(MacroArg::Literal));
    t.text(second.body, "two");

    let mut sink = Diagnostics::new();
    validate(&mut t, &mut sink);
    assert!(
        !sink
            .entries()
            .iter()
            .any(|d| d.severity == Severity::Error && d.msg == "displays may not be nested")
    );
}

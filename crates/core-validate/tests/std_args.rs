use core_tree::{Arg, Args, MacroArg, NodeId, Token, Tree};
use core_validate::{Diagnostics, Severity, WarnKind, validate};
use smallvec::smallvec;

/// Prologue declaring the given manual section, plus a NAME section.
fn doc(t: &mut Tree, msec: &str) -> NodeId {
    let root = t.root();
    let dd = t.elem(root, Token::Dd, Args::new());
    t.text(dd, "October 10, 2008");
    let dt = t.elem(root, Token::Dt, Args::new());
    t.text(dt, "TEST");
    t.text(dt, msec);
    t.elem(root, Token::Os, Args::new());
    let sh = t.block(root, Token::Sh, Args::new());
    t.text(sh.head, "NAME");
    let nm = t.elem(sh.body, Token::Nm, Args::new());
    t.text(nm, "test");
    let nd = t.elem(sh.body, Token::Nd, Args::new());
    t.text(nd, "exercise the validator");
    let sh = t.block(root, Token::Sh, Args::new());
    t.text(sh.head, "DESCRIPTION");
    sh.body
}

fn compat_warnings(sink: &Diagnostics) -> Vec<&str> {
    sink.entries()
        .iter()
        .filter(|d| d.severity == Severity::Warning(WarnKind::Compat))
        .map(|d| d.msg.as_str())
        .collect()
}

#[test]
fn errno_macros_belong_in_section_two() {
    let mut t = Tree::new();
    let body = doc(&mut t, "1");
    let er = t.elem(body, Token::Er, Args::new());
    t.text(er, "ENOENT");

    let mut sink = Diagnostics::new();
    assert!(validate(&mut t, &mut sink));
    assert!(compat_warnings(&sink).contains(&"wrong manual section"));

    let mut t = Tree::new();
    let body = doc(&mut t, "2");
    let er = t.elem(body, Token::Er, Args::new());
    t.text(er, "ENOENT");

    let mut sink = Diagnostics::new();
    assert!(validate(&mut t, &mut sink), "got: {:?}", sink.messages());
    assert!(compat_warnings(&sink).is_empty());
}

#[test]
fn exit_status_wants_the_std_argument() {
    let mut t = Tree::new();
    let body = doc(&mut t, "1");
    let args: Args = smallvec![Arg::new(MacroArg::Std)];
    t.elem(body, Token::Ex, args);

    let mut sink = Diagnostics::new();
    assert!(validate(&mut t, &mut sink), "got: {:?}", sink.messages());
    assert!(compat_warnings(&sink).is_empty());
}

#[test]
fn exit_status_without_std_is_a_compat_warning() {
    let mut t = Tree::new();
    let body = doc(&mut t, "1");
    t.elem(body, Token::Ex, Args::new());

    let mut sink = Diagnostics::new();
    // The pre-rule warns; the post-rule then rejects the empty element.
    assert!(!validate(&mut t, &mut sink));
    assert!(compat_warnings(&sink).contains(&"one argument suggested"));
}

#[test]
fn the_sink_policy_can_promote_compat_warnings() {
    let mut t = Tree::new();
    let body = doc(&mut t, "1");
    let args: Args = smallvec![Arg::new(MacroArg::Std), Arg::new(MacroArg::Std)];
    t.elem(body, Token::Ex, args);

    let mut lenient = Diagnostics::new();
    // Two arguments still only warn under the default policy, and the
    // post rule rejects the malformed element afterwards.
    assert!(!validate(&mut t, &mut lenient));

    let mut t = Tree::new();
    let body = doc(&mut t, "1");
    let args: Args = smallvec![Arg::new(MacroArg::Std), Arg::new(MacroArg::Std)];
    t.elem(body, Token::Ex, args);
    let mut strict = Diagnostics::new().fatal_warnings();
    assert!(!validate(&mut t, &mut strict));
    assert_eq!(
        strict.entries().len(),
        1,
        "fatal policy stops at the first warning"
    );
}

#[test]
fn return_value_macros_take_no_text() {
    let mut t = Tree::new();
    let body = doc(&mut t, "2");
    let args: Args = smallvec![Arg::new(MacroArg::Std)];
    let rv = t.elem(body, Token::Rv, args);
    t.text(rv, "stray");

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(
        sink.messages()
            .contains(&"requires line parameters 0 == (has 1)"),
        "got: {:?}",
        sink.messages()
    );
}

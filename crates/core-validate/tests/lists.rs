use core_tree::{Arg, Args, MacroArg, Token, Tree};
use core_validate::{Diagnostics, validate};
use smallvec::smallvec;

fn prologue_and_name(t: &mut Tree) {
    let root = t.root();
    let dd = t.elem(root, Token::Dd, Args::new());
    t.text(dd, "October 10, 2008");
    let dt = t.elem(root, Token::Dt, Args::new());
    t.text(dt, "TEST");
    t.text(dt, "1");
    t.elem(root, Token::Os, Args::new());
    let sh = t.block(root, Token::Sh, Args::new());
    t.text(sh.head, "NAME");
    let nm = t.elem(sh.body, Token::Nm, Args::new());
    t.text(nm, "test");
    let nd = t.elem(sh.body, Token::Nd, Args::new());
    t.text(nd, "exercise the validator");
}

fn body_section(t: &mut Tree) -> core_tree::NodeId {
    let root = t.root();
    let sh = t.block(root, Token::Sh, Args::new());
    t.text(sh.head, "DESCRIPTION");
    sh.body
}

#[test]
fn a_list_needs_exactly_one_type() {
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let bl = t.block(body, Token::Bl, Args::new());
    let it = t.block(bl.body, Token::It, Args::new());
    t.text(it.body, "x");

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(sink.messages().contains(&"no type specified"));
}

#[test]
fn two_list_types_are_rejected_at_the_second_argument() {
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let mut dash = Arg::new(MacroArg::Dash);
    dash.line = 9;
    dash.col = 5;
    let args: Args = smallvec![Arg::new(MacroArg::Bullet), dash];
    t.block(body, Token::Bl, args);

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    let entry = sink
        .entries()
        .iter()
        .find(|d| d.msg == "multiple types specified")
        .expect("diagnostic for the duplicate type");
    assert_eq!((entry.line, entry.col), (9, 5));
}

#[test]
fn display_types_are_exclusive_too() {
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let args: Args = smallvec![Arg::new(MacroArg::Ragged), Arg::new(MacroArg::Literal)];
    t.block(body, Token::Bd, args);

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(sink.messages().contains(&"multiple types specified"));
}

#[test]
fn item_outside_a_list_has_a_bad_parent() {
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    t.block(body, Token::It, Args::new());

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(sink.messages().iter().any(|m| m.starts_with("bad parent")));
}

#[test]
fn column_lists_check_the_cell_count() {
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let args: Args = smallvec![Arg::with_values(MacroArg::Column, ["one", "two", "three"])];
    let bl = t.block(body, Token::Bl, args);
    let it = t.block(bl.body, Token::It, Args::new());
    t.text(it.head, "a");
    t.text(it.head, "b");

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(
        sink.messages().contains(&"need 3 columns (have 2)"),
        "got: {:?}",
        sink.messages()
    );
}

#[test]
fn column_lists_with_matching_cells_pass() {
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let args: Args = smallvec![Arg::with_values(MacroArg::Column, ["one", "two"])];
    let bl = t.block(body, Token::Bl, args);
    let it = t.block(bl.body, Token::It, Args::new());
    t.text(it.head, "a");
    t.text(it.head, "b");

    let mut sink = Diagnostics::new();
    assert!(validate(&mut t, &mut sink), "got: {:?}", sink.messages());
}

#[test]
fn lists_may_only_contain_items() {
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let args: Args = smallvec![Arg::new(MacroArg::Bullet)];
    let bl = t.block(body, Token::Bl, args);
    t.text(bl.body, "stray text");

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(sink.messages().contains(&"bad child of parent list"));
}

#[test]
fn boolean_elements_take_on_or_off() {
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let sm = t.elem(body, Token::Sm, Args::new());
    t.text(sm, "off");

    let mut sink = Diagnostics::new();
    assert!(validate(&mut t, &mut sink), "got: {:?}", sink.messages());

    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let sm = t.elem(body, Token::Sm, Args::new());
    t.text(sm, "maybe");

    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(sink.messages().contains(&"expected boolean"));
}

#[test]
fn font_block_takes_argument_or_child_not_both() {
    // No argument: the head child selects the font and must be known.
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let bf = t.block(body, Token::Bf, Args::new());
    t.text(bf.head, "Em");
    t.text(bf.body, "emphasized");
    let mut sink = Diagnostics::new();
    assert!(validate(&mut t, &mut sink), "got: {:?}", sink.messages());

    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let bf = t.block(body, Token::Bf, Args::new());
    t.text(bf.head, "Zz");
    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(sink.messages().contains(&"invalid font"));

    // No argument and no head child selects nothing.
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    t.block(body, Token::Bf, Args::new());
    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(sink.messages().contains(&"argument expected"));

    // One argument plus a head child is over-determined.
    let mut t = Tree::new();
    prologue_and_name(&mut t);
    let body = body_section(&mut t);
    let args: Args = smallvec![Arg::new(MacroArg::Emphasis)];
    let bf = t.block(body, Token::Bf, args);
    t.text(bf.head, "Em");
    let mut sink = Diagnostics::new();
    assert!(!validate(&mut t, &mut sink));
    assert!(
        sink.messages()
            .contains(&"argument and font child are exclusive")
    );
}

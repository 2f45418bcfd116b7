//! Indented ASCII listing of a parsed tree, for debugging output.

use std::fmt::Write;

use crate::{NodeId, NodeKind, Payload, Tree};

/// Render the whole tree, one node per line, children indented by tabs.
pub fn dump(tree: &Tree) -> String {
    let mut out = String::new();
    write_node(tree, tree.root(), 0, &mut out);
    out
}

fn write_node(tree: &Tree, id: NodeId, indent: usize, out: &mut String) {
    let n = tree.node(id);
    for _ in 0..indent {
        out.push('\t');
    }

    match &n.payload {
        Payload::Table(span) => {
            let _ = write!(out, "tbl: span #{span}");
        }
        _ => {
            let name = match n.kind {
                NodeKind::Root => "root",
                NodeKind::Text => n.text().unwrap_or(""),
                _ => n.tok.map(|t| t.name()).unwrap_or("?"),
            };
            let _ = write!(out, "{} ({})", name, n.kind.name());
            for arg in n.args() {
                let _ = write!(out, " -{}", arg.arg.name());
                if !arg.values.is_empty() {
                    out.push_str(" [");
                    for v in &arg.values {
                        let _ = write!(out, " [{v}]");
                    }
                    out.push_str(" ]");
                }
            }
            let _ = write!(out, " {}:{}", n.line, n.col);
        }
    }
    out.push('\n');

    for child in tree.children(id) {
        write_node(tree, child, indent + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arg, Args, MacroArg, Token};
    use smallvec::smallvec;

    #[test]
    fn dump_shows_structure_and_args() {
        let mut t = Tree::new();
        let root = t.root();
        let args: Args = smallvec![Arg::with_values(MacroArg::Width, ["6n"])];
        let bl = t.block_at(root, Token::Bl, args, 4, 1);
        t.text_at(bl.body, "hello", 5, 1);

        let out = dump(&t);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "root (root) 0:0");
        assert_eq!(lines[1], "\tBl (block) -width [ [6n] ] 4:1");
        assert_eq!(lines[2], "\t\tBl (block-head) 4:1");
        assert_eq!(lines[3], "\t\tBl (block-body) 4:1");
        assert_eq!(lines[4], "\t\t\thello (text) 5:1");
    }
}

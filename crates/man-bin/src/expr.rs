//! Search-term compilation.
//!
//! Under `apropos`, a bare term is a case-insensitive pattern applied to
//! page names and descriptions, and `key=pattern` applies the pattern to
//! the values of one indexed macro class. Under `whatis`, every term is a
//! literal keyword compared against page names.

use anyhow::{Context, Result};
use core_index::macro_index;
use regex::{Regex, RegexBuilder};

#[derive(Debug)]
pub enum Term {
    /// Pattern over names and descriptions.
    Any(Regex),
    /// Pattern over the values of one indexed macro class.
    Macro { im: usize, re: Regex },
    /// Literal keyword, case-insensitive, names only.
    Word(String),
}

pub fn compile(args: &[String], whatis: bool) -> Result<Vec<Term>> {
    args.iter().map(|arg| compile_one(arg, whatis)).collect()
}

fn compile_one(arg: &str, whatis: bool) -> Result<Term> {
    if whatis {
        return Ok(Term::Word(arg.to_lowercase()));
    }
    if let Some((key, pat)) = arg.split_once('=') {
        let im = macro_index(key).with_context(|| format!("unknown key `{key}'"))?;
        return Ok(Term::Macro {
            im,
            re: build(pat)?,
        });
    }
    Ok(Term::Any(build(arg)?))
}

fn build(pat: &str) -> Result<Regex> {
    RegexBuilder::new(pat)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("bad pattern `{pat}'"))
}

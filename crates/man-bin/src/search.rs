//! Search across the databases on the resolved path list.
//!
//! Terms are OR-ed: a page matching any term is a hit. Hits are read out
//! into owned records, filtered by section and architecture, sorted by
//! name, and deduplicated across databases.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, bail};
use core_index::{Dbm, PageHit, PageView};
use tracing::debug;

use crate::expr::Term;

/// File name of the index inside each manual directory.
pub const DB_FILENAME: &str = "man.db";

#[derive(Debug, Default)]
pub struct Filters {
    pub arch: Option<String>,
    pub section: Option<String>,
}

/// One result line, ordered by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hit {
    pub name: String,
    pub sect: String,
    pub arch: Option<String>,
    pub desc: String,
}

/// Search every database under `paths`. It is an error when not a single
/// database could be opened; an individual unreadable directory is only
/// logged and skipped.
pub fn search(paths: &[PathBuf], filters: &Filters, terms: &[Term]) -> Result<Vec<Hit>> {
    let mut hits: Vec<Hit> = Vec::new();
    let mut opened = 0usize;

    for dir in paths {
        let file = dir.join(DB_FILENAME);
        let db = match Dbm::open(&file) {
            Ok(db) => db,
            Err(err) => {
                debug!(file = %file.display(), %err, "skipping database");
                continue;
            }
        };
        opened += 1;

        let mut pages: BTreeMap<u32, u8> = BTreeMap::new();
        for term in terms {
            for hit in run_term(&db, term) {
                pages.entry(hit.page).or_insert(hit.bits);
            }
        }
        debug!(dir = %dir.display(), matches = pages.len(), "database searched");

        for &ip in pages.keys() {
            let page = db.page(ip);
            if !filter_ok(&page, filters) {
                continue;
            }
            hits.push(Hit {
                name: page
                    .names()
                    .next()
                    .map(|(_, n)| n.into_owned())
                    .unwrap_or_default(),
                sect: page.sects().next().map(Cow::into_owned).unwrap_or_default(),
                arch: page.arch().and_then(|mut a| a.next()).map(Cow::into_owned),
                desc: page.desc().into_owned(),
            });
        }
    }

    if opened == 0 && !paths.is_empty() {
        bail!("no readable database in any of {} directories", paths.len());
    }
    hits.sort();
    hits.dedup();
    Ok(hits)
}

fn run_term(db: &Dbm, term: &Term) -> Vec<PageHit> {
    match term {
        Term::Any(re) => {
            let m = |c: &str| re.is_match(c);
            let mut v: Vec<PageHit> = db.pages_by_name(&m).collect();
            v.extend(db.pages_by_desc(&m));
            v
        }
        Term::Macro { im, re } => {
            let m = |c: &str| re.is_match(c);
            db.pages_by_macro(*im, &m).collect()
        }
        Term::Word(w) => {
            let m = |c: &str| c.to_lowercase() == *w;
            db.pages_by_name(&m).collect()
        }
    }
}

fn filter_ok(page: &PageView<'_>, filters: &Filters) -> bool {
    if let Some(sec) = &filters.section {
        if !page.sects().any(|s| s.starts_with(sec.as_str())) {
            return false;
        }
    }
    if let Some(arch) = &filters.arch {
        // Machine-independent pages apply to every architecture.
        if let Some(mut archs) = page.arch() {
            if !archs.any(|a| a.eq_ignore_ascii_case(arch)) {
                return false;
            }
        }
    }
    true
}

//! Read-only access to the on-disk manual-page index.
//!
//! [`Dbm::open`] loads the whole file into an owned buffer (the format is
//! never written through the reader, so a shared mapping and an owned
//! buffer are indistinguishable to callers) and validates every offset the
//! file declares. After a successful open the API cannot fail: lookups are
//! plain offset arithmetic, and out-of-range arguments are programming
//! errors.
//!
//! Filtered iteration hands back explicit iterator values — arming a
//! search borrows the reader, and each call to `next` yields the next
//! matching page together with the quality bits of the matching name.
//! The match predicate is a capability supplied by the caller; the reader
//! never inspects its internals.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

pub mod format;

pub use format::{MACRO_MAX, MACRO_NAMES, macro_index};
use format::{MAGIC, PAGE_BASE, PAGE_RECORD, VERSION, be32, cbytes};

/// Why a file was rejected at open time.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{path}: invalid database file: {reason}")]
    InvalidFile { path: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Match predicate injected by the caller. The candidate string is only
/// valid for the duration of the call.
pub trait DbmMatch {
    fn matches(&self, candidate: &str) -> bool;
}

impl<F: Fn(&str) -> bool> DbmMatch for F {
    fn matches(&self, candidate: &str) -> bool {
        self(candidate)
    }
}

/// One hit of a filtered page iteration: the page index plus the quality
/// byte of the matching name (0 for non-name iterations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHit {
    pub page: u32,
    pub bits: u8,
}

#[derive(Debug)]
struct MacroSlot {
    nvals: u32,
    /// Offset of the first `(value, pages)` entry pair.
    entries: usize,
}

/// An open index database. Dropping the reader releases the buffer; there
/// is no separate close step.
#[derive(Debug)]
pub struct Dbm {
    buf: Vec<u8>,
    npages: u32,
    macros: Vec<MacroSlot>,
}

impl Dbm {
    /// Open and validate an index file. All offsets the file declares are
    /// checked against the buffer once, here.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let buf = fs::read(path)?;
        Self::parse(buf, &path.display().to_string())
    }

    /// Open a database already resident in memory. Mostly for tests.
    pub fn from_bytes(buf: Vec<u8>) -> Result<Self, DbError> {
        Self::parse(buf, "(memory)")
    }

    fn parse(buf: Vec<u8>, path: &str) -> Result<Self, DbError> {
        let fail = |reason: String| DbError::InvalidFile {
            path: path.to_string(),
            reason,
        };
        let slot = |i: usize| be32(&buf, 4 * i);

        if slot(0) != Some(MAGIC) {
            return Err(fail("bad magic number".to_string()));
        }
        if slot(1) != Some(VERSION) {
            return Err(fail("unsupported version".to_string()));
        }

        let npages = match slot(4) {
            Some(n) if n >= 0 => n as u32,
            Some(n) => return Err(fail(format!("invalid number of pages: {n}"))),
            None => return Err(fail("truncated header".to_string())),
        };
        let pages_end = PAGE_BASE + npages as usize * PAGE_RECORD;
        if pages_end > buf.len() {
            return Err(fail(format!("page table extends past the end: {pages_end}")));
        }

        // Every page record offset must land inside the buffer.
        for ip in 0..npages as usize {
            let rec = PAGE_BASE + ip * PAGE_RECORD;
            for (slot_idx, required) in [(0, true), (1, true), (2, false), (3, true), (4, true)] {
                let off = be32(&buf, rec + 4 * slot_idx)
                    .ok_or_else(|| fail("truncated page record".to_string()))?;
                if off == 0 && !required {
                    continue;
                }
                if off <= 0 || off as usize >= buf.len() {
                    return Err(fail(format!("page {ip}: invalid offset {off}")));
                }
            }
        }

        // Macros table: declared length, then one record per macro class.
        let macros_off = match slot(2) {
            Some(off) if off > 0 && (off as usize) < buf.len() => off as usize,
            _ => return Err(fail("invalid offset of macros table".to_string())),
        };
        match be32(&buf, macros_off) {
            Some(n) if n as usize == MACRO_MAX => {}
            Some(n) => return Err(fail(format!("invalid number of macros: {n}"))),
            None => return Err(fail("truncated macros table".to_string())),
        }
        let mut macros = Vec::with_capacity(MACRO_MAX);
        for im in 0..MACRO_MAX {
            let rec = match be32(&buf, macros_off + 4 + 4 * im) {
                Some(off) if off > 0 && (off as usize) < buf.len() => off as usize,
                _ => return Err(fail(format!("invalid offset of macro {im}"))),
            };
            let nvals = match be32(&buf, rec) {
                Some(n) if n >= 0 => n as u32,
                _ => return Err(fail(format!("macro {im}: invalid value count"))),
            };
            let entries = rec + 4;
            let end = entries + nvals as usize * 8;
            if end > buf.len() {
                return Err(fail(format!("macro {im}: record extends past the end")));
            }
            for iv in 0..nvals as usize {
                let value = be32(&buf, entries + 8 * iv).unwrap_or(-1);
                let pages = be32(&buf, entries + 8 * iv + 4).unwrap_or(-1);
                if value <= 0 || value as usize >= buf.len() {
                    return Err(fail(format!("macro {im}: invalid value offset {value}")));
                }
                if pages <= 0 || pages as usize >= buf.len() {
                    return Err(fail(format!("macro {im}: invalid pages offset {pages}")));
                }
                // The pages list must terminate and reference real pages.
                let mut pp = pages as usize;
                loop {
                    let entry = be32(&buf, pp)
                        .ok_or_else(|| fail(format!("macro {im}: unterminated pages list")))?;
                    if entry == 0 {
                        break;
                    }
                    let entry = entry as usize;
                    if entry < PAGE_BASE
                        || entry >= pages_end
                        || (entry - PAGE_BASE) % PAGE_RECORD != 0
                    {
                        return Err(fail(format!("macro {im}: invalid page reference {entry}")));
                    }
                    pp += 4;
                }
            }
            macros.push(MacroSlot { nvals, entries });
        }

        debug!(npages, path, "database opened");
        Ok(Dbm {
            buf,
            npages,
            macros,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.npages
    }

    /// View of one page. `ip` must be within range.
    pub fn page(&self, ip: u32) -> PageView<'_> {
        assert!(ip < self.npages, "page index out of range");
        PageView {
            db: self,
            rec: PAGE_BASE + ip as usize * PAGE_RECORD,
        }
    }

    /// Arm a filtered iteration over page names. Hits carry the quality
    /// byte of the matching name.
    pub fn pages_by_name<'a>(&'a self, m: &'a dyn DbmMatch) -> PageIter<'a> {
        self.pages_by_title(TitleKind::Name, m)
    }

    pub fn pages_by_sect<'a>(&'a self, m: &'a dyn DbmMatch) -> PageIter<'a> {
        self.pages_by_title(TitleKind::Sect, m)
    }

    pub fn pages_by_desc<'a>(&'a self, m: &'a dyn DbmMatch) -> PageIter<'a> {
        self.pages_by_title(TitleKind::Desc, m)
    }

    fn pages_by_title<'a>(&'a self, kind: TitleKind, m: &'a dyn DbmMatch) -> PageIter<'a> {
        PageIter {
            db: self,
            kind,
            m,
            ip: 0,
        }
    }

    /// Arm a filtered iteration over architectures. Machine-independent
    /// pages are skipped.
    pub fn pages_by_arch<'a>(&'a self, m: &'a dyn DbmMatch) -> ArchIter<'a> {
        ArchIter {
            db: self,
            m,
            ip: 0,
        }
    }

    /// Arm an iteration over the pages of the first value of macro class
    /// `im` accepted by the predicate.
    pub fn pages_by_macro<'a>(&'a self, im: usize, m: &dyn DbmMatch) -> MacroPageIter<'a> {
        assert!(im < MACRO_MAX, "macro index out of range");
        let slot = &self.macros[im];
        let mut cur = None;
        for iv in 0..slot.nvals as usize {
            let value = self.int_at(slot.entries + 8 * iv) as usize;
            if m.matches(&self.cstr(value)) {
                cur = Some(self.int_at(slot.entries + 8 * iv + 4) as usize);
                break;
            }
        }
        MacroPageIter { db: self, cur }
    }

    /// Number of distinct values recorded for macro class `im`.
    pub fn macro_count(&self, im: usize) -> u32 {
        assert!(im < MACRO_MAX, "macro index out of range");
        self.macros[im].nvals
    }

    /// One recorded value of a macro class together with its page list.
    pub fn macro_entry(&self, im: usize, iv: u32) -> MacroEntry<'_> {
        assert!(im < MACRO_MAX, "macro index out of range");
        assert!(iv < self.macros[im].nvals, "value index out of range");
        let base = self.macros[im].entries + 8 * iv as usize;
        MacroEntry {
            value: self.cstr(self.int_at(base) as usize),
            pages: PageNumbers {
                db: self,
                cur: self.int_at(base + 4) as usize,
            },
        }
    }

    /// Arm an iteration over all values of macro class `im` that reference
    /// page `ip`.
    pub fn macros_by_page(&self, im: usize, ip: u32) -> MacroValueIter<'_> {
        assert!(im < MACRO_MAX, "macro index out of range");
        assert!(ip < self.npages, "page index out of range");
        MacroValueIter {
            db: self,
            im,
            page_off: PAGE_BASE + ip as usize * PAGE_RECORD,
            iv: 0,
        }
    }

    fn int_at(&self, off: usize) -> i32 {
        be32(&self.buf, off).expect("offset validated at open")
    }

    fn cstr(&self, off: usize) -> Cow<'_, str> {
        String::from_utf8_lossy(cbytes(&self.buf, off))
    }

    fn page_index_of(&self, rec_off: usize) -> u32 {
        ((rec_off - PAGE_BASE) / PAGE_RECORD) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TitleKind {
    Name,
    Sect,
    Desc,
}

/// String views into one page record.
pub struct PageView<'a> {
    db: &'a Dbm,
    rec: usize,
}

impl<'a> PageView<'a> {
    fn off(&self, slot: usize) -> usize {
        self.db.int_at(self.rec + 4 * slot) as usize
    }

    /// The page's names with their quality bytes.
    pub fn names(&self) -> Names<'a> {
        Names {
            buf: &self.db.buf,
            cur: self.off(0),
        }
    }

    pub fn sects(&self) -> Strings<'a> {
        Strings {
            buf: &self.db.buf,
            cur: self.off(1),
        }
    }

    /// Architecture list; `None` for machine-independent pages.
    pub fn arch(&self) -> Option<Strings<'a>> {
        let off = self.off(2);
        (off != 0).then_some(Strings {
            buf: &self.db.buf,
            cur: off,
        })
    }

    /// One-line description.
    pub fn desc(&self) -> Cow<'a, str> {
        self.db.cstr(self.off(3))
    }

    pub fn files(&self) -> Strings<'a> {
        Strings {
            buf: &self.db.buf,
            cur: self.off(4),
        }
    }
}

/// Iterator over a name block: (quality, name) pairs.
pub struct Names<'a> {
    buf: &'a [u8],
    cur: usize,
}

impl<'a> Iterator for Names<'a> {
    type Item = (u8, Cow<'a, str>);

    fn next(&mut self) -> Option<Self::Item> {
        let quality = *self.buf.get(self.cur)?;
        if quality == 0 {
            return None;
        }
        let name = cbytes(self.buf, self.cur + 1);
        self.cur += 1 + name.len() + 1;
        Some((quality, String::from_utf8_lossy(name)))
    }
}

/// Iterator over a NUL-terminated string list.
pub struct Strings<'a> {
    buf: &'a [u8],
    cur: usize,
}

impl<'a> Iterator for Strings<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        let &first = self.buf.get(self.cur)?;
        if first == 0 {
            return None;
        }
        let s = cbytes(self.buf, self.cur);
        self.cur += s.len() + 1;
        Some(String::from_utf8_lossy(s))
    }
}

/// Filtered iteration over pages by name, section, or description.
/// Each page is yielded at most once; exhaustion resets nothing because
/// the iterator value simply ends.
pub struct PageIter<'a> {
    db: &'a Dbm,
    kind: TitleKind,
    m: &'a dyn DbmMatch,
    ip: u32,
}

impl Iterator for PageIter<'_> {
    type Item = PageHit;

    fn next(&mut self) -> Option<PageHit> {
        while self.ip < self.db.npages {
            let ip = self.ip;
            self.ip += 1;
            let page = self.db.page(ip);
            let bits = match self.kind {
                TitleKind::Name => page
                    .names()
                    .find(|(_, name)| self.m.matches(name))
                    .map(|(quality, _)| quality),
                TitleKind::Sect => page
                    .sects()
                    .any(|s| self.m.matches(&s))
                    .then_some(0),
                TitleKind::Desc => self.m.matches(&page.desc()).then_some(0),
            };
            if let Some(bits) = bits {
                return Some(PageHit { page: ip, bits });
            }
        }
        None
    }
}

/// Filtered iteration over pages by architecture.
pub struct ArchIter<'a> {
    db: &'a Dbm,
    m: &'a dyn DbmMatch,
    ip: u32,
}

impl Iterator for ArchIter<'_> {
    type Item = PageHit;

    fn next(&mut self) -> Option<PageHit> {
        while self.ip < self.db.npages {
            let ip = self.ip;
            self.ip += 1;
            let Some(mut archs) = self.db.page(ip).arch() else {
                continue;
            };
            if archs.any(|a| self.m.matches(&a)) {
                return Some(PageHit { page: ip, bits: 0 });
            }
        }
        None
    }
}

/// Iteration over the pages block of one matched macro value.
pub struct MacroPageIter<'a> {
    db: &'a Dbm,
    cur: Option<usize>,
}

impl Iterator for MacroPageIter<'_> {
    type Item = PageHit;

    fn next(&mut self) -> Option<PageHit> {
        let cur = self.cur?;
        let rec = self.db.int_at(cur);
        if rec == 0 {
            self.cur = None;
            return None;
        }
        self.cur = Some(cur + 4);
        Some(PageHit {
            page: self.db.page_index_of(rec as usize),
            bits: 0,
        })
    }
}

/// Page numbers referenced by one macro value.
pub struct PageNumbers<'a> {
    db: &'a Dbm,
    cur: usize,
}

impl Iterator for PageNumbers<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let rec = self.db.int_at(self.cur);
        if rec == 0 {
            return None;
        }
        self.cur += 4;
        Some(self.db.page_index_of(rec as usize))
    }
}

/// One value of a macro class: its string and the pages that use it.
pub struct MacroEntry<'a> {
    pub value: Cow<'a, str>,
    pub pages: PageNumbers<'a>,
}

/// Iteration over all macro values referencing one page.
pub struct MacroValueIter<'a> {
    db: &'a Dbm,
    im: usize,
    page_off: usize,
    iv: u32,
}

impl<'a> Iterator for MacroValueIter<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = &self.db.macros[self.im];
        while self.iv < slot.nvals {
            let base = slot.entries + 8 * self.iv as usize;
            self.iv += 1;
            let mut pp = self.db.int_at(base + 4) as usize;
            loop {
                let rec = self.db.int_at(pp);
                if rec == 0 {
                    break;
                }
                if rec as usize == self.page_off {
                    return Some(self.db.cstr(self.db.int_at(base) as usize));
                }
                pp += 4;
            }
        }
        None
    }
}

use core_index::{DbError, Dbm, MACRO_MAX, PageHit, macro_index};

const MAGIC: i32 = 0x3a7d_0cdb;

#[derive(Default)]
struct PageSpec {
    names: Vec<(u8, &'static str)>,
    sects: Vec<&'static str>,
    archs: Vec<&'static str>,
    desc: &'static str,
    files: Vec<&'static str>,
}

fn patch(buf: &mut [u8], off: usize, v: i32) {
    buf[off..off + 4].copy_from_slice(&v.to_be_bytes());
}

/// Serialize a database. Returns the bytes and the extent of the page
/// string blocks (everything between the page records and the macro
/// area), for coverage accounting.
fn build_db(
    pages: &[PageSpec],
    macros: &[(usize, Vec<(&'static str, Vec<usize>)>)],
) -> (Vec<u8>, std::ops::Range<usize>) {
    let mut buf = vec![0u8; 20 + pages.len() * 20];
    patch(&mut buf, 0, MAGIC);
    patch(&mut buf, 4, 1);
    patch(&mut buf, 16, pages.len() as i32);

    let blocks_start = buf.len();
    for (ip, p) in pages.iter().enumerate() {
        let rec = 20 + ip * 20;
        let name_off = buf.len();
        for (q, name) in &p.names {
            buf.push(*q);
            buf.extend_from_slice(name.as_bytes());
            buf.push(0);
        }
        buf.push(0);
        let sect_off = buf.len();
        for s in &p.sects {
            buf.extend_from_slice(s.as_bytes());
            buf.push(0);
        }
        buf.push(0);
        let arch_off = if p.archs.is_empty() {
            0
        } else {
            let off = buf.len();
            for s in &p.archs {
                buf.extend_from_slice(s.as_bytes());
                buf.push(0);
            }
            buf.push(0);
            off
        };
        let desc_off = buf.len();
        buf.extend_from_slice(p.desc.as_bytes());
        buf.push(0);
        let files_off = buf.len();
        for s in &p.files {
            buf.extend_from_slice(s.as_bytes());
            buf.push(0);
        }
        buf.push(0);

        patch(&mut buf, rec, name_off as i32);
        patch(&mut buf, rec + 4, sect_off as i32);
        patch(&mut buf, rec + 8, arch_off as i32);
        patch(&mut buf, rec + 12, desc_off as i32);
        patch(&mut buf, rec + 16, files_off as i32);
    }
    let blocks_end = buf.len();

    let mut record_offs = [0usize; MACRO_MAX];
    for (im, values) in macros {
        let mut entries: Vec<(usize, usize)> = Vec::new();
        for (value, page_indices) in values {
            let voff = buf.len();
            buf.extend_from_slice(value.as_bytes());
            buf.push(0);
            let poff = buf.len();
            for ip in page_indices {
                patch_push(&mut buf, (20 + ip * 20) as i32);
            }
            patch_push(&mut buf, 0);
            entries.push((voff, poff));
        }
        let rec = buf.len();
        patch_push(&mut buf, entries.len() as i32);
        for (v, p) in entries {
            patch_push(&mut buf, v as i32);
            patch_push(&mut buf, p as i32);
        }
        record_offs[*im] = rec;
    }
    let empty = buf.len();
    patch_push(&mut buf, 0);
    let table = buf.len();
    patch_push(&mut buf, MACRO_MAX as i32);
    for off in record_offs {
        patch_push(&mut buf, if off != 0 { off as i32 } else { empty as i32 });
    }
    patch(&mut buf, 8, table as i32);
    (buf, blocks_start..blocks_end)
}

fn patch_push(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn three_pages() -> (Vec<u8>, std::ops::Range<usize>) {
    build_db(
        &[
            PageSpec {
                names: vec![(1, "foo")],
                sects: vec!["1"],
                archs: vec![],
                desc: "frob things",
                files: vec!["man1/foo.1"],
            },
            PageSpec {
                names: vec![(2, "foo"), (1, "bar")],
                sects: vec!["1", "8"],
                archs: vec!["amd64", "i386"],
                desc: "frob other things",
                files: vec!["man1/bar.1"],
            },
            PageSpec {
                names: vec![(1, "baz")],
                sects: vec!["3"],
                archs: vec![],
                desc: "a library about nothing",
                files: vec!["man3/baz.3"],
            },
        ],
        &[(
            macro_index("Nm").expect("known key"),
            vec![("foo", vec![0, 1]), ("bar", vec![2])],
        )],
    )
}

#[test]
fn name_iteration_yields_each_page_once_with_quality() {
    let (bytes, _) = three_pages();
    let db = Dbm::from_bytes(bytes).unwrap();
    let m = |c: &str| c == "foo";
    let hits: Vec<PageHit> = db.pages_by_name(&m).collect();
    assert_eq!(
        hits,
        vec![
            PageHit { page: 0, bits: 1 },
            PageHit { page: 1, bits: 2 },
        ],
        "the second page hits on its first name; bar is skipped"
    );
}

#[test]
fn sect_and_desc_iteration() {
    let (bytes, _) = three_pages();
    let db = Dbm::from_bytes(bytes).unwrap();

    let m = |c: &str| c == "8";
    let hits: Vec<u32> = db.pages_by_sect(&m).map(|h| h.page).collect();
    assert_eq!(hits, vec![1]);

    let m = |c: &str| c.contains("library");
    let hits: Vec<u32> = db.pages_by_desc(&m).map(|h| h.page).collect();
    assert_eq!(hits, vec![2]);
}

#[test]
fn arch_iteration_skips_machine_independent_pages() {
    let (bytes, _) = three_pages();
    let db = Dbm::from_bytes(bytes).unwrap();
    let m = |c: &str| c == "i386";
    let hits: Vec<u32> = db.pages_by_arch(&m).map(|h| h.page).collect();
    assert_eq!(hits, vec![1]);

    let m = |_: &str| true;
    let all: Vec<u32> = db.pages_by_arch(&m).map(|h| h.page).collect();
    assert_eq!(all, vec![1], "pages without an arch block never match");
}

#[test]
fn page_views_expose_all_blocks() {
    let (bytes, _) = three_pages();
    let db = Dbm::from_bytes(bytes).unwrap();
    assert_eq!(db.page_count(), 3);

    let p = db.page(1);
    let names: Vec<(u8, String)> = p.names().map(|(q, n)| (q, n.into_owned())).collect();
    assert_eq!(names, vec![(2, "foo".to_string()), (1, "bar".to_string())]);
    let sects: Vec<String> = p.sects().map(|s| s.into_owned()).collect();
    assert_eq!(sects, vec!["1", "8"]);
    let archs: Vec<String> = p.arch().expect("has an arch block").map(|s| s.into_owned()).collect();
    assert_eq!(archs, vec!["amd64", "i386"]);
    assert_eq!(p.desc(), "frob other things");
    let files: Vec<String> = p.files().map(|s| s.into_owned()).collect();
    assert_eq!(files, vec!["man1/bar.1"]);

    assert!(db.page(0).arch().is_none(), "page 0 is machine-independent");
}

#[test]
fn macro_lookup_and_iteration() {
    let (bytes, _) = three_pages();
    let db = Dbm::from_bytes(bytes).unwrap();
    let im = macro_index("Nm").unwrap();

    assert_eq!(db.macro_count(im), 2);
    let entry = db.macro_entry(im, 0);
    assert_eq!(entry.value, "foo");
    assert_eq!(entry.pages.collect::<Vec<u32>>(), vec![0, 1]);

    let m = |c: &str| c == "foo";
    let hits: Vec<u32> = db.pages_by_macro(im, &m).map(|h| h.page).collect();
    assert_eq!(hits, vec![0, 1]);

    let m = |c: &str| c == "nope";
    assert_eq!(db.pages_by_macro(im, &m).count(), 0);

    let values: Vec<String> = db.macros_by_page(im, 2).map(|v| v.into_owned()).collect();
    assert_eq!(values, vec!["bar"]);
    let values: Vec<String> = db.macros_by_page(im, 0).map(|v| v.into_owned()).collect();
    assert_eq!(values, vec!["foo"]);

    let other = macro_index("Xr").unwrap();
    assert_eq!(db.macro_count(other), 0);
    assert_eq!(db.macros_by_page(other, 0).count(), 0);
}

#[test]
fn page_views_cover_every_block_byte_exactly_once() {
    let (bytes, blocks) = three_pages();
    let db = Dbm::from_bytes(bytes).unwrap();

    let mut covered = 0usize;
    for ip in 0..db.page_count() {
        let p = db.page(ip);
        covered += p.names().map(|(_, n)| 1 + n.len() + 1).sum::<usize>() + 1;
        covered += p.sects().map(|s| s.len() + 1).sum::<usize>() + 1;
        if let Some(archs) = p.arch() {
            covered += archs.map(|s| s.len() + 1).sum::<usize>() + 1;
        }
        covered += p.desc().len() + 1;
        covered += p.files().map(|s| s.len() + 1).sum::<usize>() + 1;
    }
    assert_eq!(covered, blocks.len());
}

#[test]
fn open_reads_from_disk_and_reports_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("man.db");
    let (bytes, _) = three_pages();
    std::fs::write(&path, &bytes).unwrap();

    let db = Dbm::open(&path).unwrap();
    assert_eq!(db.page_count(), 3);

    let missing = Dbm::open(dir.path().join("absent.db"));
    assert!(matches!(missing, Err(DbError::Io(_))));
}

#[test]
fn invalid_files_are_rejected_at_open() {
    // Truncated.
    assert!(Dbm::from_bytes(vec![0u8; 4]).is_err());

    // Wrong macro table length.
    let (mut bytes, _) = three_pages();
    let table = i32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize;
    patch(&mut bytes, table, (MACRO_MAX - 1) as i32);
    let err = Dbm::from_bytes(bytes).unwrap_err();
    assert!(err.to_string().contains("invalid number of macros"));

    // Negative page count.
    let (mut bytes, _) = three_pages();
    patch(&mut bytes, 16, -1);
    let err = Dbm::from_bytes(bytes).unwrap_err();
    assert!(err.to_string().contains("invalid number of pages"));

    // Page offset outside the mapping.
    let (mut bytes, _) = three_pages();
    patch(&mut bytes, 20, 1 << 20);
    let err = Dbm::from_bytes(bytes).unwrap_err();
    assert!(err.to_string().contains("invalid offset"));

    // A macro pages list referencing a non-page offset.
    let (bytes, _) = three_pages();
    let mut broken = bytes.clone();
    // Find the first pages-list word after the blocks region and point it
    // mid-record.
    let im = macro_index("Nm").unwrap();
    let table = i32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize;
    let rec = i32::from_be_bytes(
        bytes[table + 4 + 4 * im..table + 8 + 4 * im].try_into().unwrap(),
    ) as usize;
    let pages_off =
        i32::from_be_bytes(bytes[rec + 8..rec + 12].try_into().unwrap()) as usize;
    patch(&mut broken, pages_off, 22);
    let err = Dbm::from_bytes(broken).unwrap_err();
    assert!(err.to_string().contains("invalid page reference"), "{err}");
}

//! Metadata extraction over `otool -oV` style text.
//!
//! Each structural unit of the dump has its own parsing function:
//! - [`section_region`]: the body of one `Contents of (SEG,section) section` block.
//! - [`declared_class_names`]: class names from the `__objc_classlist` block.
//! - [`referenced_class_names`]: `_OBJC_CLASS_$_` targets from `__objc_classrefs`.
//! - [`class_chunks`]: every `class_ro_t` record, tagged native or bridged.
//! - [`referenced_selectors`]: `__objc_methname` tokens from the selector references.
//!
//! None of these fail. A dump without Objective-C metadata simply yields empty
//! collections, and blank or malformed entries are skipped.

pub mod chunk;

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::model::{ChunkFlavor, ExtractedMetadata, RawClassChunk, Selector};

pub use chunk::{class_name, parse_bridged_chunk, parse_chunk, parse_native_chunk};

/// Section holding one pointer per class defined in the image.
pub const CLASSLIST_SECTION: &str = "__objc_classlist";
/// Section holding one pointer per class the code loads.
pub const CLASSREFS_SECTION: &str = "__objc_classrefs";
/// Section holding one pointer per selector the code sends.
pub const SELREFS_SECTION: &str = "__objc_selrefs";

/// Marker otool prints after the `class_ro_t` pointer for Swift classes.
const BRIDGED_MARKER: &str = "Swift class";

static SECTION_HEADER: OnceLock<Regex> = OnceLock::new();
static CHUNK_HEADER: OnceLock<Regex> = OnceLock::new();
static CLASSREF_LINE: OnceLock<Regex> = OnceLock::new();
static METHNAME_REF: OnceLock<Regex> = OnceLock::new();

fn section_header() -> &'static Regex {
    SECTION_HEADER.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*Contents of \(([^,()]+),([^,()]+)\) section[^\n]*$")
            .expect("section header pattern")
    })
}

fn chunk_header() -> &'static Regex {
    CHUNK_HEADER.get_or_init(|| {
        Regex::new(r"^\s*data\s+0x[0-9a-fA-F]+\s+\(struct class_ro_t \*\)(.*)$")
            .expect("class_ro_t header pattern")
    })
}

fn classref_line() -> &'static Regex {
    CLASSREF_LINE.get_or_init(|| {
        Regex::new(r"^\s*[0-9a-fA-F]+\s+0x[0-9a-fA-F]+\s+_OBJC_CLASS_\$_(\S+)")
            .expect("classref pattern")
    })
}

fn methname_ref() -> &'static Regex {
    METHNAME_REF.get_or_init(|| {
        Regex::new(r"__TEXT:__objc_methname:([^\r\n]*)").expect("selref pattern")
    })
}

/// Return the body of the `Contents of (<SEG>,<section>) section` block.
///
/// Any `__DATA*` segment is accepted (`__DATA`, `__DATA_CONST`, `__DATA_DIRTY`).
/// The body runs to the next section header or to the end of the dump.
pub fn section_region<'a>(dump: &'a str, section: &str) -> Option<&'a str> {
    let header = section_header().captures_iter(dump).find(|caps| {
        caps[1].trim().starts_with("__DATA") && caps[2].trim() == section
    })?;
    let start = header.get(0).map(|m| m.end())?;
    let end = section_header()
        .find_at(dump, start)
        .map(|next| next.start())
        .unwrap_or(dump.len());
    Some(&dump[start..end])
}

/// Class names declared in the `__objc_classlist` block.
///
/// A `name` line counts when the next non-blank line is the record's
/// `baseMethods` field; method, ivar and property names never are.
pub fn declared_class_names(dump: &str) -> BTreeSet<String> {
    let Some(region) = section_region(dump, CLASSLIST_SECTION) else {
        debug!("no {CLASSLIST_SECTION} section in dump");
        return BTreeSet::new();
    };

    let mut names = BTreeSet::new();
    let mut lines = region.lines().filter(|l| !l.trim().is_empty()).peekable();
    while let Some(line) = lines.next() {
        let Some(name) = chunk::name_token(line) else {
            continue;
        };
        let before_methods =
            lines.peek().map(|next| next.trim_start().starts_with("baseMethods")).unwrap_or(false);
        if before_methods {
            names.insert(name.to_string());
        }
    }
    names
}

/// Class symbols targeted from the `__objc_classrefs` block.
pub fn referenced_class_names(dump: &str) -> BTreeSet<String> {
    let Some(region) = section_region(dump, CLASSREFS_SECTION) else {
        debug!("no {CLASSREFS_SECTION} section in dump");
        return BTreeSet::new();
    };

    region
        .lines()
        .filter_map(|line| classref_line().captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Selector names referenced from the selector reference section.
///
/// Accepts either the output of `otool -v -s __DATA __objc_selrefs` or a full
/// dump that contains that section; blank entries are skipped.
pub fn referenced_selectors(selrefs: &str) -> BTreeSet<Selector> {
    let region = section_region(selrefs, SELREFS_SECTION).unwrap_or(selrefs);
    methname_ref()
        .captures_iter(region)
        .map(|caps| caps[1].trim().to_string())
        .filter(|sel| !sel.is_empty())
        .collect()
}

/// Every `class_ro_t` record in the dump.
///
/// A record starts at its `data 0x... (struct class_ro_t *)` line and ends
/// before its `baseProtocols` line. A missing terminator closes the record at
/// the next record, the next section header or the end of the dump.
pub fn class_chunks(dump: &str) -> Vec<RawClassChunk<'_>> {
    let mut chunks = Vec::new();
    let mut open: Option<(ChunkFlavor, usize)> = None;
    let mut offset = 0;

    for raw_line in dump.split_inclusive('\n') {
        let line_start = offset;
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(['\n', '\r']);

        if let Some(caps) = chunk_header().captures(line) {
            if let Some((flavor, start)) = open.take() {
                chunks.push(RawClassChunk { flavor, body: &dump[start..line_start] });
            }
            let flavor = if caps[1].trim_start().starts_with(BRIDGED_MARKER) {
                ChunkFlavor::Bridged
            } else {
                ChunkFlavor::Native
            };
            open = Some((flavor, offset));
            continue;
        }

        let trimmed = line.trim_start();
        let closes = trimmed.starts_with("baseProtocols") || trimmed.starts_with("Contents of");
        if closes {
            if let Some((flavor, start)) = open.take() {
                chunks.push(RawClassChunk { flavor, body: &dump[start..line_start] });
            }
        }
    }

    if let Some((flavor, start)) = open {
        chunks.push(RawClassChunk { flavor, body: &dump[start..] });
    }
    chunks
}

/// Run every extraction step over one dump and its selector references.
pub fn extract<'a>(dump: &'a str, selrefs: &str) -> ExtractedMetadata<'a> {
    let (bridged_chunks, native_chunks): (Vec<_>, Vec<_>) =
        class_chunks(dump).into_iter().partition(|c| c.flavor == ChunkFlavor::Bridged);

    let metadata = ExtractedMetadata {
        native_chunks,
        bridged_chunks,
        referenced_selectors: referenced_selectors(selrefs),
        declared_classes: declared_class_names(dump),
        referenced_classes: referenced_class_names(dump),
    };
    debug!(
        native = metadata.native_chunks.len(),
        bridged = metadata.bridged_chunks.len(),
        selrefs = metadata.referenced_selectors.len(),
        declared = metadata.declared_classes.len(),
        classrefs = metadata.referenced_classes.len(),
        "extracted objc metadata"
    );
    metadata
}

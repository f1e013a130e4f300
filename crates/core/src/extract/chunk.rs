//! Parsing of a single `class_ro_t` record into (selector, signature) pairs.
//!
//! Native records carry the owning class inside every method's `imp` symbol:
//!
//! ```text
//!                      name 0x100007e9a ViewController
//!               baseMethods 0x100008080 (struct method_list_t *)
//!                    entsize 24
//!                      count 1
//!                       name 0x100007d3c viewDidLoad
//!                      types 0x100007f2f v16@0:8
//!                        imp 0x1000053a0 -[ViewController viewDidLoad]
//! ```
//!
//! Bridged records only expose the mangled class name followed by bare
//! selector names, so signatures are synthesized from the demangled name.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::model::{ChunkFlavor, ClassChunk, RawClassChunk, SelectorImpl, CXX_DESTRUCT};
use crate::services::demangle::{resolve_class_name, Demangler};

static NAME_LINE: OnceLock<Regex> = OnceLock::new();
static IMP_LINE: OnceLock<Regex> = OnceLock::new();

fn name_line() -> &'static Regex {
    NAME_LINE.get_or_init(|| {
        Regex::new(r"^\s*name\s+0x[0-9a-fA-F]+\s+(\S+)").expect("name line pattern")
    })
}

fn imp_line() -> &'static Regex {
    IMP_LINE.get_or_init(|| {
        Regex::new(r"^\s*imp\s+0x[0-9a-fA-F]+(?:\s+[-+]\[(\S+) ([^\]\s]+)\])?")
            .expect("imp line pattern")
    })
}

/// Token of a `name 0x<addr> <token>` line, if `line` is one.
pub(crate) fn name_token(line: &str) -> Option<&str> {
    name_line().captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// The record's own name: the first `name` line of the chunk.
pub fn class_name(body: &str) -> Option<&str> {
    body.lines().find_map(name_token)
}

/// Lines following the record's class name line.
fn after_class_name(body: &str) -> impl Iterator<Item = &str> {
    body.lines().skip_while(|line| name_token(line).is_none()).skip(1)
}

/// Parse a record without the Swift marker.
///
/// Selector and signature come from the same `imp` line. When the `imp` line
/// has no symbol (stripped binaries, Swift metaclasses) the preceding `name`
/// line and the record's class name are used instead. Class names go through
/// `demangler` like bridged ones. Returns `None` when the record has no class
/// name.
pub fn parse_native_chunk(body: &str, demangler: &dyn Demangler) -> Option<ClassChunk> {
    let class = resolve_class_name(demangler, class_name(body)?);

    let mut methods = Vec::new();
    let mut pending_selector: Option<&str> = None;
    for line in after_class_name(body) {
        if let Some(selector) = name_token(line) {
            pending_selector = Some(selector);
            continue;
        }
        let Some(caps) = imp_line().captures(line) else {
            continue;
        };
        let method = match (caps.get(1), caps.get(2)) {
            (Some(owner), Some(selector)) => {
                SelectorImpl::new(&resolve_class_name(demangler, owner.as_str()), selector.as_str())
            }
            _ => match pending_selector {
                Some(selector) => SelectorImpl::new(&class, selector),
                None => continue,
            },
        };
        pending_selector = None;
        if method.selector != CXX_DESTRUCT {
            methods.push(method);
        }
    }

    Some(ClassChunk { class_name: class, methods })
}

/// Parse a Swift record exposed to the Objective-C runtime.
///
/// The class name goes through `demangler` (raw name kept on failure) and
/// every later `name` token is one of its selectors.
pub fn parse_bridged_chunk(body: &str, demangler: &dyn Demangler) -> Option<ClassChunk> {
    let raw = class_name(body)?;
    let class = resolve_class_name(demangler, raw);

    let methods = after_class_name(body)
        .filter_map(name_token)
        .filter(|selector| *selector != CXX_DESTRUCT)
        .map(|selector| SelectorImpl::new(&class, selector))
        .collect();

    Some(ClassChunk { class_name: class, methods })
}

/// Dispatch on the record's flavor. `None` means the record was skipped.
pub fn parse_chunk(raw: &RawClassChunk<'_>, demangler: &dyn Demangler) -> Option<ClassChunk> {
    let parsed = match raw.flavor {
        ChunkFlavor::Native => parse_native_chunk(raw.body, demangler),
        ChunkFlavor::Bridged => parse_bridged_chunk(raw.body, demangler),
    };
    if parsed.is_none() {
        debug!(flavor = ?raw.flavor, "skipping class record without a name");
    }
    parsed
}

//! Symbol records shared by the extractor, the index builder and the analyzer.
//!
//! Everything here is built fresh for one analysis run and dropped afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Method name used for dynamic dispatch, e.g. `tableView:didSelectRowAtIndexPath:`.
///
/// Compared by exact, case-sensitive string equality.
pub type Selector = String;

/// Human-readable name of one concrete implementation: `[<ClassName> <Selector>]`.
pub type ImplementationSignature = String;

/// Demangled class identifier (or the raw mangled token when demangling failed).
pub type ClassName = String;

/// Compiler-generated ivar teardown hook; never a meaningful used/unused signal.
pub const CXX_DESTRUCT: &str = ".cxx_destruct";

/// Render the canonical implementation signature for `class_name` and `selector`.
pub fn signature(class_name: &str, selector: &str) -> ImplementationSignature {
    format!("[{class_name} {selector}]")
}

/// One (selector, implementation signature) pair parsed out of a class chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectorImpl {
    pub selector: Selector,
    pub signature: ImplementationSignature,
}

impl SelectorImpl {
    pub fn new(class_name: &str, selector: impl Into<Selector>) -> Self {
        let selector = selector.into();
        let signature = signature(class_name, &selector);
        Self { selector, signature }
    }
}

/// Where a class record originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkFlavor {
    /// Objective-C class; method entries carry `-[Class selector]` symbols.
    Native,
    /// Swift class exposed to the Objective-C runtime; only bare selector names.
    Bridged,
}

/// Unparsed text of one `class_ro_t` record, tagged with its flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawClassChunk<'a> {
    pub flavor: ChunkFlavor,
    pub body: &'a str,
}

/// Parsed metadata for exactly one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassChunk {
    pub class_name: ClassName,
    pub methods: Vec<SelectorImpl>,
}

/// Selector -> every implementation signature seen for it across all classes.
///
/// A selector missing from the index was never implemented in the binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationIndex {
    entries: BTreeMap<Selector, BTreeSet<ImplementationSignature>>,
}

impl ImplementationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one implementation; duplicates collapse.
    pub fn insert(
        &mut self,
        selector: impl Into<Selector>,
        signature: impl Into<ImplementationSignature>,
    ) -> &mut Self {
        self.entries.entry(selector.into()).or_default().insert(signature.into());
        self
    }

    /// Index built from already parsed chunks.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = ClassChunk>,
    {
        let mut index = Self::new();
        for chunk in chunks {
            index.extend_chunk(chunk);
        }
        index
    }

    /// Fold every method of a parsed chunk into the index.
    pub fn extend_chunk(&mut self, chunk: ClassChunk) -> &mut Self {
        for method in chunk.methods {
            self.insert(method.selector, method.signature);
        }
        self
    }

    /// Merge another index into this one (set union per selector).
    pub fn merge(&mut self, other: ImplementationIndex) -> &mut Self {
        for (selector, signatures) in other.entries {
            self.entries.entry(selector).or_default().extend(signatures);
        }
        self
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.entries.contains_key(selector)
    }

    /// Implemented selectors in ascending order.
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.entries.keys()
    }

    pub fn signatures(&self, selector: &str) -> Option<&BTreeSet<ImplementationSignature>> {
        self.entries.get(selector)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Selector, &BTreeSet<ImplementationSignature>)> {
        self.entries.iter()
    }

    /// Number of distinct selectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the extractor pulls out of one dump.
///
/// Class tokens are kept exactly as the dump spells them; the analyzer
/// demangles them.
#[derive(Debug, Clone, Default)]
pub struct ExtractedMetadata<'a> {
    pub native_chunks: Vec<RawClassChunk<'a>>,
    pub bridged_chunks: Vec<RawClassChunk<'a>>,
    pub referenced_selectors: BTreeSet<Selector>,
    pub declared_classes: BTreeSet<String>,
    pub referenced_classes: BTreeSet<String>,
}

impl ExtractedMetadata<'_> {
    /// True when the dump carried no Objective-C metadata at all.
    pub fn is_empty(&self) -> bool {
        self.native_chunks.is_empty()
            && self.bridged_chunks.is_empty()
            && self.referenced_selectors.is_empty()
            && self.declared_classes.is_empty()
            && self.referenced_classes.is_empty()
    }
}

/// The two sorted result lists handed to report rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedReport {
    pub unused_classes: Vec<ClassName>,
    pub unused_methods: Vec<ImplementationSignature>,
}

impl UnusedReport {
    pub fn is_empty(&self) -> bool {
        self.unused_classes.is_empty() && self.unused_methods.is_empty()
    }
}

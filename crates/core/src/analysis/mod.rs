//! Reachability analysis over the extracted metadata.
//!
//! - [`unused_classes`]: declared classes that no class reference targets.
//! - [`unused_methods`]: implementations whose selector is never referenced
//!   and not whitelisted.
//! - [`Analyzer`]: the whole pipeline from dump text to an [`UnusedReport`].

pub mod index;

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::extract;
use crate::model::{ImplementationIndex, Selector, UnusedReport};
use crate::services::demangle::{resolve_class_name, Demangler};

pub use index::{build_index, index_chunks};

/// `declared - referenced`, sorted ascending.
pub fn unused_classes(declared: &BTreeSet<String>, referenced: &BTreeSet<String>) -> Vec<String> {
    // BTreeSet iteration is already ascending.
    declared.difference(referenced).cloned().collect()
}

/// Every signature of every implemented selector that is neither whitelisted
/// nor referenced, sorted ascending.
///
/// The whitelist shrinks the candidate pool; it never touches the referenced
/// set, so a whitelisted selector cannot become "unused".
pub fn unused_methods(
    index: &ImplementationIndex,
    referenced: &BTreeSet<Selector>,
    whitelist: &BTreeSet<Selector>,
) -> Vec<String> {
    let mut unused: Vec<String> = index
        .iter()
        .filter(|(selector, _)| !whitelist.contains(*selector))
        .filter(|(selector, _)| !referenced.contains(*selector))
        .flat_map(|(_, signatures)| signatures.iter().cloned())
        .collect();
    unused.sort();
    unused
}

/// Runs extraction, chunk parsing, indexing and reachability for one dump.
pub struct Analyzer<'a> {
    pub demangler: &'a dyn Demangler,
    pub whitelist: BTreeSet<Selector>,
    /// Parse class records on the rayon pool when the `parallel` feature is on.
    pub parallel: bool,
}

impl<'a> Analyzer<'a> {
    pub fn new(demangler: &'a dyn Demangler) -> Self {
        Self { demangler, whitelist: BTreeSet::new(), parallel: false }
    }

    pub fn with_whitelist<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        self.whitelist.extend(selectors.into_iter().map(Into::into));
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build the implementation index for every class record in `dump`.
    pub fn implementation_index(&self, dump: &str) -> ImplementationIndex {
        let metadata = extract::extract(dump, "");
        let mut index = self.index_records(&metadata.native_chunks);
        index.merge(self.index_records(&metadata.bridged_chunks));
        index
    }

    /// Analyze a metadata dump and its selector references.
    ///
    /// Blank `selrefs` means the dump itself is searched for selector
    /// references, since `otool -oV` prints `__objc_selrefs` too.
    pub fn analyze(&self, dump: &str, selrefs: &str) -> UnusedReport {
        let selrefs = if selrefs.trim().is_empty() {
            debug!("no selector reference text given, scanning the metadata dump");
            dump
        } else {
            selrefs
        };
        let metadata = extract::extract(dump, selrefs);
        if metadata.is_empty() {
            info!("dump contains no Objective-C metadata");
            return UnusedReport::default();
        }

        let mut index = self.index_records(&metadata.native_chunks);
        index.merge(self.index_records(&metadata.bridged_chunks));
        debug!(selectors = index.len(), "built implementation index");

        // Both sides go through the same demangler so equal tokens stay equal.
        let declared = self.demangle_all(&metadata.declared_classes);
        let referenced = self.demangle_all(&metadata.referenced_classes);

        let report = UnusedReport {
            unused_classes: unused_classes(&declared, &referenced),
            unused_methods: unused_methods(
                &index,
                &metadata.referenced_selectors,
                &self.whitelist,
            ),
        };
        info!(
            classes = report.unused_classes.len(),
            methods = report.unused_methods.len(),
            "reachability analysis finished"
        );
        report
    }

    fn demangle_all(&self, names: &BTreeSet<String>) -> BTreeSet<String> {
        names.iter().map(|raw| resolve_class_name(self.demangler, raw)).collect()
    }

    #[cfg(feature = "parallel")]
    fn index_records(&self, raw: &[crate::model::RawClassChunk<'_>]) -> ImplementationIndex {
        if self.parallel {
            index::index_chunks_parallel(raw, self.demangler)
        } else {
            index_chunks(raw, self.demangler)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn index_records(&self, raw: &[crate::model::RawClassChunk<'_>]) -> ImplementationIndex {
        index_chunks(raw, self.demangler)
    }
}

//! Folding parsed class chunks into one [`ImplementationIndex`].

use crate::extract::parse_chunk;
use crate::model::{ClassChunk, ImplementationIndex, RawClassChunk};
use crate::services::demangle::Demangler;

/// Group every (selector, signature) pair by selector, deduplicating signatures.
pub fn build_index<I>(chunks: I) -> ImplementationIndex
where
    I: IntoIterator<Item = ClassChunk>,
{
    ImplementationIndex::from_chunks(chunks)
}

/// Parse raw records one after another and fold them into an index.
pub fn index_chunks(raw: &[RawClassChunk<'_>], demangler: &dyn Demangler) -> ImplementationIndex {
    build_index(raw.iter().filter_map(|chunk| parse_chunk(chunk, demangler)))
}

/// Parse raw records on the rayon pool, then fold the finished chunks.
///
/// Records are independent and the fold is a set union, so the result equals
/// [`index_chunks`].
#[cfg(feature = "parallel")]
pub fn index_chunks_parallel(
    raw: &[RawClassChunk<'_>],
    demangler: &dyn Demangler,
) -> ImplementationIndex {
    use rayon::prelude::*;

    let parsed: Vec<ClassChunk> =
        raw.par_iter().filter_map(|chunk| parse_chunk(chunk, demangler)).collect();
    build_index(parsed)
}

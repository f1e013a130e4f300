//! Adapters for the external collaborators of the analysis.
//!
//! - [`provider`]: obtains the metadata dump and selector references (otool).
//! - [`demangle`]: turns Swift-mangled class names into readable ones.
//! - [`macho`]: checks that an input path really is a Mach-O image.

pub mod demangle;
pub mod macho;
pub mod provider;

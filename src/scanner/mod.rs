//! Locate asset references inside HTML and CSS text without building a document tree.
//!
//! Filtering of non-local values and the reference iterator itself live in separate
//! submodules so each can be tested on its own.

mod filters;
mod references;

pub use filters::should_skip_reference;
pub use references::{AssetReference, ReferenceKind, References, scan};

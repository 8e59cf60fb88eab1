//! Canonical property data.
//!
//! Manifest and job spec documents carry arbitrarily shaped YAML. Everything
//! is converted into [`PropertyValue`] / [`PropertyTree`] at the document
//! boundary so that merging, dotted-path lookup, rendering and serialization
//! all work on uniformly string-keyed trees.

mod normalize;
mod tree;
mod value;

pub use normalize::normalize;
pub use tree::PropertyTree;
pub use value::{scalar_text, PropertyValue};

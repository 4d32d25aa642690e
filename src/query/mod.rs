//! Query-by-example compilation and rendering.
//!
//! An attribute map doubles as a search example: every populated field is a
//! constraint, every absent field a wildcard. [`compile`] turns one example
//! into a boolean query tree, [`compile_any`] OR-combines several examples,
//! and [`render`] serializes the tree into the store's query syntax inside a
//! namespace scope.

pub mod compiler;
pub mod node;

// Re-export commonly used types
pub use compiler::{compile, compile_any, render};
pub use node::QueryNode;

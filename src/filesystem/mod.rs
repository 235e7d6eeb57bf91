//! In-memory namespace mirrored onto a real directory tree.
//!
//! Nodes live in an arena ([`NodeTree`]) and refer to each other by handle.
//! [`Namespace`] couples that arena with a cursor and a base directory and keeps
//! the two trees in agreement on every mutation.

mod boilerplate;
mod error;
mod namespace;
mod node;
mod path;
mod tree;

pub use error::NamespaceError;
pub use namespace::Namespace;
pub use node::{NodeId, NodeKind};
pub use tree::{NodeTree, validate_name};

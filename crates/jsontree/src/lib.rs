//! # jsontree
//!
//! A dynamically-typed JSON document tree with path-based navigation and a
//! resumable incremental parser.
//!
//! Documents are trees of [`Node`] values. Objects keep their keys in
//! insertion order, and every node exclusively owns its children. Locations
//! inside a tree are addressed by [`Path`] expressions such as `users/*/name`
//! or `tags/#`, which drive four operations: `find`, `for_each`, `update`,
//! and `remove`.
//!
//! ## Quick start
//!
//! ```rust
//! use jsontree::{node, parse, Node};
//!
//! let mut doc = parse(r#"{"a": 1, "b": {"c": 2}}"#).unwrap();
//! assert_eq!(doc.find("b/c"), node!(2));
//!
//! // Missing structure is materialized on insert.
//! doc.update("e/#", 5, true).unwrap();
//! assert_eq!(doc.to_string(), r#"{"a":1,"b":{"c":2},"e":[5]}"#);
//!
//! // Guarded removal: the predicate sees the root and the concrete path.
//! doc.remove_if("*", |root, at| root.find(at).is::<i64>()).unwrap();
//! assert_eq!(doc, node!({"b": {"c": 2}, "e": [5]}));
//! # let _: Node = doc;
//! ```
//!
//! ## Streaming input
//!
//! ```rust
//! use jsontree::Parser;
//!
//! let mut parser = Parser::new();
//! for chunk in ["[tr", "ue, nu", "ll]"] {
//!     parser.feed(chunk).unwrap();
//! }
//! let doc = parser.finish().unwrap();
//! assert_eq!(doc.to_string(), "[true,null]");
//! ```
//!
//! ## Modules
//!
//! - [`node`]: the `Node` tagged union and typed access
//! - [`array`] / [`object`]: the owning containers
//! - [`path`]: path expressions and segments
//! - [`navigate`]: `find`, `for_each`, `update`, `remove`
//! - [`parser`]: chunk-resumable parser with position tracking
//! - [`format`]: compact and pretty JSON output
//! - [`error`]: error types

pub mod array;
pub mod error;
pub mod format;
mod interop;
pub mod navigate;
pub mod node;
pub mod object;
pub mod parser;
pub mod path;

pub use array::Array;
pub use error::{Error, ParseError, Result};
pub use format::{to_string, write_json, FormatOptions};
pub use node::{Kind, Node, Payload};
pub use object::Object;
pub use parser::{parse, Parser, Position, State};
pub use path::{Path, Segment};

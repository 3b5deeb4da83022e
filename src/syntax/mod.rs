//! Tree model: the read-only view consumers walk
//!
//! - [`Module`] - the root plus errors, line index and cached name index
//! - [`Node`] - leaves, branches and error nodes with positions
//! - [`UsedNames`] - identifier text to the leaves spelling it

mod names;
mod node;
mod tree;

pub use names::UsedNames;
pub use node::{Branch, ErrorNode, Leaf, Node, NodeClass};
pub use tree::Module;

pub use crate::base::{Position, Span};
pub use crate::parser::{ClassDef, Decorated, FuncDef, Scope};

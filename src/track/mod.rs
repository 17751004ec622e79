//! Node dispatch.
//!
//! A track is a chain of nodes, each evaluated from its upstream outputs.
//! [`NodeKind`] closes over the builder kinds so callers never match on type
//! names themselves.

mod dispatch;

pub use dispatch::{NodeInputs, NodeKind, NodeOutput};

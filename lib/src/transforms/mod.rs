//!
//! Library of transforms over compiled computations.
//!
//! Every transform checks its structural preconditions against the declared types,
//! computes a new type with congruent bindings, and returns a new computation. The
//! inputs are never modified. Transforms that only reshape the interface share the
//! input's graph buffer; the ones in `graph` ask a `GraphEngine` for a new graph.
//!
mod graph;
mod pipeline;
mod select;
mod tuple;

pub use graph::*;
pub use pipeline::*;
pub use select::*;
pub use tuple::*;

//!
//! Structural surgery on compiled computations.
//!
//! A compiled computation pairs a function type with an opaque graph and with
//! bindings that map the graph's named resources onto the parameter and result types.
//! The transforms in this crate rewrite the declared interface of such a unit
//! (projecting, wrapping, renaming, concatenating, composing) without running or
//! recompiling the graph.
//!
//! Layers, leaves first:
//!  - `types`: structural types, their text notation and wire form
//!  - `structure`, `value`: ordered optionally-named containers and runtime values
//!  - `binding`: where the data of a type lives inside a graph
//!  - `computation`: the compiled unit itself
//!  - `transforms`: the transform library
//!  - `engine`: traits the external execution engine implements
//!
pub mod binding;
pub mod computation;
pub mod engine;
pub mod error;
pub mod selector;
pub mod structure;
pub mod transforms;
pub mod types;
pub mod utils;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use binding::{Binding, ResourceId};
pub use computation::{CompiledComputation, GraphDef};
pub use error::{Error, Result};
pub use selector::Selector;
pub use structure::Structure;
pub use types::{DType, FunctionType, TensorShape, Type};
pub use value::Value;

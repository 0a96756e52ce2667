//!
//! Interfaces of the graph-execution engine, which lives outside this crate.
//!
//! The transform layer never runs or parses a graph. Transforms that only narrow or
//! reshape bindings pass the graph through untouched; the few that must change what
//! runs (concatenation, composition, identity) ask a `GraphEngine` for the new graph.
//!
use crate::binding::ResourceId;
use crate::computation::{CompiledComputation, GraphDef};
use crate::error::Result;
use crate::value::Value;

/// A graph to import under `scope`. Once imported, its resource `r` is reachable
/// as `r.scoped(scope)`.
#[derive(Debug, Clone)]
pub struct ScopedGraph<'a> {
  pub scope: String,
  pub graph: &'a GraphDef,
  pub initialize_op: Option<&'a ResourceId>,
}

/// A graph produced by the engine, with the op that initializes it, if any.
#[derive(Debug, Clone)]
pub struct BuiltGraph {
  pub graph: GraphDef,
  pub initialize_op: Option<ResourceId>,
}

/// One connection from a produced resource to a placeholder it replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
  pub from: ResourceId,
  pub to: ResourceId,
}

pub trait GraphEngine {
  /// Imports `graphs` side by side. The returned initialize op, if any, must run
  /// the initialize ops of all components.
  fn merge(&self, graphs: &[ScopedGraph<'_>]) -> Result<BuiltGraph>;

  /// Imports `first` and `second`, then replaces every placeholder `to` of `second`
  /// with the resource `from` of `first`. Names in `wiring` are already scoped.
  fn chain(
    &self,
    first: ScopedGraph<'_>,
    second: ScopedGraph<'_>,
    wiring: &[Wire],
  ) -> Result<BuiltGraph>;

  /// A fresh graph with one placeholder per `from` and an identity of it at `to`.
  fn identity(&self, wiring: &[Wire]) -> Result<BuiltGraph>;
}

/// Runs compiled computations. Implemented by the execution engine; the transform
/// layer only consumes it.
pub trait Executor {
  fn invoke(&self, comp: &CompiledComputation, arg: &Value) -> Result<Value>;

  /// Converts a native container first, see `Value::from_native`.
  fn invoke_native(&self, comp: &CompiledComputation, arg: &serde_json::Value) -> Result<Value> {
    self.invoke(comp, &Value::from_native(arg)?)
  }
}

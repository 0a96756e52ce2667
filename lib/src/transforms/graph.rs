//!
//! Transforms that need a new graph. The graph surgery itself is delegated to a
//! `GraphEngine`; here we only compute the new type and the bindings into the
//! engine's output, using its scoping convention for resource names.
//!
use tracing::{debug, instrument};

use crate::binding::Binding;
use crate::computation::CompiledComputation;
use crate::engine::{GraphEngine, ScopedGraph, Wire};
use crate::error::{Error, Result};
use crate::structure::Structure;
use crate::types::{FunctionType, Type};

fn scoped<'a>(comp: &'a CompiledComputation, scope: &str) -> ScopedGraph<'a> {
  ScopedGraph {
    scope: scope.to_string(),
    graph: comp.graph(),
    initialize_op: comp.initialize_op(),
  }
}

fn rescope(b: &Binding, scope: &str) -> Binding {
  b.map_resources(&|id| id.scoped(scope))
}

///
/// Runs several computations side by side as one.
///
/// For inputs `(name_i, f_i: (T_i -> U_i))` the output has type
/// `(<name_0=T_0, ...> -> <name_0=U_0, ...>)`: element `i` of the argument feeds `f_i`
/// and element `i` of the result is what `f_i` returned.
///
#[instrument(level = "debug", skip_all, fields(n = comps.len()))]
pub fn concatenate(
  engine: &dyn GraphEngine,
  comps: &[(Option<String>, &CompiledComputation)],
) -> Result<CompiledComputation> {
  if comps.is_empty() {
    return Err(Error::Type("nothing to concatenate".to_string()));
  }
  let scopes: Vec<String> = (0..comps.len()).map(|i| format!("concat_{}", i)).collect();
  let built = engine.merge(
    &comps
      .iter()
      .zip(&scopes)
      .map(|((_, c), s)| scoped(c, s))
      .collect::<Vec<_>>(),
  )?;

  let parameter_type = Structure::new(
    comps
      .iter()
      .map(|(n, c)| (n.clone(), c.parameter_type().clone()))
      .collect(),
  )?;
  let result_type = Structure::new(
    comps
      .iter()
      .map(|(n, c)| (n.clone(), c.result_type().clone()))
      .collect(),
  )?;
  let parameter = comps
    .iter()
    .zip(&scopes)
    .map(|((_, c), s)| rescope(c.parameter_binding(), s))
    .collect();
  let result = comps
    .iter()
    .zip(&scopes)
    .map(|((_, c), s)| rescope(c.result_binding(), s))
    .collect();

  let out = CompiledComputation::new(
    FunctionType::new(Type::Tuple(parameter_type), Type::Tuple(result_type)),
    built.graph,
    Binding::Tuple(parameter),
    Binding::Tuple(result),
    built.initialize_op,
  )?;
  debug!("concatenated into '{}'", out.type_signature());
  Ok(out)
}

///
/// Chains two computations: the result has type `(T -> V)` for `inner: (T -> U)` and
/// `outer: (U -> V)`, and runs `inner` first, feeding its result to `outer`.
/// The types must agree exactly, names included.
///
#[instrument(level = "debug", skip_all)]
pub fn compose(
  engine: &dyn GraphEngine,
  outer: &CompiledComputation,
  inner: &CompiledComputation,
) -> Result<CompiledComputation> {
  if inner.result_type() != outer.parameter_type() {
    return Err(Error::Type(format!(
      "cannot compose '{}' after '{}': '{}' is not '{}'",
      outer.type_signature(),
      inner.type_signature(),
      inner.result_type(),
      outer.parameter_type()
    )));
  }
  let (inner_scope, outer_scope) = ("inner", "outer");
  // equal types and congruent bindings give leaf lists of equal length, in the same order
  let wiring: Vec<Wire> = inner
    .result_binding()
    .leaves()
    .into_iter()
    .zip(outer.parameter_binding().leaves())
    .map(|(from, to)| Wire {
      from: from.scoped(inner_scope),
      to: to.scoped(outer_scope),
    })
    .collect();
  let built = engine.chain(
    scoped(inner, inner_scope),
    scoped(outer, outer_scope),
    &wiring,
  )?;
  let out = CompiledComputation::new(
    FunctionType::new(inner.parameter_type().clone(), outer.result_type().clone()),
    built.graph,
    rescope(inner.parameter_binding(), inner_scope),
    rescope(outer.result_binding(), outer_scope),
    built.initialize_op,
  )?;
  debug!("composed into '{}'", out.type_signature());
  Ok(out)
}

/// The computation `x -> x` on values of type `t`.
#[instrument(level = "debug", skip(engine))]
pub fn identity(engine: &dyn GraphEngine, t: &Type) -> Result<CompiledComputation> {
  let parameter = Binding::fresh_for(t, "identity_arg")?;
  let result = Binding::fresh_for(t, "identity_out")?;
  let wiring: Vec<Wire> = parameter
    .leaves()
    .into_iter()
    .zip(result.leaves())
    .map(|(from, to)| Wire {
      from: from.clone(),
      to: to.clone(),
    })
    .collect();
  let built = engine.identity(&wiring)?;
  CompiledComputation::new(
    FunctionType::new(t.clone(), t.clone()),
    built.graph,
    parameter,
    result,
    built.initialize_op,
  )
}

use tracing::{debug, instrument};

use crate::binding::Binding;
use crate::computation::CompiledComputation;
use crate::error::{Error, Result};
use crate::selector::Selector;
use crate::structure::Structure;
use crate::types::Type;

fn tuple_result<'c>(comp: &'c CompiledComputation, what: &str) -> Result<&'c Structure<Type>> {
  comp.result_type().as_tuple().ok_or_else(|| {
    Error::Type(format!(
      "result is not a tuple: cannot {} from a computation of type '{}' (result binding is {})",
      what,
      comp.type_signature(),
      comp.result_binding().kind()
    ))
  })
}

///
/// Narrows a computation returning a tuple to one that returns only the member picked
/// by `selector`.
///
/// Given `comp: (T -> <U, ..., V>)`, the result has type `(T -> W)` where `W` is the
/// selected member. Names resolve against the declared result type. The graph,
/// parameter binding and initialize op are shared with `comp` unchanged; only the
/// result binding is narrowed, so nothing about what the graph computes changes.
///
#[instrument(level = "debug", skip_all, fields(selector = %selector))]
pub fn select_output(selector: &Selector, comp: &CompiledComputation) -> Result<CompiledComputation> {
  tuple_result(comp, &format!("select {}", selector))?;
  let (result, result_type) = comp
    .result_binding()
    .project(selector, comp.result_type())
    .map_err(|e| e.within(comp.result_type()))?;
  let selected = comp.with_result(result_type, result)?;
  debug!(
    "'{}' narrowed to '{}'",
    comp.type_signature(),
    selected.type_signature()
  );
  Ok(selected)
}

/// Like `select_output` for several members at once: the result becomes a tuple of the
/// selected members, in selector order, keeping their names.
#[instrument(level = "debug", skip(comp))]
pub fn select_outputs(
  selectors: &[Selector],
  comp: &CompiledComputation,
) -> Result<CompiledComputation> {
  let members = tuple_result(comp, "select outputs")?;
  let mut types = vec![];
  let mut bindings = vec![];
  for selector in selectors {
    let (b, t) = comp
      .result_binding()
      .project(selector, comp.result_type())
      .map_err(|e| e.within(comp.result_type()))?;
    let name = members.name_at(selector.resolve(members)?).map(str::to_string);
    types.push((name, t));
    bindings.push(b);
  }
  let selected = comp.with_result(Type::Tuple(Structure::new(types)?), Binding::Tuple(bindings))?;
  debug!(
    "'{}' narrowed to '{}'",
    comp.type_signature(),
    selected.type_signature()
  );
  Ok(selected)
}

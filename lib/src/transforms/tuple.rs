//!
//! Transforms that reshape the tuple structure of a computation's interface
//! without touching its graph.
//!
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::binding::Binding;
use crate::computation::CompiledComputation;
use crate::error::{Error, Result};
use crate::structure::Structure;
use crate::types::Type;

fn wrap(t: &Type, b: &Binding, name: Option<&str>) -> (Type, Binding) {
  (
    Type::Tuple(Structure::from_iter([(name.map(str::to_string), t.clone())])),
    Binding::Tuple(vec![b.clone()]),
  )
}

/// `(T -> U)` becomes `(T -> <name=U>)`.
#[instrument(level = "debug", skip(comp))]
pub fn bind_result_as_tuple(
  comp: &CompiledComputation,
  name: Option<&str>,
) -> Result<CompiledComputation> {
  let (t, b) = wrap(comp.result_type(), comp.result_binding(), name);
  let wrapped = comp.with_result(t, b)?;
  debug!("result wrapped: '{}'", wrapped.type_signature());
  Ok(wrapped)
}

/// `(T -> U)` becomes `(<name=T> -> U)`.
#[instrument(level = "debug", skip(comp))]
pub fn bind_parameter_as_tuple(
  comp: &CompiledComputation,
  name: Option<&str>,
) -> Result<CompiledComputation> {
  let (t, b) = wrap(comp.parameter_type(), comp.parameter_binding(), name);
  let wrapped = comp.with_parameter(t, b)?;
  debug!("parameter wrapped: '{}'", wrapped.type_signature());
  Ok(wrapped)
}

/// Replaces the element names of a tuple result. `None` drops a name.
#[instrument(level = "debug", skip(comp))]
pub fn rename_result(
  comp: &CompiledComputation,
  names: &[Option<String>],
) -> Result<CompiledComputation> {
  let members = comp.result_type().as_tuple().ok_or_else(|| {
    Error::Type(format!(
      "result is not a tuple: cannot rename the elements of '{}'",
      comp.result_type()
    ))
  })?;
  if names.len() != members.len() {
    return Err(Error::Type(format!(
      "{} names given for result '{}' of {} elements",
      names.len(),
      comp.result_type(),
      members.len()
    )));
  }
  let renamed = Structure::new(
    names
      .iter()
      .cloned()
      .zip(members.values().cloned())
      .collect(),
  )?;
  let out = comp.with_result(Type::Tuple(renamed), comp.result_binding().clone())?;
  debug!(
    "'{}' renamed to '{}'",
    comp.result_type(),
    out.result_type()
  );
  Ok(out)
}

/// Reorders a tuple result: element `k` of the new result is element `order[k]` of the old one.
#[instrument(level = "debug", skip(comp))]
pub fn permute_result(comp: &CompiledComputation, order: &[usize]) -> Result<CompiledComputation> {
  let (members, bindings) = match (comp.result_type(), comp.result_binding()) {
    (Type::Tuple(ts), Binding::Tuple(bs)) => (ts, bs),
    (t, _) => {
      return Err(Error::Type(format!(
        "result is not a tuple: cannot permute '{}'",
        t
      )))
    }
  };
  let is_permutation =
    order.len() == members.len() && order.iter().sorted().copied().eq(0..members.len());
  if !is_permutation {
    return Err(Error::Type(format!(
      "{:?} is not a permutation of the {} elements of '{}'",
      order,
      members.len(),
      comp.result_type()
    )));
  }
  let elements = members.clone().into_elements();
  let permuted: Structure<Type> = order.iter().map(|&i| elements[i].clone()).collect();
  let binding = Binding::Tuple(order.iter().map(|&i| bindings[i].clone()).collect());
  let out = comp.with_result(Type::Tuple(permuted), binding)?;
  debug!(
    "'{}' permuted to '{}'",
    comp.result_type(),
    out.result_type()
  );
  Ok(out)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::{bind_parameter_as_tuple, bind_result_as_tuple, permute_result, rename_result};
  use crate::engine::Executor;
  use crate::error::Error;
  use crate::testing::{identity_comp, ReferenceEngine};
  use crate::types::Type;
  use crate::value::Value;

  fn t(s: &str) -> Type {
    s.parse().unwrap()
  }

  #[test]
  fn test_bind_result_as_tuple() -> Result<(), Error> {
    let engine = ReferenceEngine::default();
    let comp = identity_comp("int32");
    let wrapped = bind_result_as_tuple(&comp, Some("out"))?;
    assert_eq!(*wrapped.result_type(), t("<out=int32>"));
    assert!(wrapped.graph().ptr_eq(comp.graph()));
    assert_eq!(
      engine.invoke_native(&wrapped, &json!(7))?,
      Value::from_native(&json!({"out": 7}))?
    );
    let unnamed = bind_result_as_tuple(&comp, None)?;
    assert_eq!(*unnamed.result_type(), t("<int32>"));
    Ok(())
  }

  #[test]
  fn test_bind_parameter_as_tuple() -> Result<(), Error> {
    let engine = ReferenceEngine::default();
    let comp = identity_comp("<a=int32,b=float32>");
    let wrapped = bind_parameter_as_tuple(&comp, Some("p"))?;
    assert_eq!(
      wrapped.type_signature().to_string(),
      "(<p=<a=int32,b=float32>> -> <a=int32,b=float32>)"
    );
    assert_eq!(
      engine.invoke_native(&wrapped, &json!({"p": {"a": 1, "b": 0.5}}))?,
      Value::from_native(&json!({"a": 1, "b": 0.5}))?
    );
    Ok(())
  }

  #[test]
  fn test_rename_result() -> Result<(), Error> {
    let comp = identity_comp("<a=int32,float32>");
    let renamed = rename_result(&comp, &[None, Some("z".to_string())])?;
    assert_eq!(*renamed.result_type(), t("<int32,z=float32>"));
    assert_eq!(renamed.result_binding(), comp.result_binding());

    assert!(matches!(
      rename_result(&comp, &[Some("q".to_string())]),
      Err(Error::Type(_))
    ));
    assert!(matches!(
      rename_result(&comp, &[Some("q".to_string()), Some("q".to_string())]),
      Err(Error::Lookup(_))
    ));
    assert!(matches!(
      rename_result(&identity_comp("bool"), &[]),
      Err(Error::Type(_))
    ));
    Ok(())
  }

  #[test]
  fn test_permute_result() -> Result<(), Error> {
    let engine = ReferenceEngine::default();
    let comp = identity_comp("<a=int32,b=float32,c=bool>");
    let permuted = permute_result(&comp, &[2, 0, 1])?;
    assert_eq!(*permuted.result_type(), t("<c=bool,a=int32,b=float32>"));
    assert_eq!(
      engine.invoke_native(&permuted, &json!([1, 2.0, false]))?,
      Value::from_native(&json!({"c": false, "a": 1, "b": 2.0}))?
    );
    for bad in [&[0, 1][..], &[0, 0, 1], &[0, 1, 3]] {
      assert!(matches!(permute_result(&comp, bad), Err(Error::Type(_))));
    }
    Ok(())
  }
}

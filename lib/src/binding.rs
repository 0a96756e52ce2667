//!
//! Bindings say where the data of a structural type lives inside an opaque graph.
//!
//! A binding mirrors the shape of its type one to one: every tensor leaf of the type
//! is bound to a single named resource, and every tuple of the type to a tuple
//! binding of the same length, in the same order. Names live only on the type.
//!
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::selector::Selector;
use crate::structure::Structure;
use crate::types::{DType, Type};
use crate::value::Value;

/// Name of a resource (tensor or op) inside a graph, e.g. `"Identity:0"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl ResourceId {
  pub fn new<S: Into<String>>(name: S) -> Self {
    ResourceId(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The name this resource gets once its graph is imported under `scope`.
  pub fn scoped(&self, scope: &str) -> ResourceId {
    ResourceId(format!("{}/{}", scope, self.0))
  }
}

impl fmt::Display for ResourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
  Single(ResourceId),
  Tuple(Vec<Binding>),
}

impl Binding {
  pub fn single<S: Into<String>>(name: S) -> Self {
    Binding::Single(ResourceId::new(name))
  }

  /// A binding congruent with `t` whose leaves are named `{prefix}_{k}:0`, numbered depth first.
  pub fn fresh_for(t: &Type, prefix: &str) -> Result<Binding> {
    fn go(t: &Type, prefix: &str, counter: &mut usize) -> Result<Binding> {
      match t {
        Type::Scalar { .. } => {
          let b = Binding::single(format!("{}_{}:0", prefix, counter));
          *counter += 1;
          Ok(b)
        }
        Type::Tuple(ts) => Ok(Binding::Tuple(
          ts.values()
            .map(|t| go(t, prefix, counter))
            .collect::<Result<_>>()?,
        )),
        Type::Function(_) => Err(Error::Type(format!(
          "function type '{}' cannot be bound to graph resources",
          t
        ))),
      }
    }
    go(t, prefix, &mut 0)
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Binding::Single(_) => "single",
      Binding::Tuple(_) => "tuple",
    }
  }

  /// Structural congruence with `t`: same nesting, same tuple lengths,
  /// a single resource for every tensor leaf. Function types are never bound.
  pub fn shape_matches(&self, t: &Type) -> bool {
    match (self, t) {
      (Binding::Single(_), Type::Scalar { .. }) => true,
      (Binding::Tuple(bs), Type::Tuple(ts)) => {
        bs.len() == ts.len() && bs.iter().zip(ts.values()).all(|(b, t)| b.shape_matches(t))
      }
      _ => false,
    }
  }

  /// Like `shape_matches`, but reports the mismatch as an invariant violation.
  pub fn check_congruent(&self, t: &Type, what: &str) -> Result<()> {
    if self.shape_matches(t) {
      Ok(())
    } else {
      Err(Error::Invariant(format!(
        "{} binding {} does not match declared type '{}'",
        what, self, t
      )))
    }
  }

  /// Sub-binding and sub-type selected out of a tuple binding/type pair.
  ///
  /// The selector resolves against the type, which carries the names; the
  /// binding is then indexed by the same position.
  pub fn project(&self, selector: &Selector, t: &Type) -> Result<(Binding, Type)> {
    let bindings = match self {
      Binding::Tuple(bs) => bs,
      Binding::Single(id) => {
        return Err(Error::Structure(format!(
          "cannot select {} from single binding {}",
          selector, id
        )))
      }
    };
    let types = t.as_tuple().ok_or_else(|| {
      Error::Invariant(format!(
        "tuple binding {} is declared with non-tuple type '{}'",
        self, t
      ))
    })?;
    let i = selector.resolve(types)?;
    let sub_binding = bindings.get(i).ok_or_else(|| {
      Error::Invariant(format!(
        "binding {} has no element {} although type '{}' does",
        self, i, t
      ))
    })?;
    Ok((sub_binding.clone(), types.element_at(i)?.clone()))
  }

  /// Leaf resources, depth first.
  pub fn leaves(&self) -> Vec<&ResourceId> {
    match self {
      Binding::Single(id) => vec![id],
      Binding::Tuple(bs) => bs.iter().flat_map(Binding::leaves).collect(),
    }
  }

  ///
  /// Pairs every leaf resource with the component of `value` it receives, where `t`
  /// is the type this binding is declared with.
  ///
  /// Named elements of `t` are looked up by name when `value` carries names, so a
  /// mapping may list its keys in any order. Unnamed elements, and every element
  /// of a positional `value`, go by position.
  ///
  pub fn feed(&self, t: &Type, value: &Value) -> Result<Vec<(ResourceId, Value)>> {
    self.check_congruent(t, "fed")?;
    let mut fed = vec![];
    self.feed_into(t, value, &mut fed)?;
    Ok(fed)
  }

  fn feed_into(&self, t: &Type, value: &Value, fed: &mut Vec<(ResourceId, Value)>) -> Result<()> {
    match (self, t, value) {
      (Binding::Single(id), Type::Scalar { .. }, Value::Tuple(_)) => Err(Error::Structure(format!(
        "cannot feed a tuple value into '{}' resource {}",
        t, id
      ))),
      (Binding::Single(id), Type::Scalar { dtype, .. }, v) => {
        if !admits(*dtype, v) {
          return Err(Error::Type(format!(
            "{:?} is not a {} value for resource {}",
            v, dtype, id
          )));
        }
        fed.push((id.clone(), v.clone()));
        Ok(())
      }
      (Binding::Tuple(bs), Type::Tuple(ts), Value::Tuple(vs)) => {
        if vs.len() != ts.len() {
          return Err(Error::Structure(format!(
            "cannot feed a tuple of {} elements into '{}'",
            vs.len(),
            t
          )));
        }
        for (i, (b, (name, element_type))) in bs.iter().zip(ts.iter()).enumerate() {
          let v = match name {
            Some(name) if !vs.is_unnamed() => vs.element_by_name(name).map_err(|_| {
              Error::Lookup(format!(
                "value has no element '{}' required by '{}'",
                name, t
              ))
            })?,
            Some(_) => vs.element_at(i)?,
            None => match vs.name_at(i) {
              Some(extra) => {
                return Err(Error::Lookup(format!(
                  "element {} of '{}' is unnamed, but the value names it '{}'",
                  i, t, extra
                )))
              }
              None => vs.element_at(i)?,
            },
          };
          b.feed_into(element_type, v, fed)?;
        }
        Ok(())
      }
      (Binding::Tuple(_), Type::Tuple(_), v) => Err(Error::Structure(format!(
        "cannot feed {:?} into '{}'",
        v, t
      ))),
      _ => Err(Error::Invariant(format!(
        "binding {} does not match declared type '{}'",
        self, t
      ))),
    }
  }

  /// Builds a value shaped like `t`, reading each leaf resource through `fetch`.
  pub fn assemble<F>(&self, t: &Type, fetch: &mut F) -> Result<Value>
  where
    F: FnMut(&ResourceId) -> Result<Value>,
  {
    match (self, t) {
      (Binding::Single(id), Type::Scalar { .. }) => fetch(id),
      (Binding::Tuple(bs), Type::Tuple(ts)) if bs.len() == ts.len() => {
        let elements = bs
          .iter()
          .zip(ts.iter())
          .map(|(b, (name, t))| Ok((name.map(str::to_string), b.assemble(t, fetch)?)))
          .collect::<Result<Vec<_>>>()?;
        Ok(Value::Tuple(Structure::new(elements)?))
      }
      _ => Err(Error::Invariant(format!(
        "binding {} does not match declared type '{}'",
        self, t
      ))),
    }
  }

  pub fn map_resources(&self, f: &impl Fn(&ResourceId) -> ResourceId) -> Binding {
    match self {
      Binding::Single(id) => Binding::Single(f(id)),
      Binding::Tuple(bs) => Binding::Tuple(bs.iter().map(|b| b.map_resources(f)).collect()),
    }
  }
}

/// Whether a leaf value can be fed to a tensor of `dtype`.
fn admits(dtype: DType, v: &Value) -> bool {
  match (dtype, v) {
    (DType::Bool, Value::Bool(_)) => true,
    (DType::Int32, Value::Int(i)) => i32::try_from(*i).is_ok(),
    (DType::Int64, Value::Int(_)) => true,
    (DType::Float32 | DType::Float64, Value::Int(_) | Value::Float(_)) => true,
    (DType::String, Value::Str(_)) => true,
    _ => false,
  }
}

impl fmt::Display for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Binding::Single(id) => write!(f, "{}", id),
      Binding::Tuple(bs) => write!(f, "[{}]", bs.iter().join(", ")),
    }
  }
}

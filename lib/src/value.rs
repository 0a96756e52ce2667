use serde::{Deserialize, Serialize};
use serde_json::{Map, Number};

use crate::error::{Error, Result};
use crate::structure::Structure;

/// Runtime value flowing in or out of a compiled computation.
/// Tuples are structural, so results can be compared against `from_native` containers directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  Tuple(Structure<Value>),
}

impl Value {
  /// Converts a native JSON container.
  /// Arrays become unnamed tuples, objects become named tuples in insertion order.
  pub fn from_native(native: &serde_json::Value) -> Result<Value> {
    use serde_json::Value as J;
    Ok(match native {
      J::Null => {
        return Err(Error::Structure(
          "null has no structural value".to_string(),
        ))
      }
      J::Bool(b) => Value::Bool(*b),
      J::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
        (Some(i), _, _) => Value::Int(i),
        (None, Some(u), _) => {
          return Err(Error::Structure(format!(
            "integer {} does not fit in 64 signed bits",
            u
          )))
        }
        (None, None, Some(x)) => Value::Float(x),
        (None, None, None) => {
          return Err(Error::Structure(format!("number {} has no structural value", n)))
        }
      },
      J::String(s) => Value::Str(s.clone()),
      J::Array(items) => Value::Tuple(Structure::unnamed(
        items.iter().map(Value::from_native).collect::<Result<_>>()?,
      )),
      J::Object(fields) => Value::Tuple(Structure::named(
        fields
          .iter()
          .map(|(k, v)| Ok((k.clone(), Value::from_native(v)?)))
          .collect::<Result<Vec<_>>>()?,
      )?),
    })
  }

  /// Inverse of `from_native`. Tuples that mix named and unnamed elements have
  /// no native container and are rejected.
  pub fn to_native(&self) -> Result<serde_json::Value> {
    use serde_json::Value as J;
    Ok(match self {
      Value::Bool(b) => J::Bool(*b),
      Value::Int(i) => J::Number((*i).into()),
      Value::Float(x) => J::Number(Number::from_f64(*x).ok_or_else(|| {
        Error::Structure(format!("{} has no JSON representation", x))
      })?),
      Value::Str(s) => J::String(s.clone()),
      Value::Tuple(elements) if elements.is_unnamed() => J::Array(
        elements
          .values()
          .map(Value::to_native)
          .collect::<Result<_>>()?,
      ),
      Value::Tuple(elements) if elements.is_fully_named() => {
        let mut fields = Map::new();
        for (name, v) in elements.iter() {
          fields.insert(name.unwrap_or_default().to_string(), v.to_native()?);
        }
        J::Object(fields)
      }
      Value::Tuple(_) => {
        return Err(Error::Structure(
          "a tuple mixing named and unnamed elements has no native form".to_string(),
        ))
      }
    })
  }

  pub fn as_tuple(&self) -> Option<&Structure<Value>> {
    match self {
      Value::Tuple(s) => Some(s),
      _ => None,
    }
  }

  pub fn element_at(&self, index: usize) -> Result<&Value> {
    self
      .as_tuple()
      .ok_or_else(|| Error::Structure("cannot index into a non-tuple value".to_string()))?
      .element_at(index)
  }

  pub fn element_by_name(&self, name: &str) -> Result<&Value> {
    self
      .as_tuple()
      .ok_or_else(|| Error::Structure("cannot look up a name in a non-tuple value".to_string()))?
      .element_by_name(name)
  }
}

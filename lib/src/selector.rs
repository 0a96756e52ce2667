use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::structure::Structure;

/// Picks one member out of a tuple, by position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selector {
  Index(u32),
  Name(String),
}

impl Selector {
  /// Accepts a JSON integer or string. Anything else (null, floats, negative
  /// numbers, containers) is not a selector.
  pub fn from_native(native: &serde_json::Value) -> Result<Selector> {
    use serde_json::Value as J;
    match native {
      J::Number(n) => n
        .as_u64()
        .and_then(|i| u32::try_from(i).ok())
        .map(Selector::Index)
        .ok_or_else(|| Error::Type(format!("invalid selector kind: {}", native))),
      J::String(s) => Ok(Selector::Name(s.clone())),
      other => Err(Error::Type(format!("invalid selector kind: {}", other))),
    }
  }

  /// Position of the selected element in `elements`.
  pub fn resolve<T>(&self, elements: &Structure<T>) -> Result<usize> {
    match self {
      Selector::Index(i) => {
        let i = *i as usize;
        if i < elements.len() {
          Ok(i)
        } else {
          Err(Error::IndexOutOfRange {
            index: i,
            len: elements.len(),
            within: None,
          })
        }
      }
      Selector::Name(name) => elements.index_of_name(name),
    }
  }
}

impl fmt::Display for Selector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Selector::Index(i) => write!(f, "{}", i),
      Selector::Name(n) => write!(f, "'{}'", n),
    }
  }
}

impl FromStr for Selector {
  type Err = Error;

  /// All digits is an index, anything else non-empty is a name.
  fn from_str(s: &str) -> Result<Selector> {
    if s.is_empty() {
      return Err(Error::Type("invalid selector kind: empty".to_string()));
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
      s.parse::<u32>()
        .map(Selector::Index)
        .map_err(|e| Error::Type(format!("invalid selector kind: {} ({})", s, e)))
    } else {
      Ok(Selector::Name(s.to_string()))
    }
  }
}

impl From<u32> for Selector {
  fn from(i: u32) -> Self {
    Selector::Index(i)
  }
}

impl From<&str> for Selector {
  fn from(name: &str) -> Self {
    Selector::Name(name.to_string())
  }
}

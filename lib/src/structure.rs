use itertools::Itertools;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Ordered container with optional per-element names.
///
/// Position is always significant: index lookups go by position whether or not
/// the elements are named. Names, where present, are unique within one structure.
///
/// The same container describes the nesting of tuple types and holds runtime
/// tuple values, so that both can be walked in lockstep.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Structure<T> {
  elements: Vec<(Option<String>, T)>,
}

impl<T> Structure<T> {
  /// Builds a structure, rejecting duplicate names.
  pub fn new(elements: Vec<(Option<String>, T)>) -> Result<Self> {
    if let Some(dup) = elements
      .iter()
      .filter_map(|(name, _)| name.as_deref())
      .duplicates()
      .next()
    {
      return Err(Error::Lookup(format!("duplicate element name '{}'", dup)));
    }
    Ok(Structure { elements })
  }

  pub fn unnamed(values: Vec<T>) -> Self {
    Structure {
      elements: values.into_iter().map(|v| (None, v)).collect(),
    }
  }

  pub fn named<S: Into<String>>(elements: Vec<(S, T)>) -> Result<Self> {
    Self::new(
      elements
        .into_iter()
        .map(|(name, v)| (Some(name.into()), v))
        .collect(),
    )
  }

  pub fn empty() -> Self {
    Structure { elements: vec![] }
  }

  pub fn len(&self) -> usize {
    self.elements.len()
  }

  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  pub fn element_at(&self, index: usize) -> Result<&T> {
    self
      .elements
      .get(index)
      .map(|(_, v)| v)
      .ok_or(Error::IndexOutOfRange {
        index,
        len: self.len(),
        within: None,
      })
  }

  pub fn element_by_name(&self, name: &str) -> Result<&T> {
    let i = self.index_of_name(name)?;
    Ok(&self.elements[i].1)
  }

  /// Position of the element called `name`.
  /// Fails when no element, or more than one element, carries the name.
  pub fn index_of_name(&self, name: &str) -> Result<usize> {
    let hits: Vec<usize> = self
      .elements
      .iter()
      .positions(|(n, _)| n.as_deref() == Some(name))
      .collect();
    match hits.as_slice() {
      [i] => Ok(*i),
      [] => Err(Error::Lookup(format!(
        "name '{}' not found among [{}]",
        name,
        self.describe_names()
      ))),
      _ => Err(Error::Lookup(format!(
        "name '{}' is ambiguous, it appears {} times",
        name,
        hits.len()
      ))),
    }
  }

  pub fn name_at(&self, index: usize) -> Option<&str> {
    self.elements.get(index).and_then(|(n, _)| n.as_deref())
  }

  pub fn names(&self) -> impl Iterator<Item = Option<&str>> {
    self.elements.iter().map(|(n, _)| n.as_deref())
  }

  pub fn values(&self) -> impl Iterator<Item = &T> {
    self.elements.iter().map(|(_, v)| v)
  }

  pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &T)> {
    self.elements.iter().map(|(n, v)| (n.as_deref(), v))
  }

  pub fn is_fully_named(&self) -> bool {
    self.elements.iter().all(|(n, _)| n.is_some())
  }

  pub fn is_unnamed(&self) -> bool {
    self.elements.iter().all(|(n, _)| n.is_none())
  }

  pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Structure<U> {
    Structure {
      elements: self
        .elements
        .iter()
        .map(|(n, v)| (n.clone(), f(v)))
        .collect(),
    }
  }

  pub fn try_map<U>(&self, mut f: impl FnMut(&T) -> Result<U>) -> Result<Structure<U>> {
    let elements = self
      .elements
      .iter()
      .map(|(n, v)| Ok((n.clone(), f(v)?)))
      .collect::<Result<Vec<_>>>()?;
    Ok(Structure { elements })
  }

  pub fn into_elements(self) -> Vec<(Option<String>, T)> {
    self.elements
  }

  fn describe_names(&self) -> String {
    self.names().map(|n| n.unwrap_or("_")).join(", ")
  }
}

impl<T> FromIterator<(Option<String>, T)> for Structure<T> {
  /// Collects without the duplicate-name check; callers that accept untrusted
  /// names go through `Structure::new`.
  fn from_iter<I: IntoIterator<Item = (Option<String>, T)>>(iter: I) -> Self {
    Structure {
      elements: iter.into_iter().collect(),
    }
  }
}

impl<T> Default for Structure<T> {
  fn default() -> Self {
    Self::empty()
  }
}

// Serialized as a plain list of `[name, element]` pairs.
impl<T: Serialize> Serialize for Structure<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    self.elements.serialize(serializer)
  }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Structure<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let elements = Vec::<(Option<String>, T)>::deserialize(deserializer)?;
    Structure::new(elements).map_err(de::Error::custom)
  }
}

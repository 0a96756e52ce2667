//!
//! Structural types describing the data that flows in and out of a compiled computation.
//!
//! A type is a tree: tensor leaves (`Scalar`), tuples with optional element names,
//! and functions from a parameter type to a result type. Equality is structural.
//!
mod parse;
pub mod serialization;

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::structure::Structure;

pub use serialization::{deserialize_type, serialize_type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
  Bool,
  Int32,
  Int64,
  Float32,
  Float64,
  String,
}

impl DType {
  pub const ALL: [DType; 6] = [
    DType::Bool,
    DType::Int32,
    DType::Int64,
    DType::Float32,
    DType::Float64,
    DType::String,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      DType::Bool => "bool",
      DType::Int32 => "int32",
      DType::Int64 => "int64",
      DType::Float32 => "float32",
      DType::Float64 => "float64",
      DType::String => "string",
    }
  }

  pub fn from_name(name: &str) -> Option<DType> {
    DType::ALL.iter().copied().find(|d| d.name() == name)
  }
}

impl fmt::Display for DType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Dimensions of a tensor; `None` marks a dimension unknown at compile time.
/// Rank 0 is a true scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TensorShape(pub Vec<Option<u64>>);

impl TensorShape {
  pub fn scalar() -> Self {
    TensorShape(vec![])
  }

  pub fn rank(&self) -> usize {
    self.0.len()
  }
}

impl fmt::Display for TensorShape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.is_empty() {
      return Ok(());
    }
    let dims = self
      .0
      .iter()
      .map(|d| d.map_or("?".to_string(), |n| n.to_string()))
      .join(",");
    write!(f, "[{}]", dims)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
  Scalar { dtype: DType, shape: TensorShape },
  Tuple(Structure<Type>),
  Function(FunctionType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
  pub parameter: Box<Type>,
  pub result: Box<Type>,
}

impl FunctionType {
  pub fn new(parameter: Type, result: Type) -> Self {
    FunctionType {
      parameter: Box::new(parameter),
      result: Box::new(result),
    }
  }
}

impl Type {
  /// Rank-0 tensor of the given dtype.
  pub fn scalar(dtype: DType) -> Self {
    Type::Scalar {
      dtype,
      shape: TensorShape::scalar(),
    }
  }

  pub fn tensor(dtype: DType, dims: Vec<Option<u64>>) -> Self {
    Type::Scalar {
      dtype,
      shape: TensorShape(dims),
    }
  }

  pub fn tuple(elements: Structure<Type>) -> Self {
    Type::Tuple(elements)
  }

  pub fn unnamed_tuple(elements: Vec<Type>) -> Self {
    Type::Tuple(Structure::unnamed(elements))
  }

  pub fn named_tuple<S: Into<String>>(elements: Vec<(S, Type)>) -> Result<Self> {
    Ok(Type::Tuple(Structure::named(elements)?))
  }

  pub fn function(parameter: Type, result: Type) -> Self {
    Type::Function(FunctionType::new(parameter, result))
  }

  pub fn is_tuple(&self) -> bool {
    matches!(self, Type::Tuple(_))
  }

  pub fn as_tuple(&self) -> Option<&Structure<Type>> {
    match self {
      Type::Tuple(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_function(&self) -> Option<&FunctionType> {
    match self {
      Type::Function(f) => Some(f),
      _ => None,
    }
  }

  /// Short name of the variant, used in diagnostics.
  pub fn kind(&self) -> &'static str {
    match self {
      Type::Scalar { .. } => "scalar",
      Type::Tuple(_) => "tuple",
      Type::Function(_) => "function",
    }
  }

  fn expect_tuple(&self) -> Result<&Structure<Type>> {
    self.as_tuple().ok_or_else(|| {
      Error::Type(format!(
        "expected a tuple type, found {} '{}'",
        self.kind(),
        self
      ))
    })
  }

  /// Number of tuple elements.
  pub fn len(&self) -> Result<usize> {
    Ok(self.expect_tuple()?.len())
  }

  pub fn element_at(&self, index: usize) -> Result<&Type> {
    self.expect_tuple()?.element_at(index)
  }

  pub fn element_by_name(&self, name: &str) -> Result<&Type> {
    self.expect_tuple()?.element_by_name(name)
  }

  pub fn index_of_name(&self, name: &str) -> Result<usize> {
    self.expect_tuple()?.index_of_name(name)
  }
}

impl fmt::Display for FunctionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({} -> {})", self.parameter, self.result)
  }
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Type::Scalar { dtype, shape } => write!(f, "{}{}", dtype, shape),
      Type::Tuple(elements) => {
        let inner = elements
          .iter()
          .map(|(name, t)| match name {
            Some(n) => format!("{}={}", n, t),
            None => t.to_string(),
          })
          .join(",");
        write!(f, "<{}>", inner)
      }
      Type::Function(func) => write!(f, "{}", func),
    }
  }
}

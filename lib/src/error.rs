use thiserror::Error;

use crate::types::Type;

/// Errors raised by the structural checks of the transform layer.
///
/// None of these are transient: the same input always yields the same error,
/// so nothing here is worth retrying.
#[derive(Debug, Error)]
pub enum Error {
  /// Wrong structural kind, e.g. selecting from a result that is not a tuple.
  #[error("type error: {0}")]
  Type(String),

  /// A name that does not resolve, or resolves to more than one element.
  #[error("lookup error: {0}")]
  Lookup(String),

  /// `within` is the tuple type in notation, when the caller knows it.
  #[error("index {index} out of range for tuple{} of length {len}", quoted(.within))]
  IndexOutOfRange {
    index: usize,
    len: usize,
    within: Option<String>,
  },

  /// The wire form of a type could not be decoded.
  #[error("malformed type: {0}")]
  MalformedType(String),

  /// A binding does not mirror its declared type. This is an upstream compiler
  /// bug and is never coerced away.
  #[error("invariant violated: {0}")]
  Invariant(String),

  /// A structural operation applied to the wrong kind of binding or value.
  #[error("structure error: {0}")]
  Structure(String),

  /// Reported by an external graph engine primitive.
  #[error("graph engine error: {0}")]
  Engine(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("YAML error: {0}")]
  Yaml(#[from] serde_yaml::Error),

  /// Step `index` of a pipeline failed.
  #[error("pipeline step {index} ({transform}) failed: {source}")]
  Step {
    index: usize,
    transform: &'static str,
    source: Box<Error>,
  },
}

impl Error {
  /// Adds the tuple type a lookup was made in to lookup and index errors.
  pub fn within(self, t: &Type) -> Error {
    match self {
      Error::Lookup(msg) => Error::Lookup(format!("{} in '{}'", msg, t)),
      Error::IndexOutOfRange { index, len, .. } => Error::IndexOutOfRange {
        index,
        len,
        within: Some(t.to_string()),
      },
      other => other,
    }
  }
}

fn quoted(within: &Option<String>) -> String {
  within
    .as_ref()
    .map(|t| format!(" '{}'", t))
    .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;

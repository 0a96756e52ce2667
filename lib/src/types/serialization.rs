//!
//! Wire form of structural types.
//!
//! The encoding is self-describing JSON, one externally tagged object per variant:
//!
//! ```text
//! {"scalar": {"dtype": "int32", "shape": [2, null]}}
//! {"tuple": [["a", <type>], [null, <type>]]}
//! {"function": {"parameter": <type>, "result": <type>}}
//! ```
//!
use tracing::trace;

use crate::error::{Error, Result};

use super::Type;

pub fn serialize_type(t: &Type) -> Result<Vec<u8>> {
  let bytes = serde_json::to_vec(t)?;
  trace!("serialized '{}' into {} bytes", t, bytes.len());
  Ok(bytes)
}

/// Decodes a type. Tuples with repeated element names are rejected while decoding.
pub fn deserialize_type(bytes: &[u8]) -> Result<Type> {
  serde_json::from_slice(bytes).map_err(|e| Error::MalformedType(e.to_string()))
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::{deserialize_type, serialize_type};
  use crate::error::Error;
  use crate::structure::Structure;
  use crate::types::{DType, Type};

  fn arb_type() -> impl Strategy<Value = Type> {
    let leaf = (
      prop::sample::select(DType::ALL.to_vec()),
      prop::collection::vec(prop::option::of(0..8u64), 0..3),
    )
      .prop_map(|(dtype, dims)| Type::tensor(dtype, dims));
    leaf.prop_recursive(3, 24, 4, |inner| {
      prop_oneof![
        prop::collection::vec((prop::bool::ANY, inner.clone()), 0..4).prop_map(|elems| {
          Type::tuple(
            elems
              .into_iter()
              .enumerate()
              .map(|(i, (named, t))| (named.then(|| format!("e{}", i)), t))
              .collect::<Structure<Type>>(),
          )
        }),
        (inner.clone(), inner).prop_map(|(p, r)| Type::function(p, r)),
      ]
    })
  }

  #[test]
  fn test_wire_form_is_tagged() {
    let t: Type = "<a=int32[2]>".parse().unwrap();
    let bytes = serialize_type(&t).unwrap();
    assert_eq!(
      String::from_utf8(bytes).unwrap(),
      r#"{"tuple":[["a",{"scalar":{"dtype":"int32","shape":[2]}}]]}"#
    );
  }

  #[test]
  fn test_malformed_bytes() {
    for bytes in [
      &b"not json"[..],
      br#"{"scalar":{"dtype":"int31","shape":[]}}"#,
      br#"{"tuple":[["a",{"scalar":{"dtype":"bool","shape":[]}}],["a",{"scalar":{"dtype":"bool","shape":[]}}]]}"#,
      br#"{"function":{"parameter":{"tuple":[]}}}"#,
    ] {
      assert!(matches!(
        deserialize_type(bytes),
        Err(Error::MalformedType(_))
      ));
    }
  }

  proptest! {
    #[test]
    fn test_serialization_round_trips(t in arb_type()) {
      let bytes = serialize_type(&t).unwrap();
      prop_assert_eq!(deserialize_type(&bytes).unwrap(), t.clone());
      // the text notation agrees with the wire form
      prop_assert_eq!(t.to_string().parse::<Type>().unwrap(), t);
    }
  }
}

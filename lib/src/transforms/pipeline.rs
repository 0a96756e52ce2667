use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::computation::CompiledComputation;
use crate::error::{Error, Result};
use crate::selector::Selector;

/// The single-input transforms, as data. Used to describe a sequence of
/// rewrites in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transform", rename_all = "snake_case")]
pub enum Transform {
  SelectOutput {
    output: Selector,
  },
  SelectOutputs {
    outputs: Vec<Selector>,
  },
  BindResultAsTuple {
    #[serde(default)]
    name: Option<String>,
  },
  BindParameterAsTuple {
    #[serde(default)]
    name: Option<String>,
  },
  RenameResult {
    names: Vec<Option<String>>,
  },
  PermuteResult {
    order: Vec<usize>,
  },
}

impl Transform {
  /// The tag this transform has in a pipeline file.
  pub fn name(&self) -> &'static str {
    match self {
      Transform::SelectOutput { .. } => "select_output",
      Transform::SelectOutputs { .. } => "select_outputs",
      Transform::BindResultAsTuple { .. } => "bind_result_as_tuple",
      Transform::BindParameterAsTuple { .. } => "bind_parameter_as_tuple",
      Transform::RenameResult { .. } => "rename_result",
      Transform::PermuteResult { .. } => "permute_result",
    }
  }

  pub fn apply(&self, comp: &CompiledComputation) -> Result<CompiledComputation> {
    match self {
      Transform::SelectOutput { output } => super::select_output(output, comp),
      Transform::SelectOutputs { outputs } => super::select_outputs(outputs, comp),
      Transform::BindResultAsTuple { name } => super::bind_result_as_tuple(comp, name.as_deref()),
      Transform::BindParameterAsTuple { name } => {
        super::bind_parameter_as_tuple(comp, name.as_deref())
      }
      Transform::RenameResult { names } => super::rename_result(comp, names),
      Transform::PermuteResult { order } => super::permute_result(comp, order),
    }
  }
}

/// Transforms applied in order, each to the output of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline(pub Vec<Transform>);

impl Pipeline {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn then(mut self, t: Transform) -> Self {
    self.0.push(t);
    self
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Stops at the first failing step, returning its error wrapped in `Error::Step`.
  #[instrument(level = "debug", skip_all, fields(steps = self.0.len()))]
  pub fn apply(&self, comp: &CompiledComputation) -> Result<CompiledComputation> {
    let mut current = comp.clone();
    for (i, t) in self.0.iter().enumerate() {
      current = t.apply(&current).map_err(|e| {
        warn!("step {} ({:?}) failed: {}", i, t, e);
        Error::Step {
          index: i,
          transform: t.name(),
          source: Box::new(e),
        }
      })?;
    }
    info!(
      "applied {} transforms: '{}' -> '{}'",
      self.0.len(),
      comp.type_signature(),
      current.type_signature()
    );
    Ok(current)
  }
}

impl From<Vec<Transform>> for Pipeline {
  fn from(steps: Vec<Transform>) -> Self {
    Pipeline(steps)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::{Pipeline, Transform};
  use crate::engine::Executor;
  use crate::error::Error;
  use crate::selector::Selector;
  use crate::testing::{identity_comp, ReferenceEngine};
  use crate::transforms::{bind_result_as_tuple, select_output};
  use crate::value::Value;

  const YAML: &str = r#"
- transform: select_output
  output: x
- transform: permute_result
  order: [1, 0]
- transform: rename_result
  names: [first, ~]
- transform: bind_result_as_tuple
  name: wrapped
"#;

  #[test]
  fn test_pipeline_from_yaml() -> Result<(), Error> {
    let pipeline: Pipeline = serde_yaml::from_str(YAML)?;
    assert_eq!(pipeline.len(), 4);
    assert_eq!(
      pipeline.0[0],
      Transform::SelectOutput {
        output: Selector::from("x")
      }
    );

    let engine = ReferenceEngine::default();
    let comp = identity_comp("<x=<a=int32,b=float32>,y=bool>");
    let out = pipeline.apply(&comp)?;
    assert_eq!(
      out.result_type().to_string(),
      "<wrapped=<first=float32,int32>>"
    );
    assert!(out.graph().ptr_eq(comp.graph()));
    let v = engine.invoke_native(&out, &json!({"x": {"a": 1, "b": 2.0}, "y": true}))?;
    assert_eq!(
      v.element_by_name("wrapped")?.element_by_name("first")?,
      &Value::Float(2.0)
    );
    Ok(())
  }

  #[test]
  fn test_pipeline_matches_direct_calls() -> Result<(), Error> {
    let comp = identity_comp("<a=int32,b=<c=bool>>");
    let pipeline = Pipeline::new()
      .then(Transform::SelectOutput {
        output: Selector::Index(1),
      })
      .then(Transform::BindResultAsTuple { name: None });
    let direct = bind_result_as_tuple(&select_output(&Selector::Index(1), &comp)?, None)?;
    assert_eq!(pipeline.apply(&comp)?, direct);
    Ok(())
  }

  #[test]
  fn test_pipeline_stops_at_first_error() {
    let comp = identity_comp("<a=int32>");
    let pipeline = Pipeline::from(vec![
      Transform::SelectOutput {
        output: Selector::from("a"),
      },
      Transform::SelectOutput {
        output: Selector::Index(0),
      },
    ]);
    match pipeline.apply(&comp) {
      Err(Error::Step {
        index: 1,
        transform: "select_output",
        source,
      }) => assert!(matches!(*source, Error::Type(_))),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn test_numeric_selector_in_yaml() {
    let t: Transform = serde_yaml::from_str("transform: select_output\noutput: 3").unwrap();
    assert_eq!(
      t,
      Transform::SelectOutput {
        output: Selector::Index(3)
      }
    );
  }

  #[test]
  fn test_name_is_the_serde_tag() {
    for t in [
      Transform::SelectOutputs { outputs: vec![] },
      Transform::BindParameterAsTuple { name: None },
      Transform::RenameResult { names: vec![] },
      Transform::PermuteResult { order: vec![0] },
    ] {
      assert_eq!(serde_json::to_value(&t).unwrap()["transform"], t.name());
    }
  }
}

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::binding::{Binding, ResourceId};
use crate::error::{Error, Result};
use crate::types::{serialize_type, FunctionType, Type};

/// Opaque serialized graph. The transform layer never looks inside; it only
/// passes the buffer along, so clones share one allocation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphDef(Arc<[u8]>);

impl GraphDef {
  pub fn new(bytes: Vec<u8>) -> Self {
    GraphDef(bytes.into())
  }

  pub fn bytes(&self) -> &[u8] {
    &self.0
  }

  /// True when both handles refer to the same buffer, not merely equal bytes.
  pub fn ptr_eq(&self, other: &GraphDef) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for GraphDef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "GraphDef({} bytes)", self.0.len())
  }
}

///
/// A compiled computation: a function type, the opaque graph implementing it,
/// and the bindings from the parameter and result types onto graph resources.
///
/// Construction checks that both bindings mirror their types; a value of this type
/// is therefore always congruent. Nothing mutates it afterwards: every transform
/// builds a new one, sharing the graph buffer where it can.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ComputationRepr", into = "ComputationRepr")]
pub struct CompiledComputation {
  type_signature: FunctionType,
  graph: GraphDef,
  parameter: Binding,
  result: Binding,
  initialize_op: Option<ResourceId>,
}

impl CompiledComputation {
  pub fn new(
    type_signature: FunctionType,
    graph: GraphDef,
    parameter: Binding,
    result: Binding,
    initialize_op: Option<ResourceId>,
  ) -> Result<Self> {
    parameter.check_congruent(&type_signature.parameter, "parameter")?;
    result.check_congruent(&type_signature.result, "result")?;
    Ok(CompiledComputation {
      type_signature,
      graph,
      parameter,
      result,
      initialize_op,
    })
  }

  pub fn type_signature(&self) -> &FunctionType {
    &self.type_signature
  }

  pub fn parameter_type(&self) -> &Type {
    &self.type_signature.parameter
  }

  pub fn result_type(&self) -> &Type {
    &self.type_signature.result
  }

  pub fn graph(&self) -> &GraphDef {
    &self.graph
  }

  pub fn parameter_binding(&self) -> &Binding {
    &self.parameter
  }

  pub fn result_binding(&self) -> &Binding {
    &self.result
  }

  pub fn initialize_op(&self) -> Option<&ResourceId> {
    self.initialize_op.as_ref()
  }

  /// Wire form of the function type.
  pub fn serialized_type(&self) -> Result<Vec<u8>> {
    serialize_type(&Type::Function(self.type_signature.clone()))
  }

  /// Same graph, parameter and initialize op; new result type and binding.
  pub(crate) fn with_result(&self, result_type: Type, result: Binding) -> Result<Self> {
    CompiledComputation::new(
      FunctionType::new((*self.type_signature.parameter).clone(), result_type),
      self.graph.clone(),
      self.parameter.clone(),
      result,
      self.initialize_op.clone(),
    )
  }

  /// Same graph, result and initialize op; new parameter type and binding.
  pub(crate) fn with_parameter(&self, parameter_type: Type, parameter: Binding) -> Result<Self> {
    CompiledComputation::new(
      FunctionType::new(parameter_type, (*self.type_signature.result).clone()),
      self.graph.clone(),
      parameter,
      self.result.clone(),
      self.initialize_op.clone(),
    )
  }
}

impl fmt::Display for CompiledComputation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "type:       {}", self.type_signature)?;
    writeln!(f, "parameter:  {}", self.parameter)?;
    writeln!(f, "result:     {}", self.result)?;
    match &self.initialize_op {
      Some(op) => writeln!(f, "initialize: {}", op)?,
      None => writeln!(f, "initialize: -")?,
    }
    write!(f, "graph:      {} bytes", self.graph.bytes().len())
  }
}

/// On-disk layout. Loading goes back through `CompiledComputation::new`, so a
/// file with an incongruent binding never yields a value.
#[derive(Serialize, Deserialize)]
struct ComputationRepr {
  #[serde(rename = "type")]
  type_signature: Type,
  graph_def: GraphDef,
  parameter: Binding,
  result: Binding,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  initialize_op: Option<ResourceId>,
}

impl TryFrom<ComputationRepr> for CompiledComputation {
  type Error = Error;

  fn try_from(repr: ComputationRepr) -> Result<Self> {
    let type_signature = match repr.type_signature {
      Type::Function(f) => f,
      other => {
        return Err(Error::Type(format!(
          "a compiled computation needs a function type, found '{}'",
          other
        )))
      }
    };
    CompiledComputation::new(
      type_signature,
      repr.graph_def,
      repr.parameter,
      repr.result,
      repr.initialize_op,
    )
  }
}

impl From<CompiledComputation> for ComputationRepr {
  fn from(comp: CompiledComputation) -> Self {
    ComputationRepr {
      type_signature: Type::Function(comp.type_signature),
      graph_def: comp.graph,
      parameter: comp.parameter,
      result: comp.result,
      initialize_op: comp.initialize_op,
    }
  }
}

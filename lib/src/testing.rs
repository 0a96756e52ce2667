//!
//! A toy execution engine for tests.
//!
//! Its graphs are JSON maps from resource names to nodes that are placeholders,
//! constants, identities of other resources, or no-ops grouping other ops. That is
//! just enough to run identity-like computations and check what transforms do to them.
//!
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::binding::{Binding, ResourceId};
use crate::computation::{CompiledComputation, GraphDef};
use crate::engine::{BuiltGraph, Executor, GraphEngine, ScopedGraph, Wire};
use crate::error::{Error, Result};
use crate::types::{FunctionType, Type};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
  Placeholder,
  Const(Value),
  Identity(String),
  NoOp(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasGraph {
  pub nodes: BTreeMap<String, Node>,
}

impl AliasGraph {
  pub fn decode(graph: &GraphDef) -> Result<AliasGraph> {
    Ok(serde_json::from_slice(graph.bytes())?)
  }

  pub fn encode(&self) -> GraphDef {
    GraphDef::new(serde_json::to_vec(self).unwrap())
  }

  fn scoped(&self, scope: &str) -> AliasGraph {
    let s = |name: &String| ResourceId::new(name.as_str()).scoped(scope).0;
    AliasGraph {
      nodes: self
        .nodes
        .iter()
        .map(|(k, node)| {
          let node = match node {
            Node::Identity(x) => Node::Identity(s(x)),
            Node::NoOp(xs) => Node::NoOp(xs.iter().map(s).collect()),
            other => other.clone(),
          };
          (s(k), node)
        })
        .collect(),
    }
  }

  fn insert_all(&mut self, other: AliasGraph) -> Result<()> {
    for (k, v) in other.nodes {
      if self.nodes.insert(k.clone(), v).is_some() {
        return Err(Error::Engine(format!("resource {} defined twice", k)));
      }
    }
    Ok(())
  }

  fn eval(&self, name: &str, feeds: &HashMap<ResourceId, Value>) -> Result<Value> {
    match self.nodes.get(name) {
      Some(Node::Placeholder) => feeds
        .get(&ResourceId::new(name))
        .cloned()
        .ok_or_else(|| Error::Engine(format!("placeholder {} was not fed", name))),
      Some(Node::Const(v)) => Ok(v.clone()),
      Some(Node::Identity(x)) => self.eval(x, feeds),
      Some(Node::NoOp(_)) => Err(Error::Engine(format!("{} produces no value", name))),
      None => Err(Error::Engine(format!("no resource named {}", name))),
    }
  }
}

/// Counts initialize ops it runs, so tests can check they are carried along.
#[derive(Debug, Default)]
pub struct ReferenceEngine {
  pub initialized: std::cell::RefCell<Vec<String>>,
}

impl ReferenceEngine {
  fn run_init(&self, graph: &AliasGraph, op: &str) -> Result<()> {
    match graph.nodes.get(op) {
      Some(Node::NoOp(deps)) => {
        self.initialized.borrow_mut().push(op.to_string());
        deps.iter().try_for_each(|d| self.run_init(graph, d))
      }
      _ => Err(Error::Engine(format!("{} is not an initialize op", op))),
    }
  }

  fn merged(&self, graphs: &[ScopedGraph<'_>]) -> Result<(AliasGraph, Option<ResourceId>)> {
    let mut merged = AliasGraph::default();
    let mut inits = vec![];
    for g in graphs {
      merged.insert_all(AliasGraph::decode(g.graph)?.scoped(&g.scope))?;
      if let Some(op) = g.initialize_op {
        inits.push(op.scoped(&g.scope).0);
      }
    }
    let init = match inits.as_slice() {
      [] => None,
      [one] => Some(ResourceId::new(one.as_str())),
      _ => {
        merged.nodes.insert("merged_init".to_string(), Node::NoOp(inits));
        Some(ResourceId::new("merged_init"))
      }
    };
    Ok((merged, init))
  }
}

impl GraphEngine for ReferenceEngine {
  fn merge(&self, graphs: &[ScopedGraph<'_>]) -> Result<BuiltGraph> {
    let (merged, initialize_op) = self.merged(graphs)?;
    Ok(BuiltGraph {
      graph: merged.encode(),
      initialize_op,
    })
  }

  fn chain(
    &self,
    first: ScopedGraph<'_>,
    second: ScopedGraph<'_>,
    wiring: &[Wire],
  ) -> Result<BuiltGraph> {
    let (mut merged, initialize_op) = self.merged(&[first, second])?;
    for w in wiring {
      match merged.nodes.get_mut(w.to.as_str()) {
        Some(node) if *node == Node::Placeholder => *node = Node::Identity(w.from.0.clone()),
        _ => return Err(Error::Engine(format!("{} is not a placeholder", w.to))),
      }
    }
    Ok(BuiltGraph {
      graph: merged.encode(),
      initialize_op,
    })
  }

  fn identity(&self, wiring: &[Wire]) -> Result<BuiltGraph> {
    let mut g = AliasGraph::default();
    for w in wiring {
      g.nodes.insert(w.from.0.clone(), Node::Placeholder);
      g.nodes.insert(w.to.0.clone(), Node::Identity(w.from.0.clone()));
    }
    Ok(BuiltGraph {
      graph: g.encode(),
      initialize_op: None,
    })
  }
}

impl Executor for ReferenceEngine {
  fn invoke(&self, comp: &CompiledComputation, arg: &Value) -> Result<Value> {
    let graph = AliasGraph::decode(comp.graph())?;
    if let Some(op) = comp.initialize_op() {
      self.run_init(&graph, op.as_str())?;
    }
    let feeds: HashMap<ResourceId, Value> =
      comp.parameter_binding().feed(comp.parameter_type(), arg)?.into_iter().collect();
    comp
      .result_binding()
      .assemble(comp.result_type(), &mut |id| graph.eval(id.as_str(), &feeds))
  }
}

/// The computation `x -> x` for parameter type `t`, with an initialize op named `init`.
pub fn identity_comp(t: &str) -> CompiledComputation {
  let t: Type = t.parse().unwrap();
  let parameter = Binding::fresh_for(&t, "arg").unwrap();
  let result = Binding::fresh_for(&t, "out").unwrap();
  let mut g = AliasGraph::default();
  for (p, r) in parameter.leaves().into_iter().zip(result.leaves()) {
    g.nodes.insert(p.0.clone(), Node::Placeholder);
    g.nodes.insert(r.0.clone(), Node::Identity(p.0.clone()));
  }
  g.nodes.insert("init".to_string(), Node::NoOp(vec![]));
  CompiledComputation::new(
    FunctionType::new(t.clone(), t),
    g.encode(),
    parameter,
    result,
    Some(ResourceId::new("init")),
  )
  .unwrap()
}

/// A computation with no meaningful parameter returning the constant `value` of type `t`.
pub fn constant_comp(t: &str, value: serde_json::Value) -> CompiledComputation {
  let t: Type = t.parse().unwrap();
  let value = Value::from_native(&value).unwrap();
  let result = Binding::fresh_for(&t, "const").unwrap();
  let fed = result.feed(&t, &value).unwrap();
  let mut g = AliasGraph::default();
  for (id, v) in fed {
    g.nodes.insert(id.0, Node::Const(v));
  }
  CompiledComputation::new(
    FunctionType::new(Type::unnamed_tuple(vec![]), t),
    g.encode(),
    Binding::Tuple(vec![]),
    result,
    None,
  )
  .unwrap()
}

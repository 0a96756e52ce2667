use std::path::Path;

#[cfg(not(debug_assertions))]
use human_panic::setup_panic;
use tracing::subscriber::{DefaultGuard, SetGlobalDefaultError};

#[cfg(debug_assertions)]
extern crate better_panic;

use tracing_subscriber::EnvFilter;

use crate::computation::CompiledComputation;
use crate::error::Result;
use crate::transforms::Pipeline;

// [NOTE] tracing
//
// Transforms are `#[tracing::instrument]`ed at debug level and log the type they
// produce. `RUST_LOG` overrides the level given to `install_logger`, e.g.
// `RUST_LOG=compiled_ir=debug`.

pub fn install_logger(default_level: &str) -> std::result::Result<(), SetGlobalDefaultError> {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  let subscriber = tracing_subscriber::fmt()
    .compact()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .finish();
  tracing::subscriber::set_global_default(subscriber)
}

pub fn init_logging(default_level: &str) -> std::result::Result<(), SetGlobalDefaultError> {
  // Human Panic. Only enabled when *not* debugging.
  #[cfg(not(debug_assertions))]
  {
    setup_panic!();
  }

  // Better Panic. Only enabled *when* debugging.
  #[cfg(debug_assertions)]
  {
    better_panic::Settings::debug()
      .most_recent_first(false)
      .lineno_suffix(true)
      .verbosity(better_panic::Verbosity::Full)
      .install();
  }

  install_logger(default_level)?;

  Ok(())
}

/// Thread-local subscriber for tests; logging stops when the guard is dropped.
pub fn init_logging_tests() -> DefaultGuard {
  let subscriber = tracing_subscriber::fmt()
    .compact()
    .with_max_level(tracing::Level::DEBUG)
    .with_test_writer()
    .finish();
  tracing::subscriber::set_default(subscriber)
}

pub fn read_computation(path: &Path) -> Result<CompiledComputation> {
  let content = std::fs::read_to_string(path)?;
  Ok(serde_json::from_str(&content)?)
}

pub fn computation_to_json(comp: &CompiledComputation, pretty: bool) -> Result<String> {
  Ok(if pretty {
    serde_json::to_string_pretty(comp)?
  } else {
    serde_json::to_string(comp)?
  })
}

pub fn write_computation(path: &Path, comp: &CompiledComputation, pretty: bool) -> Result<()> {
  std::fs::write(path, computation_to_json(comp, pretty)?)?;
  Ok(())
}

/// Reads a YAML (or JSON, which is valid YAML) list of transforms.
pub fn read_pipeline(path: &Path) -> Result<Pipeline> {
  let content = std::fs::read_to_string(path)?;
  Ok(serde_yaml::from_str(&content)?)
}

use std::path::Path;

use compiled_ir::transforms::Pipeline;
use serde::Deserialize;

/// Config file format (YAML). Every field can be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
  /// Default log level when `RUST_LOG` is not set
  pub log_level: Option<String>,
  /// Pretty-print JSON output
  pub pretty: Option<bool>,
  /// Pipeline used by `apply` when no `--pipeline` is given
  pub pipeline: Option<Pipeline>,
}

impl AppConfig {
  pub fn load(path: &Path) -> Result<Self, compiled_ir::Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
  }

  // merge configs where the second overwrites the first
  pub fn merge(self, other: Self) -> Self {
    Self {
      log_level: other.log_level.or(self.log_level),
      pretty: other.pretty.or(self.pretty),
      pipeline: other.pipeline.or(self.pipeline),
    }
  }

  pub fn log_level(&self) -> &str {
    self.log_level.as_deref().unwrap_or("info")
  }
}

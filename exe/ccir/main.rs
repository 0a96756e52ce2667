mod app_config;

use std::{
  error::Error,
  path::{Path, PathBuf},
};

use app_config::AppConfig;
use clap::{Parser, Subcommand};
use compiled_ir::{
  transforms::{self, Pipeline},
  utils, CompiledComputation, Selector,
};
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Rewrite the interface of compiled computations")]
struct Cli {
  /// YAML config file
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,
  /// Pretty-print JSON output
  #[arg(long, global = true)]
  pretty: bool,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the type signature and bindings of a computation
  Show {
    #[arg(long, value_name = "PATH")]
    unit: PathBuf,
  },
  /// Narrow a tuple-returning computation to one of its outputs
  Select {
    #[arg(long, value_name = "PATH")]
    unit: PathBuf,
    /// Index or name of the output to keep
    #[arg(long)]
    output: Selector,
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
  },
  /// Apply a pipeline of transforms
  Apply {
    #[arg(long, value_name = "PATH")]
    unit: PathBuf,
    /// YAML list of transforms; defaults to the config's pipeline
    #[arg(long, value_name = "PATH")]
    pipeline: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
  },
}

fn emit(comp: &CompiledComputation, out: Option<&Path>, pretty: bool) -> compiled_ir::Result<()> {
  match out {
    Some(path) => {
      utils::write_computation(path, comp, pretty)?;
      info!("wrote {}", path.display());
    }
    None => println!("{}", utils::computation_to_json(comp, pretty)?),
  }
  Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
  let args = Cli::parse();

  let file_config = match &args.config {
    Some(path) => AppConfig::load(path)?,
    None => AppConfig::default(),
  };
  let config = file_config.merge(AppConfig {
    pretty: args.pretty.then_some(true),
    ..AppConfig::default()
  });
  utils::init_logging(config.log_level())?;
  let pretty = config.pretty.unwrap_or(false);

  match args.command {
    Command::Show { unit } => {
      let comp = utils::read_computation(&unit)?;
      println!("{}", comp);
    }
    Command::Select { unit, output, out } => {
      let comp = utils::read_computation(&unit)?;
      let selected = transforms::select_output(&output, &comp)?;
      emit(&selected, out.as_deref(), pretty)?;
    }
    Command::Apply {
      unit,
      pipeline,
      out,
    } => {
      let comp = utils::read_computation(&unit)?;
      let pipeline = match pipeline {
        Some(path) => utils::read_pipeline(&path)?,
        None => config.pipeline.clone().unwrap_or_else(Pipeline::new),
      };
      let transformed = pipeline.apply(&comp)?;
      emit(&transformed, out.as_deref(), pretty)?;
    }
  }
  Ok(())
}

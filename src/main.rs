use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cdn_swap::Converter;
use cdn_swap::config::{discover, load_config};

/// Rewrite local script, stylesheet and url() references to CDN URLs.
#[derive(Debug, Parser)]
#[command(name = "cdn-swap", version, about)]
struct Cli {
  /// Rule configuration file (JSON or YAML). Discovered in the project root when omitted.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory holding `.bowerrc` and installed components; overrides `projectRoot`.
  #[arg(long)]
  project_root: Option<PathBuf>,

  /// Write converted files here instead of printing them.
  #[arg(short, long)]
  out_dir: Option<PathBuf>,

  /// Log every rewritten reference.
  #[arg(short, long)]
  verbose: bool,

  /// HTML or CSS documents to convert.
  #[arg(required = true)]
  inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn init_logging(verbose: bool) {
  let default = if verbose { "cdn_swap=debug" } else { "cdn_swap=info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(io::stderr).with_target(false).without_time())
    .with(filter)
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let config_path = match cli.config {
    Some(path) => path,
    None => {
      let search_dir = cli.project_root.clone().unwrap_or_else(|| PathBuf::from("."));
      discover(&search_dir).ok_or_else(|| {
        anyhow!("no configuration file found in {}", search_dir.display())
      })?
    }
  };

  let config = load_config(&config_path)?;
  let mut converter = Converter::new(&config)
    .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
  if let Some(project_root) = &cli.project_root {
    converter = converter.with_project_root(project_root);
  }

  if let Some(out_dir) = &cli.out_dir {
    fs::create_dir_all(out_dir)
      .with_context(|| format!("failed to create {}", out_dir.display()))?;
  }

  let mut stdout = io::stdout().lock();
  for input in &cli.inputs {
    let text = fs::read_to_string(input)
      .with_context(|| format!("failed to read {}", input.display()))?;
    let converted = converter
      .convert(&text)
      .with_context(|| format!("failed to convert {}", input.display()))?;

    match &cli.out_dir {
      Some(out_dir) => {
        let file_name = input
          .file_name()
          .ok_or_else(|| anyhow!("input {} has no file name", input.display()))?;
        let target = out_dir.join(file_name);
        fs::write(&target, converted)
          .with_context(|| format!("failed to write {}", target.display()))?;
        tracing::info!(input = %input.display(), output = %target.display(), "converted");
      }
      None => stdout
        .write_all(converted.as_bytes())
        .context("failed to write to stdout")?,
    }
  }

  Ok(())
}

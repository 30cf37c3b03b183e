//! Minimal CLI: discover → (generate | inspect)
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::config::GeneratorConfig;
use crate::discovery;
use crate::emit::{self, FileSystemSink};
use crate::pipeline::{self, BatchReport};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate assertion subjects for value types described as JSON
#[derive(Parser, Debug)]
#[command(name = "auto-subject", version)]
pub struct CommandLineInterface {
    /// more logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate one subject source file per value type
    Generate(GenerateOut),
    /// print the classification view (category, base name, access expression) as JSON
    Inspect(InspectOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// generator settings (.json); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// subject name prefix (default "Auto")
    #[arg(long)]
    prefix: Option<String>,

    /// subject name suffix (default empty)
    #[arg(long)]
    suffix: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output source root; units land under their package directories
    #[arg(short, long)]
    out: PathBuf,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct InspectOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn config(&self) -> anyhow::Result<GeneratorConfig> {
        let base = match self.config.as_ref() {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        let config = base.with_prefix(self.prefix.as_deref()).with_suffix(self.suffix.as_deref());
        config.validate()?;
        Ok(config)
    }

    fn load(&self) -> anyhow::Result<Vec<crate::model::ValueType>> {
        discovery::load_value_types(&self.input).context("failed to load value types")
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// `Ok(false)` when some value type failed to generate.
    pub fn run(&self) -> anyhow::Result<bool> {
        match &self.cmd {
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(true);
                }

                let config = target.input_settings.config()?;
                let value_types = target.input_settings.load()?;
                let report = pipeline::generate_batch(&value_types, &config);

                let sink = FileSystemSink::new(&target.out);
                emit::emit_all(&sink, &report.units)
                    .with_context(|| format!("failed to emit into {}", target.out.display()))?;

                print_summary(&report, &sink);
                Ok(report.is_success())
            }
            Command::Inspect(target) => {
                let config = target.input_settings.config()?;
                let value_types = target.input_settings.load()?;
                let views = pipeline::inspect(&value_types, &config);
                let src = serde_json::to_string_pretty(&views)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("failed to create {}", parent.display()))?;
                    }
                    std::fs::write(out, &src).with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{src}");
                }
                Ok(views.iter().all(|v| v.error.is_none()))
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn print_summary(report: &BatchReport, sink: &FileSystemSink) {
    for unit in &report.units {
        eprintln!("{} {}", "wrote".green().bold(), sink.path_for(unit).display());
    }
    for warning in &report.warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
    for failure in &report.failures {
        eprintln!("{} {failure}", "error:".red().bold());
    }
    let summary = format!(
        "{} generated, {} failed, {} warning(s)",
        report.units.len(),
        report.failures.len(),
        report.warnings.len()
    );
    if report.is_success() {
        eprintln!("{}", summary.green());
    } else {
        eprintln!("{}", summary.red());
    }
}

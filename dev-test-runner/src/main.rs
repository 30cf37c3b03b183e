//! Runs every fixture through the generator twice and checks the results.
//!
//! - output is byte-identical across runs (and across configs, per config)
//! - each fixture fails exactly the value types it declares in `expected_failures`
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use auto_subject::emit::{self, MemorySink};
use auto_subject::{GeneratorConfig, discovery, generate_batch, logging};
use colored::Colorize;

// ————————————————————————————————————————————————————————————————————————————
// FIXTURE TABLE
// ————————————————————————————————————————————————————————————————————————————

struct Fixture {
    file: &'static str,
    expected_failures: &'static [&'static str],
    expected_warnings: usize,
}

const FIXTURES: &[Fixture] = &[
    Fixture { file: "user.json", expected_failures: &[], expected_warnings: 0 },
    Fixture { file: "generics.json", expected_failures: &[], expected_warnings: 2 },
    Fixture {
        file: "broken.json",
        expected_failures: &["com.example.broken.Clashing", "com.example.broken.Confused"],
        expected_warnings: 0,
    },
];

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures")
}

fn render(config: &GeneratorConfig, path: &Path) -> anyhow::Result<(Vec<(String, String)>, Vec<String>, usize)> {
    let value_types = discovery::load_value_types([path.to_string_lossy()])?;
    let report = generate_batch(&value_types, config);
    let sink = MemorySink::new();
    emit::emit_all(&sink, &report.units)?;
    let failed = report.failures.iter().map(|f| f.value_type().to_string()).collect();
    Ok((sink.into_sorted(), failed, report.warnings.len()))
}

fn check(fixture: &Fixture, config: &GeneratorConfig) -> anyhow::Result<()> {
    let path = fixtures_dir().join(fixture.file);
    let (first, failed, warnings) = render(config, &path).with_context(|| format!("{}", path.display()))?;
    let (second, _, _) = render(config, &path)?;
    anyhow::ensure!(first == second, "output differs between two runs");
    anyhow::ensure!(
        failed == fixture.expected_failures,
        "expected failures {:?}, got {failed:?}",
        fixture.expected_failures
    );
    anyhow::ensure!(
        warnings == fixture.expected_warnings,
        "expected {} warning(s), got {warnings}",
        fixture.expected_warnings
    );
    Ok(())
}

fn main() -> ExitCode {
    logging::init(0);
    let configs = match GeneratorConfig::load(&fixtures_dir().join("config.json")) {
        Ok(custom) => vec![("default", GeneratorConfig::default()), ("config.json", custom)],
        Err(error) => {
            eprintln!("{} {error}", "✗".red());
            return ExitCode::FAILURE;
        }
    };

    let mut failures = 0usize;
    for (label, config) in &configs {
        for fixture in FIXTURES {
            match check(fixture, config) {
                Ok(()) => eprintln!("{} {} [{label}]", "✓".green(), fixture.file),
                Err(error) => {
                    failures += 1;
                    eprintln!("{} {} [{label}]: {error:#}", "✗".red(), fixture.file);
                }
            }
        }
    }
    if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

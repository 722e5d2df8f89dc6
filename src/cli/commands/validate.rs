use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, info_span, warn};

use pipelint_core::{Kind, Severity, ValidationResult};
use pipelint_parser::ResourceParser;
use pipelint_reports::{SarifReport, ValidationSummary};
use pipelint_utils::FileDiscovery;
use pipelint_validator::validate_resource;

use crate::cli::args::ValidateArgs;
use crate::config::{OutputFormat, PipelintConfig};

/// Outcome of validating one manifest file.
#[derive(Debug)]
pub enum FileReport {
    Validated {
        path: PathBuf,
        resources: Vec<(Kind, String, ValidationResult)>,
    },
    Failed {
        path: PathBuf,
        error: String,
    },
}

impl FileReport {
    pub fn record(self, summary: &mut ValidationSummary) {
        match self {
            FileReport::Validated { path, resources } => {
                for (kind, name, result) in resources {
                    summary.add_resource(path.clone(), kind.to_string(), name, result);
                }
            }
            FileReport::Failed { path, error } => summary.add_parse_failure(path, error),
        }
    }
}

/// Parse every document in `path` and validate each resource.
pub fn validate_file(path: &Path) -> FileReport {
    let span = info_span!("validate", file = %path.display());
    let _guard = span.enter();

    let parsed = File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|file| {
            ResourceParser::for_reader(file)
                .parse_all()
                .map_err(|e| e.to_string())
        });

    let resources = match parsed {
        Ok(resources) => resources,
        Err(error) => {
            warn!("Failed to parse {}: {}", path.display(), error);
            return FileReport::Failed {
                path: path.to_path_buf(),
                error,
            };
        }
    };

    let resources = resources
        .iter()
        .map(|resource| {
            let result = validate_resource(&span, resource);
            debug!(
                kind = %resource.kind(),
                name = resource.name(),
                errors = result.errors(),
                "validated resource"
            );
            (resource.kind().clone(), resource.name().to_string(), result)
        })
        .collect();

    FileReport::Validated {
        path: path.to_path_buf(),
        resources,
    }
}

pub async fn run_validate_command(args: ValidateArgs) -> Result<ExitCode> {
    let env_vars: HashMap<String, String> = std::env::vars().collect();
    let config = PipelintConfig::load_with_precedence(args.config.as_deref(), &args, &env_vars)?;
    let format = config.output_format()?;

    let files = discover_files(&args.targets(), &config)?;
    if files.is_empty() {
        warn!("No manifest files found");
    }
    info!(
        "Validating {} file(s) with concurrency {}",
        files.len(),
        config.run.concurrency
    );

    let mut summary = ValidationSummary::new();
    summary.start();

    let reports = stream::iter(files)
        .map(|path| tokio::task::spawn_blocking(move || validate_file(&path)))
        .buffered(config.run.concurrency)
        .collect::<Vec<_>>()
        .await;

    for report in reports {
        report.context("validation task failed")?.record(&mut summary);
    }
    summary.finish();

    write_report(&summary, format, config.output.path.as_deref())?;

    Ok(exit_code(&summary, config.run.strict))
}

/// Discover manifests under every target, keeping first-seen order.
pub fn discover_files(targets: &[PathBuf], config: &PipelintConfig) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for target in targets {
        let discovery =
            FileDiscovery::with_extensions(target.clone(), config.discovery.extensions.clone())
                .with_excludes(config.discovery.exclude.clone());
        for file in discovery.get_files()? {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }

    Ok(files)
}

pub fn render_report(summary: &ValidationSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(summary.to_text()),
        OutputFormat::Json => summary.to_json(),
        OutputFormat::Sarif => {
            SarifReport::from_validation_summary(summary, env!("CARGO_PKG_VERSION")).to_json()
        }
    }
}

/// Print the report, or write it to `output` when one is configured.
pub fn write_report(
    summary: &ValidationSummary,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let Some(path) = output else {
        let rendered = render_report(summary, format)?;
        print!("{}", rendered);
        if !rendered.ends_with('\n') {
            println!();
        }
        return Ok(());
    };

    match format {
        OutputFormat::Sarif => {
            SarifReport::from_validation_summary(summary, env!("CARGO_PKG_VERSION"))
                .save_to_file(path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
        }
        OutputFormat::Text | OutputFormat::Json => {
            std::fs::write(path, render_report(summary, format)?)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
        }
    }
    info!("Report written to {}", path.display());

    // Keep the totals visible when the report goes to a file
    if format != OutputFormat::Text {
        if let Some(totals) = summary.to_text().lines().last() {
            eprintln!("{}", totals);
        }
    }
    Ok(())
}

/// 1 when any error was found, or any warning under strict mode.
pub fn exit_code(summary: &ValidationSummary, strict: bool) -> ExitCode {
    let warnings: usize = summary
        .reports
        .iter()
        .map(|r| r.result.count(Severity::Warning))
        .sum();

    if summary.has_errors() || (strict && warnings > 0) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

//! routesmith CLI entrypoint
//! Parses command-line arguments, runs the generation pipeline, and handles
//! the plumbing the core deliberately leaves to its caller: writing suite
//! files, patching the project manifest, and invoking the JS test runner.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use routesmith_core::{AssertionPolicy, Config, Pipeline, PipelineReport};
use serde_json::json;
use tokio::fs;
use tokio::process::Command;
use tracing::{info, warn};

/// Command the manifest patch wires into `scripts.test`.
const TEST_COMMAND: &str = "jest --coverage";

#[derive(Parser)]
#[command(name = "routesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate Jest test suites for an Express project
    Generate {
        /// Path to the Express project root
        project_path: PathBuf,
        /// Seed for deterministic input synthesis
        #[arg(long)]
        seed: Option<u64>,
        /// Assert a client-error status (>= 400) in invalid-input scenarios
        /// instead of the baseline success assertion
        #[arg(long)]
        assert_client_error: bool,
        /// Suffix replacing the source extension on generated suites
        #[arg(long, default_value = ".test.js")]
        suffix: String,
        /// Module specifier the generated suites import the app from
        #[arg(long, default_value = "~/index.js")]
        app_import: String,
        /// Skip patching the project package.json test script
        #[arg(long)]
        no_manifest_patch: bool,
        /// Run the project's test command after generation
        #[arg(long)]
        run_tests: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            project_path,
            seed,
            assert_client_error,
            suffix,
            app_import,
            no_manifest_patch,
            run_tests,
        } => {
            let config = Config {
                project_root: project_path.clone(),
                suite_suffix: suffix,
                app_import,
                assertion_policy: if assert_client_error {
                    AssertionPolicy::ExpectClientError
                } else {
                    AssertionPolicy::ExpectSuccess
                },
                seed,
            };

            let report = Pipeline::new(config)
                .run()
                .await
                .context("generation pipeline failed")?;

            write_suites(&project_path, &report).await?;

            for warning in &report.warnings {
                warn!("generation warning: {warning}");
            }
            for failure in &report.failures {
                warn!(
                    source = %failure.source.display(),
                    "failed: {}", failure.error
                );
            }

            if !no_manifest_patch {
                patch_manifest(&project_path)
                    .await
                    .context("failed to patch package.json")?;
            }

            if run_tests {
                run_test_command(&project_path).await?;
            }

            println!(
                "Generated {} suite(s), {} failure(s)",
                report.suites.len(),
                report.failures.len()
            );

            if !report.failures.is_empty() {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

/// Persist every generated suite under the project root.
async fn write_suites(project_root: &Path, report: &PipelineReport) -> anyhow::Result<()> {
    for suite in &report.suites {
        let output = project_root.join(&suite.output_path);
        if let Some(parent) = output.parent() {
            ensure_directory(parent).await?;
        }
        fs::write(&output, &suite.contents)
            .await
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!(suite = %output.display(), "wrote test suite");
    }
    Ok(())
}

/// Create every missing directory segment leading to `dir`, shallowest
/// first. Iterative on purpose: deeply nested output paths must not recurse.
async fn ensure_directory(dir: &Path) -> anyhow::Result<()> {
    let mut current = PathBuf::new();
    for component in dir.components() {
        current.push(component);
        match fs::create_dir(&current).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to create {}", current.display()))
            }
        }
    }
    Ok(())
}

/// Point the project's `scripts.test` at the coverage-enabled test runner,
/// preserving everything else in package.json.
async fn patch_manifest(project_root: &Path) -> anyhow::Result<()> {
    let path = project_root.join("package.json");
    let raw = fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut manifest: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;

    let root = manifest
        .as_object_mut()
        .context("package.json is not a JSON object")?;
    let scripts = root.entry("scripts").or_insert_with(|| json!({}));
    scripts
        .as_object_mut()
        .context("package.json scripts is not a JSON object")?
        .insert("test".to_string(), json!(TEST_COMMAND));

    let pretty = serde_json::to_string_pretty(&manifest)?;
    fs::write(&path, pretty).await?;
    info!(manifest = %path.display(), "patched test script");
    Ok(())
}

/// Run the project's test command, streaming its output.
async fn run_test_command(project_root: &Path) -> anyhow::Result<()> {
    info!("running tests...");
    let status = Command::new("yarn")
        .args(["test", "--coverage"])
        .current_dir(project_root)
        .status()
        .await
        .context("failed to spawn test runner")?;
    if !status.success() {
        anyhow::bail!("test runner exited with {status}");
    }
    Ok(())
}

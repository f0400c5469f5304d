//! End-to-end generation pipeline.
//!
//! Drives scanner → extractor → synthesizer → renderer sequentially across
//! every discovered file pair. One pair's failure never aborts the run: the
//! error is contextualized with the source path, recorded in the report, and
//! the remaining pairs are still processed. The caller inspects the report
//! and decides what to do with failures.

// Internal imports (std, crate)
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::RouteExtractor;
use crate::render::{GeneratedTestSuite, TestSuiteRenderer};
use crate::scanner::{self, FilePair};
use crate::spec::Specification;
use crate::synth::{GenerationWarning, ValueSynthesizer};

// External imports (alphabetized)
use tokio::fs;
use tracing::{info, warn};

/// A file pair the pipeline could not process.
#[derive(Debug)]
pub struct FileFailure {
    /// Source file of the failed pair
    pub source: PathBuf,
    /// What went wrong
    pub error: Error,
}

/// Everything one pipeline run produced.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Rendered suites, one per matched route
    pub suites: Vec<GeneratedTestSuite>,
    /// Pairs that failed, with context; never silently discarded
    pub failures: Vec<FileFailure>,
    /// Generation inconsistencies surfaced per parameter
    pub warnings: Vec<GenerationWarning>,
}

/// The orchestrator: one run over a project tree.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a pipeline for the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the full pipeline and return the aggregated report.
    ///
    /// Scanning errors on the root itself are fatal; per-pair errors are
    /// collected in the report instead.
    pub async fn run(&self) -> Result<PipelineReport> {
        let pairs = scanner::scan(&self.config.project_root)?;
        info!(pairs = pairs.len(), "discovered source files under test");

        let renderer = TestSuiteRenderer::new(
            &self.config.suite_suffix,
            &self.config.app_import,
            self.config.assertion_policy,
        )?;
        let mut synthesizer = match self.config.seed {
            Some(seed) => ValueSynthesizer::with_seed(seed),
            None => ValueSynthesizer::new(),
        };

        let mut report = PipelineReport::default();
        for pair in &pairs {
            match self
                .process_pair(pair, &renderer, &mut synthesizer, &mut report.warnings)
                .await
            {
                Ok(mut suites) => report.suites.append(&mut suites),
                Err(error) => {
                    warn!(source = %pair.source.display(), %error, "skipping file pair");
                    report.failures.push(FileFailure {
                        source: pair.source.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            suites = report.suites.len(),
            failures = report.failures.len(),
            "generation finished"
        );
        Ok(report)
    }

    async fn process_pair(
        &self,
        pair: &FilePair,
        renderer: &TestSuiteRenderer,
        synthesizer: &mut ValueSynthesizer,
        warnings: &mut Vec<GenerationWarning>,
    ) -> Result<Vec<GeneratedTestSuite>> {
        let source = fs::read_to_string(&pair.source).await?;
        let spec = Specification::from_file(&pair.spec).await?;

        let extractor = RouteExtractor::new(&spec, &self.config.project_root);
        let routes = extractor.extract(&source, &pair.source)?;
        info!(
            source = %pair.source.display(),
            routes = routes.len(),
            "extracted routes"
        );

        let mut suites = Vec::with_capacity(routes.len());
        for route in &routes {
            let inputs = synthesizer.synthesize_route(route)?;
            warnings.extend(inputs.warnings.iter().cloned());
            suites.push(renderer.render(route, &inputs)?);
        }
        Ok(suites)
    }
}

//! Test suite rendering.
//!
//! Composes a [`RouteDescriptor`] and its synthesized input sets into a
//! Jest/supertest suite: one scenario issuing a request with the full valid
//! input set, plus one scenario per parameter with that parameter's value
//! replaced by its invalid counterpart while all others stay valid. The
//! suite is rendered from a single embedded Tera template.

// Internal imports (std, crate)
use std::path::PathBuf;

use crate::config::AssertionPolicy;
use crate::error::Result;
use crate::extract::RouteDescriptor;
use crate::synth::RouteInputs;

// External imports (alphabetized)
use serde::Serialize;
use serde_json::Value as JsonValue;
use tera::{Context, Tera};

const SUITE_TEMPLATE: &str = include_str!("templates/suite.test.js.tera");
const TEMPLATE_NAME: &str = "suite.test.js";

/// A rendered suite ready to be persisted by the caller. The core holds no
/// reference to it after handing it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTestSuite {
    /// Output path relative to the project root: the source file's path with
    /// its extension replaced by the suite suffix
    pub output_path: PathBuf,
    /// Rendered suite text
    pub contents: String,
}

/// One `name: value` entry of a query object literal.
#[derive(Serialize)]
struct QueryEntry {
    name: String,
    literal: String,
}

/// One invalid-input scenario: a single parameter replaced by its invalid
/// counterpart.
#[derive(Serialize)]
struct InvalidScenario {
    index: usize,
    parameter: String,
    entries: Vec<QueryEntry>,
}

/// Renders route descriptors into test suites.
pub struct TestSuiteRenderer {
    tera: Tera,
    suffix: String,
    app_import: String,
    policy: AssertionPolicy,
}

impl TestSuiteRenderer {
    /// Create a renderer with the embedded suite template.
    pub fn new(
        suffix: impl Into<String>,
        app_import: impl Into<String>,
        policy: AssertionPolicy,
    ) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, SUITE_TEMPLATE)?;
        Ok(Self {
            tera,
            suffix: suffix.into(),
            app_import: app_import.into(),
            policy,
        })
    }

    /// Render one suite for a route and its synthesized inputs.
    pub fn render(&self, route: &RouteDescriptor, inputs: &RouteInputs) -> Result<GeneratedTestSuite> {
        let valid_entries: Vec<QueryEntry> = inputs
            .valid
            .iter()
            .map(|(name, value)| QueryEntry {
                name: name.clone(),
                literal: literal(value),
            })
            .collect();

        let invalid_scenarios: Vec<InvalidScenario> = inputs
            .invalid
            .iter()
            .enumerate()
            .map(|(i, (target, invalid_value))| InvalidScenario {
                index: i + 1,
                parameter: target.clone(),
                // Replace only the target parameter; the rest keep their
                // valid values.
                entries: inputs
                    .valid
                    .iter()
                    .map(|(name, valid_value)| QueryEntry {
                        name: name.clone(),
                        literal: literal(if name == target {
                            invalid_value
                        } else {
                            valid_value
                        }),
                    })
                    .collect(),
            })
            .collect();

        let mut context = Context::new();
        context.insert("app_import", &self.app_import);
        context.insert("path", &route.path);
        context.insert("method", &route.method);
        context.insert("method_call", &route.method.to_lowercase());
        context.insert("valid_entries", &valid_entries);
        context.insert("invalid_scenarios", &invalid_scenarios);
        context.insert(
            "expect_client_error",
            &matches!(self.policy, AssertionPolicy::ExpectClientError),
        );

        let contents = self.tera.render(TEMPLATE_NAME, &context)?;
        Ok(GeneratedTestSuite {
            output_path: self.output_path(route),
            contents,
        })
    }

    /// Source path with its extension replaced by the suite suffix.
    fn output_path(&self, route: &RouteDescriptor) -> PathBuf {
        let stem = route
            .source_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("suite");
        route
            .source_file
            .with_file_name(format!("{stem}{}", self.suffix))
    }
}

/// JSON text doubles as a JavaScript literal for every value we synthesize.
fn literal(value: &JsonValue) -> String {
    value.to_string()
}

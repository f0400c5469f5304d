//! End-to-end integration tests over a fixture Express project.

use std::path::{Path, PathBuf};

use routesmith_core::{AssertionPolicy, Config, Pipeline};
use tempfile::tempdir;

const INDEX_JS: &str = "\
import express from 'express';
import { setupRoutes } from './route/route.js';

const app = express();

export function getUsers(req, res) {
    res.send('ok');
}

app.get('/users/', getUsers);
app.get('/health/', (req, res) => res.send('up'));

setupRoutes(app);

module.exports = app;
";

const ROUTE_JS: &str = "\
export function searchOrders(req, res) {
    res.send([]);
}

export function setupRoutes(app) {
    app.get('/orders/', searchOrders);
}
";

const INDEX_SPEC: &str = r#"
{
    "GET /users/": {
        "id": {
            "type": "string",
            "required": true,
            "validation": [
                { "type": "min", "value": 10 }
            ]
        }
    },
    "GET /health/": {}
}
"#;

const ROUTE_SPEC: &str = r#"
{
    "GET /orders/": {
        "limit": {
            "type": "number",
            "validation": [
                { "type": "min", "value": 5 },
                { "type": "max", "value": 5 }
            ]
        },
        "q": { "type": "string" }
    }
}
"#;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn fixture_project(root: &Path) {
    write(root, "index.js", INDEX_JS);
    write(root, "index.spec.json", INDEX_SPEC);
    write(root, "route/route.js", ROUTE_JS);
    write(root, "route/route.spec.json", ROUTE_SPEC);
    write(root, "package.json", r#"{"name": "fixture-app"}"#);
    // Dependency tree must be pruned, spec or not.
    write(root, "node_modules/express/index.js", "app.get('/x', h);");
    write(root, "node_modules/express/index.spec.json", "{}");
}

fn config(root: &Path, seed: u64) -> Config {
    let mut config = Config::new(root);
    config.seed = Some(seed);
    config
}

#[tokio::test]
async fn generates_one_suite_per_source_file() {
    let dir = tempdir().unwrap();
    fixture_project(dir.path());

    let report = Pipeline::new(config(dir.path(), 21)).run().await.unwrap();
    assert!(report.failures.is_empty());

    let mut paths: Vec<&PathBuf> = report.suites.iter().map(|s| &s.output_path).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            &PathBuf::from("index.test.js"),
            &PathBuf::from("route/route.test.js"),
        ]
    );
}

#[tokio::test]
async fn inline_handler_route_is_not_suited() {
    let dir = tempdir().unwrap();
    fixture_project(dir.path());

    let report = Pipeline::new(config(dir.path(), 21)).run().await.unwrap();

    // "GET /health/" is specified but registered with an inline handler,
    // so no suite mentions it.
    assert!(report
        .suites
        .iter()
        .all(|s| !s.contents.contains("/health/")));
}

#[tokio::test]
async fn clamped_number_is_pinned_in_rendered_suite() {
    let dir = tempdir().unwrap();
    fixture_project(dir.path());

    let report = Pipeline::new(config(dir.path(), 21)).run().await.unwrap();
    let orders = report
        .suites
        .iter()
        .find(|s| s.output_path == PathBuf::from("route/route.test.js"))
        .expect("orders suite should exist");

    // min 5 / max 5 clamps the synthesized limit to exactly 5.
    assert!(orders.contents.contains("limit: 5"));
    assert!(orders.contents.contains("describe('Test for /orders/ (GET)'"));
    // One invalid scenario per parameter.
    assert_eq!(
        orders.contents.matches("it('should handle invalid").count(),
        2
    );
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let dir = tempdir().unwrap();
    fixture_project(dir.path());

    let first = Pipeline::new(config(dir.path(), 99)).run().await.unwrap();
    let second = Pipeline::new(config(dir.path(), 99)).run().await.unwrap();

    assert_eq!(first.suites, second.suites);
}

#[tokio::test]
async fn client_error_policy_applies_to_all_suites() {
    let dir = tempdir().unwrap();
    fixture_project(dir.path());

    let mut config = config(dir.path(), 21);
    config.assertion_policy = AssertionPolicy::ExpectClientError;

    let report = Pipeline::new(config).run().await.unwrap();
    for suite in &report.suites {
        if suite.contents.contains("invalid input scenario") {
            assert!(suite.contents.contains("toBeGreaterThanOrEqual(400)"));
        }
    }
}

//! Routesmith Core Library
//!
//! This library synthesizes Jest test suites for Express route handlers.
//! Source files are paired with sibling JSON validation specifications,
//! route-registration calls are matched against the specification via
//! tree-sitter, and each matched route gets a rendered suite with one valid
//! scenario and one invalid scenario per parameter.

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod render;
pub mod scanner;
pub mod spec;
pub mod synth;

pub use crate::{
    config::{AssertionPolicy, Config},
    error::{Error, Result},
    extract::{ParameterDescriptor, RouteDescriptor, RouteExtractor},
    pipeline::{FileFailure, Pipeline, PipelineReport},
    render::{GeneratedTestSuite, TestSuiteRenderer},
    scanner::FilePair,
    spec::{ParameterSpecification, RuleKind, Specification, ValidationRule},
    synth::{boundary_value, Boundary, GenerationWarning, ValueSynthesizer},
};

//! Route validation specifications.
//!
//! A specification file is a JSON object mapping composite route keys to
//! per-parameter constraints. It sits next to the source file it describes,
//! sharing the base name with a `.spec.json` extension:
//!
//! ```json
//! {
//!     "GET /users/": {
//!         "id": {
//!             "type": "string",
//!             "required": true,
//!             "validation": [
//!                 { "type": "min", "value": 10 }
//!             ]
//!         }
//!     }
//! }
//! ```
//!
//! The specification is the authoritative filter for test generation: a
//! route discovered in source is only ever turned into a test suite if its
//! composite key (`"<METHOD> <PATH>"`, method upper-cased) appears here.

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::fs;

/// The constraint a [`ValidationRule`] expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Minimum length (strings) or lower bound (numbers)
    Min,
    /// Maximum length (strings) or upper bound (numbers)
    Max,
    /// Pattern the value must match
    Regex,
    /// Closed set of admissible values
    Enum,
}

/// A single declarative constraint attached to a parameter.
///
/// Rules are data, never executable: the payload in `value` is interpreted
/// by the synthesizer according to `kind` (a number for `min`/`max`, a
/// pattern string for `regex`, an array for `enum`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Which constraint this rule expresses
    #[serde(rename = "type")]
    pub kind: RuleKind,
    /// Rule-specific payload
    pub value: JsonValue,
}

impl ValidationRule {
    /// Numeric payload, if this rule carries one
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Integer payload, if this rule carries one
    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_i64()
    }

    /// String payload, if this rule carries one
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// Constraints declared for one named query parameter.
///
/// `required` and `type` are optional in the file; the defaults (`false` and
/// `"any"`) are applied when the descriptor is built, not at parse time, so
/// the parsed value faithfully mirrors what the file said.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpecification {
    /// Whether the parameter must be present on requests
    #[serde(default)]
    pub required: Option<bool>,

    /// Free-form type tag (e.g. "string", "number"); not a closed enum
    #[serde(rename = "type", default)]
    pub param_type: Option<String>,

    /// Ordered sequence of validation rules
    #[serde(default)]
    pub validation: Vec<ValidationRule>,
}

/// Constraints for every parameter of one route, keyed by parameter name.
pub type RouteSpecification = BTreeMap<String, ParameterSpecification>;

/// The full per-source-file specification, keyed by composite route key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Specification {
    routes: BTreeMap<String, RouteSpecification>,
}

impl Specification {
    /// Build the composite key identifying a specified route.
    ///
    /// The method is upper-cased so lookups are insensitive to how the
    /// registration call was spelled in source.
    pub fn composite_key(method: &str, path: &str) -> String {
        format!("{} {}", method.to_uppercase(), path)
    }

    /// Load a specification from a sibling `.spec.json` file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse(&content).map_err(|e| Error::spec(path, e.to_string()))
    }

    /// Parse a specification from raw JSON text.
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Look up a route by composite key, returning an explicit
    /// found/not-found result.
    pub fn get(&self, key: &str) -> Option<&RouteSpecification> {
        self.routes.get(key)
    }

    /// Look up a route by method and path.
    pub fn route(&self, method: &str, path: &str) -> Option<&RouteSpecification> {
        self.get(&Self::composite_key(method, path))
    }

    /// Iterate over all specified routes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RouteSpecification)> {
        self.routes.iter()
    }

    /// Number of specified routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the specification names no routes at all
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

//! Constraint-aware input synthesis.
//!
//! For every extracted parameter the synthesizer produces one
//! constraint-satisfying random value and one type-violating value. The
//! valid value respects the parameter's declared type and validation rules;
//! the invalid value is a single fixed substitution per type, not an
//! exhaustive negative-space search.
//!
//! Number generation clamps to `min`/`max` bounds instead of resampling
//! uniformly in range. Clamping biases values toward the boundary; it is
//! kept because downstream suites depend on `min == max` pinning the value
//! exactly.

// Internal imports (std, crate)
use crate::error::{Error, Result};
use crate::extract::{ParameterDescriptor, RouteDescriptor};
use crate::spec::{RuleKind, ValidationRule};

// External imports (alphabetized)
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value as JsonValue};
use tracing::warn;

/// Retry ceiling when regenerating a string to satisfy a `min` length rule.
/// After this many attempts the last value is kept regardless of length.
const MIN_RETRY_LIMIT: u32 = 1000;

/// Bound on repetition operators when sampling from a regex pattern.
const REGEX_MAX_REPEAT: u32 = 32;

/// Range random numbers are drawn from before clamping.
const NUMBER_RANGE: std::ops::RangeInclusive<i64> = -100_000..=100_000;

/// Word pool for random token generation.
const WORDS: &[&str] = &[
    "amber", "basin", "cedar", "delta", "ember", "fjord", "grove", "harbor",
    "indigo", "juniper", "kestrel", "lantern", "meadow", "nimbus", "orchid",
    "prairie", "quartz", "raven", "summit", "thicket", "umber", "vertex",
    "willow", "zephyr",
];

/// A consistency problem hit while satisfying a parameter's rules, attached
/// to the parameter it concerns rather than failing the whole route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationWarning {
    /// Name of the affected parameter
    pub parameter: String,
    /// Human-readable description of the inconsistency
    pub message: String,
}

impl std::fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.parameter, self.message)
    }
}

/// A synthesized valid value plus any warnings raised producing it.
#[derive(Debug, Clone)]
pub struct SynthesizedValue {
    pub value: JsonValue,
    pub warnings: Vec<GenerationWarning>,
}

impl SynthesizedValue {
    fn clean(value: JsonValue) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }
}

/// The full input sets for one route: a valid value per parameter and the
/// per-parameter invalid substitutions, both in descriptor order.
#[derive(Debug, Clone)]
pub struct RouteInputs {
    pub valid: Vec<(String, JsonValue)>,
    pub invalid: Vec<(String, JsonValue)>,
    pub warnings: Vec<GenerationWarning>,
}

/// Random value generator for route parameters.
///
/// Holds its own RNG so a seed can pin the whole run: `with_seed` makes
/// synthesis fully deterministic, which the pipeline exposes through
/// configuration for reproducible suites.
pub struct ValueSynthesizer {
    rng: StdRng,
}

impl Default for ValueSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueSynthesizer {
    /// Create a synthesizer seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a deterministic synthesizer from a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Synthesize the valid and invalid input sets for one route.
    pub fn synthesize_route(&mut self, route: &RouteDescriptor) -> Result<RouteInputs> {
        let mut valid = Vec::with_capacity(route.parameters.len());
        let mut invalid = Vec::with_capacity(route.parameters.len());
        let mut warnings = Vec::new();

        for param in &route.parameters {
            let synthesized = self.valid_value(param)?;
            warnings.extend(synthesized.warnings);
            valid.push((param.name.clone(), synthesized.value));
            invalid.push((param.name.clone(), self.invalid_value(param)));
        }

        Ok(RouteInputs {
            valid,
            invalid,
            warnings,
        })
    }

    /// Produce a constraint-satisfying value for the parameter's declared
    /// type. Unrecognized type tags fall back to a generic word token.
    pub fn valid_value(&mut self, param: &ParameterDescriptor) -> Result<SynthesizedValue> {
        match param.param_type.to_lowercase().as_str() {
            "string" => self.string_value(param),
            "number" => Ok(SynthesizedValue::clean(self.number_value(&param.rules))),
            "boolean" => Ok(SynthesizedValue::clean(json!(self.rng.random::<bool>()))),
            "date" => Ok(SynthesizedValue::clean(json!(self.recent_date()))),
            _ => Ok(SynthesizedValue::clean(json!(self.word()))),
        }
    }

    /// Produce a type-violating value: a fixed substitution per type.
    pub fn invalid_value(&self, param: &ParameterDescriptor) -> JsonValue {
        match param.param_type.to_lowercase().as_str() {
            "string" => json!(12345),
            "number" => json!("NaN"),
            "boolean" => json!("true"),
            _ => JsonValue::Null,
        }
    }

    fn string_value(&mut self, param: &ParameterDescriptor) -> Result<SynthesizedValue> {
        let mut min = None;
        let mut max = None;
        let mut pattern = None;
        for rule in &param.rules {
            match rule.kind {
                RuleKind::Min => min = rule.as_i64().map(|v| v.max(0) as usize),
                RuleKind::Max => max = rule.as_i64().map(|v| v.max(0) as usize),
                RuleKind::Regex => pattern = rule.as_str().map(String::from),
                RuleKind::Enum => {}
            }
        }

        // Pattern-driven generation supersedes all other string rules.
        if let Some(pattern) = pattern {
            let dist = rand_regex::Regex::compile(&pattern, REGEX_MAX_REPEAT)
                .map_err(|e| Error::synth(format!("invalid regex rule '{pattern}': {e}")))?;
            let value: String = self.rng.sample(&dist);
            return Ok(SynthesizedValue::clean(json!(value)));
        }

        let mut generated = self.words();
        if let Some(min) = min {
            let mut attempts = 0;
            while generated.len() < min && attempts < MIN_RETRY_LIMIT {
                generated = self.words();
                attempts += 1;
            }
        }

        let mut warnings = Vec::new();
        if let Some(max) = max {
            generated.truncate(max);
            if let Some(min) = min {
                if generated.len() < min {
                    // min exceeds max: the truncation wins and the
                    // inconsistency is reported instead of silently
                    // producing an unsatisfiable guarantee.
                    let warning = GenerationWarning {
                        parameter: param.name.clone(),
                        message: format!(
                            "min length {min} cannot be met after truncating to max {max}"
                        ),
                    };
                    warn!(parameter = %param.name, "{}", warning.message);
                    warnings.push(warning);
                }
            }
        }

        Ok(SynthesizedValue {
            value: json!(generated),
            warnings,
        })
    }

    /// Random integer clamped into the declared bounds. With `min == max`
    /// the clamp pins the value exactly.
    fn number_value(&mut self, rules: &[ValidationRule]) -> JsonValue {
        let mut value = self.rng.random_range(NUMBER_RANGE);
        for rule in rules {
            match rule.kind {
                RuleKind::Min => {
                    if let Some(min) = rule.as_i64() {
                        value = value.max(min);
                    }
                }
                RuleKind::Max => {
                    if let Some(max) = rule.as_i64() {
                        value = value.min(max);
                    }
                }
                _ => {}
            }
        }
        json!(value)
    }

    /// RFC 3339 timestamp within the last 24 hours.
    fn recent_date(&mut self) -> String {
        let seconds = self.rng.random_range(0..86_400);
        (Utc::now() - Duration::seconds(seconds)).to_rfc3339()
    }

    fn word(&mut self) -> String {
        WORDS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or("token")
            .to_string()
    }

    fn words(&mut self) -> String {
        let count = self.rng.random_range(2..=4);
        let picked: Vec<&str> = (0..count)
            .filter_map(|_| WORDS.choose(&mut self.rng).copied())
            .collect();
        picked.join(" ")
    }
}

/// Edge positions for boundary-value generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Min,
    Max,
    Zero,
}

/// Boundary value per declared type.
///
/// This capability is intentionally not wired into the default suite; the
/// renderer never calls it. It stays here as a separately testable unit for
/// callers that want boundary scenarios.
pub fn boundary_value(param_type: &str, boundary: Boundary) -> JsonValue {
    match param_type.to_lowercase().as_str() {
        "number" => match boundary {
            Boundary::Min => json!(i64::MIN),
            Boundary::Max => json!(i64::MAX),
            Boundary::Zero => json!(0),
        },
        "string" => match boundary {
            Boundary::Min | Boundary::Zero => json!(""),
            Boundary::Max => json!("x".repeat(100)),
        },
        "boolean" => json!(!matches!(boundary, Boundary::Zero)),
        _ => JsonValue::Null,
    }
}

//! Simulated-API configuration model
//!
//! The declarative surface the simulator serves:
//! Path -> Operation -> Response -> Content -> Example.
//!
//! A configuration graph is immutable once loaded, with one exception: the
//! materialized value cell of each [`Example`], written by the external-value
//! fetch subsystem after construction. A reload builds a whole new graph;
//! it never mutates a live one.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::{SimulationError, SimulatorResult};

/// Root of the simulated API surface
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfiguration {
    pub paths: Vec<Arc<ApiPath>>,
}

/// One exact-match request path and its operations
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiPath {
    pub uri: String,
    pub operations: Vec<Operation>,
}

/// One HTTP method's behavior on a path
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Operation {
    /// HTTP method, uppercased on load
    #[serde(rename = "name", deserialize_with = "de_uppercase")]
    pub method: String,
    /// Lower delay bound in milliseconds
    #[serde(default)]
    pub min_delay: Option<u64>,
    /// Upper delay bound in milliseconds
    #[serde(default)]
    pub max_delay: Option<u64>,
    pub responses: Vec<ResponseSpec>,
}

/// One canned response, selectable by status code
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResponseSpec {
    /// String form of an integer in [100,599]
    pub status_code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub contents: Vec<Content>,
}

/// One media type's example payloads
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Content {
    pub media_type: String,
    pub examples: Vec<Arc<Example>>,
}

/// One concrete response payload, selectable by name or randomly
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Example {
    /// Unique within its Content, used for `example=<name>` selection
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Inline payload declared in the configuration source
    #[serde(default)]
    value: Option<String>,
    /// Absolute http/https URL the payload is fetched from
    #[serde(default)]
    pub external_value: Option<String>,
    /// Payload written once by the fetch subsystem for external references.
    /// Kept apart from the declared `value` so re-validating a graph after
    /// a fetch still sees exactly one declared source.
    #[serde(skip)]
    fetched: RwLock<Option<String>>,
}

impl Example {
    /// Construct an inline example (mostly useful in tests)
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: None,
            description: None,
            value: Some(value.into()),
            external_value: None,
            fetched: RwLock::new(None),
        }
    }

    /// Construct an example backed by an external URL
    pub fn external(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: None,
            description: None,
            value: None,
            external_value: Some(url.into()),
            fetched: RwLock::new(None),
        }
    }

    /// Snapshot of the materialized value: the inline payload, or whatever
    /// the fetch subsystem has written
    pub fn value(&self) -> Option<String> {
        self.value
            .clone()
            .or_else(|| self.fetched.read().clone())
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some() || self.fetched.read().is_some()
    }

    /// Write the fetched payload. Only the fetch subsystem calls this.
    pub fn set_value(&self, value: String) {
        *self.fetched.write() = Some(value);
    }

    /// An external reference whose payload has not been materialized yet
    pub fn needs_fetch(&self) -> bool {
        self.external_value.is_some() && self.fetched.read().is_none()
    }
}

fn de_uppercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.to_ascii_uppercase())
}

impl ApiConfiguration {
    /// Load a simulation configuration from a JSON or YAML file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimulatorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimulationError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| SimulationError::Config(format!("YAML parse error: {}", e)))?,
            _ => serde_json::from_str(&content)
                .map_err(|e| SimulationError::Config(format!("JSON parse error: {}", e)))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON string and validate
    pub fn from_json(json: &str) -> SimulatorResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimulationError::Config(format!("JSON parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation of the whole graph
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.paths.is_empty() {
            return Err(validation("at least one path is required", "paths"));
        }

        for (pi, path) in self.paths.iter().enumerate() {
            path.validate()
                .map_err(|e| prefix_param(e, &format!("paths[{}]", pi)))?;
        }

        Ok(())
    }

    /// Total number of examples across the whole configuration
    pub fn example_count(&self) -> usize {
        self.iter_examples().count()
    }

    /// Iterate every example in declaration order
    pub fn iter_examples(&self) -> impl Iterator<Item = &Arc<Example>> {
        self.paths
            .iter()
            .flat_map(|p| p.operations.iter())
            .flat_map(|o| o.responses.iter())
            .flat_map(|r| r.contents.iter())
            .flat_map(|c| c.examples.iter())
    }
}

impl ApiPath {
    fn validate(&self) -> SimulatorResult<()> {
        if self.uri.trim().is_empty() {
            return Err(validation("uri must not be empty", "uri"));
        }
        if self.operations.is_empty() {
            return Err(validation("at least one operation is required", "operations"));
        }
        for (oi, op) in self.operations.iter().enumerate() {
            op.validate()
                .map_err(|e| prefix_param(e, &format!("operations[{}]", oi)))?;
        }
        Ok(())
    }

    /// Whether this path declares the given HTTP method (case-insensitive)
    pub fn operation(&self, method: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.method.eq_ignore_ascii_case(method))
    }
}

impl Operation {
    fn validate(&self) -> SimulatorResult<()> {
        if self.method.trim().is_empty() {
            return Err(validation("method name must not be empty", "name"));
        }
        if let (Some(min), Some(max)) = (self.min_delay, self.max_delay) {
            if max < min {
                return Err(validation(
                    &format!("maxDelay ({}) must be >= minDelay ({})", max, min),
                    "maxDelay",
                ));
            }
        }
        if self.responses.is_empty() {
            return Err(validation("at least one response is required", "responses"));
        }
        for (ri, resp) in self.responses.iter().enumerate() {
            resp.validate()
                .map_err(|e| prefix_param(e, &format!("responses[{}]", ri)))?;
        }
        Ok(())
    }
}

impl ResponseSpec {
    fn validate(&self) -> SimulatorResult<()> {
        match self.status_code.parse::<u16>() {
            Ok(code) if (100..=599).contains(&code) => {}
            _ => {
                return Err(validation(
                    &format!("statusCode '{}' is not an integer in [100,599]", self.status_code),
                    "statusCode",
                ))
            }
        }
        if self.contents.is_empty() {
            return Err(validation("at least one content is required", "contents"));
        }
        for (ci, content) in self.contents.iter().enumerate() {
            content
                .validate()
                .map_err(|e| prefix_param(e, &format!("contents[{}]", ci)))?;
        }
        Ok(())
    }

    /// Parsed status code; validation guarantees this succeeds for loaded graphs
    pub fn parsed_status(&self) -> Option<u16> {
        self.status_code
            .parse::<u16>()
            .ok()
            .filter(|c| (100..=599).contains(c))
    }
}

impl Content {
    fn validate(&self) -> SimulatorResult<()> {
        if self.media_type.trim().is_empty() {
            return Err(validation("mediaType must not be empty", "mediaType"));
        }
        if self.examples.is_empty() {
            return Err(validation("at least one example is required", "examples"));
        }

        for (ei, example) in self.examples.iter().enumerate() {
            example
                .validate()
                .map_err(|e| prefix_param(e, &format!("examples[{}]", ei)))?;

            let duplicate = self.examples[..ei]
                .iter()
                .any(|prior| prior.name.eq_ignore_ascii_case(&example.name));
            if duplicate {
                return Err(validation(
                    &format!("duplicate example name '{}'", example.name),
                    &format!("examples[{}].name", ei),
                ));
            }
        }
        Ok(())
    }
}

impl Example {
    fn validate(&self) -> SimulatorResult<()> {
        if self.name.trim().is_empty() {
            return Err(validation("example name must not be empty", "name"));
        }

        // Only the declared inline value counts here; a payload the fetcher
        // wrote into the cell must not fail re-validation of a live graph.
        match (&self.external_value, self.value.is_some()) {
            (Some(_), true) => {
                return Err(validation(
                    "value and externalValue are mutually exclusive",
                    "externalValue",
                ))
            }
            (None, false) => {
                return Err(validation(
                    "exactly one of value or externalValue is required",
                    "value",
                ))
            }
            _ => {}
        }

        if let Some(url) = &self.external_value {
            let parsed = Url::parse(url).map_err(|e| {
                validation(&format!("externalValue is not an absolute URL: {}", e), "externalValue")
            })?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(validation(
                    &format!("externalValue scheme '{}' is not allowed", parsed.scheme()),
                    "externalValue",
                ));
            }
        }

        Ok(())
    }
}

fn validation(message: &str, param: &str) -> SimulationError {
    SimulationError::Validation {
        message: message.to_string(),
        param: Some(param.to_string()),
    }
}

fn prefix_param(err: SimulationError, prefix: &str) -> SimulationError {
    match err {
        SimulationError::Validation { message, param } => SimulationError::Validation {
            message,
            param: Some(match param {
                Some(p) => format!("{}.{}", prefix, p),
                None => prefix.to_string(),
            }),
        },
        other => other,
    }
}

//! Response, content, and example selection
//!
//! Pure decision logic: given an operation and request-derived inputs
//! (query parameters, Accept header), pick one response, then one content,
//! then one example. No side effects, no I/O. A stage with zero candidates
//! returns `None`; the pipeline maps that to a 404.

mod accept;

pub use accept::{parse_accept, MediaRange};

use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::model::{Content, Example, Operation, ResponseSpec};

/// Simulation-relevant query parameters parsed from the request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationQuery {
    /// `status=<code>` override
    pub status: Option<i64>,
    /// `example=<name>` selection
    pub example: Option<String>,
    /// `random` or `rand` flag (value ignored)
    pub random: bool,
}

impl SimulationQuery {
    /// Parse from a raw query string (the part after `?`, may be empty)
    pub fn parse(raw_query: &str) -> Self {
        let mut query = Self::default();

        for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
            match key.as_ref() {
                "status" => {
                    if query.status.is_none() {
                        query.status = value.parse::<i64>().ok();
                    }
                }
                "example" => {
                    if query.example.is_none() && !value.is_empty() {
                        query.example = Some(value.into_owned());
                    }
                }
                "random" | "rand" => query.random = true,
                _ => {}
            }
        }

        query
    }
}

/// Select a response by the `status` query override, else the first declared.
///
/// The override matches on the integer's string form against the declared
/// status codes; an unmatched override falls back to the first response.
pub fn select_response<'a>(
    operation: &'a Operation,
    query: &SimulationQuery,
) -> Option<&'a ResponseSpec> {
    if let Some(wanted) = query.status {
        let wanted = wanted.to_string();
        if let Some(response) = operation
            .responses
            .iter()
            .find(|r| r.status_code == wanted)
        {
            return Some(response);
        }
    }

    operation.responses.first()
}

/// Negotiate a content entry against the Accept header.
///
/// Candidates are tried in descending quality order; the first content whose
/// media type the range accepts wins. An absent, empty, or unmatched header
/// falls back to the first declared content.
pub fn select_content<'a>(
    response: &'a ResponseSpec,
    accept_header: Option<&str>,
) -> Option<&'a Content> {
    if let Some(header) = accept_header {
        for range in parse_accept(header) {
            if let Some(content) = response
                .contents
                .iter()
                .find(|c| range.matches(&c.media_type))
            {
                return Some(content);
            }
        }
    }

    response.contents.first()
}

/// Select an example by name, randomly, or by declaration order.
///
/// Precedence: `example=<name>` (case-insensitive; an unmatched name falls
/// through to the first declared example, never to random selection), then
/// the `random`/`rand` flag (uniform over all declared examples), then the
/// first declared example. The randomness source is process-wide.
pub fn select_example<'a>(
    content: &'a Content,
    query: &SimulationQuery,
) -> Option<&'a Arc<Example>> {
    if let Some(wanted) = &query.example {
        return content
            .examples
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(wanted))
            .or_else(|| content.examples.first());
    }

    if query.random && !content.examples.is_empty() {
        return content.examples.choose(&mut rand::thread_rng());
    }

    content.examples.first()
}

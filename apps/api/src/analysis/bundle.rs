//! Analysis bundle: the validated, sanitized view of one generative-model response.
//!
//! The model is untrusted: fields may be missing, mistyped, duplicated, or delivered
//! as delimited strings instead of lists. Everything here is tolerant on input and
//! strict on output, so every stage downstream sees the same well-formed shape.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::llm_client::LlmError;

/// Hard cap on bullets kept from any source.
pub const MAX_BULLETS: usize = 5;

pub const FALLBACK_BUNDLE_SUMMARY: &str =
    "The job description was analyzed against the skill taxonomy.";

/// Delimiters accepted when a list field arrives as a single string.
const LIST_DELIMITERS: &[char] = &['\n', ',', ';', '/'];

#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to encode bundle request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("LLM response JSON schema validation failed: bundle must be a JSON object")]
    NotAnObject,
}

/// A skill the model claims the JD mentions, before taxonomy verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub name: String,
    pub evidence: Vec<String>,
}

/// A gap group the model proposes, before taxonomy verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateGap {
    pub category: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBundle {
    pub normalized_text: String,
    pub tokens: Vec<String>,
    pub matched_skills: Vec<CandidateMatch>,
    pub missing_skills: Vec<CandidateGap>,
    pub summary: String,
    pub bullets: Vec<String>,
}

/// Validates and sanitizes a raw model payload into an `AnalysisBundle`.
///
/// `jd_text` is the raw input, used when the model omits its normalized form.
pub fn sanitize_bundle(raw: &Value, jd_text: &str) -> Result<AnalysisBundle, BundleError> {
    let obj = raw.as_object().ok_or(BundleError::NotAnObject)?;

    let normalized_text = non_blank_str(obj, "normalizedText")
        .map(str::to_string)
        .unwrap_or_else(|| normalize_text(jd_text));

    let mut tokens = string_array(obj.get("tokens"));
    if tokens.is_empty() {
        tokens = split_tokens(&normalized_text);
    }

    let matched_skills = sanitize_matches(obj.get("matchedSkills"));
    let missing_skills = sanitize_gaps(obj.get("missingSkills"));

    let summary = non_blank_str(obj, "summary")
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_BUNDLE_SUMMARY.to_string());

    let bullets = sanitize_bullets(string_list(obj.get("bullets"), &['\n']));

    debug!(
        "Bundle sanitized: tokens={}, matches={}, gaps={}, bullets={}",
        tokens.len(),
        matched_skills.len(),
        missing_skills.len(),
        bullets.len()
    );

    Ok(AnalysisBundle {
        normalized_text,
        tokens,
        matched_skills,
        missing_skills,
        summary,
        bullets,
    })
}

fn sanitize_matches(value: Option<&Value>) -> Vec<CandidateMatch> {
    let mut seen = HashSet::new();
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let name = non_blank_str(item, "name")?.to_string();
            let evidence = string_list(item.get("evidence"), LIST_DELIMITERS);
            if evidence.is_empty() {
                return None;
            }
            Some(CandidateMatch { name, evidence })
        })
        .filter(|m| seen.insert(m.name.clone()))
        .collect()
}

fn sanitize_gaps(value: Option<&Value>) -> Vec<CandidateGap> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let category = non_blank_str(item, "category")?.to_string();
            let suggestions = dedup(string_list(item.get("suggestions"), LIST_DELIMITERS));
            if suggestions.is_empty() {
                return None;
            }
            Some(CandidateGap {
                category,
                suggestions,
            })
        })
        .collect()
}

/// Trims, strips a leading `- ` marker, drops blanks, dedups, caps at `MAX_BULLETS`.
/// Idempotent: sanitizing an already-sanitized list returns it unchanged.
pub fn sanitize_bullets<I, S>(bullets: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let cleaned = bullets.into_iter().filter_map(|b| {
        let b = b.as_ref().trim();
        // a lone marker trims to "-" and carries no content
        let b = if b == "-" {
            ""
        } else {
            b.strip_prefix("- ").unwrap_or(b).trim()
        };
        (!b.is_empty()).then(|| b.to_string())
    });
    let mut out = dedup(cleaned);
    out.truncate(MAX_BULLETS);
    out
}

/// Canonical JD normalization: lowercase, keep `[a-z0-9]`, whitespace and `#+./-`,
/// collapse whitespace runs, trim.
pub fn normalize_text(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '#' | '+' | '.' | '/' | '-')
            {
                c
            } else {
                ' '
            }
        })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn split_tokens(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(str::to_string).collect()
}

/// Accepts either a JSON array of strings or a single string split on `delimiters`.
/// Non-string array items and blank entries are dropped; survivors are trimmed.
fn string_list(value: Option<&Value>, delimiters: &[char]) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(delimiters)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        other => string_array(other),
    }
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Order-preserving dedup, first occurrence wins.
pub fn dedup<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

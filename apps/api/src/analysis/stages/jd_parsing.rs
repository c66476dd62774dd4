//! Stage 1: canonical JD text and token list.

use serde::{Deserialize, Serialize};

use crate::analysis::bundle::{normalize_text, split_tokens, AnalysisBundle};
use crate::analysis::stages::{Stage, StageFailure};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedJD {
    pub normalized_text: String,
    pub tokens: Vec<String>,
}

pub struct JdParsingInput<'a> {
    pub jd_text: &'a str,
    pub bundle: &'a AnalysisBundle,
}

pub struct JdParsing;

impl Stage for JdParsing {
    const NAME: &'static str = "JD Parsing Skill";
    const DESCRIPTION: &'static str =
        "Consume shared LLM bundle and produce normalized JD text with token list.";
}

impl JdParsing {
    pub fn run(input: JdParsingInput<'_>) -> Result<ParsedJD, StageFailure> {
        Ok(parse_jd(input.jd_text, input.bundle))
    }
}

/// Prefers the bundle's normalized text and tokens, re-normalizing either way.
pub fn parse_jd(jd_text: &str, bundle: &AnalysisBundle) -> ParsedJD {
    let source = if bundle.normalized_text.trim().is_empty() {
        jd_text
    } else {
        &bundle.normalized_text
    };
    let normalized_text = normalize_text(source);

    let bundle_tokens: Vec<String> = bundle
        .tokens
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    let tokens = if bundle_tokens.is_empty() {
        split_tokens(&normalized_text)
    } else {
        bundle_tokens
    };

    ParsedJD {
        normalized_text,
        tokens,
    }
}

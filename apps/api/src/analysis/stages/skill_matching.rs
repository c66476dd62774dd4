//! Stage 2: verify candidate matches against the taxonomy.
//!
//! A candidate survives only if its name resolves to a taxonomy skill and at least
//! one of its evidence terms is a keyword of that skill. Category and weight are
//! always copied from the taxonomy, never from the candidate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::bundle::AnalysisBundle;
use crate::analysis::stages::jd_parsing::ParsedJD;
use crate::analysis::stages::{Stage, StageFailure};
use crate::analysis::taxonomy::Taxonomy;

/// Max evidence terms kept per matched skill.
pub const MAX_EVIDENCE: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedSkill {
    pub category: String,
    pub name: String,
    pub weight: u32,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatchingOutput {
    pub matched_skills: Vec<MatchedSkill>,
}

pub struct SkillMatchingInput<'a> {
    /// Threaded through for context; matching does not depend on it.
    pub parsed: &'a ParsedJD,
    pub bundle: &'a AnalysisBundle,
    pub taxonomy: &'a Taxonomy,
}

pub struct SkillMatching;

impl Stage for SkillMatching {
    const NAME: &'static str = "Skill Matching Skill";
    const DESCRIPTION: &'static str =
        "Validate LLM skill matches against taxonomy names and keyword evidence.";
}

impl SkillMatching {
    pub fn run(input: SkillMatchingInput<'_>) -> Result<SkillMatchingOutput, StageFailure> {
        let matched_skills = match_skills(input.bundle, input.taxonomy);
        debug!(
            "Skill matching kept {}/{} candidates ({} tokens in JD)",
            matched_skills.len(),
            input.bundle.matched_skills.len(),
            input.parsed.tokens.len()
        );
        Ok(SkillMatchingOutput { matched_skills })
    }
}

pub fn match_skills(bundle: &AnalysisBundle, taxonomy: &Taxonomy) -> Vec<MatchedSkill> {
    let mut seen = HashSet::new();

    bundle
        .matched_skills
        .iter()
        .filter_map(|candidate| {
            let skill = taxonomy.get(&candidate.name)?;

            let evidence: Vec<String> = candidate
                .evidence
                .iter()
                .filter(|term| skill.has_keyword(term))
                .take(MAX_EVIDENCE)
                .cloned()
                .collect();

            if evidence.is_empty() {
                return None;
            }

            Some(MatchedSkill {
                category: skill.category.clone(),
                name: skill.name.clone(),
                weight: skill.weight,
                evidence,
            })
        })
        .filter(|m| seen.insert(m.name.clone()))
        .collect()
}

//! Stage 4: final resume bullets.

use tracing::warn;

use crate::analysis::bundle::{sanitize_bullets, AnalysisBundle};
use crate::analysis::stages::gap_analysis::{GapAnalysisOutput, MissingSkillGroup};
use crate::analysis::stages::jd_parsing::ParsedJD;
use crate::analysis::stages::skill_matching::{MatchedSkill, SkillMatchingOutput};
use crate::analysis::stages::{Stage, StageFailure};

pub const MIN_BULLETS: usize = 3;

pub struct BulletGenerationInput<'a> {
    pub parsed: &'a ParsedJD,
    pub matched: &'a SkillMatchingOutput,
    pub gaps: &'a GapAnalysisOutput,
    pub bundle: &'a AnalysisBundle,
}

pub struct BulletGeneration;

impl Stage for BulletGeneration {
    const NAME: &'static str = "Bullet Generation Skill";
    const DESCRIPTION: &'static str =
        "Generate final resume bullets from shared LLM bundle with deterministic fallback safeguards.";
}

impl BulletGeneration {
    pub fn run(input: BulletGenerationInput<'_>) -> Result<Vec<String>, StageFailure> {
        let bullets = sanitize_bullets(&input.bundle.bullets);
        if bullets.len() >= MIN_BULLETS {
            return Ok(bullets);
        }

        warn!(
            "Only {} usable bullets in bundle for a {}-token JD; using fallback bullets",
            bullets.len(),
            input.parsed.tokens.len()
        );
        let fallback = sanitize_bullets(fallback_bullets(
            &input.matched.matched_skills,
            &input.gaps.missing_skills,
        ));

        if fallback.len() < MIN_BULLETS {
            return Err(StageFailure::SanitizationExhausted {
                produced: fallback.len(),
                required: MIN_BULLETS,
            });
        }
        Ok(fallback)
    }
}

/// Three deterministic bullets built from the top two matches and the first gap group.
pub fn fallback_bullets(matched: &[MatchedSkill], gaps: &[MissingSkillGroup]) -> Vec<String> {
    let top_matched = matched
        .iter()
        .take(2)
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let top_gaps = gaps
        .first()
        .map(|g| {
            g.suggestions
                .iter()
                .take(2)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();

    let domains = if top_matched.is_empty() {
        "core engineering"
    } else {
        top_matched.as_str()
    };
    let gap_clause = if top_gaps.is_empty() {
        "for follow-up roadmap planning".to_string()
    } else {
        format!("including {top_gaps}")
    };

    vec![
        format!("Built a skill-driven analysis pipeline aligned to JD signals across {domains} domains."),
        "Implemented orchestrated skill execution and persisted structured analysis results for history replay."
            .to_string(),
        format!("Identified high-priority capability gaps {gap_clause} to improve role fit."),
    ]
}

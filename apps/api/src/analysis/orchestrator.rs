//! Orchestrator: runs the four stages in fixed order and scores the result.
//!
//! Flow: produce bundle, JD parsing, skill matching, gap analysis,
//! bullet generation, scoring.
//!
//! All-or-nothing: the first failing stage aborts the run with its name attached.
//! Fallbacks happen inside stages, never across them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::bundle::AnalysisBundle;
use crate::analysis::producer::BundleProducer;
use crate::analysis::stages::bullet_generation::BulletGenerationInput;
use crate::analysis::stages::gap_analysis::{GapAnalysisInput, MissingSkillGroup};
use crate::analysis::stages::jd_parsing::JdParsingInput;
use crate::analysis::stages::skill_matching::{MatchedSkill, SkillMatchingInput};
use crate::analysis::stages::{
    BulletGeneration, ExecutedSkill, GapAnalysis, JdParsing, SkillMatching, Stage, StageError,
    StageFailure,
};
use crate::analysis::taxonomy::Taxonomy;

/// Name used to tag failures of the upfront bundle request.
pub const BUNDLE_STEP: &str = "Analysis Bundle";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: u8,
}

/// Final, immutable output of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub score: u8,
    pub summary: String,
    pub executed_skills: Vec<ExecutedSkill>,
    pub category_scores: Vec<CategoryScore>,
    pub matched_skills: Vec<MatchedSkill>,
    pub missing_skills: Vec<MissingSkillGroup>,
    pub bullets: Vec<String>,
}

/// Runs the full pipeline: one bundle request, then the four stages.
pub async fn run_analysis(
    jd_text: &str,
    producer: &dyn BundleProducer,
    taxonomy: &Taxonomy,
) -> Result<AnalysisResult, StageError> {
    info!("Requesting analysis bundle ({} chars of JD)", jd_text.len());
    let bundle = producer
        .produce(jd_text, taxonomy)
        .await
        .map_err(|e| StageError::new(BUNDLE_STEP, e))?;

    run_stages(jd_text, &bundle, taxonomy)
}

/// Deterministic part of the pipeline, given an already-validated bundle.
pub fn run_stages(
    jd_text: &str,
    bundle: &AnalysisBundle,
    taxonomy: &Taxonomy,
) -> Result<AnalysisResult, StageError> {
    let parsed = tagged::<JdParsing, _>(JdParsing::run(JdParsingInput { jd_text, bundle }))?;

    let matched = tagged::<SkillMatching, _>(SkillMatching::run(SkillMatchingInput {
        parsed: &parsed,
        bundle,
        taxonomy,
    }))?;

    let gaps = tagged::<GapAnalysis, _>(GapAnalysis::run(GapAnalysisInput {
        matched: &matched,
        bundle,
        taxonomy,
    }))?;

    let bullets = tagged::<BulletGeneration, _>(BulletGeneration::run(BulletGenerationInput {
        parsed: &parsed,
        matched: &matched,
        gaps: &gaps,
        bundle,
    }))?;

    let score = overall_score(&matched.matched_skills, taxonomy);
    let summary = build_summary(
        score,
        matched.matched_skills.len(),
        gaps.missing_skills.len(),
        &gaps.summary,
    );

    info!(
        "Analysis complete: score={}/100, matched={}, gap_groups={}, bullets={}",
        score,
        matched.matched_skills.len(),
        gaps.missing_skills.len(),
        bullets.len()
    );

    Ok(AnalysisResult {
        score,
        summary,
        executed_skills: executed_skills(),
        category_scores: category_scores(&matched.matched_skills, taxonomy),
        matched_skills: matched.matched_skills,
        missing_skills: gaps.missing_skills,
        bullets,
    })
}

fn tagged<S: Stage, T>(result: Result<T, StageFailure>) -> Result<T, StageError> {
    match result {
        Ok(output) => {
            debug!("Stage completed: {}", S::NAME);
            Ok(output)
        }
        Err(failure) => Err(StageError::new(S::NAME, failure)),
    }
}

/// The audit trail, always the four stages in pipeline order.
pub fn executed_skills() -> Vec<ExecutedSkill> {
    vec![
        JdParsing::info(),
        SkillMatching::info(),
        GapAnalysis::info(),
        BulletGeneration::info(),
    ]
}

/// round(100 * matched / total), clamped to [0, 100]; 0 when total is 0.
pub fn ratio_score(matched_weight: u32, total_weight: u32) -> u8 {
    if total_weight == 0 {
        return 0;
    }
    let ratio = f64::from(matched_weight) / f64::from(total_weight) * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

pub fn overall_score(matched: &[MatchedSkill], taxonomy: &Taxonomy) -> u8 {
    let matched_weight = matched.iter().map(|m| m.weight).sum();
    ratio_score(matched_weight, taxonomy.total_weight())
}

/// One score per taxonomy category, in taxonomy order.
pub fn category_scores(matched: &[MatchedSkill], taxonomy: &Taxonomy) -> Vec<CategoryScore> {
    taxonomy
        .categories()
        .iter()
        .map(|category| {
            let matched_weight = matched
                .iter()
                .filter(|m| &m.category == category)
                .map(|m| m.weight)
                .sum();
            CategoryScore {
                category: category.clone(),
                score: ratio_score(matched_weight, taxonomy.category_weight(category)),
            }
        })
        .collect()
}

fn build_summary(score: u8, matched_count: usize, missing_category_count: usize, gap_summary: &str) -> String {
    format!(
        "JD coverage score {score}/100 with {matched_count} matched skills across taxonomy. \
         {gap_summary} Missing categories: {missing_category_count}."
    )
}

//! Stage 3: high-priority capability gaps, grouped by category.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::bundle::{dedup, AnalysisBundle};
use crate::analysis::stages::skill_matching::{MatchedSkill, SkillMatchingOutput};
use crate::analysis::stages::{Stage, StageFailure};
use crate::analysis::taxonomy::Taxonomy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingSkillGroup {
    pub category: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysisOutput {
    pub missing_skills: Vec<MissingSkillGroup>,
    pub summary: String,
}

pub struct GapAnalysisInput<'a> {
    pub matched: &'a SkillMatchingOutput,
    pub bundle: &'a AnalysisBundle,
    pub taxonomy: &'a Taxonomy,
}

pub struct GapAnalysis;

impl Stage for GapAnalysis {
    const NAME: &'static str = "Gap Analysis Skill";
    const DESCRIPTION: &'static str =
        "Detect high-priority missing skills by category and summarize gaps.";
}

impl GapAnalysis {
    pub fn run(input: GapAnalysisInput<'_>) -> Result<GapAnalysisOutput, StageFailure> {
        let mut missing_skills = filter_bundle_gaps(input.bundle, input.taxonomy);

        if missing_skills.is_empty() {
            missing_skills = fallback_gaps(&input.matched.matched_skills, input.taxonomy);
            warn!(
                "No valid gap groups in bundle; taxonomy fallback produced {} groups",
                missing_skills.len()
            );
        }

        let summary = match input.bundle.summary.trim() {
            "" => fallback_summary(missing_skills.len()),
            s => s.to_string(),
        };

        Ok(GapAnalysisOutput {
            missing_skills,
            summary,
        })
    }
}

/// Keeps only bundle gap groups whose suggestions are high-weight taxonomy skills
/// of the stated category. Suggestions are mapped to their canonical names.
pub fn filter_bundle_gaps(bundle: &AnalysisBundle, taxonomy: &Taxonomy) -> Vec<MissingSkillGroup> {
    // category -> (lowercased name -> canonical name), high-weight skills only
    let mut allowed: HashMap<&str, HashMap<String, &str>> = HashMap::new();
    for skill in taxonomy.high_weight() {
        allowed
            .entry(skill.category.as_str())
            .or_default()
            .insert(skill.name.to_lowercase(), skill.name.as_str());
    }

    bundle
        .missing_skills
        .iter()
        .filter_map(|group| {
            let category = group.category.trim();
            let names = allowed.get(category)?;

            let suggestions = dedup(
                group
                    .suggestions
                    .iter()
                    .filter_map(|s| names.get(&s.trim().to_lowercase()))
                    .map(|canonical| canonical.to_string()),
            );

            if suggestions.is_empty() {
                return None;
            }

            Some(MissingSkillGroup {
                category: category.to_string(),
                suggestions,
            })
        })
        .collect()
}

/// Every high-weight skill not already matched, grouped by category in taxonomy order.
pub fn fallback_gaps(matched: &[MatchedSkill], taxonomy: &Taxonomy) -> Vec<MissingSkillGroup> {
    let matched_names: HashSet<&str> = matched.iter().map(|m| m.name.as_str()).collect();

    taxonomy
        .categories()
        .iter()
        .filter_map(|category| {
            let suggestions: Vec<String> = taxonomy
                .high_weight()
                .filter(|s| &s.category == category && !matched_names.contains(s.name.as_str()))
                .map(|s| s.name.clone())
                .collect();

            (!suggestions.is_empty()).then(|| MissingSkillGroup {
                category: category.clone(),
                suggestions,
            })
        })
        .collect()
}

pub fn fallback_summary(group_count: usize) -> String {
    format!("Detected {group_count} categories with high-priority capability gaps.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::bundle::CandidateGap;
    use crate::analysis::taxonomy::skill;

    fn gap(category: &str, suggestions: &[&str]) -> CandidateGap {
        CandidateGap {
            category: category.to_string(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matched(name: &str, category: &str, weight: u32) -> MatchedSkill {
        MatchedSkill {
            category: category.to_string(),
            name: name.to_string(),
            weight,
            evidence: vec!["x".to_string()],
        }
    }

    fn run(bundle: &AnalysisBundle, matched: &SkillMatchingOutput, taxonomy: &Taxonomy) -> GapAnalysisOutput {
        GapAnalysis::run(GapAnalysisInput {
            matched,
            bundle,
            taxonomy,
        })
        .unwrap()
    }

    #[test]
    fn test_valid_suggestions_mapped_to_canonical_names() {
        let taxonomy = Taxonomy::standard().unwrap();
        let bundle = AnalysisBundle {
            missing_skills: vec![gap("Data Engineering", &["data pipeline", "DATA MODELING", "Spark"])],
            summary: "Missing data work.".to_string(),
            ..Default::default()
        };
        let out = run(&bundle, &SkillMatchingOutput::default(), &taxonomy);
        assert_eq!(out.missing_skills.len(), 1);
        assert_eq!(
            out.missing_skills[0].suggestions,
            vec!["Data Pipeline", "Data Modeling"]
        );
        assert_eq!(out.summary, "Missing data work.");
    }

    #[test]
    fn test_low_weight_and_cross_category_suggestions_dropped() {
        let taxonomy = Taxonomy::standard().unwrap();
        let bundle = AnalysisBundle {
            missing_skills: vec![
                // weight 3, below threshold
                gap("Frontend Engineering", &["Performance Optimization"]),
                // valid skill, wrong category
                gap("AI / LLM", &["API Design"]),
                gap("Made Up", &["API Design"]),
                gap("AI / LLM", &["Prompt Engineering"]),
            ],
            ..Default::default()
        };
        let groups = filter_bundle_gaps(&bundle, &taxonomy);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, "AI / LLM");
        assert_eq!(groups[0].suggestions, vec!["Prompt Engineering"]);
    }

    #[test]
    fn test_every_output_suggestion_is_high_weight_in_its_category() {
        let taxonomy = Taxonomy::standard().unwrap();
        let bundle = AnalysisBundle {
            missing_skills: vec![
                gap("System / Infra", &["Cloud Infrastructure", "reliability engineering", "Model Evaluation"]),
                gap("Experiment / AB Test", &["Growth Analytics", "Experiment Design"]),
            ],
            ..Default::default()
        };
        let out = run(&bundle, &SkillMatchingOutput::default(), &taxonomy);
        for group in &out.missing_skills {
            for suggestion in &group.suggestions {
                let skill = taxonomy.get(suggestion).unwrap();
                assert_eq!(skill.category, group.category);
                assert!(skill.weight >= 4);
            }
        }
    }

    #[test]
    fn test_empty_bundle_gaps_use_taxonomy_fallback() {
        let taxonomy = Taxonomy::standard().unwrap();
        let matched_output = SkillMatchingOutput {
            matched_skills: vec![
                matched("API Design", "Backend Engineering", 5),
                matched("Service Architecture", "Backend Engineering", 4),
                matched("Data Pipeline", "Data Engineering", 5),
            ],
        };
        let bundle = AnalysisBundle {
            missing_skills: vec![gap("Backend Engineering", &["Not A Skill"])],
            ..Default::default()
        };
        let out = run(&bundle, &matched_output, &taxonomy);

        let categories: Vec<&str> = out.missing_skills.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(
            categories,
            vec![
                "Frontend Engineering",
                "Data Engineering",
                "AI / LLM",
                "System / Infra",
                "Experiment / AB Test"
            ]
        );
        assert_eq!(out.missing_skills[1].suggestions, vec!["Data Modeling"]);
        assert_eq!(
            out.missing_skills[3].suggestions,
            vec!["Cloud Infrastructure", "Reliability Engineering"]
        );
    }

    #[test]
    fn test_fallback_empty_when_everything_high_weight_is_matched() {
        let taxonomy = Taxonomy::new(vec![
            skill("A", "Cat", &["a"], 5),
            skill("B", "Cat", &["b"], 2),
        ])
        .unwrap();
        let groups = fallback_gaps(&[matched("A", "Cat", 5)], &taxonomy);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_blank_summary_uses_group_count() {
        let taxonomy = Taxonomy::standard().unwrap();
        let bundle = AnalysisBundle {
            summary: "   ".to_string(),
            ..Default::default()
        };
        let out = run(&bundle, &SkillMatchingOutput::default(), &taxonomy);
        assert_eq!(out.missing_skills.len(), 6);
        assert_eq!(
            out.summary,
            "Detected 6 categories with high-priority capability gaps."
        );
    }
}

//! Skill taxonomy: the closed reference set every stage validates against.
//!
//! Built once at startup and shared read-only behind an `Arc`. Stages receive it
//! by reference so tests can run the pipeline over alternate taxonomies.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Skills at or above this weight are "high importance" and eligible as gap suggestions.
pub const HIGH_WEIGHT_THRESHOLD: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub name: String,
    pub category: String,
    pub keywords: Vec<String>,
    pub weight: u32,
}

impl SkillDefinition {
    pub fn is_high_weight(&self) -> bool {
        self.weight >= HIGH_WEIGHT_THRESHOLD
    }

    /// Returns true if `term` is one of this skill's keywords, ignoring case.
    pub fn has_keyword(&self, term: &str) -> bool {
        let term = term.trim();
        self.keywords.iter().any(|k| k.eq_ignore_ascii_case(term))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("skill name cannot be blank")]
    BlankName,

    #[error("duplicate skill name '{0}' (names are case-insensitive)")]
    DuplicateName(String),

    #[error("skill '{0}' has no category")]
    BlankCategory(String),

    #[error("skill '{0}' has no keywords")]
    EmptyKeywords(String),

    #[error("skill '{0}' must have a positive weight")]
    ZeroWeight(String),
}

/// Immutable skill taxonomy with precomputed lookups.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    skills: Vec<SkillDefinition>,
    categories: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl Taxonomy {
    /// Validates and indexes a set of skill definitions.
    pub fn new(skills: Vec<SkillDefinition>) -> Result<Self, TaxonomyError> {
        let mut seen = HashSet::new();
        for skill in &skills {
            if skill.name.trim().is_empty() {
                return Err(TaxonomyError::BlankName);
            }
            if !seen.insert(skill.name.trim().to_lowercase()) {
                return Err(TaxonomyError::DuplicateName(skill.name.clone()));
            }
            if skill.category.trim().is_empty() {
                return Err(TaxonomyError::BlankCategory(skill.name.clone()));
            }
            if skill.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(TaxonomyError::EmptyKeywords(skill.name.clone()));
            }
            if skill.weight == 0 {
                return Err(TaxonomyError::ZeroWeight(skill.name.clone()));
            }
        }
        Ok(Self::index(skills))
    }

    /// The built-in engineering taxonomy used by the service, validated like any other.
    pub fn standard() -> Result<Self, TaxonomyError> {
        let skills = STANDARD_SKILLS
            .iter()
            .map(|(name, category, keywords, weight)| SkillDefinition {
                name: name.to_string(),
                category: category.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                weight: *weight,
            })
            .collect();
        Self::new(skills)
    }

    fn index(skills: Vec<SkillDefinition>) -> Self {
        let mut categories: Vec<String> = Vec::new();
        let mut by_name = HashMap::with_capacity(skills.len());

        for (idx, skill) in skills.iter().enumerate() {
            if !categories.contains(&skill.category) {
                categories.push(skill.category.clone());
            }
            by_name.insert(skill.name.trim().to_lowercase(), idx);
        }

        Self {
            skills,
            categories,
            by_name,
        }
    }

    pub fn skills(&self) -> &[SkillDefinition] {
        &self.skills
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Case-insensitive lookup by skill name.
    pub fn get(&self, name: &str) -> Option<&SkillDefinition> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.skills[idx])
    }

    pub fn high_weight(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.iter().filter(|s| s.is_high_weight())
    }

    pub fn total_weight(&self) -> u32 {
        self.skills.iter().map(|s| s.weight).sum()
    }

    pub fn category_weight(&self, category: &str) -> u32 {
        self.skills
            .iter()
            .filter(|s| s.category == category)
            .map(|s| s.weight)
            .sum()
    }
}

const STANDARD_SKILLS: &[(&str, &str, &[&str], u32)] = &[
    (
        "API Design",
        "Backend Engineering",
        &["api", "rest", "graphql", "endpoint", "microservice"],
        5,
    ),
    (
        "Service Architecture",
        "Backend Engineering",
        &["distributed", "service", "backend", "scalable", "high availability"],
        4,
    ),
    (
        "React UI Architecture",
        "Frontend Engineering",
        &["react", "next.js", "frontend", "ui", "component"],
        4,
    ),
    (
        "Performance Optimization",
        "Frontend Engineering",
        &["performance", "web vitals", "lazy loading", "bundle", "rendering"],
        3,
    ),
    (
        "Data Pipeline",
        "Data Engineering",
        &["etl", "pipeline", "airflow", "batch", "stream"],
        5,
    ),
    (
        "Data Modeling",
        "Data Engineering",
        &["data model", "warehouse", "schema", "sql", "analytics"],
        4,
    ),
    (
        "Prompt Engineering",
        "AI / LLM",
        &["prompt", "llm", "agent", "rag", "embedding"],
        4,
    ),
    (
        "Model Evaluation",
        "AI / LLM",
        &["evaluation", "accuracy", "hallucination", "benchmark", "inference"],
        3,
    ),
    (
        "Cloud Infrastructure",
        "System / Infra",
        &["aws", "gcp", "kubernetes", "terraform", "observability"],
        4,
    ),
    (
        "Reliability Engineering",
        "System / Infra",
        &["slo", "sla", "incident", "monitoring", "resilience"],
        4,
    ),
    (
        "Experiment Design",
        "Experiment / AB Test",
        &["a/b", "experiment", "hypothesis", "metric", "statistical"],
        4,
    ),
    (
        "Growth Analytics",
        "Experiment / AB Test",
        &["conversion", "retention", "funnel", "cohort", "uplift"],
        3,
    ),
];

#[cfg(test)]
pub(crate) fn skill(name: &str, category: &str, keywords: &[&str], weight: u32) -> SkillDefinition {
    SkillDefinition {
        name: name.to_string(),
        category: category.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        weight,
    }
}

//! The four pipeline stages and their shared contract.
//!
//! Each stage is a pure function over already-validated inputs. The orchestrator
//! runs them in a fixed order and tags any failure with the stage's name.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::bundle::BundleError;

pub mod bullet_generation;
pub mod gap_analysis;
pub mod jd_parsing;
pub mod skill_matching;

pub use bullet_generation::BulletGeneration;
pub use gap_analysis::GapAnalysis;
pub use jd_parsing::JdParsing;
pub use skill_matching::SkillMatching;

/// A named step of the analysis pipeline.
///
/// Each stage also exposes an inherent `run(input) -> Result<_, StageFailure>`
/// taking its own borrowed input struct.
pub trait Stage {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn info() -> ExecutedSkill {
        ExecutedSkill {
            name: Self::NAME.to_string(),
            description: Self::DESCRIPTION.to_string(),
        }
    }
}

/// Audit-trail entry for a stage that ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedSkill {
    pub name: String,
    pub description: String,
}

/// Why a stage (or the bundle request feeding it) failed.
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Generative(#[from] BundleError),

    #[error("only {produced} bullets survived sanitization; at least {required} are required")]
    SanitizationExhausted { produced: usize, required: usize },
}

/// A stage failure tagged with the stage that raised it.
/// Displays as `[<stage name>] <original message>`.
#[derive(Debug, Error)]
#[error("[{stage}] {failure}")]
pub struct StageError {
    pub stage: &'static str,
    #[source]
    pub failure: StageFailure,
}

impl StageError {
    pub fn new(stage: &'static str, failure: impl Into<StageFailure>) -> Self {
        Self {
            stage,
            failure: failure.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_display_is_tagged() {
        let err = StageError::new(
            BulletGeneration::NAME,
            StageFailure::SanitizationExhausted {
                produced: 1,
                required: 3,
            },
        );
        assert_eq!(
            err.to_string(),
            "[Bullet Generation Skill] only 1 bullets survived sanitization; at least 3 are required"
        );
    }

    #[test]
    fn test_generative_failure_keeps_original_message() {
        let err = StageError::new("Analysis Bundle", BundleError::NotAnObject);
        assert!(err.to_string().starts_with("[Analysis Bundle] "));
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    fn test_info_copies_name_and_description() {
        let info = JdParsing::info();
        assert_eq!(info.name, JdParsing::NAME);
        assert_eq!(info.description, JdParsing::DESCRIPTION);
    }
}

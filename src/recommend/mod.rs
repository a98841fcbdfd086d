pub mod calculator;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::{Answer, Outcome};

pub use calculator::calculate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub recommendation: String,
    pub scores: BTreeMap<String, i64>,
    pub result: Option<Outcome>,
    pub answers: Vec<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_breaker: Option<String>,
    pub confidence: Confidence,
}

impl RecommendationResult {
    pub fn winning_score(&self) -> i64 {
        self.scores.get(&self.recommendation).copied().unwrap_or(0)
    }

    pub fn display_name(&self) -> &str {
        self.result
            .as_ref()
            .map(|o| o.name.as_str())
            .unwrap_or(self.recommendation.as_str())
    }

    pub fn ranked(&self) -> Vec<(&str, i64)> {
        let mut ranked = self
            .scores
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Confidence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("no answers provided")]
    MissingAnswers,
    #[error("invalid answer path: {0}")]
    InvalidAnswerPath(String),
    #[error("question not found: {0}")]
    QuestionNotFound(String),
    #[error("option `{option_id}` not found in question `{question_id}`")]
    OptionNotFound {
        question_id: String,
        option_id: String,
    },
    #[error("no recommendation could be determined from the given answers")]
    NoRecommendation,
}

impl CalculationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAnswers => "MISSING_ANSWERS",
            Self::InvalidAnswerPath(_) => "INVALID_ANSWER_PATH",
            Self::QuestionNotFound(_) => "QUESTION_NOT_FOUND",
            Self::OptionNotFound { .. } => "OPTION_NOT_FOUND",
            Self::NoRecommendation => "NO_RECOMMENDATION",
        }
    }
}

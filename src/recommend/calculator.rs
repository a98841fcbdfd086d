use std::collections::BTreeMap;

use crate::recommend::{CalculationError, Confidence, RecommendationResult};
use crate::tree::walk::walk_path;
use crate::tree::{Answer, DecisionTree};

pub const HIGH_CONFIDENCE_GAP: i64 = 5;
pub const MEDIUM_CONFIDENCE_GAP: i64 = 2;

pub const DOCUMENTATION_TIE_BREAK: &str = "Selected based on available documentation and guidance.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winner {
    pub key: String,
    pub tie_breaker: Option<String>,
}

pub fn calculate(
    tree: &DecisionTree,
    answers: &[Answer],
) -> Result<RecommendationResult, CalculationError> {
    let walked = validate_answer_path(tree, answers)?;
    let scores = accumulate_scores(tree, walked);
    let winner = determine_winner(tree, &scores)?;
    let confidence = classify_confidence(&scores, &winner.key);

    Ok(RecommendationResult {
        result: tree.outcome(&winner.key).cloned(),
        recommendation: winner.key,
        scores,
        answers: answers.to_vec(),
        tie_breaker: winner.tie_breaker,
        confidence,
    })
}

pub fn validate_answer_path<'a>(
    tree: &DecisionTree,
    answers: &'a [Answer],
) -> Result<&'a [Answer], CalculationError> {
    if answers.is_empty() {
        return Err(CalculationError::MissingAnswers);
    }
    let progress = walk_path(tree, answers)?;
    if let Some(pending) = progress.pending {
        return Err(CalculationError::InvalidAnswerPath(format!(
            "did not reach a valid end node, question `{pending}` is unanswered"
        )));
    }
    Ok(&answers[..progress.walked])
}

pub fn accumulate_scores(tree: &DecisionTree, answers: &[Answer]) -> BTreeMap<String, i64> {
    let mut scores = BTreeMap::new();
    for answer in answers {
        let Some(option) = tree
            .question(&answer.question_id)
            .and_then(|q| q.option(&answer.option_id))
        else {
            continue;
        };
        for (key, points) in &option.scores {
            let total = scores.entry(key.clone()).or_insert(0i64);
            *total = total.saturating_add(*points);
        }
    }
    scores
}

pub fn determine_winner(
    tree: &DecisionTree,
    scores: &BTreeMap<String, i64>,
) -> Result<Winner, CalculationError> {
    let max = scores
        .values()
        .copied()
        .max()
        .ok_or(CalculationError::NoRecommendation)?;
    // BTreeMap iteration keeps the tied keys in ascending order.
    let tied = scores
        .iter()
        .filter(|(_, v)| **v == max)
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>();

    if let [only] = tied.as_slice() {
        return Ok(Winner {
            key: (*only).to_string(),
            tie_breaker: None,
        });
    }

    let documented = tied
        .iter()
        .filter(|key| tree.outcome(key).is_some())
        .collect::<Vec<_>>();
    if let [only] = documented.as_slice() {
        return Ok(Winner {
            key: (**only).to_string(),
            tie_breaker: Some(DOCUMENTATION_TIE_BREAK.to_string()),
        });
    }

    let key = tied[0].to_string();
    let tie_breaker = format!(
        "Multiple options scored equally ({}) with {max} points each. Selected {key} \
         alphabetically; review your requirements, since several options were equally suitable.",
        tied.join(", ")
    );
    Ok(Winner {
        key,
        tie_breaker: Some(tie_breaker),
    })
}

/// A score shared by several outcomes competes with itself, so a tie at the top is low confidence.
pub fn classify_confidence(scores: &BTreeMap<String, i64>, winner: &str) -> Confidence {
    let winner_score = scores.get(winner).copied().unwrap_or(0);
    let shared_top = scores.values().filter(|v| **v == winner_score).count() > 1;
    let second_highest = scores
        .values()
        .copied()
        .filter(|v| *v != winner_score || shared_top)
        .max()
        .unwrap_or(0);

    let difference = winner_score.saturating_sub(second_highest);
    if difference >= HIGH_CONFIDENCE_GAP {
        Confidence::High
    } else if difference >= MEDIUM_CONFIDENCE_GAP {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

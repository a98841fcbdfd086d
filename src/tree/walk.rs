use crate::recommend::CalculationError;
use crate::tree::{Answer, DecisionTree, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathProgress<'a> {
    pub walked: usize,
    pub pending: Option<&'a str>,
}

impl PathProgress<'_> {
    pub fn is_complete(&self) -> bool {
        self.pending.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkStep<'a> {
    Ask(&'a Question),
    Complete,
}

pub fn walk_path<'a>(
    tree: &'a DecisionTree,
    answers: &[Answer],
) -> Result<PathProgress<'a>, CalculationError> {
    let entry = tree.entry_question().ok_or_else(|| {
        CalculationError::InvalidAnswerPath(format!("tree `{}` has no entry question", tree.id))
    })?;

    let mut pending = Some(entry.id.as_str());
    let mut walked = 0usize;
    for answer in answers {
        let Some(expected) = pending else {
            break;
        };
        if answer.question_id != expected {
            return Err(CalculationError::InvalidAnswerPath(format!(
                "expected an answer to `{expected}`, got `{}`",
                answer.question_id
            )));
        }
        let question = tree
            .question(&answer.question_id)
            .ok_or_else(|| CalculationError::QuestionNotFound(answer.question_id.clone()))?;
        let option =
            question
                .option(&answer.option_id)
                .ok_or_else(|| CalculationError::OptionNotFound {
                    question_id: answer.question_id.clone(),
                    option_id: answer.option_id.clone(),
                })?;
        pending = option.next_question_id.as_deref();
        walked += 1;
    }

    Ok(PathProgress { walked, pending })
}

pub fn next_step<'a>(
    tree: &'a DecisionTree,
    answers: &[Answer],
) -> Result<WalkStep<'a>, CalculationError> {
    let progress = walk_path(tree, answers)?;
    match progress.pending {
        None => Ok(WalkStep::Complete),
        Some(id) => tree
            .question(id)
            .map(WalkStep::Ask)
            .ok_or_else(|| CalculationError::QuestionNotFound(id.to_string())),
    }
}

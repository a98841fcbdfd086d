use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTree {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub results: BTreeMap<String, Outcome>,
}

impl DecisionTree {
    pub fn entry_question(&self) -> Option<&Question> {
        self.questions.first()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn outcome(&self, key: &str) -> Option<&Outcome> {
        self.results.get(key)
    }

    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let canonical = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn option_by_choice(&self, input: &str) -> Option<&AnswerOption> {
        let input = input.trim();
        match input.parse::<usize>() {
            Ok(n) if n >= 1 => self.options.get(n - 1),
            _ => self.option(input),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `None` marks a terminal option.
    #[serde(default)]
    pub next_question_id: Option<String>,
    #[serde(default)]
    pub scores: BTreeMap<String, i64>,
}

impl AnswerOption {
    pub fn is_terminal(&self) -> bool {
        self.next_question_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub name: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub tradeoffs: Vec<String>,
    #[serde(default)]
    pub when_to_reconsider: String,
    #[serde(default)]
    pub best_for: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub option_id: String,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            option_id: option_id.into(),
        }
    }
}

impl Display for Answer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.question_id, self.option_id)
    }
}

#[derive(Debug, Error)]
#[error("invalid answer `{0}`, expected <question>=<option>")]
pub struct AnswerParseError(pub String);

impl FromStr for Answer {
    type Err = AnswerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (question, option) = s
            .split_once('=')
            .or_else(|| s.split_once(':'))
            .ok_or_else(|| AnswerParseError(s.to_string()))?;
        let (question, option) = (question.trim(), option.trim());
        if question.is_empty() || option.is_empty() {
            return Err(AnswerParseError(s.to_string()));
        }
        Ok(Answer::new(question, option))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Answer, DecisionTree};

    #[test]
    fn deserializes_camel_case_tree() {
        let tree: DecisionTree = serde_json::from_value(json!({
            "id": "db",
            "title": "Database",
            "questions": [{
                "id": "q1",
                "text": "Need joins?",
                "options": [
                    { "id": "yes", "label": "Yes", "nextQuestionId": null, "scores": { "postgres": 3 } }
                ]
            }],
            "results": {
                "postgres": {
                    "name": "PostgreSQL",
                    "reasoning": "Relational",
                    "tradeoffs": ["Ops overhead"],
                    "whenToReconsider": "Schemaless data",
                    "bestFor": "OLTP"
                }
            }
        }))
        .expect("tree should deserialize");

        let entry = tree.entry_question().expect("missing entry question");
        assert_eq!(entry.id, "q1");
        let option = entry.option("yes").expect("missing option");
        assert!(option.is_terminal());
        assert_eq!(option.scores.get("postgres"), Some(&3));
        assert_eq!(
            tree.outcome("postgres").map(|o| o.when_to_reconsider.as_str()),
            Some("Schemaless data")
        );
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let mut tree: DecisionTree = serde_json::from_value(json!({
            "id": "t",
            "title": "T",
            "questions": [{ "id": "q1", "text": "?", "options": [{ "id": "a", "label": "A" }] }],
            "results": {}
        }))
        .expect("tree should deserialize");
        let first = tree.fingerprint().expect("fingerprint");
        assert_eq!(first, tree.fingerprint().expect("fingerprint"));
        assert_eq!(first.len(), 64);
        tree.title = "Changed".to_string();
        assert_ne!(first, tree.fingerprint().expect("fingerprint"));
    }

    #[test]
    fn resolves_choice_by_number_or_id() {
        let tree: DecisionTree = serde_json::from_value(json!({
            "id": "t",
            "title": "T",
            "questions": [{ "id": "q1", "text": "?", "options": [
                { "id": "a", "label": "A" },
                { "id": "b", "label": "B" }
            ]}],
            "results": {}
        }))
        .expect("tree should deserialize");
        let question = tree.entry_question().expect("entry question");
        assert_eq!(question.option_by_choice("2").map(|o| o.id.as_str()), Some("b"));
        assert_eq!(question.option_by_choice(" a ").map(|o| o.id.as_str()), Some("a"));
        assert!(question.option_by_choice("0").is_none());
        assert!(question.option_by_choice("3").is_none());
        assert!(question.option_by_choice("zzz").is_none());
    }

    #[test]
    fn parses_answers_from_cli_syntax() {
        let answer: Answer = "q1=opt1".parse().expect("failed to parse answer");
        assert_eq!(answer, Answer::new("q1", "opt1"));
        let answer: Answer = " q2 : opt3 ".parse().expect("failed to parse answer");
        assert_eq!(answer, Answer::new("q2", "opt3"));
        assert!("q1".parse::<Answer>().is_err());
        assert!("=opt".parse::<Answer>().is_err());
    }
}

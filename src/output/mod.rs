pub mod csv;
pub mod table;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::render_json;
    use crate::recommend::{Confidence, RecommendationResult};
    use crate::tree::Answer;

    #[test]
    fn json_uses_wire_field_names() {
        let result = RecommendationResult {
            recommendation: "a".to_string(),
            scores: BTreeMap::from([("a".to_string(), 5), ("b".to_string(), 5)]),
            result: None,
            answers: vec![Answer::new("q1", "opt1")],
            tie_breaker: Some("tie".to_string()),
            confidence: Confidence::Low,
        };
        let value: serde_json::Value =
            serde_json::from_str(&render_json(&result).expect("render")).expect("parse");
        assert_eq!(value["tieBreaker"], "tie");
        assert_eq!(value["confidence"], "low");
        assert_eq!(value["answers"][0]["questionId"], "q1");
        assert_eq!(value["scores"]["b"], 5);
    }
}

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::recommend::RecommendationResult;
use crate::share::ShareRecord;
use crate::tree::{Question, TreeSummary};
use crate::validate::{Severity, ValidationReport};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_recommendation(result: &RecommendationResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Rank", "Outcome", "Score"]);
    for (idx, (outcome, score)) in result.ranked().into_iter().enumerate() {
        let name = Cell::new(outcome);
        let name = if outcome == result.recommendation {
            name.fg(Color::Green)
        } else {
            name
        };
        table.add_row(Row::from(vec![
            Cell::new(idx + 1),
            name,
            Cell::new(score),
        ]));
    }

    let mut out = format!(
        "Recommendation: {} ({} confidence)\n",
        result.display_name(),
        result.confidence
    );
    if let Some(outcome) = &result.result {
        if !outcome.reasoning.is_empty() {
            out.push_str(&format!("\n{}\n", outcome.reasoning));
        }
        if !outcome.best_for.is_empty() {
            out.push_str(&format!("\nBest for: {}\n", outcome.best_for));
        }
        if !outcome.tradeoffs.is_empty() {
            out.push_str("\nTrade-offs:\n");
            for tradeoff in &outcome.tradeoffs {
                out.push_str(&format!("  - {tradeoff}\n"));
            }
        }
        if !outcome.when_to_reconsider.is_empty() {
            out.push_str(&format!(
                "\nWhen to reconsider: {}\n",
                outcome.when_to_reconsider
            ));
        }
    }
    if let Some(tie_breaker) = &result.tie_breaker {
        out.push_str(&format!("\nNote: {tie_breaker}\n"));
    }
    out.push('\n');
    out.push_str(&table.to_string());
    out
}

pub fn render_share_record(record: &ShareRecord) -> String {
    format!(
        "{}\nShare id: {} (tree {}, created {})",
        render_recommendation(&record.result),
        record.share_id,
        record.tree_id,
        record.created_at.to_rfc3339()
    )
}

pub fn render_validation_table(reports: &[(String, ValidationReport)]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Source", "Severity", "Location", "Message"]);
    for (source, report) in reports {
        for (severity, issue) in report.issues() {
            let label = match severity {
                Severity::Error => Cell::new("ERROR").fg(Color::Red),
                Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
            };
            table.add_row(Row::from(vec![
                Cell::new(source),
                label,
                Cell::new(&issue.path),
                Cell::new(&issue.message),
            ]));
        }
    }

    let mut out = reports
        .iter()
        .map(|(source, report)| format!("{source}: {}", report.summary()))
        .collect::<Vec<_>>()
        .join("\n");
    if reports.iter().any(|(_, r)| !r.errors.is_empty() || !r.warnings.is_empty()) {
        out.push('\n');
        out.push_str(&table.to_string());
    }
    out
}

pub fn render_trees_table(trees: &[TreeSummary]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Id", "Title", "Questions", "Outcomes", "Fingerprint"]);
    for tree in trees {
        table.add_row(vec![
            tree.id.clone(),
            tree.title.clone(),
            tree.question_count.to_string(),
            tree.outcome_count.to_string(),
            tree.fingerprint.chars().take(12).collect::<String>(),
        ]);
    }
    table.to_string()
}

pub fn render_question(question: &Question, step: usize) -> String {
    let mut out = format!("{step}. {}\n", question.text);
    if let Some(description) = &question.description {
        out.push_str(&format!("   {description}\n"));
    }
    for (idx, option) in question.options.iter().enumerate() {
        out.push_str(&format!("   [{}] {}\n", idx + 1, option.label));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{render_question, render_recommendation};
    use crate::recommend::{Confidence, RecommendationResult};
    use crate::tree::{AnswerOption, Outcome, Question};

    #[test]
    fn recommendation_includes_descriptor_and_tie_note() {
        let result = RecommendationResult {
            recommendation: "a".to_string(),
            scores: BTreeMap::from([("a".to_string(), 5), ("b".to_string(), 5)]),
            result: Some(Outcome {
                name: "Alpha".to_string(),
                reasoning: "Because".to_string(),
                tradeoffs: vec!["Costly".to_string()],
                when_to_reconsider: "Later".to_string(),
                best_for: "Tests".to_string(),
            }),
            answers: Vec::new(),
            tie_breaker: Some("Multiple options scored equally".to_string()),
            confidence: Confidence::Low,
        };
        let rendered = render_recommendation(&result);
        assert!(rendered.starts_with("Recommendation: Alpha (low confidence)"));
        assert!(rendered.contains("  - Costly"));
        assert!(rendered.contains("Note: Multiple options scored equally"));
    }

    #[test]
    fn question_prompt_numbers_options() {
        let question = Question {
            id: "q1".to_string(),
            text: "Pick one".to_string(),
            description: None,
            options: vec![
                AnswerOption {
                    id: "x".to_string(),
                    label: "First".to_string(),
                    description: None,
                    next_question_id: None,
                    scores: BTreeMap::new(),
                },
                AnswerOption {
                    id: "y".to_string(),
                    label: "Second".to_string(),
                    description: None,
                    next_question_id: None,
                    scores: BTreeMap::new(),
                },
            ],
        };
        assert_eq!(
            render_question(&question, 2),
            "2. Pick one\n   [1] First\n   [2] Second\n"
        );
    }
}

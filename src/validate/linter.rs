use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use crate::validate::reachability::{explore, QuestionGraph};
use crate::validate::ValidationReport;

/// Max relative distance between an outcome's peak score and the average peak.
pub const SCORE_BALANCE_TOLERANCE: f64 = 0.5;

pub fn validate_tree(raw: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(tree) = raw.as_object() else {
        report.error("", "tree must be a JSON object");
        return report;
    };
    report.tree_id = non_empty_str(tree.get("id")).map(str::to_string);

    check_shape(tree, &mut report);

    let questions = tree
        .get("questions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let results = tree.get("results").and_then(Value::as_object);

    check_questions(questions, &mut report);
    check_references(questions, results, &mut report);
    check_reachability(questions, &mut report);
    if let Some(results) = results {
        check_results(results, &mut report);
    }
    check_score_balance(questions, &mut report);

    report
}

fn check_shape(tree: &Map<String, Value>, report: &mut ValidationReport) {
    if non_empty_str(tree.get("id")).is_none() {
        report.error("id", "tree must have an id");
    }
    if non_empty_str(tree.get("title")).is_none() {
        report.error("title", "tree must have a title");
    }
    match tree.get("questions") {
        Some(Value::Array(questions)) if !questions.is_empty() => {}
        Some(Value::Array(_)) => report.error("questions", "tree must have at least one question"),
        _ => report.error("questions", "tree must have a questions array"),
    }
    match tree.get("results") {
        Some(Value::Object(results)) if !results.is_empty() => {}
        Some(Value::Object(_)) => report.error("results", "tree must define at least one result"),
        _ => report.error("results", "tree must have a results object"),
    }
}

fn check_questions(questions: &[Value], report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    for (qi, question) in questions.iter().enumerate() {
        let path = format!("questions[{qi}]");
        let Some(question) = question.as_object() else {
            report.error(path, "question must be an object");
            continue;
        };

        match non_empty_str(question.get("id")) {
            Some(id) => {
                if !seen.insert(id) {
                    report.error(format!("{path}.id"), format!("duplicate question id `{id}`"));
                }
            }
            None => report.error(format!("{path}.id"), "question must have an id"),
        }
        if non_empty_str(question.get("text")).is_none() {
            report.error(format!("{path}.text"), "question must have text");
        }

        match question.get("options").and_then(Value::as_array) {
            Some(options) if !options.is_empty() => check_options(&path, options, report),
            _ => report.error(
                format!("{path}.options"),
                "question must have at least one option",
            ),
        }
    }
}

fn check_options(question_path: &str, options: &[Value], report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    for (oi, option) in options.iter().enumerate() {
        let path = format!("{question_path}.options[{oi}]");
        let Some(option) = option.as_object() else {
            report.error(path, "option must be an object");
            continue;
        };

        match non_empty_str(option.get("id")) {
            Some(id) => {
                if !seen.insert(id) {
                    report.error(format!("{path}.id"), format!("duplicate option id `{id}`"));
                }
            }
            None => report.error(format!("{path}.id"), "option must have an id"),
        }
        if non_empty_str(option.get("label")).is_none() {
            report.error(format!("{path}.label"), "option must have a label");
        }

        let scores_path = format!("{path}.scores");
        let Some(scores) = option.get("scores").and_then(Value::as_object) else {
            report.error(scores_path, "option must have a scores object");
            continue;
        };
        if scores.is_empty() {
            report.warning(scores_path, "option does not score any outcome");
            continue;
        }
        for (key, value) in scores {
            if !value.is_number() {
                report.error(
                    format!("{scores_path}.{key}"),
                    format!("score for `{key}` must be a number"),
                );
            } else if value.as_i64().is_none() {
                report.error(
                    format!("{scores_path}.{key}"),
                    format!("score for `{key}` must be a whole number"),
                );
            }
        }
    }
}

fn check_references(
    questions: &[Value],
    results: Option<&Map<String, Value>>,
    report: &mut ValidationReport,
) {
    let ids = questions
        .iter()
        .filter_map(|q| non_empty_str(q.get("id")))
        .collect::<HashSet<_>>();
    let mut unknown_outcomes: BTreeMap<&str, String> = BTreeMap::new();

    for (qi, question) in questions.iter().enumerate() {
        let own_id = non_empty_str(question.get("id"));
        for (oi, option) in options_of(question).iter().enumerate() {
            let path = format!("questions[{qi}].options[{oi}]");
            match option.get("nextQuestionId") {
                None | Some(Value::Null) => {}
                Some(Value::String(next)) => {
                    if Some(next.as_str()) == own_id {
                        report.error(
                            format!("{path}.nextQuestionId"),
                            format!("option points back to its own question `{next}`"),
                        );
                    } else if !ids.contains(next.as_str()) {
                        report.error(
                            format!("{path}.nextQuestionId"),
                            format!("nextQuestionId `{next}` does not match any question"),
                        );
                    }
                }
                Some(_) => report.error(
                    format!("{path}.nextQuestionId"),
                    "nextQuestionId must be a string or null",
                ),
            }

            let Some(scores) = option.get("scores").and_then(Value::as_object) else {
                continue;
            };
            for key in scores.keys() {
                let known = results.is_some_and(|r| r.contains_key(key));
                if !known {
                    unknown_outcomes
                        .entry(key.as_str())
                        .or_insert_with(|| format!("{path}.scores.{key}"));
                }
            }
        }
    }

    for (key, first_seen) in unknown_outcomes {
        report.error(
            first_seen,
            format!("outcome `{key}` is scored but has no entry in results"),
        );
    }
}

fn check_reachability(questions: &[Value], report: &mut ValidationReport) {
    let Some(entry) = questions.first().and_then(|q| non_empty_str(q.get("id"))) else {
        return;
    };
    let ids = questions
        .iter()
        .filter_map(|q| non_empty_str(q.get("id")))
        .collect::<HashSet<_>>();

    let mut graph = QuestionGraph::new();
    for question in questions {
        let Some(id) = non_empty_str(question.get("id")) else {
            continue;
        };
        let edges = graph.entry(id).or_default();
        for option in options_of(question) {
            if let Some(next) = option.get("nextQuestionId").and_then(Value::as_str) {
                // Self references and dangling ids are reported by the reference check.
                if next != id && ids.contains(next) && !edges.contains(&next) {
                    edges.push(next);
                }
            }
        }
    }

    let reachability = explore(&graph, entry);
    for cycle in &reachability.cycles {
        report.error(
            "questions",
            format!("circular reference: {}", cycle.join(" -> ")),
        );
    }
    for (qi, question) in questions.iter().enumerate() {
        let Some(id) = non_empty_str(question.get("id")) else {
            continue;
        };
        if !reachability.reaches(id) {
            report.warning(
                format!("questions[{qi}]"),
                format!("question `{id}` is unreachable from entry question `{entry}`"),
            );
        }
    }
}

fn check_results(results: &Map<String, Value>, report: &mut ValidationReport) {
    for (key, result) in results {
        let path = format!("results.{key}");
        let Some(result) = result.as_object() else {
            report.error(path, "result must be an object");
            continue;
        };
        if non_empty_str(result.get("name")).is_none() {
            report.error(format!("{path}.name"), "result must have a name");
        }
        if non_empty_str(result.get("reasoning")).is_none() {
            report.warning(format!("{path}.reasoning"), "result has no reasoning");
        }
        let has_tradeoffs = result
            .get("tradeoffs")
            .and_then(Value::as_array)
            .is_some_and(|t| !t.is_empty());
        if !has_tradeoffs {
            report.warning(format!("{path}.tradeoffs"), "result lists no trade-offs");
        }
        if non_empty_str(result.get("whenToReconsider")).is_none() {
            report.warning(
                format!("{path}.whenToReconsider"),
                "result does not say when to reconsider",
            );
        }
    }
}

fn check_score_balance(questions: &[Value], report: &mut ValidationReport) {
    let mut peaks: BTreeMap<&str, f64> = BTreeMap::new();
    for question in questions {
        for option in options_of(question) {
            let Some(scores) = option.get("scores").and_then(Value::as_object) else {
                continue;
            };
            for (key, value) in scores {
                let Some(points) = value.as_f64() else {
                    continue;
                };
                peaks
                    .entry(key.as_str())
                    .and_modify(|peak| *peak = peak.max(points))
                    .or_insert(points);
            }
        }
    }
    if peaks.len() < 2 {
        return;
    }

    let average = peaks.values().sum::<f64>() / peaks.len() as f64;
    if average <= 0.0 {
        return;
    }
    for (key, peak) in peaks {
        let deviation = (peak - average).abs() / average;
        if deviation > SCORE_BALANCE_TOLERANCE {
            report.warning(
                format!("results.{key}"),
                format!(
                    "outcome `{key}` peaks at {peak} points, {:.0}% away from the average peak of {average:.1}; scoring may be unfair",
                    deviation * 100.0
                ),
            );
        }
    }
}

fn options_of(question: &Value) -> &[Value] {
    question
        .get("options")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

use anyhow::Result;

use crate::recommend::RecommendationResult;
use crate::tree::TreeSummary;
use crate::validate::ValidationReport;

pub fn scores_to_csv(result: &RecommendationResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["rank", "outcome", "score", "winner", "confidence"])?;
    for (idx, (outcome, score)) in result.ranked().into_iter().enumerate() {
        let winner = outcome == result.recommendation;
        writer.write_record([
            (idx + 1).to_string(),
            outcome.to_string(),
            score.to_string(),
            winner.to_string(),
            if winner {
                result.confidence.to_string()
            } else {
                String::new()
            },
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn reports_to_csv(reports: &[(String, ValidationReport)]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["source", "tree", "severity", "path", "message"])?;
    for (source, report) in reports {
        let tree = report.tree_id.clone().unwrap_or_default();
        for (severity, issue) in report.issues() {
            writer.write_record([
                source.clone(),
                tree.clone(),
                format!("{severity:?}").to_lowercase(),
                issue.path.clone(),
                issue.message.clone(),
            ])?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn trees_to_csv(trees: &[TreeSummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["id", "title", "questions", "outcomes", "fingerprint"])?;
    for tree in trees {
        writer.write_record([
            tree.id.clone(),
            tree.title.clone(),
            tree.question_count.to_string(),
            tree.outcome_count.to_string(),
            tree.fingerprint.clone(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

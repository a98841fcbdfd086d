use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::tree::schema::DecisionTree;
use crate::validate::{validate_tree, ValidationReport};

pub trait TreeRepository: Send + Sync {
    fn get(&self, id: &str) -> Option<Arc<DecisionTree>>;
    fn list(&self) -> Vec<Arc<DecisionTree>>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TreeSummary {
    pub id: String,
    pub title: String,
    pub question_count: usize,
    pub outcome_count: usize,
    pub fingerprint: String,
}

impl TryFrom<&DecisionTree> for TreeSummary {
    type Error = serde_json::Error;

    fn try_from(tree: &DecisionTree) -> Result<Self, Self::Error> {
        Ok(Self {
            id: tree.id.clone(),
            title: tree.title.clone(),
            question_count: tree.questions.len(),
            outcome_count: tree.results.len(),
            fingerprint: tree.fingerprint()?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTreeRepository {
    trees: BTreeMap<String, Arc<DecisionTree>>,
    summaries: BTreeMap<String, TreeSummary>,
}

impl InMemoryTreeRepository {
    pub fn from_trees(trees: impl IntoIterator<Item = DecisionTree>) -> Result<Self> {
        let mut repo = Self::default();
        for tree in trees {
            repo.insert(tree)?;
        }
        Ok(repo)
    }

    pub fn insert(&mut self, tree: DecisionTree) -> Result<()> {
        if self.trees.contains_key(&tree.id) {
            bail!("duplicate tree id: {}", tree.id);
        }
        let summary = TreeSummary::try_from(&tree)
            .with_context(|| format!("failed fingerprinting tree {}", tree.id))?;
        self.summaries.insert(tree.id.clone(), summary);
        self.trees.insert(tree.id.clone(), Arc::new(tree));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn summaries(&self) -> Vec<TreeSummary> {
        self.summaries.values().cloned().collect()
    }
}

impl TreeRepository for InMemoryTreeRepository {
    fn get(&self, id: &str) -> Option<Arc<DecisionTree>> {
        self.trees.get(id).cloned()
    }

    fn list(&self) -> Vec<Arc<DecisionTree>> {
        self.trees.values().cloned().collect()
    }
}

pub fn load_file(path: &Path) -> Result<(ValidationReport, Option<DecisionTree>)> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading tree file: {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing tree JSON: {}", path.display()))?;
    let report = validate_tree(&raw);
    if !report.is_valid() {
        return Ok((report, None));
    }
    let tree = serde_json::from_value(raw)
        .with_context(|| format!("failed decoding tree: {}", path.display()))?;
    Ok((report, Some(tree)))
}

/// Trees with validation errors are skipped when `skip_invalid` is set and fail the load otherwise.
pub fn load_dir(dir: &Path, skip_invalid: bool) -> Result<InMemoryTreeRepository> {
    let mut repo = InMemoryTreeRepository::default();
    for path in tree_files(dir)? {
        let (report, tree) = load_file(&path)?;
        for warning in &report.warnings {
            warn!("{}: {warning}", path.display());
        }
        let Some(tree) = tree else {
            if skip_invalid {
                for error in &report.errors {
                    warn!("{}: {error}", path.display());
                }
                warn!("skipping invalid tree file {}", path.display());
                continue;
            }
            return Err(anyhow!(
                "invalid tree file {}: {}",
                path.display(),
                report
                    .errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            ));
        };
        debug!("loaded tree {} from {}", tree.id, path.display());
        repo.insert(tree)
            .with_context(|| format!("while loading {}", path.display()))?;
    }
    info!("loaded {} decision trees from {}", repo.len(), dir.display());
    Ok(repo)
}

pub fn tree_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed reading trees directory: {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::{load_dir, InMemoryTreeRepository, TreeRepository};
    use crate::tree::DecisionTree;

    fn tree_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Tree {id}"),
            "questions": [{ "id": "q1", "text": "Pick", "options": [
                { "id": "a", "label": "A", "nextQuestionId": null, "scores": { "x": 1 } }
            ]}],
            "results": {
                "x": { "name": "X", "reasoning": "r", "tradeoffs": ["t"], "whenToReconsider": "w", "bestFor": "b" }
            }
        })
    }

    #[test]
    fn rejects_duplicate_tree_ids() {
        let tree: DecisionTree = serde_json::from_value(tree_json("one")).expect("tree");
        let result = InMemoryTreeRepository::from_trees(vec![tree.clone(), tree]);
        assert!(result.is_err());
    }

    #[test]
    fn loads_valid_trees_and_skips_invalid_ones() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("one.json"), tree_json("one").to_string()).expect("write");
        fs::write(dir.path().join("broken.json"), json!({ "id": "broken" }).to_string())
            .expect("write");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let repo = load_dir(dir.path(), true).expect("load failed");
        assert_eq!(repo.len(), 1);
        let tree = repo.get("one").expect("tree one missing");
        assert_eq!(tree.title, "Tree one");
        assert!(repo.get("broken").is_none());
        assert_eq!(repo.list().len(), 1);
        let summaries = repo.summaries();
        let summary = &summaries[0];
        assert_eq!(summary.question_count, 1);
        assert_eq!(summary.fingerprint, tree.fingerprint().expect("fingerprint"));
    }

    #[test]
    fn strict_loading_fails_on_invalid_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("broken.json"), json!({ "id": "broken" }).to_string())
            .expect("write");
        let err = load_dir(dir.path(), false).expect_err("strict load should fail");
        assert!(err.to_string().contains("tree must have a title"));
    }

    #[test]
    fn bundled_trees_load_cleanly() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("trees");
        let repo = load_dir(&dir, false).expect("bundled trees should be valid");
        assert!(!repo.is_empty());
        assert!(repo.get("database").is_some());
    }
}

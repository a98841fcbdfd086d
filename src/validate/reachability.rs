use std::collections::{BTreeMap, BTreeSet};

pub type QuestionGraph<'v> = BTreeMap<&'v str, Vec<&'v str>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability<'v> {
    pub visited: BTreeSet<&'v str>,
    pub cycles: Vec<Vec<&'v str>>,
}

impl Reachability<'_> {
    pub fn reaches(&self, id: &str) -> bool {
        self.visited.contains(id)
    }
}

pub fn explore<'v>(graph: &QuestionGraph<'v>, entry: &'v str) -> Reachability<'v> {
    let mut walker = Walker {
        graph,
        visited: BTreeSet::new(),
        path: Vec::new(),
        cycles: Vec::new(),
    };
    walker.visit(entry);
    Reachability {
        visited: walker.visited,
        cycles: walker.cycles,
    }
}

struct Walker<'g, 'v> {
    graph: &'g QuestionGraph<'v>,
    visited: BTreeSet<&'v str>,
    path: Vec<&'v str>,
    cycles: Vec<Vec<&'v str>>,
}

impl<'v> Walker<'_, 'v> {
    fn visit(&mut self, node: &'v str) {
        if let Some(start) = self.path.iter().position(|n| *n == node) {
            let mut cycle = self.path[start..].to_vec();
            cycle.push(node);
            self.cycles.push(cycle);
            return;
        }
        if !self.visited.insert(node) {
            return;
        }

        self.path.push(node);
        let graph = self.graph;
        if let Some(next) = graph.get(node) {
            for &id in next {
                self.visit(id);
            }
        }
        self.path.pop();
    }
}

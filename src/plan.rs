//! Plan rendering and the grouped-input lint.
//!
//! [`explain`] walks a graph from its terminal node up to the sources and records one
//! [`ExplainStep`] per node visit. A node shared by several children is listed in full the
//! first time and as a back-reference afterwards.
//!
//! The lint tracks, for every node, the column sequence its output is known to be ordered
//! by:
//!
//! - **Source** -- unknown
//! - **Sort** -- its keys
//! - **Map** -- the parent's ordering (mappers are assumed not to rewrite those columns)
//! - **Reduce** -- its keys (runs come out in input order)
//! - **Join** -- its keys, or the left input's ordering for an empty key
//!
//! Input ordered by `O` is grouped on keys `K` when `K` is, as a set, a prefix of `O`.
//! An empty `K` is always grouped.

use crate::graph::Graph;
use crate::node::Node;
use crate::node_id::NodeId;
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// One line of an [`Explanation`].
#[derive(Clone, Debug)]
pub struct ExplainStep {
    pub id: NodeId,
    /// Distance from the terminal node.
    pub depth: usize,
    pub label: String,
    /// A Reduce or Join whose input is not provably grouped on its keys.
    pub ungrouped: bool,
    /// The node was already listed; its parents are not repeated.
    pub repeated: bool,
}

/// A rendered plan, terminal node first.
#[derive(Clone, Debug)]
pub struct Explanation {
    pub steps: Vec<ExplainStep>,
}

impl Explanation {
    /// Steps flagged by the grouped-input lint, each node once.
    pub fn ungrouped(&self) -> impl Iterator<Item = &ExplainStep> {
        self.steps.iter().filter(|s| s.ungrouped && !s.repeated)
    }
}

impl Display for Explanation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        writeln!(f, "EXECUTION PLAN")?;
        for step in &self.steps {
            write!(f, "{:indent$}{} {}", "", step.id, step.label, indent = 2 + step.depth * 2)?;
            if step.repeated {
                write!(f, " (shared, see above)")?;
            } else if step.ungrouped {
                write!(f, " [ungrouped input]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub(crate) fn explain(graph: &Graph) -> Explanation {
    let mut walker = Walker {
        steps: Vec::new(),
        seen: HashSet::new(),
        orderings: HashMap::new(),
    };
    walker.visit(graph, 0);
    Explanation {
        steps: walker.steps,
    }
}

struct Walker {
    steps: Vec<ExplainStep>,
    seen: HashSet<NodeId>,
    orderings: HashMap<NodeId, Option<Vec<String>>>,
}

impl Walker {
    fn visit(&mut self, graph: &Graph, depth: usize) {
        let id = graph.id();
        let node = graph.operation();
        let repeated = !self.seen.insert(id);
        let ungrouped = !repeated && !self.inputs_grouped(graph);
        self.steps.push(ExplainStep {
            id,
            depth,
            label: format!("{node:?}"),
            ungrouped,
            repeated,
        });
        if repeated {
            return;
        }
        for parent in graph.parents() {
            self.visit(parent, depth + 1);
        }
    }

    fn inputs_grouped(&mut self, graph: &Graph) -> bool {
        let node = graph.operation();
        if !node.is_grouped() {
            return true;
        }
        let keys = node.keys().unwrap_or_default();
        graph
            .parents()
            .iter()
            .all(|p| is_grouped_on(self.ordering(p).as_deref(), keys))
    }

    fn ordering(&mut self, graph: &Graph) -> Option<Vec<String>> {
        if let Some(known) = self.orderings.get(&graph.id()) {
            return known.clone();
        }
        let ordering = match graph.operation() {
            Node::Source(_) => None,
            Node::Sort { keys, .. } | Node::Reduce { keys, .. } => Some(keys.to_vec()),
            Node::Join { keys, .. } if !keys.is_empty() => Some(keys.to_vec()),
            Node::Join { .. } | Node::Map(_) => match graph.parents().first() {
                Some(parent) => self.ordering(parent),
                None => None,
            },
        };
        self.orderings.insert(graph.id(), ordering.clone());
        ordering
    }
}

fn is_grouped_on(ordering: Option<&[String]>, keys: &[String]) -> bool {
    if keys.is_empty() {
        return true;
    }
    let Some(ordering) = ordering else {
        return false;
    };
    if ordering.len() < keys.len() {
        return false;
    }
    let prefix: HashSet<&String> = ordering[..keys.len()].iter().collect();
    keys.iter().all(|k| prefix.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn prefix_in_any_order_is_grouped() {
        let ordering = cols(&["a", "b", "c"]);
        assert!(is_grouped_on(Some(&ordering), &cols(&["b", "a"])));
        assert!(!is_grouped_on(Some(&ordering), &cols(&["b"])));
        assert!(!is_grouped_on(None, &cols(&["a"])));
        assert!(is_grouped_on(None, &[]));
    }
}

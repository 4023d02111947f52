//! Planning: find conversion paths through the registry.
//!
//! Given a source and a target format, the planner searches the format
//! graph for the shortest sequence of converters that turns one into the
//! other. The graph is rebuilt from the registry on every call.

use crate::registry::Registry;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default bound on the number of hops in a plan.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A planned conversion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Steps in the plan, in execution order.
    pub steps: Vec<PlanStep>,
}

/// A single step in a conversion plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Converter ID.
    pub converter_id: String,
    /// Format consumed by this step.
    pub from: String,
    /// Format produced by this step.
    pub to: String,
}

impl Plan {
    /// Number of hops.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check if the plan is a single direct conversion.
    pub fn is_direct(&self) -> bool {
        self.steps.len() == 1
    }

    /// The chain of formats visited, source first.
    pub fn formats(&self) -> Vec<&str> {
        let mut formats = Vec::with_capacity(self.steps.len() + 1);
        if let Some(first) = self.steps.first() {
            formats.push(first.from.as_str());
        }
        formats.extend(self.steps.iter().map(|s| s.to.as_str()));
        formats
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formats().join(" -> "))
    }
}

/// The format graph: nodes are format tags, edges are registry entries.
#[derive(Debug)]
pub struct FormatGraph<'a> {
    registry: &'a Registry,
    nodes: IndexSet<&'a str>,
}

impl<'a> FormatGraph<'a> {
    /// Collect every format appearing on either side of a registry edge.
    pub fn build(registry: &'a Registry) -> Self {
        Self {
            registry,
            nodes: registry.formats(),
        }
    }

    /// Format tags in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.nodes.iter().copied()
    }

    /// Node index of a format.
    pub fn index_of(&self, format: &str) -> Option<usize> {
        self.nodes.get_index_of(format)
    }

    /// Breadth-first search from `from` to `to`.
    ///
    /// Edges are explored in registration order, so ties between equally
    /// short routes go to the earliest registered edges. An edge into a
    /// sink format is only traversable when that sink is the target.
    pub fn shortest_path(&self, from: &str, to: &str, max_depth: usize) -> Option<Plan> {
        let start = self.index_of(from)?;
        let goal = self.index_of(to)?;
        if start == goal {
            return None;
        }

        // Per node: (previous node, converter ID used to reach it, depth).
        let mut reached: Vec<Option<(usize, &'a str, usize)>> = vec![None; self.nodes.len()];
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();

        seen[start] = true;
        queue.push_back((start, 0usize));

        while let Some((node, depth)) = queue.pop_front() {
            if node == goal {
                break;
            }
            if depth >= max_depth {
                continue;
            }

            let name = self.nodes[node];
            for decl in self.registry.outgoing(name) {
                if decl.to != to && self.registry.is_sink(&decl.to) {
                    continue;
                }
                let Some(next) = self.index_of(&decl.to) else {
                    continue;
                };
                if seen[next] {
                    continue;
                }
                seen[next] = true;
                reached[next] = Some((node, decl.id.as_str(), depth + 1));
                queue.push_back((next, depth + 1));
            }
        }

        if !seen[goal] {
            return None;
        }

        let mut steps = Vec::new();
        let mut cur = goal;
        while cur != start {
            let (prev, converter_id, _) = reached[cur]?;
            steps.push(PlanStep {
                converter_id: converter_id.to_string(),
                from: self.nodes[prev].to_string(),
                to: self.nodes[cur].to_string(),
            });
            cur = prev;
        }
        steps.reverse();

        Some(Plan { steps })
    }
}

/// Planner for finding conversion paths.
pub struct Planner<'a> {
    registry: &'a Registry,
    max_depth: usize,
}

impl<'a> Planner<'a> {
    /// Create a new planner with the given registry.
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set maximum search depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Find a conversion path from `from` to `to`.
    ///
    /// Returns `None` when the formats are equal, either format is
    /// unknown, or no route obeys the sink rule.
    pub fn plan(&self, from: &str, to: &str) -> Option<Plan> {
        let plan = FormatGraph::build(self.registry).shortest_path(from, to, self.max_depth);
        match &plan {
            Some(plan) => tracing::debug!(%from, %to, hops = plan.len(), route = %plan, "planned route"),
            None => tracing::debug!(%from, %to, "no route"),
        }
        plan
    }

    /// Plan using a direct edge when one exists, searching otherwise.
    ///
    /// Both paths agree: a registered direct edge is always the route the
    /// search would return.
    pub fn plan_direct_first(&self, from: &str, to: &str) -> Option<Plan> {
        if let Some(decl) = self.registry.find_direct(from, to) {
            return Some(Plan {
                steps: vec![PlanStep {
                    converter_id: decl.id.clone(),
                    from: decl.from.clone(),
                    to: decl.to.clone(),
                }],
            });
        }
        tracing::debug!(%from, %to, "no direct converter, searching for a route");
        self.plan(from, to)
    }
}

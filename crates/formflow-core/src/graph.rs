//! Dependency graph between conditional fields.
//!
//! An edge `src → dst` means "`dst`'s visibility rule reads `src`'s value".
//! [`DependencyGraph::build`] orders the fields topologically (Kahn's
//! algorithm) so that every field is resolved after the field it reads.
//!
//! # Cycles
//!
//! Fields on a cycle never reach in-degree zero, and neither does anything
//! downstream of a cycle. Such fields are left out of the evaluation order
//! and reported by [`DependencyGraph::excluded`]; building never fails.
//!
//! # Unknown dependencies
//!
//! A rule reading an id that is not in the field list adds no edge. The
//! field is ordered like an unconditional one; it is the resolver that
//! keeps it hidden.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::model::FieldDefinition;

/// Topological evaluation order over a field list.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Dependency id → ids whose rule reads it, in declaration order.
    dependents: HashMap<String, Vec<String>>,
    /// Ids in a safe evaluation order.
    order: Vec<String>,
    /// Ids left out of `order` because of a cycle, in declaration order.
    excluded: Vec<String>,
}

impl DependencyGraph {
    /// Builds the graph and evaluation order for `fields`.
    ///
    /// Duplicate ids are ignored after their first definition.
    #[must_use]
    pub fn build(fields: &[FieldDefinition]) -> Self {
        let mut ids: Vec<&str> = Vec::with_capacity(fields.len());
        let mut edges: HashMap<&str, Vec<&str>> = HashMap::with_capacity(fields.len());
        let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(fields.len());

        for field in fields {
            if in_degree.insert(field.id.as_str(), 0).is_none() {
                ids.push(field.id.as_str());
                edges.insert(field.id.as_str(), Vec::new());
            }
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(ids.len());
        for field in fields {
            if !seen.insert(field.id.as_str()) {
                continue;
            }
            let Some(dependency) = field.depends_on() else {
                continue;
            };
            if let Some(list) = edges.get_mut(dependency) {
                list.push(field.id.as_str());
                *in_degree.entry(field.id.as_str()).or_insert(0) += 1;
            }
        }

        let mut queue: VecDeque<&str> = ids
            .iter()
            .copied()
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        let mut order: Vec<String> = Vec::with_capacity(ids.len());

        while let Some(current) = queue.pop_front() {
            order.push(current.to_string());
            for &dependent in edges.get(current).map_or(&[][..], Vec::as_slice) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        let excluded: Vec<String> = ids
            .iter()
            .filter(|id| in_degree.get(*id).is_some_and(|d| *d > 0))
            .map(|id| (*id).to_string())
            .collect();

        if !excluded.is_empty() {
            debug!(fields = ?excluded, "excluding fields on or behind a dependency cycle");
        }

        let dependents = edges
            .into_iter()
            .map(|(id, list)| {
                (
                    id.to_string(),
                    list.into_iter().map(str::to_string).collect(),
                )
            })
            .collect();

        Self {
            dependents,
            order,
            excluded,
        }
    }

    /// Field ids in evaluation order.
    #[must_use]
    pub fn evaluation_order(&self) -> &[String] {
        &self.order
    }

    /// Field ids left out of the order because of a cycle.
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Whether `id` was placed in the evaluation order.
    #[must_use]
    pub fn is_ordered(&self, id: &str) -> bool {
        self.order.iter().any(|o| o == id)
    }

    /// Ids of the fields whose rule reads `id` directly.
    #[must_use]
    pub fn dependents(&self, id: &str) -> &[String] {
        self.dependents.get(id).map_or(&[], Vec::as_slice)
    }
}

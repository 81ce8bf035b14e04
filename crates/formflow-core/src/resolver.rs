//! Initial visibility resolution.
//!
//! Walks a [`DependencyGraph`]'s evaluation order with a scratch value map,
//! so that each conditional field sees the already-resolved values of the
//! fields it reads.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::graph::DependencyGraph;
use crate::model::FieldDefinition;
use crate::rule::RuleEvaluator;
use crate::value::ValueMap;

/// Why a field is not visible after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenReason {
    /// The field is on, or depends on, a dependency cycle.
    Cycle,
    /// The field's rule reads an id that is not defined.
    UnknownDependency,
    /// The field's rule evaluated to hidden.
    ConditionUnmet,
}

/// Result of resolving the initial visible set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Visible field ids, in evaluation order.
    pub visible: Vec<String>,
    /// Initial values of the visible fields.
    pub values: ValueMap,
    /// Every field that is not visible, with the reason.
    pub hidden: BTreeMap<String, HiddenReason>,
}

impl Resolution {
    /// Whether `id` is visible.
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }
}

/// Resolves which fields start out visible and what they hold.
///
/// A field whose rule reads an unknown id is never evaluated; it stays
/// hidden regardless of its action or the operator policy.
#[must_use]
pub fn resolve_initial(
    fields: &[FieldDefinition],
    graph: &DependencyGraph,
    evaluator: &RuleEvaluator,
) -> Resolution {
    let definitions: BTreeMap<&str, &FieldDefinition> = fields
        .iter()
        .rev()
        .map(|field| (field.id.as_str(), field))
        .collect();

    let mut resolution = Resolution::default();

    for id in graph.evaluation_order() {
        let Some(field) = definitions.get(id.as_str()) else {
            continue;
        };

        if let Some(dependency) = field.depends_on() {
            if !definitions.contains_key(dependency) {
                debug!(field = %id, dependency, "dependency is not defined, keeping field hidden");
                resolution
                    .hidden
                    .insert(id.clone(), HiddenReason::UnknownDependency);
                continue;
            }
        }

        if evaluator.is_visible(field, &resolution.values) {
            resolution.values.insert(id.clone(), field.initial_value());
            resolution.visible.push(id.clone());
        } else {
            resolution
                .hidden
                .insert(id.clone(), HiddenReason::ConditionUnmet);
        }
    }

    for id in graph.excluded() {
        resolution.hidden.insert(id.clone(), HiddenReason::Cycle);
    }

    resolution
}

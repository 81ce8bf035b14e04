//! The live state of one form instance.
//!
//! [`FormStore`] owns a loaded [`FormConfig`] together with its
//! [`FormState`]. All mutation goes through the store, which keeps the
//! following true after every call:
//!
//! - every error key is also a value key (hiding a field drops its error)
//! - fields without a rule are always present
//! - fields on or behind a cycle, and fields reading an undefined id, are
//!   never present
//!
//! # Propagation
//!
//! [`FormStore::update_field`] re-evaluates only the fields whose rule reads
//! the edited field directly. A grandchild is reconsidered when its own
//! parent is edited, not when the parent is revealed or hidden.
//!
//! # Phases
//!
//! ```text
//! Empty ──initialize──▶ Configured ──validate──▶ Validated
//!   ▲                      ▲  │ update_field        │
//!   │                      │  ▼                     │
//!   └─clear_configuration──┴──┴──clear_form / update_field
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::graph::DependencyGraph;
use crate::model::{FieldDefinition, FormConfig};
use crate::resolver::{resolve_initial, HiddenReason};
use crate::rule::RuleEvaluator;
use crate::validation::{ValidationReport, Validator};
use crate::value::{FieldValue, ValueMap};

/// Where a store is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorePhase {
    /// No configuration loaded.
    #[default]
    Empty,
    /// A configuration is loaded and has been edited or reset since the
    /// last validation.
    Configured,
    /// The current values were validated.
    Validated,
}

impl fmt::Display for StorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Configured => "configured",
            Self::Validated => "validated",
        })
    }
}

/// Values and errors of the visible fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    field_values: ValueMap,
    field_errors: BTreeMap<String, String>,
}

impl FormState {
    /// Current values. A key's presence means the field is visible.
    #[must_use]
    pub fn field_values(&self) -> &ValueMap {
        &self.field_values
    }

    /// Current validation errors.
    #[must_use]
    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    /// Value of one field, if visible.
    #[must_use]
    pub fn value(&self, id: &str) -> Option<&FieldValue> {
        self.field_values.get(id)
    }

    /// Error recorded for one field.
    #[must_use]
    pub fn error(&self, id: &str) -> Option<&str> {
        self.field_errors.get(id).map(String::as_str)
    }

    /// Whether `id` is currently visible.
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.field_values.contains_key(id)
    }

    /// Whether no errors are recorded.
    #[must_use]
    pub fn is_form_valid(&self) -> bool {
        self.field_errors.is_empty()
    }
}

/// Fields revealed and hidden by one [`FormStore::update_field`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldUpdate {
    /// Ids that became visible, in config order.
    pub revealed: Vec<String>,
    /// Ids that were removed, in config order.
    pub hidden: Vec<String>,
}

impl FieldUpdate {
    /// Whether visibility stayed the same.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.revealed.is_empty() && self.hidden.is_empty()
    }
}

/// Values accepted by [`FormStore::submit`], in config order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    values: Vec<(String, FieldValue)>,
}

impl Submission {
    /// The submitted `(id, value)` pairs.
    #[must_use]
    pub fn values(&self) -> &[(String, FieldValue)] {
        &self.values
    }

    /// The submitted value of one field.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    /// Number of submitted fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Submission {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (id, value) in &self.values {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

/// Outcome of [`FormStore::prefill`].
#[derive(Debug, Default)]
pub struct Prefill {
    /// Ids whose value was applied, in input order.
    pub applied: Vec<String>,
    /// Ids that were skipped, with the reason.
    pub rejected: Vec<(String, FormError)>,
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    /// No configuration is loaded.
    #[error("no form configuration is loaded")]
    NotConfigured,

    /// The id is not defined by the loaded configuration.
    #[error("unknown field `{id}`")]
    UnknownField {
        /// The requested id.
        id: String,
    },

    /// The field exists but is currently hidden.
    #[error("field `{id}` is not visible")]
    HiddenField {
        /// The requested id.
        id: String,
    },

    /// Submission was refused because validation failed.
    #[error("form has {} invalid field(s)", .report.len())]
    Invalid {
        /// The failing validation.
        report: ValidationReport,
    },
}

/// Owns one form's configuration and state.
#[derive(Debug, Clone, Default)]
pub struct FormStore {
    config: Option<FormConfig>,
    graph: DependencyGraph,
    excluded: BTreeMap<String, HiddenReason>,
    state: FormState,
    phase: StorePhase,
    evaluator: RuleEvaluator,
    validator: Validator,
}

impl FormStore {
    /// Creates an empty store with default engine settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store using `config`'s engine settings.
    #[must_use]
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            evaluator: config.evaluator(),
            validator: config.validator(),
            ..Self::default()
        }
    }

    /// Loads `config`, replacing any previous configuration and state.
    ///
    /// Never fails: cycles and undefined dependencies only keep the
    /// affected fields hidden.
    pub fn initialize(&mut self, config: FormConfig) -> &FormState {
        let graph = DependencyGraph::build(&config.fields);
        let resolution = resolve_initial(&config.fields, &graph, &self.evaluator);

        info!(
            title = %config.form_title,
            fields = config.fields.len(),
            visible = resolution.visible.len(),
            "initialized form"
        );

        self.excluded = resolution
            .hidden
            .into_iter()
            .filter(|(_, reason)| *reason != HiddenReason::ConditionUnmet)
            .collect();
        self.state = FormState {
            field_values: resolution.values,
            field_errors: BTreeMap::new(),
        };
        self.graph = graph;
        self.config = Some(config);
        self.phase = StorePhase::Configured;
        &self.state
    }

    /// Sets one visible field's value and reconciles its direct dependents.
    ///
    /// Clears the field's own error without re-validating. Dependents that
    /// now match are inserted with their initial value; dependents that no
    /// longer match are removed together with their error.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotConfigured`] without a configuration,
    /// [`FormError::UnknownField`] for an undefined id, and
    /// [`FormError::HiddenField`] for a field that is not visible.
    pub fn update_field(
        &mut self,
        id: &str,
        value: impl Into<FieldValue>,
    ) -> Result<FieldUpdate, FormError> {
        let config = self.config.as_ref().ok_or(FormError::NotConfigured)?;
        if !config.contains(id) {
            return Err(FormError::UnknownField { id: id.to_string() });
        }
        if !self.state.is_visible(id) {
            return Err(FormError::HiddenField { id: id.to_string() });
        }

        self.state.field_values.insert(id.to_string(), value.into());
        self.state.field_errors.remove(id);

        let mut update = FieldUpdate::default();
        for dependent_id in self.graph.dependents(id) {
            let Some(dependent) = config.field(dependent_id) else {
                continue;
            };
            let should_show = self.evaluator.is_visible(dependent, &self.state.field_values);
            let present = self.state.is_visible(dependent_id);

            if should_show && !present {
                debug!(field = %dependent_id, source = id, "revealing field");
                self.state
                    .field_values
                    .insert(dependent_id.clone(), dependent.initial_value());
                update.revealed.push(dependent_id.clone());
            } else if !should_show && present {
                debug!(field = %dependent_id, source = id, "hiding field");
                self.state.field_values.remove(dependent_id);
                self.state.field_errors.remove(dependent_id);
                update.hidden.push(dependent_id.clone());
            }
        }

        self.phase = StorePhase::Configured;
        Ok(update)
    }

    /// Applies `(id, value)` pairs in order through [`FormStore::update_field`].
    ///
    /// A pair that is rejected is skipped and reported; later pairs still
    /// apply. Because pairs are applied in order, a parent listed before its
    /// child reveals the child in time for the child's own value.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotConfigured`] without a configuration.
    pub fn prefill<I, K, V>(&mut self, values: I) -> Result<Prefill, FormError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        if self.config.is_none() {
            return Err(FormError::NotConfigured);
        }

        let mut prefill = Prefill::default();
        for (id, value) in values {
            let id = id.into();
            match self.update_field(&id, value) {
                Ok(_) => prefill.applied.push(id),
                Err(err) => {
                    debug!(field = %id, error = %err, "skipping prefill value");
                    prefill.rejected.push((id, err));
                }
            }
        }
        Ok(prefill)
    }

    /// Resets every visible field to its initial value and clears all
    /// errors. Visibility is left as it is.
    pub fn clear_form(&mut self) {
        let config = self.config.as_ref();
        for (id, value) in &mut self.state.field_values {
            *value = config
                .and_then(|c| c.field(id))
                .map_or_else(FieldValue::empty_text, FieldDefinition::initial_value);
        }
        self.state.field_errors.clear();
        if self.config.is_some() {
            self.phase = StorePhase::Configured;
        }
        debug!(fields = self.state.field_values.len(), "cleared form values");
    }

    /// Drops the configuration and all state.
    pub fn clear_configuration(&mut self) {
        self.config = None;
        self.graph = DependencyGraph::default();
        self.excluded.clear();
        self.state = FormState::default();
        self.phase = StorePhase::Empty;
        debug!("cleared form configuration");
    }

    /// Validates the visible fields and records the errors.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotConfigured`] without a configuration.
    pub fn validate(&mut self) -> Result<ValidationReport, FormError> {
        let config = self.config.as_ref().ok_or(FormError::NotConfigured)?;
        let report = self.validator.validate(config, &self.state.field_values);
        self.state.field_errors = report.errors().clone();
        self.phase = StorePhase::Validated;
        Ok(report)
    }

    /// Validates and, when valid, returns the visible values and resets the
    /// form with [`FormStore::clear_form`].
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] when validation fails (values are
    /// kept and the errors recorded), or [`FormError::NotConfigured`].
    pub fn submit(&mut self) -> Result<Submission, FormError> {
        let report = self.validate()?;
        if !report.is_valid() {
            return Err(FormError::Invalid { report });
        }

        let values = self
            .visible_fields()
            .filter_map(|field| {
                self.state
                    .value(&field.id)
                    .map(|value| (field.id.clone(), value.clone()))
            })
            .collect();

        info!("form submitted");
        self.clear_form();
        Ok(Submission { values })
    }

    /// The visible fields' definitions, in config order.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.config
            .iter()
            .flat_map(|config| config.fields.iter())
            .filter(move |field| self.state.is_visible(&field.id))
    }

    /// Why `id` is hidden, or `None` if it is visible or undefined.
    #[must_use]
    pub fn hidden_reason(&self, id: &str) -> Option<HiddenReason> {
        let config = self.config.as_ref()?;
        if !config.contains(id) || self.state.is_visible(id) {
            return None;
        }
        Some(
            self.excluded
                .get(id)
                .copied()
                .unwrap_or(HiddenReason::ConditionUnmet),
        )
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> Option<&FormConfig> {
        self.config.as_ref()
    }

    /// The current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> StorePhase {
        self.phase
    }

    /// The rule evaluator in use.
    #[must_use]
    pub fn evaluator(&self) -> &RuleEvaluator {
        &self.evaluator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConditionalRule, FieldType, Operator};

    fn user_type_form() -> FormConfig {
        FormConfig::new(
            "T",
            vec![
                FieldDefinition::new("userType", FieldType::Select, "User type"),
                FieldDefinition::new("businessName", FieldType::Text, "Business name")
                    .required()
                    .with_conditional(ConditionalRule::show(
                        "userType",
                        Operator::Equals,
                        Some("business".into()),
                    )),
            ],
        )
    }

    fn loaded(config: FormConfig) -> FormStore {
        let mut store = FormStore::new();
        store.initialize(config);
        store
    }

    mod update_field {
        use super::*;

        #[test]
        fn reveals_and_hides_direct_dependents() {
            let mut store = loaded(user_type_form());

            let update = store.update_field("userType", "business").unwrap();
            assert_eq!(update.revealed, ["businessName"]);
            assert_eq!(
                store.state().value("businessName"),
                Some(&FieldValue::empty_text())
            );

            let update = store.update_field("userType", "individual").unwrap();
            assert_eq!(update.hidden, ["businessName"]);
            assert!(!store.state().is_visible("businessName"));
        }

        #[test]
        fn keeps_value_of_dependent_that_stays_visible() {
            let mut store = loaded(user_type_form());
            store.update_field("userType", "business").unwrap();
            store.update_field("businessName", "Acme").unwrap();

            let update = store.update_field("userType", "business").unwrap();
            assert!(update.is_unchanged());
            assert_eq!(
                store.state().value("businessName"),
                Some(&FieldValue::text("Acme"))
            );
        }

        #[test]
        fn clears_own_error_only() {
            let mut store = loaded(FormConfig::new(
                "T",
                vec![
                    FieldDefinition::new("a", FieldType::Text, "A").required(),
                    FieldDefinition::new("b", FieldType::Text, "B").required(),
                ],
            ));
            store.validate().unwrap();
            assert_eq!(store.state().field_errors().len(), 2);

            store.update_field("a", "x").unwrap();
            assert_eq!(store.state().error("a"), None);
            assert_eq!(store.state().error("b"), Some("B is required"));
            assert_eq!(store.phase(), StorePhase::Configured);
        }

        #[test]
        fn rejects_bad_targets() {
            let mut store = FormStore::new();
            assert_eq!(
                store.update_field("userType", "x"),
                Err(FormError::NotConfigured)
            );

            store.initialize(user_type_form());
            assert_eq!(
                store.update_field("ghost", "x"),
                Err(FormError::UnknownField {
                    id: "ghost".to_string()
                })
            );
            assert_eq!(
                store.update_field("businessName", "x"),
                Err(FormError::HiddenField {
                    id: "businessName".to_string()
                })
            );
        }
    }

    mod clearing {
        use super::*;

        #[test]
        fn clear_form_resets_values_and_keeps_visibility() {
            let mut store = loaded(user_type_form());
            store.update_field("userType", "business").unwrap();
            store.update_field("businessName", "Acme").unwrap();
            store.validate().unwrap();

            store.clear_form();

            // userType resets to "", but businessName stays visible.
            assert_eq!(
                store.state().value("userType"),
                Some(&FieldValue::empty_text())
            );
            assert_eq!(
                store.state().value("businessName"),
                Some(&FieldValue::empty_text())
            );
            assert!(store.state().field_errors().is_empty());
            assert_eq!(store.phase(), StorePhase::Configured);
        }

        #[test]
        fn clear_configuration_empties_everything() {
            let mut store = loaded(user_type_form());
            store.clear_configuration();

            assert!(store.config().is_none());
            assert!(store.state().field_values().is_empty());
            assert_eq!(store.phase(), StorePhase::Empty);
            assert_eq!(store.validate(), Err(FormError::NotConfigured));
        }
    }

    mod submit {
        use super::*;

        #[test]
        fn valid_form_returns_values_and_resets() {
            let mut store = loaded(user_type_form());
            store.update_field("userType", "business").unwrap();
            store.update_field("businessName", "Acme").unwrap();

            let submission = store.submit().unwrap();
            assert_eq!(submission.len(), 2);
            assert_eq!(submission.values()[0].0, "userType");
            assert_eq!(submission.get("businessName"), Some(&FieldValue::text("Acme")));
            assert_eq!(
                store.state().value("businessName"),
                Some(&FieldValue::empty_text())
            );
        }

        #[test]
        fn invalid_form_keeps_values_and_records_errors() {
            let mut store = loaded(user_type_form());
            store.update_field("userType", "business").unwrap();

            let Err(FormError::Invalid { report }) = store.submit() else {
                panic!("expected invalid submission");
            };
            assert_eq!(report.error("businessName"), Some("Business name is required"));
            assert_eq!(
                store.state().value("userType"),
                Some(&FieldValue::text("business"))
            );
            assert!(!store.state().is_form_valid());
            assert_eq!(store.phase(), StorePhase::Validated);
        }

        #[test]
        fn submission_serializes_in_field_order() {
            let mut store = loaded(FormConfig::new(
                "T",
                vec![
                    FieldDefinition::new("z", FieldType::Text, "Z").with_default("1"),
                    FieldDefinition::new("a", FieldType::Checkbox, "A"),
                ],
            ));
            let submission = store.submit().unwrap();
            assert_eq!(
                serde_json::to_string(&submission).unwrap(),
                r#"{"z":"1","a":false}"#
            );
        }
    }

    #[test]
    fn prefill_applies_in_order_and_reports_rejections() {
        let mut store = loaded(user_type_form());

        let prefill = store
            .prefill([
                ("businessName", FieldValue::text("early")),
                ("userType", FieldValue::text("business")),
                ("businessName", FieldValue::text("Acme")),
                ("ghost", FieldValue::text("x")),
            ])
            .unwrap();

        assert_eq!(prefill.applied, ["userType", "businessName"]);
        assert_eq!(prefill.rejected.len(), 2);
        assert_eq!(
            store.state().value("businessName"),
            Some(&FieldValue::text("Acme"))
        );
    }

    #[test]
    fn hidden_reasons() {
        let mut store = loaded(FormConfig::new(
            "T",
            vec![
                FieldDefinition::new("a", FieldType::Text, "A").with_conditional(
                    ConditionalRule::show("b", Operator::IsNotEmpty, None),
                ),
                FieldDefinition::new("b", FieldType::Text, "B").with_conditional(
                    ConditionalRule::show("a", Operator::IsNotEmpty, None),
                ),
                FieldDefinition::new("c", FieldType::Text, "C").with_conditional(
                    ConditionalRule::show("ghost", Operator::IsEmpty, None),
                ),
                FieldDefinition::new("d", FieldType::Text, "D"),
                FieldDefinition::new("e", FieldType::Text, "E").with_conditional(
                    ConditionalRule::show("d", Operator::IsNotEmpty, None),
                ),
            ],
        ));

        assert_eq!(store.hidden_reason("a"), Some(HiddenReason::Cycle));
        assert_eq!(store.hidden_reason("c"), Some(HiddenReason::UnknownDependency));
        assert_eq!(store.hidden_reason("e"), Some(HiddenReason::ConditionUnmet));
        assert_eq!(store.hidden_reason("d"), None);

        store.update_field("d", "x").unwrap();
        assert_eq!(store.hidden_reason("e"), None);
        let visible: Vec<&str> = store.visible_fields().map(|f| f.id.as_str()).collect();
        assert_eq!(visible, ["d", "e"]);
    }
}

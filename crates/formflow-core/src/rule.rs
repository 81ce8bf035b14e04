//! Conditional rule evaluation.
//!
//! A [`ConditionalRule`] reads the current value of one other field and
//! decides whether its owner is shown. [`RuleEvaluator`] applies the operator
//! against a value snapshot; [`RuleEvaluator::is_visible`] folds in the rule's
//! [`Action`].
//!
//! A field that is not present in the snapshot (hidden, or never resolved)
//! reads as a missing value: it is empty, stringifies as `""` and has no
//! numeric reading.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{Action, ConditionalRule, FieldDefinition, Operator};
use crate::value::{FieldValue, ValueMap};

/// Outcome of evaluating an operator the engine does not recognise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownOperatorPolicy {
    /// The rule matches. A `show` field is shown, a `hide` field is hidden.
    #[default]
    FailOpen,
    /// The rule does not match.
    FailClosed,
}

/// Evaluates conditional rules against a value snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator {
    unknown_operator: UnknownOperatorPolicy,
}

impl RuleEvaluator {
    /// Creates an evaluator with the given unknown-operator policy.
    #[must_use]
    pub fn new(unknown_operator: UnknownOperatorPolicy) -> Self {
        Self { unknown_operator }
    }

    /// Returns the unknown-operator policy in effect.
    #[must_use]
    pub fn unknown_operator_policy(&self) -> UnknownOperatorPolicy {
        self.unknown_operator
    }

    /// Evaluates `rule` against `values`, ignoring the rule's action.
    #[must_use]
    pub fn evaluate(&self, rule: &ConditionalRule, values: &ValueMap) -> bool {
        let actual = values.get(&rule.field);
        let expected = rule.value.as_ref();

        match &rule.operator {
            Operator::Equals => strict_eq(actual, expected),
            Operator::NotEquals => !strict_eq(actual, expected),
            Operator::Contains => contains(actual, expected),
            Operator::GreaterThan => number(actual) > number(expected),
            Operator::LessThan => number(actual) < number(expected),
            Operator::IsEmpty => is_empty(actual),
            Operator::IsNotEmpty => is_not_empty(actual),
            Operator::Other(name) => {
                warn!(
                    operator = %name,
                    field = %rule.field,
                    policy = ?self.unknown_operator,
                    "unrecognised conditional operator"
                );
                self.unknown_operator == UnknownOperatorPolicy::FailOpen
            }
        }
    }

    /// Whether `field` should be visible given `values`.
    ///
    /// Fields without a rule are always visible.
    #[must_use]
    pub fn is_visible(&self, field: &FieldDefinition, values: &ValueMap) -> bool {
        let Some(rule) = &field.conditional else {
            return true;
        };
        let matched = self.evaluate(rule, values);
        match rule.action {
            Action::Show => matched,
            Action::Hide => !matched,
        }
    }
}

fn strict_eq(actual: Option<&FieldValue>, expected: Option<&FieldValue>) -> bool {
    match (actual, expected) {
        (Some(a), Some(b)) => a.strict_eq(b),
        (None, None) => true,
        _ => false,
    }
}

fn contains(actual: Option<&FieldValue>, expected: Option<&FieldValue>) -> bool {
    if let Some(items) = actual.and_then(FieldValue::as_list) {
        return expected.is_some_and(|e| items.iter().any(|item| item.strict_eq(e)));
    }
    // An absent operand never matches, rather than matching every string.
    expected.is_some_and(|e| display(actual).contains(&e.to_display()))
}

fn display(value: Option<&FieldValue>) -> String {
    value.map(FieldValue::to_display).unwrap_or_default()
}

fn number(value: Option<&FieldValue>) -> f64 {
    value.map_or(f64::NAN, FieldValue::to_number)
}

fn is_empty(actual: Option<&FieldValue>) -> bool {
    let Some(value) = actual else {
        return true;
    };
    !value.is_truthy()
        || value.as_list().is_some_and(<[_]>::is_empty)
        || value.to_display().trim().is_empty()
}

fn is_not_empty(actual: Option<&FieldValue>) -> bool {
    let Some(value) = actual else {
        return false;
    };
    value.is_truthy()
        && value.as_list().map_or(true, |items| !items.is_empty())
        && !value.to_display().trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use crate::value::Scalar;

    fn values(entries: &[(&str, FieldValue)]) -> ValueMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn rule(operator: Operator, value: Option<FieldValue>) -> ConditionalRule {
        ConditionalRule::show("src", operator, value)
    }

    fn eval(operator: Operator, operand: Option<FieldValue>, actual: FieldValue) -> bool {
        RuleEvaluator::default().evaluate(&rule(operator, operand), &values(&[("src", actual)]))
    }

    mod equality {
        use super::*;

        #[test]
        fn equals_is_strict() {
            assert!(eval(
                Operator::Equals,
                Some("business".into()),
                "business".into()
            ));
            assert!(!eval(Operator::Equals, Some("1".into()), FieldValue::Number(1.0)));
        }

        #[test]
        fn not_equals_negates() {
            assert!(eval(
                Operator::NotEquals,
                Some("a".into()),
                "b".into()
            ));
            assert!(!eval(Operator::NotEquals, Some("a".into()), "a".into()));
        }

        #[test]
        fn missing_value_only_equals_missing_operand() {
            let evaluator = RuleEvaluator::default();
            assert!(evaluator.evaluate(&rule(Operator::Equals, None), &ValueMap::new()));
            assert!(!evaluator.evaluate(&rule(Operator::Equals, Some("".into())), &ValueMap::new()));
        }
    }

    mod contains {
        use super::*;

        #[test]
        fn checks_list_membership() {
            let list = FieldValue::List(vec![Scalar::from("news"), Scalar::from("offers")]);
            assert!(eval(Operator::Contains, Some("news".into()), list.clone()));
            assert!(!eval(Operator::Contains, Some("new".into()), list));
        }

        #[test]
        fn list_membership_is_strict() {
            let list = FieldValue::List(vec![Scalar::Number(1.0)]);
            assert!(!eval(Operator::Contains, Some("1".into()), list.clone()));
            assert!(eval(Operator::Contains, Some(FieldValue::Number(1.0)), list));
        }

        #[test]
        fn substring_match_for_non_lists() {
            assert!(eval(
                Operator::Contains,
                Some("@corp".into()),
                "me@corp.com".into()
            ));
            assert!(eval(
                Operator::Contains,
                Some(FieldValue::Number(23.0)),
                FieldValue::Number(1234.0)
            ));
            assert!(!eval(Operator::Contains, Some("x".into()), "abc".into()));
        }

        #[test]
        fn absent_operand_never_matches() {
            assert!(!eval(Operator::Contains, None, "abc".into()));
            assert!(!eval(Operator::Contains, None, FieldValue::empty_text()));
            assert!(!eval(
                Operator::Contains,
                None,
                FieldValue::List(vec![Scalar::from("a")])
            ));
        }
    }

    mod numeric {
        use super::*;

        #[test]
        fn compares_after_coercion() {
            assert!(eval(
                Operator::GreaterThan,
                Some(FieldValue::Number(18.0)),
                "21".into()
            ));
            assert!(eval(
                Operator::LessThan,
                Some("10".into()),
                FieldValue::Number(3.0)
            ));
        }

        #[test]
        fn nan_never_matches() {
            assert!(!eval(
                Operator::GreaterThan,
                Some(FieldValue::Number(0.0)),
                "abc".into()
            ));
            assert!(!eval(
                Operator::LessThan,
                Some(FieldValue::Number(0.0)),
                "abc".into()
            ));
            let evaluator = RuleEvaluator::default();
            assert!(!evaluator.evaluate(
                &rule(Operator::GreaterThan, Some(FieldValue::Number(-1.0))),
                &ValueMap::new()
            ));
        }

        #[test]
        fn unset_reads_as_zero() {
            assert!(eval(
                Operator::LessThan,
                Some(FieldValue::Number(1.0)),
                FieldValue::Unset
            ));
        }
    }

    mod emptiness {
        use super::*;

        #[test]
        fn empty_values() {
            for empty in [
                FieldValue::empty_text(),
                FieldValue::Unset,
                FieldValue::List(vec![]),
                FieldValue::Number(0.0),
                FieldValue::Bool(false),
                FieldValue::text("   "),
            ] {
                assert!(eval(Operator::IsEmpty, None, empty.clone()), "{empty:?}");
                assert!(!eval(Operator::IsNotEmpty, None, empty.clone()), "{empty:?}");
            }
        }

        #[test]
        fn missing_value_is_empty() {
            let evaluator = RuleEvaluator::default();
            assert!(evaluator.evaluate(&rule(Operator::IsEmpty, None), &ValueMap::new()));
            assert!(!evaluator.evaluate(&rule(Operator::IsNotEmpty, None), &ValueMap::new()));
        }

        #[test]
        fn non_empty_values() {
            for value in [
                FieldValue::text("x"),
                FieldValue::Number(5.0),
                FieldValue::Bool(true),
                FieldValue::List(vec!["a".into()]),
            ] {
                assert!(!eval(Operator::IsEmpty, None, value.clone()), "{value:?}");
                assert!(eval(Operator::IsNotEmpty, None, value.clone()), "{value:?}");
            }
        }
    }

    mod unknown_operator {
        use super::*;

        #[test]
        fn fail_open_matches() {
            assert!(eval(
                Operator::Other("starts_with".into()),
                Some("a".into()),
                "b".into()
            ));
        }

        #[test]
        fn fail_closed_does_not_match() {
            let evaluator = RuleEvaluator::new(UnknownOperatorPolicy::FailClosed);
            assert!(!evaluator.evaluate(
                &rule(Operator::Other("starts_with".into()), None),
                &values(&[("src", "b".into())])
            ));
        }

        #[test]
        fn fail_open_hides_hide_rules() {
            let field = FieldDefinition::new("f", FieldType::Text, "F").with_conditional(
                ConditionalRule::hide("src", Operator::Other("matches".into()), None),
            );
            assert!(!RuleEvaluator::default().is_visible(&field, &ValueMap::new()));
            assert!(RuleEvaluator::new(UnknownOperatorPolicy::FailClosed)
                .is_visible(&field, &ValueMap::new()));
        }
    }

    mod visibility {
        use super::*;

        #[test]
        fn unconditional_field_is_visible() {
            let field = FieldDefinition::new("f", FieldType::Text, "F");
            assert!(RuleEvaluator::default().is_visible(&field, &ValueMap::new()));
        }

        #[test]
        fn hide_action_negates() {
            let field = FieldDefinition::new("f", FieldType::Text, "F").with_conditional(
                ConditionalRule::hide("src", Operator::Equals, Some("yes".into())),
            );
            let evaluator = RuleEvaluator::default();
            assert!(!evaluator.is_visible(&field, &values(&[("src", "yes".into())])));
            assert!(evaluator.is_visible(&field, &values(&[("src", "no".into())])));
        }
    }
}

//! # formflow-core
//!
//! Conditional field dependency engine for data-driven forms.
//!
//! A form document describes fields, their validation, default values and
//! rules that make a field's visibility depend on another field's value.
//! This crate keeps a consistent picture of which fields exist and what they
//! hold as the form is edited:
//!
//! - [`RuleEvaluator`] evaluates one [`ConditionalRule`] against a value snapshot
//! - [`DependencyGraph`] orders fields so that each is resolved after the
//!   field it reads, leaving cycles out
//! - [`resolve_initial`] computes the initial visible set and values
//! - [`FormStore`] owns the live [`FormState`] and applies edits
//! - [`Validator`] turns the visible values into a [`ValidationReport`]
//!
//! ## Example
//!
//! ```
//! use formflow_core::{document, FormStore};
//!
//! let config = document::load_config_from_json(r#"{
//!     "formTitle": "Signup",
//!     "fields": [
//!         { "id": "userType", "type": "select", "label": "User type" },
//!         { "id": "businessName", "type": "text", "label": "Business name",
//!           "required": true,
//!           "conditional": { "field": "userType", "operator": "equals",
//!                            "value": "business", "action": "show" } }
//!     ]
//! }"#)?;
//!
//! let mut store = FormStore::new();
//! store.initialize(config);
//! assert!(!store.state().is_visible("businessName"));
//!
//! store.update_field("userType", "business")?;
//! assert!(store.state().is_visible("businessName"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod graph;
mod model;
mod resolver;
mod rule;
mod store;
mod validation;
mod value;

/// Form document parsing.
pub mod document;

pub use config::{ConfigError, EngineConfig, RulesConfig, ValidationConfig};
pub use graph::DependencyGraph;
pub use model::{
    Action, ConditionalRule, FieldDefinition, FieldOption, FieldType, FormConfig, ModelError,
    Operator, Pattern, SubmitButton, ValidationSpec,
};
pub use resolver::{resolve_initial, HiddenReason, Resolution};
pub use rule::{RuleEvaluator, UnknownOperatorPolicy};
pub use store::{FieldUpdate, FormError, FormState, FormStore, Prefill, StorePhase, Submission};
pub use validation::{ValidationReport, Validator};
pub use value::{format_number, FieldValue, Scalar, ValueError, ValueMap};

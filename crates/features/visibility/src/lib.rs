//! # Field visibility
//!
//! Shows and hides donation form fields based on the values of other fields.
//!
//! An input declares when it is visible through a `data-field-visibility-conditions` JSON
//! list; the first condition names a *controller* field, an operator and a literal. The
//! engine scans each donation form into watch state, evaluates conditions against the
//! controller inputs and toggles the hidden class on the dependent field's row.
//!
//! * [`model`]: the serializable document, form, row and input model.
//! * [`condition`] and [`compare`]: condition parsing and operator semantics.
//! * [`state`]: per-form watch state.
//! * [`engine`]: evaluation and class toggling.
//! * [`controller`]: [`FormController`], driven directly or from the event bus.
//!
//! ## Example
//! ```rust
//! use dhub_domain::config::VisibilityConfig;
//! use dhub_visibility::model::{Document, DonationForm, FormInput, FormRow, InputKind};
//! use dhub_visibility::{FieldChange, FormController};
//!
//! let row = |inputs| FormRow { classes: vec!["form-row".into()], inputs, ..FormRow::default() };
//! let form = DonationForm {
//!     id: Some("give-form-1".into()),
//!     data_id: Some("1-1".into()),
//!     classes: vec!["give-form".into()],
//!     rows: vec![
//!         row(vec![FormInput::new("country", InputKind::Text, "CA")]),
//!         row(vec![FormInput::new("state", InputKind::Text, "").with_conditions(
//!             r#"[{"field":"country","operator":"=","value":"US"}]"#,
//!         )]),
//!     ],
//! };
//!
//! let document = Document::new(vec![form]);
//! let mut controller = FormController::new(document, VisibilityConfig::default());
//! controller.initialize();
//! assert!(controller.document().forms[0].rows[1].has_class("give-hidden"));
//!
//! controller.apply_change("give-form-1", "country", &FieldChange::Value("US".into()));
//! assert!(!controller.document().forms[0].rows[1].has_class("give-hidden"));
//! ```

pub mod compare;
pub mod condition;
pub mod controller;
pub mod engine;
mod error;
pub mod model;
pub mod state;

pub use crate::compare::compare_with_operator;
pub use crate::condition::{ConditionValue, Operator, VisibilityCondition, parse_conditions};
pub use crate::controller::{FieldChange, FormController, FormEvent, FormListener};
pub use crate::engine::{FieldVisibility, Visibility, compute_visibility};
pub use crate::error::{VisibilityError, VisibilityErrorExt};
pub use crate::state::{VisibilityState, WatchedFields, build_watch_state};

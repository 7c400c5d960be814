//! Evaluation of visibility conditions and the resulting class toggles.
use crate::compare::compare_with_operator;
use crate::condition::VisibilityCondition;
use crate::error::VisibilityError;
use crate::model::DonationForm;
use crate::state::{Dependents, WatchedFields};
use dhub_domain::config::VisibilityConfig;
use serde::Serialize;
use tracing::{trace, warn};

/// What a visibility pass did to one dependent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Shown,
    Hidden,
    /// No controller input exists; the field keeps its current state.
    Unchanged,
}

/// Outcome for one dependent field, published after every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldVisibility {
    pub form: String,
    pub field: String,
    pub visibility: Visibility,
}

/// Evaluates the first condition against the controller inputs of `form`.
///
/// Returns `None` when the form has no input named after the condition's field. Radio buttons
/// and checkboxes count only while checked; any other input counts whenever the comparison
/// holds. The field is visible if any input counts.
#[must_use]
pub fn evaluate(form: &DonationForm, condition: &VisibilityCondition) -> Option<bool> {
    let mut controllers = form.inputs_named(&condition.field).peekable();
    controllers.peek()?;

    Some(controllers.any(|input| {
        compare_with_operator(&condition.operator, &input.value, &condition.value)
            && (!input.kind.is_checkable() || input.checked)
    }))
}

/// Shows or hides the row wrapping `dependent` according to `conditions`.
///
/// # Errors
/// * [`VisibilityError::EmptyConditions`] for an empty list.
/// * [`VisibilityError::MissingField`] if no input is called `dependent`.
/// * [`VisibilityError::MissingWrapper`] if that input's row is not a form row.
pub fn compute_visibility(
    form: &mut DonationForm,
    dependent: &str,
    conditions: &[VisibilityCondition],
    config: &VisibilityConfig,
) -> Result<Visibility, VisibilityError> {
    let condition = conditions.first().ok_or_else(|| VisibilityError::EmptyConditions {
        message: format!("no condition for field {dependent}").into(),
        context: None,
    })?;

    let visible = evaluate(form, condition);

    let row = form.row_of_mut(dependent).ok_or_else(|| VisibilityError::MissingField {
        message: format!("no input named {dependent}").into(),
        context: None,
    })?;
    if !row.has_class(&config.row_class) {
        return Err(VisibilityError::MissingWrapper {
            message: format!("{dependent} is not inside a .{} element", config.row_class).into(),
            context: None,
        });
    }

    let Some(visible) = visible else {
        trace!(field = dependent, controller = %condition.field, "No controller input");
        return Ok(Visibility::Unchanged);
    };

    if visible {
        row.remove_class(&config.hidden_class);
        Ok(Visibility::Shown)
    } else {
        row.add_class(&config.hidden_class);
        Ok(Visibility::Hidden)
    }
}

/// Applies every dependent in `dependents`. Failing fields are logged and skipped.
pub fn apply_dependents(
    form: &mut DonationForm,
    dependents: &Dependents,
    config: &VisibilityConfig,
) -> Vec<FieldVisibility> {
    let form_id = form.unique_id().unwrap_or_default().to_owned();

    dependents
        .iter()
        .filter_map(|(field, conditions)| {
            match compute_visibility(form, field, conditions, config) {
                Ok(visibility) => Some(FieldVisibility {
                    form: form_id.clone(),
                    field: field.clone(),
                    visibility,
                }),
                Err(err) => {
                    warn!(form = %form_id, field = %field, error = %err, "Visibility not applied");
                    None
                },
            }
        })
        .collect()
}

/// Applies every watched field of the form.
pub fn apply_form(
    form: &mut DonationForm,
    watched: &WatchedFields,
    config: &VisibilityConfig,
) -> Vec<FieldVisibility> {
    watched.iter().flat_map(|(_, dependents)| apply_dependents(form, dependents, config)).collect()
}

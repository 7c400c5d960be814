use crate::condition::{VisibilityCondition, parse_conditions};
use crate::error::{VisibilityError, VisibilityErrorExt};
use crate::model::DonationForm;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Dependent field name to its condition list.
pub type Dependents = BTreeMap<String, Vec<VisibilityCondition>>;

/// Watch state of one form: controller field name to the fields it drives.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WatchedFields(BTreeMap<String, Dependents>);

impl WatchedFields {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of controller fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn dependents_of(&self, controller: &str) -> Option<&Dependents> {
        self.0.get(controller)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dependents)> {
        self.0.iter().map(|(controller, dependents)| (controller.as_str(), dependents))
    }

    fn watch(&mut self, dependent: &str, conditions: Vec<VisibilityCondition>) {
        // Only the first condition decides; it names the controller.
        let Some(controller) = conditions.first().map(|c| c.field.clone()) else { return };
        self.0.entry(controller).or_default().insert(dependent.to_owned(), conditions);
    }
}

/// Scans a form for inputs carrying visibility conditions.
///
/// # Errors
/// The first malformed conditions attribute fails the whole scan.
pub fn build_watch_state(form: &DonationForm) -> Result<WatchedFields, VisibilityError> {
    let mut watched = WatchedFields::default();

    for input in form.inputs() {
        let Some(raw) = input.visibility_conditions.as_deref() else { continue };
        let conditions = parse_conditions(raw).context(format!("field {}", input.name))?;
        trace!(field = %input.name, controller = %conditions[0].field, "Watching field");
        watched.watch(&input.name, conditions);
    }

    Ok(watched)
}

/// Watch state of every known form, keyed by the form's `data-id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VisibilityState {
    forms: BTreeMap<String, WatchedFields>,
}

impl VisibilityState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescans `form` and records the result.
    ///
    /// A scan that finds watched fields replaces the form's previous entry. A form without
    /// `data-id` or without watched fields leaves the state untouched. Returns whether the
    /// entry was written.
    ///
    /// # Errors
    /// See [`build_watch_state`]. The previous entry is kept on error.
    pub fn rebuild(&mut self, form: &DonationForm) -> Result<bool, VisibilityError> {
        let Some(unique_id) = form.unique_id() else {
            trace!(form = ?form.id, "Form without data-id skipped");
            return Ok(false);
        };

        let watched = build_watch_state(form)?;
        if watched.is_empty() {
            return Ok(false);
        }

        debug!(form = unique_id, controllers = watched.len(), "Form watch state built");
        self.forms.insert(unique_id.to_owned(), watched);
        Ok(true)
    }

    #[must_use]
    pub fn get(&self, unique_id: &str) -> Option<&WatchedFields> {
        self.forms.get(unique_id)
    }

    #[must_use]
    pub fn contains(&self, unique_id: &str) -> bool {
        self.forms.contains_key(unique_id)
    }

    pub fn form_ids(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormInput, FormRow, InputKind};

    const US_ONLY: &str = r#"[{"field":"country","operator":"=","value":"US"}]"#;

    fn conditional(name: &str, raw: &str) -> FormInput {
        FormInput::new(name, InputKind::Text, "").with_conditions(raw)
    }

    fn form(inputs: Vec<FormInput>) -> DonationForm {
        DonationForm {
            id: Some("give-form-1".to_owned()),
            data_id: Some("1-1".to_owned()),
            classes: vec!["give-form".to_owned()],
            rows: vec![FormRow {
                classes: vec!["form-row".to_owned()],
                inputs,
                ..FormRow::default()
            }],
        }
    }

    #[test]
    fn groups_dependents_by_controller() {
        let watched = build_watch_state(&form(vec![
            FormInput::new("country", InputKind::Text, "US"),
            conditional("state", US_ONLY),
            conditional("zip", US_ONLY),
            conditional(
                "gift_aid",
                r#"[{"field":"country","operator":"=","value":"UK"},
                    {"field":"amount","operator":">","value":10}]"#,
            ),
            conditional("company", r#"[{"field":"donor_type","operator":"=","value":"org"}]"#),
        ]))
        .unwrap();

        assert_eq!(watched.controllers().collect::<Vec<_>>(), ["country", "donor_type"]);
        let country = watched.dependents_of("country").unwrap();
        assert_eq!(
            country.keys().map(String::as_str).collect::<Vec<_>>(),
            ["gift_aid", "state", "zip"]
        );
        assert_eq!(country["gift_aid"].len(), 2);
        assert!(watched.dependents_of("amount").is_none());
    }

    #[test]
    fn malformed_attribute_fails_the_scan() {
        let err = build_watch_state(&form(vec![
            conditional("state", US_ONLY),
            conditional("zip", "[{"),
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            VisibilityError::Condition { context: Some(ref c), .. } if c == "field zip"
        ));
    }

    #[test]
    fn rebuild_replaces_previous_entry() {
        let mut state = VisibilityState::new();
        let mut donation_form = form(vec![
            conditional("state", US_ONLY),
            conditional("card_zip", US_ONLY),
        ]);
        assert!(state.rebuild(&donation_form).unwrap());

        donation_form.rows[0].inputs.pop();
        assert!(state.rebuild(&donation_form).unwrap());

        let dependents = state.get("1-1").unwrap().dependents_of("country").unwrap();
        assert!(dependents.contains_key("state"));
        assert!(!dependents.contains_key("card_zip"));
    }

    #[test]
    fn empty_rescan_keeps_previous_entry() {
        let mut state = VisibilityState::new();
        let mut donation_form = form(vec![conditional("state", US_ONLY)]);
        state.rebuild(&donation_form).unwrap();

        donation_form.rows[0].inputs.clear();
        assert!(!state.rebuild(&donation_form).unwrap());
        assert!(state.get("1-1").unwrap().dependents_of("country").is_some());
    }

    #[test]
    fn forms_without_unique_id_are_skipped() {
        let mut state = VisibilityState::new();
        let mut donation_form = form(vec![conditional("state", US_ONLY)]);
        donation_form.data_id = Some(String::new());

        assert!(!state.rebuild(&donation_form).unwrap());
        assert!(state.is_empty());
    }
}

#![allow(dead_code, unreachable_pub)]

use dhub_domain::config::VisibilityConfig;
use dhub_visibility::FormController;
use dhub_visibility::model::{Document, DonationForm, FormInput, FormRow, InputKind};

pub const PAGE: &str = include_str!("../fixtures/donation_page.json");

pub const US_ONLY: &str = r#"[{"field":"country","operator":"=","value":"US"}]"#;

pub fn page() -> Document {
    serde_json::from_str(PAGE).unwrap()
}

pub fn controller() -> FormController {
    FormController::new(page(), VisibilityConfig::default())
}

pub fn form<'a>(document: &'a Document, element_id: &str) -> &'a DonationForm {
    document.form_by_element_id(element_id).unwrap()
}

/// Whether the row wrapping `field` carries the hidden class.
pub fn is_hidden(document: &Document, element_id: &str, field: &str) -> bool {
    form(document, element_id)
        .rows
        .iter()
        .find(|row| row.inputs.iter().any(|input| input.name == field))
        .unwrap()
        .has_class("give-hidden")
}

pub fn row(inputs: Vec<FormInput>) -> FormRow {
    FormRow { classes: vec!["form-row".to_owned()], inputs, ..FormRow::default() }
}

pub fn text(name: &str, value: &str) -> FormInput {
    FormInput::new(name, InputKind::Text, value)
}

pub fn donation_form(element_id: &str, unique_id: &str, rows: Vec<FormRow>) -> DonationForm {
    DonationForm {
        id: Some(element_id.to_owned()),
        data_id: Some(unique_id.to_owned()),
        classes: vec!["give-form".to_owned()],
        rows,
    }
}

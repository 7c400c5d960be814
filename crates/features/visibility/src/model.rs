//! Serializable stand-in for the parts of a page the visibility engine reads and mutates.
//!
//! A [`Document`] holds forms, a form holds rows, a row holds inputs. Only what the engine
//! needs is modelled: names, values, checked state, class lists and the raw conditions
//! attribute.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub forms: Vec<DonationForm>,
}

impl Document {
    #[must_use]
    pub const fn new(forms: Vec<DonationForm>) -> Self {
        Self { forms }
    }

    /// Forms carrying `form_class`, in document order.
    pub fn donation_forms<'a>(
        &'a self,
        form_class: &'a str,
    ) -> impl Iterator<Item = &'a DonationForm> + 'a {
        self.forms.iter().filter(move |form| form.has_class(form_class))
    }

    /// Form by its `id` attribute.
    #[must_use]
    pub fn form_by_element_id(&self, element_id: &str) -> Option<&DonationForm> {
        self.forms.iter().find(|form| form.id.as_deref() == Some(element_id))
    }

    pub fn form_by_element_id_mut(&mut self, element_id: &str) -> Option<&mut DonationForm> {
        self.forms.iter_mut().find(|form| form.id.as_deref() == Some(element_id))
    }

    /// First donation form with the given `data-id`.
    pub fn form_by_unique_id_mut(
        &mut self,
        unique_id: &str,
        form_class: &str,
    ) -> Option<&mut DonationForm> {
        self.forms
            .iter_mut()
            .find(|form| form.has_class(form_class) && form.unique_id() == Some(unique_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationForm {
    /// Element `id` attribute; gateway-loaded events address forms by it.
    #[serde(default)]
    pub id: Option<String>,
    /// The `data-id` attribute, unique per rendered donation form.
    #[serde(default)]
    pub data_id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub rows: Vec<FormRow>,
}

impl DonationForm {
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// The `data-id`, if present and non-empty.
    #[must_use]
    pub fn unique_id(&self) -> Option<&str> {
        self.data_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn inputs(&self) -> impl Iterator<Item = &FormInput> {
        self.rows.iter().flat_map(|row| row.inputs.iter())
    }

    pub fn inputs_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormInput> + 'a {
        self.inputs().filter(move |input| input.name == name)
    }

    pub fn inputs_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut FormInput> + 'a {
        self.rows.iter_mut().flat_map(|row| row.inputs.iter_mut()).filter(move |i| i.name == name)
    }

    /// Row holding the first input called `name`.
    pub fn row_of_mut(&mut self, name: &str) -> Option<&mut FormRow> {
        self.rows.iter_mut().find(|row| row.inputs.iter().any(|input| input.name == name))
    }

    /// Swaps the gateway-provided rows for `rows`, keeping static rows in place.
    pub fn replace_gateway_rows(&mut self, rows: Vec<FormRow>) {
        self.rows.retain(|row| row.origin != RowOrigin::Gateway);
        self.rows.extend(rows.into_iter().map(|mut row| {
            row.origin = RowOrigin::Gateway;
            row
        }));
    }
}

/// Where a row came from: the form template or the currently selected gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowOrigin {
    #[default]
    Static,
    Gateway,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRow {
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub origin: RowOrigin,
    #[serde(default)]
    pub inputs: Vec<FormInput>,
}

impl FormRow {
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Radio,
    Checkbox,
    Select,
    Textarea,
    Hidden,
    Email,
    Number,
    #[serde(other)]
    Other,
}

impl InputKind {
    /// Radio buttons and checkboxes only count while checked.
    #[must_use]
    pub const fn is_checkable(self) -> bool {
        matches!(self, Self::Radio | Self::Checkbox)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: InputKind,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    /// Raw `data-field-visibility-conditions` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_conditions: Option<String>,
}

impl FormInput {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: InputKind, value: impl Into<String>) -> Self {
        Self { name: name.into(), kind, value: value.into(), ..Self::default() }
    }

    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    #[must_use]
    pub fn with_conditions(mut self, raw: impl Into<String>) -> Self {
        self.visibility_conditions = Some(raw.into());
        self
    }
}

//! Form field cleaning shared by the catalog and renewal forms
//!
//! Forms arrive as url-encoded strings. Each form type cleans itself into a typed
//! payload or a [`FieldErrors`] map keyed by field name; handlers re-render the form
//! with that map instead of failing the request.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_DATE: &str = "Enter a valid date.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Accepted date input formats, tried in order.
/// Within each pair `%y` is tried before `%Y`, so "26" reads as 2026 and not year 26.
pub const DATE_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d.%m.%y",
    "%d.%m.%Y",
];

/// Field-level validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Merge the outcome of a `validator` run into this map
    pub fn extend_validation(&mut self, result: Result<(), ValidationErrors>) {
        if let Err(errors) = result {
            for (field, errs) in errors.field_errors() {
                for err in errs.iter() {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    self.add(&field, message);
                }
            }
        }
    }
}

/// Static description of a model field (label and declared size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMeta {
    pub name: &'static str,
    pub verbose_name: &'static str,
    pub max_length: Option<usize>,
}

/// Forms backed by a model's declared fields
pub trait ModelForm {
    fn fields() -> &'static [FieldMeta];

    fn field(name: &str) -> Option<&'static FieldMeta> {
        Self::fields().iter().find(|f| f.name == name)
    }
}

/// One option of a select widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl ToString, label: impl ToString) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Page context for a create/update form
#[derive(Debug, Serialize, ToSchema)]
pub struct FormPage<F>
where
    F: for<'a> ToSchema<'a>,
{
    /// Current (initial or submitted) field values
    pub form: F,
    /// Messages per field; empty when the form has not been rejected
    pub errors: FieldErrors,
    /// Field labels and sizes
    #[schema(value_type = Object)]
    pub fields: &'static [FieldMeta],
    /// Options for select fields
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub choices: BTreeMap<String, Vec<Choice>>,
}

impl<F> FormPage<F>
where
    F: ModelForm + for<'a> ToSchema<'a>,
{
    pub fn new(form: F) -> Self {
        Self::with_errors(form, FieldErrors::new())
    }

    pub fn with_errors(form: F, errors: FieldErrors) -> Self {
        Self {
            form,
            errors,
            fields: F::fields(),
            choices: BTreeMap::new(),
        }
    }

    pub fn with_choices(mut self, field: &str, choices: Vec<Choice>) -> Self {
        self.choices.insert(field.to_string(), choices);
        self
    }
}

/// Result of processing a submitted form
#[derive(Debug)]
pub enum FormOutcome<T, P> {
    /// The form was valid and its data persisted
    Saved(T),
    /// The form must be shown again with its errors
    Invalid(P),
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

/// Trimmed required text value
pub fn clean_text(field: &str, raw: &str, errors: &mut FieldErrors) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value.to_string()
}

pub fn clean_required_date(field: &str, raw: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    clean_optional_date(field, raw, errors)
}

pub fn clean_optional_date(field: &str, raw: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }
    let date = parse_date(raw);
    if date.is_none() {
        errors.add(field, INVALID_DATE);
    }
    date
}

/// Optional reference to another record by numeric id
pub fn clean_optional_id(field: &str, raw: &str, errors: &mut FieldErrors) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i32>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

/// Validated input forms
///
/// Every form the back-office accepts is a `validator::Validate` type that
/// lives here, so the server and any Rust client run the same rules. Failures
/// are flattened into [`FieldError`] lists, ordered by field name, which is
/// also the `details` shape of an HTTP 422 response.
///
/// # Example
///
/// ```
/// use backoffice_shared::forms::user::UpdateStatusForm;
/// use backoffice_shared::forms::Form;
///
/// let form = UpdateStatusForm { status: "archived".to_string() };
/// let errors = form.check().unwrap_err();
/// assert_eq!(errors[0].field, "status");
/// ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

pub mod store;
pub mod user;

/// One failed rule on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A form with rules beyond what the derive expresses
///
/// The default implementation runs the derived rules only.
pub trait Form: Validate {
    fn check(&self) -> Result<(), Vec<FieldError>> {
        self.validate().map_err(|e| field_errors(&e))
    }
}

/// Flattens validator output into field errors sorted by field name
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid", field)),
            })
        })
        .collect();

    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Merges derived-rule errors with extra errors found by hand
pub(crate) fn merge(
    derived: Result<(), ValidationErrors>,
    extra: Vec<FieldError>,
) -> Result<(), Vec<FieldError>> {
    let mut errors = match derived {
        Ok(()) => Vec::new(),
        Err(e) => field_errors(&e),
    };
    errors.extend(extra);

    if errors.is_empty() {
        Ok(())
    } else {
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        Err(errors)
    }
}

/// Builds a `ValidationError` carrying a readable message
pub(crate) fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Rejects empty or whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("required", "This field is required"));
    }
    Ok(())
}

/// Empty strings clear nullable columns
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// A payload holding either one record or a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }

    /// Checks every record with `check`
    ///
    /// A single record reports bare field names. Batch errors are prefixed
    /// with the record position, e.g. `gstsNumbers[1].number`. An empty batch
    /// is an error on `prefix` itself.
    pub fn check_each<F>(&self, prefix: &str, check: F) -> Result<(), Vec<FieldError>>
    where
        F: Fn(&T) -> Result<(), Vec<FieldError>>,
    {
        match self {
            OneOrMany::One(item) => check(item),
            OneOrMany::Many(items) => check_batch(items, prefix, check),
        }
    }
}

/// Checks a list of records, prefixing errors with their position
pub fn check_batch<T, F>(items: &[T], prefix: &str, check: F) -> Result<(), Vec<FieldError>>
where
    F: Fn(&T) -> Result<(), Vec<FieldError>>,
{
    if items.is_empty() {
        return Err(vec![FieldError::new(prefix, "At least one record is required")]);
    }

    let errors: Vec<FieldError> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| check(item).err().map(|errs| (index, errs)))
        .flat_map(|(index, errs)| {
            errs.into_iter().map(move |e| FieldError {
                field: format!("{}[{}].{}", prefix, index, e.field),
                message: e.message,
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

use std::collections::BTreeMap;

use maud::{html, Markup};

/// Validation messages keyed by form field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok` when no field has an error.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "This field is required.");
        }
    }

    pub fn max_length(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(
                field,
                format!("Ensure this value has at most {max} characters."),
            );
        }
    }
}

/// Options for [`input`] that most fields leave at their default.
#[derive(Default)]
pub struct InputOpts<'a> {
    pub input_type: &'a str,
    pub required: bool,
    pub readonly: bool,
}

/// A labelled bootstrap form control, with the field's error (if any)
/// underneath.
pub fn input(
    name: &str,
    label: &str,
    value: &str,
    errors: &FieldErrors,
    opts: InputOpts<'_>,
) -> Markup {
    let error = errors.get(name);
    let class = if error.is_some() {
        "form-control is-invalid"
    } else {
        "form-control"
    };
    let input_type = if opts.input_type.is_empty() {
        "text"
    } else {
        opts.input_type
    };

    html! {
        div class="mb-3" {
            label for=(name) class="form-label" { (label) }
            input type=(input_type) class=(class) id=(name) name=(name) value=(value) required[opts.required] readonly[opts.readonly];
            @if let Some(error) = error {
                div class="invalid-feedback" { (error) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FieldErrors;

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = FieldErrors::default();
        errors.require("name", "  ");
        errors.max_length("name", "  ", 1);
        assert_eq!(errors.get("name"), Some("This field is required."));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn max_length_counts_characters() {
        let mut errors = FieldErrors::default();
        errors.max_length("name", "ñññ", 3);
        assert!(errors.is_empty());
    }
}

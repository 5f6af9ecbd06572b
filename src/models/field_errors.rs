//! Field errors reported back to forms and http clients
use std::collections::BTreeMap;
use std::fmt;

use validator::ValidationErrors;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldError {
    pub code: String,
    pub message: String,
}

/// Errors keyed by form field name, or by attribute name for category attributes
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<String, Vec<FieldError>>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors::default()
    }

    pub fn add<F, C, M>(&mut self, field: F, code: C, message: M)
    where
        F: Into<String>,
        C: Into<String>,
        M: Into<String>,
    {
        self.0.entry(field.into()).or_insert_with(Vec::new).push(FieldError {
            code: code.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.0.get(field).map(|errors| errors.as_slice())
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.keys().map(|field| field.as_str()).collect()
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, errors) in other.0 {
            self.0.entry(field).or_insert_with(Vec::new).extend(errors);
        }
    }

    /// Keeps only errors of the listed fields
    pub fn retain_fields(&mut self, fields: &[&str]) {
        self.0.retain(|field, _| fields.contains(&field.as_str()));
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut result = FieldErrors::new();
        for (field, errors) in errors.field_errors() {
            for error in errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                result.add(field.to_string(), error.code.to_string(), message);
            }
        }
        result
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields = self
            .0
            .iter()
            .map(|(field, errors)| {
                let messages = errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join(", ");
                format!("{}: {}", field, messages)
            }).collect::<Vec<_>>();
        write!(f, "{}", fields.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_errors_of_both_sides() {
        let mut errors = validation_errors!({"name": ["length" => "Name is required"]});
        errors.merge(validation_errors!({"name": ["unique" => "Taken"], "city": ["length" => "City is required"]}));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name").map(|e| e.len()), Some(2));
        assert!(errors.contains("city"));
    }

    #[test]
    fn retain_fields_drops_other_steps() {
        let mut errors = validation_errors!({"name": ["length" => "Name is required"], "city": ["length" => "City is required"]});
        errors.retain_fields(&["city", "state"]);

        assert_eq!(errors.fields(), vec!["city"]);
    }
}

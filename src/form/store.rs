//! Attribute value store of the business being authored
use std::collections::HashMap;

use serde_json::Value;

use super::fields::parse_input;
use super::FormError;
use models::{AttributeDefinition, AttributeId, AttributeType, AttributeValue, CategorySchema};

/// Typed values keyed by attribute definition, always in line with one category schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    definitions: Vec<AttributeDefinition>,
    values: HashMap<AttributeId, AttributeValue>,
}

impl AttributeStore {
    pub fn new(definitions: &[AttributeDefinition]) -> Self {
        let mut store = AttributeStore::default();
        store.initialize(definitions);
        store
    }

    /// Replaces the whole store with type defaults of `definitions`
    pub fn initialize(&mut self, definitions: &[AttributeDefinition]) {
        self.values = definitions
            .iter()
            .map(|definition| (definition.id, definition.default_value()))
            .collect();
        self.definitions = definitions.to_vec();
    }

    pub fn definitions(&self) -> &[AttributeDefinition] {
        &self.definitions
    }

    pub fn definition(&self, attribute_id: AttributeId) -> Option<&AttributeDefinition> {
        self.definitions.iter().find(|definition| definition.id == attribute_id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current value or the type default, `None` for attributes outside the schema
    pub fn get(&self, attribute_id: AttributeId) -> Option<AttributeValue> {
        self.definition(attribute_id).map(|definition| {
            self.values
                .get(&attribute_id)
                .cloned()
                .unwrap_or_else(|| definition.default_value())
        })
    }

    pub fn set(&mut self, attribute_id: AttributeId, value: AttributeValue) -> Result<(), FormError> {
        {
            let definition = self
                .definition(attribute_id)
                .ok_or_else(|| FormError::UnknownAttribute(attribute_id))?;
            check_value(definition, &value)?;
        }
        self.values.insert(attribute_id, value);
        Ok(())
    }

    /// Stores raw user input. Input that does not parse as a number is kept as
    /// an unset number so a required attribute stays unsatisfied, multiselect
    /// input toggles the entered option.
    pub fn set_input(&mut self, attribute_id: AttributeId, raw: &str) -> Result<(), FormError> {
        let (parsed, value_type) = {
            let definition = self
                .definition(attribute_id)
                .ok_or_else(|| FormError::UnknownAttribute(attribute_id))?;
            if definition.value_type == AttributeType::MultiSelect {
                return self.toggle_option(attribute_id, raw.trim());
            }
            (parse_input(definition, raw), definition.value_type)
        };
        match parsed {
            Ok(value) => self.set(attribute_id, value),
            Err(message) => {
                if value_type == AttributeType::Number {
                    self.values.insert(attribute_id, AttributeValue::Number(None));
                }
                Err(FormError::InvalidInput(message))
            }
        }
    }

    /// Flips one option of a multiselect attribute
    pub fn toggle_option(&mut self, attribute_id: AttributeId, option: &str) -> Result<(), FormError> {
        let mut selected = match self.get(attribute_id) {
            Some(AttributeValue::MultiSelect(selected)) => selected,
            Some(_) => return Err(FormError::TypeMismatch(attribute_id, AttributeType::MultiSelect)),
            None => return Err(FormError::UnknownAttribute(attribute_id)),
        };
        if option.is_empty() {
            return Ok(());
        }
        if let Some(position) = selected.iter().position(|o| o == option) {
            selected.remove(position);
        } else {
            selected.push(option.to_string());
        }
        self.set(attribute_id, AttributeValue::MultiSelect(selected))
    }

    /// Values in definition order
    pub fn values(&self) -> Vec<(&AttributeDefinition, AttributeValue)> {
        self.definitions
            .iter()
            .map(|definition| {
                let value = self
                    .values
                    .get(&definition.id)
                    .cloned()
                    .unwrap_or_else(|| definition.default_value());
                (definition, value)
            }).collect()
    }

    /// Pre-populates values of an existing business. Values of attributes
    /// outside the schema are dropped, malformed values fall back to defaults.
    pub fn load<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (AttributeId, &'a Value)>,
    {
        for (attribute_id, raw) in values {
            let value = match self.definition(attribute_id) {
                Some(definition) => match AttributeValue::from_json(definition.value_type, raw) {
                    Ok(ref value) if check_value(definition, value).is_ok() => value.clone(),
                    _ => {
                        warn!("Stored value {} of attribute {} does not fit its definition", raw, attribute_id);
                        continue;
                    }
                },
                None => continue,
            };
            self.values.insert(attribute_id, value);
        }
    }
}

impl<'a> From<&'a CategorySchema> for AttributeStore {
    fn from(schema: &'a CategorySchema) -> Self {
        AttributeStore::new(&schema.attributes)
    }
}

/// Value must have the declared type and stay within declared options
pub fn check_value(definition: &AttributeDefinition, value: &AttributeValue) -> Result<(), FormError> {
    if !value.matches(definition.value_type) {
        return Err(FormError::TypeMismatch(definition.id, definition.value_type));
    }
    match *value {
        AttributeValue::Select(ref option) if !option.is_empty() && !definition.has_option(option) => {
            Err(FormError::UnknownOption(definition.id, option.clone()))
        }
        AttributeValue::MultiSelect(ref options) => match options.iter().find(|o| !definition.has_option(o)) {
            Some(option) => Err(FormError::UnknownOption(definition.id, option.clone())),
            None => Ok(()),
        },
        AttributeValue::Number(Some(n)) if !n.is_finite() => Err(FormError::InvalidInput(format!("{} is not a finite number", n))),
        _ => Ok(()),
    }
}

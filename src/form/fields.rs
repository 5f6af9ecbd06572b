//! Rendering and validation of category attribute fields
use super::store::AttributeStore;
use models::{AttributeDefinition, AttributeId, AttributeType, AttributeValue, CategorySchema, FieldErrors};

/// Input control an attribute is edited with
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldControl {
    TextInput,
    NumberInput,
    Toggle,
    SingleChoice { options: Vec<String> },
    MultiChoice { options: Vec<String> },
}

impl<'a> From<&'a AttributeDefinition> for FieldControl {
    fn from(definition: &'a AttributeDefinition) -> Self {
        match definition.value_type {
            AttributeType::Text => FieldControl::TextInput,
            AttributeType::Number => FieldControl::NumberInput,
            AttributeType::Boolean => FieldControl::Toggle,
            AttributeType::Select => FieldControl::SingleChoice {
                options: definition.options.clone(),
            },
            AttributeType::MultiSelect => FieldControl::MultiChoice {
                options: definition.options.clone(),
            },
        }
    }
}

/// One rendered attribute field with its current value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeField {
    pub attribute_id: AttributeId,
    pub label: String,
    pub description: Option<String>,
    pub required: bool,
    pub control: FieldControl,
    pub value: AttributeValue,
    pub satisfied: bool,
}

fn value_of(definition: &AttributeDefinition, store: &AttributeStore) -> AttributeValue {
    store.get(definition.id).unwrap_or_else(|| definition.default_value())
}

/// Fields of every attribute of the schema, in definition order
pub fn render(schema: &CategorySchema, store: &AttributeStore) -> Vec<AttributeField> {
    schema
        .attributes
        .iter()
        .map(|definition| {
            let value = value_of(definition, store);
            AttributeField {
                attribute_id: definition.id,
                label: definition.name.clone(),
                description: definition.description.clone(),
                required: definition.required,
                control: FieldControl::from(definition),
                satisfied: is_satisfied(definition, &value),
                value,
            }
        }).collect()
}

/// Value has the declared type and stays within declared options
fn is_well_formed(definition: &AttributeDefinition, value: &AttributeValue) -> bool {
    if !value.matches(definition.value_type) {
        return false;
    }
    match *value {
        AttributeValue::Select(ref s) => s.is_empty() || definition.has_option(s),
        AttributeValue::MultiSelect(ref items) => items.iter().all(|item| definition.has_option(item)),
        AttributeValue::Number(Some(n)) => n.is_finite(),
        _ => true,
    }
}

/// Whether `value` fulfills the requirement of `definition`.
/// A boolean is always answered, optional attributes only need a well formed value.
pub fn is_satisfied(definition: &AttributeDefinition, value: &AttributeValue) -> bool {
    if definition.value_type == AttributeType::Boolean {
        return true;
    }
    if !is_well_formed(definition, value) {
        return false;
    }
    if !definition.required {
        return true;
    }
    match *value {
        AttributeValue::Text(ref s) | AttributeValue::Select(ref s) => !s.trim().is_empty(),
        AttributeValue::Number(n) => n.is_some(),
        AttributeValue::MultiSelect(ref items) => !items.is_empty(),
        AttributeValue::Boolean(_) => true,
    }
}

/// Errors of unsatisfied attributes of the schema, keyed by attribute name
pub fn validate_attributes(schema: &CategorySchema, store: &AttributeStore) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for definition in &schema.attributes {
        let value = value_of(definition, store);
        if is_satisfied(definition, &value) {
            continue;
        }
        if definition.required {
            errors.add(definition.name.as_str(), "required", format!("{} is required", definition.name));
        } else {
            errors.add(definition.name.as_str(), "invalid", format!("{} has an invalid value", definition.name));
        }
    }
    errors
}

/// Parses raw user input into a value of the definition type
pub fn parse_input(definition: &AttributeDefinition, raw: &str) -> Result<AttributeValue, String> {
    let trimmed = raw.trim();
    match definition.value_type {
        AttributeType::Text => Ok(AttributeValue::Text(raw.to_string())),
        AttributeType::Number => {
            if trimmed.is_empty() {
                return Ok(AttributeValue::Number(None));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|n| AttributeValue::Number(Some(n)))
                .ok_or_else(|| format!("{} must be a number", definition.name))
        }
        AttributeType::Boolean => match trimmed.to_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(AttributeValue::Boolean(true)),
            "false" | "off" | "no" | "0" | "" => Ok(AttributeValue::Boolean(false)),
            _ => Err(format!("{} must be yes or no", definition.name)),
        },
        AttributeType::Select => {
            if trimmed.is_empty() || definition.has_option(trimmed) {
                Ok(AttributeValue::Select(trimmed.to_string()))
            } else {
                Err(format!("'{}' is not an option of {}", trimmed, definition.name))
            }
        }
        AttributeType::MultiSelect => trimmed
            .split(',')
            .map(|option| option.trim())
            .filter(|option| !option.is_empty())
            .map(|option| {
                if definition.has_option(option) {
                    Ok(option.to_string())
                } else {
                    Err(format!("'{}' is not an option of {}", option, definition.name))
                }
            }).collect::<Result<Vec<String>, String>>()
            .map(AttributeValue::MultiSelect),
    }
}

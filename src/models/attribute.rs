//! Typed attribute definitions of a category
use std::fmt;
use std::str::FromStr;

use failure::Error as FailureError;
use serde_json;
use validator::Validate;

use models::validation_rules::*;
use models::{AttributeId, AttributeValue, CategoryId, FieldErrors};
use schema::attribute_definitions;

/// Closed set of attribute kinds a category may declare
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Text,
    Number,
    Boolean,
    Select,
    MultiSelect,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            AttributeType::Text => "text",
            AttributeType::Number => "number",
            AttributeType::Boolean => "boolean",
            AttributeType::Select => "select",
            AttributeType::MultiSelect => "multiselect",
        }
    }

    /// Select and multiselect attributes choose among declared options
    pub fn has_options(&self) -> bool {
        match *self {
            AttributeType::Select | AttributeType::MultiSelect => true,
            AttributeType::Text | AttributeType::Number | AttributeType::Boolean => false,
        }
    }

    pub fn default_value(&self) -> AttributeValue {
        match *self {
            AttributeType::Text => AttributeValue::Text(String::new()),
            AttributeType::Number => AttributeValue::Number(Some(0.0)),
            AttributeType::Boolean => AttributeValue::Boolean(false),
            AttributeType::Select => AttributeValue::Select(String::new()),
            AttributeType::MultiSelect => AttributeValue::MultiSelect(vec![]),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = FailureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(AttributeType::Text),
            "number" => Ok(AttributeType::Number),
            "boolean" => Ok(AttributeType::Boolean),
            "select" => Ok(AttributeType::Select),
            "multiselect" => Ok(AttributeType::MultiSelect),
            other => Err(format_err!("Unknown attribute type '{}'", other)),
        }
    }
}

/// Checks that select-like attributes carry options and others do not need them
pub fn check_attribute_options(value_type: AttributeType, options: &[String]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if value_type.has_options() && options.is_empty() {
        errors.add("options", "options", format!("Attribute of type {} needs at least one option", value_type));
    }
    if let Err(e) = validate_options(options) {
        let message = e.message.map(|m| m.to_string()).unwrap_or_else(|| "Invalid options".to_string());
        errors.add("options", "options", message);
    }
    errors.into_result()
}

/// Attribute definition as it is used by forms and services
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AttributeDefinition {
    pub id: AttributeId,
    pub category_id: CategoryId,
    pub name: String,
    pub value_type: AttributeType,
    pub options: Vec<String>,
    pub required: bool,
    pub description: Option<String>,
}

impl AttributeDefinition {
    pub fn default_value(&self) -> AttributeValue {
        self.value_type.default_value()
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Attribute definition as it is stored in PG
#[derive(Debug, Queryable, Clone, Identifiable)]
#[table_name = "attribute_definitions"]
pub struct RawAttributeDefinition {
    pub id: AttributeId,
    pub category_id: CategoryId,
    pub name: String,
    pub value_type: String,
    pub options: serde_json::Value,
    pub required: bool,
    pub description: Option<String>,
}

impl RawAttributeDefinition {
    /// Rows that break the type/options invariant are refused here, so forms never see them
    pub fn into_definition(self) -> Result<AttributeDefinition, FailureError> {
        let id = self.id;
        let value_type = self.value_type.parse::<AttributeType>()?;
        let options = serde_json::from_value::<Vec<String>>(self.options)
            .map_err(|e| format_err!("Attribute {} has malformed options: {}", id, e))?;
        check_attribute_options(value_type, &options).map_err(|e| format_err!("Attribute {} is inconsistent: {}", id, e))?;
        Ok(AttributeDefinition {
            id,
            category_id: self.category_id,
            name: self.name,
            value_type,
            options,
            required: self.required,
            description: self.description,
        })
    }
}

/// Payload for creating attribute definitions, `category_id` is taken from the route
#[derive(Serialize, Deserialize, Validate, Clone, Debug)]
pub struct NewAttributeDefinition {
    #[serde(default)]
    pub category_id: CategoryId,
    #[validate(length(min = "1", max = "100", message = "Name must be 1 to 100 characters long"))]
    pub name: String,
    pub value_type: AttributeType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
}

impl NewAttributeDefinition {
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = self.validate().err().map(FieldErrors::from).unwrap_or_default();
        if let Err(e) = check_attribute_options(self.value_type, &self.options) {
            errors.merge(e);
        }
        errors.into_result()
    }
}

#[derive(Insertable, Clone, Debug)]
#[table_name = "attribute_definitions"]
pub struct NewAttributeDefinitionRow {
    pub category_id: CategoryId,
    pub name: String,
    pub value_type: String,
    pub options: serde_json::Value,
    pub required: bool,
    pub description: Option<String>,
}

impl From<NewAttributeDefinition> for NewAttributeDefinitionRow {
    fn from(payload: NewAttributeDefinition) -> Self {
        Self {
            category_id: payload.category_id,
            name: payload.name,
            value_type: payload.value_type.to_string(),
            options: json!(payload.options),
            required: payload.required,
            description: payload.description,
        }
    }
}

/// Payload for updating attribute definitions
#[derive(Default, Serialize, Deserialize, Validate, Clone, Debug)]
pub struct UpdateAttributeDefinition {
    #[validate(length(min = "1", max = "100", message = "Name must be 1 to 100 characters long"))]
    pub name: Option<String>,
    pub value_type: Option<AttributeType>,
    pub options: Option<Vec<String>>,
    pub required: Option<bool>,
    pub description: Option<String>,
}

impl UpdateAttributeDefinition {
    /// Validates the update against the definition it is applied to
    pub fn check(&self, current: &AttributeDefinition) -> Result<(), FieldErrors> {
        let mut errors = self.validate().err().map(FieldErrors::from).unwrap_or_default();
        let value_type = self.value_type.unwrap_or(current.value_type);
        let options = self.options.as_ref().unwrap_or(&current.options);
        if let Err(e) = check_attribute_options(value_type, options) {
            errors.merge(e);
        }
        errors.into_result()
    }
}

#[derive(AsChangeset, Default, Clone, Debug)]
#[table_name = "attribute_definitions"]
pub struct UpdateAttributeDefinitionRow {
    pub name: Option<String>,
    pub value_type: Option<String>,
    pub options: Option<serde_json::Value>,
    pub required: Option<bool>,
    pub description: Option<String>,
}

impl From<UpdateAttributeDefinition> for UpdateAttributeDefinitionRow {
    fn from(payload: UpdateAttributeDefinition) -> Self {
        Self {
            name: payload.name,
            value_type: payload.value_type.map(|t| t.to_string()),
            options: payload.options.map(|options| json!(options)),
            required: payload.required,
            description: payload.description,
        }
    }
}

impl UpdateAttributeDefinitionRow {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.value_type.is_none() && self.options.is_none() && self.required.is_none() && self.description.is_none()
    }
}

//! Attribute values of a business, typed by their definition
use serde::{Serialize, Serializer};
use serde_json::{self, Value};

use models::{AttributeId, AttributeType, BusinessId};
use schema::business_attributes;

/// Value of one attribute, the variant always matches the definition type
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    /// `None` when nothing parsable has been entered
    Number(Option<f64>),
    Boolean(bool),
    Select(String),
    MultiSelect(Vec<String>),
}

impl AttributeValue {
    pub fn value_type(&self) -> AttributeType {
        match *self {
            AttributeValue::Text(_) => AttributeType::Text,
            AttributeValue::Number(_) => AttributeType::Number,
            AttributeValue::Boolean(_) => AttributeType::Boolean,
            AttributeValue::Select(_) => AttributeType::Select,
            AttributeValue::MultiSelect(_) => AttributeType::MultiSelect,
        }
    }

    pub fn matches(&self, value_type: AttributeType) -> bool {
        self.value_type() == value_type
    }

    /// Coerces a json value to the declared type.
    /// Numbers and booleans are also accepted in their string form.
    pub fn from_json(value_type: AttributeType, value: &Value) -> Result<AttributeValue, String> {
        match (value_type, value) {
            (AttributeType::Text, &Value::String(ref s)) => Ok(AttributeValue::Text(s.clone())),
            (AttributeType::Select, &Value::String(ref s)) => Ok(AttributeValue::Select(s.clone())),
            (AttributeType::Number, &Value::Null) => Ok(AttributeValue::Number(None)),
            (AttributeType::Number, &Value::Number(ref n)) => Ok(AttributeValue::Number(n.as_f64())),
            (AttributeType::Number, &Value::String(ref s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(AttributeValue::Number(None));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(|n| AttributeValue::Number(Some(n)))
                    .ok_or_else(|| format!("'{}' is not a number", s))
            }
            (AttributeType::Boolean, &Value::Bool(b)) => Ok(AttributeValue::Boolean(b)),
            (AttributeType::Boolean, &Value::String(ref s)) => match s.trim() {
                "true" => Ok(AttributeValue::Boolean(true)),
                "false" => Ok(AttributeValue::Boolean(false)),
                other => Err(format!("'{}' is not a boolean", other)),
            },
            (AttributeType::MultiSelect, &Value::Array(ref items)) => items
                .iter()
                .map(|item| match *item {
                    Value::String(ref s) => Ok(s.clone()),
                    ref other => Err(format!("{} is not an option", other)),
                }).collect::<Result<Vec<String>, String>>()
                .map(AttributeValue::MultiSelect),
            (value_type, other) => Err(format!("{} is not a valid {} value", other, value_type)),
        }
    }

    pub fn to_json(&self) -> Value {
        match *self {
            AttributeValue::Text(ref s) | AttributeValue::Select(ref s) => json!(s),
            AttributeValue::Number(Some(n)) => json!(n),
            AttributeValue::Number(None) => Value::Null,
            AttributeValue::Boolean(b) => json!(b),
            AttributeValue::MultiSelect(ref items) => json!(items),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Attribute value as it travels in business payloads
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AttributeValuePayload {
    pub attribute_id: AttributeId,
    pub value: Value,
}

/// Payload for querying business attribute values
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable, PartialEq)]
#[table_name = "business_attributes"]
pub struct BusinessAttribute {
    pub id: i32,
    pub business_id: BusinessId,
    pub attribute_id: AttributeId,
    pub value: Value,
}

/// Payload for inserting business attribute values
#[derive(Serialize, Deserialize, Insertable, Clone, Debug)]
#[table_name = "business_attributes"]
pub struct NewBusinessAttribute {
    pub business_id: BusinessId,
    pub attribute_id: AttributeId,
    pub value: Value,
}

//! Module containing category model for query, insert, update
use std::time::SystemTime;

use validator::Validate;

use models::validation_rules::*;
use models::CategoryId;
use schema::categories;

/// Payload for querying categories
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable, PartialEq)]
#[table_name = "categories"]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub icon: Option<String>,
    pub is_active: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Payload for creating categories
#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "categories"]
pub struct NewCategory {
    #[validate(length(min = "1", max = "100", message = "Name must be 1 to 100 characters long"))]
    pub name: String,
    #[validate(length(max = "1000", message = "Description is too long"))]
    pub description: String,
    #[validate(custom = "validate_slug")]
    pub slug: String,
    pub icon: Option<String>,
}

/// Payload for updating categories
#[derive(Default, Serialize, Deserialize, Insertable, Validate, AsChangeset, Clone, Debug)]
#[table_name = "categories"]
pub struct UpdateCategory {
    #[validate(length(min = "1", max = "100", message = "Name must be 1 to 100 characters long"))]
    pub name: Option<String>,
    #[validate(length(max = "1000", message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(custom = "validate_slug")]
    pub slug: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

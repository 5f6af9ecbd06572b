//! Module containing subcategory model for query, insert, update
use validator::Validate;

use models::{CategoryId, SubcategoryId};
use schema::subcategories;

/// Payload for querying subcategories
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable, PartialEq)]
#[table_name = "subcategories"]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

/// Payload for creating subcategories, `category_id` is taken from the route
#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "subcategories"]
pub struct NewSubcategory {
    #[serde(default)]
    pub category_id: CategoryId,
    #[validate(length(min = "1", max = "100", message = "Name must be 1 to 100 characters long"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = "1000", message = "Description is too long"))]
    pub description: String,
}

/// Payload for updating subcategories
#[derive(Default, Serialize, Deserialize, Insertable, Validate, AsChangeset, Clone, Debug)]
#[table_name = "subcategories"]
pub struct UpdateSubcategory {
    #[validate(length(min = "1", max = "100", message = "Name must be 1 to 100 characters long"))]
    pub name: Option<String>,
    #[validate(length(max = "1000", message = "Description is too long"))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateSubcategory {
    /// Nothing to change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.is_active.is_none()
    }
}

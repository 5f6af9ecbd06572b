//! Category schema: everything a business form needs to know about a category
use models::{AttributeDefinition, AttributeId, Category, CategoryId, Subcategory, SubcategoryId};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CategorySchema {
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
    pub attributes: Vec<AttributeDefinition>,
}

impl CategorySchema {
    pub fn category_id(&self) -> CategoryId {
        self.category.id
    }

    pub fn definition(&self, attribute_id: AttributeId) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|definition| definition.id == attribute_id)
    }

    pub fn has_subcategory(&self, subcategory_id: SubcategoryId) -> bool {
        self.subcategories
            .iter()
            .any(|subcategory| subcategory.id == subcategory_id && subcategory.is_active)
    }
}

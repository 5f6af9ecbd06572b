//! Form is the category-schema-driven multi-step business form.
//!
//! The wizard walks an owner through the fixed steps of `FormStep`,
//! keeps category attribute values in an `AttributeStore` bound to the
//! selected category schema and hands the normalized payload to a
//! `BusinessDispatcher` on submit. Nothing here talks to the database
//! directly: schemas come from a `CategorySchemaProvider`.

pub mod draft;
pub mod fields;
pub mod images;
pub mod steps;
pub mod store;
pub mod submission;
pub mod wizard;

pub use self::draft::*;
pub use self::fields::*;
pub use self::images::*;
pub use self::steps::*;
pub use self::store::*;
pub use self::submission::*;
pub use self::wizard::*;

use models::{AttributeId, AttributeType, CategoryId, CategorySchema, FieldErrors};
use services::types::ServiceFuture;

/// Source of category schemas for the form
pub trait CategorySchemaProvider {
    /// Returns category with its subcategories and attribute definitions
    fn category_schema(&self, category_id: CategoryId) -> ServiceFuture<CategorySchema>;
}

/// Misuse of the form state, the state is left untouched
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum FormError {
    #[fail(display = "Attribute {} is not part of the selected category", _0)]
    UnknownAttribute(AttributeId),
    #[fail(display = "Attribute {} expects a {} value", _0, _1)]
    TypeMismatch(AttributeId, AttributeType),
    #[fail(display = "'{}' is not an option of attribute {}", _1, _0)]
    UnknownOption(AttributeId, String),
    #[fail(display = "{}", _0)]
    InvalidInput(String),
    #[fail(display = "Subcategory does not belong to the selected category")]
    UnknownSubcategory,
    #[fail(display = "There is no previous step")]
    NoPreviousStep,
    #[fail(display = "This is the last step, submit the form")]
    LastStep,
    #[fail(display = "Fields of the step are invalid: {}", _0)]
    Invalid(FieldErrors),
    #[fail(display = "The form is being submitted")]
    Busy,
    #[fail(display = "The form has already been submitted")]
    Submitted,
}

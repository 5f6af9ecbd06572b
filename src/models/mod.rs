//! Models contains all structures that are used in different
//! modules of the app

pub mod attribute;
pub mod attribute_value;
pub mod business;
pub mod category;
pub mod category_schema;
pub mod field_errors;
pub mod subcategory;
pub mod types;
pub mod validation_rules;

pub use self::attribute::*;
pub use self::attribute_value::*;
pub use self::business::*;
pub use self::category::*;
pub use self::category_schema::*;
pub use self::field_errors::*;
pub use self::subcategory::*;
pub use self::types::*;
pub use self::validation_rules::*;

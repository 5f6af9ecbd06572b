//! Repos is a module responsible for interacting with postgres db

pub mod attribute_definitions;
pub mod business_attributes;
pub mod businesses;
pub mod categories;
pub mod repo_factory;
pub mod subcategories;
pub mod types;

pub use self::attribute_definitions::*;
pub use self::business_attributes::*;
pub use self::businesses::*;
pub use self::categories::*;
pub use self::repo_factory::*;
pub use self::subcategories::*;
pub use self::types::*;

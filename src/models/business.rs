//! Module containing business model for query, insert, update
use std::fmt;
use std::time::SystemTime;

use failure::Error as FailureError;
use serde_json;
use validator::Validate;

use models::validation_rules::*;
use models::{AttributeValuePayload, BusinessAttribute, BusinessId, CategoryId, SubcategoryId, UserId};
use schema::businesses;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn all() -> [Weekday; 7] {
        [
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        };
        write!(f, "{}", name)
    }
}

/// Opening hours of one weekday, times are `HH:MM`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BusinessHours {
    pub day: Weekday,
    pub open: String,
    pub close: String,
    pub closed: bool,
}

impl BusinessHours {
    /// Nine to five on weekdays, closed on weekends
    pub fn default_week() -> Vec<BusinessHours> {
        Weekday::all()
            .iter()
            .map(|&day| BusinessHours {
                day,
                open: "09:00".to_string(),
                close: "17:00".to_string(),
                closed: day == Weekday::Saturday || day == Weekday::Sunday,
            }).collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

/// Business as it is stored in PG
#[derive(Debug, Queryable, Clone, Identifiable)]
#[table_name = "businesses"]
pub struct RawBusiness {
    pub id: BusinessId,
    pub user_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_range: i32,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub hours: serde_json::Value,
    pub social_media: serde_json::Value,
    pub images: serde_json::Value,
    pub additional_info: Option<String>,
    pub is_active: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Payload for querying businesses
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Business {
    pub id: BusinessId,
    pub user_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_range: i32,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub hours: Vec<BusinessHours>,
    pub social_media: Vec<SocialLink>,
    pub images: Vec<String>,
    pub additional_info: Option<String>,
    pub attributes: Vec<BusinessAttribute>,
    pub is_active: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl Business {
    pub fn from_raw(raw: RawBusiness, attributes: Vec<BusinessAttribute>) -> Result<Business, FailureError> {
        let id = raw.id;
        let hours = serde_json::from_value(raw.hours).map_err(|e| format_err!("Business {} has malformed hours: {}", id, e))?;
        let social_media =
            serde_json::from_value(raw.social_media).map_err(|e| format_err!("Business {} has malformed social links: {}", id, e))?;
        let images = serde_json::from_value(raw.images).map_err(|e| format_err!("Business {} has malformed images: {}", id, e))?;
        Ok(Business {
            id,
            user_id: raw.user_id,
            name: raw.name,
            slug: raw.slug,
            description: raw.description,
            price_range: raw.price_range,
            category_id: raw.category_id,
            subcategory_id: raw.subcategory_id,
            address: raw.address,
            city: raw.city,
            state: raw.state,
            zip_code: raw.zip_code,
            phone: raw.phone,
            email: raw.email,
            website: raw.website,
            hours,
            social_media,
            images,
            additional_info: raw.additional_info,
            attributes,
            is_active: raw.is_active,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

/// Normalized business payload, used both for creating and updating
#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
pub struct BusinessPayload {
    #[validate(length(min = "1", max = "100", message = "Name must be 1 to 100 characters long"))]
    pub name: String,
    #[validate(length(min = "10", max = "2000", message = "Description must be 10 to 2000 characters long"))]
    pub description: String,
    #[validate(range(min = "1", max = "4", message = "Price range must be between 1 and 4"))]
    pub price_range: i32,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    #[validate(length(min = "1", max = "200", message = "Address is required"))]
    pub address: String,
    #[validate(length(min = "1", max = "100", message = "City is required"))]
    pub city: String,
    #[validate(length(min = "1", max = "100", message = "State is required"))]
    pub state: String,
    #[validate(custom = "validate_zip_code")]
    pub zip_code: String,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(url(message = "Invalid website url"))]
    pub website: Option<String>,
    #[validate(custom = "validate_hours")]
    pub hours: Vec<BusinessHours>,
    #[serde(default)]
    #[validate(custom = "validate_social_links")]
    pub social_media: Vec<SocialLink>,
    #[serde(default)]
    #[validate(custom = "validate_images")]
    pub images: Vec<String>,
    #[validate(length(max = "2000", message = "Additional info is too long"))]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeValuePayload>,
}

/// Payload for inserting businesses
#[derive(Insertable, Clone, Debug)]
#[table_name = "businesses"]
pub struct NewBusinessRow {
    pub user_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_range: i32,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub hours: serde_json::Value,
    pub social_media: serde_json::Value,
    pub images: serde_json::Value,
    pub additional_info: Option<String>,
}

impl NewBusinessRow {
    pub fn new(user_id: UserId, slug: String, payload: BusinessPayload) -> Self {
        Self {
            user_id,
            name: payload.name,
            slug,
            description: payload.description,
            price_range: payload.price_range,
            category_id: payload.category_id,
            subcategory_id: payload.subcategory_id,
            address: payload.address,
            city: payload.city,
            state: payload.state,
            zip_code: payload.zip_code,
            phone: payload.phone,
            email: payload.email,
            website: payload.website,
            hours: json!(payload.hours),
            social_media: json!(payload.social_media),
            images: json!(payload.images),
            additional_info: payload.additional_info,
        }
    }
}

/// Payload for updating businesses, optional columns are cleared when absent
#[derive(AsChangeset, Clone, Debug)]
#[table_name = "businesses"]
#[changeset_options(treat_none_as_null = "true")]
pub struct UpdateBusinessRow {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_range: i32,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub hours: serde_json::Value,
    pub social_media: serde_json::Value,
    pub images: serde_json::Value,
    pub additional_info: Option<String>,
    pub updated_at: SystemTime,
}

impl UpdateBusinessRow {
    pub fn new(slug: String, payload: BusinessPayload) -> Self {
        Self {
            name: payload.name,
            slug,
            description: payload.description,
            price_range: payload.price_range,
            category_id: payload.category_id,
            subcategory_id: payload.subcategory_id,
            address: payload.address,
            city: payload.city,
            state: payload.state,
            zip_code: payload.zip_code,
            phone: payload.phone,
            email: payload.email,
            website: payload.website,
            hours: json!(payload.hours),
            social_media: json!(payload.social_media),
            images: json!(payload.images),
            additional_info: payload.additional_info,
            updated_at: SystemTime::now(),
        }
    }
}

/// Filters for listing businesses
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct BusinessesSearchTerms {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub user_id: Option<UserId>,
    pub only_active: bool,
}

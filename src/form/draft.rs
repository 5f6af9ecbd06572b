//! Business fields as they are being typed into the form
use models::{Business, BusinessHours, CategoryId, SocialLink, SubcategoryId};

/// Platforms offered with an empty url on a fresh form
pub const SOCIAL_PLATFORMS: [&str; 4] = ["Facebook", "Instagram", "Twitter", "LinkedIn"];

/// Raw form state, nothing is trimmed or validated until a step is left
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BusinessDraft {
    pub name: String,
    pub description: String,
    pub price_range: i32,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub hours: Vec<BusinessHours>,
    pub social_media: Vec<SocialLink>,
    pub images: Vec<String>,
    pub additional_info: String,
}

impl Default for BusinessDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price_range: 1,
            category_id: None,
            subcategory_id: None,
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            hours: BusinessHours::default_week(),
            social_media: SOCIAL_PLATFORMS
                .iter()
                .map(|platform| SocialLink {
                    platform: platform.to_string(),
                    url: String::new(),
                }).collect(),
            images: vec![],
            additional_info: String::new(),
        }
    }
}

impl<'a> From<&'a Business> for BusinessDraft {
    fn from(business: &'a Business) -> Self {
        let mut social_media = business.social_media.clone();
        for platform in SOCIAL_PLATFORMS.iter() {
            if !social_media.iter().any(|link| link.platform == *platform) {
                social_media.push(SocialLink {
                    platform: platform.to_string(),
                    url: String::new(),
                });
            }
        }
        let hours = if business.hours.is_empty() {
            BusinessHours::default_week()
        } else {
            business.hours.clone()
        };
        Self {
            name: business.name.clone(),
            description: business.description.clone(),
            price_range: business.price_range,
            category_id: Some(business.category_id),
            subcategory_id: business.subcategory_id,
            address: business.address.clone(),
            city: business.city.clone(),
            state: business.state.clone(),
            zip_code: business.zip_code.clone(),
            phone: business.phone.clone().unwrap_or_default(),
            email: business.email.clone().unwrap_or_default(),
            website: business.website.clone().unwrap_or_default(),
            hours,
            social_media,
            images: business.images.clone(),
            additional_info: business.additional_info.clone().unwrap_or_default(),
        }
    }
}

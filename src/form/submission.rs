//! Submission pipeline: normalization of the draft and dispatch of the payload
use super::draft::BusinessDraft;
use super::store::AttributeStore;
use models::{AttributeValue, AttributeValuePayload, Business, BusinessHours, BusinessId, BusinessPayload, SocialLink};
use services::types::ServiceFuture;

/// Receiver of normalized business payloads
pub trait BusinessDispatcher {
    /// Creates a business owned by the current user
    fn create_business(&self, payload: BusinessPayload) -> ServiceFuture<Business>;

    /// Replaces fields and attribute values of an existing business
    fn update_business(&self, business_id: BusinessId, payload: BusinessPayload) -> ServiceFuture<Business>;
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Social links with an actual url, trimmed
pub fn normalize_social_links(links: &[SocialLink]) -> Vec<SocialLink> {
    links
        .iter()
        .filter(|link| !link.url.trim().is_empty())
        .map(|link| SocialLink {
            platform: trimmed(&link.platform),
            url: trimmed(&link.url),
        }).collect()
}

/// Values of the store as they are sent, an unset optional number is left out
pub fn normalize_attributes(store: &AttributeStore) -> Vec<AttributeValuePayload> {
    store
        .values()
        .into_iter()
        .filter(|&(definition, ref value)| definition.required || *value != AttributeValue::Number(None))
        .map(|(definition, value)| AttributeValuePayload {
            attribute_id: definition.id,
            value: value.to_json(),
        }).collect()
}

/// Turns the draft into the payload dispatched to the service
pub fn normalize(draft: &BusinessDraft, store: &AttributeStore) -> BusinessPayload {
    BusinessPayload {
        name: trimmed(&draft.name),
        description: trimmed(&draft.description),
        price_range: draft.price_range,
        category_id: draft.category_id.unwrap_or_default(),
        subcategory_id: draft.subcategory_id,
        address: trimmed(&draft.address),
        city: trimmed(&draft.city),
        state: trimmed(&draft.state),
        zip_code: trimmed(&draft.zip_code),
        phone: optional(&draft.phone),
        email: optional(&draft.email),
        website: optional(&draft.website),
        hours: draft
            .hours
            .iter()
            .map(|hours| BusinessHours {
                day: hours.day,
                open: trimmed(&hours.open),
                close: trimmed(&hours.close),
                closed: hours.closed,
            }).collect(),
        social_media: normalize_social_links(&draft.social_media),
        images: draft.images.clone(),
        additional_info: optional(&draft.additional_info),
        attributes: normalize_attributes(store),
    }
}

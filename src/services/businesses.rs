//! Businesses Services, presents CRUD operations with businesses and
//! the typed category attribute values they carry

use std::collections::HashSet;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;
use validator::Validate;

use super::categories::find_category_schema;
use super::types::ServiceFuture;
use super::{require_user, Service};
use errors::Error;
use form::{validate_attributes, AttributeStore, BusinessDispatcher};
use models::*;
use repos::ReposFactory;

pub trait BusinessesService {
    /// Returns active businesses matching `terms`, starting after `from`
    fn list_businesses(&self, terms: BusinessesSearchTerms, from: BusinessId, count: i64) -> ServiceFuture<Vec<Business>>;
    /// Returns businesses of the current user, inactive included
    fn list_owned_businesses(&self, from: BusinessId, count: i64) -> ServiceFuture<Vec<Business>>;
    /// Returns business by ID
    fn get_business(&self, business_id: BusinessId) -> ServiceFuture<Business>;
    /// Hides business from public listings
    fn deactivate_business(&self, business_id: BusinessId) -> ServiceFuture<Business>;
}

/// Payload checked against its category, ready to be written
struct PreparedBusiness {
    slug: String,
    payload: BusinessPayload,
    attributes: Vec<(AttributeId, AttributeValue)>,
}

fn not_found(business_id: BusinessId) -> FailureError {
    format_err!("Business {} not found", business_id).context(Error::NotFound).into()
}

/// Checks payload fields, category, subcategory and attribute values, derives the slug
fn prepare_business<T, F>(
    conn: &T,
    repo_factory: &F,
    payload: BusinessPayload,
    exclude: Option<BusinessId>,
) -> Result<PreparedBusiness, FailureError>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    F: ReposFactory<T>,
{
    let businesses_repo = repo_factory.create_businesses_repo(conn);
    let mut errors = payload.validate().err().map(FieldErrors::from).unwrap_or_default();
    let mut attributes = vec![];

    match find_category_schema(conn, repo_factory, payload.category_id, false)? {
        None => errors.add("category_id", "required", "Please select a category"),
        Some(schema) => {
            if let Some(subcategory_id) = payload.subcategory_id {
                if !schema.has_subcategory(subcategory_id) {
                    errors.add("subcategory_id", "invalid", "Subcategory does not belong to the selected category");
                }
            }

            let mut store = AttributeStore::from(&schema);
            let mut provided = HashSet::new();
            for item in &payload.attributes {
                let definition = match schema.definition(item.attribute_id) {
                    Some(definition) => definition,
                    None => {
                        debug!("Dropping value of attribute {}, it is not part of category {}", item.attribute_id, schema.category_id());
                        continue;
                    }
                };
                let stored = AttributeValue::from_json(definition.value_type, &item.value)
                    .map_err(|e| e.to_string())
                    .and_then(|value| store.set(definition.id, value.clone()).map(|_| value).map_err(|e| e.to_string()));
                match stored {
                    Ok(value) => {
                        provided.insert(definition.id);
                        attributes.push((definition.id, value));
                    }
                    Err(message) => errors.add(definition.name.as_str(), "invalid", message),
                }
            }

            // a missing required value is not replaced by the type default
            let mut attribute_errors = validate_attributes(&schema, &store);
            for definition in &schema.attributes {
                let absent = definition.required && definition.value_type != AttributeType::Boolean && !provided.contains(&definition.id);
                if absent && !attribute_errors.contains(&definition.name) {
                    attribute_errors.add(definition.name.as_str(), "required", format!("{} is required", definition.name));
                }
            }
            let fresh: Vec<String> = attribute_errors
                .fields()
                .into_iter()
                .filter(|field| !errors.contains(field))
                .map(String::from)
                .collect();
            attribute_errors.retain_fields(&fresh.iter().map(|field| field.as_str()).collect::<Vec<_>>());
            errors.merge(attribute_errors);
        }
    }

    let slug = slugify(&payload.name);
    if slug.is_empty() {
        if !errors.contains("name") {
            errors.add("name", "slug", "Name must contain letters or digits");
        }
    } else if businesses_repo.slug_exists(slug.clone(), exclude)? {
        errors.add("name", "slug", "Business with this name already exists");
    }

    if !errors.is_empty() {
        return Err(format_err!("Business payload is invalid")
            .context(Error::Validate(errors))
            .into());
    }

    Ok(PreparedBusiness {
        slug,
        payload,
        attributes,
    })
}

fn new_business_attributes(business_id: BusinessId, attributes: Vec<(AttributeId, AttributeValue)>) -> Vec<NewBusinessAttribute> {
    attributes
        .into_iter()
        .map(|(attribute_id, value)| NewBusinessAttribute {
            business_id,
            attribute_id,
            value: value.to_json(),
        }).collect()
}

/// Joins raw rows with their attribute values
fn with_attributes(raw: Vec<RawBusiness>, values: Vec<BusinessAttribute>) -> Result<Vec<Business>, FailureError> {
    raw.into_iter()
        .map(|business| {
            let attributes = values.iter().filter(|value| value.business_id == business.id).cloned().collect();
            Business::from_raw(business, attributes)
        }).collect()
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > BusinessesService for Service<T, M, F>
{
    fn list_businesses(&self, terms: BusinessesSearchTerms, from: BusinessId, count: i64) -> ServiceFuture<Vec<Business>> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let businesses_repo = repo_factory.create_businesses_repo(&*conn);
            let business_attributes_repo = repo_factory.create_business_attributes_repo(&*conn);
            let terms = BusinessesSearchTerms { only_active: true, ..terms };
            businesses_repo
                .list(terms, from, count)
                .and_then(|raw| {
                    let ids = raw.iter().map(|business| business.id).collect();
                    business_attributes_repo
                        .list_for_businesses(ids)
                        .and_then(|values| with_attributes(raw, values))
                }).map_err(|e| e.context("Service Businesses, list endpoint error occured.").into())
        })
    }

    fn list_owned_businesses(&self, from: BusinessId, count: i64) -> ServiceFuture<Vec<Business>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let businesses_repo = repo_factory.create_businesses_repo(&*conn);
            let business_attributes_repo = repo_factory.create_business_attributes_repo(&*conn);
            require_user(user_id)
                .and_then(|user_id| {
                    let terms = BusinessesSearchTerms {
                        user_id: Some(user_id),
                        ..Default::default()
                    };
                    businesses_repo.list(terms, from, count)
                }).and_then(|raw| {
                    let ids = raw.iter().map(|business| business.id).collect();
                    business_attributes_repo
                        .list_for_businesses(ids)
                        .and_then(|values| with_attributes(raw, values))
                }).map_err(|e| e.context("Service Businesses, list_owned endpoint error occured.").into())
        })
    }

    fn get_business(&self, business_id: BusinessId) -> ServiceFuture<Business> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let businesses_repo = repo_factory.create_businesses_repo(&*conn);
            let business_attributes_repo = repo_factory.create_business_attributes_repo(&*conn);
            businesses_repo
                .find(business_id)
                .and_then(|business| match business {
                    Some(ref business) if !business.is_active && Some(business.user_id) != user_id => Err(not_found(business_id)),
                    Some(business) => Ok(business),
                    None => Err(not_found(business_id)),
                }).and_then(|business| {
                    business_attributes_repo
                        .list_for_business(business_id)
                        .and_then(|attributes| Business::from_raw(business, attributes))
                }).map_err(|e| e.context("Service Businesses, get endpoint error occured.").into())
        })
    }

    fn deactivate_business(&self, business_id: BusinessId) -> ServiceFuture<Business> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let businesses_repo = repo_factory.create_businesses_repo(&*conn);
            let business_attributes_repo = repo_factory.create_business_attributes_repo(&*conn);
            conn.transaction::<(Business), FailureError, _>(move || {
                let user_id = require_user(user_id)?;
                let current = businesses_repo.find(business_id)?.ok_or_else(|| not_found(business_id))?;
                check_owner(&current, user_id)?;
                let business = businesses_repo.deactivate(business_id)?;
                let attributes = business_attributes_repo.list_for_business(business_id)?;
                Business::from_raw(business, attributes)
            }).map_err(|e| e.context("Service Businesses, deactivate endpoint error occured.").into())
        })
    }
}

fn check_owner(business: &RawBusiness, user_id: UserId) -> Result<(), FailureError> {
    if business.user_id == user_id {
        Ok(())
    } else {
        Err(format_err!("User {} does not own business {}", user_id, business.id)
            .context(Error::Forbidden)
            .into())
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > BusinessDispatcher for Service<T, M, F>
{
    fn create_business(&self, payload: BusinessPayload) -> ServiceFuture<Business> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let businesses_repo = repo_factory.create_businesses_repo(&*conn);
            let business_attributes_repo = repo_factory.create_business_attributes_repo(&*conn);
            conn.transaction::<(Business), FailureError, _>(|| {
                let user_id = require_user(user_id)?;
                let prepared = prepare_business(&*conn, &repo_factory, payload, None)?;
                let business = businesses_repo.create(NewBusinessRow::new(user_id, prepared.slug, prepared.payload))?;
                let attributes = business_attributes_repo.replace(business.id, new_business_attributes(business.id, prepared.attributes))?;
                info!("Business {} created by user {}", business.id, user_id);
                Business::from_raw(business, attributes)
            }).map_err(|e| e.context("Service Businesses, create endpoint error occured.").into())
        })
    }

    fn update_business(&self, business_id: BusinessId, payload: BusinessPayload) -> ServiceFuture<Business> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let businesses_repo = repo_factory.create_businesses_repo(&*conn);
            let business_attributes_repo = repo_factory.create_business_attributes_repo(&*conn);
            conn.transaction::<(Business), FailureError, _>(|| {
                let user_id = require_user(user_id)?;
                let current = businesses_repo.find(business_id)?.ok_or_else(|| not_found(business_id))?;
                check_owner(&current, user_id)?;
                let prepared = prepare_business(&*conn, &repo_factory, payload, Some(business_id))?;
                let business = businesses_repo.update(business_id, UpdateBusinessRow::new(prepared.slug, prepared.payload))?;
                let attributes = business_attributes_repo.replace(business_id, new_business_attributes(business_id, prepared.attributes))?;
                Business::from_raw(business, attributes)
            }).map_err(|e| e.context("Service Businesses, update endpoint error occured.").into())
        })
    }
}

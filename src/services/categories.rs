//! Categories Services, presents CRUD operations with categories, subcategories
//! and attribute definitions together with the category schema fetch

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;
use validator::Validate;

use super::types::ServiceFuture;
use super::{require_admin, Service};
use errors::Error;
use form::{check_value, CategorySchemaProvider};
use models::*;
use repos::ReposFactory;

pub trait CategoriesService {
    /// Returns categories, inactive ones are listed for admins only
    fn list_categories(&self, with_inactive: bool) -> ServiceFuture<Vec<Category>>;
    /// Returns category by ID
    fn get_category(&self, category_id: CategoryId) -> ServiceFuture<Category>;
    /// Creates new category
    fn create_category(&self, payload: NewCategory) -> ServiceFuture<Category>;
    /// Updates specific category
    fn update_category(&self, category_id: CategoryId, payload: UpdateCategory) -> ServiceFuture<Category>;
    /// Hides category from public listings
    fn deactivate_category(&self, category_id: CategoryId) -> ServiceFuture<Category>;
    /// Adds subcategory to category
    fn create_subcategory(&self, category_id: CategoryId, payload: NewSubcategory) -> ServiceFuture<Subcategory>;
    /// Updates specific subcategory
    fn update_subcategory(&self, subcategory_id: SubcategoryId, payload: UpdateSubcategory) -> ServiceFuture<Subcategory>;
    /// Adds attribute definition to category
    fn create_attribute(&self, category_id: CategoryId, payload: NewAttributeDefinition) -> ServiceFuture<AttributeDefinition>;
    /// Updates specific attribute definition, business values that no longer fit it are deleted
    fn update_attribute(&self, attribute_id: AttributeId, payload: UpdateAttributeDefinition) -> ServiceFuture<AttributeDefinition>;
    /// Deletes attribute definition with all values businesses have for it
    fn delete_attribute(&self, attribute_id: AttributeId) -> ServiceFuture<AttributeDefinition>;
}

fn not_found(what: String) -> FailureError {
    format_err!("{} not found", what).context(Error::NotFound).into()
}

fn invalid(errors: FieldErrors) -> FailureError {
    format_err!("Category payload is invalid").context(Error::Validate(errors)).into()
}

/// Loads category schema, `None` when category is missing or hidden
pub fn find_category_schema<T, F>(
    conn: &T,
    repo_factory: &F,
    category_id: CategoryId,
    with_inactive: bool,
) -> Result<Option<CategorySchema>, FailureError>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    F: ReposFactory<T>,
{
    let categories_repo = repo_factory.create_categories_repo(conn);
    let subcategories_repo = repo_factory.create_subcategories_repo(conn);
    let attribute_definitions_repo = repo_factory.create_attribute_definitions_repo(conn);

    let category = match categories_repo.find(category_id)? {
        Some(ref category) if !category.is_active && !with_inactive => return Ok(None),
        Some(category) => category,
        None => return Ok(None),
    };
    let subcategories = subcategories_repo.list_for_category(category_id, with_inactive)?;
    let attributes = attribute_definitions_repo.list_for_category(category_id)?;

    Ok(Some(CategorySchema {
        category,
        subcategories,
        attributes,
    }))
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > CategorySchemaProvider for Service<T, M, F>
{
    fn category_schema(&self, category_id: CategoryId) -> ServiceFuture<CategorySchema> {
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            find_category_schema(&*conn, &repo_factory, category_id, false)
                .and_then(|schema| schema.ok_or_else(|| not_found(format!("Category {}", category_id))))
                .map_err(|e| e.context("Service Categories, category_schema endpoint error occured.").into())
        })
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > CategoriesService for Service<T, M, F>
{
    fn list_categories(&self, with_inactive: bool) -> ServiceFuture<Vec<Category>> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            let with_inactive = with_inactive && user_id.map(|user_id| config.is_admin(user_id)).unwrap_or(false);
            categories_repo
                .list(with_inactive)
                .map_err(|e| e.context("Service Categories, list endpoint error occured.").into())
        })
    }

    fn get_category(&self, category_id: CategoryId) -> ServiceFuture<Category> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            let is_admin = user_id.map(|user_id| config.is_admin(user_id)).unwrap_or(false);
            categories_repo
                .find(category_id)
                .and_then(|category| match category {
                    Some(ref category) if !category.is_active && !is_admin => Err(not_found(format!("Category {}", category_id))),
                    Some(category) => Ok(category),
                    None => Err(not_found(format!("Category {}", category_id))),
                }).map_err(|e| e.context("Service Categories, get endpoint error occured.").into())
        })
    }

    fn create_category(&self, payload: NewCategory) -> ServiceFuture<Category> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            conn.transaction::<(Category), FailureError, _>(move || {
                require_admin(&config, user_id)?;
                payload.validate().map_err(|e| invalid(e.into()))?;
                if categories_repo.slug_exists(payload.slug.clone(), None)? {
                    return Err(invalid(validation_errors!({
                        "slug": ["slug" => "Category with this slug already exists"]
                    })));
                }
                categories_repo.create(payload)
            }).map_err(|e| e.context("Service Categories, create endpoint error occured.").into())
        })
    }

    fn update_category(&self, category_id: CategoryId, payload: UpdateCategory) -> ServiceFuture<Category> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            conn.transaction::<(Category), FailureError, _>(move || {
                require_admin(&config, user_id)?;
                payload.validate().map_err(|e| invalid(e.into()))?;
                if categories_repo.find(category_id)?.is_none() {
                    return Err(not_found(format!("Category {}", category_id)));
                }
                if let Some(ref slug) = payload.slug {
                    if categories_repo.slug_exists(slug.clone(), Some(category_id))? {
                        return Err(invalid(validation_errors!({
                            "slug": ["slug" => "Category with this slug already exists"]
                        })));
                    }
                }
                categories_repo.update(category_id, payload)
            }).map_err(|e| e.context("Service Categories, update endpoint error occured.").into())
        })
    }

    fn deactivate_category(&self, category_id: CategoryId) -> ServiceFuture<Category> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            require_admin(&config, user_id)
                .and_then(|_| categories_repo.find(category_id))
                .and_then(|category| category.ok_or_else(|| not_found(format!("Category {}", category_id))))
                .and_then(|_| categories_repo.deactivate(category_id))
                .map_err(|e| e.context("Service Categories, deactivate endpoint error occured.").into())
        })
    }

    fn create_subcategory(&self, category_id: CategoryId, payload: NewSubcategory) -> ServiceFuture<Subcategory> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            let subcategories_repo = repo_factory.create_subcategories_repo(&*conn);
            conn.transaction::<(Subcategory), FailureError, _>(move || {
                require_admin(&config, user_id)?;
                let payload = NewSubcategory { category_id, ..payload };
                payload.validate().map_err(|e| invalid(e.into()))?;
                if categories_repo.find(category_id)?.is_none() {
                    return Err(not_found(format!("Category {}", category_id)));
                }
                subcategories_repo.create(payload)
            }).map_err(|e| e.context("Service Categories, create_subcategory endpoint error occured.").into())
        })
    }

    fn update_subcategory(&self, subcategory_id: SubcategoryId, payload: UpdateSubcategory) -> ServiceFuture<Subcategory> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let subcategories_repo = repo_factory.create_subcategories_repo(&*conn);
            conn.transaction::<(Subcategory), FailureError, _>(move || {
                require_admin(&config, user_id)?;
                payload.validate().map_err(|e| invalid(e.into()))?;
                let current = subcategories_repo
                    .find(subcategory_id)?
                    .ok_or_else(|| not_found(format!("Subcategory {}", subcategory_id)))?;
                if payload.is_empty() {
                    return Ok(current);
                }
                subcategories_repo.update(subcategory_id, payload)
            }).map_err(|e| e.context("Service Categories, update_subcategory endpoint error occured.").into())
        })
    }

    fn create_attribute(&self, category_id: CategoryId, payload: NewAttributeDefinition) -> ServiceFuture<AttributeDefinition> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn);
            let attribute_definitions_repo = repo_factory.create_attribute_definitions_repo(&*conn);
            conn.transaction::<(AttributeDefinition), FailureError, _>(move || {
                require_admin(&config, user_id)?;
                let payload = NewAttributeDefinition { category_id, ..payload };
                payload.check().map_err(invalid)?;
                if categories_repo.find(category_id)?.is_none() {
                    return Err(not_found(format!("Category {}", category_id)));
                }
                attribute_definitions_repo.create(payload.into())
            }).map_err(|e| e.context("Service Categories, create_attribute endpoint error occured.").into())
        })
    }

    fn update_attribute(&self, attribute_id: AttributeId, payload: UpdateAttributeDefinition) -> ServiceFuture<AttributeDefinition> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let attribute_definitions_repo = repo_factory.create_attribute_definitions_repo(&*conn);
            let business_attributes_repo = repo_factory.create_business_attributes_repo(&*conn);
            conn.transaction::<(AttributeDefinition), FailureError, _>(move || {
                require_admin(&config, user_id)?;
                let current = attribute_definitions_repo
                    .find(attribute_id)?
                    .ok_or_else(|| not_found(format!("Attribute {}", attribute_id)))?;
                payload.check(&current).map_err(invalid)?;
                let changeset = UpdateAttributeDefinitionRow::from(payload);
                if changeset.is_empty() {
                    return Ok(current);
                }
                let reshaped = changeset.value_type.is_some() || changeset.options.is_some();
                let updated = attribute_definitions_repo.update(attribute_id, changeset)?;
                if reshaped {
                    let stored = business_attributes_repo.list_for_attribute(attribute_id)?;
                    let stale = stale_values(&updated, &stored);
                    if !stale.is_empty() {
                        let removed = business_attributes_repo.delete_values(stale)?;
                        debug!("Removed {} business values not fitting attribute {}", removed.len(), attribute_id);
                    }
                }
                Ok(updated)
            }).map_err(|e| e.context("Service Categories, update_attribute endpoint error occured.").into())
        })
    }

    fn delete_attribute(&self, attribute_id: AttributeId) -> ServiceFuture<AttributeDefinition> {
        let user_id = self.dynamic_context.user_id;
        let config = self.static_context.config.clone();
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let attribute_definitions_repo = repo_factory.create_attribute_definitions_repo(&*conn);
            let business_attributes_repo = repo_factory.create_business_attributes_repo(&*conn);
            conn.transaction::<(AttributeDefinition), FailureError, _>(move || {
                require_admin(&config, user_id)?;
                if attribute_definitions_repo.find(attribute_id)?.is_none() {
                    return Err(not_found(format!("Attribute {}", attribute_id)));
                }
                let removed = business_attributes_repo.delete_by_attribute(attribute_id)?;
                debug!("Removed {} business values of attribute {}", removed.len(), attribute_id);
                attribute_definitions_repo.delete(attribute_id)
            }).map_err(|e| e.context("Service Categories, delete_attribute endpoint error occured.").into())
        })
    }
}

/// Ids of stored values that do not fit `definition`
fn stale_values(definition: &AttributeDefinition, stored: &[BusinessAttribute]) -> Vec<i32> {
    stored
        .iter()
        .filter(|item| {
            AttributeValue::from_json(definition.value_type, &item.value)
                .ok()
                .map(|value| check_value(definition, &value).is_err())
                .unwrap_or(true)
        }).map(|item| item.id)
        .collect()
}

//! Attribute definitions repo, presents CRUD operations with db for category attributes
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::{AttributeDefinition, AttributeId, CategoryId, NewAttributeDefinitionRow, RawAttributeDefinition, UpdateAttributeDefinitionRow};
use repos::types::RepoResult;
use schema::attribute_definitions::dsl::*;

/// Attribute definitions repository, rows are checked while being read
pub struct AttributeDefinitionsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait AttributeDefinitionsRepo {
    /// Find specific attribute definition by id
    fn find(&self, attribute_id: AttributeId) -> RepoResult<Option<AttributeDefinition>>;

    /// Returns definitions of a category in creation order
    fn list_for_category(&self, category_id: CategoryId) -> RepoResult<Vec<AttributeDefinition>>;

    /// Creates new attribute definition
    fn create(&self, payload: NewAttributeDefinitionRow) -> RepoResult<AttributeDefinition>;

    /// Updates specific attribute definition
    fn update(&self, attribute_id: AttributeId, payload: UpdateAttributeDefinitionRow) -> RepoResult<AttributeDefinition>;

    /// Deletes specific attribute definition
    fn delete(&self, attribute_id: AttributeId) -> RepoResult<AttributeDefinition>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> AttributeDefinitionsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> AttributeDefinitionsRepo
    for AttributeDefinitionsRepoImpl<'a, T>
{
    fn find(&self, attribute_id_arg: AttributeId) -> RepoResult<Option<AttributeDefinition>> {
        debug!("Find in attribute definitions with id {}.", attribute_id_arg);
        attribute_definitions
            .find(attribute_id_arg)
            .get_result::<RawAttributeDefinition>(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|raw| match raw {
                Some(raw) => raw.into_definition().map(Some),
                None => Ok(None),
            }).map_err(|e: FailureError| e.context(format!("Find attribute definition with id {} error occurred", attribute_id_arg)).into())
    }

    fn list_for_category(&self, category_id_arg: CategoryId) -> RepoResult<Vec<AttributeDefinition>> {
        debug!("List attribute definitions of category {}.", category_id_arg);
        attribute_definitions
            .filter(category_id.eq(category_id_arg))
            .order(id)
            .get_results::<RawAttributeDefinition>(self.db_conn)
            .map_err(From::from)
            .and_then(|raws| raws.into_iter().map(RawAttributeDefinition::into_definition).collect())
            .map_err(|e: FailureError| {
                e.context(format!("List attribute definitions of category {} error occurred", category_id_arg))
                    .into()
            })
    }

    fn create(&self, payload: NewAttributeDefinitionRow) -> RepoResult<AttributeDefinition> {
        debug!("Create attribute definition {:?}.", payload);
        let query = diesel::insert_into(attribute_definitions).values(&payload);
        query
            .get_result::<RawAttributeDefinition>(self.db_conn)
            .map_err(From::from)
            .and_then(RawAttributeDefinition::into_definition)
            .map_err(|e: FailureError| e.context(format!("Create attribute definition {:?} error occurred", payload)).into())
    }

    fn update(&self, attribute_id_arg: AttributeId, payload: UpdateAttributeDefinitionRow) -> RepoResult<AttributeDefinition> {
        debug!("Updating attribute definition with id {} and payload {:?}.", attribute_id_arg, payload);
        let filter = attribute_definitions.filter(id.eq(attribute_id_arg));
        diesel::update(filter)
            .set(&payload)
            .get_result::<RawAttributeDefinition>(self.db_conn)
            .map_err(From::from)
            .and_then(RawAttributeDefinition::into_definition)
            .map_err(|e: FailureError| {
                e.context(format!(
                    "Updating attribute definition with id {} and payload {:?} error occurred",
                    attribute_id_arg, payload
                )).into()
            })
    }

    fn delete(&self, attribute_id_arg: AttributeId) -> RepoResult<AttributeDefinition> {
        debug!("Delete attribute definition with id {}.", attribute_id_arg);
        let filtered = attribute_definitions.filter(id.eq(attribute_id_arg));
        diesel::delete(filtered)
            .get_result::<RawAttributeDefinition>(self.db_conn)
            .map_err(From::from)
            .and_then(RawAttributeDefinition::into_definition)
            .map_err(|e: FailureError| e.context(format!("Delete attribute definition with id {} error occurred", attribute_id_arg)).into())
    }
}

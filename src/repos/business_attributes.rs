//! Business attributes repo, keeps attribute values of businesses
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::{AttributeId, BusinessAttribute, BusinessId, NewBusinessAttribute};
use repos::types::RepoResult;
use schema::business_attributes::dsl::*;

/// Business attributes repository
pub struct BusinessAttributesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait BusinessAttributesRepo {
    /// Returns attribute values of a business
    fn list_for_business(&self, business_id: BusinessId) -> RepoResult<Vec<BusinessAttribute>>;

    /// Returns attribute values of several businesses at once
    fn list_for_businesses(&self, business_ids: Vec<BusinessId>) -> RepoResult<Vec<BusinessAttribute>>;

    /// Replaces all attribute values of a business
    fn replace(&self, business_id: BusinessId, values: Vec<NewBusinessAttribute>) -> RepoResult<Vec<BusinessAttribute>>;

    /// Returns values of an attribute definition in every business
    fn list_for_attribute(&self, attribute_id: AttributeId) -> RepoResult<Vec<BusinessAttribute>>;

    /// Deletes values of an attribute definition in every business
    fn delete_by_attribute(&self, attribute_id: AttributeId) -> RepoResult<Vec<BusinessAttribute>>;

    /// Deletes specific values
    fn delete_values(&self, value_ids: Vec<i32>) -> RepoResult<Vec<BusinessAttribute>>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> BusinessAttributesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> BusinessAttributesRepo
    for BusinessAttributesRepoImpl<'a, T>
{
    fn list_for_business(&self, business_id_arg: BusinessId) -> RepoResult<Vec<BusinessAttribute>> {
        debug!("List attribute values of business {}.", business_id_arg);
        business_attributes
            .filter(business_id.eq(business_id_arg))
            .order(id)
            .get_results::<BusinessAttribute>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| {
                e.context(format!("List attribute values of business {} error occurred", business_id_arg))
                    .into()
            })
    }

    fn list_for_businesses(&self, business_ids: Vec<BusinessId>) -> RepoResult<Vec<BusinessAttribute>> {
        debug!("List attribute values of businesses {:?}.", business_ids);
        business_attributes
            .filter(business_id.eq_any(business_ids.clone()))
            .order(id)
            .get_results::<BusinessAttribute>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| {
                e.context(format!("List attribute values of businesses {:?} error occurred", business_ids))
                    .into()
            })
    }

    fn replace(&self, business_id_arg: BusinessId, values: Vec<NewBusinessAttribute>) -> RepoResult<Vec<BusinessAttribute>> {
        debug!("Replace attribute values of business {} with {:?}.", business_id_arg, values);
        let filtered = business_attributes.filter(business_id.eq(business_id_arg));
        diesel::delete(filtered)
            .execute(self.db_conn)
            .and_then(|_| {
                if values.is_empty() {
                    return Ok(vec![]);
                }
                diesel::insert_into(business_attributes)
                    .values(&values)
                    .get_results::<BusinessAttribute>(self.db_conn)
            }).map_err(From::from)
            .map_err(|e: FailureError| {
                e.context(format!("Replace attribute values of business {} error occurred", business_id_arg))
                    .into()
            })
    }

    fn list_for_attribute(&self, attribute_id_arg: AttributeId) -> RepoResult<Vec<BusinessAttribute>> {
        debug!("List values of attribute {}.", attribute_id_arg);
        business_attributes
            .filter(attribute_id.eq(attribute_id_arg))
            .order(id)
            .get_results::<BusinessAttribute>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("List values of attribute {} error occurred", attribute_id_arg)).into())
    }

    fn delete_by_attribute(&self, attribute_id_arg: AttributeId) -> RepoResult<Vec<BusinessAttribute>> {
        debug!("Delete values of attribute {}.", attribute_id_arg);
        let filtered = business_attributes.filter(attribute_id.eq(attribute_id_arg));
        diesel::delete(filtered)
            .get_results::<BusinessAttribute>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Delete values of attribute {} error occurred", attribute_id_arg)).into())
    }

    fn delete_values(&self, value_ids: Vec<i32>) -> RepoResult<Vec<BusinessAttribute>> {
        debug!("Delete attribute values {:?}.", value_ids);
        let filtered = business_attributes.filter(id.eq_any(value_ids.clone()));
        diesel::delete(filtered)
            .get_results::<BusinessAttribute>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Delete attribute values {:?} error occurred", value_ids)).into())
    }
}

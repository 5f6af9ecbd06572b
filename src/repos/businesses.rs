//! Businesses repo, presents CRUD operations with db for businesses
use std::time::SystemTime;

use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::select;
use diesel::Connection;
use failure::Error as FailureError;

use models::{BusinessId, BusinessesSearchTerms, NewBusinessRow, RawBusiness, UpdateBusinessRow};
use repos::types::RepoResult;
use schema::businesses::dsl::*;

/// Businesses repository, responsible for handling businesses
pub struct BusinessesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait BusinessesRepo {
    /// Find specific business by id
    fn find(&self, business_id: BusinessId) -> RepoResult<Option<RawBusiness>>;

    /// Returns businesses matching `terms`, limited by `from` and `count` parameters
    fn list(&self, terms: BusinessesSearchTerms, from: BusinessId, count: i64) -> RepoResult<Vec<RawBusiness>>;

    /// Creates new business
    fn create(&self, payload: NewBusinessRow) -> RepoResult<RawBusiness>;

    /// Updates specific business
    fn update(&self, business_id: BusinessId, payload: UpdateBusinessRow) -> RepoResult<RawBusiness>;

    /// Deactivates specific business
    fn deactivate(&self, business_id: BusinessId) -> RepoResult<RawBusiness>;

    /// Checks that slug is already taken by another business
    fn slug_exists(&self, slug_arg: String, exclude: Option<BusinessId>) -> RepoResult<bool>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> BusinessesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> BusinessesRepo for BusinessesRepoImpl<'a, T> {
    fn find(&self, business_id_arg: BusinessId) -> RepoResult<Option<RawBusiness>> {
        debug!("Find in businesses with id {}.", business_id_arg);
        businesses
            .find(business_id_arg)
            .get_result::<RawBusiness>(self.db_conn)
            .optional()
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Find business with id {} error occurred", business_id_arg)).into())
    }

    fn list(&self, terms: BusinessesSearchTerms, from: BusinessId, count: i64) -> RepoResult<Vec<RawBusiness>> {
        debug!("List businesses with terms {:?}, from {}, count {}.", terms, from, count);
        let mut query = businesses.filter(id.gt(from)).order(id).limit(count).into_boxed();
        if let Some(category_id_arg) = terms.category_id {
            query = query.filter(category_id.eq(category_id_arg));
        }
        if let Some(subcategory_id_arg) = terms.subcategory_id {
            query = query.filter(subcategory_id.eq(subcategory_id_arg));
        }
        if let Some(user_id_arg) = terms.user_id {
            query = query.filter(user_id.eq(user_id_arg));
        }
        if terms.only_active {
            query = query.filter(is_active.eq(true));
        }
        query
            .get_results::<RawBusiness>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("List businesses with terms {:?} error occurred", terms)).into())
    }

    fn create(&self, payload: NewBusinessRow) -> RepoResult<RawBusiness> {
        debug!("Create business with name {} and slug {}.", payload.name, payload.slug);
        let query = diesel::insert_into(businesses).values(&payload);
        query
            .get_result::<RawBusiness>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Create business with slug {} error occurred", payload.slug)).into())
    }

    fn update(&self, business_id_arg: BusinessId, payload: UpdateBusinessRow) -> RepoResult<RawBusiness> {
        debug!("Updating business with id {} and slug {}.", business_id_arg, payload.slug);
        let filter = businesses.filter(id.eq(business_id_arg));
        diesel::update(filter)
            .set(&payload)
            .get_result::<RawBusiness>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Updating business with id {} error occurred", business_id_arg)).into())
    }

    fn deactivate(&self, business_id_arg: BusinessId) -> RepoResult<RawBusiness> {
        debug!("Deactivate business with id {}.", business_id_arg);
        let filter = businesses.filter(id.eq(business_id_arg));
        diesel::update(filter)
            .set((is_active.eq(false), updated_at.eq(SystemTime::now())))
            .get_result::<RawBusiness>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Deactivate business with id {} error occurred", business_id_arg)).into())
    }

    fn slug_exists(&self, slug_arg: String, exclude: Option<BusinessId>) -> RepoResult<bool> {
        debug!("Check if business slug {} exists.", slug_arg);
        let result = match exclude {
            Some(exclude) => select(exists(businesses.filter(slug.eq(&slug_arg)).filter(id.ne(exclude)))).get_result::<bool>(self.db_conn),
            None => select(exists(businesses.filter(slug.eq(&slug_arg)))).get_result::<bool>(self.db_conn),
        };
        result
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Check business slug {} exists error occurred", slug_arg)).into())
    }
}

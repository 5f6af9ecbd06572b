//! Categories repo, presents CRUD operations with db for categories
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

use models::{Category, CategoryId, NewCategory, UpdateCategory};
use repos::types::RepoResult;
use schema::categories::dsl::*;

/// Categories repository, responsible for handling categories
pub struct CategoriesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait CategoriesRepo {
    /// Find specific category by id
    fn find(&self, category_id: CategoryId) -> RepoResult<Option<Category>>;

    /// Returns categories ordered by name, inactive ones only when `with_inactive` is set
    fn list(&self, with_inactive: bool) -> RepoResult<Vec<Category>>;

    /// Creates new category
    fn create(&self, payload: NewCategory) -> RepoResult<Category>;

    /// Updates specific category
    fn update(&self, category_id: CategoryId, payload: UpdateCategory) -> RepoResult<Category>;

    /// Deactivates specific category
    fn deactivate(&self, category_id: CategoryId) -> RepoResult<Category>;

    /// Checks that slug is already taken by another category
    fn slug_exists(&self, slug_arg: String, exclude: Option<CategoryId>) -> RepoResult<bool>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CategoriesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CategoriesRepo for CategoriesRepoImpl<'a, T> {
    fn find(&self, category_id_arg: CategoryId) -> RepoResult<Option<Category>> {
        debug!("Find in categories with id {}.", category_id_arg);
        categories
            .find(category_id_arg)
            .get_result::<Category>(self.db_conn)
            .optional()
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Find category with id {} error occurred", category_id_arg)).into())
    }

    fn list(&self, with_inactive: bool) -> RepoResult<Vec<Category>> {
        debug!("List categories, with inactive: {}.", with_inactive);
        let mut query = categories.order(name).into_boxed();
        if !with_inactive {
            query = query.filter(is_active.eq(true));
        }
        query
            .get_results::<Category>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context("List categories error occurred").into())
    }

    fn create(&self, payload: NewCategory) -> RepoResult<Category> {
        debug!("Create category {:?}.", payload);
        let query = diesel::insert_into(categories).values(&payload);
        query
            .get_result::<Category>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Create category {:?} error occurred", payload)).into())
    }

    fn update(&self, category_id_arg: CategoryId, payload: UpdateCategory) -> RepoResult<Category> {
        debug!("Updating category with id {} and payload {:?}.", category_id_arg, payload);
        let filter = categories.filter(id.eq(category_id_arg));
        diesel::update(filter)
            .set((&payload, updated_at.eq(SystemTime::now())))
            .get_result::<Category>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| {
                e.context(format!("Updating category with id {} and payload {:?} error occurred", category_id_arg, payload))
                    .into()
            })
    }

    fn deactivate(&self, category_id_arg: CategoryId) -> RepoResult<Category> {
        debug!("Deactivate category with id {}.", category_id_arg);
        let filter = categories.filter(id.eq(category_id_arg));
        diesel::update(filter)
            .set((is_active.eq(false), updated_at.eq(SystemTime::now())))
            .get_result::<Category>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Deactivate category with id {} error occurred", category_id_arg)).into())
    }

    fn slug_exists(&self, slug_arg: String, exclude: Option<CategoryId>) -> RepoResult<bool> {
        debug!("Check if category slug {} exists.", slug_arg);
        let result = match exclude {
            Some(exclude) => select(exists(categories.filter(slug.eq(&slug_arg)).filter(id.ne(exclude)))).get_result::<bool>(self.db_conn),
            None => select(exists(categories.filter(slug.eq(&slug_arg)))).get_result::<bool>(self.db_conn),
        };
        result
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Check category slug {} exists error occurred", slug_arg)).into())
    }
}

//! Subcategories repo, presents CRUD operations with db for subcategories
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::{CategoryId, NewSubcategory, Subcategory, SubcategoryId, UpdateSubcategory};
use repos::types::RepoResult;
use schema::subcategories::dsl::*;

/// Subcategories repository, responsible for handling subcategories
pub struct SubcategoriesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
}

pub trait SubcategoriesRepo {
    /// Find specific subcategory by id
    fn find(&self, subcategory_id: SubcategoryId) -> RepoResult<Option<Subcategory>>;

    /// Returns subcategories of a category ordered by name
    fn list_for_category(&self, category_id: CategoryId, with_inactive: bool) -> RepoResult<Vec<Subcategory>>;

    /// Creates new subcategory
    fn create(&self, payload: NewSubcategory) -> RepoResult<Subcategory>;

    /// Updates specific subcategory
    fn update(&self, subcategory_id: SubcategoryId, payload: UpdateSubcategory) -> RepoResult<Subcategory>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> SubcategoriesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T) -> Self {
        Self { db_conn }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> SubcategoriesRepo
    for SubcategoriesRepoImpl<'a, T>
{
    fn find(&self, subcategory_id_arg: SubcategoryId) -> RepoResult<Option<Subcategory>> {
        debug!("Find in subcategories with id {}.", subcategory_id_arg);
        subcategories
            .find(subcategory_id_arg)
            .get_result::<Subcategory>(self.db_conn)
            .optional()
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Find subcategory with id {} error occurred", subcategory_id_arg)).into())
    }

    fn list_for_category(&self, category_id_arg: CategoryId, with_inactive: bool) -> RepoResult<Vec<Subcategory>> {
        debug!("List subcategories of category {}, with inactive: {}.", category_id_arg, with_inactive);
        let mut query = subcategories.filter(category_id.eq(category_id_arg)).order(name).into_boxed();
        if !with_inactive {
            query = query.filter(is_active.eq(true));
        }
        query
            .get_results::<Subcategory>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| {
                e.context(format!("List subcategories of category {} error occurred", category_id_arg))
                    .into()
            })
    }

    fn create(&self, payload: NewSubcategory) -> RepoResult<Subcategory> {
        debug!("Create subcategory {:?}.", payload);
        let query = diesel::insert_into(subcategories).values(&payload);
        query
            .get_result::<Subcategory>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| e.context(format!("Create subcategory {:?} error occurred", payload)).into())
    }

    fn update(&self, subcategory_id_arg: SubcategoryId, payload: UpdateSubcategory) -> RepoResult<Subcategory> {
        debug!("Updating subcategory with id {} and payload {:?}.", subcategory_id_arg, payload);
        let filter = subcategories.filter(id.eq(subcategory_id_arg));
        diesel::update(filter)
            .set(&payload)
            .get_result::<Subcategory>(self.db_conn)
            .map_err(From::from)
            .map_err(|e: FailureError| {
                e.context(format!(
                    "Updating subcategory with id {} and payload {:?} error occurred",
                    subcategory_id_arg, payload
                )).into()
            })
    }
}

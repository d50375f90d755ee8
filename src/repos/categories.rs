//! Categories repo, presents CRUD operations with db for categories
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::category::categories::dsl::*;
use models::{matches_search, CategoriesSearchTerms, Category, NewCategory, ReplaceCategory, UpdateCategory};
use repos::acl;
use repos::acl::base::CheckScope;
use repos::types::{RepoAcl, RepoResult};

/// Categories repository, responsible for handling categories
pub struct CategoriesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<Category>>,
}

pub trait CategoriesRepo {
    /// Returns categories ordered by display order
    fn list(&self, terms: CategoriesSearchTerms) -> RepoResult<Vec<Category>>;

    /// Find specific category by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<Category>>;

    /// Find specific category by slug
    fn find_by_slug(&self, slug_arg: String) -> RepoResult<Option<Category>>;

    /// Checks if the slug is taken by any category except `exclude_id`
    fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool>;

    /// Creates new category
    fn create(&self, payload: NewCategory) -> RepoResult<Category>;

    /// Replaces all mutable fields of specific category
    fn replace(&self, id_arg: i32, payload: ReplaceCategory) -> RepoResult<Category>;

    /// Updates specific category
    fn update(&self, id_arg: i32, payload: UpdateCategory) -> RepoResult<Category>;

    /// Sets display order of specific category
    fn set_display_order(&self, id_arg: i32, display_order_arg: i32) -> RepoResult<Category>;

    /// Deletes specific category
    fn delete(&self, id_arg: i32) -> RepoResult<Category>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CategoriesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<Category>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CategoriesRepo for CategoriesRepoImpl<'a, T> {
    fn list(&self, terms: CategoriesSearchTerms) -> RepoResult<Vec<Category>> {
        debug!("List categories with terms {:?}.", terms);
        let mut query = categories.order((display_order.asc(), id.asc())).into_boxed::<Pg>();
        if let Some(is_active_arg) = terms.is_active {
            query = query.filter(is_active.eq(is_active_arg));
        }

        acl::check(&*self.acl, Resource::Categories, Action::Read, self, None)
            .and_then(|_| query.load::<Category>(self.db_conn).map_err(From::from))
            .map(|found| {
                found
                    .into_iter()
                    .filter(|category| {
                        matches_search(
                            terms.search.as_ref().map(String::as_str),
                            &[&category.slug, &category.name_de, &category.name_en],
                        )
                    }).collect()
            }).map_err(|e: FailureError| e.context(format!("List categories with terms {:?} error occurred.", terms)).into())
    }

    fn find(&self, id_arg: i32) -> RepoResult<Option<Category>> {
        debug!("Find in categories with id {}.", id_arg);
        acl::check(&*self.acl, Resource::Categories, Action::Read, self, None)
            .and_then(|_| {
                categories
                    .filter(id.eq(id_arg))
                    .get_result::<Category>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in categories with id {} error occurred.", id_arg)).into())
    }

    fn find_by_slug(&self, slug_arg: String) -> RepoResult<Option<Category>> {
        debug!("Find in categories with slug {}.", slug_arg);
        acl::check(&*self.acl, Resource::Categories, Action::Read, self, None)
            .and_then(|_| {
                categories
                    .filter(slug.eq(&slug_arg))
                    .get_result::<Category>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in categories with slug {} error occurred.", slug_arg)).into())
    }

    fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
        debug!("Check if category slug {} exists.", slug_arg);
        acl::check(&*self.acl, Resource::Categories, Action::Read, self, None)
            .and_then(|_| {
                categories
                    .filter(slug.eq(&slug_arg))
                    .select(id)
                    .load::<i32>(self.db_conn)
                    .map_err(From::from)
            }).map(|ids| ids.into_iter().any(|found| Some(found) != exclude_id))
            .map_err(|e: FailureError| e.context(format!("Check if category slug {} exists error occurred.", slug_arg)).into())
    }

    fn create(&self, payload: NewCategory) -> RepoResult<Category> {
        debug!("Create category {:?}.", payload);
        acl::check(&*self.acl, Resource::Categories, Action::Create, self, None)
            .and_then(|_| {
                diesel::insert_into(categories)
                    .values(&payload)
                    .get_result::<Category>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Create category {:?} error occurred.", payload)).into())
    }

    fn replace(&self, id_arg: i32, payload: ReplaceCategory) -> RepoResult<Category> {
        debug!("Replace category {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::Categories, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(categories.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<Category>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Replace category {} with {:?} error occurred.", id_arg, payload))
                    .into()
            })
    }

    fn update(&self, id_arg: i32, payload: UpdateCategory) -> RepoResult<Category> {
        debug!("Update category {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::Categories, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(categories.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<Category>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Update category {} with {:?} error occurred.", id_arg, payload))
                    .into()
            })
    }

    fn set_display_order(&self, id_arg: i32, display_order_arg: i32) -> RepoResult<Category> {
        debug!("Set display order of category {} to {}.", id_arg, display_order_arg);
        acl::check(&*self.acl, Resource::Categories, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(categories.filter(id.eq(id_arg)))
                    .set(display_order.eq(display_order_arg))
                    .get_result::<Category>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Set display order of category {} error occurred.", id_arg))
                    .into()
            })
    }

    fn delete(&self, id_arg: i32) -> RepoResult<Category> {
        debug!("Delete category with id {}.", id_arg);
        acl::check(&*self.acl, Resource::Categories, Action::Delete, self, None)
            .and_then(|_| {
                diesel::delete(categories.filter(id.eq(id_arg)))
                    .get_result::<Category>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Delete category with id {} error occurred.", id_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, Category>
    for CategoriesRepoImpl<'a, T>
{
    fn is_in_scope(&self, _user_id: i32, scope: &Scope, _obj: Option<&Category>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => false,
        }
    }
}

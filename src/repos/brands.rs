//! Brands repo, presents CRUD operations with db for brands
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::brand::brands::dsl::*;
use models::{matches_search, Brand, BrandsSearchTerms, NewBrand, ReplaceBrand, UpdateBrand};
use repos::acl;
use repos::acl::base::CheckScope;
use repos::types::{RepoAcl, RepoResult};

/// Brands repository, responsible for handling brands
pub struct BrandsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<Brand>>,
}

pub trait BrandsRepo {
    /// Returns brands ordered by display order
    fn list(&self, terms: BrandsSearchTerms) -> RepoResult<Vec<Brand>>;

    /// Find specific brand by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<Brand>>;

    /// Checks if the slug is taken by any brand except `exclude_id`
    fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool>;

    /// Counts brands of the category
    fn count_by_category(&self, category_id_arg: i32) -> RepoResult<i64>;

    /// Creates new brand
    fn create(&self, payload: NewBrand) -> RepoResult<Brand>;

    /// Replaces all mutable fields of specific brand
    fn replace(&self, id_arg: i32, payload: ReplaceBrand) -> RepoResult<Brand>;

    /// Updates specific brand
    fn update(&self, id_arg: i32, payload: UpdateBrand) -> RepoResult<Brand>;

    /// Deletes specific brand
    fn delete(&self, id_arg: i32) -> RepoResult<Brand>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> BrandsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<Brand>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> BrandsRepo for BrandsRepoImpl<'a, T> {
    fn list(&self, terms: BrandsSearchTerms) -> RepoResult<Vec<Brand>> {
        debug!("List brands with terms {:?}.", terms);
        let mut query = brands.order((display_order.asc(), id.asc())).into_boxed::<Pg>();
        if let Some(category_id_arg) = terms.category_id {
            query = query.filter(category_id.eq(category_id_arg));
        }
        if let Some(is_active_arg) = terms.is_active {
            query = query.filter(is_active.eq(is_active_arg));
        }

        acl::check(&*self.acl, Resource::Brands, Action::Read, self, None)
            .and_then(|_| query.load::<Brand>(self.db_conn).map_err(From::from))
            .map(|found| {
                found
                    .into_iter()
                    .filter(|brand| matches_search(terms.search.as_ref().map(String::as_str), &[&brand.slug, &brand.name]))
                    .collect()
            }).map_err(|e: FailureError| e.context(format!("List brands with terms {:?} error occurred.", terms)).into())
    }

    fn find(&self, id_arg: i32) -> RepoResult<Option<Brand>> {
        debug!("Find in brands with id {}.", id_arg);
        acl::check(&*self.acl, Resource::Brands, Action::Read, self, None)
            .and_then(|_| {
                brands
                    .filter(id.eq(id_arg))
                    .get_result::<Brand>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in brands with id {} error occurred.", id_arg)).into())
    }

    fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
        debug!("Check if brand slug {} exists.", slug_arg);
        acl::check(&*self.acl, Resource::Brands, Action::Read, self, None)
            .and_then(|_| brands.filter(slug.eq(&slug_arg)).select(id).load::<i32>(self.db_conn).map_err(From::from))
            .map(|ids| ids.into_iter().any(|found| Some(found) != exclude_id))
            .map_err(|e: FailureError| e.context(format!("Check if brand slug {} exists error occurred.", slug_arg)).into())
    }

    fn count_by_category(&self, category_id_arg: i32) -> RepoResult<i64> {
        debug!("Count brands of category {}.", category_id_arg);
        acl::check(&*self.acl, Resource::Brands, Action::Read, self, None)
            .and_then(|_| {
                brands
                    .filter(category_id.eq(category_id_arg))
                    .count()
                    .get_result::<i64>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Count brands of category {} error occurred.", category_id_arg))
                    .into()
            })
    }

    fn create(&self, payload: NewBrand) -> RepoResult<Brand> {
        debug!("Create brand {:?}.", payload);
        acl::check(&*self.acl, Resource::Brands, Action::Create, self, None)
            .and_then(|_| {
                diesel::insert_into(brands)
                    .values(&payload)
                    .get_result::<Brand>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Create brand {:?} error occurred.", payload)).into())
    }

    fn replace(&self, id_arg: i32, payload: ReplaceBrand) -> RepoResult<Brand> {
        debug!("Replace brand {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::Brands, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(brands.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<Brand>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Replace brand {} with {:?} error occurred.", id_arg, payload)).into())
    }

    fn update(&self, id_arg: i32, payload: UpdateBrand) -> RepoResult<Brand> {
        debug!("Update brand {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::Brands, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(brands.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<Brand>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Update brand {} with {:?} error occurred.", id_arg, payload)).into())
    }

    fn delete(&self, id_arg: i32) -> RepoResult<Brand> {
        debug!("Delete brand with id {}.", id_arg);
        acl::check(&*self.acl, Resource::Brands, Action::Delete, self, None)
            .and_then(|_| {
                diesel::delete(brands.filter(id.eq(id_arg)))
                    .get_result::<Brand>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Delete brand with id {} error occurred.", id_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, Brand>
    for BrandsRepoImpl<'a, T>
{
    fn is_in_scope(&self, _user_id: i32, scope: &Scope, _obj: Option<&Brand>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => false,
        }
    }
}

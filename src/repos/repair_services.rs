//! Repair services repo, presents CRUD operations with db for repair services
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::repair_service::services::dsl::*;
use models::{matches_search, NewRepairService, RepairService, RepairServicesSearchTerms, ReplaceRepairService, UpdateRepairService};
use repos::acl;
use repos::acl::base::CheckScope;
use repos::types::{RepoAcl, RepoResult};

/// Repair services repository, responsible for handling repair services
pub struct RepairServicesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<RepairService>>,
}

pub trait RepairServicesRepo {
    /// Returns repair services ordered by display order
    fn list(&self, terms: RepairServicesSearchTerms) -> RepoResult<Vec<RepairService>>;

    /// Find specific repair service by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<RepairService>>;

    /// Find specific repair service by slug
    fn find_by_slug(&self, slug_arg: String) -> RepoResult<Option<RepairService>>;

    /// Returns repair services with the given ids, ordered by display order
    fn find_many(&self, ids: Vec<i32>) -> RepoResult<Vec<RepairService>>;

    /// Checks if the slug is taken by any repair service except `exclude_id`
    fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool>;

    /// Counts repair services of the category
    fn count_by_category(&self, category_id_arg: i32) -> RepoResult<i64>;

    /// Creates new repair service
    fn create(&self, payload: NewRepairService) -> RepoResult<RepairService>;

    /// Replaces all mutable fields of specific repair service
    fn replace(&self, id_arg: i32, payload: ReplaceRepairService) -> RepoResult<RepairService>;

    /// Updates specific repair service
    fn update(&self, id_arg: i32, payload: UpdateRepairService) -> RepoResult<RepairService>;

    /// Deletes specific repair service
    fn delete(&self, id_arg: i32) -> RepoResult<RepairService>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> RepairServicesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<RepairService>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> RepairServicesRepo
    for RepairServicesRepoImpl<'a, T>
{
    fn list(&self, terms: RepairServicesSearchTerms) -> RepoResult<Vec<RepairService>> {
        debug!("List repair services with terms {:?}.", terms);
        let mut query = services.order((display_order.asc(), id.asc())).into_boxed::<Pg>();
        if let Some(category_id_arg) = terms.category_id {
            query = query.filter(category_id.eq(category_id_arg));
        }
        if let Some(is_active_arg) = terms.is_active {
            query = query.filter(is_active.eq(is_active_arg));
        }

        acl::check(&*self.acl, Resource::RepairServices, Action::Read, self, None)
            .and_then(|_| query.load::<RepairService>(self.db_conn).map_err(From::from))
            .map(|found| {
                found
                    .into_iter()
                    .filter(|service| {
                        matches_search(
                            terms.search.as_ref().map(String::as_str),
                            &[&service.slug, &service.name_de, &service.name_en],
                        )
                    }).collect()
            }).map_err(|e: FailureError| {
                e.context(format!("List repair services with terms {:?} error occurred.", terms))
                    .into()
            })
    }

    fn find(&self, id_arg: i32) -> RepoResult<Option<RepairService>> {
        debug!("Find in repair services with id {}.", id_arg);
        acl::check(&*self.acl, Resource::RepairServices, Action::Read, self, None)
            .and_then(|_| {
                services
                    .filter(id.eq(id_arg))
                    .get_result::<RepairService>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in repair services with id {} error occurred.", id_arg)).into())
    }

    fn find_by_slug(&self, slug_arg: String) -> RepoResult<Option<RepairService>> {
        debug!("Find in repair services with slug {}.", slug_arg);
        acl::check(&*self.acl, Resource::RepairServices, Action::Read, self, None)
            .and_then(|_| {
                services
                    .filter(slug.eq(&slug_arg))
                    .get_result::<RepairService>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Find in repair services with slug {} error occurred.", slug_arg))
                    .into()
            })
    }

    fn find_many(&self, ids: Vec<i32>) -> RepoResult<Vec<RepairService>> {
        debug!("Find in repair services with ids {:?}.", ids);
        acl::check(&*self.acl, Resource::RepairServices, Action::Read, self, None)
            .and_then(|_| {
                services
                    .filter(id.eq_any(ids.clone()))
                    .order((display_order.asc(), id.asc()))
                    .load::<RepairService>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in repair services with ids {:?} error occurred.", ids)).into())
    }

    fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
        debug!("Check if repair service slug {} exists.", slug_arg);
        acl::check(&*self.acl, Resource::RepairServices, Action::Read, self, None)
            .and_then(|_| services.filter(slug.eq(&slug_arg)).select(id).load::<i32>(self.db_conn).map_err(From::from))
            .map(|found_ids| found_ids.into_iter().any(|found| Some(found) != exclude_id))
            .map_err(|e: FailureError| {
                e.context(format!("Check if repair service slug {} exists error occurred.", slug_arg))
                    .into()
            })
    }

    fn count_by_category(&self, category_id_arg: i32) -> RepoResult<i64> {
        debug!("Count repair services of category {}.", category_id_arg);
        acl::check(&*self.acl, Resource::RepairServices, Action::Read, self, None)
            .and_then(|_| {
                services
                    .filter(category_id.eq(category_id_arg))
                    .count()
                    .get_result::<i64>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Count repair services of category {} error occurred.", category_id_arg))
                    .into()
            })
    }

    fn create(&self, payload: NewRepairService) -> RepoResult<RepairService> {
        debug!("Create repair service {:?}.", payload);
        acl::check(&*self.acl, Resource::RepairServices, Action::Create, self, None)
            .and_then(|_| {
                diesel::insert_into(services)
                    .values(&payload)
                    .get_result::<RepairService>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Create repair service {:?} error occurred.", payload)).into())
    }

    fn replace(&self, id_arg: i32, payload: ReplaceRepairService) -> RepoResult<RepairService> {
        debug!("Replace repair service {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::RepairServices, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(services.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<RepairService>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Replace repair service {} with {:?} error occurred.", id_arg, payload))
                    .into()
            })
    }

    fn update(&self, id_arg: i32, payload: UpdateRepairService) -> RepoResult<RepairService> {
        debug!("Update repair service {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::RepairServices, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(services.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<RepairService>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Update repair service {} with {:?} error occurred.", id_arg, payload))
                    .into()
            })
    }

    fn delete(&self, id_arg: i32) -> RepoResult<RepairService> {
        debug!("Delete repair service with id {}.", id_arg);
        acl::check(&*self.acl, Resource::RepairServices, Action::Delete, self, None)
            .and_then(|_| {
                diesel::delete(services.filter(id.eq(id_arg)))
                    .get_result::<RepairService>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Delete repair service with id {} error occurred.", id_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, RepairService>
    for RepairServicesRepoImpl<'a, T>
{
    fn is_in_scope(&self, _user_id: i32, scope: &Scope, _obj: Option<&RepairService>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => false,
        }
    }
}

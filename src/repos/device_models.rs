//! Device models repo, presents CRUD operations with db for device models
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::device_model::models::dsl::*;
use models::{DeviceModel, DeviceModelsSearchTerms, NewDeviceModel, ReplaceDeviceModel, UpdateDeviceModel};
use repos::acl;
use repos::acl::base::CheckScope;
use repos::types::{RepoAcl, RepoResult};

/// Device models repository, responsible for handling device models
pub struct DeviceModelsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<DeviceModel>>,
}

pub trait DeviceModelsRepo {
    /// Returns device models ordered by display order
    fn list(&self, terms: DeviceModelsSearchTerms) -> RepoResult<Vec<DeviceModel>>;

    /// Find specific device model by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<DeviceModel>>;

    /// Checks if the slug is taken by any device model except `exclude_id`
    fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool>;

    /// Counts device models of the brand
    fn count_by_brand(&self, brand_id_arg: i32) -> RepoResult<i64>;

    /// Creates new device model
    fn create(&self, payload: NewDeviceModel) -> RepoResult<DeviceModel>;

    /// Replaces all mutable fields of specific device model
    fn replace(&self, id_arg: i32, payload: ReplaceDeviceModel) -> RepoResult<DeviceModel>;

    /// Updates specific device model
    fn update(&self, id_arg: i32, payload: UpdateDeviceModel) -> RepoResult<DeviceModel>;

    /// Deletes specific device model
    fn delete(&self, id_arg: i32) -> RepoResult<DeviceModel>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> DeviceModelsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<DeviceModel>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> DeviceModelsRepo for DeviceModelsRepoImpl<'a, T> {
    fn list(&self, terms: DeviceModelsSearchTerms) -> RepoResult<Vec<DeviceModel>> {
        debug!("List device models with terms {:?}.", terms);
        let mut query = models.order((display_order.asc(), id.asc())).into_boxed::<Pg>();
        if let Some(brand_id_arg) = terms.brand_id {
            query = query.filter(brand_id.eq(brand_id_arg));
        }
        if let Some(is_active_arg) = terms.is_active {
            query = query.filter(is_active.eq(is_active_arg));
        }

        acl::check(&*self.acl, Resource::DeviceModels, Action::Read, self, None)
            .and_then(|_| query.load::<DeviceModel>(self.db_conn).map_err(From::from))
            .map(|found| {
                found
                    .into_iter()
                    .filter(|model| model.matches_name(terms.search.as_ref().map(String::as_str)))
                    .collect()
            }).map_err(|e: FailureError| e.context(format!("List device models with terms {:?} error occurred.", terms)).into())
    }

    fn find(&self, id_arg: i32) -> RepoResult<Option<DeviceModel>> {
        debug!("Find in device models with id {}.", id_arg);
        acl::check(&*self.acl, Resource::DeviceModels, Action::Read, self, None)
            .and_then(|_| {
                models
                    .filter(id.eq(id_arg))
                    .get_result::<DeviceModel>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in device models with id {} error occurred.", id_arg)).into())
    }

    fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
        debug!("Check if device model slug {} exists.", slug_arg);
        acl::check(&*self.acl, Resource::DeviceModels, Action::Read, self, None)
            .and_then(|_| models.filter(slug.eq(&slug_arg)).select(id).load::<i32>(self.db_conn).map_err(From::from))
            .map(|ids| ids.into_iter().any(|found| Some(found) != exclude_id))
            .map_err(|e: FailureError| e.context(format!("Check if device model slug {} exists error occurred.", slug_arg)).into())
    }

    fn count_by_brand(&self, brand_id_arg: i32) -> RepoResult<i64> {
        debug!("Count device models of brand {}.", brand_id_arg);
        acl::check(&*self.acl, Resource::DeviceModels, Action::Read, self, None)
            .and_then(|_| {
                models
                    .filter(brand_id.eq(brand_id_arg))
                    .count()
                    .get_result::<i64>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Count device models of brand {} error occurred.", brand_id_arg))
                    .into()
            })
    }

    fn create(&self, payload: NewDeviceModel) -> RepoResult<DeviceModel> {
        debug!("Create device model {:?}.", payload);
        acl::check(&*self.acl, Resource::DeviceModels, Action::Create, self, None)
            .and_then(|_| {
                diesel::insert_into(models)
                    .values(&payload)
                    .get_result::<DeviceModel>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Create device model {:?} error occurred.", payload)).into())
    }

    fn replace(&self, id_arg: i32, payload: ReplaceDeviceModel) -> RepoResult<DeviceModel> {
        debug!("Replace device model {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::DeviceModels, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(models.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<DeviceModel>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Replace device model {} with {:?} error occurred.", id_arg, payload)).into())
    }

    fn update(&self, id_arg: i32, payload: UpdateDeviceModel) -> RepoResult<DeviceModel> {
        debug!("Update device model {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::DeviceModels, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(models.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<DeviceModel>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Update device model {} with {:?} error occurred.", id_arg, payload)).into())
    }

    fn delete(&self, id_arg: i32) -> RepoResult<DeviceModel> {
        debug!("Delete device model with id {}.", id_arg);
        acl::check(&*self.acl, Resource::DeviceModels, Action::Delete, self, None)
            .and_then(|_| {
                diesel::delete(models.filter(id.eq(id_arg)))
                    .get_result::<DeviceModel>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Delete device model with id {} error occurred.", id_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, DeviceModel>
    for DeviceModelsRepoImpl<'a, T>
{
    fn is_in_scope(&self, _user_id: i32, scope: &Scope, _obj: Option<&DeviceModel>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => false,
        }
    }
}

//! Device models Services, presents CRUD operations with device models
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::{BrandsRepo, ReposFactory};
use services::{conflict_error, not_found_error, validate_payload, validation_error, Service};

pub trait DeviceModelsService {
    /// Returns device models ordered by display order
    fn list_device_models(&self, terms: DeviceModelsSearchTerms) -> ServiceFuture<Vec<DeviceModel>>;
    /// Returns device model by id
    fn get_device_model(&self, model_id: i32) -> ServiceFuture<DeviceModel>;
    /// Creates new device model
    fn create_device_model(&self, payload: NewDeviceModel) -> ServiceFuture<DeviceModel>;
    /// Replaces every mutable field of a device model
    fn replace_device_model(&self, model_id: i32, payload: ReplaceDeviceModel) -> ServiceFuture<DeviceModel>;
    /// Updates the given fields of a device model
    fn update_device_model(&self, model_id: i32, payload: UpdateDeviceModel) -> ServiceFuture<DeviceModel>;
    /// Deletes device model
    fn delete_device_model(&self, model_id: i32) -> ServiceFuture<DeviceModel>;
}

fn check_brand(brands_repo: &BrandsRepo, brand_id: i32) -> Result<(), FailureError> {
    if brands_repo.find(brand_id)?.is_some() {
        Ok(())
    } else {
        Err(validation_error(validation_errors!({"brand_id": ["brand_id" => "Unknown brand"]})))
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > DeviceModelsService for Service<T, M, F>
{
    fn list_device_models(&self, terms: DeviceModelsSearchTerms) -> ServiceFuture<Vec<DeviceModel>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let models_repo = repo_factory.create_device_models_repo(&*conn, user_id);
            models_repo
                .list(terms)
                .map_err(|e| e.context("Service DeviceModels, list_device_models endpoint error occurred.").into())
        })
    }

    fn get_device_model(&self, model_id: i32) -> ServiceFuture<DeviceModel> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let models_repo = repo_factory.create_device_models_repo(&*conn, user_id);
            models_repo
                .find(model_id)
                .and_then(|model| model.ok_or_else(|| not_found_error("Device model", model_id)))
                .map_err(|e| e.context("Service DeviceModels, get_device_model endpoint error occurred.").into())
        })
    }

    fn create_device_model(&self, payload: NewDeviceModel) -> ServiceFuture<DeviceModel> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let models_repo = repo_factory.create_device_models_repo(&*conn, user_id);
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| check_brand(&*brands_repo, payload.brand_id))
                .and_then(|_| models_repo.slug_exists(payload.slug.clone(), None))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Device model slug already exists"))
                    } else {
                        models_repo.create(payload)
                    }
                }).map_err(|e: FailureError| e.context("Service DeviceModels, create_device_model endpoint error occurred.").into())
        })
    }

    fn replace_device_model(&self, model_id: i32, payload: ReplaceDeviceModel) -> ServiceFuture<DeviceModel> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let models_repo = repo_factory.create_device_models_repo(&*conn, user_id);
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| models_repo.find(model_id))
                .and_then(|model| model.ok_or_else(|| not_found_error("Device model", model_id)))
                .and_then(|_| check_brand(&*brands_repo, payload.brand_id))
                .and_then(|_| models_repo.slug_exists(payload.slug.clone(), Some(model_id)))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Device model slug already exists"))
                    } else {
                        models_repo.replace(model_id, payload)
                    }
                }).map_err(|e: FailureError| e.context("Service DeviceModels, replace_device_model endpoint error occurred.").into())
        })
    }

    fn update_device_model(&self, model_id: i32, payload: UpdateDeviceModel) -> ServiceFuture<DeviceModel> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let models_repo = repo_factory.create_device_models_repo(&*conn, user_id);
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| models_repo.find(model_id))
                .and_then(|model| model.ok_or_else(|| not_found_error("Device model", model_id)))
                .and_then(|model| {
                    if payload.is_empty() {
                        return Ok(model);
                    }
                    if let Some(brand_id) = payload.brand_id {
                        check_brand(&*brands_repo, brand_id)?;
                    }
                    if let Some(ref slug) = payload.slug {
                        if models_repo.slug_exists(slug.clone(), Some(model_id))? {
                            return Err(conflict_error("Device model slug already exists"));
                        }
                    }
                    models_repo.update(model_id, payload)
                }).map_err(|e: FailureError| e.context("Service DeviceModels, update_device_model endpoint error occurred.").into())
        })
    }

    fn delete_device_model(&self, model_id: i32) -> ServiceFuture<DeviceModel> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let models_repo = repo_factory.create_device_models_repo(&*conn, user_id);
            models_repo
                .find(model_id)
                .and_then(|model| model.ok_or_else(|| not_found_error("Device model", model_id)))
                .and_then(|_| models_repo.delete(model_id))
                .map_err(|e: FailureError| e.context("Service DeviceModels, delete_device_model endpoint error occurred.").into())
        })
    }
}

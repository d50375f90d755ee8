//! Repair services Services, presents CRUD operations with repair services and the price estimate
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::{CategoriesRepo, ReposFactory};
use services::{conflict_error, not_found_error, validation_error, Service};

pub trait RepairServicesService {
    /// Returns repair services ordered by display order
    fn list_repair_services(&self, terms: RepairServicesSearchTerms) -> ServiceFuture<Vec<RepairService>>;
    /// Returns repair service by id
    fn get_repair_service(&self, service_id: i32) -> ServiceFuture<RepairService>;
    /// Returns an active repair service by slug
    fn get_public_repair_service(&self, slug: String) -> ServiceFuture<PublicRepairService>;
    /// Creates new repair service
    fn create_repair_service(&self, payload: NewRepairService) -> ServiceFuture<RepairService>;
    /// Replaces every mutable field of a repair service
    fn replace_repair_service(&self, service_id: i32, payload: ReplaceRepairService) -> ServiceFuture<RepairService>;
    /// Updates the given fields of a repair service
    fn update_repair_service(&self, service_id: i32, payload: UpdateRepairService) -> ServiceFuture<RepairService>;
    /// Deletes repair service
    fn delete_repair_service(&self, service_id: i32) -> ServiceFuture<RepairService>;
}

fn check_category_exists(categories_repo: &CategoriesRepo, category_id: i32) -> Result<(), FailureError> {
    match categories_repo.find(category_id)? {
        Some(_) => Ok(()),
        None => Err(validation_error(
            validation_errors!({"category_id": ["category_id" => "Unknown category"]}),
        )),
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > RepairServicesService for Service<T, M, F>
{
    fn list_repair_services(&self, terms: RepairServicesSearchTerms) -> ServiceFuture<Vec<RepairService>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            services_repo
                .list(terms)
                .map_err(|e| e.context("Service RepairServices, list_repair_services endpoint error occurred.").into())
        })
    }

    fn get_repair_service(&self, service_id: i32) -> ServiceFuture<RepairService> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            services_repo
                .find(service_id)
                .and_then(|service| service.ok_or_else(|| not_found_error("Repair service", service_id)))
                .map_err(|e| e.context("Service RepairServices, get_repair_service endpoint error occurred.").into())
        })
    }

    fn get_public_repair_service(&self, slug: String) -> ServiceFuture<PublicRepairService> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            services_repo
                .find_by_slug(slug.clone())
                .and_then(|service| {
                    service
                        .filter(|service| service.is_active)
                        .map(PublicRepairService::from)
                        .ok_or_else(|| not_found_error("Repair service", slug))
                }).map_err(|e| e.context("Service RepairServices, get_public_repair_service endpoint error occurred.").into())
        })
    }

    fn create_repair_service(&self, payload: NewRepairService) -> ServiceFuture<RepairService> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            payload
                .validate_all()
                .map_err(validation_error)
                .and_then(|_| check_category_exists(&*categories_repo, payload.category_id))
                .and_then(|_| services_repo.slug_exists(payload.slug.clone(), None))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Repair service slug already exists"))
                    } else {
                        services_repo.create(payload)
                    }
                }).map_err(|e: FailureError| e.context("Service RepairServices, create_repair_service endpoint error occurred.").into())
        })
    }

    fn replace_repair_service(&self, service_id: i32, payload: ReplaceRepairService) -> ServiceFuture<RepairService> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            payload
                .validate_all()
                .map_err(validation_error)
                .and_then(|_| services_repo.find(service_id))
                .and_then(|service| service.ok_or_else(|| not_found_error("Repair service", service_id)))
                .and_then(|_| check_category_exists(&*categories_repo, payload.category_id))
                .and_then(|_| services_repo.slug_exists(payload.slug.clone(), Some(service_id)))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Repair service slug already exists"))
                    } else {
                        services_repo.replace(service_id, payload)
                    }
                }).map_err(|e: FailureError| e.context("Service RepairServices, replace_repair_service endpoint error occurred.").into())
        })
    }

    fn update_repair_service(&self, service_id: i32, payload: UpdateRepairService) -> ServiceFuture<RepairService> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            services_repo
                .find(service_id)
                .and_then(|service| service.ok_or_else(|| not_found_error("Repair service", service_id)))
                .and_then(|service| {
                    payload.validate_against(&service).map_err(validation_error)?;
                    if payload.is_empty() {
                        return Ok(service);
                    }
                    if let Some(category_id) = payload.category_id {
                        check_category_exists(&*categories_repo, category_id)?;
                    }
                    if let Some(ref slug) = payload.slug {
                        if services_repo.slug_exists(slug.clone(), Some(service_id))? {
                            return Err(conflict_error("Repair service slug already exists"));
                        }
                    }
                    services_repo.update(service_id, payload)
                }).map_err(|e: FailureError| e.context("Service RepairServices, update_repair_service endpoint error occurred.").into())
        })
    }

    fn delete_repair_service(&self, service_id: i32) -> ServiceFuture<RepairService> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            services_repo
                .find(service_id)
                .and_then(|service| service.ok_or_else(|| not_found_error("Repair service", service_id)))
                .and_then(|_| services_repo.delete(service_id))
                .map_err(|e: FailureError| e.context("Service RepairServices, delete_repair_service endpoint error occurred.").into())
        })
    }
}

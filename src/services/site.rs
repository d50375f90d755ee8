//! Site Services, documents for crawlers and for installing the site as an app
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::ReposFactory;
use services::Service;

pub trait SiteService {
    /// Renders `sitemap.xml`
    fn sitemap(&self) -> ServiceFuture<String>;
    /// Builds `manifest.webmanifest`
    fn manifest(&self) -> ServiceFuture<WebManifest>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > SiteService for Service<T, M, F>
{
    fn sitemap(&self) -> ServiceFuture<String> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();
        let site = self.static_context.config.site.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            let categories = categories_repo.list(CategoriesSearchTerms {
                is_active: Some(true),
                ..Default::default()
            });
            let services = services_repo.list(RepairServicesSearchTerms {
                is_active: Some(true),
                ..Default::default()
            });
            categories
                .and_then(|categories| services.map(|services| (categories, services)))
                .and_then(|(categories, services)| Sitemap::new(&site, &categories, &services).render())
                .map_err(|e: FailureError| e.context("Service Site, sitemap endpoint error occurred.").into())
        })
    }

    fn manifest(&self) -> ServiceFuture<WebManifest> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();
        let site = self.static_context.config.site.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            categories_repo
                .list(CategoriesSearchTerms {
                    is_active: Some(true),
                    ..Default::default()
                }).map(|categories| WebManifest::new(&site, &categories))
                .map_err(|e: FailureError| e.context("Service Site, manifest endpoint error occurred.").into())
        })
    }
}

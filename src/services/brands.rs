//! Brands Services, presents CRUD operations with brands
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::{CategoriesRepo, ReposFactory};
use services::{conflict_error, not_found_error, validate_payload, validation_error, Service};

pub trait BrandsService {
    /// Returns brands ordered by display order
    fn list_brands(&self, terms: BrandsSearchTerms) -> ServiceFuture<Vec<Brand>>;
    /// Returns brand by id
    fn get_brand(&self, brand_id: i32) -> ServiceFuture<Brand>;
    /// Creates new brand
    fn create_brand(&self, payload: NewBrand) -> ServiceFuture<Brand>;
    /// Replaces every mutable field of a brand
    fn replace_brand(&self, brand_id: i32, payload: ReplaceBrand) -> ServiceFuture<Brand>;
    /// Updates the given fields of a brand
    fn update_brand(&self, brand_id: i32, payload: UpdateBrand) -> ServiceFuture<Brand>;
    /// Deletes a brand without models
    fn delete_brand(&self, brand_id: i32) -> ServiceFuture<Brand>;
}

fn check_category(categories_repo: &CategoriesRepo, category_id: i32) -> Result<(), FailureError> {
    if categories_repo.find(category_id)?.is_some() {
        Ok(())
    } else {
        Err(validation_error(validation_errors!({"category_id": ["category_id" => "Unknown category"]})))
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > BrandsService for Service<T, M, F>
{
    fn list_brands(&self, terms: BrandsSearchTerms) -> ServiceFuture<Vec<Brand>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            brands_repo
                .list(terms)
                .map_err(|e| e.context("Service Brands, list_brands endpoint error occurred.").into())
        })
    }

    fn get_brand(&self, brand_id: i32) -> ServiceFuture<Brand> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            brands_repo
                .find(brand_id)
                .and_then(|brand| brand.ok_or_else(|| not_found_error("Brand", brand_id)))
                .map_err(|e| e.context("Service Brands, get_brand endpoint error occurred.").into())
        })
    }

    fn create_brand(&self, payload: NewBrand) -> ServiceFuture<Brand> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| check_category(&*categories_repo, payload.category_id))
                .and_then(|_| brands_repo.slug_exists(payload.slug.clone(), None))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Brand slug already exists"))
                    } else {
                        brands_repo.create(payload)
                    }
                }).map_err(|e: FailureError| e.context("Service Brands, create_brand endpoint error occurred.").into())
        })
    }

    fn replace_brand(&self, brand_id: i32, payload: ReplaceBrand) -> ServiceFuture<Brand> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| brands_repo.find(brand_id))
                .and_then(|brand| brand.ok_or_else(|| not_found_error("Brand", brand_id)))
                .and_then(|_| check_category(&*categories_repo, payload.category_id))
                .and_then(|_| brands_repo.slug_exists(payload.slug.clone(), Some(brand_id)))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Brand slug already exists"))
                    } else {
                        brands_repo.replace(brand_id, payload)
                    }
                }).map_err(|e: FailureError| e.context("Service Brands, replace_brand endpoint error occurred.").into())
        })
    }

    fn update_brand(&self, brand_id: i32, payload: UpdateBrand) -> ServiceFuture<Brand> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| brands_repo.find(brand_id))
                .and_then(|brand| brand.ok_or_else(|| not_found_error("Brand", brand_id)))
                .and_then(|brand| {
                    if payload.is_empty() {
                        return Ok(brand);
                    }
                    if let Some(category_id) = payload.category_id {
                        check_category(&*categories_repo, category_id)?;
                    }
                    if let Some(ref slug) = payload.slug {
                        if brands_repo.slug_exists(slug.clone(), Some(brand_id))? {
                            return Err(conflict_error("Brand slug already exists"));
                        }
                    }
                    brands_repo.update(brand_id, payload)
                }).map_err(|e: FailureError| e.context("Service Brands, update_brand endpoint error occurred.").into())
        })
    }

    fn delete_brand(&self, brand_id: i32) -> ServiceFuture<Brand> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            let models_repo = repo_factory.create_device_models_repo(&*conn, user_id);
            brands_repo
                .find(brand_id)
                .and_then(|brand| brand.ok_or_else(|| not_found_error("Brand", brand_id)))
                .and_then(|_| models_repo.count_by_brand(brand_id))
                .and_then(|models_count| {
                    if models_count > 0 {
                        Err(conflict_error("Brand is still used by device models"))
                    } else {
                        brands_repo.delete(brand_id)
                    }
                }).map_err(|e: FailureError| e.context("Service Brands, delete_brand endpoint error occurred.").into())
        })
    }
}

#[cfg(test)]
pub mod tests {
    use tokio_core::reactor::Core;

    use errors::Error;
    use http::errors::find_in_chain;
    use models::*;
    use repos::repo_factory::tests::*;
    use services::*;

    fn create_new_brand(category_id: i32, slug: &str) -> NewBrand {
        NewBrand {
            category_id,
            slug: slug.to_string(),
            name: "Google".to_string(),
            logo: None,
            display_order: 3,
            is_active: true,
        }
    }

    #[test]
    fn test_list_brands_by_category() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let terms = BrandsSearchTerms {
            category_id: Some(1),
            ..Default::default()
        };
        let result = core.run(service.list_brands(terms)).unwrap();
        assert_eq!(result.iter().map(|brand| brand.id).collect::<Vec<i32>>(), vec![1, 2]);
    }

    #[test]
    fn test_create_brand() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let result = core.run(service.create_brand(create_new_brand(1, "google"))).unwrap();
        assert_eq!(result.category_id, 1);
    }

    #[test]
    fn test_create_brand_with_taken_slug() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let result = core.run(service.create_brand(create_new_brand(1, "apple"))).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::Conflict(_)) => true,
            _ => false,
        });
    }

    #[test]
    fn test_delete_brand_with_models_is_refused() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let result = core.run(service.delete_brand(1)).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::Conflict(_)) => true,
            _ => false,
        });
    }
}

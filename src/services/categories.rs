//! Categories Services, presents CRUD operations with categories
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::ReposFactory;
use services::{conflict_error, not_found_error, validate_payload, Service};

pub trait CategoriesService {
    /// Returns categories ordered by display order
    fn list_categories(&self, terms: CategoriesSearchTerms) -> ServiceFuture<Vec<Category>>;
    /// Returns category by id
    fn get_category(&self, category_id: i32) -> ServiceFuture<Category>;
    /// Creates new category
    fn create_category(&self, payload: NewCategory) -> ServiceFuture<Category>;
    /// Replaces every mutable field of a category
    fn replace_category(&self, category_id: i32, payload: ReplaceCategory) -> ServiceFuture<Category>;
    /// Updates the given fields of a category
    fn update_category(&self, category_id: i32, payload: UpdateCategory) -> ServiceFuture<Category>;
    /// Deletes a category that nothing references anymore
    fn delete_category(&self, category_id: i32) -> ServiceFuture<Category>;
    /// Swaps a category with its neighbour and returns the reordered list
    fn move_category(&self, category_id: i32, direction: MoveDirection) -> ServiceFuture<Vec<Category>>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > CategoriesService for Service<T, M, F>
{
    fn list_categories(&self, terms: CategoriesSearchTerms) -> ServiceFuture<Vec<Category>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            categories_repo
                .list(terms)
                .map_err(|e| e.context("Service Categories, list_categories endpoint error occurred.").into())
        })
    }

    fn get_category(&self, category_id: i32) -> ServiceFuture<Category> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            categories_repo
                .find(category_id)
                .and_then(|category| category.ok_or_else(|| not_found_error("Category", category_id)))
                .map_err(|e| e.context("Service Categories, get_category endpoint error occurred.").into())
        })
    }

    fn create_category(&self, payload: NewCategory) -> ServiceFuture<Category> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| categories_repo.slug_exists(payload.slug.clone(), None))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Category slug already exists"))
                    } else {
                        categories_repo.create(payload)
                    }
                }).map_err(|e: FailureError| e.context("Service Categories, create_category endpoint error occurred.").into())
        })
    }

    fn replace_category(&self, category_id: i32, payload: ReplaceCategory) -> ServiceFuture<Category> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| categories_repo.find(category_id))
                .and_then(|category| category.ok_or_else(|| not_found_error("Category", category_id)))
                .and_then(|_| categories_repo.slug_exists(payload.slug.clone(), Some(category_id)))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Category slug already exists"))
                    } else {
                        categories_repo.replace(category_id, payload)
                    }
                }).map_err(|e: FailureError| e.context("Service Categories, replace_category endpoint error occurred.").into())
        })
    }

    fn update_category(&self, category_id: i32, payload: UpdateCategory) -> ServiceFuture<Category> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| categories_repo.find(category_id))
                .and_then(|category| category.ok_or_else(|| not_found_error("Category", category_id)))
                .and_then(|category| {
                    if payload.is_empty() {
                        return Ok(category);
                    }
                    if let Some(ref slug) = payload.slug {
                        if categories_repo.slug_exists(slug.clone(), Some(category_id))? {
                            return Err(conflict_error("Category slug already exists"));
                        }
                    }
                    categories_repo.update(category_id, payload)
                }).map_err(|e: FailureError| e.context("Service Categories, update_category endpoint error occurred.").into())
        })
    }

    fn delete_category(&self, category_id: i32) -> ServiceFuture<Category> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            conn.transaction::<Category, FailureError, _>(move || {
                categories_repo
                    .find(category_id)?
                    .ok_or_else(|| not_found_error("Category", category_id))?;
                if services_repo.count_by_category(category_id)? > 0 {
                    return Err(conflict_error("Category is still used by repair services"));
                }
                if brands_repo.count_by_category(category_id)? > 0 {
                    return Err(conflict_error("Category is still used by brands"));
                }
                categories_repo.delete(category_id)
            }).map_err(|e: FailureError| e.context("Service Categories, delete_category endpoint error occurred.").into())
        })
    }

    fn move_category(&self, category_id: i32, direction: MoveDirection) -> ServiceFuture<Vec<Category>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            conn.transaction::<Vec<Category>, FailureError, _>(move || {
                let mut categories = categories_repo.list(CategoriesSearchTerms::default())?;
                let position = categories
                    .iter()
                    .position(|category| category.id == category_id)
                    .ok_or_else(|| not_found_error("Category", category_id))?;
                let neighbour = match direction {
                    MoveDirection::Up => position.checked_sub(1),
                    MoveDirection::Down => Some(position + 1).filter(|next| *next < categories.len()),
                };
                let neighbour = match neighbour {
                    Some(neighbour) => neighbour,
                    None => return Ok(categories),
                };

                // equal orders can't be swapped, spread them out first
                if categories[position].display_order == categories[neighbour].display_order {
                    for (index, category) in categories.iter_mut().enumerate() {
                        let index = index as i32;
                        if category.display_order != index {
                            *category = categories_repo.set_display_order(category.id, index)?;
                        }
                    }
                }

                let (current_order, neighbour_order) = (categories[position].display_order, categories[neighbour].display_order);
                categories[position] = categories_repo.set_display_order(categories[position].id, neighbour_order)?;
                categories[neighbour] = categories_repo.set_display_order(categories[neighbour].id, current_order)?;
                categories.swap(position, neighbour);
                Ok(categories)
            }).map_err(|e: FailureError| e.context("Service Categories, move_category endpoint error occurred.").into())
        })
    }
}

#[cfg(test)]
pub mod tests {
    use tokio_core::reactor::Core;

    use errors::Error;
    use http::errors::find_in_chain;
    use models::category::tests::{create_category, create_new_category};
    use models::*;
    use repos::repo_factory::tests::*;
    use services::*;

    #[test]
    fn test_get_category() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let work = service.get_category(2);
        let result = core.run(work).unwrap();
        assert_eq!(result.slug, "notebook");
    }

    #[test]
    fn test_get_missing_category() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let work = service.get_category(42);
        let result = core.run(work).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::NotFound) => true,
            _ => false,
        });
    }

    #[test]
    fn test_create_category() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let work = service.create_category(create_new_category("konsole"));
        let result = core.run(work).unwrap();
        assert_eq!(result.slug, "konsole");
    }

    #[test]
    fn test_create_category_with_taken_slug() {
        let mut core = Core::new().unwrap();
        let factory = ReposFactoryMock::default();
        let writes = factory.writes.clone();
        let service = create_service_with_factory(Some(MOCK_USER_ID), factory);
        let work = service.create_category(create_new_category("notebook"));
        let result = core.run(work).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::Conflict(_)) => true,
            _ => false,
        });
        assert!(writes.all().is_empty());
    }

    #[test]
    fn test_create_invalid_category() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let work = service.create_category(create_new_category("Not A Slug"));
        let result = core.run(work).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::Validate(_)) => true,
            _ => false,
        });
    }

    #[test]
    fn test_toggle_active_keeps_other_fields() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let before = core.run(service.get_category(2)).unwrap();
        let payload = UpdateCategory {
            is_active: Some(false),
            ..Default::default()
        };
        let after = core.run(service.update_category(2, payload)).unwrap();
        assert!(!after.is_active);
        assert_eq!(
            Category {
                is_active: true,
                ..after
            },
            before
        );
    }

    #[test]
    fn test_empty_update_returns_category() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let result = core.run(service.update_category(1, UpdateCategory::default())).unwrap();
        assert_eq!(result.id, 1);
    }

    #[test]
    fn test_delete_category_with_services_is_refused() {
        let mut core = Core::new().unwrap();
        let factory = ReposFactoryMock::default();
        let writes = factory.writes.clone();
        let service = create_service_with_factory(Some(MOCK_USER_ID), factory);
        let work = service.delete_category(2);
        let result = core.run(work).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::Conflict(_)) => true,
            _ => false,
        });
        assert!(writes.all().is_empty());
    }

    #[test]
    fn test_delete_unused_category() {
        let mut core = Core::new().unwrap();
        let factory = ReposFactoryMock::default();
        let writes = factory.writes.clone();
        let service = create_service_with_factory(Some(MOCK_USER_ID), factory);
        let result = core.run(service.delete_category(3)).unwrap();
        assert_eq!(result.id, 3);
        assert_eq!(writes.all(), vec!["categories.delete 3".to_string()]);
    }

    #[test]
    fn test_move_category_up() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let result = core.run(service.move_category(2, MoveDirection::Up)).unwrap();
        let ids = result.iter().map(|category| category.id).collect::<Vec<i32>>();
        let orders = result.iter().map(|category| category.display_order).collect::<Vec<i32>>();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_move_category_spreads_equal_orders() {
        let mut core = Core::new().unwrap();
        let factory = ReposFactoryMock {
            categories: vec![create_category(1, "smartphone", 1), create_category(2, "notebook", 1), create_category(3, "tablet", 3)],
            ..ReposFactoryMock::default()
        };
        let writes = factory.writes.clone();
        let service = create_service_with_factory(Some(MOCK_USER_ID), factory);
        let result = core.run(service.move_category(2, MoveDirection::Up)).unwrap();
        let ids = result.iter().map(|category| category.id).collect::<Vec<i32>>();
        let orders = result.iter().map(|category| category.display_order).collect::<Vec<i32>>();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(
            writes.all(),
            vec![
                "categories.set_display_order 1 0".to_string(),
                "categories.set_display_order 3 2".to_string(),
                "categories.set_display_order 2 0".to_string(),
                "categories.set_display_order 1 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_move_first_category_up_is_noop() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let result = core.run(service.move_category(1, MoveDirection::Up)).unwrap();
        assert_eq!(result, mock_categories());
    }

    #[test]
    fn test_move_last_category_down_is_noop() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let result = core.run(service.move_category(3, MoveDirection::Down)).unwrap();
        assert_eq!(result, mock_categories());
    }
}

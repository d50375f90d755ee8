//! Bookings Services, presents operations with repair bookings
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::{BrandsRepo, CategoriesRepo, DeviceModelsRepo, ReposFactory};
use services::{not_found_error, validate_payload, validation_error, Service};

pub trait BookingsService {
    /// Returns bookings, newest first
    fn list_bookings(&self, terms: BookingsSearchTerms) -> ServiceFuture<Vec<Booking>>;
    /// Returns booking by id
    fn get_booking(&self, booking_id: i32) -> ServiceFuture<Booking>;
    /// Stores a booking sent from the public site
    fn create_booking(&self, payload: NewBooking) -> ServiceFuture<Booking>;
    /// Updates status, final price or message of a booking
    fn update_booking(&self, booking_id: i32, payload: UpdateBooking) -> ServiceFuture<Booking>;
    /// Deletes booking
    fn delete_booking(&self, booking_id: i32) -> ServiceFuture<Booking>;
}

/// Midpoint of the service price range, nothing when the service has no price
pub fn estimated_price(service: &RepairService) -> Option<f64> {
    service
        .price_min
        .map(|_| EstimateLine::for_service(service, Language::default()).midpoint)
}

fn unknown_reference(field: &'static str, message: &'static str) -> FailureError {
    validation_error(validation_errors!({field: [field => message]}))
}

/// Catalogue references of a booking must exist and hang together,
/// a brand under its category and a model under its brand.
fn check_references(
    payload: &NewBooking,
    categories_repo: &CategoriesRepo,
    brands_repo: &BrandsRepo,
    models_repo: &DeviceModelsRepo,
) -> Result<(), FailureError> {
    if let Some(category_id) = payload.category_id {
        if categories_repo.find(category_id)?.is_none() {
            return Err(unknown_reference("category_id", "Unknown category"));
        }
    }
    if let Some(brand_id) = payload.brand_id {
        match brands_repo.find(brand_id)? {
            Some(ref brand) if payload.category_id.map(|id| id == brand.category_id).unwrap_or(true) => (),
            _ => return Err(unknown_reference("brand_id", "Unknown brand")),
        }
    }
    if let Some(model_id) = payload.model_id {
        match models_repo.find(model_id)? {
            Some(ref model) if payload.brand_id.map(|id| id == model.brand_id).unwrap_or(true) => (),
            _ => return Err(unknown_reference("model_id", "Unknown model")),
        }
    }
    Ok(())
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > BookingsService for Service<T, M, F>
{
    fn list_bookings(&self, terms: BookingsSearchTerms) -> ServiceFuture<Vec<Booking>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let bookings_repo = repo_factory.create_bookings_repo(&*conn, user_id);
            bookings_repo
                .list(terms)
                .map_err(|e| e.context("Service Bookings, list_bookings endpoint error occurred.").into())
        })
    }

    fn get_booking(&self, booking_id: i32) -> ServiceFuture<Booking> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let bookings_repo = repo_factory.create_bookings_repo(&*conn, user_id);
            bookings_repo
                .find(booking_id)
                .and_then(|booking| booking.ok_or_else(|| not_found_error("Booking", booking_id)))
                .map_err(|e| e.context("Service Bookings, get_booking endpoint error occurred.").into())
        })
    }

    fn create_booking(&self, payload: NewBooking) -> ServiceFuture<Booking> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let bookings_repo = repo_factory.create_bookings_repo(&*conn, user_id);
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            let brands_repo = repo_factory.create_brands_repo(&*conn, user_id);
            let models_repo = repo_factory.create_device_models_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| check_references(&payload, &*categories_repo, &*brands_repo, &*models_repo))
                .and_then(|_| match payload.service_id {
                    Some(service_id) => services_repo
                        .find(service_id)?
                        .filter(|service| service.is_active)
                        .filter(|service| payload.category_id.map(|id| id == service.category_id).unwrap_or(true))
                        .map(|service| estimated_price(&service))
                        .ok_or_else(|| validation_error(validation_errors!({"service_id": ["service_id" => "Unknown service"]}))),
                    None => Ok(None),
                }).and_then(|estimate| bookings_repo.create(InsertBooking::new(payload, estimate)))
                .map_err(|e: FailureError| e.context("Service Bookings, create_booking endpoint error occurred.").into())
        })
    }

    fn update_booking(&self, booking_id: i32, payload: UpdateBooking) -> ServiceFuture<Booking> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let bookings_repo = repo_factory.create_bookings_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| bookings_repo.find(booking_id))
                .and_then(|booking| booking.ok_or_else(|| not_found_error("Booking", booking_id)))
                .and_then(|booking| {
                    if payload.is_empty() {
                        Ok(booking)
                    } else {
                        bookings_repo.update(booking_id, payload)
                    }
                }).map_err(|e: FailureError| e.context("Service Bookings, update_booking endpoint error occurred.").into())
        })
    }

    fn delete_booking(&self, booking_id: i32) -> ServiceFuture<Booking> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let bookings_repo = repo_factory.create_bookings_repo(&*conn, user_id);
            bookings_repo
                .find(booking_id)
                .and_then(|booking| booking.ok_or_else(|| not_found_error("Booking", booking_id)))
                .and_then(|_| bookings_repo.delete(booking_id))
                .map_err(|e: FailureError| e.context("Service Bookings, delete_booking endpoint error occurred.").into())
        })
    }
}

#[cfg(test)]
pub mod tests {
    use tokio_core::reactor::Core;

    use errors::Error;
    use http::errors::find_in_chain;
    use models::booking::tests::create_new_booking;
    use models::*;
    use repos::repo_factory::tests::*;
    use services::*;

    #[test]
    fn test_public_booking_is_pending_with_midpoint() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let mut payload = create_new_booking();
        payload.category_id = Some(2);
        payload.brand_id = Some(3);
        payload.model_id = Some(4);
        payload.service_id = Some(3);
        let result = core.run(service.create_booking(payload)).unwrap();
        assert_eq!(result.status, BookingStatus::Pending);
        assert_eq!(result.estimated_price, Some(154.0));
    }

    #[test]
    fn test_booking_for_unknown_service() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let mut payload = create_new_booking();
        payload.service_id = Some(99);
        let result = core.run(service.create_booking(payload)).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::Validate(_)) => true,
            _ => false,
        });
    }

    #[test]
    fn test_booking_with_unknown_references_is_not_stored() {
        let mut core = Core::new().unwrap();
        let factory = ReposFactoryMock::default();
        let writes = factory.writes.clone();
        let service = create_service_with_factory(None, factory);

        let mut unknown_brand = create_new_booking();
        unknown_brand.brand_id = Some(99);
        let mut unknown_category = create_new_booking();
        unknown_category.category_id = Some(99);
        let mut foreign_model = create_new_booking();
        foreign_model.brand_id = Some(1);
        foreign_model.model_id = Some(4);
        let mut foreign_service = create_new_booking();
        foreign_service.service_id = Some(3);

        for payload in vec![unknown_brand, unknown_category, foreign_model, foreign_service] {
            let result = core.run(service.create_booking(payload)).unwrap_err();
            assert!(match find_in_chain::<Error>(&result) {
                Some(Error::Validate(_)) => true,
                _ => false,
            });
        }
        assert!(writes.all().is_empty());
    }

    #[test]
    fn test_booking_without_service_has_no_estimate() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let mut payload = create_new_booking();
        payload.service_id = None;
        let result = core.run(service.create_booking(payload)).unwrap();
        assert_eq!(result.estimated_price, None);
    }

    #[test]
    fn test_update_status() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_TECHNICIAN_ID));
        let payload = UpdateBooking {
            status: Some(BookingStatus::InProgress),
            ..Default::default()
        };
        let result = core.run(service.update_booking(1, payload)).unwrap();
        assert_eq!(result.status, BookingStatus::InProgress);
        assert_eq!(result.customer_name, "Erika Mustermann");
    }

    #[test]
    fn test_list_by_status() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let terms = BookingsSearchTerms {
            status: Some(BookingStatus::Completed),
            search: None,
        };
        let result = core.run(service.list_bookings(terms)).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 2);
    }
}

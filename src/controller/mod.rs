//! `Controller` is a top layer that handles all http-related
//! stuff like reading bodies, parsing params, forming a response.
//! Basically it provides inputs to `Service` layer and converts outputs
//! of `Service` layer to http responses

pub mod context;
pub mod routes;
pub mod utils;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use futures::future;
use futures::Future;
use hyper::server::Request;
use hyper::{Method, StatusCode};
use r2d2::ManageConnection;
use serde::ser::Serialize;
use serde_json;

use self::context::{DynamicContext, StaticContext};
use self::routes::{is_guarded, Route};
use self::utils::*;
use errors::Error;
use http::request_util::bearer_token;
use http::response::{envelope_response, response_with_body};
use http::{Controller, ControllerFuture};
use models::*;
use repos::repo_factory::*;
use services::*;

pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
pub const MANIFEST_CONTENT_TYPE: &str = "application/manifest+json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Wraps service output into the success envelope
fn serialize_future<T, Fut>(f: Fut) -> ControllerFuture
where
    T: Serialize + 'static,
    Fut: Future<Item = T, Error = FailureError> + 'static,
{
    Box::new(f.and_then(envelope_response))
}

/// Controller handles route parsing and calling `Service` layer
pub struct ControllerImpl<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub static_context: StaticContext<T, M, F>,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > ControllerImpl<T, M, F>
{
    /// Create a new controller based on services
    pub fn new(static_context: StaticContext<T, M, F>) -> Self {
        Self { static_context }
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Controller for ControllerImpl<T, M, F>
{
    /// Handle a request and get future response
    fn call(&self, req: Request) -> ControllerFuture {
        let static_context = self.static_context.clone();

        if is_guarded(req.path()) {
            let token = bearer_token(req.headers());
            let guard = Service::new(static_context.clone(), DynamicContext::default());
            Box::new(guard.authenticate(token).and_then(move |user| {
                debug!("Staff user {} with role {} passed the guard.", user.id, user.role);
                route_request(static_context, DynamicContext::new(Some(user.id)), req)
            }))
        } else {
            route_request(static_context, DynamicContext::default(), req)
        }
    }
}

fn route_request<T, M, F>(static_context: StaticContext<T, M, F>, dynamic_context: DynamicContext, req: Request) -> ControllerFuture
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    let method = req.method().clone();
    let path = req.path().to_string();
    let query = Query::new(req.query());
    let route = static_context.route_parser.test(req.path());
    let service = Service::new(static_context, dynamic_context);

    match (method.clone(), route) {
        // GET /healthcheck
        (Method::Get, Some(Route::Healthcheck)) => Box::new(future::ok(response_with_body(
            StatusCode::Ok,
            TEXT_CONTENT_TYPE,
            "Ok".to_string(),
        ))),

        // GET /sitemap.xml
        (Method::Get, Some(Route::Sitemap)) => Box::new(
            service
                .sitemap()
                .map(|xml| response_with_body(StatusCode::Ok, XML_CONTENT_TYPE, xml)),
        ),

        // GET /manifest.webmanifest
        (Method::Get, Some(Route::Manifest)) => Box::new(service.manifest().and_then(|manifest| {
            serde_json::to_string(&manifest)
                .map(|body| response_with_body(StatusCode::Ok, MANIFEST_CONTENT_TYPE, body))
                .map_err(From::from)
        })),

        // GET /public/categories?search=
        (Method::Get, Some(Route::PublicCategories)) => {
            serialize_future(future::result(categories_terms(&query)).and_then(move |terms| {
                service.list_categories(CategoriesSearchTerms {
                    is_active: Some(true),
                    ..terms
                })
            }))
        }

        // GET /public/brands?category_id=
        (Method::Get, Some(Route::PublicBrands)) => serialize_future(future::result(brands_terms(&query)).and_then(move |terms| {
            service.list_brands(BrandsSearchTerms {
                is_active: Some(true),
                ..terms
            })
        })),

        // GET /public/models?brand_id=&search=
        (Method::Get, Some(Route::PublicDeviceModels)) => {
            serialize_future(future::result(device_models_terms(&query)).and_then(move |terms| {
                service.list_device_models(DeviceModelsSearchTerms {
                    is_active: Some(true),
                    ..terms
                })
            }))
        }

        // GET /public/services?category_id=
        (Method::Get, Some(Route::PublicRepairServices)) => {
            serialize_future(future::result(repair_services_terms(&query)).and_then(move |terms| {
                service
                    .list_repair_services(RepairServicesSearchTerms {
                        is_active: Some(true),
                        ..terms
                    }).map(|services| services.into_iter().map(PublicRepairService::from).collect::<Vec<_>>())
            }))
        }

        // GET /public/services/<slug>
        (Method::Get, Some(Route::PublicRepairService(slug))) => serialize_future(service.get_public_repair_service(slug)),

        // GET /public/settings
        (Method::Get, Some(Route::PublicSettings)) => serialize_future(service.list_public_settings()),

        // GET /public/contents?page=
        (Method::Get, Some(Route::PublicContentBlocks)) => serialize_future(service.list_content_blocks(ContentBlocksSearchTerms {
            page: query.text("page"),
            search: None,
            is_active: Some(true),
        })),

        // POST /public/contact
        (Method::Post, Some(Route::PublicContact)) => serialize_future(
            parse_body::<NewContactMessage>(req.body()).and_then(move |payload| service.send_contact_message(payload)),
        ),

        // POST /public/bookings
        (Method::Post, Some(Route::PublicBookings)) => {
            serialize_future(parse_body::<NewBooking>(req.body()).and_then(move |payload| service.create_booking(payload)))
        }

        // POST /public/wizard
        (Method::Post, Some(Route::PublicWizard)) => serialize_future(
            parse_body::<WizardRequest>(req.body()).and_then(move |payload| service.handle_wizard_event(payload)),
        ),

        // POST /public/calculator/estimate
        (Method::Post, Some(Route::PublicEstimate)) => {
            serialize_future(parse_body::<EstimateRequest>(req.body()).and_then(move |payload| service.estimate(payload)))
        }

        // POST /admin/session
        (Method::Post, Some(Route::Session)) => serialize_future(service.start_session()),

        // GET /admin/categories
        (Method::Get, Some(Route::Categories)) => {
            serialize_future(future::result(categories_terms(&query)).and_then(move |terms| service.list_categories(terms)))
        }

        // GET /admin/categories/<category_id>
        (Method::Get, Some(Route::Category(category_id))) => serialize_future(service.get_category(category_id)),

        // POST /admin/categories
        (Method::Post, Some(Route::Categories)) => {
            serialize_future(parse_body::<NewCategory>(req.body()).and_then(move |payload| service.create_category(payload)))
        }

        // PUT /admin/categories/<category_id>
        (Method::Put, Some(Route::Category(category_id))) => serialize_future(
            parse_body::<ReplaceCategory>(req.body()).and_then(move |payload| service.replace_category(category_id, payload)),
        ),

        // PATCH /admin/categories/<category_id>
        (Method::Patch, Some(Route::Category(category_id))) => serialize_future(
            parse_body::<UpdateCategory>(req.body()).and_then(move |payload| service.update_category(category_id, payload)),
        ),

        // DELETE /admin/categories/<category_id>
        (Method::Delete, Some(Route::Category(category_id))) => serialize_future(service.delete_category(category_id)),

        // POST /admin/categories/<category_id>/move
        (Method::Post, Some(Route::CategoryMove(category_id))) => serialize_future(
            parse_body::<MoveCategory>(req.body()).and_then(move |payload| service.move_category(category_id, payload.direction)),
        ),

        // GET /admin/services
        (Method::Get, Some(Route::RepairServices)) => serialize_future(
            future::result(repair_services_terms(&query)).and_then(move |terms| service.list_repair_services(terms)),
        ),

        // GET /admin/services/<service_id>
        (Method::Get, Some(Route::RepairService(service_id))) => serialize_future(service.get_repair_service(service_id)),

        // POST /admin/services
        (Method::Post, Some(Route::RepairServices)) => serialize_future(
            parse_body::<NewRepairService>(req.body()).and_then(move |payload| service.create_repair_service(payload)),
        ),

        // PUT /admin/services/<service_id>
        (Method::Put, Some(Route::RepairService(service_id))) => serialize_future(
            parse_body::<ReplaceRepairService>(req.body()).and_then(move |payload| service.replace_repair_service(service_id, payload)),
        ),

        // PATCH /admin/services/<service_id>
        (Method::Patch, Some(Route::RepairService(service_id))) => serialize_future(
            parse_body::<UpdateRepairService>(req.body()).and_then(move |payload| service.update_repair_service(service_id, payload)),
        ),

        // DELETE /admin/services/<service_id>
        (Method::Delete, Some(Route::RepairService(service_id))) => serialize_future(service.delete_repair_service(service_id)),

        // GET /admin/brands
        (Method::Get, Some(Route::Brands)) => {
            serialize_future(future::result(brands_terms(&query)).and_then(move |terms| service.list_brands(terms)))
        }

        // GET /admin/brands/<brand_id>
        (Method::Get, Some(Route::Brand(brand_id))) => serialize_future(service.get_brand(brand_id)),

        // POST /admin/brands
        (Method::Post, Some(Route::Brands)) => {
            serialize_future(parse_body::<NewBrand>(req.body()).and_then(move |payload| service.create_brand(payload)))
        }

        // PUT /admin/brands/<brand_id>
        (Method::Put, Some(Route::Brand(brand_id))) => {
            serialize_future(parse_body::<ReplaceBrand>(req.body()).and_then(move |payload| service.replace_brand(brand_id, payload)))
        }

        // PATCH /admin/brands/<brand_id>
        (Method::Patch, Some(Route::Brand(brand_id))) => {
            serialize_future(parse_body::<UpdateBrand>(req.body()).and_then(move |payload| service.update_brand(brand_id, payload)))
        }

        // DELETE /admin/brands/<brand_id>
        (Method::Delete, Some(Route::Brand(brand_id))) => serialize_future(service.delete_brand(brand_id)),

        // GET /admin/models
        (Method::Get, Some(Route::DeviceModels)) => serialize_future(
            future::result(device_models_terms(&query)).and_then(move |terms| service.list_device_models(terms)),
        ),

        // GET /admin/models/<model_id>
        (Method::Get, Some(Route::DeviceModel(model_id))) => serialize_future(service.get_device_model(model_id)),

        // POST /admin/models
        (Method::Post, Some(Route::DeviceModels)) => serialize_future(
            parse_body::<NewDeviceModel>(req.body()).and_then(move |payload| service.create_device_model(payload)),
        ),

        // PUT /admin/models/<model_id>
        (Method::Put, Some(Route::DeviceModel(model_id))) => serialize_future(
            parse_body::<ReplaceDeviceModel>(req.body()).and_then(move |payload| service.replace_device_model(model_id, payload)),
        ),

        // PATCH /admin/models/<model_id>
        (Method::Patch, Some(Route::DeviceModel(model_id))) => serialize_future(
            parse_body::<UpdateDeviceModel>(req.body()).and_then(move |payload| service.update_device_model(model_id, payload)),
        ),

        // DELETE /admin/models/<model_id>
        (Method::Delete, Some(Route::DeviceModel(model_id))) => serialize_future(service.delete_device_model(model_id)),

        // GET /admin/users
        (Method::Get, Some(Route::StaffUsers)) => serialize_future(
            future::result(staff_users_terms(&query)).and_then(move |terms| service.list_staff_users(terms)),
        ),

        // GET /admin/users/<staff_user_id>
        (Method::Get, Some(Route::StaffUser(staff_user_id))) => serialize_future(service.get_staff_user(staff_user_id)),

        // POST /admin/users
        (Method::Post, Some(Route::StaffUsers)) => {
            serialize_future(parse_body::<NewStaffUser>(req.body()).and_then(move |payload| service.create_staff_user(payload)))
        }

        // PUT /admin/users/<staff_user_id>
        (Method::Put, Some(Route::StaffUser(staff_user_id))) => serialize_future(
            parse_body::<ReplaceStaffUser>(req.body()).and_then(move |payload| service.replace_staff_user(staff_user_id, payload)),
        ),

        // PATCH /admin/users/<staff_user_id>
        (Method::Patch, Some(Route::StaffUser(staff_user_id))) => serialize_future(
            parse_body::<UpdateStaffUser>(req.body()).and_then(move |payload| service.update_staff_user(staff_user_id, payload)),
        ),

        // DELETE /admin/users/<staff_user_id>
        (Method::Delete, Some(Route::StaffUser(staff_user_id))) => serialize_future(service.delete_staff_user(staff_user_id)),

        // GET /admin/bookings
        (Method::Get, Some(Route::Bookings)) => {
            serialize_future(future::result(bookings_terms(&query)).and_then(move |terms| service.list_bookings(terms)))
        }

        // GET /admin/bookings/<booking_id>
        (Method::Get, Some(Route::Booking(booking_id))) => serialize_future(service.get_booking(booking_id)),

        // PATCH /admin/bookings/<booking_id>
        (Method::Patch, Some(Route::Booking(booking_id))) => serialize_future(
            parse_body::<UpdateBooking>(req.body()).and_then(move |payload| service.update_booking(booking_id, payload)),
        ),

        // DELETE /admin/bookings/<booking_id>
        (Method::Delete, Some(Route::Booking(booking_id))) => serialize_future(service.delete_booking(booking_id)),

        // GET /admin/contents
        (Method::Get, Some(Route::ContentBlocks)) => serialize_future(
            future::result(content_blocks_terms(&query)).and_then(move |terms| service.list_content_blocks(terms)),
        ),

        // GET /admin/contents/<content_block_id>
        (Method::Get, Some(Route::ContentBlock(content_block_id))) => serialize_future(service.get_content_block(content_block_id)),

        // POST /admin/contents
        (Method::Post, Some(Route::ContentBlocks)) => serialize_future(
            parse_body::<NewContentBlock>(req.body()).and_then(move |payload| service.create_content_block(payload)),
        ),

        // PUT /admin/contents/<content_block_id>
        (Method::Put, Some(Route::ContentBlock(content_block_id))) => serialize_future(
            parse_body::<ReplaceContentBlock>(req.body())
                .and_then(move |payload| service.replace_content_block(content_block_id, payload)),
        ),

        // PATCH /admin/contents/<content_block_id>
        (Method::Patch, Some(Route::ContentBlock(content_block_id))) => serialize_future(
            parse_body::<UpdateContentBlock>(req.body())
                .and_then(move |payload| service.update_content_block(content_block_id, payload)),
        ),

        // DELETE /admin/contents/<content_block_id>
        (Method::Delete, Some(Route::ContentBlock(content_block_id))) => {
            serialize_future(service.delete_content_block(content_block_id))
        }

        // GET /admin/settings
        (Method::Get, Some(Route::Settings)) => serialize_future(service.list_settings()),

        // PUT /admin/settings/<key>
        (Method::Put, Some(Route::Setting(key))) => {
            serialize_future(parse_body::<PutSetting>(req.body()).and_then(move |payload| service.upsert_setting(key, payload)))
        }

        // DELETE /admin/settings/<key>
        (Method::Delete, Some(Route::Setting(key))) => serialize_future(service.delete_setting(key)),

        // GET /admin/messages
        (Method::Get, Some(Route::ContactMessages)) => serialize_future(
            future::result(contact_messages_terms(&query)).and_then(move |terms| service.list_contact_messages(terms)),
        ),

        // GET /admin/messages/<contact_message_id>
        (Method::Get, Some(Route::ContactMessage(contact_message_id))) => {
            serialize_future(service.get_contact_message(contact_message_id))
        }

        // PATCH /admin/messages/<contact_message_id>
        (Method::Patch, Some(Route::ContactMessage(contact_message_id))) => serialize_future(
            parse_body::<UpdateContactMessage>(req.body())
                .and_then(move |payload| service.update_contact_message(contact_message_id, payload)),
        ),

        // DELETE /admin/messages/<contact_message_id>
        (Method::Delete, Some(Route::ContactMessage(contact_message_id))) => {
            serialize_future(service.delete_contact_message(contact_message_id))
        }

        // Fallback
        (method, _) => Box::new(future::err(
            format_err!("Request to non existing endpoint in repairs microservice! {} {}", method, path)
                .context(Error::NotFound)
                .into(),
        )),
    }
}

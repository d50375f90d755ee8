use http::router::RouteParser;

/// List of all routes with params for the app
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Healthcheck,
    Sitemap,
    Manifest,
    PublicCategories,
    PublicBrands,
    PublicDeviceModels,
    PublicRepairServices,
    PublicRepairService(String),
    PublicSettings,
    PublicContentBlocks,
    PublicContact,
    PublicBookings,
    PublicWizard,
    PublicEstimate,
    Session,
    Categories,
    Category(i32),
    CategoryMove(i32),
    RepairServices,
    RepairService(i32),
    Brands,
    Brand(i32),
    DeviceModels,
    DeviceModel(i32),
    StaffUsers,
    StaffUser(i32),
    Bookings,
    Booking(i32),
    ContentBlocks,
    ContentBlock(i32),
    Settings,
    Setting(String),
    ContactMessages,
    ContactMessage(i32),
}

/// Every path of the back-office namespace goes through the staff guard, known or not
pub fn is_guarded(path: &str) -> bool {
    path == "/admin" || path.starts_with("/admin/")
}

fn id_param(params: &[&str]) -> Option<i32> {
    params.get(0).and_then(|string_id| string_id.parse::<i32>().ok())
}

pub fn create_route_parser() -> RouteParser<Route> {
    let mut router = RouteParser::default();

    // Healthcheck
    router.add_route(r"^/healthcheck$", || Route::Healthcheck);

    // Documents for crawlers and browsers
    router.add_route(r"^/sitemap\.xml$", || Route::Sitemap);
    router.add_route(r"^/manifest\.webmanifest$", || Route::Manifest);

    // Public routes
    router.add_route(r"^/public/categories$", || Route::PublicCategories);
    router.add_route(r"^/public/brands$", || Route::PublicBrands);
    router.add_route(r"^/public/models$", || Route::PublicDeviceModels);
    router.add_route(r"^/public/services$", || Route::PublicRepairServices);
    router.add_route_with_params(r"^/public/services/([a-z0-9-]+)$", |params| {
        params.get(0).map(|slug| Route::PublicRepairService(slug.to_string()))
    });
    router.add_route(r"^/public/settings$", || Route::PublicSettings);
    router.add_route(r"^/public/contents$", || Route::PublicContentBlocks);
    router.add_route(r"^/public/contact$", || Route::PublicContact);
    router.add_route(r"^/public/bookings$", || Route::PublicBookings);
    router.add_route(r"^/public/wizard$", || Route::PublicWizard);
    router.add_route(r"^/public/calculator/estimate$", || Route::PublicEstimate);

    // Admin session
    router.add_route(r"^/admin/session$", || Route::Session);

    // Categories routes
    router.add_route(r"^/admin/categories$", || Route::Categories);
    router.add_route_with_params(r"^/admin/categories/(\d+)$", |params| id_param(&params).map(Route::Category));
    router.add_route_with_params(r"^/admin/categories/(\d+)/move$", |params| id_param(&params).map(Route::CategoryMove));

    // Repair services routes
    router.add_route(r"^/admin/services$", || Route::RepairServices);
    router.add_route_with_params(r"^/admin/services/(\d+)$", |params| id_param(&params).map(Route::RepairService));

    // Brands routes
    router.add_route(r"^/admin/brands$", || Route::Brands);
    router.add_route_with_params(r"^/admin/brands/(\d+)$", |params| id_param(&params).map(Route::Brand));

    // Device models routes
    router.add_route(r"^/admin/models$", || Route::DeviceModels);
    router.add_route_with_params(r"^/admin/models/(\d+)$", |params| id_param(&params).map(Route::DeviceModel));

    // Staff users routes
    router.add_route(r"^/admin/users$", || Route::StaffUsers);
    router.add_route_with_params(r"^/admin/users/(\d+)$", |params| id_param(&params).map(Route::StaffUser));

    // Bookings routes
    router.add_route(r"^/admin/bookings$", || Route::Bookings);
    router.add_route_with_params(r"^/admin/bookings/(\d+)$", |params| id_param(&params).map(Route::Booking));

    // Content blocks routes
    router.add_route(r"^/admin/contents$", || Route::ContentBlocks);
    router.add_route_with_params(r"^/admin/contents/(\d+)$", |params| id_param(&params).map(Route::ContentBlock));

    // Settings routes
    router.add_route(r"^/admin/settings$", || Route::Settings);
    router.add_route_with_params(r"^/admin/settings/([a-z0-9_.-]+)$", |params| {
        params.get(0).map(|key| Route::Setting(key.to_string()))
    });

    // Contact messages routes
    router.add_route(r"^/admin/messages$", || Route::ContactMessages);
    router.add_route_with_params(r"^/admin/messages/(\d+)$", |params| id_param(&params).map(Route::ContactMessage));

    router
}

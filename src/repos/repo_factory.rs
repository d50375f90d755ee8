use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;

use models::*;
use repos::acl::base::SystemACL;
use repos::*;

pub trait ReposFactory<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>: Clone + Send + 'static {
    fn create_bookings_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<BookingsRepo + 'a>;
    fn create_brands_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<BrandsRepo + 'a>;
    fn create_categories_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<CategoriesRepo + 'a>;
    fn create_contact_messages_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<ContactMessagesRepo + 'a>;
    fn create_content_blocks_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<ContentBlocksRepo + 'a>;
    fn create_device_models_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<DeviceModelsRepo + 'a>;
    fn create_repair_services_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<RepairServicesRepo + 'a>;
    fn create_settings_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<SettingsRepo + 'a>;
    fn create_staff_users_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<StaffUsersRepo + 'a>;
    fn create_staff_users_repo_with_sys_acl<'a>(&self, db_conn: &'a C) -> Box<StaffUsersRepo + 'a>;
}

#[derive(Clone, Default)]
pub struct ReposFactoryImpl;

impl ReposFactoryImpl {
    /// Role of an active staff user, nothing for unknown or deactivated accounts
    pub fn get_roles<'a, C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>(
        &self,
        id: i32,
        db_conn: &'a C,
    ) -> Vec<Role> {
        self.create_staff_users_repo_with_sys_acl(db_conn)
            .find(id)
            .ok()
            .and_then(|user| user)
            .filter(|user| user.is_active)
            .map(|user| vec![user.role])
            .unwrap_or_default()
    }

    fn get_acl<'a, T, C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>(
        &self,
        db_conn: &'a C,
        user_id: Option<i32>,
    ) -> Box<RepoAcl<T>> {
        user_id.map_or(Box::new(UnauthorizedAcl::default()) as Box<RepoAcl<T>>, |id| {
            let roles = self.get_roles(id, db_conn);
            (Box::new(ApplicationAcl::new(roles, id)) as Box<RepoAcl<T>>)
        })
    }
}

impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryImpl {
    fn create_bookings_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<BookingsRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(BookingsRepoImpl::new(db_conn, acl)) as Box<BookingsRepo>
    }
    fn create_brands_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<BrandsRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(BrandsRepoImpl::new(db_conn, acl)) as Box<BrandsRepo>
    }
    fn create_categories_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<CategoriesRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(CategoriesRepoImpl::new(db_conn, acl)) as Box<CategoriesRepo>
    }
    fn create_contact_messages_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<ContactMessagesRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(ContactMessagesRepoImpl::new(db_conn, acl)) as Box<ContactMessagesRepo>
    }
    fn create_content_blocks_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<ContentBlocksRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(ContentBlocksRepoImpl::new(db_conn, acl)) as Box<ContentBlocksRepo>
    }
    fn create_device_models_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<DeviceModelsRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(DeviceModelsRepoImpl::new(db_conn, acl)) as Box<DeviceModelsRepo>
    }
    fn create_repair_services_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<RepairServicesRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(RepairServicesRepoImpl::new(db_conn, acl)) as Box<RepairServicesRepo>
    }
    fn create_settings_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<SettingsRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(SettingsRepoImpl::new(db_conn, acl)) as Box<SettingsRepo>
    }
    fn create_staff_users_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<StaffUsersRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(StaffUsersRepoImpl::new(db_conn, acl)) as Box<StaffUsersRepo>
    }
    fn create_staff_users_repo_with_sys_acl<'a>(&self, db_conn: &'a C) -> Box<StaffUsersRepo + 'a> {
        Box::new(StaffUsersRepoImpl::new(
            db_conn,
            Box::new(SystemACL::default()) as Box<RepoAcl<StaffUser>>,
        )) as Box<StaffUsersRepo>
    }
}

#[cfg(test)]
pub mod tests {
    use std::error::Error;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use chrono::NaiveDateTime;
    use diesel::connection::AnsiTransactionManager;
    use diesel::connection::SimpleConnection;
    use diesel::deserialize::QueryableByName;
    use diesel::pg::Pg;
    use diesel::query_builder::AsQuery;
    use diesel::query_builder::QueryFragment;
    use diesel::query_builder::QueryId;
    use diesel::sql_types::HasSqlType;
    use diesel::Connection;
    use diesel::ConnectionResult;
    use diesel::QueryResult;
    use diesel::Queryable;
    use futures_cpupool::CpuPool;
    use r2d2;
    use r2d2::ManageConnection;
    use serde_json;

    use config::Config;
    use controller::context::*;
    use models::booking::tests::create_booking;
    use models::brand::tests::create_brand;
    use models::category::tests::create_category;
    use models::contact_message::tests::create_contact_message;
    use models::content_block::tests::create_content_block;
    use models::device_model::tests::create_device_model;
    use models::repair_service::tests::create_repair_service;
    use models::setting::tests::create_setting;
    use models::staff_user::tests::create_staff_user;
    use models::*;
    use repos::*;
    use services::*;

    pub static MOCK_USER_ID: i32 = 1;
    pub static MOCK_TECHNICIAN_ID: i32 = 2;
    pub static MOCK_INACTIVE_USER_ID: i32 = 3;
    pub static MOCK_ADMIN_EMAIL: &'static str = "admin@repairs.de";
    pub static MOCK_TECHNICIAN_EMAIL: &'static str = "tech@repairs.de";
    pub static MOCK_INACTIVE_EMAIL: &'static str = "former@repairs.de";

    pub fn create_service(user_id: Option<i32>) -> Service<MockConnection, MockConnectionManager, ReposFactoryMock> {
        create_service_with_factory(user_id, ReposFactoryMock::default())
    }

    pub fn create_service_with_factory(
        user_id: Option<i32>,
        repo_factory: ReposFactoryMock,
    ) -> Service<MockConnection, MockConnectionManager, ReposFactoryMock> {
        let manager = MockConnectionManager::default();
        let db_pool = r2d2::Pool::builder().build(manager).expect("Failed to create connection pool");
        let cpu_pool = CpuPool::new(1);

        let config = Config::with_env("test").unwrap();
        let static_context = StaticContext::new(db_pool, cpu_pool, Arc::new(config), repo_factory);
        let dynamic_context = DynamicContext::new(user_id);

        Service::new(static_context, dynamic_context)
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd(2024, 6, 1).and_hms(12, 0, 0)
    }

    fn not_found(what: &str, id: i32) -> ::failure::Error {
        format_err!("{} {} not found", what, id)
    }

    fn list_failure(what: &str) -> ::failure::Error {
        format_err!("Listing {} failed", what)
    }

    /// Log of the writes the mock repos were asked for, e.g. `categories.delete 2`.
    /// Clones share the log, so a test can keep one and hand another to the factory.
    #[derive(Clone, Default)]
    pub struct MockWrites(Arc<Mutex<Vec<String>>>);

    impl MockWrites {
        pub fn record(&self, write: String) {
            self.0.lock().unwrap().push(write);
        }

        pub fn all(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    pub fn mock_categories() -> Vec<Category> {
        let mut notebook = create_category(2, "notebook", 2);
        notebook.name_de = "Notebook".to_string();
        notebook.name_en = "Notebook".to_string();
        vec![create_category(1, "smartphone", 1), notebook, create_category(3, "tablet", 3)]
    }

    pub fn mock_brands() -> Vec<Brand> {
        vec![create_brand(1, 1, "Apple"), create_brand(2, 1, "Samsung"), create_brand(3, 2, "Lenovo")]
    }

    pub fn mock_device_models() -> Vec<DeviceModel> {
        vec![
            create_device_model(1, 1, "iPhone 15 Pro"),
            create_device_model(2, 1, "iPhone 13"),
            create_device_model(3, 2, "Galaxy S23"),
            create_device_model(4, 3, "ThinkPad X1"),
        ]
    }

    pub fn mock_repair_services() -> Vec<RepairService> {
        let mut ram = create_repair_service(3, 2, "ram-erweiterung", Some(59), Some(249));
        ram.name_de = "RAM Erweiterung".to_string();
        ram.name_en = "RAM upgrade".to_string();
        let mut recovery = create_repair_service(4, 2, "datenrettung", None, None);
        recovery.price_display = Some("auf Anfrage".to_string());
        recovery.is_active = false;
        vec![
            create_repair_service(1, 1, "display-reparatur", Some(89), Some(189)),
            create_repair_service(2, 1, "akku-tausch", Some(49), Some(49)),
            ram,
            recovery,
        ]
    }

    pub fn mock_staff_users() -> Vec<StaffUser> {
        let mut former = create_staff_user(MOCK_INACTIVE_USER_ID, MOCK_INACTIVE_EMAIL, Role::Technician);
        former.is_active = false;
        vec![
            create_staff_user(MOCK_USER_ID, MOCK_ADMIN_EMAIL, Role::Admin),
            create_staff_user(MOCK_TECHNICIAN_ID, MOCK_TECHNICIAN_EMAIL, Role::Technician),
            former,
        ]
    }

    pub fn mock_settings() -> Vec<Setting> {
        vec![
            create_setting("contact_phone", json!("+49 30 1234567"), true),
            create_setting("invoice_prefix", json!("RE-"), false),
        ]
    }

    #[derive(Clone)]
    pub struct ReposFactoryMock {
        pub writes: MockWrites,
        pub categories: Vec<Category>,
        /// Every catalogue `list` call fails, lookups by id keep working
        pub failing_lists: bool,
    }

    impl Default for ReposFactoryMock {
        fn default() -> Self {
            ReposFactoryMock {
                writes: MockWrites::default(),
                categories: mock_categories(),
                failing_lists: false,
            }
        }
    }

    impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryMock {
        fn create_bookings_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<BookingsRepo + 'a> {
            Box::new(BookingsRepoMock {
                writes: self.writes.clone(),
            }) as Box<BookingsRepo>
        }
        fn create_brands_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<BrandsRepo + 'a> {
            Box::new(BrandsRepoMock {
                failing_lists: self.failing_lists,
            }) as Box<BrandsRepo>
        }
        fn create_categories_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<CategoriesRepo + 'a> {
            Box::new(CategoriesRepoMock {
                writes: self.writes.clone(),
                categories: self.categories.clone(),
                failing_lists: self.failing_lists,
            }) as Box<CategoriesRepo>
        }
        fn create_contact_messages_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<ContactMessagesRepo + 'a> {
            Box::new(ContactMessagesRepoMock {
                writes: self.writes.clone(),
            }) as Box<ContactMessagesRepo>
        }
        fn create_content_blocks_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<ContentBlocksRepo + 'a> {
            Box::new(ContentBlocksRepoMock::default()) as Box<ContentBlocksRepo>
        }
        fn create_device_models_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<DeviceModelsRepo + 'a> {
            Box::new(DeviceModelsRepoMock {
                failing_lists: self.failing_lists,
            }) as Box<DeviceModelsRepo>
        }
        fn create_repair_services_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<RepairServicesRepo + 'a> {
            Box::new(RepairServicesRepoMock {
                writes: self.writes.clone(),
                failing_lists: self.failing_lists,
            }) as Box<RepairServicesRepo>
        }
        fn create_settings_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<SettingsRepo + 'a> {
            Box::new(SettingsRepoMock::default()) as Box<SettingsRepo>
        }
        fn create_staff_users_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<StaffUsersRepo + 'a> {
            Box::new(StaffUsersRepoMock::default()) as Box<StaffUsersRepo>
        }
        fn create_staff_users_repo_with_sys_acl<'a>(&self, _db_conn: &'a C) -> Box<StaffUsersRepo + 'a> {
            Box::new(StaffUsersRepoMock::default()) as Box<StaffUsersRepo>
        }
    }

    #[derive(Clone)]
    pub struct CategoriesRepoMock {
        pub writes: MockWrites,
        pub categories: Vec<Category>,
        pub failing_lists: bool,
    }

    impl CategoriesRepo for CategoriesRepoMock {
        fn list(&self, terms: CategoriesSearchTerms) -> RepoResult<Vec<Category>> {
            if self.failing_lists {
                return Err(list_failure("categories"));
            }
            let mut categories = self.categories.clone();
            categories.sort_by_key(|category| (category.display_order, category.id));
            Ok(categories
                .into_iter()
                .filter(|category| terms.is_active.map(|flag| category.is_active == flag).unwrap_or(true))
                .filter(|category| {
                    matches_search(
                        terms.search.as_ref().map(String::as_str),
                        &[&category.slug, &category.name_de, &category.name_en],
                    )
                }).collect())
        }

        fn find(&self, id_arg: i32) -> RepoResult<Option<Category>> {
            Ok(self.categories.iter().find(|category| category.id == id_arg).cloned())
        }

        fn find_by_slug(&self, slug_arg: String) -> RepoResult<Option<Category>> {
            Ok(self.categories.iter().find(|category| category.slug == slug_arg).cloned())
        }

        fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
            Ok(self
                .categories
                .iter()
                .any(|category| category.slug == slug_arg && Some(category.id) != exclude_id))
        }

        fn create(&self, payload: NewCategory) -> RepoResult<Category> {
            self.writes.record(format!("categories.create {}", payload.slug));
            Ok(Category {
                id: 4,
                slug: payload.slug,
                name_de: payload.name_de,
                name_en: payload.name_en,
                description_de: payload.description_de,
                description_en: payload.description_en,
                icon: payload.icon,
                badge: payload.badge,
                display_order: payload.display_order,
                is_active: payload.is_active,
                created_at: now(),
                updated_at: now(),
            })
        }

        fn replace(&self, id_arg: i32, payload: ReplaceCategory) -> RepoResult<Category> {
            self.writes.record(format!("categories.replace {}", id_arg));
            let current = self.find(id_arg)?.ok_or_else(|| not_found("Category", id_arg))?;
            Ok(Category {
                slug: payload.slug,
                name_de: payload.name_de,
                name_en: payload.name_en,
                description_de: payload.description_de,
                description_en: payload.description_en,
                icon: payload.icon,
                badge: payload.badge,
                display_order: payload.display_order,
                is_active: payload.is_active,
                updated_at: now(),
                ..current
            })
        }

        fn update(&self, id_arg: i32, payload: UpdateCategory) -> RepoResult<Category> {
            self.writes.record(format!("categories.update {}", id_arg));
            let mut category = self.find(id_arg)?.ok_or_else(|| not_found("Category", id_arg))?;
            if let Some(slug) = payload.slug {
                category.slug = slug;
            }
            if let Some(name_de) = payload.name_de {
                category.name_de = name_de;
            }
            if let Some(name_en) = payload.name_en {
                category.name_en = name_en;
            }
            if payload.description_de.is_some() {
                category.description_de = payload.description_de;
            }
            if payload.description_en.is_some() {
                category.description_en = payload.description_en;
            }
            if payload.icon.is_some() {
                category.icon = payload.icon;
            }
            if payload.badge.is_some() {
                category.badge = payload.badge;
            }
            if let Some(display_order) = payload.display_order {
                category.display_order = display_order;
            }
            if let Some(is_active) = payload.is_active {
                category.is_active = is_active;
            }
            Ok(category)
        }

        fn set_display_order(&self, id_arg: i32, display_order_arg: i32) -> RepoResult<Category> {
            self.writes.record(format!("categories.set_display_order {} {}", id_arg, display_order_arg));
            let mut category = self.find(id_arg)?.ok_or_else(|| not_found("Category", id_arg))?;
            category.display_order = display_order_arg;
            Ok(category)
        }

        fn delete(&self, id_arg: i32) -> RepoResult<Category> {
            self.writes.record(format!("categories.delete {}", id_arg));
            self.find(id_arg)?.ok_or_else(|| not_found("Category", id_arg))
        }
    }

    #[derive(Clone, Default)]
    pub struct BrandsRepoMock {
        pub failing_lists: bool,
    }

    impl BrandsRepo for BrandsRepoMock {
        fn list(&self, terms: BrandsSearchTerms) -> RepoResult<Vec<Brand>> {
            if self.failing_lists {
                return Err(list_failure("brands"));
            }
            Ok(mock_brands()
                .into_iter()
                .filter(|brand| terms.category_id.map(|id| brand.category_id == id).unwrap_or(true))
                .filter(|brand| terms.is_active.map(|flag| brand.is_active == flag).unwrap_or(true))
                .filter(|brand| matches_search(terms.search.as_ref().map(String::as_str), &[&brand.name]))
                .collect())
        }

        fn find(&self, id_arg: i32) -> RepoResult<Option<Brand>> {
            Ok(mock_brands().into_iter().find(|brand| brand.id == id_arg))
        }

        fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
            Ok(mock_brands()
                .into_iter()
                .any(|brand| brand.slug == slug_arg && Some(brand.id) != exclude_id))
        }

        fn count_by_category(&self, category_id_arg: i32) -> RepoResult<i64> {
            Ok(mock_brands().into_iter().filter(|brand| brand.category_id == category_id_arg).count() as i64)
        }

        fn create(&self, payload: NewBrand) -> RepoResult<Brand> {
            Ok(Brand {
                id: 4,
                category_id: payload.category_id,
                slug: payload.slug,
                name: payload.name,
                logo: payload.logo,
                display_order: payload.display_order,
                is_active: payload.is_active,
                created_at: now(),
                updated_at: now(),
            })
        }

        fn replace(&self, id_arg: i32, payload: ReplaceBrand) -> RepoResult<Brand> {
            let current = self.find(id_arg)?.ok_or_else(|| not_found("Brand", id_arg))?;
            Ok(Brand {
                category_id: payload.category_id,
                slug: payload.slug,
                name: payload.name,
                logo: payload.logo,
                display_order: payload.display_order,
                is_active: payload.is_active,
                updated_at: now(),
                ..current
            })
        }

        fn update(&self, id_arg: i32, payload: UpdateBrand) -> RepoResult<Brand> {
            let mut brand = self.find(id_arg)?.ok_or_else(|| not_found("Brand", id_arg))?;
            if let Some(category_id) = payload.category_id {
                brand.category_id = category_id;
            }
            if let Some(slug) = payload.slug {
                brand.slug = slug;
            }
            if let Some(name) = payload.name {
                brand.name = name;
            }
            if payload.logo.is_some() {
                brand.logo = payload.logo;
            }
            if let Some(display_order) = payload.display_order {
                brand.display_order = display_order;
            }
            if let Some(is_active) = payload.is_active {
                brand.is_active = is_active;
            }
            Ok(brand)
        }

        fn delete(&self, id_arg: i32) -> RepoResult<Brand> {
            self.find(id_arg)?.ok_or_else(|| not_found("Brand", id_arg))
        }
    }

    #[derive(Clone, Default)]
    pub struct DeviceModelsRepoMock {
        pub failing_lists: bool,
    }

    impl DeviceModelsRepo for DeviceModelsRepoMock {
        fn list(&self, terms: DeviceModelsSearchTerms) -> RepoResult<Vec<DeviceModel>> {
            if self.failing_lists {
                return Err(list_failure("device models"));
            }
            Ok(mock_device_models()
                .into_iter()
                .filter(|model| terms.brand_id.map(|id| model.brand_id == id).unwrap_or(true))
                .filter(|model| terms.is_active.map(|flag| model.is_active == flag).unwrap_or(true))
                .filter(|model| model.matches_name(terms.search.as_ref().map(String::as_str)))
                .collect())
        }

        fn find(&self, id_arg: i32) -> RepoResult<Option<DeviceModel>> {
            Ok(mock_device_models().into_iter().find(|model| model.id == id_arg))
        }

        fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
            Ok(mock_device_models()
                .into_iter()
                .any(|model| model.slug == slug_arg && Some(model.id) != exclude_id))
        }

        fn count_by_brand(&self, brand_id_arg: i32) -> RepoResult<i64> {
            Ok(mock_device_models().into_iter().filter(|model| model.brand_id == brand_id_arg).count() as i64)
        }

        fn create(&self, payload: NewDeviceModel) -> RepoResult<DeviceModel> {
            Ok(DeviceModel {
                id: 5,
                brand_id: payload.brand_id,
                slug: payload.slug,
                name: payload.name,
                release_year: payload.release_year,
                display_order: payload.display_order,
                is_active: payload.is_active,
                created_at: now(),
                updated_at: now(),
            })
        }

        fn replace(&self, id_arg: i32, payload: ReplaceDeviceModel) -> RepoResult<DeviceModel> {
            let current = self.find(id_arg)?.ok_or_else(|| not_found("Device model", id_arg))?;
            Ok(DeviceModel {
                brand_id: payload.brand_id,
                slug: payload.slug,
                name: payload.name,
                release_year: payload.release_year,
                display_order: payload.display_order,
                is_active: payload.is_active,
                updated_at: now(),
                ..current
            })
        }

        fn update(&self, id_arg: i32, payload: UpdateDeviceModel) -> RepoResult<DeviceModel> {
            let mut model = self.find(id_arg)?.ok_or_else(|| not_found("Device model", id_arg))?;
            if let Some(brand_id) = payload.brand_id {
                model.brand_id = brand_id;
            }
            if let Some(slug) = payload.slug {
                model.slug = slug;
            }
            if let Some(name) = payload.name {
                model.name = name;
            }
            if payload.release_year.is_some() {
                model.release_year = payload.release_year;
            }
            if let Some(display_order) = payload.display_order {
                model.display_order = display_order;
            }
            if let Some(is_active) = payload.is_active {
                model.is_active = is_active;
            }
            Ok(model)
        }

        fn delete(&self, id_arg: i32) -> RepoResult<DeviceModel> {
            self.find(id_arg)?.ok_or_else(|| not_found("Device model", id_arg))
        }
    }

    #[derive(Clone, Default)]
    pub struct RepairServicesRepoMock {
        pub writes: MockWrites,
        pub failing_lists: bool,
    }

    impl RepairServicesRepo for RepairServicesRepoMock {
        fn list(&self, terms: RepairServicesSearchTerms) -> RepoResult<Vec<RepairService>> {
            if self.failing_lists {
                return Err(list_failure("repair services"));
            }
            Ok(mock_repair_services()
                .into_iter()
                .filter(|service| terms.category_id.map(|id| service.category_id == id).unwrap_or(true))
                .filter(|service| terms.is_active.map(|flag| service.is_active == flag).unwrap_or(true))
                .filter(|service| {
                    matches_search(
                        terms.search.as_ref().map(String::as_str),
                        &[&service.slug, &service.name_de, &service.name_en],
                    )
                }).collect())
        }

        fn find(&self, id_arg: i32) -> RepoResult<Option<RepairService>> {
            Ok(mock_repair_services().into_iter().find(|service| service.id == id_arg))
        }

        fn find_by_slug(&self, slug_arg: String) -> RepoResult<Option<RepairService>> {
            Ok(mock_repair_services().into_iter().find(|service| service.slug == slug_arg))
        }

        fn find_many(&self, ids: Vec<i32>) -> RepoResult<Vec<RepairService>> {
            Ok(mock_repair_services()
                .into_iter()
                .filter(|service| ids.contains(&service.id))
                .collect())
        }

        fn slug_exists(&self, slug_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
            Ok(mock_repair_services()
                .into_iter()
                .any(|service| service.slug == slug_arg && Some(service.id) != exclude_id))
        }

        fn count_by_category(&self, category_id_arg: i32) -> RepoResult<i64> {
            Ok(mock_repair_services()
                .into_iter()
                .filter(|service| service.category_id == category_id_arg)
                .count() as i64)
        }

        fn create(&self, payload: NewRepairService) -> RepoResult<RepairService> {
            self.writes.record(format!("services.create {}", payload.slug));
            Ok(RepairService {
                id: 5,
                category_id: payload.category_id,
                slug: payload.slug,
                name_de: payload.name_de,
                name_en: payload.name_en,
                description_de: payload.description_de,
                description_en: payload.description_en,
                icon: payload.icon,
                duration: payload.duration,
                price_min: payload.price_min,
                price_max: payload.price_max,
                price_display: payload.price_display,
                display_order: payload.display_order,
                is_active: payload.is_active,
                created_at: now(),
                updated_at: now(),
            })
        }

        fn replace(&self, id_arg: i32, payload: ReplaceRepairService) -> RepoResult<RepairService> {
            self.writes.record(format!("services.replace {}", id_arg));
            let current = self.find(id_arg)?.ok_or_else(|| not_found("Repair service", id_arg))?;
            Ok(RepairService {
                category_id: payload.category_id,
                slug: payload.slug,
                name_de: payload.name_de,
                name_en: payload.name_en,
                description_de: payload.description_de,
                description_en: payload.description_en,
                icon: payload.icon,
                duration: payload.duration,
                price_min: payload.price_min,
                price_max: payload.price_max,
                price_display: payload.price_display,
                display_order: payload.display_order,
                is_active: payload.is_active,
                updated_at: now(),
                ..current
            })
        }

        fn update(&self, id_arg: i32, payload: UpdateRepairService) -> RepoResult<RepairService> {
            self.writes.record(format!("services.update {}", id_arg));
            let mut service = self.find(id_arg)?.ok_or_else(|| not_found("Repair service", id_arg))?;
            if let Some(category_id) = payload.category_id {
                service.category_id = category_id;
            }
            if let Some(slug) = payload.slug {
                service.slug = slug;
            }
            if let Some(name_de) = payload.name_de {
                service.name_de = name_de;
            }
            if let Some(name_en) = payload.name_en {
                service.name_en = name_en;
            }
            if payload.price_min.is_some() {
                service.price_min = payload.price_min;
            }
            if payload.price_max.is_some() {
                service.price_max = payload.price_max;
            }
            if payload.price_display.is_some() {
                service.price_display = payload.price_display;
            }
            if let Some(display_order) = payload.display_order {
                service.display_order = display_order;
            }
            if let Some(is_active) = payload.is_active {
                service.is_active = is_active;
            }
            Ok(service)
        }

        fn delete(&self, id_arg: i32) -> RepoResult<RepairService> {
            self.writes.record(format!("services.delete {}", id_arg));
            self.find(id_arg)?.ok_or_else(|| not_found("Repair service", id_arg))
        }
    }

    #[derive(Clone, Default)]
    pub struct BookingsRepoMock {
        pub writes: MockWrites,
    }

    impl BookingsRepo for BookingsRepoMock {
        fn list(&self, terms: BookingsSearchTerms) -> RepoResult<Vec<Booking>> {
            Ok(vec![create_booking(2, BookingStatus::Completed), create_booking(1, BookingStatus::Pending)]
                .into_iter()
                .filter(|booking| terms.status.map(|status| booking.status == status).unwrap_or(true))
                .collect())
        }

        fn find(&self, id_arg: i32) -> RepoResult<Option<Booking>> {
            Ok(match id_arg {
                1 => Some(create_booking(1, BookingStatus::Pending)),
                2 => Some(create_booking(2, BookingStatus::Completed)),
                _ => None,
            })
        }

        fn create(&self, payload: InsertBooking) -> RepoResult<Booking> {
            self.writes.record(format!("bookings.create {}", payload.customer_email));
            Ok(Booking {
                id: 3,
                customer_name: payload.customer_name,
                customer_email: payload.customer_email,
                customer_phone: payload.customer_phone,
                message: payload.message,
                category_id: payload.category_id,
                brand_id: payload.brand_id,
                model_id: payload.model_id,
                service_id: payload.service_id,
                status: payload.status,
                estimated_price: payload.estimated_price,
                final_price: None,
                created_at: now(),
                updated_at: now(),
            })
        }

        fn update(&self, id_arg: i32, payload: UpdateBooking) -> RepoResult<Booking> {
            let mut booking = self.find(id_arg)?.ok_or_else(|| not_found("Booking", id_arg))?;
            if let Some(status) = payload.status {
                booking.status = status;
            }
            if payload.final_price.is_some() {
                booking.final_price = payload.final_price;
            }
            if payload.message.is_some() {
                booking.message = payload.message;
            }
            Ok(booking)
        }

        fn delete(&self, id_arg: i32) -> RepoResult<Booking> {
            self.find(id_arg)?.ok_or_else(|| not_found("Booking", id_arg))
        }
    }

    #[derive(Clone, Default)]
    pub struct StaffUsersRepoMock;

    impl StaffUsersRepo for StaffUsersRepoMock {
        fn list(&self, terms: StaffUsersSearchTerms) -> RepoResult<Vec<StaffUser>> {
            Ok(mock_staff_users()
                .into_iter()
                .filter(|user| terms.role.map(|role| user.role == role).unwrap_or(true))
                .filter(|user| terms.is_active.map(|flag| user.is_active == flag).unwrap_or(true))
                .filter(|user| matches_search(terms.search.as_ref().map(String::as_str), &[&user.email, &user.full_name]))
                .collect())
        }

        fn find(&self, id_arg: i32) -> RepoResult<Option<StaffUser>> {
            Ok(mock_staff_users().into_iter().find(|user| user.id == id_arg))
        }

        fn find_by_email(&self, email_arg: String) -> RepoResult<Option<StaffUser>> {
            Ok(mock_staff_users().into_iter().find(|user| user.email == email_arg))
        }

        fn email_exists(&self, email_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
            Ok(mock_staff_users()
                .into_iter()
                .any(|user| user.email == email_arg && Some(user.id) != exclude_id))
        }

        fn create(&self, payload: NewStaffUser) -> RepoResult<StaffUser> {
            Ok(StaffUser {
                id: 4,
                email: payload.email,
                full_name: payload.full_name,
                role: payload.role,
                is_active: payload.is_active,
                last_login: None,
                created_at: now(),
                updated_at: now(),
            })
        }

        fn update(&self, id_arg: i32, payload: UpdateStaffUser) -> RepoResult<StaffUser> {
            let mut user = self.find(id_arg)?.ok_or_else(|| not_found("Staff user", id_arg))?;
            if let Some(email) = payload.email {
                user.email = email;
            }
            if let Some(full_name) = payload.full_name {
                user.full_name = full_name;
            }
            if let Some(role) = payload.role {
                user.role = role;
            }
            if let Some(is_active) = payload.is_active {
                user.is_active = is_active;
            }
            Ok(user)
        }

        fn touch_last_login(&self, id_arg: i32) -> RepoResult<StaffUser> {
            let mut user = self.find(id_arg)?.ok_or_else(|| not_found("Staff user", id_arg))?;
            user.last_login = Some(now());
            Ok(user)
        }

        fn delete(&self, id_arg: i32) -> RepoResult<StaffUser> {
            self.find(id_arg)?.ok_or_else(|| not_found("Staff user", id_arg))
        }
    }

    #[derive(Clone, Default)]
    pub struct SettingsRepoMock;

    impl SettingsRepo for SettingsRepoMock {
        fn list(&self) -> RepoResult<Vec<Setting>> {
            Ok(mock_settings())
        }

        fn list_public(&self) -> RepoResult<Vec<Setting>> {
            Ok(mock_settings().into_iter().filter(|setting| setting.is_public).collect())
        }

        fn find(&self, key_arg: String) -> RepoResult<Option<Setting>> {
            Ok(mock_settings().into_iter().find(|setting| setting.key == key_arg))
        }

        fn upsert(&self, payload: NewSetting) -> RepoResult<Setting> {
            Ok(Setting {
                key: payload.key,
                value: payload.value,
                is_public: payload.is_public,
                updated_at: now(),
            })
        }

        fn delete(&self, key_arg: String) -> RepoResult<Setting> {
            self.find(key_arg.clone())?
                .ok_or_else(|| format_err!("Setting {} not found", key_arg))
        }
    }

    #[derive(Clone, Default)]
    pub struct ContentBlocksRepoMock;

    impl ContentBlocksRepo for ContentBlocksRepoMock {
        fn list(&self, terms: ContentBlocksSearchTerms) -> RepoResult<Vec<ContentBlock>> {
            Ok(vec![create_content_block(1, "about", "intro"), create_content_block(2, "about", "team"), create_content_block(3, "home", "hero")]
                .into_iter()
                .filter(|block| terms.page.as_ref().map(|page| &block.page == page).unwrap_or(true))
                .filter(|block| terms.is_active.map(|flag| block.is_active == flag).unwrap_or(true))
                .collect())
        }

        fn find(&self, id_arg: i32) -> RepoResult<Option<ContentBlock>> {
            Ok(self.list(ContentBlocksSearchTerms::default())?.into_iter().find(|block| block.id == id_arg))
        }

        fn key_exists(&self, page_arg: String, block_key_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
            Ok(self
                .list(ContentBlocksSearchTerms::default())?
                .into_iter()
                .any(|block| block.page == page_arg && block.block_key == block_key_arg && Some(block.id) != exclude_id))
        }

        fn create(&self, payload: NewContentBlock) -> RepoResult<ContentBlock> {
            Ok(ContentBlock {
                id: 4,
                page: payload.page,
                block_key: payload.block_key,
                title_de: payload.title_de,
                title_en: payload.title_en,
                body_de: payload.body_de,
                body_en: payload.body_en,
                display_order: payload.display_order,
                is_active: payload.is_active,
                created_at: now(),
                updated_at: now(),
            })
        }

        fn replace(&self, id_arg: i32, payload: ReplaceContentBlock) -> RepoResult<ContentBlock> {
            let current = self.find(id_arg)?.ok_or_else(|| not_found("Content block", id_arg))?;
            Ok(ContentBlock {
                page: payload.page,
                block_key: payload.block_key,
                title_de: payload.title_de,
                title_en: payload.title_en,
                body_de: payload.body_de,
                body_en: payload.body_en,
                display_order: payload.display_order,
                is_active: payload.is_active,
                updated_at: now(),
                ..current
            })
        }

        fn update(&self, id_arg: i32, payload: UpdateContentBlock) -> RepoResult<ContentBlock> {
            let mut block = self.find(id_arg)?.ok_or_else(|| not_found("Content block", id_arg))?;
            if let Some(body_de) = payload.body_de {
                block.body_de = body_de;
            }
            if let Some(body_en) = payload.body_en {
                block.body_en = body_en;
            }
            if let Some(is_active) = payload.is_active {
                block.is_active = is_active;
            }
            Ok(block)
        }

        fn delete(&self, id_arg: i32) -> RepoResult<ContentBlock> {
            self.find(id_arg)?.ok_or_else(|| not_found("Content block", id_arg))
        }
    }

    #[derive(Clone, Default)]
    pub struct ContactMessagesRepoMock {
        pub writes: MockWrites,
    }

    impl ContactMessagesRepo for ContactMessagesRepoMock {
        fn list(&self, terms: ContactMessagesSearchTerms) -> RepoResult<Vec<ContactMessage>> {
            Ok(vec![create_contact_message(2, true), create_contact_message(1, false)]
                .into_iter()
                .filter(|msg| terms.is_read.map(|flag| msg.is_read == flag).unwrap_or(true))
                .collect())
        }

        fn find(&self, id_arg: i32) -> RepoResult<Option<ContactMessage>> {
            Ok(self.list(ContactMessagesSearchTerms::default())?.into_iter().find(|msg| msg.id == id_arg))
        }

        fn create(&self, payload: NewContactMessage) -> RepoResult<ContactMessage> {
            self.writes.record(format!("contact_messages.create {}", payload.email));
            Ok(ContactMessage {
                id: 3,
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                subject: payload.subject,
                message: payload.message,
                is_read: false,
                created_at: now(),
            })
        }

        fn update(&self, id_arg: i32, payload: UpdateContactMessage) -> RepoResult<ContactMessage> {
            self.writes.record(format!("contact_messages.update {}", id_arg));
            let mut msg = self.find(id_arg)?.ok_or_else(|| not_found("Contact message", id_arg))?;
            if let Some(is_read) = payload.is_read {
                msg.is_read = is_read;
            }
            Ok(msg)
        }

        fn delete(&self, id_arg: i32) -> RepoResult<ContactMessage> {
            self.writes.record(format!("contact_messages.delete {}", id_arg));
            self.find(id_arg)?.ok_or_else(|| not_found("Contact message", id_arg))
        }
    }

    #[derive(Default)]
    pub struct MockConnection {
        tr: AnsiTransactionManager,
    }

    impl Connection for MockConnection {
        type Backend = Pg;
        type TransactionManager = AnsiTransactionManager;

        fn establish(_database_url: &str) -> ConnectionResult<MockConnection> {
            Ok(MockConnection::default())
        }

        fn execute(&self, _query: &str) -> QueryResult<usize> {
            unimplemented!()
        }

        fn query_by_index<T, U>(&self, _source: T) -> QueryResult<Vec<U>>
        where
            T: AsQuery,
            T::Query: QueryFragment<Pg> + QueryId,
            Pg: HasSqlType<T::SqlType>,
            U: Queryable<T::SqlType, Pg>,
        {
            unimplemented!()
        }

        fn query_by_name<T, U>(&self, _source: &T) -> QueryResult<Vec<U>>
        where
            T: QueryFragment<Pg> + QueryId,
            U: QueryableByName<Pg>,
        {
            unimplemented!()
        }

        fn execute_returning_count<T>(&self, _source: &T) -> QueryResult<usize>
        where
            T: QueryFragment<Pg> + QueryId,
        {
            unimplemented!()
        }

        fn transaction_manager(&self) -> &Self::TransactionManager {
            &self.tr
        }
    }

    impl SimpleConnection for MockConnection {
        fn batch_execute(&self, _query: &str) -> QueryResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockConnectionManager;

    impl ManageConnection for MockConnectionManager {
        type Connection = MockConnection;
        type Error = MockError;

        fn connect(&self) -> Result<MockConnection, MockError> {
            Ok(MockConnection::default())
        }

        fn is_valid(&self, _conn: &mut MockConnection) -> Result<(), MockError> {
            Ok(())
        }

        fn has_broken(&self, _conn: &mut MockConnection) -> bool {
            false
        }
    }

    #[derive(Debug)]
    pub struct MockError {}

    impl fmt::Display for MockError {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "Mock connection failure")
        }
    }

    impl Error for MockError {
        fn description(&self) -> &str {
            "Mock connection failure"
        }

        fn cause(&self) -> Option<&Error> {
            None
        }
    }

    #[test]
    fn test_mock_fixtures_are_consistent() {
        let categories = mock_categories();
        assert!(mock_brands().iter().all(|brand| categories.iter().any(|c| c.id == brand.category_id)));
        assert!(mock_repair_services().iter().all(|s| categories.iter().any(|c| c.id == s.category_id)));
        let _ = serde_json::to_string(&mock_settings()).unwrap();
    }
}

//! Settings Services, key/value configuration edited from the back-office
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::ReposFactory;
use services::{not_found_error, validate_payload, Service};

pub trait SettingsService {
    /// Returns all settings ordered by key
    fn list_settings(&self) -> ServiceFuture<Vec<Setting>>;
    /// Returns settings flagged as public
    fn list_public_settings(&self) -> ServiceFuture<Vec<Setting>>;
    /// Creates or overwrites a setting
    fn upsert_setting(&self, key: String, payload: PutSetting) -> ServiceFuture<Setting>;
    fn delete_setting(&self, key: String) -> ServiceFuture<Setting>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > SettingsService for Service<T, M, F>
{
    fn list_settings(&self) -> ServiceFuture<Vec<Setting>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let settings_repo = repo_factory.create_settings_repo(&*conn, user_id);
            settings_repo
                .list()
                .map_err(|e| e.context("Service Settings, list_settings endpoint error occurred.").into())
        })
    }

    fn list_public_settings(&self) -> ServiceFuture<Vec<Setting>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let settings_repo = repo_factory.create_settings_repo(&*conn, user_id);
            settings_repo
                .list_public()
                .map_err(|e| e.context("Service Settings, list_public_settings endpoint error occurred.").into())
        })
    }

    fn upsert_setting(&self, key: String, payload: PutSetting) -> ServiceFuture<Setting> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();
        let setting = NewSetting::new(key, payload);

        self.spawn_on_pool(move |conn| {
            let settings_repo = repo_factory.create_settings_repo(&*conn, user_id);
            validate_payload(&setting)
                .and_then(|_| settings_repo.upsert(setting))
                .map_err(|e: FailureError| e.context("Service Settings, upsert_setting endpoint error occurred.").into())
        })
    }

    fn delete_setting(&self, key: String) -> ServiceFuture<Setting> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let settings_repo = repo_factory.create_settings_repo(&*conn, user_id);
            settings_repo
                .find(key.clone())
                .and_then(|setting| setting.ok_or_else(|| not_found_error("Setting", &key)))
                .and_then(|_| settings_repo.delete(key))
                .map_err(|e: FailureError| e.context("Service Settings, delete_setting endpoint error occurred.").into())
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

    #[test]
    fn test_public_settings_hide_private_keys() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let settings = core.run(service.list_public_settings()).unwrap();
        let keys: Vec<&str> = settings.iter().map(|setting| setting.key.as_str()).collect();
        assert_eq!(keys, vec!["contact_phone"]);
    }

    #[test]
    fn test_upsert_setting() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let payload = PutSetting {
            value: json!({"mo-fr": "09:00-18:00", "sa": "10:00-14:00"}),
            is_public: Some(true),
        };
        let setting = core.run(service.upsert_setting("business_hours".to_string(), payload)).unwrap();
        assert_eq!(setting.key, "business_hours");
        assert!(setting.is_public);
    }

    #[test]
    fn test_upsert_setting_with_invalid_key() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let payload = PutSetting {
            value: json!("x"),
            is_public: None,
        };
        let result = core.run(service.upsert_setting("Business Hours".to_string(), payload)).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::Validate(_)) => true,
            _ => false,
        });
    }

    #[test]
    fn test_delete_missing_setting() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let result = core.run(service.delete_setting("nothing_here".to_string())).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::NotFound) => true,
            _ => false,
        });
        let deleted = core.run(service.delete_setting("invoice_prefix".to_string())).unwrap();
        assert!(!deleted.is_public);
    }
}

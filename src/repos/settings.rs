//! Settings repo, presents CRUD operations with db for settings
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::setting::settings::dsl::*;
use models::{NewSetting, Setting};
use repos::acl;
use repos::acl::base::CheckScope;
use repos::types::{RepoAcl, RepoResult};

/// Settings repository, responsible for handling settings
pub struct SettingsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<Setting>>,
}

pub trait SettingsRepo {
    /// Returns all settings ordered by key
    fn list(&self) -> RepoResult<Vec<Setting>>;

    /// Returns settings visible on the public site
    fn list_public(&self) -> RepoResult<Vec<Setting>>;

    /// Find specific setting by key
    fn find(&self, key_arg: String) -> RepoResult<Option<Setting>>;

    /// Creates the setting or overwrites the stored one
    fn upsert(&self, payload: NewSetting) -> RepoResult<Setting>;

    /// Deletes specific setting
    fn delete(&self, key_arg: String) -> RepoResult<Setting>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> SettingsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<Setting>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> SettingsRepo for SettingsRepoImpl<'a, T> {
    fn list(&self) -> RepoResult<Vec<Setting>> {
        debug!("List settings.");
        acl::check(&*self.acl, Resource::Settings, Action::Read, self, None)
            .and_then(|_| settings.order(key.asc()).load::<Setting>(self.db_conn).map_err(From::from))
            .map_err(|e: FailureError| e.context("List settings error occurred.").into())
    }

    fn list_public(&self) -> RepoResult<Vec<Setting>> {
        debug!("List public settings.");
        acl::check_with_rule(&*self.acl, Resource::Settings, Action::Read, self, Rule::Public, None)
            .and_then(|_| {
                settings
                    .filter(is_public.eq(true))
                    .order(key.asc())
                    .load::<Setting>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context("List public settings error occurred.").into())
    }

    fn find(&self, key_arg: String) -> RepoResult<Option<Setting>> {
        debug!("Find in settings with key {}.", key_arg);
        acl::check(&*self.acl, Resource::Settings, Action::Read, self, None)
            .and_then(|_| {
                settings
                    .filter(key.eq(&key_arg))
                    .get_result::<Setting>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in settings with key {} error occurred.", key_arg)).into())
    }

    fn upsert(&self, payload: NewSetting) -> RepoResult<Setting> {
        debug!("Upsert setting {:?}.", payload);
        acl::check(&*self.acl, Resource::Settings, Action::Update, self, None)
            .and_then(|_| {
                diesel::insert_into(settings)
                    .values(&payload)
                    .on_conflict(key)
                    .do_update()
                    .set((value.eq(&payload.value), is_public.eq(payload.is_public), updated_at.eq(now)))
                    .get_result::<Setting>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Upsert setting {:?} error occurred.", payload)).into())
    }

    fn delete(&self, key_arg: String) -> RepoResult<Setting> {
        debug!("Delete setting with key {}.", key_arg);
        acl::check(&*self.acl, Resource::Settings, Action::Delete, self, None)
            .and_then(|_| {
                diesel::delete(settings.filter(key.eq(&key_arg)))
                    .get_result::<Setting>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Delete setting with key {} error occurred.", key_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, Setting>
    for SettingsRepoImpl<'a, T>
{
    fn is_in_scope(&self, _user_id: i32, scope: &Scope, _obj: Option<&Setting>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => false,
        }
    }
}

//! Staff users repo, presents CRUD operations with db for back-office accounts
use chrono::Utc;
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::staff_user::users::dsl::*;
use models::{matches_search, NewStaffUser, StaffUser, StaffUsersSearchTerms, UpdateStaffUser};
use repos::acl;
use repos::acl::base::CheckScope;
use repos::types::{RepoAcl, RepoResult};

/// Staff users repository, responsible for handling users
pub struct StaffUsersRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<StaffUser>>,
}

pub trait StaffUsersRepo {
    /// Returns staff users ordered by name
    fn list(&self, terms: StaffUsersSearchTerms) -> RepoResult<Vec<StaffUser>>;

    /// Find specific user by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<StaffUser>>;

    /// Find specific user by email
    fn find_by_email(&self, email_arg: String) -> RepoResult<Option<StaffUser>>;

    /// Checks if the email is taken by any user except `exclude_id`
    fn email_exists(&self, email_arg: String, exclude_id: Option<i32>) -> RepoResult<bool>;

    /// Creates new user
    fn create(&self, payload: NewStaffUser) -> RepoResult<StaffUser>;

    /// Updates specific user
    fn update(&self, id_arg: i32, payload: UpdateStaffUser) -> RepoResult<StaffUser>;

    /// Stamps `last_login` of specific user with the current time
    fn touch_last_login(&self, id_arg: i32) -> RepoResult<StaffUser>;

    /// Deletes specific user
    fn delete(&self, id_arg: i32) -> RepoResult<StaffUser>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> StaffUsersRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<StaffUser>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> StaffUsersRepo for StaffUsersRepoImpl<'a, T> {
    fn list(&self, terms: StaffUsersSearchTerms) -> RepoResult<Vec<StaffUser>> {
        debug!("List staff users with terms {:?}.", terms);
        let mut query = users.order((full_name.asc(), id.asc())).into_boxed::<Pg>();
        if let Some(role_arg) = terms.role {
            query = query.filter(role.eq(role_arg));
        }
        if let Some(is_active_arg) = terms.is_active {
            query = query.filter(is_active.eq(is_active_arg));
        }

        query
            .load::<StaffUser>(self.db_conn)
            .map_err(From::from)
            .and_then(|found: Vec<StaffUser>| {
                for user in &found {
                    acl::check(&*self.acl, Resource::StaffUsers, Action::Read, self, Some(user))?;
                }
                Ok(found)
            }).map(|found| {
                found
                    .into_iter()
                    .filter(|user| matches_search(terms.search.as_ref().map(String::as_str), &[&user.email, &user.full_name]))
                    .collect()
            }).map_err(|e: FailureError| e.context(format!("List staff users with terms {:?} error occurred.", terms)).into())
    }

    fn find(&self, id_arg: i32) -> RepoResult<Option<StaffUser>> {
        debug!("Find in staff users with id {}.", id_arg);
        users
            .filter(id.eq(id_arg))
            .get_result::<StaffUser>(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|user: Option<StaffUser>| {
                if let Some(ref user) = user {
                    acl::check(&*self.acl, Resource::StaffUsers, Action::Read, self, Some(user))?;
                };
                Ok(user)
            }).map_err(|e: FailureError| e.context(format!("Find in staff users with id {} error occurred.", id_arg)).into())
    }

    fn find_by_email(&self, email_arg: String) -> RepoResult<Option<StaffUser>> {
        debug!("Find in staff users with email {}.", email_arg);
        users
            .filter(email.eq(&email_arg))
            .get_result::<StaffUser>(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|user: Option<StaffUser>| {
                if let Some(ref user) = user {
                    acl::check(&*self.acl, Resource::StaffUsers, Action::Read, self, Some(user))?;
                };
                Ok(user)
            }).map_err(|e: FailureError| {
                e.context(format!("Find in staff users with email {} error occurred.", email_arg))
                    .into()
            })
    }

    fn email_exists(&self, email_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
        debug!("Check if staff user email {} exists.", email_arg);
        acl::check(&*self.acl, Resource::StaffUsers, Action::Read, self, None)
            .and_then(|_| users.filter(email.eq(&email_arg)).select(id).load::<i32>(self.db_conn).map_err(From::from))
            .map(|ids| ids.into_iter().any(|found| Some(found) != exclude_id))
            .map_err(|e: FailureError| {
                e.context(format!("Check if staff user email {} exists error occurred.", email_arg))
                    .into()
            })
    }

    fn create(&self, payload: NewStaffUser) -> RepoResult<StaffUser> {
        debug!("Create staff user {:?}.", payload);
        acl::check(&*self.acl, Resource::StaffUsers, Action::Create, self, None)
            .and_then(|_| {
                diesel::insert_into(users)
                    .values(&payload)
                    .get_result::<StaffUser>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Create staff user {:?} error occurred.", payload)).into())
    }

    fn update(&self, id_arg: i32, payload: UpdateStaffUser) -> RepoResult<StaffUser> {
        debug!("Update staff user {} with {:?}.", id_arg, payload);
        users
            .filter(id.eq(id_arg))
            .get_result::<StaffUser>(self.db_conn)
            .map_err(From::from)
            .and_then(|user: StaffUser| acl::check(&*self.acl, Resource::StaffUsers, Action::Update, self, Some(&user)))
            .and_then(|_| {
                diesel::update(users.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<StaffUser>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Update staff user {} with {:?} error occurred.", id_arg, payload))
                    .into()
            })
    }

    fn touch_last_login(&self, id_arg: i32) -> RepoResult<StaffUser> {
        debug!("Set last login of staff user {}.", id_arg);
        users
            .filter(id.eq(id_arg))
            .get_result::<StaffUser>(self.db_conn)
            .map_err(From::from)
            .and_then(|user: StaffUser| acl::check(&*self.acl, Resource::StaffUsers, Action::Update, self, Some(&user)))
            .and_then(|_| {
                diesel::update(users.filter(id.eq(id_arg)))
                    .set(last_login.eq(Utc::now().naive_utc()))
                    .get_result::<StaffUser>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Set last login of staff user {} error occurred.", id_arg))
                    .into()
            })
    }

    fn delete(&self, id_arg: i32) -> RepoResult<StaffUser> {
        debug!("Delete staff user with id {}.", id_arg);
        users
            .filter(id.eq(id_arg))
            .get_result::<StaffUser>(self.db_conn)
            .map_err(From::from)
            .and_then(|user: StaffUser| acl::check(&*self.acl, Resource::StaffUsers, Action::Delete, self, Some(&user)))
            .and_then(|_| {
                diesel::delete(users.filter(id.eq(id_arg)))
                    .get_result::<StaffUser>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Delete staff user with id {} error occurred.", id_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, StaffUser>
    for StaffUsersRepoImpl<'a, T>
{
    fn is_in_scope(&self, user_id: i32, scope: &Scope, obj: Option<&StaffUser>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => {
                if let Some(user) = obj {
                    user.id == user_id
                } else {
                    false
                }
            }
        }
    }
}

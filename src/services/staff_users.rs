//! Staff accounts of the back-office
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::ReposFactory;
use services::{conflict_error, not_found_error, validate_payload, Service};

pub trait StaffUsersService {
    /// Lists staff accounts
    fn list_staff_users(&self, terms: StaffUsersSearchTerms) -> ServiceFuture<Vec<StaffUser>>;
    /// Returns staff account by id
    fn get_staff_user(&self, staff_user_id: i32) -> ServiceFuture<StaffUser>;
    /// Creates a staff account, emails are stored lowercased
    fn create_staff_user(&self, payload: NewStaffUser) -> ServiceFuture<StaffUser>;
    fn replace_staff_user(&self, staff_user_id: i32, payload: ReplaceStaffUser) -> ServiceFuture<StaffUser>;
    fn update_staff_user(&self, staff_user_id: i32, payload: UpdateStaffUser) -> ServiceFuture<StaffUser>;
    /// Deletes a staff account other than the caller's own
    fn delete_staff_user(&self, staff_user_id: i32) -> ServiceFuture<StaffUser>;
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > StaffUsersService for Service<T, M, F>
{
    fn list_staff_users(&self, terms: StaffUsersSearchTerms) -> ServiceFuture<Vec<StaffUser>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_staff_users_repo(&*conn, user_id);
            users_repo
                .list(terms)
                .map_err(|e| e.context("Service StaffUsers, list_staff_users endpoint error occurred.").into())
        })
    }

    fn get_staff_user(&self, staff_user_id: i32) -> ServiceFuture<StaffUser> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_staff_users_repo(&*conn, user_id);
            users_repo
                .find(staff_user_id)
                .and_then(|user| user.ok_or_else(|| not_found_error("Staff user", staff_user_id)))
                .map_err(|e| e.context("Service StaffUsers, get_staff_user endpoint error occurred.").into())
        })
    }

    fn create_staff_user(&self, payload: NewStaffUser) -> ServiceFuture<StaffUser> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();
        let payload = NewStaffUser {
            email: normalize_email(&payload.email),
            ..payload
        };

        self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_staff_users_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| users_repo.email_exists(payload.email.clone(), None))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Email is already used by another staff user"))
                    } else {
                        users_repo.create(payload)
                    }
                }).map_err(|e: FailureError| e.context("Service StaffUsers, create_staff_user endpoint error occurred.").into())
        })
    }

    fn replace_staff_user(&self, staff_user_id: i32, payload: ReplaceStaffUser) -> ServiceFuture<StaffUser> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();
        let payload = ReplaceStaffUser {
            email: normalize_email(&payload.email),
            ..payload
        };

        self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_staff_users_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| users_repo.find(staff_user_id))
                .and_then(|user| user.ok_or_else(|| not_found_error("Staff user", staff_user_id)))
                .and_then(|_| {
                    if user_id == Some(staff_user_id) && !payload.is_active {
                        return Err(conflict_error("You can not deactivate your own account"));
                    }
                    if users_repo.email_exists(payload.email.clone(), Some(staff_user_id))? {
                        return Err(conflict_error("Email is already used by another staff user"));
                    }
                    users_repo.update(staff_user_id, payload.into())
                }).map_err(|e: FailureError| e.context("Service StaffUsers, replace_staff_user endpoint error occurred.").into())
        })
    }

    fn update_staff_user(&self, staff_user_id: i32, payload: UpdateStaffUser) -> ServiceFuture<StaffUser> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();
        let payload = UpdateStaffUser {
            email: payload.email.as_ref().map(|email| normalize_email(email)),
            ..payload
        };

        self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_staff_users_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| users_repo.find(staff_user_id))
                .and_then(|user| user.ok_or_else(|| not_found_error("Staff user", staff_user_id)))
                .and_then(|user| {
                    if payload.is_empty() {
                        return Ok(user);
                    }
                    if user_id == Some(staff_user_id) && payload.is_active == Some(false) {
                        return Err(conflict_error("You can not deactivate your own account"));
                    }
                    if let Some(ref email) = payload.email {
                        if users_repo.email_exists(email.clone(), Some(staff_user_id))? {
                            return Err(conflict_error("Email is already used by another staff user"));
                        }
                    }
                    users_repo.update(staff_user_id, payload)
                }).map_err(|e: FailureError| e.context("Service StaffUsers, update_staff_user endpoint error occurred.").into())
        })
    }

    fn delete_staff_user(&self, staff_user_id: i32) -> ServiceFuture<StaffUser> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_staff_users_repo(&*conn, user_id);
            users_repo
                .find(staff_user_id)
                .and_then(|user| user.ok_or_else(|| not_found_error("Staff user", staff_user_id)))
                .and_then(|_| {
                    if user_id == Some(staff_user_id) {
                        Err(conflict_error("You can not delete your own account"))
                    } else {
                        users_repo.delete(staff_user_id)
                    }
                }).map_err(|e: FailureError| e.context("Service StaffUsers, delete_staff_user endpoint error occurred.").into())
        })
    }
}

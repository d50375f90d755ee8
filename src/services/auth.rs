//! Session handling for the back-office. Tokens are issued by the identity provider,
//! here they are only verified and mapped onto a staff account.
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use futures::future;
use futures::Future;
use jsonwebtoken::{decode, Validation};
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use errors::Error;
use models::*;
use repos::ReposFactory;
use services::Service;

pub trait AuthService {
    /// Resolves an active staff user from a bearer token
    fn authenticate(&self, token: Option<String>) -> ServiceFuture<StaffUser>;
    /// Returns the current staff user and records the login
    fn start_session(&self) -> ServiceFuture<StaffUser>;
}

/// Verifies signature and expiration of a session token
pub fn decode_claims(token: &str, secret: &str) -> Result<JWTClaims, FailureError> {
    decode::<JWTClaims>(token, secret.as_bytes(), &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| format_err!("Session token rejected: {}", e).context(Error::Unauthorized).into())
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > AuthService for Service<T, M, F>
{
    fn authenticate(&self, token: Option<String>) -> ServiceFuture<StaffUser> {
        let repo_factory = self.static_context.repo_factory.clone();
        let claims = match token {
            Some(token) => decode_claims(&token, &self.static_context.config.auth.jwt_secret),
            None => Err(format_err!("Bearer token is missing").context(Error::Unauthorized).into()),
        };
        let claims = match claims {
            Ok(claims) => claims,
            Err(e) => return Box::new(future::err(e)),
        };

        Box::new(self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_staff_users_repo_with_sys_acl(&*conn);
            let email = claims.email.trim().to_lowercase();
            users_repo.find_by_email(email.clone()).and_then(|user| match user {
                Some(ref user) if user.is_active => Ok(user.clone()),
                Some(_) => Err(format_err!("Staff user {} is deactivated", email).context(Error::Forbidden).into()),
                None => Err(format_err!("No staff user with email {}", email).context(Error::Forbidden).into()),
            })
        }).map_err(|e| e.context("Service Auth, authenticate endpoint error occurred.").into()))
    }

    fn start_session(&self) -> ServiceFuture<StaffUser> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        let user_id = match user_id {
            Some(user_id) => user_id,
            None => {
                return Box::new(future::err(
                    format_err!("Session requested without authenticated user")
                        .context(Error::Unauthorized)
                        .into(),
                ))
            }
        };

        self.spawn_on_pool(move |conn| {
            let users_repo = repo_factory.create_staff_users_repo_with_sys_acl(&*conn);
            users_repo
                .touch_last_login(user_id)
                .map_err(|e| e.context("Service Auth, start_session endpoint error occurred.").into())
        })
    }
}

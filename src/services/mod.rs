//! Services is a core layer for the app business logic like
//! validation, authorization, etc.

pub mod auth;
pub mod bookings;
pub mod brands;
pub mod calculator;
pub mod categories;
pub mod contact_messages;
pub mod content_blocks;
pub mod device_models;
pub mod repair_services;
pub mod settings;
pub mod site;
pub mod staff_users;
pub mod types;

pub use self::auth::*;
pub use self::bookings::*;
pub use self::brands::*;
pub use self::calculator::*;
pub use self::categories::*;
pub use self::contact_messages::*;
pub use self::content_blocks::*;
pub use self::device_models::*;
pub use self::repair_services::*;
pub use self::settings::*;
pub use self::site::*;
pub use self::staff_users::*;
pub use self::types::*;

use std::fmt::Display;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::{Error as FailureError, Fail};
use futures_cpupool::CpuPool;
use r2d2::{ManageConnection, PooledConnection};
use validator::{Validate, ValidationErrors};

use controller::context::{DynamicContext, StaticContext};
use errors::Error;
use repos::repo_factory::ReposFactory;

/// Service
pub struct Service<
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
> {
    pub static_context: StaticContext<T, M, F>,
    pub dynamic_context: DynamicContext,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Service<T, M, F>
{
    /// Create a new service
    pub fn new(static_context: StaticContext<T, M, F>, dynamic_context: DynamicContext) -> Self {
        Self {
            static_context,
            dynamic_context,
        }
    }

    /// Runs `f` on the cpu pool with a connection checked out of the db pool
    pub fn spawn_on_pool<R, Func>(&self, f: Func) -> ServiceFuture<R>
    where
        Func: FnOnce(PooledConnection<M>) -> Result<R, FailureError> + Send + 'static,
        R: Send + 'static,
    {
        let db_pool = self.static_context.db_pool.clone();
        let cpu_pool: CpuPool = self.static_context.cpu_pool.clone();
        Box::new(cpu_pool.spawn_fn(move || db_pool.get().map_err(|e| e.context(Error::Connection).into()).and_then(f)))
    }
}

/// Error for a record that does not exist
pub fn not_found_error<I: Display>(what: &str, id: I) -> FailureError {
    format_err!("{} {} not found", what, id).context(Error::NotFound).into()
}

pub fn validation_error(errors: ValidationErrors) -> FailureError {
    Error::Validate(errors).into()
}

/// Runs the derived field rules of a payload
pub fn validate_payload<V: Validate>(payload: &V) -> Result<(), FailureError> {
    payload.validate().map_err(validation_error)
}

pub fn conflict_error(message: &str) -> FailureError {
    format_err!("{}", message).context(Error::Conflict(message.to_string())).into()
}

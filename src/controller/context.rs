//! Static context for all app and dynamic context for each request
use std::sync::Arc;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use futures_cpupool::CpuPool;
use r2d2::{ManageConnection, Pool};

use super::routes::*;
use config::Config;
use http::router::RouteParser;
use repos::repo_factory::*;

/// Static context for all app
pub struct StaticContext<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub db_pool: Pool<M>,
    pub cpu_pool: CpuPool,
    pub config: Arc<Config>,
    pub route_parser: Arc<RouteParser<Route>>,
    pub repo_factory: F,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > StaticContext<T, M, F>
{
    /// Create a new static context
    pub fn new(db_pool: Pool<M>, cpu_pool: CpuPool, config: Arc<Config>, repo_factory: F) -> Self {
        let route_parser = Arc::new(create_route_parser());
        Self {
            route_parser,
            db_pool,
            cpu_pool,
            config,
            repo_factory,
        }
    }
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Clone for StaticContext<T, M, F>
{
    fn clone(&self) -> Self {
        Self {
            route_parser: self.route_parser.clone(),
            db_pool: self.db_pool.clone(),
            cpu_pool: self.cpu_pool.clone(),
            config: self.config.clone(),
            repo_factory: self.repo_factory.clone(),
        }
    }
}

/// Dynamic context for each request. `user_id` is set once the admin guard has let the request through.
#[derive(Clone, Debug, Default)]
pub struct DynamicContext {
    pub user_id: Option<i32>,
}

impl DynamicContext {
    /// Create a new dynamic context for each request
    pub fn new(user_id: Option<i32>) -> Self {
        Self { user_id }
    }
}

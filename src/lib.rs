//! Repairs is a microservice behind the repair shop website and its admin back-office.
//! The layered structure of the app is
//!
//! `Application -> Controller -> Service -> Repo`
//!
//! Repos talk to Postgres through diesel and enforce the role ACL. Services
//! validate payloads and check them against the catalogue.
//! Errors carry an `errors::Error` kind in their context chain. An error
//! without one is answered with 500 "Internal server error".

#![allow(proc_macro_derive_resolution_fallback)]
#![recursion_limit = "128"]
extern crate chrono;
extern crate config as config_crate;
#[macro_use]
extern crate diesel;
#[macro_use]
extern crate failure;
extern crate futures;
extern crate futures_cpupool;
extern crate hyper;
extern crate jsonwebtoken;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate r2d2;
extern crate regex;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;
extern crate tokio_core;
extern crate tokio_signal;
extern crate treexml;
extern crate url;
extern crate validator;
#[macro_use]
extern crate validator_derive;

#[macro_use]
pub mod macros;
pub mod config;
pub mod controller;
pub mod errors;
pub mod http;
pub mod models;
pub mod repos;
pub mod services;

use std::process;
use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use futures::{future, Future, Stream};
use futures_cpupool::CpuPool;
use hyper::server::Http;
use tokio_core::reactor::Core;

use config::Config;
use controller::context::StaticContext;
use errors::Error;
use http::Application;
use repos::repo_factory::ReposFactoryImpl;

/// Starts the repair shop API: public catalogue, price wizard and bookings
/// for the website plus the admin back-office routes.
///
/// Repos run on the CPU pool over pooled Postgres connections, `callback`
/// fires once the listener is bound. Blocks until Ctrl+C.
pub fn start_server<F: FnOnce() + 'static>(config: Config, port: &Option<String>, callback: F) {
    // Reactor for hyper and the shutdown signal
    let mut core = Core::new().expect("Unexpected error creating event loop core");
    let handle = Arc::new(core.handle());

    // Postgres pool shared by all repos
    let database_url: String = config.server.database.parse().expect("Database URL must be set in configuration");
    let db_manager = ConnectionManager::<PgConnection>::new(database_url);
    let db_pool = r2d2::Pool::builder()
        .build(db_manager)
        .expect("Failed to create DB connection pool");

    let thread_count = config.server.thread_count;

    // Blocking diesel queries run here, off the reactor
    let cpu_pool = CpuPool::new(thread_count);

    // CLI port wins over the configured one
    let address = {
        let port = port.as_ref().unwrap_or(&config.server.port);
        format!("{}:{}", config.server.host, port).parse().expect("Could not parse address")
    };

    let context = StaticContext::new(db_pool, cpu_pool, Arc::new(config), ReposFactoryImpl::default());

    let serve = Http::new()
        .serve_addr_handle(&address, &handle, move || {
            // One controller per connection, all sharing the static context
            let controller = controller::ControllerImpl::new(context.clone());
            let app = Application::<Error>::new(controller);

            Ok(app)
        }).unwrap_or_else(|why| {
            error!("Http Server Initialization Error: {}", why);
            process::exit(1);
        });

    let handle_arc2 = handle.clone();
    handle.spawn(
        serve
            .for_each(move |conn| {
                handle_arc2.spawn(conn.map(|_| ()).map_err(|why| error!("Server Error: {}", why)));
                Ok(())
            }).map_err(|_| ()),
    );

    info!("Listening on http://{}, threads: {}", address, thread_count);
    handle.spawn_fn(move || {
        callback();
        future::ok(())
    });

    core.run(tokio_signal::ctrl_c().flatten_stream().take(1u64).for_each(|()| {
        info!("Ctrl+C received. Exit");

        Ok(())
    })).unwrap();
}

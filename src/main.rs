//! Repairs is a microservice behind the repair shop website and its admin back-office.
//! This crate is for running the service from `repairs_lib`. See `repairs_lib` for details.

extern crate env_logger;
extern crate repairs_lib;

fn main() {
    let config = repairs_lib::config::Config::new().expect("Can't load app config!");

    // Prepare logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    repairs_lib::start_server(config, &None, || ());
}

//! Http plumbing shared by the controllers: the hyper `Service` wrapper around
//! a controller, the regex route table, request helpers and the JSON envelope.

pub mod controller;
pub mod errors;
pub mod request_util;
pub mod response;
pub mod router;

pub use self::controller::{Application, Controller, ControllerFuture};

//! `Application` adapts a `Controller` to hyper's `Service`: successful controller
//! futures become responses as is, failures are rendered into the error envelope.
use std::marker::PhantomData;

use failure::{Error as FailureError, Fail};
use futures::future::Future;
use hyper;
use hyper::server::{Request, Response, Service};

use super::errors::{chain_to_string, describe, Codeable, PayloadCarrier};
use super::response::error_response;

pub type ControllerFuture = Box<Future<Item = Response, Error = FailureError>>;

/// Controller handles route parsing and calling `Service` layer
pub trait Controller {
    fn call(&self, request: Request) -> ControllerFuture;
}

pub struct Application<E> {
    controller: Box<Controller>,
    phantom: PhantomData<E>,
}

impl<E> Application<E>
where
    E: Fail + Codeable + PayloadCarrier,
{
    pub fn new<C: Controller + 'static>(controller: C) -> Self {
        Self {
            controller: Box::new(controller),
            phantom: PhantomData,
        }
    }
}

impl<E> Service for Application<E>
where
    E: Fail + Codeable + PayloadCarrier,
{
    type Request = Request;
    type Response = Response;
    type Error = hyper::Error;
    type Future = Box<Future<Item = Response, Error = hyper::Error>>;

    fn call(&self, req: Request) -> Self::Future {
        let method = req.method().clone();
        let path = req.path().to_string();
        debug!("Received request: {} {}", method, path);

        Box::new(self.controller.call(req).or_else(move |err| {
            let (code, message) = describe::<E>(&err);
            if code.is_server_error() {
                error!("{} {} failed with {}: {}", method, path, code, chain_to_string(&err));
            } else {
                debug!("{} {} failed with {}: {}", method, path, code, chain_to_string(&err));
            }
            Ok(error_response(code, message))
        }))
    }
}

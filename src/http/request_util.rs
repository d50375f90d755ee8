//! Helpers for reading request bodies and query strings
use std::collections::HashMap;

use futures::future::Future;
use futures::Stream;
use hyper;
use hyper::header::{Authorization, Bearer, Headers};
use url::form_urlencoded;

/// Reads the whole body into a string
pub fn read_body(body: hyper::Body) -> Box<Future<Item = String, Error = hyper::Error>> {
    Box::new(body.concat2().map(|chunk| String::from_utf8_lossy(&chunk).into_owned()))
}

/// Bearer token from the `Authorization` header, if any
pub fn bearer_token(headers: &Headers) -> Option<String> {
    headers.get::<Authorization<Bearer>>().map(|auth| auth.0.token.clone())
}

/// Splits a query string into decoded key/value pairs. Later duplicates win.
pub fn query_params(query: &str) -> HashMap<String, String> {
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

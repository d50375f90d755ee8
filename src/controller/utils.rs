//! Request body and query string parsing for the controller
use std::collections::HashMap;
use std::fmt::Debug;
use std::str::FromStr;

use failure::{Error as FailureError, Fail};
use futures::future::Future;
use hyper;
use serde::de::DeserializeOwned;
use serde_json;

use errors::Error;
use http::request_util::{query_params, read_body};
use models::*;

/// Reads and deserializes a JSON body, any failure is a parse error
pub fn parse_body<T>(body: hyper::Body) -> Box<Future<Item = T, Error = FailureError>>
where
    T: DeserializeOwned + 'static,
{
    Box::new(
        read_body(body)
            .map_err(|e| FailureError::from(e.context("Failed to read request body").context(Error::Parse)))
            .and_then(|body| {
                serde_json::from_str::<T>(&body)
                    .map_err(|e| FailureError::from(e.context("Failed to parse request body").context(Error::Parse)))
            }),
    )
}

/// Query string of a request with typed accessors
#[derive(Debug, Default)]
pub struct Query {
    params: HashMap<String, String>,
}

impl Query {
    pub fn new(query: Option<&str>) -> Self {
        Self {
            params: query.map(query_params).unwrap_or_default(),
        }
    }

    /// Trimmed value, blank counts as absent
    pub fn text(&self, key: &str) -> Option<String> {
        self.params
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
    }

    pub fn parse<T>(&self, key: &str) -> Result<Option<T>, FailureError>
    where
        T: FromStr,
        T::Err: Debug,
    {
        match self.text(key) {
            Some(value) => value.parse::<T>().map(Some).map_err(|e| {
                format_err!("Query parameter {} has invalid value {}: {:?}", key, value, e)
                    .context(Error::Parse)
                    .into()
            }),
            None => Ok(None),
        }
    }

    fn code<T, P>(&self, key: &str, parse: P) -> Result<Option<T>, FailureError>
    where
        P: Fn(&str) -> Option<T>,
    {
        match self.text(key) {
            Some(value) => parse(&value)
                .map(Some)
                .ok_or_else(|| format_err!("Query parameter {} has unknown value {}", key, value).context(Error::Parse).into()),
            None => Ok(None),
        }
    }
}

pub fn categories_terms(query: &Query) -> Result<CategoriesSearchTerms, FailureError> {
    Ok(CategoriesSearchTerms {
        search: query.text("search"),
        is_active: query.parse("is_active")?,
    })
}

pub fn repair_services_terms(query: &Query) -> Result<RepairServicesSearchTerms, FailureError> {
    Ok(RepairServicesSearchTerms {
        category_id: query.parse("category_id")?,
        search: query.text("search"),
        is_active: query.parse("is_active")?,
    })
}

pub fn brands_terms(query: &Query) -> Result<BrandsSearchTerms, FailureError> {
    Ok(BrandsSearchTerms {
        category_id: query.parse("category_id")?,
        search: query.text("search"),
        is_active: query.parse("is_active")?,
    })
}

pub fn device_models_terms(query: &Query) -> Result<DeviceModelsSearchTerms, FailureError> {
    Ok(DeviceModelsSearchTerms {
        brand_id: query.parse("brand_id")?,
        search: query.text("search"),
        is_active: query.parse("is_active")?,
    })
}

pub fn staff_users_terms(query: &Query) -> Result<StaffUsersSearchTerms, FailureError> {
    Ok(StaffUsersSearchTerms {
        search: query.text("search"),
        role: query.code("role", Role::from_code)?,
        is_active: query.parse("is_active")?,
    })
}

pub fn bookings_terms(query: &Query) -> Result<BookingsSearchTerms, FailureError> {
    Ok(BookingsSearchTerms {
        status: query.code("status", BookingStatus::from_code)?,
        search: query.text("search"),
    })
}

pub fn content_blocks_terms(query: &Query) -> Result<ContentBlocksSearchTerms, FailureError> {
    Ok(ContentBlocksSearchTerms {
        page: query.text("page"),
        search: query.text("search"),
        is_active: query.parse("is_active")?,
    })
}

pub fn contact_messages_terms(query: &Query) -> Result<ContactMessagesSearchTerms, FailureError> {
    Ok(ContactMessagesSearchTerms {
        search: query.text("search"),
        is_read: query.parse("is_read")?,
    })
}

//! Exa Websets API access.

mod client;
pub mod endpoints;
mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiRequest, WebsetsApi, WebsetsClient, API_KEY_HEADER};
pub use endpoints::{Endpoint, HttpMethod, PathError};
pub use error::ApiError;

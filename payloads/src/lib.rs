//! Wire types and an HTTP client for the remote product source.

pub mod api_client;
pub mod responses;

pub use api_client::{APIClient, ClientError, REQUEST_SEQUENCE_HEADER};
pub use responses::{Item, ProductPage};

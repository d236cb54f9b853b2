use crate::ProductPage;
use reqwest::StatusCode;

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// Header carrying a caller-assigned sequence number so the source can tell
/// overlapping requests apart.
pub const REQUEST_SEQUENCE_HEADER: &str = "x-request-sequence";

/// An API client for a remote product source.
#[derive(Clone)]
pub struct APIClient {
    /// Base address of the source, e.g. `https://dummyjson.com`.
    pub address: String,
    pub inner_client: reqwest::Client,
}

/// Helper methods for http actions
impl APIClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into().trim_end_matches('/').to_string(),
            inner_client: reqwest::Client::new(),
        }
    }

    fn format_url(&self, path: &str) -> String {
        format!("{}/{path}", &self.address)
    }
}

/// Methods on the product source
impl APIClient {
    /// Issue the collection request without interpreting the response.
    ///
    /// Status and body validation is left to the caller.
    pub async fn fetch_products(&self, sequence: Option<u64>) -> ReqwestResult {
        let mut request = self.inner_client.get(self.products_url());
        if let Some(sequence) = sequence {
            request = request.header(REQUEST_SEQUENCE_HEADER, sequence);
        }
        request.send().await
    }

    /// Fetch and decode the product collection.
    pub async fn get_products(&self) -> Result<ProductPage, ClientError> {
        let response = self.fetch_products(None).await?;
        ok_body(response).await
    }

    /// URL of the collection endpoint, for display.
    pub fn products_url(&self) -> String {
        self.format_url("products")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An unhandled API error to display, containing response text.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::APIError(
            response.status(),
            response.text().await?,
        ));
    }
    Ok(response.json::<T>().await?)
}

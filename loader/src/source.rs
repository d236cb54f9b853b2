//! The seam between the loader and whatever serves the collection.

use payloads::APIClient;
use reqwest::StatusCode;
use std::future::Future;

use crate::error::TransportError;
use crate::state::RequestId;

/// A response as received, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

/// Something that can be asked for the collection.
///
/// `request` identifies the dispatch; sources may forward it but must not
/// rely on it for correctness.
pub trait DataSource: Send + Sync + 'static {
    fn fetch(
        &self,
        request: RequestId,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

impl DataSource for APIClient {
    async fn fetch(
        &self,
        request: RequestId,
    ) -> Result<RawResponse, TransportError> {
        let response = self.fetch_products(Some(request.0)).await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

//! Source origin downloading the schedule CSV from an HTTP(S) endpoint.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use tracing::debug;

use bincal_core::ports::SourceError;
use bincal_core::source::{SourceBatch, SourceOrigin};

/// Schedule published at a fixed URL, typically an object in a bucket.
///
/// A `404 Not Found` means nothing has been published yet and yields an
/// empty batch. Remote objects are never deleted after ingestion.
#[derive(Debug, Clone)]
pub struct HttpCsvOrigin {
    client: Client,
    url: String,
}

impl HttpCsvOrigin {
    /// Create an origin bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SourceOrigin for HttpCsvOrigin {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<SourceBatch, SourceError> {
        let resp = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/csv")
            .send()
            .await
            .map_err(fetch_error)?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!(url = %self.url, "no schedule published");
            return Ok(SourceBatch::default());
        }

        let body = resp
            .error_for_status()
            .map_err(fetch_error)?
            .bytes()
            .await
            .map_err(fetch_error)?;
        SourceBatch::from_csv(body.as_ref())
    }
}

fn fetch_error(err: ReqwestError) -> SourceError {
    SourceError::Fetch(Box::new(err))
}

// src/fetch/mod.rs

use bytes::Bytes;
use reqwest::{header::COOKIE, Client};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// Posts the fixed form body to the market page and hands back the raw HTML.
///
/// One request per call: no retries, no caching between calls.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    url: Url,
    body: String,
    cookie: String,
}

impl Fetcher {
    pub fn new(cfg: &Config) -> Self {
        Self::with_client(Client::new(), cfg)
    }

    pub fn with_client(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            url: cfg.source_url.clone(),
            body: cfg.source_body.clone(),
            cookie: cfg.source_cookie.clone(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Transport errors become [`Error::FetchFailed`]. A non-success status is
    /// only logged; whatever body came with it is still returned.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Bytes> {
        // Content-Length is left to the transport so it matches the body.
        let resp = self
            .client
            .post(self.url.clone())
            .header(COOKIE, &self.cookie)
            .body(self.body.clone())
            .send()
            .await
            .map_err(|source| self.failed(source))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "remote page answered with non-success status");
        }

        // `bytes()` consumes the response; on error it is dropped, which
        // releases the connection either way.
        let page = resp.bytes().await.map_err(|source| self.failed(source))?;
        debug!(%status, bytes = page.len(), "fetched page");
        Ok(page)
    }

    fn failed(&self, source: reqwest::Error) -> Error {
        Error::FetchFailed {
            url: self.url.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_addr, config_for, init_test_logging, serve_page};
    use warp::http::StatusCode;

    const PAGE: &str = "<table><tr><td>ACME</td><td>buy</td></tr></table>";

    #[tokio::test]
    async fn test_fetch_sends_fixed_request() {
        init_test_logging();
        let addr = serve_page(StatusCode::OK, PAGE).await;
        let fetcher = Fetcher::new(&config_for(addr));

        let page = fetcher.fetch().await.unwrap();
        assert_eq!(page.as_ref(), PAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_non_success_status_still_returns_body() {
        let addr = serve_page(StatusCode::INTERNAL_SERVER_ERROR, PAGE).await;
        let fetcher = Fetcher::new(&config_for(addr));

        let page = fetcher.fetch().await.unwrap();
        assert_eq!(page.as_ref(), PAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_failed() {
        let addr = closed_addr().await;
        let fetcher = Fetcher::new(&config_for(addr));

        match fetcher.fetch().await {
            Err(Error::FetchFailed { url, .. }) => assert!(url.contains(&addr.to_string())),
            other => panic!("expected FetchFailed, got {:?}", other),
        }
    }
}

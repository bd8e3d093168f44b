//! Network port for probes.
//!
//! # Responsibilities
//! - Issue one GET to the probe target and report the raw status code
//! - Keep caches and redirects out of the answer
//!
//! # Design Decisions
//! - Deadlines are NOT enforced here; the prober owns them and drops the
//!   future on expiry, which aborts the underlying request
//! - A status code is a successful fetch; judging it is the prober's job

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::redirect::Policy;
use reqwest::Client;
use url::Url;

use crate::probe::error::ProbeError;

/// Issues a single uncached GET and returns the response status.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn fetch_status(&self, url: &Url) -> Result<u16, ProbeError>;
}

/// [`HttpProbe`] backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    /// Build a client that never follows redirects and asks every cache on
    /// the path to revalidate.
    pub fn new() -> Result<Self, ProbeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .default_headers(headers)
            .redirect(Policy::none())
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(concat!("reachability/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing client. Caller is responsible for its cache and
    /// redirect settings.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn fetch_status(&self, url: &Url) -> Result<u16, ProbeError> {
        let response = self.client.get(url.clone()).send().await?;
        Ok(response.status().as_u16())
    }
}

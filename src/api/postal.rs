use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::api::http_client::parse_base_url;
use crate::api::{PostalLookup, PostalLookupOutcome, PostalLookupResponse};
use crate::app::{Result, SosError};

/// ViaCEP-style lookup: `GET {base}/{digits}/json/`.
pub struct ViaCepLookup {
    client: Client,
    base_url: Url,
}

impl ViaCepLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sos-feed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn lookup_url(&self, digits: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("{digits}/json/"))?)
    }
}

#[async_trait]
impl PostalLookup for ViaCepLookup {
    async fn lookup(&self, digits: &str) -> Result<PostalLookupOutcome> {
        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SosError::Other(format!("Invalid postal code: {digits}")));
        }

        let url = self.lookup_url(digits)?;
        tracing::debug!("Looking up postal code {}", digits);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SosError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: PostalLookupResponse = serde_json::from_slice(&body)?;
        Ok(parsed.into())
    }
}

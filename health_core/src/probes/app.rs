use crate::error::{CheckError, ConfigError};
use crate::health::{Probe, ProbeResult};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

/// Fetches a liveness URL and expects `200 OK`.
pub struct HttpLivenessProbe {
    client: Client,
    url: Url,
}

impl HttpLivenessProbe {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let url = Url::parse(url).map_err(|e| ConfigError::Invalid {
            key: "APP_LIVENESS_URL",
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "APP_LIVENESS_URL",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "APP_LIVENESS_URL",
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait::async_trait]
impl Probe for HttpLivenessProbe {
    async fn check(&self) -> ProbeResult {
        let response = self.client.get(self.url.clone()).send().await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(CheckError::protocol(format!("HTTP {}", status.as_u16()))),
        }
    }
}

use reqwest::Url;
use tracing::debug;

use crate::credentials::AwsCredentials;
use crate::error::{AwsError, Result};
use crate::sigv4::SigV4Signer;

/// HTTP client that SigV4-signs every request for one service.
#[derive(Debug, Clone)]
pub struct AwsClient {
    http: reqwest::Client,
    signer: SigV4Signer,
}

impl AwsClient {
    pub fn new(credentials: AwsCredentials, region: &str, service: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            signer: SigV4Signer::new(credentials, region, service),
        }
    }

    /// Resolve credentials from the standard chain and build a client.
    pub fn from_env(region: &str, service: &str, profile: Option<&str>) -> Result<Self> {
        Ok(Self::new(AwsCredentials::resolve(profile)?, region, service))
    }

    pub fn region(&self) -> &str {
        self.signer.region()
    }

    /// Sign and send a POST. `headers` are sent and signed as given.
    pub async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<reqwest::Response> {
        let parsed = Url::parse(url).map_err(|e| AwsError::Url(format!("{url}: {e}")))?;
        let auth = self
            .signer
            .sign("POST", &parsed, headers, &body, chrono::Utc::now());

        let mut builder = self.http.post(parsed);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        for (k, v) in &auth {
            builder = builder.header(k.as_str(), v.as_str());
        }

        debug!(url, bytes = body.len(), "sending signed AWS request");
        Ok(builder.body(body).send().await?)
    }
}

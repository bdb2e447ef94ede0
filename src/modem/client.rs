use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::Client as HttpClient;

use crate::config::ModemConfig;
use crate::error::ModemError;

/// Hard limit for one management page request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns `Basic <base64(username:password)>`.
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// HTTP session for one modem's management pages.
pub struct Client {
    http_client: HttpClient,
    base_url: String,
    auth_header: String,
    timeout: Duration,
}

impl Client {
    pub fn new(config: &ModemConfig) -> Result<Self, ModemError> {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(config: &ModemConfig, timeout: Duration) -> Result<Self, ModemError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url(),
            auth_header: basic_auth_header(&config.username, &config.password),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<String, ModemError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ModemError::server_error(status, body))
        }
    }

    fn classify(&self, err: reqwest::Error) -> ModemError {
        if err.is_timeout() {
            ModemError::Timeout(self.timeout.as_secs())
        } else {
            ModemError::Http(err)
        }
    }
}

//! Mock servers for the modem's management pages and the InfluxDB write API.

pub mod collectors;

use mockito::{Mock, Server, ServerGuard};
use wiremock::matchers::{method, path};
use wiremock::{Mock as WireMock, MockServer, ResponseTemplate};

pub use collectors::*;

/// Builder for a mockito server serving modem pages.
pub struct MockModemServerBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl MockModemServerBuilder {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
            mocks: Vec::new(),
        }
    }

    /// Serves `body` as `DocsisStatus.asp`.
    pub async fn mock_status(self, body: &str) -> Self {
        self.mock_page("/DocsisStatus.asp", body).await
    }

    /// Serves `body` as `EventLog.asp`.
    pub async fn mock_events(self, body: &str) -> Self {
        self.mock_page("/EventLog.asp", body).await
    }

    async fn mock_page(mut self, page: &str, body: &str) -> Self {
        let mock = self
            .server
            .mock("GET", page)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(body)
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    /// Adds an error response for a page.
    pub async fn mock_error(mut self, page: &str, status: u16, body: &str) -> Self {
        let mock = self
            .server
            .mock("GET", page)
            .with_status(status as usize)
            .with_body(body)
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    pub fn build(self) -> ServerGuard {
        self.server
    }
}

/// Builder for wiremock servers standing in for InfluxDB.
pub struct MockInfluxServerBuilder {
    server: MockServer,
}

impl MockInfluxServerBuilder {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub async fn mock_write_success(self) -> Self {
        WireMock::given(method("POST"))
            .and(path("/api/v2/write"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
        self
    }

    pub async fn mock_write_error(self, status: u16, message: &str) -> Self {
        WireMock::given(method("POST"))
            .and(path("/api/v2/write"))
            .respond_with(ResponseTemplate::new(status).set_body_string(message))
            .mount(&self.server)
            .await;
        self
    }

    /// Expects exactly `times` write requests; verified when the server drops.
    pub async fn mock_write_with_expectation(self, times: u64) -> Self {
        WireMock::given(method("POST"))
            .and(path("/api/v2/write"))
            .respond_with(ResponseTemplate::new(204))
            .expect(times)
            .mount(&self.server)
            .await;
        self
    }

    pub fn build(self) -> MockServer {
        self.server
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_modem_server_builder() {
        let server = MockModemServerBuilder::new()
            .await
            .mock_status("<html></html>")
            .await
            .build();

        assert!(server.url().starts_with("http://"));
        assert!(!server.host_with_port().starts_with("http://"));
    }

    #[tokio::test]
    async fn test_mock_influx_server_builder() {
        let builder = MockInfluxServerBuilder::new().await;
        assert!(builder.url().starts_with("http://"));
        let server = builder.mock_write_success().await.build();
        assert!(server.uri().starts_with("http://"));
    }
}

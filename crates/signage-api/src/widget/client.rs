//! `WidgetClient` - LibCal widget client implementation.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::api::LocalWidgetApi;
use super::types::HoursResponse;

/// Default hours grid endpoint.
pub const DEFAULT_HOURS_URL: &str = "https://calendar.library.ucla.edu/widget/hours/grid";

/// Default events list base path (the location ID is appended).
pub const DEFAULT_EVENTS_URL: &str = "https://calendar.library.ucla.edu/widget/events/";

/// Default timeout applied to every widget request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of body bytes included in decode error messages.
const BODY_PREVIEW_LEN: usize = 500;

/// LibCal widget client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct WidgetClient {
    /// HTTP client (reqwest, gzip enabled, timeout always set).
    http_client: Client,
    /// Hours grid endpoint.
    hours_url: Url,
    /// Events list base path.
    events_url: Url,
    /// Per-request timeout.
    timeout: Duration,
}

/// Builder for `WidgetClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct WidgetClientBuilder {
    hours_url: Option<Url>,
    events_url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl WidgetClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            hours_url: None,
            events_url: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Overrides the hours grid endpoint (also used for wiremock in tests).
    #[must_use]
    pub fn hours_url(mut self, url: Url) -> Self {
        self.hours_url = Some(url);
        self
    }

    /// Overrides the events list base path.
    #[must_use]
    pub fn events_url(mut self, url: Url) -> Self {
        self.events_url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the per-request timeout (default: 10s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `timeout` is zero.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<WidgetClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let hours_url = if let Some(url) = self.hours_url {
            url
        } else {
            let result = Url::parse(DEFAULT_HOURS_URL);
            result.context("invalid default hours URL")?
        };

        let events_url = if let Some(url) = self.events_url {
            url
        } else {
            let result = Url::parse(DEFAULT_EVENTS_URL);
            result.context("invalid default events URL")?
        };

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            bail!("timeout must be greater than zero");
        }

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(WidgetClient {
            http_client,
            hours_url,
            events_url,
            timeout,
        })
    }
}

impl WidgetClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> WidgetClientBuilder {
        WidgetClientBuilder::new()
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the events URL for a location by appending the ID to the base path.
    fn events_url_for(&self, location_id: u32) -> Result<Url> {
        let raw = format!("{}{location_id}", self.events_url);
        Url::parse(&raw).with_context(|| format!("invalid events URL: {raw}"))
    }

    /// Parses an hours grid JSON body.
    pub(crate) fn parse_hours_response(body: &str) -> Result<HoursResponse> {
        let raw_result: std::result::Result<HoursResponse, _> = serde_json::from_str(body);
        raw_result.with_context(|| {
            format!(
                "hours JSON decoding failed (len={}): {}",
                body.len(),
                &body[..body.floor_char_boundary(BODY_PREVIEW_LEN)]
            )
        })
    }

    /// Sends a GET request and returns the body text.
    ///
    /// A single attempt is made; transport errors, timeouts and non-success
    /// statuses are returned as errors.
    async fn get_text(&self, command: &str, request: reqwest::RequestBuilder) -> Result<String> {
        let send_result = request.send().await;
        let response = send_result.with_context(|| format!("{command} request failed"))?;

        let status = response.status();
        tracing::trace!(%command, %status, headers = ?response.headers(), "Response headers");

        if !status.is_success() {
            bail!("{command} request failed (HTTP {status})");
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read {command} response"))?;

        tracing::debug!(%command, body_len = body.len(), "Response body received");
        tracing::trace!(
            %command,
            body_preview = &body[..body.floor_char_boundary(BODY_PREVIEW_LEN)],
            "Response body preview"
        );

        Ok(body)
    }
}

impl LocalWidgetApi for WidgetClient {
    #[instrument(skip(self))]
    async fn fetch_hours(&self, location_id: u32, weeks: u32) -> Result<HoursResponse> {
        let query = [
            ("lid", location_id.to_string()),
            ("weeks", weeks.to_string()),
            ("format", String::from("json")),
        ];
        let request = self.http_client.get(self.hours_url.clone()).query(&query);

        let body = self.get_text("HoursGrid", request).await?;
        Self::parse_hours_response(&body)
    }

    #[instrument(skip(self))]
    async fn fetch_events(&self, location_id: u32) -> Result<String> {
        let url = self.events_url_for(location_id)?;
        let request = self.http_client.get(url);

        self.get_text("EventsList", request).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn build_test_client(server: &wiremock::MockServer, timeout: Duration) -> WidgetClient {
        WidgetClient::builder()
            .hours_url(format!("{}/widget/hours/grid", server.uri()).parse().unwrap())
            .events_url(format!("{}/widget/events/", server.uri()).parse().unwrap())
            .user_agent("test/0.0.0")
            .timeout(timeout)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_user_agent() {
        // Arrange & Act
        let result = WidgetClient::builder().build();

        // Assert
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("user_agent is required")
        );
    }

    #[test]
    fn test_builder_with_user_agent_uses_default_timeout() {
        // Arrange & Act
        let client = WidgetClient::builder()
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.hours_url.as_str(), DEFAULT_HOURS_URL);
        assert_eq!(client.events_url.as_str(), DEFAULT_EVENTS_URL);
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        // Arrange & Act
        let result = WidgetClient::builder()
            .user_agent("test/0.0.0")
            .timeout(Duration::ZERO)
            .build();

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("timeout must be greater than zero")
        );
    }

    #[test]
    fn test_events_url_appends_location_id() {
        // Arrange
        let client = WidgetClient::builder()
            .events_url(Url::parse("http://localhost:8080/widget/events/").unwrap())
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Act
        let url = client.events_url_for(3363).unwrap();

        // Assert
        assert_eq!(url.as_str(), "http://localhost:8080/widget/events/3363");
    }

    #[test]
    fn test_parse_hours_response_invalid_json() {
        // Arrange & Act
        let result = WidgetClient::parse_hours_response("<html>maintenance</html>");

        // Assert
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("hours JSON decoding failed"));
        assert!(message.contains("maintenance"));
    }

    #[tokio::test]
    async fn test_fetch_hours_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/libcal/hours_two_weeks.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/widget/hours/grid"))
            .and(wiremock::matchers::query_param("lid", "20525"))
            .and(wiremock::matchers::query_param("weeks", "2"))
            .and(wiremock::matchers::query_param("format", "json"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = build_test_client(&mock_server, DEFAULT_TIMEOUT);

        // Act
        let response = client.fetch_hours(20525, 2).await.unwrap();

        // Assert
        let location = response.location(20525).unwrap();
        assert_eq!(location.name, "Arts Library Reference Desk");
        assert_eq!(location.weeks.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_events_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let html_body = include_str!("../../../../fixtures/libcal/events_3363.html");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/widget/events/3363"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(html_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = build_test_client(&mock_server, DEFAULT_TIMEOUT);

        // Act
        let html = client.fetch_events(3363).await.unwrap();

        // Assert
        assert!(html.contains("Philosophy 31"));
    }

    #[tokio::test]
    async fn test_fetch_hours_server_error() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = build_test_client(&mock_server, DEFAULT_TIMEOUT);

        // Act
        let result = client.fetch_hours(1, 2).await;

        // Assert: single attempt, no retry
        let message = result.unwrap_err().to_string();
        assert!(message.contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_fetch_events_not_found() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = build_test_client(&mock_server, DEFAULT_TIMEOUT);

        // Act
        let result = client.fetch_events(1).await;

        // Assert
        assert!(result.unwrap_err().to_string().contains("HTTP 404"));
    }

    #[tokio::test]
    async fn test_fetch_hours_times_out() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = build_test_client(&mock_server, Duration::from_millis(50));

        // Act
        let result = client.fetch_hours(1, 2).await;

        // Assert
        assert!(result.unwrap_err().to_string().contains("HoursGrid request failed"));
    }

    #[tokio::test]
    async fn test_user_agent_is_sent() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::header("User-Agent", "signage/0.1.0"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WidgetClient::builder()
            .hours_url(format!("{}/widget/hours/grid", mock_server.uri()).parse().unwrap())
            .user_agent("signage/0.1.0")
            .build()
            .unwrap();

        // Act & Assert (mock expect(1) verifies User-Agent header)
        let response = client.fetch_hours(1, 2).await.unwrap();
        assert!(response.locations.is_empty());
    }
}

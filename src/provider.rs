//! HTTP transport for the provider's update endpoint.

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Query parameters of one update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateParams {
    pub hostname: String,
    pub myip: String,
}

impl UpdateParams {
    /// Parameters publishing `address` as the only address of `hostname`.
    ///
    /// The `0.0.0.0` entry clears the IPv4 record on the provider side.
    pub fn ipv6_only(hostname: &str, address: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            myip: format!("0.0.0.0,{}", address),
        }
    }
}

/// Sends an update request and returns the raw response body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    async fn call_provider(&self, params: &UpdateParams) -> Result<String>;
}

/// No-IP compatible update client.
pub struct NoIpClient {
    client: reqwest::Client,
    update_url: String,
    user: String,
    password: String,
    user_agent: String,
}

impl NoIpClient {
    /// Create a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(
            config.auth.user.clone(),
            config.auth.password.clone(),
            config.client.user_agent.clone(),
            Duration::from_secs(config.client.timeout_secs),
            config.client.update_url.clone(),
        )
    }

    /// Create a client talking to a custom endpoint.
    pub fn with_base_url(
        user: String,
        password: String,
        user_agent: String,
        timeout: Duration,
        update_url: String,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            update_url,
            user,
            password,
            user_agent,
        })
    }
}

#[async_trait]
impl UpdateTransport for NoIpClient {
    async fn call_provider(&self, params: &UpdateParams) -> Result<String> {
        let response = self
            .client
            .get(&self.update_url)
            .query(&[
                ("hostname", params.hostname.as_str()),
                ("myip", params.myip.as_str()),
            ])
            .basic_auth(&self.user, Some(&self.password))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        // Status tokens come back in the body even on non-2xx answers.
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::warn!("Update endpoint returned HTTP {}", status);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DdnsError;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NoIpClient {
        NoIpClient::with_base_url(
            "u".to_string(),
            "p".to_string(),
            "test-agent/1.0".to_string(),
            Duration::from_secs(5),
            format!("{}/nic/update", server.uri()),
        )
        .unwrap()
    }

    #[test]
    fn test_ipv6_only_params() {
        let params = UpdateParams::ipv6_only("x.ddns.example", "2001:db8::1");
        assert_eq!(params.hostname, "x.ddns.example");
        assert_eq!(params.myip, "0.0.0.0,2001:db8::1");
    }

    #[tokio::test]
    async fn test_update_request_shape() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/nic/update"))
            .and(query_param("hostname", "x.ddns.example"))
            .and(query_param("myip", "0.0.0.0,2001:db8::1"))
            // base64("u:p")
            .and(header("Authorization", "Basic dTpw"))
            .and(header("User-Agent", "test-agent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("good 2001:db8::1\r\n"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let params = UpdateParams::ipv6_only("x.ddns.example", "2001:db8::1");
        let body = client.call_provider(&params).await.unwrap();

        assert_eq!(body.trim(), "good 2001:db8::1");
    }

    #[tokio::test]
    async fn test_body_returned_on_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/nic/update"))
            .respond_with(ResponseTemplate::new(401).set_body_string("badauth"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let params = UpdateParams::ipv6_only("x.ddns.example", "2001:db8::1");
        let body = client.call_provider(&params).await.unwrap();

        assert_eq!(body, "badauth");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = NoIpClient::with_base_url(
            "u".to_string(),
            "p".to_string(),
            "test-agent/1.0".to_string(),
            Duration::from_secs(1),
            "http://127.0.0.1:1/nic/update".to_string(),
        )
        .unwrap();

        let params = UpdateParams::ipv6_only("x.ddns.example", "2001:db8::1");
        let result = client.call_provider(&params).await;

        assert!(matches!(result, Err(DdnsError::Network(_))));
    }
}

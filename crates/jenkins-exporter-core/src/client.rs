//! Jenkins JSON API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap,
    HeaderValue,
    AUTHORIZATION,
    USER_AGENT,
};
use reqwest::Client;
use serde_json::Value;

use crate::config::JenkinsConfig;
use crate::error::{
    ExporterError,
    ExporterResult,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read access to the Jenkins JSON API.
///
/// The flattener and run aggregator only talk to Jenkins through this trait.
#[async_trait]
pub trait JenkinsApi: Send + Sync {
    /// GETs `url` with `query` and decodes the body as JSON. Non-2xx
    /// responses fail with `ExporterError::Upstream`; nothing is retried.
    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> ExporterResult<Value>;
}

/// `{object_url}/api/json`, tolerant of a trailing slash on the object URL.
pub fn api_url(object_url: &str) -> String {
    format!("{}/api/json", object_url.trim_end_matches('/'))
}

pub struct JenkinsClient {
    client: Client,
    server_url: String,
}

impl JenkinsClient {
    pub fn new(config: &JenkinsConfig) -> ExporterResult<Self> {
        install_crypto_provider();

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("jenkins-exporter/", env!("CARGO_PKG_VERSION"))),
        );

        if let Some((user, password)) = config.credentials() {
            let auth_value = format!("{user}:{password}");
            let auth_header = format!(
                "Basic {}",
                base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    auth_value.as_bytes()
                )
            );
            let mut value = HeaderValue::from_str(&auth_header)
                .map_err(|e| ExporterError::InvalidConfig(format!("Invalid auth format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.timeout())
            .connect_timeout(CONNECT_TIMEOUT.min(config.timeout()))
            .build()
            .map_err(|e| ExporterError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            server_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[async_trait]
impl JenkinsApi for JenkinsClient {
    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> ExporterResult<Value> {
        let network = |source| ExporterError::Network {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(network)?;
        tracing::debug!(url, body = %body, "Jenkins response");

        serde_json::from_str(&body).map_err(|e| ExporterError::malformed(url, e))
    }
}

/// reqwest is built without a bundled rustls provider; install ring once.
fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        let _ = rustls::crypto::ring::default_provider().install_default();
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn config_for(url: &str) -> JenkinsConfig {
        JenkinsConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_api_url() {
        assert_eq!(api_url("http://jenkins:8080"), "http://jenkins:8080/api/json");
        assert_eq!(
            api_url("http://jenkins:8080/job/a/"),
            "http://jenkins:8080/job/a/api/json"
        );
    }

    #[test]
    fn test_server_url_is_trimmed() {
        let client = JenkinsClient::new(&config_for("http://jenkins:8080/")).unwrap();
        assert_eq!(client.server_url(), "http://jenkins:8080");
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/json")
            .match_query(Matcher::UrlEncoded(
                "tree".to_string(),
                "jobs[fullName]".to_string(),
            ))
            .match_header("authorization", "Basic YWRtaW46dG9rZW4=")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jobs": []}"#)
            .create_async()
            .await;

        let config = JenkinsConfig {
            user: Some("admin".to_string()),
            password: Some("token".to_string()),
            ..config_for(&server.url())
        };
        let client = JenkinsClient::new(&config).unwrap();

        let value = client
            .fetch(&api_url(&server.url()), &[("tree", "jobs[fullName]")])
            .await
            .unwrap();

        assert_eq!(value, serde_json::json!({"jobs": []}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_omits_auth_without_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/json")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"result": "SUCCESS", "number": 1}"#)
            .create_async()
            .await;

        let config = JenkinsConfig {
            user: Some("admin".to_string()),
            ..config_for(&server.url())
        };
        let client = JenkinsClient::new(&config).unwrap();

        let value = client.fetch(&api_url(&server.url()), &[]).await.unwrap();
        assert_eq!(value["result"], "SUCCESS");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/json")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = JenkinsClient::new(&config_for(&server.url())).unwrap();
        let url = api_url(&server.url());
        let err = client.fetch(&url, &[]).await.unwrap_err();

        match err {
            ExporterError::Upstream { url: failed, status } => {
                assert_eq!(failed, url);
                assert_eq!(status, 500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_times_out_on_silent_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let config = JenkinsConfig {
            timeout_secs: 1,
            ..config_for(&format!("http://{addr}"))
        };
        let client = JenkinsClient::new(&config).unwrap();
        let url = api_url(client.server_url());

        let started = std::time::Instant::now();
        let err = client.fetch(&url, &[]).await.unwrap_err();

        match err {
            ExporterError::Network { url: failed, .. } => assert_eq!(failed, url),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(10));
        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/json")
            .with_status(200)
            .with_body("<html>login</html>")
            .create_async()
            .await;

        let client = JenkinsClient::new(&config_for(&server.url())).unwrap();
        let err = client
            .fetch(&api_url(&server.url()), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ExporterError::MalformedResponse { .. }));
    }
}

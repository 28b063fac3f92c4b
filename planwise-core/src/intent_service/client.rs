//! HTTP client for the finance intent service

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::IntentServiceConfig;
use crate::error::{Error, Result};
use crate::types::{ExtractedFinancialData, FinanceIntent};

/// Response from POST {endpoint}
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentServiceResponse {
    pub is_finance_request: bool,
    #[serde(default)]
    pub finance_info: Option<FinanceInfo>,
}

/// Classification details, present for finance requests
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceInfo {
    #[serde(rename = "type")]
    pub intent: FinanceIntent,
    #[serde(default)]
    pub extracted_data: Option<ExtractedFinancialData>,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    message: &'a str,
}

/// HTTP client for the intent service
pub struct IntentServiceClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl IntentServiceClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid or has no endpoint.
    pub fn new(config: &IntentServiceConfig) -> Result<Self> {
        config.validate()?;

        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| Error::Config("intent_service.endpoint is required".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    /// Build a client only when the service is enabled and configured.
    ///
    /// A broken configuration is logged and treated as "no service".
    pub fn from_config(config: &IntentServiceConfig) -> Option<Self> {
        if !config.is_ready() {
            return None;
        }
        match Self::new(config) {
            Ok(client) => {
                tracing::info!(endpoint = client.endpoint(), "Intent service enabled");
                Some(client)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Intent service disabled: invalid configuration");
                None
            }
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask the service to classify one utterance.
    ///
    /// A finance request without `financeInfo` is a malformed payload.
    pub async fn classify(&self, message: &str) -> Result<IntentServiceResponse> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&ClassifyRequest { message })
            .send()
            .await
            .map_err(|e| Error::IntentService(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::IntentService(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let result: IntentServiceResponse = response
            .json()
            .await
            .map_err(|e| Error::IntentService(format!("failed to parse response: {}", e)))?;

        if result.is_finance_request && result.finance_info.is_none() {
            return Err(Error::IntentService(
                "finance request without financeInfo".to_string(),
            ));
        }

        tracing::debug!(
            is_finance_request = result.is_finance_request,
            intent = result.finance_info.as_ref().map(|i| i.intent.as_str()),
            "Intent service classified utterance"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config_for(endpoint: &str) -> IntentServiceConfig {
        IntentServiceConfig {
            enabled: true,
            endpoint: Some(endpoint.to_string()),
            api_key: Some("sk_test".to_string()),
            timeout_secs: 5,
        }
    }

    /// Serve exactly one HTTP request with a canned status and body.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let reply = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/classify", addr)
    }

    /// Drain headers and the content-length body of one request.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    #[test]
    fn test_client_requires_valid_config() {
        assert!(IntentServiceClient::new(&IntentServiceConfig::default()).is_err());

        let config = IntentServiceConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(IntentServiceClient::new(&config).is_err());
        assert!(IntentServiceClient::from_config(&config).is_none());
    }

    #[test]
    fn test_client_with_valid_config() {
        let config = config_for("https://intent.example.com/classify");
        let client = IntentServiceClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "https://intent.example.com/classify");
        assert!(IntentServiceClient::from_config(&config).is_some());
    }

    #[test]
    fn test_parse_response() {
        let json = r#"{
            "isFinanceRequest": true,
            "financeInfo": {
                "type": "mortgage",
                "extractedData": {"homePrice": 400000, "loanTerm": 30}
            }
        }"#;
        let response: IntentServiceResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_finance_request);
        let info = response.finance_info.unwrap();
        assert_eq!(info.intent, FinanceIntent::Mortgage);
        let data = info.extracted_data.unwrap();
        assert_eq!(data.home_price, Some(400000.0));
        assert_eq!(data.loan_term, Some(30));
    }

    #[test]
    fn test_parse_non_finance_response() {
        let response: IntentServiceResponse =
            serde_json::from_str(r#"{"isFinanceRequest": false}"#).unwrap();
        assert!(!response.is_finance_request);
        assert!(response.finance_info.is_none());
    }

    #[tokio::test]
    async fn test_classify_success() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"isFinanceRequest":true,"financeInfo":{"type":"budget","extractedData":{"income":5000}}}"#,
        )
        .await;
        let client = IntentServiceClient::new(&config_for(&endpoint)).unwrap();

        let response = client.classify("help me budget $5000").await.unwrap();
        let info = response.finance_info.unwrap();
        assert_eq!(info.intent, FinanceIntent::Budget);
        assert_eq!(info.extracted_data.unwrap().income, Some(5000.0));
    }

    #[tokio::test]
    async fn test_classify_server_error() {
        let endpoint = serve_once("503 Service Unavailable", r#"{"error":"down"}"#).await;
        let client = IntentServiceClient::new(&config_for(&endpoint)).unwrap();

        let err = client.classify("help me budget").await.unwrap_err();
        assert!(matches!(err, Error::IntentService(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_classify_malformed_payload() {
        let endpoint = serve_once("200 OK", r#"{"isFinanceRequest":true}"#).await;
        let client = IntentServiceClient::new(&config_for(&endpoint)).unwrap();
        assert!(matches!(
            client.classify("help me budget").await,
            Err(Error::IntentService(_))
        ));

        let endpoint = serve_once("200 OK", "not json").await;
        let client = IntentServiceClient::new(&config_for(&endpoint)).unwrap();
        assert!(matches!(
            client.classify("help me budget").await,
            Err(Error::IntentService(_))
        ));
    }
}

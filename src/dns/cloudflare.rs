use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{Credentials, DnsApi, DnsRecord, RecordData};
use crate::config::CloudflareConfig;

const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RECORDS_PER_PAGE: u32 = 100;

/// Cloudflare v4 API client authenticated with an account email and
/// global API key.
///
/// Zone names are resolved to zone ids on every call.
pub struct CloudflareProvider {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CfResponse<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<CfMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<CfResultInfo>,
}

#[derive(Debug, Deserialize)]
struct CfMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CfResultInfo {
    page: u32,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct CfZone {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CfRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    ttl: u32,
}

#[derive(Debug, Serialize)]
struct CfRecordBody<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
}

impl<'a> From<&'a RecordData> for CfRecordBody<'a> {
    fn from(record: &'a RecordData) -> Self {
        Self {
            record_type: &record.record_type,
            name: &record.name,
            content: &record.content,
            ttl: record.ttl,
        }
    }
}

impl From<CfRecord> for DnsRecord {
    fn from(record: CfRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            record_type: record.record_type,
            content: record.content,
            ttl: record.ttl,
        }
    }
}

fn format_errors(errors: &[CfMessage]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl CloudflareProvider {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::build(credentials, CLOUDFLARE_API_BASE.to_string(), REQUEST_TIMEOUT)
    }

    pub fn with_config(credentials: Credentials, config: &CloudflareConfig) -> Result<Self> {
        Self::build(
            credentials,
            config.api_base.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Result<Self> {
        Self::build(credentials, base_url.into(), REQUEST_TIMEOUT)
    }

    fn build(credentials: Credentials, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<CfResponse<T>> {
        let response = request
            .header("X-Auth-Email", &self.credentials.email)
            .header("X-Auth-Key", &self.credentials.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to Cloudflare API", action))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read Cloudflare {} response", action))?;

        if !status.is_success() {
            let details = serde_json::from_str::<CfResponse<serde_json::Value>>(&body)
                .map(|r| format_errors(&r.errors))
                .unwrap_or(body);
            return Err(anyhow!(
                "Cloudflare API error during {} ({}): {}",
                action,
                status,
                details
            ));
        }

        let parsed: CfResponse<T> = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse Cloudflare {} response", action))?;

        if !parsed.success {
            return Err(anyhow!(
                "Cloudflare API rejected {}: {}",
                action,
                format_errors(&parsed.errors)
            ));
        }

        Ok(parsed)
    }

    async fn zone_id(&self, zone: &str) -> Result<String> {
        debug!("Looking up Cloudflare zone id for {}", zone);

        let request = self.client.get(self.url("/zones")).query(&[("name", zone)]);
        let response: CfResponse<Vec<CfZone>> = self.send(request, "zone lookup").await?;

        response
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|z| z.id)
            .ok_or_else(|| anyhow!("Zone not found on Cloudflare: {}", zone))
    }
}

#[async_trait]
impl DnsApi for CloudflareProvider {
    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>> {
        let zone_id = self.zone_id(zone).await?;
        let path = format!("/zones/{}/dns_records", zone_id);

        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let request = self.client.get(self.url(&path)).query(&[
                ("page", page.to_string()),
                ("per_page", RECORDS_PER_PAGE.to_string()),
            ]);
            let response: CfResponse<Vec<CfRecord>> = self.send(request, "record listing").await?;

            let batch = response.result.unwrap_or_default();
            debug!("Fetched {} records from page {} of {}", batch.len(), page, zone);
            records.extend(batch.into_iter().map(DnsRecord::from));

            match response.result_info {
                Some(info) if info.page < info.total_pages => page = info.page + 1,
                _ => break,
            }
        }

        Ok(records)
    }

    async fn create_record(&self, zone: &str, record: &RecordData) -> Result<()> {
        let zone_id = self.zone_id(zone).await?;
        let request = self
            .client
            .post(self.url(&format!("/zones/{}/dns_records", zone_id)))
            .json(&CfRecordBody::from(record));

        self.send::<serde_json::Value>(request, "record creation")
            .await?;
        Ok(())
    }

    async fn edit_record(&self, zone: &str, record_id: &str, record: &RecordData) -> Result<()> {
        let zone_id = self.zone_id(zone).await?;
        let request = self
            .client
            .put(self.url(&format!("/zones/{}/dns_records/{}", zone_id, record_id)))
            .json(&CfRecordBody::from(record));

        self.send::<serde_json::Value>(request, "record update")
            .await?;
        Ok(())
    }

    async fn delete_record(&self, zone: &str, record_id: &str) -> Result<()> {
        let zone_id = self.zone_id(zone).await?;
        let request = self
            .client
            .delete(self.url(&format!("/zones/{}/dns_records/{}", zone_id, record_id)));

        self.send::<serde_json::Value>(request, "record deletion")
            .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::RecordType;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials {
            email: "ops@example.com".to_string(),
            api_key: "test_key".to_string(),
        }
    }

    async fn mock_zone(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/zones"))
            .and(query_param("name", "example.com"))
            .and(header("X-Auth-Email", "ops@example.com"))
            .and(header("X-Auth-Key", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "errors": [],
                "result": [{"id": "zone123", "name": "example.com"}]
            })))
            .mount(server)
            .await;
    }

    fn record_json(id: &str, name: &str, record_type: &str, content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "type": record_type,
            "content": content,
            "ttl": 1,
            "proxied": false
        })
    }

    #[tokio::test]
    async fn test_list_records_follows_pages() {
        let server = MockServer::start().await;
        mock_zone(&server).await;

        Mock::given(method("GET"))
            .and(path("/zones/zone123/dns_records"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": [record_json("r1", "web1.example.com", "A", "192.0.2.1")],
                "result_info": {"page": 1, "per_page": 100, "total_pages": 2, "count": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/zones/zone123/dns_records"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": [record_json("r2", "mail.example.com", "MX", "mx.example.com")],
                "result_info": {"page": 2, "per_page": 100, "total_pages": 2, "count": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CloudflareProvider::with_base_url(credentials(), server.uri()).unwrap();
        let records = provider.list_records("example.com").await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "r1");
        assert_eq!(records[0].name, "web1.example.com");
        assert_eq!(records[0].content, "192.0.2.1");
        assert_eq!(records[1].record_type, "MX");
    }

    #[tokio::test]
    async fn test_unknown_zone() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": []
            })))
            .mount(&server)
            .await;

        let provider = CloudflareProvider::with_base_url(credentials(), server.uri()).unwrap();
        let err = provider.list_records("example.com").await.unwrap_err();

        assert!(err.to_string().contains("Zone not found"));
    }

    #[tokio::test]
    async fn test_create_record() {
        let server = MockServer::start().await;
        mock_zone(&server).await;

        Mock::given(method("POST"))
            .and(path("/zones/zone123/dns_records"))
            .and(body_json(serde_json::json!({
                "type": "A",
                "name": "web1",
                "content": "203.0.113.5",
                "ttl": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": record_json("new1", "web1.example.com", "A", "203.0.113.5")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CloudflareProvider::with_base_url(credentials(), server.uri()).unwrap();
        let data = RecordData::new(RecordType::A, "web1", "203.0.113.5", 1);

        provider.create_record("example.com", &data).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_record() {
        let server = MockServer::start().await;
        mock_zone(&server).await;

        Mock::given(method("PUT"))
            .and(path("/zones/zone123/dns_records/r1"))
            .and(body_json(serde_json::json!({
                "type": "AAAA",
                "name": "web1",
                "content": "2001:db8::5",
                "ttl": 300
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": record_json("r1", "web1.example.com", "AAAA", "2001:db8::5")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CloudflareProvider::with_base_url(credentials(), server.uri()).unwrap();
        let data = RecordData::new(RecordType::Aaaa, "web1", "2001:db8::5", 300);

        provider.edit_record("example.com", "r1", &data).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_record() {
        let server = MockServer::start().await;
        mock_zone(&server).await;

        Mock::given(method("DELETE"))
            .and(path("/zones/zone123/dns_records/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": {"id": "r1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CloudflareProvider::with_base_url(credentials(), server.uri()).unwrap();
        provider.delete_record("example.com", "r1").await.unwrap();
    }

    #[tokio::test]
    async fn test_http_error_reports_cloudflare_messages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "success": false,
                "errors": [{"code": 9103, "message": "Unknown X-Auth-Key or X-Auth-Email"}],
                "result": null
            })))
            .mount(&server)
            .await;

        let provider = CloudflareProvider::with_base_url(credentials(), server.uri()).unwrap();
        let err = provider.list_records("example.com").await.unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("403"));
        assert!(msg.contains("[9103] Unknown X-Auth-Key or X-Auth-Email"));
        assert!(!msg.contains("test_key"));
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_is_error() {
        let server = MockServer::start().await;
        mock_zone(&server).await;

        Mock::given(method("POST"))
            .and(path("/zones/zone123/dns_records"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "errors": [{"code": 81057, "message": "Record already exists."}],
                "result": null
            })))
            .mount(&server)
            .await;

        let provider = CloudflareProvider::with_base_url(credentials(), server.uri()).unwrap();
        let data = RecordData::new(RecordType::A, "web1", "203.0.113.5", 1);
        let err = provider.create_record("example.com", &data).await.unwrap_err();

        assert!(err.to_string().contains("Record already exists."));
    }

    #[test]
    fn test_record_body_serialization() {
        let data = RecordData::new(RecordType::A, "web1", "192.0.2.1", 1);
        let json = serde_json::to_value(CfRecordBody::from(&data)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"type": "A", "name": "web1", "content": "192.0.2.1", "ttl": 1})
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let provider = CloudflareProvider::new(credentials()).unwrap();
        let debug = format!("{:?}", provider);

        assert!(!debug.contains("test_key"));
        assert!(debug.contains(CLOUDFLARE_API_BASE));
    }
}

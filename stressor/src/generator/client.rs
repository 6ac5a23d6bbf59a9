//! HTTP client wrapper for the generator
//!
//! Sends a `PlannedRequest` to the target server and reads the whole response
//! so uploads and downloads actually move their bytes over the wire.

use std::time::Duration;

use rand::RngCore;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};

use super::scenario::{Payload, PlannedRequest};
use super::types::{GeneratorError, RequestOutcome};

const MIB: u64 = 1024 * 1024;

/// HTTP client bound to one target server
#[derive(Debug, Clone)]
pub struct LoadClient {
    http: Client,
    base_url: String,
}

impl LoadClient {
    /// Create a client for `base_url`; routes are appended to it verbatim.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, GeneratorError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| GeneratorError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a planned request
    pub fn url_for(&self, request: &PlannedRequest) -> Result<Url, GeneratorError> {
        let raw = format!("{}{}", self.base_url, request.route);
        let mut url =
            Url::parse(&raw).map_err(|e| GeneratorError::InvalidBaseUrl(format!("{raw}: {e}")))?;

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, &value.to_string());
            }
        }

        Ok(url)
    }

    /// Send a planned request and drain its response.
    ///
    /// Any HTTP status counts as a completed request; only transport
    /// failures are errors.
    pub async fn execute(&self, request: &PlannedRequest) -> Result<RequestOutcome, GeneratorError> {
        let url = self.url_for(request)?;

        let response = match request.payload {
            Payload::Upload { mb } => {
                let data = upload_payload(mb.saturating_mul(MIB)).await?;
                let part = Part::bytes(data)
                    .file_name("payload.bin")
                    .mime_str("application/octet-stream")?;
                let form = Form::new().part("file", part);
                self.http.post(url).multipart(form).send().await?
            }
            Payload::None | Payload::Download => self.http.get(url).send().await?,
        };

        let status = response.status().as_u16();
        let body_bytes = drain(response).await?;

        tracing::debug!(
            "{} {} -> {} ({} bytes)",
            request.scenario,
            request.route,
            status,
            body_bytes
        );

        Ok(RequestOutcome { status, body_bytes })
    }
}

/// Read a response body to the end, counting its bytes
async fn drain(mut response: Response) -> Result<u64, GeneratorError> {
    let mut total = 0u64;
    while let Some(chunk) = response.chunk().await? {
        total += chunk.len() as u64;
    }
    Ok(total)
}

/// Fill an upload body off the async workers
async fn upload_payload(len: u64) -> Result<Vec<u8>, GeneratorError> {
    Ok(tokio::task::spawn_blocking(move || random_payload(len)).await?)
}

fn random_payload(len: u64) -> Vec<u8> {
    let mut data = vec![0u8; len as usize];
    rand::rng().fill_bytes(&mut data);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Scenario;

    fn planned(route: &'static str, query: Vec<(&'static str, u64)>) -> PlannedRequest {
        PlannedRequest {
            scenario: Scenario::Wait,
            route,
            query,
            payload: Payload::None,
            description: String::new(),
        }
    }

    #[test]
    fn test_url_appends_route_and_query() {
        let client = LoadClient::new("http://localhost:8080/", None).unwrap();
        let url = client
            .url_for(&planned("/allocate", vec![("mb", 12), ("keep", 300)]))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/allocate?mb=12&keep=300");
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = LoadClient::new("http://target:3000/api", None).unwrap();
        let url = client.url_for(&planned("/send", Vec::new())).unwrap();
        assert_eq!(url.as_str(), "http://target:3000/api/send");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = LoadClient::new("not a url", None);
        assert!(matches!(result, Err(GeneratorError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_random_payload_size() {
        assert_eq!(random_payload(0).len(), 0);
        assert_eq!(random_payload(4096).len(), 4096);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_upload_payload_size() {
        let payload = upload_payload(2 * MIB).await.unwrap();
        assert_eq!(payload.len(), 2 * MIB as usize);
    }
}

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{GenerateRequest, GenerateResponse, QueryService};
use crate::config::ServiceConfig;
use crate::error::{QueryError, UPLOAD_FAILED_MESSAGE, UPLOAD_UNEXPECTED_MESSAGE};
use crate::files::{SourceFile, UploadErrorBody, UploadResponse};

/// reqwest-backed client for the upload and generate endpoints.
#[derive(Debug, Clone)]
pub struct HttpQueryService {
    client: Client,
    base_url: String,
}

impl HttpQueryService {
    pub fn new(config: &ServiceConfig) -> Result<Self, QueryError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| QueryError::transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, config.normalized_base_url()))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn upload_file(&self, file: &SourceFile) -> Result<String, QueryError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| QueryError::upload(format!("Invalid MIME type {}: {e}", file.mime_type)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload_file"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, file = %file.name, "upload request failed");
                QueryError::upload(UPLOAD_UNEXPECTED_MESSAGE)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<UploadErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string());
            tracing::warn!(status = status.as_u16(), %message, "upload rejected");
            return Err(QueryError::upload(message));
        }

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "upload response was not the expected JSON");
            QueryError::upload(UPLOAD_UNEXPECTED_MESSAGE)
        })?;
        Ok(uploaded.file_path)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, QueryError> {
        tracing::debug!(
            limit = request.limit,
            offset = request.offset,
            file = %request.file_path,
            "sending generate request"
        );
        let response = self
            .client
            .post(self.endpoint("generate_sql"))
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        // Read to completion; decoding starts only once the whole body is here.
        let body = response.bytes().await?;
        Ok(GenerateResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_ignore_trailing_slash() {
        let service = HttpQueryService::with_client(Client::new(), "https://example.test/");
        assert_eq!(service.base_url(), "https://example.test");
        assert_eq!(
            service.endpoint("upload_file"),
            "https://example.test/upload_file"
        );
    }

    #[test]
    fn new_uses_configured_base_url() {
        let config = ServiceConfig {
            base_url: "http://localhost:5000//".into(),
            ..ServiceConfig::default()
        };
        let service = HttpQueryService::new(&config).unwrap();
        assert_eq!(service.endpoint("generate_sql"), "http://localhost:5000/generate_sql");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        let service = HttpQueryService::with_client(client, format!("http://{address}"));
        let request = GenerateRequest {
            text: "q".into(),
            file_path: "f".into(),
            limit: 10,
            offset: 0,
        };
        let err = service.generate(&request).await.unwrap_err();
        assert!(matches!(err, QueryError::Transport { .. }));

        let err = service
            .upload_file(&SourceFile::new("a.csv", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), UPLOAD_UNEXPECTED_MESSAGE);
    }
}

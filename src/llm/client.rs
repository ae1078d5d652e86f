use crate::error::{Result, SilverLinkError};
use crate::llm::types::*;
use log::debug;
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::time::sleep;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_UPLOAD_URL: &str = "https://generativelanguage.googleapis.com/upload/v1beta/files";

/// Audio formats the intake flow accepts.
const SUPPORTED_AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    upload_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            upload_url: GEMINI_UPLOAD_URL.to_string(),
        }
    }

    /// Points the client at a different endpoint, for tests and proxies.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    /// Uploads an audio file through the resumable upload protocol and polls
    /// until the service has finished processing it.
    pub async fn upload_audio(&self, path: &Path) -> Result<RemoteAudio> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SilverLinkError::UnsupportedAudio("invalid file name".to_string()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !SUPPORTED_AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SilverLinkError::UnsupportedAudio(format!(
                "'{}' is not a supported format (mp3, wav, m4a)",
                file_name
            )));
        }

        let file_size = fs::metadata(path).await?.len();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        let file_bytes = fs::read(path).await?;

        debug!(
            "Uploading audio '{}' ({} bytes, {})",
            file_name, file_size, mime_type
        );

        let start_url = format!("{}?key={}", self.upload_url, self.api_key);
        let metadata = serde_json::json!({ "file": { "display_name": file_name } });

        let init_res = self
            .client
            .post(&start_url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", file_size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", &mime_type)
            .header("Content-Type", "application/json")
            .json(&metadata)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let init_status = init_res.status();
        if !init_status.is_success() {
            let error_text = init_res.text().await.unwrap_or_default();
            return Err(classify_api_error(init_status, &error_text));
        }

        let session_url = init_res
            .headers()
            .get("x-goog-upload-url")
            .ok_or_else(|| {
                SilverLinkError::InferenceFailed("no upload URL in headers".to_string())
            })?
            .to_str()
            .map_err(|e| SilverLinkError::InferenceFailed(e.to_string()))?
            .to_string();

        let upload_res = self
            .client
            .post(&session_url)
            .header("Content-Length", file_size.to_string())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(file_bytes)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let upload_status = upload_res.status();
        if !upload_status.is_success() {
            let error_text = upload_res.text().await.unwrap_or_default();
            return Err(classify_api_error(upload_status, &error_text));
        }

        let upload_body: serde_json::Value = upload_res
            .json()
            .await
            .map_err(|e| SilverLinkError::InferenceFailed(e.to_string()))?;
        let file_obj = upload_body.get("file").ok_or_else(|| {
            SilverLinkError::InferenceFailed("upload response missing 'file'".to_string())
        })?;

        let uri = file_obj
            .get("uri")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SilverLinkError::InferenceFailed("upload response missing uri".to_string())
            })?
            .to_string();

        let name = file_obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SilverLinkError::InferenceFailed("upload response missing name".to_string())
            })?
            .to_string();

        let mut state = file_obj
            .get("state")
            .and_then(|v| v.as_str())
            .unwrap_or("PROCESSING")
            .to_string();

        while state != "ACTIVE" {
            let check_url = format!("{}/{}?key={}", self.base_url, name, self.api_key);
            let check_res = self
                .client
                .get(&check_url)
                .send()
                .await
                .map_err(classify_transport_error)?;
            let check_json: serde_json::Value = check_res
                .json()
                .await
                .map_err(|e| SilverLinkError::InferenceFailed(e.to_string()))?;
            let file_obj = check_json.get("file").unwrap_or(&check_json);
            state = file_obj
                .get("state")
                .and_then(|v| v.as_str())
                .unwrap_or("PROCESSING")
                .to_string();

            match state.as_str() {
                "ACTIVE" => break,
                "FAILED" => {
                    return Err(SilverLinkError::InferenceFailed(
                        "service failed to process the audio file".to_string(),
                    ))
                }
                _ => sleep(Duration::from_secs(2)).await,
            }
        }

        Ok(RemoteAudio {
            uri,
            name,
            display_name: file_name.to_string(),
            mime_type,
            state,
        })
    }

    /// Sends one inference request and returns the model's text response.
    ///
    /// The caller owns model selection and prompt content; this method only
    /// distinguishes "got a response" from the failure categories.
    pub async fn generate_content(
        &self,
        model: &str,
        system_instruction: Option<&str>,
        contents: Vec<Content>,
        response_schema: Option<serde_json::Value>,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents,
            system_instruction: system_instruction.map(Content::user),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            },
        };

        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(classify_transport_error)?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &err_text));
        }

        let body: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| SilverLinkError::InferenceFailed(e.to_string()))?;

        let part = body
            .candidates
            .ok_or_else(|| SilverLinkError::InferenceFailed("no candidates returned".to_string()))?
            .first()
            .ok_or_else(|| SilverLinkError::InferenceFailed("empty candidates list".to_string()))?
            .content
            .parts
            .first()
            .ok_or_else(|| SilverLinkError::InferenceFailed("no parts in content".to_string()))?
            .clone();

        match part {
            Part::Text { text } => Ok(text),
            _ => Err(SilverLinkError::InferenceFailed(
                "model returned non-text content".to_string(),
            )),
        }
    }
}

fn classify_api_error(status: StatusCode, body: &str) -> SilverLinkError {
    let summary = format!("status {}: {}", status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SilverLinkError::ApiKeyRejected(summary)
        }
        StatusCode::TOO_MANY_REQUESTS => SilverLinkError::QuotaExceeded(summary),
        _ if body.to_lowercase().contains("quota") => SilverLinkError::QuotaExceeded(summary),
        _ => SilverLinkError::InferenceFailed(summary),
    }
}

fn classify_transport_error(err: reqwest::Error) -> SilverLinkError {
    if err.is_connect() || err.is_timeout() {
        SilverLinkError::NetworkUnreachable(err.to_string())
    } else {
        SilverLinkError::InferenceFailed(err.to_string())
    }
}

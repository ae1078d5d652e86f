use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Progress events streamed while a consultation is running, so a UI can
/// show what the advisor is doing during the long-latency model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdvisorEvent {
    Starting,
    Uploading { filename: String },
    AwaitingModel,
    ProcessingResponse,
    Filtered { name: String },
    NoConfidentMatch,
    Complete { recommended: usize },
    Failed { reason: String },
}

/// An audio file uploaded to the inference service, addressable by URI.
#[derive(Debug, Clone)]
pub struct RemoteAudio {
    pub uri: String,
    pub name: String,
    pub display_name: String,
    pub mime_type: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    pub fn user_with_audio(text: impl Into<String>, audio: &RemoteAudio) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![
                Part::Text { text: text.into() },
                Part::FileData {
                    file_data: FileData {
                        mime_type: audio.mime_type.clone(),
                        file_uri: audio.uri.clone(),
                    },
                },
            ],
        }
    }

    /// Attaches a short in-memory recording inline instead of uploading it.
    pub fn user_with_inline_audio(
        text: impl Into<String>,
        mime_type: impl Into<String>,
        audio: &[u8],
    ) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![
                Part::Text { text: text.into() },
                Part::InlineData {
                    inline_data: InlineBlob {
                        mime_type: mime_type.into(),
                        data: BASE64.encode(audio),
                    },
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineBlob,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineBlob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_part_wire_shape() {
        let content = Content::user("안녕하세요");
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["parts"][0]["text"], "안녕하세요");
    }

    #[test]
    fn test_file_part_wire_shape() {
        let audio = RemoteAudio {
            uri: "https://example.com/files/abc".to_string(),
            name: "files/abc".to_string(),
            display_name: "recording.mp3".to_string(),
            mime_type: "audio/mpeg".to_string(),
            state: "ACTIVE".to_string(),
        };
        let content = Content::user_with_audio("들어주세요", &audio);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["parts"][1]["fileData"]["mimeType"], "audio/mpeg");
        assert_eq!(
            json["parts"][1]["fileData"]["fileUri"],
            "https://example.com/files/abc"
        );
    }

    #[test]
    fn test_inline_part_is_base64() {
        let content = Content::user_with_inline_audio("들어주세요", "audio/wav", &[1, 2, 3]);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["parts"][1]["inlineData"]["mimeType"], "audio/wav");
        assert_eq!(json["parts"][1]["inlineData"]["data"], "AQID");
    }

    #[test]
    fn test_response_part_deserializes_as_text() {
        let json = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{}"}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let candidate = &response.candidates.unwrap()[0];
        match &candidate.content.parts[0] {
            Part::Text { text } => assert_eq!(text, "{}"),
            other => panic!("expected text part, got {:?}", other),
        }
    }
}

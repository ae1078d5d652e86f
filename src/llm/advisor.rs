use crate::catalog::BenefitCatalog;
use crate::error::Result;
use crate::llm::client::GeminiClient;
use crate::llm::types::{AdvisorEvent, Content};
use crate::prompt;
use crate::validator::{validate_response, Advisory, ValidatedResponse};
use log::info;
use std::path::Path;
use tokio::sync::mpsc::Sender;

/// The model the original service runs against.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// The outcome of one consultation round-trip.
///
/// `raw` keeps the model's unmodified text so the caller can fingerprint it
/// or show it verbatim when structured display is impossible.
#[derive(Debug, Clone)]
pub struct Consultation {
    pub validated: ValidatedResponse,
    pub raw: String,
}

/// Drives one user request through prompt construction, inference and
/// validation. The flow is strictly sequential; there is no retry loop —
/// external-service failures surface immediately and the user re-initiates.
pub struct BenefitAdvisor {
    client: GeminiClient,
    model: String,
    catalog: BenefitCatalog,
}

impl BenefitAdvisor {
    pub fn new(client: GeminiClient, model: impl Into<String>, catalog: BenefitCatalog) -> Self {
        Self {
            client,
            model: model.into(),
            catalog,
        }
    }

    pub fn catalog(&self) -> &BenefitCatalog {
        &self.catalog
    }

    /// Matches a typed situation description against the catalog.
    pub async fn advise_from_text(
        &self,
        situation: &str,
        progress: Option<Sender<AdvisorEvent>>,
    ) -> Result<Consultation> {
        self.send_event(&progress, AdvisorEvent::Starting).await;

        let instructions = prompt::text_match_instructions(&self.catalog, situation)?;
        let contents = vec![Content::user(instructions)];

        self.run(contents, progress).await
    }

    /// Matches a recorded situation: the model transcribes the uploaded
    /// audio and matches in a single call.
    pub async fn advise_from_audio(
        &self,
        path: &Path,
        progress: Option<Sender<AdvisorEvent>>,
    ) -> Result<Consultation> {
        self.send_event(&progress, AdvisorEvent::Starting).await;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        self.send_event(&progress, AdvisorEvent::Uploading { filename })
            .await;

        let audio = match self.client.upload_audio(path).await {
            Ok(audio) => audio,
            Err(err) => {
                self.send_event(
                    &progress,
                    AdvisorEvent::Failed {
                        reason: err.to_string(),
                    },
                )
                .await;
                return Err(err);
            }
        };

        let instructions = prompt::audio_match_instructions(&self.catalog)?;
        let contents = vec![Content::user_with_audio(instructions, &audio)];

        self.run(contents, progress).await
    }

    /// Matches an in-memory recording (e.g. straight from a microphone
    /// widget) without touching the filesystem.
    pub async fn advise_from_recording(
        &self,
        audio: &[u8],
        mime_type: &str,
        progress: Option<Sender<AdvisorEvent>>,
    ) -> Result<Consultation> {
        self.send_event(&progress, AdvisorEvent::Starting).await;

        let instructions = prompt::audio_match_instructions(&self.catalog)?;
        let contents = vec![Content::user_with_inline_audio(
            instructions,
            mime_type,
            audio,
        )];

        self.run(contents, progress).await
    }

    async fn run(
        &self,
        contents: Vec<Content>,
        progress: Option<Sender<AdvisorEvent>>,
    ) -> Result<Consultation> {
        self.send_event(&progress, AdvisorEvent::AwaitingModel).await;

        let raw = match self
            .client
            .generate_content(&self.model, None, contents, None)
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                self.send_event(
                    &progress,
                    AdvisorEvent::Failed {
                        reason: err.to_string(),
                    },
                )
                .await;
                return Err(err);
            }
        };

        self.send_event(&progress, AdvisorEvent::ProcessingResponse)
            .await;

        let validated = match validate_response(&raw, &self.catalog) {
            Ok(validated) => validated,
            Err(err) => {
                self.send_event(
                    &progress,
                    AdvisorEvent::Failed {
                        reason: err.to_string(),
                    },
                )
                .await;
                return Err(err);
            }
        };

        for advisory in &validated.advisories {
            match advisory {
                Advisory::HallucinationFiltered { name } => {
                    self.send_event(&progress, AdvisorEvent::Filtered { name: name.clone() })
                        .await;
                }
                Advisory::NoConfidentMatch => {
                    self.send_event(&progress, AdvisorEvent::NoConfidentMatch)
                        .await;
                }
                Advisory::BenefitsFieldMissing => {}
            }
        }

        info!(
            "Consultation complete: {} recommendation(s), {} advisory(ies)",
            validated.response.benefits.len(),
            validated.advisories.len()
        );
        self.send_event(
            &progress,
            AdvisorEvent::Complete {
                recommended: validated.response.benefits.len(),
            },
        )
        .await;

        Ok(Consultation { validated, raw })
    }

    async fn send_event(&self, sender: &Option<Sender<AdvisorEvent>>, event: AdvisorEvent) {
        if let Some(tx) = sender {
            let _ = tx.send(event).await;
        }
    }
}

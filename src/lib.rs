//! # SilverLink
//!
//! A library for matching an elderly user's life situation against a fixed
//! catalog of Korean welfare benefits via an LLM, with strict validation of
//! everything the model claims.
//!
//! ## Core Concepts
//!
//! - **Benefit Catalog**: a static, loaded-once set of benefit records.
//!   Read-only after load, shareable across requests.
//! - **Prompt Builder**: schema-constrained instruction strings that
//!   enumerate every allowed benefit and repeat the catalog data inline.
//!   One variant for typed situations, one for audio recordings.
//! - **Validator/Reconciler**: the model is an untrusted producer. Benefit
//!   names are checked against a strict allow-list, hallucinated entries are
//!   dropped with advisories, and factual fields (amount, target) are forced
//!   back to catalog ground truth.
//! - **Presentation**: ranked benefit cards for the screen plus a flat
//!   narration string for speech synthesis.
//!
//! The `gemini` feature adds the inference client, the consultation advisor
//! and the speech synthesizer; the validation core stays pure and offline.
//!
//! ## Example
//!
//! ```rust
//! use silverlink::{process_model_response, BenefitCatalog};
//!
//! let catalog = BenefitCatalog::bundled();
//! let raw = "```json\n{\"greeting\": \"어르신, 안녕하세요.\", \"benefits\": \
//!            [{\"name\": \"기초연금\", \"relevance_score\": 93, \"amount\": \"월 50만원\"}], \
//!            \"encouragement\": \"힘내세요!\"}\n```";
//!
//! let outcome = process_model_response(raw, &catalog).unwrap();
//! // The drifted amount was forced back to the catalog value.
//! assert_eq!(outcome.validated.response.benefits[0].amount, "월 최대 32만원");
//! ```

pub mod cache;
pub mod catalog;
pub mod error;
pub mod present;
pub mod prompt;
pub mod schema;
pub mod validator;

#[cfg(feature = "gemini")]
pub mod llm;

pub use cache::{fingerprint, ResponseCache};
pub use catalog::{BenefitCatalog, BenefitRecord};
pub use error::{Result, SilverLinkError};
pub use present::{narration, ranked, BenefitCard, ConsultationView, HUMAN_FALLBACK_CHANNEL};
pub use prompt::{audio_match_instructions, text_match_instructions, RECOMMENDATION_THRESHOLD};
pub use schema::{AiResponse, RecommendedBenefit};
pub use validator::{strip_code_fences, validate_response, Advisory, ValidatedResponse};

use log::{debug, info};

/// Everything the UI shell needs from one model response: the sanitized
/// data, the ranked on-screen view and the narration string for speech.
#[derive(Debug, Clone)]
pub struct ConsultationOutcome {
    pub validated: ValidatedResponse,
    pub view: ConsultationView,
    pub narration: String,
}

/// Runs the pure half of the pipeline: validate a raw model response
/// against the catalog, then render it for display and narration.
///
/// Unparsable responses yield [`SilverLinkError::MalformedResponse`] with
/// the raw text preserved so the caller can still show something.
pub fn process_model_response(
    raw: &str,
    catalog: &BenefitCatalog,
) -> Result<ConsultationOutcome> {
    info!(
        "Reviewing model response against catalog of {} benefits",
        catalog.len()
    );

    let validated = validate_response(raw, catalog)?;

    if !validated.advisories.is_empty() {
        debug!("Validation advisories: {:?}", validated.advisories);
    }

    let view = ConsultationView::new(&validated);
    let narration = narration(&validated.response);

    Ok(ConsultationOutcome {
        validated,
        view,
        narration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_processing() {
        let catalog = BenefitCatalog::bundled();
        let raw = r#"```json
{
  "greeting": "어르신, 혼자 지내시면서 많이 힘드셨겠어요.",
  "benefits": [
    {
      "name": "독거노인 돌봄 서비스",
      "relevance_score": 95,
      "relevance_reason": "혼자 거주하고 계십니다.",
      "amount": "월 10만원",
      "target": "전체 국민",
      "description": "안전 확인과 말벗 서비스를 제공합니다.",
      "next_action": "주민센터에 전화로 신청하세요."
    },
    {
      "name": "기초연금",
      "relevance_score": 75,
      "amount": "월 100만원",
      "description": "매달 연금을 지급합니다.",
      "next_action": "주민센터를 방문하세요."
    },
    {
      "name": "존재하지않는혜택",
      "relevance_score": 99,
      "amount": "100만원"
    }
  ],
  "encouragement": "어르신께 맞는 혜택을 꼭 받으시길 바랍니다."
}
```"#;

        let outcome = process_model_response(raw, &catalog).unwrap();

        // Hallucination dropped, survivors keep catalog facts.
        assert_eq!(outcome.validated.response.benefits.len(), 2);
        assert!(outcome
            .validated
            .advisories
            .contains(&Advisory::HallucinationFiltered {
                name: "존재하지않는혜택".to_string()
            }));

        let care = &outcome.validated.response.benefits[0];
        assert_eq!(care.amount, "무료");
        assert_eq!(care.target, "만 65세 이상 독거노인");

        let pension = &outcome.validated.response.benefits[1];
        assert_eq!(pension.amount, "월 최대 32만원");

        // View is ranked, narration speaks amounts but not scores.
        assert_eq!(outcome.view.cards[0].name, "독거노인 돌봄 서비스");
        assert!(outcome.narration.contains("금액은 무료입니다."));
        assert!(!outcome.narration.contains("95"));
    }

    #[test]
    fn test_malformed_response_keeps_raw_for_fallback() {
        let catalog = BenefitCatalog::bundled();
        let raw = "어르신, 기초연금을 알아봐 드릴게요.";

        match process_model_response(raw, &catalog) {
            Err(SilverLinkError::MalformedResponse { raw: preserved }) => {
                assert_eq!(preserved, raw);
            }
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_identical_input_yields_identical_outcome() {
        let catalog = BenefitCatalog::bundled();
        let raw = r#"{"greeting": "안녕하세요", "benefits": [{"name": "기초연금", "relevance_score": 80}], "encouragement": "힘내세요"}"#;

        let first = process_model_response(raw, &catalog).unwrap();
        let second = process_model_response(raw, &catalog).unwrap();
        assert_eq!(first.validated, second.validated);
        assert_eq!(first.narration, second.narration);
    }
}

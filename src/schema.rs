use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One benefit recommendation as claimed by the model.
///
/// Every field deserializes leniently (missing values become defaults): the
/// model is an untrusted producer and the validator decides what survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecommendedBenefit {
    #[serde(default)]
    #[schemars(description = "Benefit name copied EXACTLY from the allowed benefit list, character for character")]
    pub name: String,

    #[serde(default)]
    #[schemars(
        description = "Relevance of this benefit to the user's situation, 0-100. Only benefits scoring 70 or higher may be included."
    )]
    pub relevance_score: i64,

    #[serde(default)]
    #[schemars(description = "One or two sentences explaining why this benefit fits the situation")]
    pub relevance_reason: String,

    #[serde(default)]
    #[schemars(description = "Eligible group, copied verbatim from the catalog (e.g. '만 65세 이상, 소득 하위 70%')")]
    pub target: String,

    #[serde(default)]
    #[schemars(description = "Benefit amount, copied verbatim from the catalog (e.g. '월 최대 32만원')")]
    pub amount: String,

    #[serde(default)]
    #[schemars(description = "Short description of the benefit in warm, polite Korean (1-2 sentences)")]
    pub description: String,

    #[serde(default)]
    #[schemars(
        description = "Concrete next step for the user (e.g. '신분증과 통장사본을 가지고 가까운 주민센터를 방문하여 신청하세요')"
    )]
    pub next_action: String,

    #[serde(default)]
    #[schemars(description = "Required application documents, from the catalog")]
    pub documents: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Where to ask, including a phone number, from the catalog")]
    pub contact: String,
}

/// The full structured payload the model is instructed to return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Verbatim transcription of the user's spoken words. Present only when the input was audio."
    )]
    pub transcript: Option<String>,

    #[serde(default)]
    #[schemars(description = "Warm greeting empathizing with the user's situation (2-3 sentences, polite Korean)")]
    pub greeting: String,

    #[serde(default)]
    #[schemars(description = "Recommended benefits, best match first")]
    pub benefits: Vec<RecommendedBenefit>,

    #[serde(default)]
    #[schemars(description = "Encouraging closing words (2-3 sentences, polite Korean)")]
    pub encouragement: String,
}

impl AiResponse {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AiResponse)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

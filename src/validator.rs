use crate::catalog::{BenefitCatalog, BenefitRecord};
use crate::error::{Result, SilverLinkError};
use crate::schema::{AiResponse, RecommendedBenefit};
use log::{debug, warn};
use serde_json::Value;

/// A recoverable anomaly observed while validating a model response.
///
/// Advisories are returned as data; how (or whether) to show them to the
/// user is the presentation layer's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// The model recommended a benefit that does not exist in the catalog.
    /// The entry was dropped. Exactly one advisory is recorded per name.
    HallucinationFiltered { name: String },

    /// The response had no `benefits` array; it was treated as empty.
    BenefitsFieldMissing,

    /// No recommendation survived validation. The caller should direct the
    /// user to the human fallback channel instead of showing an empty list.
    NoConfidentMatch,
}

/// A sanitized response plus everything the validator had to do to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResponse {
    pub response: AiResponse,
    pub advisories: Vec<Advisory>,
}

impl ValidatedResponse {
    pub fn no_confident_match(&self) -> bool {
        self.advisories.contains(&Advisory::NoConfidentMatch)
    }
}

/// Removes Markdown code-fence wrapping from model output.
///
/// Extracts the content between the first opening fence (a fence marked as
/// JSON wins over a plain one) and the next closing fence, repeating until no
/// fenced block remains, so doubly-wrapped payloads reduce to the same text
/// as singly-wrapped ones. Text without a complete fence pair passes through
/// unchanged, which makes the operation idempotent.
pub fn strip_code_fences(text: &str) -> &str {
    let mut current = text.trim();
    while let Some(inner) = strip_fence_once(current) {
        current = inner;
    }
    current
}

fn strip_fence_once(text: &str) -> Option<&str> {
    let start = match text.find("```json") {
        Some(pos) => pos + "```json".len(),
        None => text.find("```")? + 3,
    };
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Validates a raw model response against the catalog.
///
/// Guarantees on the returned response:
/// - every benefit name exists in the catalog (strict allow-list, exact match);
/// - `amount` and `target` equal the catalog values, whatever the model said;
/// - `documents` and `contact` are filled from the catalog when the model
///   left them empty, and kept otherwise;
/// - surviving entries keep the model's relative order (display ranking is a
///   presentation concern).
///
/// Unparsable text yields [`SilverLinkError::MalformedResponse`] carrying the
/// original text verbatim, so the caller can fall back to raw display. No
/// other condition is an error.
pub fn validate_response(raw: &str, catalog: &BenefitCatalog) -> Result<ValidatedResponse> {
    let stripped = strip_code_fences(raw);

    let document: Value = match serde_json::from_str(stripped) {
        Ok(value) => value,
        Err(err) => {
            debug!("Model response failed to parse as JSON: {}", err);
            return Err(SilverLinkError::MalformedResponse {
                raw: raw.to_string(),
            });
        }
    };

    let Value::Object(fields) = document else {
        debug!("Model response parsed but is not a JSON object");
        return Err(SilverLinkError::MalformedResponse {
            raw: raw.to_string(),
        });
    };

    let mut advisories = Vec::new();

    let candidates = match fields.get("benefits") {
        Some(Value::Array(entries)) => entries.clone(),
        _ => {
            warn!("Model response has no benefits array, treating as empty");
            advisories.push(Advisory::BenefitsFieldMissing);
            Vec::new()
        }
    };

    let mut benefits = Vec::with_capacity(candidates.len());
    let mut rejected_names = std::collections::BTreeSet::new();
    for entry in candidates {
        let candidate: RecommendedBenefit = match serde_json::from_value(entry) {
            Ok(benefit) => benefit,
            Err(err) => {
                warn!("Dropping benefit entry with unusable shape: {}", err);
                continue;
            }
        };

        match catalog.get(&candidate.name) {
            Some(record) => {
                benefits.push(reconcile(candidate, record));
            }
            None => {
                warn!(
                    "Filtered hallucinated benefit '{}' (not in catalog)",
                    candidate.name
                );
                // One advisory per rejected name, however often it repeats.
                if rejected_names.insert(candidate.name.clone()) {
                    advisories.push(Advisory::HallucinationFiltered {
                        name: candidate.name,
                    });
                }
            }
        }
    }

    if benefits.is_empty() {
        advisories.push(Advisory::NoConfidentMatch);
    }

    let response = AiResponse {
        transcript: fields
            .get("transcript")
            .and_then(Value::as_str)
            .map(str::to_string),
        greeting: string_field(&fields, "greeting"),
        benefits,
        encouragement: string_field(&fields, "encouragement"),
    };

    Ok(ValidatedResponse {
        response,
        advisories,
    })
}

/// Forces the factual fields back to catalog ground truth.
///
/// `amount` and `target` are never trusted from the model. `documents` and
/// `contact` are softer: the model may legitimately rephrase them, so the
/// catalog value only fills gaps.
fn reconcile(mut benefit: RecommendedBenefit, record: &BenefitRecord) -> RecommendedBenefit {
    benefit.amount = record.amount.clone();
    benefit.target = record.target.clone();

    if benefit.documents.is_empty() {
        benefit.documents = record.documents.clone();
    }
    if benefit.contact.trim().is_empty() {
        benefit.contact = record.contact.clone();
    }

    benefit
}

fn string_field(fields: &serde_json::Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

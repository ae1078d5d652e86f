//! Turns a validated response into user-facing output: ranked benefit cards
//! for the screen, and a flat narration string for speech synthesis.

use crate::schema::{AiResponse, RecommendedBenefit};
use crate::validator::ValidatedResponse;
use std::fmt::Write;

/// Where to send the user when no recommendation survives validation.
pub const HUMAN_FALLBACK_CHANNEL: &str = "가까운 주민센터 (☎ 국번없이 129)";

/// Benefits ordered for display: relevance score descending, ties keep the
/// model's original order (stable sort).
pub fn ranked(benefits: &[RecommendedBenefit]) -> Vec<&RecommendedBenefit> {
    let mut sorted: Vec<&RecommendedBenefit> = benefits.iter().collect();
    sorted.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    sorted
}

/// One on-screen benefit panel.
#[derive(Debug, Clone, PartialEq)]
pub struct BenefitCard {
    pub rank: usize,
    pub name: String,
    pub amount: String,
    pub target: String,
    pub description: String,
    pub next_action: String,
    pub documents: Vec<String>,
    pub contact: String,
    pub relevance_score: i64,
    pub relevance_reason: String,
}

/// The structured on-screen representation of one consultation:
/// greeting, optional transcript, ranked cards, encouragement.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsultationView {
    pub greeting: String,
    pub transcript: Option<String>,
    pub cards: Vec<BenefitCard>,
    pub encouragement: String,
    pub needs_human_followup: bool,
}

impl ConsultationView {
    pub fn new(validated: &ValidatedResponse) -> Self {
        let response = &validated.response;
        let cards = ranked(&response.benefits)
            .into_iter()
            .enumerate()
            .map(|(i, benefit)| BenefitCard {
                rank: i + 1,
                name: benefit.name.clone(),
                amount: benefit.amount.clone(),
                target: benefit.target.clone(),
                description: benefit.description.clone(),
                next_action: benefit.next_action.clone(),
                documents: benefit.documents.clone(),
                contact: benefit.contact.clone(),
                relevance_score: benefit.relevance_score,
                relevance_reason: benefit.relevance_reason.clone(),
            })
            .collect();

        Self {
            greeting: response.greeting.clone(),
            transcript: response.transcript.clone(),
            cards,
            encouragement: response.encouragement.clone(),
            needs_human_followup: validated.no_confident_match(),
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        if !self.greeting.is_empty() {
            let _ = writeln!(out, "{}\n", self.greeting);
        }

        if let Some(transcript) = &self.transcript {
            let _ = writeln!(out, "**어르신 말씀**: {}\n", transcript);
        }

        if self.cards.is_empty() {
            let _ = writeln!(
                out,
                "딱 맞는 혜택을 찾지 못했습니다. {}에 문의해 주세요.\n",
                HUMAN_FALLBACK_CHANNEL
            );
        } else {
            let _ = writeln!(out, "## 추천 복지 혜택\n");
            for card in &self.cards {
                let _ = writeln!(out, "### {}. {} - {}", card.rank, card.name, card.amount);
                let _ = writeln!(out, "- **대상**: {}", card.target);
                if !card.description.is_empty() {
                    let _ = writeln!(out, "- **설명**: {}", card.description);
                }
                if !card.next_action.is_empty() {
                    let _ = writeln!(out, "- **다음 할 일**: {}", card.next_action);
                }
                if !card.documents.is_empty() {
                    let _ = writeln!(out, "- **필요 서류**: {}", card.documents.join(", "));
                }
                if !card.contact.is_empty() {
                    let _ = writeln!(out, "- **문의처**: {}", card.contact);
                }
                if card.relevance_reason.is_empty() {
                    let _ = writeln!(out, "- **적합도**: {}점", card.relevance_score);
                } else {
                    let _ = writeln!(
                        out,
                        "- **적합도**: {}점 ({})",
                        card.relevance_score, card.relevance_reason
                    );
                }
                let _ = writeln!(out);
            }
        }

        if !self.encouragement.is_empty() {
            let _ = writeln!(out, "{}", self.encouragement);
        }

        out
    }
}

/// Flattens a validated response into the narration string handed to the
/// speech synthesizer: greeting, one sentence per benefit (name, description,
/// amount, next action), encouragement. Scores and reasons are visual-only
/// and never spoken.
pub fn narration(response: &AiResponse) -> String {
    let mut text = String::new();

    if !response.greeting.is_empty() {
        text.push_str(&response.greeting);
        text.push_str("\n\n");
    }

    for (i, benefit) in ranked(&response.benefits).into_iter().enumerate() {
        let _ = write!(text, "{}. {}. ", i + 1, benefit.name);
        if !benefit.description.is_empty() {
            text.push_str(&benefit.description);
            text.push(' ');
        }
        let _ = write!(text, "금액은 {}입니다. ", benefit.amount);
        if !benefit.next_action.is_empty() {
            text.push_str(&benefit.next_action);
            text.push(' ');
        }
        text.push_str("\n\n");
    }

    text.push_str(&response.encouragement);
    text
}

//! Instruction builders for the benefit-matching call.
//!
//! The prompt is the first line of defense against hallucination: it
//! enumerates every allowed benefit name, repeats the catalog data inline,
//! and pins the output to an exact JSON schema with a worked example. The
//! validator is the second line; both are required.

use crate::catalog::BenefitCatalog;
use crate::error::Result;

/// Minimum relevance score a benefit must reach to be recommended at all.
/// Enforced by prompt instruction only; the validator does not re-check it.
pub const RECOMMENDATION_THRESHOLD: i64 = 70;

const PERSONA_AND_RULES: &str = r#"You are a welfare benefits advisor for elderly Korean citizens.

## YOUR MISSION
Compare the user's situation against the ALLOWED BENEFITS catalog below and recommend the entries that genuinely fit.

## CRITICAL RULES
1. Recommend ONLY benefits whose `name` appears in the ALLOWED BENEFITS list. Copy each name EXACTLY, character for character. Never invent, merge, translate, or rename a benefit.
2. Copy `target`, `amount`, `documents` and `contact` verbatim from the catalog data. Do NOT restate amounts or eligibility from memory.
3. If you are not certain a detail is current, write "가까운 주민센터(☎ 국번없이 129)에 문의가 필요합니다" in that field instead of guessing.
4. Respond with JSON only. No prose, no explanation before or after the JSON.
5. Write every user-facing sentence in warm, polite Korean (존댓말)."#;

const SCORE_POLICY: &str = r#"## SCORING POLICY
Score each candidate benefit 0-100 for relevance to the situation:
- 90-100: excellent match - the situation clearly satisfies the eligibility criteria
- 75-89: good match - most criteria are satisfied
- 70-74: partial match - plausibly eligible, verification needed
- below 70: do not recommend - omit the benefit entirely
Include only benefits scoring 70 or higher, ordered best match first."#;

const OUTPUT_CONTRACT: &str = r#"## OUTPUT FORMAT
Return a single JSON object with these fields:
- `greeting`: string - warm greeting empathizing with the situation (2-3 sentences)
- `benefits`: array - one object per recommended benefit:
  - `name`: string - exact name from the ALLOWED BENEFITS list
  - `relevance_score`: integer 0-100 per the scoring policy
  - `relevance_reason`: string - why this benefit fits (1-2 sentences)
  - `target`: string - verbatim from the catalog
  - `amount`: string - verbatim from the catalog
  - `description`: string - short explanation of the benefit (1-2 sentences)
  - `next_action`: string - concrete next step (e.g. "신분증과 통장사본을 가지고 가까운 주민센터를 방문하여 신청하세요")
  - `documents`: array of strings - verbatim from the catalog
  - `contact`: string - verbatim from the catalog
- `encouragement`: string - encouraging closing words (2-3 sentences)

## WORKED EXAMPLE
{
  "greeting": "어르신, 혼자 지내시면서 생활비 걱정이 크셨겠어요. 말씀해 주셔서 감사합니다.",
  "benefits": [
    {
      "name": "기초연금",
      "relevance_score": 93,
      "relevance_reason": "만 65세 이상이시고 소득이 적다고 말씀하셔서 수급 가능성이 높습니다.",
      "target": "만 65세 이상, 소득 하위 70%",
      "amount": "월 최대 32만원",
      "description": "소득이 적은 어르신께 매달 연금을 지급하는 제도입니다.",
      "next_action": "신분증과 통장사본을 가지고 가까운 주민센터를 방문하여 신청하세요.",
      "documents": ["신분증", "통장사본", "소득·재산 신고서"],
      "contact": "보건복지상담센터 (☎ 국번없이 129)"
    }
  ],
  "encouragement": "어르신께서 받으실 수 있는 혜택이 분명히 있습니다. 천천히 하나씩 신청해 보세요."
}"#;

const AUDIO_TASK: &str = r#"## AUDIO TASK
The user's situation is in the attached audio recording.
1. First transcribe the user's spoken words accurately into Korean text.
2. Then match the transcribed situation against the catalog, following every rule above.
3. Add the transcription to the output as an extra field:
- `transcript`: string - the user's words, written out verbatim"#;

/// Builds the full instruction string for a typed situation description.
pub fn text_match_instructions(catalog: &BenefitCatalog, situation: &str) -> Result<String> {
    let mut instructions = common_sections(catalog)?;

    instructions.push_str("\n\n## USER SITUATION\n");
    instructions.push_str(situation.trim());
    instructions.push_str("\n\n");
    instructions.push_str(OUTPUT_CONTRACT);

    Ok(instructions)
}

/// Builds the full instruction string for an attached audio recording.
/// The model transcribes first, then matches; the transcript comes back as
/// an additional schema field.
pub fn audio_match_instructions(catalog: &BenefitCatalog) -> Result<String> {
    let mut instructions = common_sections(catalog)?;

    instructions.push_str("\n\n");
    instructions.push_str(AUDIO_TASK);
    instructions.push_str("\n\n");
    instructions.push_str(OUTPUT_CONTRACT);

    Ok(instructions)
}

fn common_sections(catalog: &BenefitCatalog) -> Result<String> {
    let mut sections = String::from(PERSONA_AND_RULES);

    sections.push_str("\n\n");
    sections.push_str(SCORE_POLICY);

    sections.push_str("\n\n## ALLOWED BENEFITS\nThese are the ONLY benefit names you may use:\n");
    for name in catalog.names() {
        sections.push_str(&format!("- \"{}\"\n", name));
    }

    sections.push_str("\n## CATALOG DATA\n");
    sections.push_str(&catalog.to_json()?);

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_instructions_enumerate_all_names() {
        let catalog = BenefitCatalog::bundled();
        let instructions = text_match_instructions(&catalog, "저는 72살이고 혼자 살아요").unwrap();

        for name in catalog.names() {
            assert!(
                instructions.contains(&format!("- \"{}\"", name)),
                "allow-list is missing '{}'",
                name
            );
        }
    }

    #[test]
    fn test_text_instructions_inline_catalog_data() {
        let catalog = BenefitCatalog::bundled();
        let instructions = text_match_instructions(&catalog, "생활비가 부족해요").unwrap();

        // Catalog amounts must appear verbatim so the model has no excuse
        // to invent values.
        for record in catalog.records() {
            assert!(instructions.contains(&record.amount));
            assert!(instructions.contains(&record.contact));
        }
    }

    #[test]
    fn test_text_instructions_contain_situation_and_policy() {
        let catalog = BenefitCatalog::bundled();
        let situation = "다리가 아파서 거동이 불편합니다";
        let instructions = text_match_instructions(&catalog, situation).unwrap();

        assert!(instructions.contains(situation));
        assert!(instructions.contains("90-100: excellent match"));
        assert!(instructions.contains("75-89: good match"));
        assert!(instructions.contains("70-74: partial match"));
        assert!(instructions.contains("below 70: do not recommend"));
    }

    #[test]
    fn test_text_instructions_contain_schema_and_example() {
        let catalog = BenefitCatalog::bundled();
        let instructions = text_match_instructions(&catalog, "혼자 살아요").unwrap();

        for field in [
            "`greeting`",
            "`benefits`",
            "`relevance_score`",
            "`relevance_reason`",
            "`next_action`",
            "`documents`",
            "`contact`",
            "`encouragement`",
        ] {
            assert!(instructions.contains(field), "schema is missing {}", field);
        }
        assert!(instructions.contains("WORKED EXAMPLE"));
    }

    #[test]
    fn test_audio_instructions_request_transcript() {
        let catalog = BenefitCatalog::bundled();
        let instructions = audio_match_instructions(&catalog).unwrap();

        assert!(instructions.contains("`transcript`"));
        assert!(instructions.contains("transcribe"));
        // The audio variant carries the same allow-list and policy.
        assert!(instructions.contains("ALLOWED BENEFITS"));
        assert!(instructions.contains("below 70: do not recommend"));
    }

    #[test]
    fn test_text_instructions_omit_transcript_field() {
        let catalog = BenefitCatalog::bundled();
        let instructions = text_match_instructions(&catalog, "혼자 살아요").unwrap();
        assert!(!instructions.contains("`transcript`"));
    }
}

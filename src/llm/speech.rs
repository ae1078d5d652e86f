//! Narration-to-speech client.
//!
//! Wraps the public translate_tts endpoint: each request synthesizes one
//! short text chunk as MP3, and MP3 frames concatenate cleanly, so long
//! narrations are split at sentence boundaries and stitched back together.

use crate::error::{Result, SilverLinkError};
use log::debug;
use reqwest::Client;

const TRANSLATE_TTS_URL: &str = "https://translate.google.com/translate_tts";

/// The endpoint rejects long inputs; stay well under its limit.
const MAX_CHUNK_CHARS: usize = 180;

#[derive(Clone)]
pub struct SpeechSynthesizer {
    client: Client,
    base_url: String,
}

impl SpeechSynthesizer {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: TRANSLATE_TTS_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Synthesizes `text` in the given language tag (e.g. "ko") and returns
    /// a single MP3 byte stream.
    pub async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        debug!("Synthesizing {} chunk(s) of narration", chunks.len());

        let mut audio = Vec::new();
        for chunk in &chunks {
            let res = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", lang),
                    ("q", chunk.as_str()),
                ])
                .send()
                .await
                .map_err(|e| SilverLinkError::SpeechSynthesisFailed(e.to_string()))?;

            let status = res.status();
            if !status.is_success() {
                return Err(SilverLinkError::SpeechSynthesisFailed(format!(
                    "status {}",
                    status
                )));
            }

            let bytes = res
                .bytes()
                .await
                .map_err(|e| SilverLinkError::SpeechSynthesisFailed(e.to_string()))?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }
}

impl Default for SpeechSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits narration into chunks of at most `max_chars` characters,
/// preferring sentence boundaries. A single overlong sentence is hard-split.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();

        if current_len + sentence_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current).trim().to_string());
            current_len = 0;
        }

        if sentence_len > max_chars {
            for piece in hard_split(&sentence, max_chars) {
                chunks.push(piece);
            }
            continue;
        }

        current.push_str(&sentence);
        current_len += sentence_len;
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks.retain(|c| !c.is_empty());
    chunks
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?' | '\n' | '。') {
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }

    sentences
}

fn hard_split(sentence: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = sentence.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect::<String>().trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunk_text("안녕하세요, 어르신.", 180);
        assert_eq!(chunks, vec!["안녕하세요, 어르신."]);
    }

    #[test]
    fn test_chunks_respect_limit() {
        let text = "첫 번째 문장입니다. 두 번째 문장입니다. 세 번째 문장입니다.";
        let chunks = chunk_text(text, 14);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 14, "chunk too long: {}", chunk);
        }
    }

    #[test]
    fn test_splitting_prefers_sentence_boundaries() {
        let text = "가나다라. 마바사아. 자차카타.";
        let chunks = chunk_text(text, 12);
        assert_eq!(chunks[0], "가나다라. 마바사아.");
        assert_eq!(chunks[1], "자차카타.");
    }

    #[test]
    fn test_overlong_sentence_is_hard_split() {
        let text = "가".repeat(50);
        let chunks = chunk_text(&text, 20);
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20);
        }
    }

    #[test]
    fn test_no_empty_chunks() {
        let chunks = chunk_text("\n\n안녕하세요.\n\n", 180);
        for chunk in &chunks {
            assert!(!chunk.trim().is_empty());
        }
    }
}

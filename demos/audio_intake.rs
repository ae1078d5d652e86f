use anyhow::{Context, Result};
use dotenv::dotenv;
use silverlink::llm::{AdvisorEvent, BenefitAdvisor, GeminiClient, DEFAULT_MODEL};
use silverlink::{BenefitCatalog, ConsultationView};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let path: PathBuf = std::env::args()
        .nth(1)
        .context("usage: audio_intake <recording.mp3|wav|m4a>")?
        .into();

    let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;
    let advisor = BenefitAdvisor::new(
        GeminiClient::new(api_key),
        DEFAULT_MODEL,
        BenefitCatalog::bundled(),
    );

    let (tx, mut rx) = tokio::sync::mpsc::channel::<AdvisorEvent>(16);
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                AdvisorEvent::Uploading { filename } => println!("📤 Uploading {}", filename),
                AdvisorEvent::AwaitingModel => println!("🎧 Listening and matching..."),
                AdvisorEvent::Complete { recommended } => {
                    println!("✅ {} recommendation(s)", recommended)
                }
                AdvisorEvent::Failed { reason } => println!("❌ {}", reason),
                _ => {}
            }
        }
    });

    let consultation = advisor.advise_from_audio(&path, Some(tx)).await?;
    let _ = progress.await;

    if let Some(transcript) = &consultation.validated.response.transcript {
        println!("\n👵 어르신 말씀: {}", transcript);
    }

    let view = ConsultationView::new(&consultation.validated);
    println!("\n{}", view.to_markdown());

    Ok(())
}

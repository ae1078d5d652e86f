use dotenv::dotenv;
use silverlink::llm::{AdvisorEvent, BenefitAdvisor, GeminiClient, SpeechSynthesizer, DEFAULT_MODEL};
use silverlink::{narration, BenefitCatalog, ConsultationView};
use std::error::Error;

const SAMPLE_SITUATION: &str =
    "저는 72살이고 혼자 살고 있어요. 다리가 아파서 거동이 불편하고, 생활비가 부족해서 걱정이 많습니다.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    println!("🎙️ SilverLink benefit finder");

    let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");
    let client = GeminiClient::new(api_key);
    let catalog = BenefitCatalog::bundled();
    println!("📚 Catalog loaded: {} benefits", catalog.len());

    let advisor = BenefitAdvisor::new(client, DEFAULT_MODEL, catalog);

    // Stream progress events while the model call is in flight.
    let (tx, mut rx) = tokio::sync::mpsc::channel::<AdvisorEvent>(16);
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                AdvisorEvent::Starting => println!("🤖 Matching benefits..."),
                AdvisorEvent::AwaitingModel => println!("⏳ Waiting for the model..."),
                AdvisorEvent::ProcessingResponse => println!("🔎 Validating the response..."),
                AdvisorEvent::Filtered { name } => {
                    println!("🚫 Filtered hallucinated benefit: {}", name)
                }
                AdvisorEvent::NoConfidentMatch => println!("ℹ️  No confident match"),
                AdvisorEvent::Complete { recommended } => {
                    println!("✅ {} recommendation(s)", recommended)
                }
                AdvisorEvent::Failed { reason } => println!("❌ {}", reason),
                _ => {}
            }
        }
    });

    println!("\n👵 Situation: {}\n", SAMPLE_SITUATION);
    let consultation = advisor
        .advise_from_text(SAMPLE_SITUATION, Some(tx))
        .await?;
    let _ = progress.await;

    let view = ConsultationView::new(&consultation.validated);
    println!("\n{}", view.to_markdown());

    // Narrate the result (scores and reasons stay on screen only).
    let text = narration(&consultation.validated.response);
    println!("🔊 Synthesizing speech...");
    match SpeechSynthesizer::new().synthesize(&text, "ko").await {
        Ok(audio) => {
            std::fs::write("response.mp3", &audio)?;
            println!("💾 Narration saved to response.mp3 ({} bytes)", audio.len());
        }
        Err(e) => eprintln!("⚠️  Speech synthesis unavailable: {}", e),
    }

    Ok(())
}

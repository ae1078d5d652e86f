use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use dotenv::dotenv;
use silverlink::{
    narration, process_model_response, text_match_instructions, AiResponse, BenefitCatalog,
};
use std::error::Error;

const SAMPLE_SITUATION: &str =
    "올해 일흔다섯인데 기름값이 무서워서 겨울에 보일러를 못 틀어요. 무릎도 아파서 병원비 걱정이 큽니다.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    println!("🚀 SilverLink structured matching (OpenAI-compatible endpoint)...");

    let catalog = BenefitCatalog::bundled();

    // 1. Generate the JSON Schema for the response contract
    let schema = AiResponse::generate_json_schema();
    let schema_json = serde_json::to_value(&schema)?;
    println!("📋 Generated response schema for structured output.");

    // 2. Initialize the client via the OpenAI shim
    let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");
    let base_url = "https://generativelanguage.googleapis.com/v1beta/openai";

    let config = OpenAIConfig::new()
        .with_api_base(base_url)
        .with_api_key(api_key);
    let client = Client::with_config(config);

    // 3. Build the full instruction string (allow-list + catalog + contract)
    let instructions = text_match_instructions(&catalog, SAMPLE_SITUATION)?;

    println!("🤖 Sending request to gemini-2.5-pro...");
    let request = CreateChatCompletionRequestArgs::default()
        .model("gemini-2.5-pro")
        .messages(vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                content: instructions.into(),
                ..Default::default()
            },
        )])
        .response_format(ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                name: "benefit_consultation".into(),
                schema: Some(schema_json),
                strict: Some(true),
                description: None,
            },
        })
        .build()?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| format!("API error: {}", e))?;

    let content = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_ref())
        .ok_or("no content in response")?;

    // 4. Validate against the catalog — structured output or not, the
    //    allow-list still decides what reaches the user.
    let outcome = match process_model_response(content, &catalog) {
        Ok(outcome) => outcome,
        Err(silverlink::SilverLinkError::MalformedResponse { raw }) => {
            println!("⚠️  Could not structure the response, raw text follows:\n{}", raw);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for advisory in &outcome.validated.advisories {
        println!("⚠️  Advisory: {:?}", advisory);
    }

    println!("\n{}", outcome.view.to_markdown());
    println!("--- narration ---\n{}", narration(&outcome.validated.response));

    Ok(())
}

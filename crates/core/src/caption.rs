//! Caption generation through the OpenRouter chat-completions API.
//!
//! The provider is treated as a black box: we hand it a prompt assembled
//! from an extracted page plus the user's style preferences, and take back
//! a single caption string. Pass-through fields (image URL, title, page URL)
//! are echoed alongside the caption so downstream consumers get one
//! self-contained payload.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{PostprepError, Result};

const OPENROUTER_CHAT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Captions shorter than this are treated as a provider failure.
const MIN_CAPTION_LEN: usize = 10;

/// Chatty lead-ins some models insist on despite instructions.
static CAPTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(Here's|This is|Caption:)").expect("CAPTION_PREFIX regex"));

/// Style preferences for a generation request.
///
/// An immutable value passed per call; there is no process-wide
/// customization state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionOptions {
    /// OpenRouter model identifier.
    pub model: String,
    /// Tone of voice: casual, professional, inspirational, funny,
    /// educational, storytelling.
    pub tone: String,
    /// Caption structure: question, cta, tips, personal, facts, behind-scenes.
    pub style: String,
    /// Target length: short, medium, long.
    pub length: String,
    /// Free-text extra instruction appended to the prompt.
    pub pre_prompt: String,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            model: "google/gemma-2-9b-it:free".to_string(),
            tone: "casual".to_string(),
            style: "tips".to_string(),
            length: "medium".to_string(),
            pre_prompt: String::new(),
        }
    }
}

impl CaptionOptions {
    /// Token budget derived from the requested length.
    fn max_tokens(&self) -> u32 {
        match self.length.as_str() {
            "short" => 200,
            "long" => 400,
            _ => 300,
        }
    }
}

/// Input for one caption generation: the chosen image plus the extracted
/// page material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRequest {
    pub image_url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub url: String,
}

/// A generated caption with its pass-through context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionResponse {
    pub caption: String,
    pub image_url: String,
    pub title: String,
    pub url: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Client for the OpenRouter chat-completions endpoint.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
}

impl OpenRouterClient {
    /// Create a client holding the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), api_key: api_key.into() }
    }

    /// Generate a caption for an extracted page.
    ///
    /// Requires a non-empty image URL and title. The provider's output is
    /// trimmed, stripped of chatty lead-ins, and rejected outright when it
    /// is too short to be a usable caption.
    pub async fn generate(&self, request: &CaptionRequest, options: &CaptionOptions) -> Result<CaptionResponse> {
        if request.image_url.trim().is_empty() {
            return Err(PostprepError::MissingField("imageUrl"));
        }
        if request.title.trim().is_empty() {
            return Err(PostprepError::MissingField("title"));
        }

        let body = ChatRequest {
            model: options.model.clone(),
            messages: vec![ChatMessage { role: "user", content: build_prompt(request, options) }],
            max_tokens: options.max_tokens(),
            temperature: 0.8,
            top_p: 0.9,
        };

        tracing::debug!(model = %options.model, url = %request.url, "requesting caption");

        let response = self
            .client
            .post(OPENROUTER_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "caption provider returned an error");
            return Err(PostprepError::CaptionApi(format!("{status}: {detail}")));
        }

        let parsed: ChatResponse = response.json().await?;
        let raw = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PostprepError::CaptionRejected("response carried no choices".to_string()))?;

        let caption = polish_caption(&raw)?;

        Ok(CaptionResponse {
            caption,
            image_url: request.image_url.clone(),
            title: request.title.clone(),
            url: request.url.clone(),
        })
    }
}

/// Assemble the generation prompt from the extracted page and preferences.
///
/// Only the first 500 characters of page text are included; the full
/// excerpt adds token cost without improving captions.
fn build_prompt(request: &CaptionRequest, options: &CaptionOptions) -> String {
    let snippet: String = request.content.chars().take(500).collect();

    let mut prompt = format!(
        "Write an engaging Instagram caption for this content:\n\
         Title: \"{}\"\n\
         Content: \"{}...\"\n\
         Requirements:\n\
         - Write ONLY the Instagram caption text\n\
         - Make it {} in tone\n\
         - Use {} style\n\
         - Keep it {} length\n\
         - Include 3-5 relevant hashtags at the end\n\
         - Use emojis appropriately",
        request.title, snippet, options.tone, options.style, options.length
    );

    let extra = options.pre_prompt.trim();
    if !extra.is_empty() {
        prompt.push_str("\n- Additional instructions: ");
        prompt.push_str(extra);
    }
    prompt.push_str("\n\nInstagram caption:");

    prompt
}

/// Trim the model output, drop lead-in phrases, and enforce a minimum length.
fn polish_caption(raw: &str) -> Result<String> {
    let caption = CAPTION_PREFIX.replace(raw.trim(), "").trim().to_string();
    if caption.chars().count() < MIN_CAPTION_LEN {
        return Err(PostprepError::CaptionRejected(format!("caption too short: {caption:?}")));
    }
    Ok(caption)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CaptionRequest {
        CaptionRequest {
            image_url: "https://example.com/a.png".to_string(),
            title: "Sourdough Basics".to_string(),
            description: "A primer".to_string(),
            content: "Flour, water, salt, patience. ".repeat(40),
            url: "https://example.com/blog/sourdough".to_string(),
        }
    }

    #[test]
    fn test_options_defaults() {
        let options = CaptionOptions::default();
        assert_eq!(options.model, "google/gemma-2-9b-it:free");
        assert_eq!(options.tone, "casual");
        assert_eq!(options.style, "tips");
        assert_eq!(options.length, "medium");
        assert!(options.pre_prompt.is_empty());
    }

    #[test]
    fn test_max_tokens_follows_length() {
        let mut options = CaptionOptions::default();
        assert_eq!(options.max_tokens(), 300);
        options.length = "short".to_string();
        assert_eq!(options.max_tokens(), 200);
        options.length = "long".to_string();
        assert_eq!(options.max_tokens(), 400);
    }

    #[test]
    fn test_prompt_includes_preferences() {
        let mut options = CaptionOptions::default();
        options.tone = "professional".to_string();
        options.style = "question".to_string();

        let prompt = build_prompt(&request(), &options);
        assert!(prompt.contains("Sourdough Basics"));
        assert!(prompt.contains("professional in tone"));
        assert!(prompt.contains("question style"));
        assert!(prompt.ends_with("Instagram caption:"));
    }

    #[test]
    fn test_prompt_truncates_content_to_500_chars() {
        let prompt = build_prompt(&request(), &CaptionOptions::default());
        let content_line = prompt.lines().find(|l| l.starts_with("Content:")).unwrap();
        assert!(content_line.chars().count() < 520);
    }

    #[test]
    fn test_prompt_appends_extra_instruction() {
        let mut options = CaptionOptions::default();
        options.pre_prompt = "  mention the newsletter  ".to_string();
        let prompt = build_prompt(&request(), &options);
        assert!(prompt.contains("Additional instructions: mention the newsletter"));
    }

    #[test]
    fn test_polish_strips_lead_in() {
        let caption = polish_caption("Here's a lovely caption about bread #sourdough").unwrap();
        assert!(caption.starts_with("a lovely caption"));
    }

    #[test]
    fn test_polish_rejects_short_captions() {
        assert!(matches!(
            polish_caption("Caption: ok"),
            Err(PostprepError::CaptionRejected(_))
        ));
    }

    #[test]
    fn test_request_wire_names_are_camel_case() {
        let json = serde_json::to_value(request()).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("url").is_some());
    }
}

//! OpenAI-compatible chat completions oracle

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, instrument, warn};

use crate::error::BillingError;
use crate::oracle::{CaptionOracle, GeneratedContent, GenerationRequest, HashtagRequest};

const DEFAULT_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
const TEMPERATURE: f64 = 0.8;

/// AI gateway connection settings
#[derive(Clone)]
pub struct AiGatewayConfig {
    pub api_key: String,
    pub url: String,
    pub model: String,
    pub timeout: Duration,
}

impl AiGatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: DEFAULT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(45),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for AiGatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiGatewayConfig")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Captioning oracle backed by a chat completions endpoint
#[derive(Clone, Debug)]
pub struct AiGatewayOracle {
    client: Client,
    config: AiGatewayConfig,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct HashtagReply {
    hashtags: Vec<String>,
}

impl AiGatewayOracle {
    /// Create a new oracle client
    pub fn new(config: AiGatewayConfig) -> Result<Self, BillingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BillingError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Send a chat completion and return the first choice's text
    async fn complete(&self, messages: Value) -> Result<String, BillingError> {
        let body = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": TEMPERATURE,
        });

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "AI gateway request failed");
                BillingError::OracleError(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "AI gateway error");
            return Err(classify_status(status));
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse AI gateway response");
            BillingError::OracleError("invalid AI gateway response".to_string())
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| BillingError::OracleError("no content generated".to_string()))
    }
}

#[async_trait]
impl CaptionOracle for AiGatewayOracle {
    #[instrument(skip(self, request), fields(mood = %request.mood, has_image = request.image_data.is_some()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, BillingError> {
        let system = caption_system_prompt(request);
        let user = caption_user_prompt(request);

        let user_message = match &request.image_data {
            Some(data) => json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": user },
                    { "type": "image_url", "image_url": { "url": data } },
                ],
            }),
            None => json!({ "role": "user", "content": user }),
        };

        let content = self
            .complete(json!([{ "role": "system", "content": system }, user_message]))
            .await?;
        debug!(chars = content.len(), "Received caption reply");

        parse_generated(&content)
    }

    #[instrument(skip(self, request), fields(platform = ?request.platform))]
    async fn trending_hashtags(
        &self,
        request: &HashtagRequest,
    ) -> Result<Vec<String>, BillingError> {
        let guidance = request.platform.guidance();
        let system = format!(
            "You are a social media expert specializing in trending hashtags. \
Generate 8-10 currently trending and relevant hashtags for the given niche, mood, and platform. Focus on:
- Popular hashtags that are actively trending on {guidance}
- Platform-specific hashtags that perform well
- Niche-specific hashtags with good engagement
- Mix of broad and specific hashtags
- Hashtags that match the mood/tone
- Include the # symbol in each hashtag

Return ONLY a JSON object with this exact structure:
{{\"hashtags\": [\"#hashtag1\", \"#hashtag2\"]}}"
        );
        let user = format!(
            "Generate trending hashtags for:\nNiche: {}\nMood: {}\nPlatform: {guidance}\n\n\
Provide 8-10 trending hashtags optimized for {guidance}.",
            request.niche.trim(),
            request.mood,
        );

        let content = self
            .complete(json!([
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ]))
            .await?;

        parse_hashtags(&content)
    }
}

/// Map a non-success upstream status to an oracle error
pub fn classify_status(status: StatusCode) -> BillingError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => BillingError::RateLimited,
        StatusCode::PAYMENT_REQUIRED => BillingError::CreditsDepleted,
        other => BillingError::OracleError(format!("AI gateway error: {other}")),
    }
}

fn caption_system_prompt(request: &GenerationRequest) -> String {
    let mut lines = vec![
        "You are a creative social media content expert. Generate engaging captions and \
relevant hashtags for Instagram, Twitter, and other platforms."
            .to_string(),
        String::new(),
        "When generating:".to_string(),
        format!("- Captions should be {} in tone", request.mood),
        format!("- Content should be relevant to the {} niche", request.niche),
    ];

    if let Some(website) = &request.website {
        lines.push(format!("- Include or reference the website: {website}"));
    }
    if request.image_data.is_some() {
        lines.push("- Base the captions on what you see in the image/video provided".to_string());
    }

    let lengths = request.lengths().selected();
    lines.push(format!(
        "- Caption lengths to cover: {} (short is one sentence, medium two or three, long a short paragraph)",
        lengths.join(", ")
    ));
    lines.push("- Include 8-12 relevant, trending hashtags".to_string());
    lines.push("- Make hashtags specific and effective for reach".to_string());
    lines.push("- Generate 5 DIFFERENT caption variations with the same hashtags".to_string());

    match request.language_code() {
        "en" => lines.push("- Generate captions in English".to_string()),
        code => lines.push(format!("- Generate all captions in {code} language")),
    }

    lines.push(String::new());
    lines.push("Return ONLY a JSON object with this exact structure:".to_string());
    lines.push(
        r#"{"captions": ["Caption 1", "Caption 2", "Caption 3", "Caption 4", "Caption 5"], "hashtags": ["hashtag1", "hashtag2"]}"#
            .to_string(),
    );

    lines.join("\n")
}

fn caption_user_prompt(request: &GenerationRequest) -> String {
    let prompt = match &request.topic {
        Some(topic) => format!(
            "Generate 5 different {} social media captions about: {topic} (niche: {})",
            request.mood, request.niche
        ),
        None => format!(
            "Generate 5 different {} social media captions for {} niche",
            request.mood, request.niche
        ),
    };

    if request.image_data.is_some() {
        format!("Analyze this image/video and {}", prompt.to_lowercase())
    } else {
        prompt
    }
}

/// Body of the first fenced code block, preferring one tagged `json`
fn fenced_block(content: &str) -> Option<&str> {
    let (open, skip) = match content.find("```json") {
        Some(idx) => (idx, "```json".len()),
        None => (content.find("```")?, "```".len()),
    };
    let body = &content[open + skip..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Outermost `{...}` span
fn braced_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

/// Parse a caption reply that may be fenced, bare, or wrapped in prose
pub fn parse_generated(content: &str) -> Result<GeneratedContent, BillingError> {
    let candidates = [fenced_block(content), Some(content.trim()), braced_object(content)];

    let parsed = candidates
        .into_iter()
        .flatten()
        .find_map(|text| serde_json::from_str::<GeneratedContent>(text).ok())
        .ok_or_else(|| {
            warn!("Could not parse caption reply as JSON");
            BillingError::OracleError("failed to parse AI response".to_string())
        })?;

    if parsed.captions.is_empty() {
        return Err(BillingError::OracleError(
            "AI response contained no captions".to_string(),
        ));
    }

    Ok(parsed)
}

/// Parse a hashtag reply by extracting its JSON object
pub fn parse_hashtags(content: &str) -> Result<Vec<String>, BillingError> {
    let object = braced_object(content)
        .ok_or_else(|| BillingError::OracleError("no JSON found in AI response".to_string()))?;

    let reply: HashtagReply = serde_json::from_str(object)
        .map_err(|_| BillingError::OracleError("invalid hashtags format from AI".to_string()))?;

    Ok(reply.hashtags)
}

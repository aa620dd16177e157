//! Captioning oracle abstraction and request types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::BillingError;

const MAX_NICHE_CHARS: usize = 100;
const MAX_WEBSITE_CHARS: usize = 255;
const MAX_TOPIC_CHARS: usize = 1000;
const MAX_MOOD_CHARS: usize = 100;
const MAX_MEDIA_BYTES: usize = 20 * 1024 * 1024;

const MEDIA_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/quicktime",
];

/// Captioning oracle trait
///
/// Abstracts the AI service so the gateway can be driven by a test double.
/// Implementations report upstream throttling as [`BillingError::RateLimited`]
/// and exhausted credit as [`BillingError::CreditsDepleted`].
#[async_trait]
pub trait CaptionOracle: Send + Sync {
    /// Generate captions and hashtags
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, BillingError>;

    /// Suggest currently trending hashtags
    async fn trending_hashtags(&self, request: &HashtagRequest)
        -> Result<Vec<String>, BillingError>;
}

/// Tone of the generated captions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Playful,
    Professional,
    Inspirational,
    Casual,
    Energetic,
    Motivational,
    Educational,
    Celebratory,
}

impl Mood {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Playful => "playful",
            Self::Professional => "professional",
            Self::Inspirational => "inspirational",
            Self::Casual => "casual",
            Self::Energetic => "energetic",
            Self::Motivational => "motivational",
            Self::Educational => "educational",
            Self::Celebratory => "celebratory",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which caption lengths the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptionLengths {
    #[serde(default)]
    pub short: bool,
    #[serde(default)]
    pub medium: bool,
    #[serde(default)]
    pub long: bool,
}

impl CaptionLengths {
    /// Whether at least one length is selected
    pub fn any(&self) -> bool {
        self.short || self.medium || self.long
    }

    /// Selected lengths, in ascending order
    pub fn selected(&self) -> Vec<&'static str> {
        [
            (self.short, "short"),
            (self.medium, "medium"),
            (self.long, "long"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

impl Default for CaptionLengths {
    fn default() -> Self {
        Self {
            short: true,
            medium: true,
            long: true,
        }
    }
}

/// Caption generation input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerationRequest {
    #[serde(default)]
    pub topic: Option<String>,
    pub mood: Mood,
    pub niche: String,
    #[serde(default)]
    pub website: Option<String>,
    /// `data:` URL of an image or video
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub caption_lengths: Option<CaptionLengths>,
}

impl GenerationRequest {
    /// Minimal request for a niche and mood
    pub fn new(niche: impl Into<String>, mood: Mood) -> Self {
        Self {
            topic: None,
            mood,
            niche: niche.into(),
            website: None,
            image_data: None,
            language: None,
            caption_lengths: None,
        }
    }

    /// Trim text fields and drop empty optionals
    pub fn normalized(mut self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        self.niche = self.niche.trim().to_string();
        self.topic = clean(self.topic);
        self.website = clean(self.website);
        self.image_data = clean(self.image_data);
        self.language = clean(self.language);
        self
    }

    /// Check every field, returning the first offending one
    pub fn validate(&self) -> Result<(), BillingError> {
        validate_niche(&self.niche)?;

        if let Some(website) = &self.website {
            if website.chars().count() > MAX_WEBSITE_CHARS {
                return Err(BillingError::validation(
                    "website",
                    format!("must be at most {MAX_WEBSITE_CHARS} characters"),
                ));
            }
            if !website.chars().all(is_url_char) {
                return Err(BillingError::validation(
                    "website",
                    "contains invalid characters",
                ));
            }
        }

        if let Some(topic) = &self.topic {
            if topic.chars().count() > MAX_TOPIC_CHARS {
                return Err(BillingError::validation(
                    "topic",
                    format!("must be at most {MAX_TOPIC_CHARS} characters"),
                ));
            }
        }

        if let Some(language) = &self.language {
            if language.len() != 2 || !language.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(BillingError::validation(
                    "language",
                    "must be a two-letter language code",
                ));
            }
        }

        if let Some(lengths) = &self.caption_lengths {
            if !lengths.any() {
                return Err(BillingError::validation(
                    "captionLengths",
                    "select at least one caption length",
                ));
            }
        }

        if let Some(data) = &self.image_data {
            validate_media(data)?;
        }

        Ok(())
    }

    /// Language code, `en` when unset
    pub fn language_code(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }

    /// Requested caption lengths, all when unset
    pub fn lengths(&self) -> CaptionLengths {
        self.caption_lengths.unwrap_or_default()
    }
}

/// Captions and hashtags produced by the oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub captions: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Platform to tailor trending hashtags for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    All,
    Instagram,
    Tiktok,
    Twitter,
}

impl Platform {
    /// Prompt wording for the platform
    pub const fn guidance(&self) -> &'static str {
        match self {
            Self::All => "Instagram, TikTok, and Twitter",
            Self::Instagram => "Instagram (focus on visual content, aesthetics, and community)",
            Self::Tiktok => "TikTok (focus on viral trends, challenges, and entertainment)",
            Self::Twitter => "Twitter (focus on conversations, news, and concise messaging)",
        }
    }
}

/// Trending hashtag lookup input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HashtagRequest {
    pub niche: String,
    pub mood: String,
    #[serde(default)]
    pub platform: Platform,
}

impl HashtagRequest {
    /// Check every field, returning the first offending one
    pub fn validate(&self) -> Result<(), BillingError> {
        let niche = self.niche.trim();
        if niche.is_empty() || niche.chars().count() > MAX_NICHE_CHARS {
            return Err(BillingError::validation(
                "niche",
                format!("must be 1 to {MAX_NICHE_CHARS} characters"),
            ));
        }
        if self.mood.chars().count() > MAX_MOOD_CHARS {
            return Err(BillingError::validation(
                "mood",
                format!("must be at most {MAX_MOOD_CHARS} characters"),
            ));
        }
        Ok(())
    }
}

fn validate_niche(niche: &str) -> Result<(), BillingError> {
    let len = niche.chars().count();
    if len == 0 || len > MAX_NICHE_CHARS {
        return Err(BillingError::validation(
            "niche",
            format!("must be 1 to {MAX_NICHE_CHARS} characters"),
        ));
    }
    let allowed =
        |c: char| c.is_ascii_alphanumeric() || c.is_whitespace() || "-_,.!&".contains(c);
    if !niche.chars().all(allowed) {
        return Err(BillingError::validation(
            "niche",
            "contains invalid characters",
        ));
    }
    Ok(())
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:/?#[]@!$&'()*+,;=".contains(c)
}

fn validate_media(data: &str) -> Result<(), BillingError> {
    let invalid = || BillingError::validation("imageData", "must be an image or video data URL");

    let rest = data.strip_prefix("data:").ok_or_else(invalid)?;
    let (meta, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let (mime, encoding) = meta.split_once(';').ok_or_else(invalid)?;

    if encoding != "base64" {
        return Err(invalid());
    }
    if !MEDIA_TYPES.contains(&mime.to_ascii_lowercase().as_str()) {
        return Err(BillingError::validation(
            "imageData",
            "unsupported media type, use JPG, PNG, GIF, WEBP, MP4 or MOV",
        ));
    }

    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    let decoded = (payload.len() / 4 * 3).saturating_sub(padding);
    if decoded > MAX_MEDIA_BYTES {
        return Err(BillingError::validation(
            "imageData",
            "file must be smaller than 20MB",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: BillingError) -> &'static str {
        match err {
            BillingError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_request_is_valid() {
        let req = GenerationRequest::new("fitness & health", Mood::Energetic);
        assert!(req.validate().is_ok());
        assert_eq!(req.language_code(), "en");
        assert_eq!(req.lengths().selected(), vec!["short", "medium", "long"]);
    }

    #[test]
    fn test_niche_rules() {
        let mut req = GenerationRequest::new("", Mood::Casual);
        assert_eq!(field_of(req.validate().unwrap_err()), "niche");

        req.niche = "a".repeat(101);
        assert_eq!(field_of(req.validate().unwrap_err()), "niche");

        req.niche = "food<script>".to_string();
        assert_eq!(field_of(req.validate().unwrap_err()), "niche");

        req.niche = "a".repeat(100);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_normalized_trims_and_drops_empty() {
        let mut req = GenerationRequest::new("  travel  ", Mood::Playful);
        req.website = Some("   ".to_string());
        req.topic = Some(" beaches ".to_string());
        let req = req.normalized();
        assert_eq!(req.niche, "travel");
        assert_eq!(req.website, None);
        assert_eq!(req.topic.as_deref(), Some("beaches"));
    }

    #[test]
    fn test_website_rules() {
        let mut req = GenerationRequest::new("tech", Mood::Professional);
        req.website = Some("https://example.com/path?q=1&x=y".to_string());
        assert!(req.validate().is_ok());

        req.website = Some("https://exa mple.com".to_string());
        assert_eq!(field_of(req.validate().unwrap_err()), "website");

        req.website = Some(format!("https://{}", "a".repeat(250)));
        assert_eq!(field_of(req.validate().unwrap_err()), "website");
    }

    #[test]
    fn test_language_and_lengths() {
        let mut req = GenerationRequest::new("tech", Mood::Professional);
        req.language = Some("eng".to_string());
        assert_eq!(field_of(req.validate().unwrap_err()), "language");

        req.language = Some("hi".to_string());
        req.caption_lengths = Some(CaptionLengths {
            short: false,
            medium: false,
            long: false,
        });
        assert_eq!(field_of(req.validate().unwrap_err()), "captionLengths");
    }

    #[test]
    fn test_media_rules() {
        let mut req = GenerationRequest::new("art", Mood::Inspirational);
        req.image_data = Some("data:image/png;base64,iVBORw0KGgo=".to_string());
        assert!(req.validate().is_ok());

        req.image_data = Some("data:video/mp4;base64,AAAA".to_string());
        assert!(req.validate().is_ok());

        req.image_data = Some("https://example.com/cat.png".to_string());
        assert_eq!(field_of(req.validate().unwrap_err()), "imageData");

        req.image_data = Some("data:application/pdf;base64,AAAA".to_string());
        assert_eq!(field_of(req.validate().unwrap_err()), "imageData");

        let oversized = "A".repeat((MAX_MEDIA_BYTES / 3 + 2) * 4);
        req.image_data = Some(format!("data:image/jpeg;base64,{oversized}"));
        assert_eq!(field_of(req.validate().unwrap_err()), "imageData");
    }

    #[test]
    fn test_request_rejects_unknown_fields() {
        let json = r#"{"mood":"casual","niche":"food","tier":"yearly"}"#;
        assert!(serde_json::from_str::<GenerationRequest>(json).is_err());

        let json = r#"{"mood":"sarcastic","niche":"food"}"#;
        assert!(serde_json::from_str::<GenerationRequest>(json).is_err());

        let json = r#"{"mood":"casual","niche":"food","captionLengths":{"short":true}}"#;
        let req: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.lengths().selected(), vec!["short"]);
    }

    #[test]
    fn test_hashtag_request_defaults_platform() {
        let req: HashtagRequest =
            serde_json::from_str(r#"{"niche":"fitness","mood":"energetic"}"#).unwrap();
        assert_eq!(req.platform, Platform::All);
        assert!(req.validate().is_ok());

        let bad = HashtagRequest {
            niche: " ".to_string(),
            mood: "calm".to_string(),
            platform: Platform::Tiktok,
        };
        assert!(bad.validate().is_err());
    }
}

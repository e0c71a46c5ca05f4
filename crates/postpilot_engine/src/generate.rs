use pilot_logging::{excerpt, pilot_debug, pilot_info};
use serde::{Deserialize, Serialize};

use crate::config::{require, GEMINI_API_KEY};
use crate::http::{build_client, check_status, map_reqwest_error};
use crate::{EngineConfig, ServiceError, Target};

pub(crate) const SERVICE: &str = "Gemini";

#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Free-form post text from a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;

    /// Rewrites `text` as a single post for `target`.
    async fn refine(&self, text: &str, target: Target) -> Result<String, ServiceError>;
}

/// Instructions wrapped around the user's draft when refining it.
pub fn refinement_prompt(text: &str, target: Target) -> String {
    let limit = target.char_limit();
    let (kind, platform, communities) = match target {
        Target::Microblog => (
            "tweet",
            "the X platform",
            "#buildinpublic, #100DaysOfCode, #techtwitter",
        ),
        Target::Forum => (
            "Reddit post title",
            "a Reddit community",
            "#programming, #MachineLearning, #startups",
        ),
    };
    format!(
        "Act as an expert social media manager. Your task is to take the following text and refine it into a single, highly engaging {kind} for {platform}.\n\
         \n\
         Your response MUST follow these rules:\n\
         1. The final text MUST be {limit} characters or less.\n\
         2. Rewrite the text to be more concise, clear, and impactful.\n\
         3. Add 3-5 relevant and popular hashtags to maximize reach.\n\
         4. If appropriate, include hashtags that represent relevant communities (e.g., {communities}).\n\
         5. Do NOT add any commentary, explanations, or labels. Your output must be ONLY the final {kind} text.\n\
         \n\
         Here is the text to refine:\n\
         ---\n\
         {text}\n\
         ---\n"
    )
}

/// Generated text minus surrounding whitespace and markdown emphasis.
pub fn clean_generated(raw: &str) -> String {
    raw.trim().replace('*', "")
}

/// Refined text additionally loses the quotes models like to wrap it in.
pub fn clean_refined(raw: &str) -> String {
    raw.trim().replace(['"', '*'], "")
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, ServiceError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        if !text.trim().is_empty() {
            return Ok(text);
        }
        let reason = self
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .map(|reason| format!("prompt blocked: {reason}"))
            .unwrap_or_else(|| "model returned no text".to_string());
        Err(ServiceError::Rejected {
            service: SERVICE,
            message: reason,
        })
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &EngineConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            api_key: config.credentials.gemini_api_key.clone(),
            model: config.model.clone(),
            base_url: config.endpoints.gemini.trim_end_matches('/').to_string(),
            client: build_client(SERVICE, &config.http)?,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let api_key = require(&self.api_key, GEMINI_API_KEY)?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };

        pilot_debug!("Gemini request model={} prompt={}", self.model, excerpt(prompt));
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| map_reqwest_error(SERVICE, err))?;
        let response = check_status(SERVICE, response).await?;
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| map_reqwest_error(SERVICE, err))?;
        body.into_text()
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let text = clean_generated(&self.complete(prompt).await?);
        pilot_info!("Received generated draft ({} chars)", text.chars().count());
        Ok(text)
    }

    async fn refine(&self, text: &str, target: Target) -> Result<String, ServiceError> {
        let prompt = refinement_prompt(text, target);
        let refined = clean_refined(&self.complete(&prompt).await?);
        pilot_info!(
            "Received refined {} text ({} chars)",
            target,
            refined.chars().count()
        );
        Ok(refined)
    }
}

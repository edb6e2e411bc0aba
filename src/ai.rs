use std::env;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    BusinessProfile, PitchAssessment, PitchResult, RoadmapAssessment, RoadmapResult,
    StrategyAssessment, StrategyResult,
};

/// Classified gateway failures. Nothing here is retried automatically;
/// every call site maps one of these to a single user-visible message and
/// leaves previously persisted data untouched.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("{0} environment variable not set. Set it with: export {0}=your-key-here")]
    MissingCredential(&'static str),
    #[error("model '{model}' is unavailable: {detail}")]
    ModelUnavailable { model: String, detail: String },
    #[error("could not parse the model's response: {0}. Try again.")]
    MalformedResponse(String),
    #[error("rate limited by the provider. Wait a moment and try again.")]
    RateLimited,
    #[error("generation failed: {0}")]
    Unknown(String),
}

// --- Provider trait ---

pub trait AiProvider {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError>;
    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub provider: ProviderKind,
    pub model_id: String,
    pub short_name: String,
}

pub fn resolve_model(name: &str) -> Result<ModelSpec, AiError> {
    match name {
        // Anthropic (requires ANTHROPIC_API_KEY)
        "api-sonnet" | "sonnet" => Ok(ModelSpec {
            provider: ProviderKind::Anthropic,
            model_id: "claude-sonnet-4-5-20250929".to_string(),
            short_name: "sonnet".to_string(),
        }),
        "api-opus" | "opus" => Ok(ModelSpec {
            provider: ProviderKind::Anthropic,
            model_id: "claude-opus-4-1-20250805".to_string(),
            short_name: "opus".to_string(),
        }),
        "api-haiku" | "haiku" => Ok(ModelSpec {
            provider: ProviderKind::Anthropic,
            model_id: "claude-haiku-4-5-20251001".to_string(),
            short_name: "haiku".to_string(),
        }),
        // OpenAI (requires OPENAI_API_KEY)
        "gpt-4o" => Ok(ModelSpec {
            provider: ProviderKind::OpenAi,
            model_id: "gpt-4o".to_string(),
            short_name: "gpt-4o".to_string(),
        }),
        "gpt-4o-mini" => Ok(ModelSpec {
            provider: ProviderKind::OpenAi,
            model_id: "gpt-4o-mini".to_string(),
            short_name: "gpt-4o-mini".to_string(),
        }),
        _ => Err(AiError::Unknown(format!(
            "Unknown model '{}'. Available: sonnet (default), opus, haiku, gpt-4o, gpt-4o-mini",
            name
        ))),
    }
}

pub fn create_provider(spec: &ModelSpec) -> Result<Box<dyn AiProvider>, AiError> {
    match spec.provider {
        ProviderKind::Anthropic => Ok(Box::new(AnthropicProvider::new(spec.model_id.clone())?)),
        ProviderKind::OpenAi => Ok(Box::new(OpenAiProvider::new(spec.model_id.clone())?)),
    }
}

fn classify_http_failure(
    env_var: &'static str,
    model: &str,
    status: reqwest::StatusCode,
    body: String,
) -> AiError {
    match status.as_u16() {
        401 | 403 => AiError::MissingCredential(env_var),
        404 | 500 | 502 | 503 | 529 => AiError::ModelUnavailable {
            model: model.to_string(),
            detail: format!("HTTP {status}: {body}"),
        },
        429 => AiError::RateLimited,
        _ => AiError::Unknown(format!("HTTP {status}: {body}")),
    }
}

// --- Anthropic provider ---

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug)]
pub struct AnthropicProvider {
    api_key: String,
    model_id: String,
    client: reqwest::blocking::Client,
}

impl AnthropicProvider {
    pub fn new(model_id: String) -> Result<Self, AiError> {
        let api_key =
            env::var(ANTHROPIC_KEY_VAR).map_err(|_| AiError::MissingCredential(ANTHROPIC_KEY_VAR))?;
        let client = reqwest::blocking::Client::new();
        Ok(Self {
            api_key,
            model_id,
            client,
        })
    }
}

impl AiProvider for AnthropicProvider {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError> {
        let request = AnthropicRequest {
            model: self.model_id.clone(),
            max_tokens,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| AiError::ModelUnavailable {
                model: self.model_id.clone(),
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(classify_http_failure(
                ANTHROPIC_KEY_VAR,
                &self.model_id,
                status,
                body,
            ));
        }

        let api_response: AnthropicResponse = response
            .json()
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        api_response
            .content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| AiError::MalformedResponse("no content blocks in response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

// --- OpenAI provider ---

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<OpenAiMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug)]
pub struct OpenAiProvider {
    api_key: String,
    model_id: String,
    client: reqwest::blocking::Client,
}

impl OpenAiProvider {
    pub fn new(model_id: String) -> Result<Self, AiError> {
        let api_key =
            env::var(OPENAI_KEY_VAR).map_err(|_| AiError::MissingCredential(OPENAI_KEY_VAR))?;
        let client = reqwest::blocking::Client::new();
        Ok(Self {
            api_key,
            model_id,
            client,
        })
    }
}

impl AiProvider for OpenAiProvider {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError> {
        let request = OpenAiRequest {
            model: self.model_id.clone(),
            max_tokens,
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| AiError::ModelUnavailable {
                model: self.model_id.clone(),
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(classify_http_failure(
                OPENAI_KEY_VAR,
                &self.model_id,
                status,
                body,
            ));
        }

        let api_response: OpenAiResponse = response
            .json()
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        api_response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| AiError::MalformedResponse("no choices in response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

// --- JSON extraction ---

/// Models wrap JSON in markdown fences or prose more often than not.
/// Strip fences, find the first balanced `{...}` or `[...]`, and parse it;
/// anything less than that is a malformed response.
pub fn extract_json(raw: &str) -> Result<Value, AiError> {
    let stripped = strip_code_fences(raw);
    let candidate = first_balanced_json(stripped).ok_or_else(|| {
        AiError::MalformedResponse("no JSON object or array in response".to_string())
    })?;
    serde_json::from_str(candidate).map_err(|e| AiError::MalformedResponse(e.to_string()))
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, then everything after the closing fence.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn first_balanced_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => stack.push(c),
            '}' | ']' => {
                let opener = stack.pop()?;
                if (c == '}') != (opener == '{') {
                    return None;
                }
                if stack.is_empty() {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

// --- Generation ---

/// One gateway call: prompt plus an optional response-shape hint and a
/// grounding flag that asks the model to stick to verifiable facts.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub schema_hint: Option<String>,
    pub grounded: bool,
}

pub fn generate(provider: &dyn AiProvider, request: &GenerateRequest) -> Result<Value, AiError> {
    let mut prompt = request.prompt.clone();
    match &request.schema_hint {
        Some(hint) => prompt.push_str(&format!(
            "\n\nRespond with ONLY a JSON value of exactly this shape, no prose:\n{hint}"
        )),
        None => prompt.push_str("\n\nRespond with ONLY JSON, no prose."),
    }
    if request.grounded {
        prompt.push_str("\nStick to widely verifiable facts; do not invent specifics.");
    }
    let raw = provider.complete(&prompt, 4096)?;
    extract_json(&raw)
}

/// Parse-then-validate: the extracted JSON must match the endpoint's
/// response struct, otherwise the call is treated as malformed rather than
/// letting a duck-typed shape leak into the store.
fn generate_typed<T: DeserializeOwned>(
    provider: &dyn AiProvider,
    prompt: String,
    schema_hint: &str,
) -> Result<T, AiError> {
    let value = generate(
        provider,
        &GenerateRequest {
            prompt,
            schema_hint: Some(schema_hint.to_string()),
            grounded: false,
        },
    )?;
    serde_json::from_value(value).map_err(|e| AiError::MalformedResponse(e.to_string()))
}

// --- Typed endpoints ---

pub fn generate_roadmap(
    provider: &dyn AiProvider,
    assessment: &RoadmapAssessment,
) -> Result<RoadmapResult, AiError> {
    let answers =
        serde_json::to_string_pretty(assessment).map_err(|e| AiError::Unknown(e.to_string()))?;
    let prompt = format!(
        "You are a startup coach for career changers. Build a practical launch \
        roadmap for the business described by this assessment. Respect the \
        stated weekly time budget and income urgency; milestones must be \
        small enough to finish inside their timeframe.\n\n\
        Assessment:\n{}",
        answers
    );
    generate_typed(
        provider,
        prompt,
        r#"{"summary": "...", "milestones": [{"title": "...", "description": "...", "timeframe": "..."}]}"#,
    )
}

pub fn generate_pitch(
    provider: &dyn AiProvider,
    assessment: &PitchAssessment,
) -> Result<PitchResult, AiError> {
    let answers =
        serde_json::to_string_pretty(assessment).map_err(|e| AiError::Unknown(e.to_string()))?;
    let prompt = format!(
        "Write an investor pitch for this business. Keep the elevator pitch \
        under three sentences and make the ask concrete.\n\n\
        Business:\n{}",
        answers
    );
    generate_typed(
        provider,
        prompt,
        r#"{"elevator_pitch": "...", "problem": "...", "solution": "...", "ask": "..."}"#,
    )
}

pub fn generate_revenue_strategies(
    provider: &dyn AiProvider,
    assessment: &StrategyAssessment,
) -> Result<StrategyResult, AiError> {
    let answers =
        serde_json::to_string_pretty(assessment).map_err(|e| AiError::Unknown(e.to_string()))?;
    let prompt = format!(
        "Propose 3-5 revenue strategies for this business, ordered from \
        fastest to slowest path to first dollar. Each needs a first step the \
        founder can do this week.\n\n\
        Business:\n{}",
        answers
    );
    generate_typed(
        provider,
        prompt,
        r#"{"strategies": [{"name": "...", "description": "...", "first_step": "..."}]}"#,
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameIdea {
    pub name: String,
    pub rationale: String,
}

pub fn generate_business_names(
    provider: &dyn AiProvider,
    description: &str,
    vibe: Option<&str>,
) -> Result<Vec<NameIdea>, AiError> {
    let vibe = vibe.unwrap_or("memorable and professional");
    let prompt = format!(
        "Suggest 8 business names for the venture below. Names should be {}, \
        easy to spell, and plausibly available as a .com domain.\n\n\
        Venture: {}",
        vibe, description
    );
    generate_typed(
        provider,
        prompt,
        r#"[{"name": "...", "rationale": "..."}]"#,
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogoConcept {
    pub style: String,
    pub image_ref: String,
}

pub fn generate_logo_concept(
    provider: &dyn AiProvider,
    profile: &BusinessProfile,
    style: &str,
) -> Result<LogoConcept, AiError> {
    let prompt = format!(
        "Describe a logo concept for '{}' ({} business) in a {} style. \
        image_ref must be a complete prompt an image model could render the \
        logo from.",
        profile.business_name, profile.business_type, style
    );
    generate_typed(
        provider,
        prompt,
        r#"{"style": "...", "image_ref": "..."}"#,
    )
}

/// Free-text endpoint; no JSON extraction.
pub fn rewrite_resume(
    provider: &dyn AiProvider,
    resume_text: &str,
    job_description: &str,
) -> Result<String, AiError> {
    let prompt = format!(
        "You are an expert resume writer. Rewrite this resume tailored to the \
        job below. Stay 100% truthful — only use facts from the provided \
        resume. Return the complete rewritten resume in markdown, nothing \
        else.\n\n\
        Job description:\n{}\n\n\
        Resume:\n{}",
        job_description, resume_text
    );
    provider.complete(&prompt, 8192)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessType, IncomeUrgency, Stage};

    struct CannedProvider {
        response: String,
    }

    impl AiProvider for CannedProvider {
        fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, AiError> {
            Ok(self.response.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn assessment() -> RoadmapAssessment {
        RoadmapAssessment {
            business_name: "Acme".to_string(),
            business_type: BusinessType::Product,
            stage: Stage::IdeaOnly,
            time_available_per_week: "10 hours".to_string(),
            income_urgency: IncomeUrgency::Immediate,
            existing_assets: vec![],
        }
    }

    #[test]
    fn test_resolve_model_known_and_unknown() {
        let spec = resolve_model("sonnet").unwrap();
        assert!(matches!(spec.provider, ProviderKind::Anthropic));
        assert_eq!(spec.short_name, "sonnet");

        let spec = resolve_model("api-sonnet").unwrap();
        assert_eq!(spec.model_id, "claude-sonnet-4-5-20250929");

        let spec = resolve_model("api-haiku").unwrap();
        assert!(matches!(spec.provider, ProviderKind::Anthropic));

        let spec = resolve_model("gpt-4o").unwrap();
        assert!(matches!(spec.provider, ProviderKind::OpenAi));

        assert!(resolve_model("gpt-3").is_err());
    }

    #[test]
    fn test_anthropic_provider_requires_api_key() {
        let original = env::var(ANTHROPIC_KEY_VAR).ok();
        unsafe {
            env::remove_var(ANTHROPIC_KEY_VAR);
        }

        let result = AnthropicProvider::new("claude-sonnet-4-5-20250929".to_string());

        if let Some(val) = original {
            unsafe {
                env::set_var(ANTHROPIC_KEY_VAR, val);
            }
        }

        assert!(matches!(result, Err(AiError::MissingCredential(var)) if var == ANTHROPIC_KEY_VAR));
    }

    #[test]
    fn test_openai_provider_requires_api_key() {
        let original = env::var(OPENAI_KEY_VAR).ok();
        unsafe {
            env::remove_var(OPENAI_KEY_VAR);
        }

        let result = OpenAiProvider::new("gpt-4o".to_string());

        if let Some(val) = original {
            unsafe {
                env::set_var(OPENAI_KEY_VAR, val);
            }
        }

        assert!(matches!(result, Err(AiError::MissingCredential(var)) if var == OPENAI_KEY_VAR));
    }

    #[test]
    fn test_extract_json_plain_object() {
        let value = extract_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_extract_json_strips_code_fences() {
        let raw = "```json\n{\"a\": [1, 2]}\n```";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["a"][1], 2);
    }

    #[test]
    fn test_extract_json_skips_surrounding_prose() {
        let raw = "Sure! Here is the plan:\n{\"summary\": \"go\"} Hope that helps.";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["summary"], "go");
    }

    #[test]
    fn test_extract_json_array() {
        let value = extract_json("here: [1, 2, 3] done").unwrap();
        assert_eq!(value, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_extract_json_braces_inside_strings() {
        let raw = r#"{"text": "a } inside \" quotes", "n": 1}"#;
        let value = extract_json(raw).unwrap();
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn test_extract_json_truncated_is_malformed() {
        assert!(matches!(
            extract_json(r#"{"a": [1, 2"#),
            Err(AiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_extract_json_no_json_is_malformed() {
        assert!(matches!(
            extract_json("I could not produce a plan."),
            Err(AiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_generate_roadmap_parses_valid_shape() {
        let provider = CannedProvider {
            response: r#"```json
{"summary": "Ship it", "milestones": [{"title": "Landing page", "description": "Validate", "timeframe": "Week 1"}]}
```"#
                .to_string(),
        };
        let result = generate_roadmap(&provider, &assessment()).unwrap();
        assert_eq!(result.summary, "Ship it");
        assert_eq!(result.milestones.len(), 1);
        assert_eq!(result.milestones[0].title, "Landing page");
    }

    #[test]
    fn test_generate_roadmap_shape_mismatch_is_malformed() {
        // Valid JSON, wrong shape: must be rejected before it can reach the store.
        let provider = CannedProvider {
            response: r#"{"plan": "wing it"}"#.to_string(),
        };
        assert!(matches!(
            generate_roadmap(&provider, &assessment()),
            Err(AiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_generate_business_names_parses_array() {
        let provider = CannedProvider {
            response: r#"[{"name": "Acme", "rationale": "classic"}]"#.to_string(),
        };
        let ideas = generate_business_names(&provider, "a tool shop", None).unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].name, "Acme");
    }
}

//! The hosted generative-AI collaborator. The platform only constructs
//! prompts, optionally declares a strict JSON response schema, and parses
//! what comes back; latency, availability and correctness belong to the
//! remote service. Chat call sites degrade to [`FALLBACK_REPLY`] on failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{AiHelpResponse, SERVICE_CATEGORIES};

/// Shown in place of a chat reply when the collaborator is unreachable.
pub const FALLBACK_REPLY: &str =
    "Desculpe, estou com problemas para responder agora. Tente novamente mais tarde.";

#[async_trait]
pub trait AiAssistant: Send + Sync {
    /// Analyze a user's problem description into the structured help payload.
    async fn analyze_problem(&self, problem: &str) -> AppResult<AiHelpResponse>;

    /// Free-form conversation under a caller-supplied persona/context.
    async fn converse(&self, context: &str, message: &str) -> AppResult<String>;
}

pub struct GeminiAssistant {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GeminiAssistant {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_url: config.gemini_api_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        }
    }

    async fn generate(
        &self,
        prompt: String,
        schema: Option<serde_json::Value>,
    ) -> AppResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_url, self.model, self.api_key
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: schema.map(|response_schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema,
            }),
        };

        let resp: GenerateResponse = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("User-Agent", "tiaoservice/0.1")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Assistant(format!("Gemini request failed: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::Assistant(format!("Gemini parse failed: {e}")))?;

        resp.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AppError::Assistant("Gemini returned no candidates".to_string()))
    }
}

#[async_trait]
impl AiAssistant for GeminiAssistant {
    async fn analyze_problem(&self, problem: &str) -> AppResult<AiHelpResponse> {
        let response = self
            .generate(analysis_prompt(problem), Some(help_schema()))
            .await?;
        parse_help_response(&response)
    }

    async fn converse(&self, context: &str, message: &str) -> AppResult<String> {
        self.generate(format!("{context}\n\n{message}"), None).await
    }
}

fn analysis_prompt(problem: &str) -> String {
    format!(
        "Um usuário da plataforma \"TiãoService\" descreveu o seguinte problema: \"{problem}\".\n\
         Analise o problema e responda em JSON conforme o schema. Indique se é uma emergência \
         (risco à vida, vazamento de gás, fiação exposta — nesse caso oriente ligar 190 Polícia, \
         192 SAMU ou 193 Bombeiros), se o usuário consegue resolver sozinho com passos simples, \
         e se vale a pena contratar um profissional. As categorias recomendadas devem estar \
         entre: {}. Seja conciso.",
        SERVICE_CATEGORIES.join(", ")
    )
}

fn help_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "is_emergency": { "type": "BOOLEAN" },
            "is_diy": { "type": "BOOLEAN" },
            "solution_steps": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "step": { "type": "INTEGER" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["step", "description"]
                }
            },
            "recommend_professional": { "type": "BOOLEAN" },
            "recommended_categories": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "professional_reasoning": { "type": "STRING" },
            "disclaimer": { "type": "STRING" }
        },
        "required": ["is_emergency", "is_diy", "recommend_professional"]
    })
}

fn parse_help_response(text: &str) -> AppResult<AiHelpResponse> {
    serde_json::from_str(strip_code_fences(text))
        .map_err(|e| AppError::Assistant(format!("Malformed help response: {e}")))
}

/// Models sometimes wrap JSON answers in a markdown code fence even when a
/// JSON mime type was requested.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_json() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\": 1}");
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn parses_fenced_help_response() {
        let text = r#"```json
        {
            "is_emergency": false,
            "is_diy": true,
            "solution_steps": [{"step": 1, "description": "Feche o registro."}],
            "recommend_professional": true,
            "recommended_categories": ["Encanador"],
            "professional_reasoning": "O entupimento pode ser profundo.",
            "disclaimer": "Cuidado com água quente."
        }
        ```"#;

        let parsed = parse_help_response(text).unwrap();
        assert!(parsed.is_diy);
        assert_eq!(parsed.recommended_categories, vec!["Encanador"]);
        assert_eq!(parsed.solution_steps.len(), 1);
    }

    #[test]
    fn missing_optional_fields_default() {
        let parsed =
            parse_help_response(r#"{"is_emergency":true,"is_diy":false,"recommend_professional":false}"#)
                .unwrap();
        assert!(parsed.is_emergency);
        assert!(parsed.solution_steps.is_empty());
        assert!(parsed.recommended_categories.is_empty());
    }

    #[test]
    fn malformed_response_is_an_assistant_error() {
        assert!(matches!(
            parse_help_response("not json"),
            Err(AppError::Assistant(_))
        ));
    }

    #[test]
    fn analysis_prompt_carries_the_category_list() {
        let prompt = analysis_prompt("pia entupida");
        for category in SERVICE_CATEGORIES {
            assert!(prompt.contains(category));
        }
        assert!(prompt.contains("pia entupida"));
    }
}

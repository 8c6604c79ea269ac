use anyhow::{Context, Result};
use rig::client::completion::CompletionClientDyn;
use rig::client::{ProviderClient, ProviderValue};
use rig::completion::Prompt;
use rig::providers::{
    anthropic, deepseek, gemini, groq, mistral, ollama, openai, openrouter, together, xai,
};

use crate::config::LlmConfig;
use crate::errors::GenerationError;
use crate::services::generator::{CompletionBackend, CompletionRequest, ResponseSchema};

/// Providers whose chat endpoint accepts `response_format: json_object`.
/// OpenAI is handled separately: rig drives it through the Responses API.
const JSON_MODE_PROVIDERS: &[&str] = &["groq", "deepseek", "mistral", "openrouter", "together", "xai"];

fn create_provider_boxed(provider: &str, api_key: &str) -> Result<Box<dyn ProviderClient>> {
    let value = ProviderValue::Simple(api_key.to_string());

    let boxed: Box<dyn ProviderClient> = match provider.to_lowercase().as_str() {
        "openai" => {
            let c: openai::Client<reqwest::Client> = openai::Client::from_val(value);
            c.boxed()
        }
        "anthropic" => {
            let c: anthropic::Client<reqwest::Client> = anthropic::Client::from_val(value);
            c.boxed()
        }
        "groq" => {
            let c: groq::Client<reqwest::Client> = groq::Client::from_val(value);
            c.boxed()
        }
        "deepseek" => {
            let c: deepseek::Client<reqwest::Client> = deepseek::Client::from_val(value);
            c.boxed()
        }
        "gemini" | "google" => {
            let c: gemini::Client<reqwest::Client> = gemini::Client::from_val(value);
            c.boxed()
        }
        "mistral" => {
            let c: mistral::Client<reqwest::Client> = mistral::Client::from_val(value);
            c.boxed()
        }
        "openrouter" => {
            let c: openrouter::Client<reqwest::Client> = openrouter::Client::from_val(value);
            c.boxed()
        }
        "together" => {
            let c: together::Client<reqwest::Client> = together::Client::from_val(value);
            c.boxed()
        }
        "xai" => {
            let c: xai::Client<reqwest::Client> = xai::Client::from_val(value);
            c.boxed()
        }
        "ollama" => {
            let c: ollama::Client<reqwest::Client> = ollama::Client::from_val(value);
            c.boxed()
        }
        other => return Err(anyhow::anyhow!("Unsupported provider: {other}")),
    };

    Ok(boxed)
}

pub fn create_completion_client(
    provider: &str,
    api_key: &str,
) -> Result<Box<dyn CompletionClientDyn>> {
    let boxed = create_provider_boxed(provider, api_key)?;
    boxed
        .as_completion()
        .context(format!("Provider '{provider}' does not support completions"))
}

/// Completion backend that talks to a hosted model through rig.
///
/// The provider client is built per request, the key is held for the process lifetime.
#[derive(Debug, Clone)]
pub struct RigBackend {
    provider: String,
    model: String,
    api_key: String,
}

impl RigBackend {
    pub fn new(provider: &str, model: &str, api_key: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            &config.provider,
            &config.model,
            config.api_key.as_deref().unwrap_or_default(),
        )
    }

    /// Extra request parameters that make the service return JSON, if it can.
    fn json_output_params(&self, schema: &ResponseSchema) -> Option<serde_json::Value> {
        let provider = self.provider.to_lowercase();
        if provider == "openai" {
            // The Responses API takes `text.format`; it has no `json_object` mode in rig.
            Some(serde_json::json!({
                "text": {
                    "format": {
                        "type": "json_schema",
                        "name": schema.name,
                        "schema": schema.schema,
                        "strict": true,
                    }
                }
            }))
        } else if JSON_MODE_PROVIDERS.contains(&provider.as_str()) {
            Some(serde_json::json!({
                "response_format": { "type": "json_object" }
            }))
        } else {
            None
        }
    }
}

impl CompletionBackend for RigBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GenerationError> {
        let client = create_completion_client(&self.provider, &self.api_key)
            .map_err(|e| GenerationError::Transient(format!("{e:#}")))?;

        let mut builder = client
            .agent(&self.model)
            .preamble(&request.system)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens);

        if let Some(params) = request
            .json_schema
            .as_ref()
            .and_then(|schema| self.json_output_params(schema))
        {
            builder = builder.additional_params(params);
        }

        let agent = builder.build();

        tracing::debug!(
            "Sending completion request to {}/{} ({} prompt chars)",
            self.provider,
            self.model,
            request.prompt.len()
        );

        agent
            .prompt(request.prompt.as_str())
            .await
            .map_err(|e| GenerationError::classify(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generator::{enhancement_schema, flashcards_schema};

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(create_completion_client("carrier-pigeon", "key").is_err());
    }

    #[test]
    fn test_openai_requests_structured_output() {
        let schema = flashcards_schema();
        let params = RigBackend::new("openai", "gpt-4o", "k")
            .json_output_params(&schema)
            .unwrap();

        let format = &params["text"]["format"];
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["name"], "flashcards");
        assert_eq!(format["strict"], true);
        assert_eq!(format["schema"], schema.schema);
        assert!(params.get("response_format").is_none());
    }

    #[test]
    fn test_openai_params_fit_responses_request() {
        use rig::providers::openai::responses_api::AdditionalParameters;

        let params = RigBackend::new("OpenAI", "gpt-4o", "k")
            .json_output_params(&enhancement_schema())
            .unwrap();
        let parsed: AdditionalParameters = serde_json::from_value(params).unwrap();
        assert!(parsed.text.is_some());
    }

    #[test]
    fn test_chat_providers_use_json_object_mode() {
        let params = RigBackend::new("Groq", "llama-3.3-70b-versatile", "k")
            .json_output_params(&flashcards_schema())
            .unwrap();
        assert_eq!(params["response_format"]["type"], "json_object");

        assert!(
            RigBackend::new("anthropic", "claude-sonnet-4-20250514", "k")
                .json_output_params(&flashcards_schema())
                .is_none()
        );
    }
}

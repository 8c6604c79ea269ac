use std::future::Future;

use serde::Serialize;
use serde_json::{json, Value};

use crate::db::models::flashcard::{CardDraft, Difficulty, Subject};
use crate::errors::GenerationError;
use crate::services::demo::generate_demo;
use crate::services::validation::validate_card;

pub const GENERATION_TEMPERATURE: f64 = 0.7;
pub const GENERATION_MAX_TOKENS: u64 = 3000;
pub const ENHANCE_TEMPERATURE: f64 = 0.5;
pub const ENHANCE_MAX_TOKENS: u64 = 500;
const PROBE_MAX_TOKENS: u64 = 5;

const GENERATION_SYSTEM_PROMPT: &str = "You are an expert educational content creator specializing in generating high-quality flashcards for learning and retention.";
const ENHANCE_SYSTEM_PROMPT: &str = "You are an expert educational content editor focused on improving learning materials.";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u64,
    /// Shape the reply must take, for services that can enforce JSON output.
    pub json_schema: Option<ResponseSchema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub schema: Value,
}

/// Every property is required and closed so the schema can be enforced strictly.
fn object_schema(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|p| p.keys().cloned().collect())
        .unwrap_or_default();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

pub fn flashcards_schema() -> ResponseSchema {
    let card = object_schema(json!({
        "question": { "type": "string" },
        "answer": { "type": "string" },
        "difficulty": { "type": "string" },
        "topic": { "type": "string" },
    }));
    ResponseSchema {
        name: "flashcards",
        schema: object_schema(json!({
            "flashcards": { "type": "array", "items": card },
        })),
    }
}

pub fn enhancement_schema() -> ResponseSchema {
    ResponseSchema {
        name: "enhanced_flashcard",
        schema: object_schema(json!({
            "enhanced_question": { "type": "string" },
            "enhanced_answer": { "type": "string" },
        })),
    }
}

/// A remote text-completion service.
pub trait CompletionBackend: Send + Sync {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub flashcards: Vec<CardDraft>,
    pub demo_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

fn difficulty_instructions(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Focus on basic concepts, definitions, and simple recall questions.",
        Difficulty::Medium => "Include application-based questions and moderate complexity concepts.",
        Difficulty::Hard => "Create analytical, synthesis, and evaluation-level questions requiring deep understanding.",
        Difficulty::Mixed => "Include a variety of difficulty levels from basic recall to analytical thinking.",
    }
}

fn subject_guidance(subject: &str) -> &'static str {
    match Subject::from_name(subject).unwrap_or(Subject::General) {
        Subject::Biology => "Focus on biological processes, organisms, anatomy, and scientific principles.",
        Subject::Chemistry => "Emphasize chemical reactions, formulas, periodic table, and laboratory concepts.",
        Subject::Physics => "Concentrate on laws, formulas, phenomena, and problem-solving concepts.",
        Subject::History => "Include dates, events, causes and effects, and historical significance.",
        Subject::Literature => "Focus on themes, characters, literary devices, and analysis.",
        Subject::Mathematics => "Include formulas, theorems, problem-solving steps, and mathematical concepts.",
        Subject::ComputerScience => "Emphasize algorithms, data structures, programming concepts, and technical definitions.",
        Subject::Psychology => "Focus on theories, terminology, research methods, and psychological phenomena.",
        Subject::Economics => "Include economic principles, theories, market concepts, and terminology.",
        Subject::General => "Create well-rounded questions covering key concepts and important information.",
    }
}

pub fn build_prompt(content: &str, subject: &str, count: usize, difficulty: Difficulty) -> String {
    format!(
        r#"You are tasked with creating {count} high-quality educational flashcards from the provided content.

SUBJECT: {subject}
DIFFICULTY LEVEL: {difficulty}
INSTRUCTIONS: {instructions}
SUBJECT GUIDANCE: {guidance}

CONTENT TO PROCESS:
{content}

REQUIREMENTS:
1. Generate exactly {count} flashcards
2. Each flashcard must have a clear, specific question and a comprehensive answer
3. Questions should test understanding, not just memorization
4. Answers should be complete and self-contained (no references to "the text above")
5. Focus on the most important concepts and information
6. Ensure factual accuracy and educational value
7. Vary question types (definition, application, analysis, comparison, etc.)
8. If the content allows, distribute questions across different topics/sections

RESPONSE FORMAT:
Respond with a JSON object containing a "flashcards" array. Each flashcard should have:
- "question": A clear, specific question
- "answer": A comprehensive, accurate answer
- "difficulty": The difficulty level of this specific question
- "topic": The specific topic or concept this flashcard covers

Example format:
{{
  "flashcards": [
    {{
      "question": "What is photosynthesis and why is it important for life on Earth?",
      "answer": "Photosynthesis is the process by which plants convert light energy into chemical energy, producing glucose and oxygen from carbon dioxide and water. It's crucial because it provides oxygen for most life forms and forms the base of most food chains.",
      "difficulty": "Medium",
      "topic": "Plant Biology"
    }}
  ]
}}

Generate the flashcards now:
"#,
        instructions = difficulty_instructions(difficulty),
        guidance = subject_guidance(subject),
    )
}

fn build_enhance_prompt(question: &str, answer: &str, subject: &str) -> String {
    format!(
        r#"Improve the following flashcard for the subject '{subject}':

Question: {question}
Answer: {answer}

Please enhance this flashcard by:
1. Making the question more specific and clear
2. Improving the answer with better structure and completeness
3. Ensuring educational value and accuracy

Respond in JSON format:
{{
  "enhanced_question": "improved question here",
  "enhanced_answer": "improved answer here"
}}
"#
    )
}

/// Models sometimes wrap JSON in a markdown fence even when asked not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses a `{flashcards: [...]}` response. Cards that fail validation are dropped;
/// missing `difficulty`/`topic` tags fall back to the requested difficulty and subject.
pub fn parse_cards(
    raw: &str,
    subject: &str,
    difficulty: Difficulty,
) -> Result<Vec<CardDraft>, GenerationError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| GenerationError::Format(format!("response is not JSON: {e}")))?;

    let cards = value
        .get("flashcards")
        .and_then(Value::as_array)
        .ok_or_else(|| GenerationError::Format("missing \"flashcards\" array".into()))?;

    let mut drafts = Vec::with_capacity(cards.len());
    for (i, card) in cards.iter().enumerate() {
        let question = card.get("question").and_then(Value::as_str).unwrap_or_default();
        let answer = card.get("answer").and_then(Value::as_str).unwrap_or_default();

        if let Err(reason) = validate_card(question, answer) {
            tracing::warn!("Dropping generated card {i}: {reason}");
            continue;
        }

        let tag = |key: &str, fallback: &str| {
            card.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        drafts.push(CardDraft {
            question: question.trim().to_string(),
            answer: answer.trim().to_string(),
            difficulty: Some(tag("difficulty", difficulty.as_str())),
            topic: Some(tag("topic", subject)),
        });
    }

    Ok(drafts)
}

pub struct CardGenerator<B> {
    backend: B,
}

impl<B: CompletionBackend> CardGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Live generation. Returns at most `count` cards; fewer when the model
    /// under-produces or some of its cards fail validation.
    pub async fn generate(
        &self,
        content: &str,
        subject: &str,
        count: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<CardDraft>, GenerationError> {
        let request = CompletionRequest {
            system: GENERATION_SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(content, subject, count, difficulty),
            temperature: GENERATION_TEMPERATURE,
            max_tokens: GENERATION_MAX_TOKENS,
            json_schema: Some(flashcards_schema()),
        };

        let raw = self.backend.complete(request).await?;
        let mut cards = parse_cards(&raw, subject, difficulty)?;
        cards.truncate(count);

        if cards.len() < count {
            tracing::warn!("Requested {count} flashcards, model produced {} valid", cards.len());
        } else {
            tracing::info!("Generated {} flashcards ({subject}, {difficulty})", cards.len());
        }
        Ok(cards)
    }

    pub async fn test_connection(&self) -> ConnectionStatus {
        let request = CompletionRequest {
            system: String::new(),
            prompt: "Hello".to_string(),
            temperature: 0.0,
            max_tokens: PROBE_MAX_TOKENS,
            json_schema: None,
        };

        match self.backend.complete(request).await {
            Ok(_) => ConnectionStatus {
                ok: true,
                message: "ok".to_string(),
            },
            Err(e) => {
                let message = match e {
                    GenerationError::Auth(_) => "invalid key".to_string(),
                    GenerationError::Quota(_) => "quota exceeded".to_string(),
                    GenerationError::Transient(raw) | GenerationError::Format(raw) => raw,
                };
                tracing::warn!("Completion service probe failed: {message}");
                ConnectionStatus { ok: false, message }
            }
        }
    }

    /// Probes the service and generates live, or falls back to the demo
    /// templates when the probe fails or `force_demo` is set. Errors on the
    /// live path after a successful probe are returned, not masked.
    pub async fn generate_with_fallback(
        &self,
        content: &str,
        subject: &str,
        count: usize,
        difficulty: Difficulty,
        force_demo: bool,
    ) -> Result<GenerationOutcome, GenerationError> {
        if force_demo {
            return Ok(GenerationOutcome {
                flashcards: generate_demo(content, subject, count, difficulty),
                demo_mode: true,
                notice: None,
            });
        }

        let status = self.test_connection().await;
        if !status.ok {
            tracing::info!("Falling back to demo flashcards: {}", status.message);
            return Ok(GenerationOutcome {
                flashcards: generate_demo(content, subject, count, difficulty),
                demo_mode: true,
                notice: Some(format!("API issue: {}. Generated sample flashcards instead.", status.message)),
            });
        }

        let flashcards = self.generate(content, subject, count, difficulty).await?;
        Ok(GenerationOutcome {
            flashcards,
            demo_mode: false,
            notice: None,
        })
    }

    /// Asks the model to tighten a single card. Any failure returns the card unchanged.
    pub async fn enhance(&self, question: &str, answer: &str, subject: &str) -> (String, String) {
        let request = CompletionRequest {
            system: ENHANCE_SYSTEM_PROMPT.to_string(),
            prompt: build_enhance_prompt(question, answer, subject),
            temperature: ENHANCE_TEMPERATURE,
            max_tokens: ENHANCE_MAX_TOKENS,
            json_schema: Some(enhancement_schema()),
        };

        let original = (question.to_string(), answer.to_string());
        let raw = match self.backend.complete(request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Error enhancing flashcard: {e}");
                return original;
            }
        };

        let value: Value = match serde_json::from_str(strip_code_fence(&raw)) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Enhancement response is not JSON: {e}");
                return original;
            }
        };

        let field = |key: &str, fallback: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        (
            field("enhanced_question", question),
            field("enhanced_answer", answer),
        )
    }
}

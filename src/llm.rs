// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE LLM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações para interação com modelos de linguagem.
// O modelo de extração (Llama 3.1 8B Instruct quantizado) é servido por
// qualquer servidor compatível com a API OpenAI (vLLM, llama.cpp, Ollama).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::prompts::PromptPair;

/// Erros do cliente LLM
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Parâmetros de geração de texto
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    /// Máximo de tokens gerados
    pub max_new_tokens: u32,
    /// Temperatura (0.0 = determinístico)
    pub temperature: f32,
}

impl GenerationConfig {
    /// Geração determinística com o limite de tokens informado
    pub fn deterministic(max_new_tokens: u32) -> Self {
        Self {
            max_new_tokens,
            temperature: 0.0,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::deterministic(512)
    }
}

/// Trait principal para clientes LLM
///
/// Os clientes são construídos explicitamente e compartilhados via
/// `Arc<dyn LlmClient>` entre as estratégias.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Envia o par de prompts e retorna o texto gerado
    async fn complete(
        &self,
        prompt: &PromptPair,
        config: &GenerationConfig,
    ) -> Result<String, LlmError>;

    /// Número de chamadas realizadas até agora
    fn calls(&self) -> usize;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO OPENAI-COMPATÍVEL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Cliente para servidores compatíveis com `/v1/chat/completions`
pub struct OpenAiCompatClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
    calls: AtomicUsize,
}

impl OpenAiCompatClient {
    /// Cria o cliente a partir da configuração
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            client,
            calls: AtomicUsize::new(0),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn complete(
        &self,
        prompt: &PromptPair,
        config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: config.temperature,
            max_tokens: config.max_new_tokens,
        };

        log::debug!("🤖 LLM {} {}", self.model, prompt);

        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitError);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ApiError(format!("Parse error: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(LlmError::EmptyResponse)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cliente com respostas roteirizadas, para testes e execuções offline.
///
/// Cada regra associa um trecho do prompt (sistema ou usuário) a uma
/// resposta. A primeira regra que casa vence; sem regra, retorna
/// `default_response` (ou erro, se não houver).
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    rules: Vec<(String, Result<String, String>)>,
    default_response: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<PromptPair>>,
}

impl ScriptedLlmClient {
    /// Mock sem regras
    pub fn new() -> Self {
        Self::default()
    }

    /// Responde `response` quando o prompt contém `needle`
    pub fn on(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Ok(response.into())));
        self
    }

    /// Falha com erro de API quando o prompt contém `needle`
    pub fn fail_on(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Err(message.into())));
        self
    }

    /// Resposta usada quando nenhuma regra casa
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(response.into());
        self
    }

    /// Prompts recebidos, na ordem de chegada
    pub fn received_prompts(&self) -> Vec<PromptPair> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Contagem de chamadas por regra (útil para verificar roteamento)
    pub fn calls_matching(&self, needle: &str) -> usize {
        self.received_prompts()
            .iter()
            .filter(|p| p.system.contains(needle) || p.user.contains(needle))
            .count()
    }

    fn lookup(&self, prompt: &PromptPair) -> Result<String, LlmError> {
        let rule = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.system.contains(needle) || prompt.user.contains(needle));

        match rule {
            Some((_, Ok(response))) => Ok(response.clone()),
            Some((_, Err(message))) => Err(LlmError::ApiError(message.clone())),
            None => self
                .default_response
                .clone()
                .ok_or_else(|| LlmError::ApiError("No scripted response".into())),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(
        &self,
        prompt: &PromptPair,
        _config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        self.lookup(prompt)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

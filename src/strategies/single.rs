//! Agente único: um prompt monolítico retorna os 8 campos de uma vez.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ExtractionError, ExtractionStrategy};
use crate::llm::{GenerationConfig, LlmClient};
use crate::parsing::ParsedFields;
use crate::prompts::{single_agent_prompt, PromptVariant};
use crate::types::{ExtractionRecord, Requirement};
use crate::utils::preview;

/// Estratégia de agente único
pub struct SingleAgent {
    client: Arc<dyn LlmClient>,
    variant: PromptVariant,
    generation: GenerationConfig,
}

impl SingleAgent {
    /// Cria o agente com a variante de prompt informada
    pub fn new(client: Arc<dyn LlmClient>, variant: PromptVariant) -> Self {
        Self {
            client,
            variant,
            generation: GenerationConfig::deterministic(512),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for SingleAgent {
    fn name(&self) -> &'static str {
        "single"
    }

    fn calls_per_requirement(&self) -> usize {
        1
    }

    async fn extract(&self, requirement: &Requirement) -> Result<ExtractionRecord, ExtractionError> {
        let prompt = single_agent_prompt(self.variant, &requirement.text);
        let raw = self
            .client
            .complete(&prompt, &self.generation)
            .await
            .map_err(ExtractionError::llm("single"))?;

        let mut record = ExtractionRecord::empty(requirement);
        match ParsedFields::parse_abstractions(&raw) {
            Ok(fields) => fields.fill_record(&mut record),
            Err(e) => log::warn!(
                "⚠️  [single] Requisito {}: JSON inválido ({}) | texto: {}...",
                requirement.id,
                e,
                preview(&raw, 100)
            ),
        }

        Ok(record)
    }
}

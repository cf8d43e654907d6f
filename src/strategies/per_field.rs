//! Agentes por campo: oito prompts especializados, um por campo semântico.
//!
//! As chamadas de um requisito são concorrentes; falhas (de transporte ou
//! de parsing) zeram apenas o campo afetado.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use super::{ExtractionError, ExtractionStrategy};
use crate::llm::{GenerationConfig, LlmClient};
use crate::parsing::parse_or_default;
use crate::prompts::field_agent_prompt;
use crate::types::{ExtractionRecord, Requirement, SemanticField};

/// Estratégia de 8 agentes
pub struct PerFieldAgents {
    client: Arc<dyn LlmClient>,
    generation: GenerationConfig,
}

impl PerFieldAgents {
    /// Cria os agentes sobre o cliente compartilhado
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            generation: GenerationConfig::deterministic(512),
        }
    }

    async fn extract_field(&self, field: SemanticField, text: &str) -> Vec<String> {
        let prompt = field_agent_prompt(field, text);

        match self.client.complete(&prompt, &self.generation).await {
            Ok(raw) => parse_or_default(field.key(), &raw).get(field),
            Err(e) => {
                log::error!("❌ Erro no campo {}: {}", field, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ExtractionStrategy for PerFieldAgents {
    fn name(&self) -> &'static str {
        "per_field"
    }

    fn calls_per_requirement(&self) -> usize {
        SemanticField::ALL.len()
    }

    async fn extract(&self, requirement: &Requirement) -> Result<ExtractionRecord, ExtractionError> {
        let values = join_all(
            SemanticField::ALL
                .iter()
                .map(|field| self.extract_field(*field, &requirement.text)),
        )
        .await;

        let mut record = ExtractionRecord::empty(requirement);
        for (field, values) in SemanticField::ALL.into_iter().zip(values) {
            record.set_field(field, values);
        }

        Ok(record)
    }
}

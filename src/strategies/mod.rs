// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ESTRATÉGIAS DE EXTRAÇÃO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Três formas de decompor a extração dos 8 campos semânticos:
// - single:    1 chamada, prompt monolítico
// - per_field: 8 chamadas, uma por campo
// - pipeline:  3 chamadas (entity → action/logic) + smart filter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod per_field;
mod pipeline;
mod single;

pub use per_field::PerFieldAgents;
pub use pipeline::{merge_agent_outputs, PipelineAgents};
pub use single::SingleAgent;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ExperimentConfig, Strategy};
use crate::llm::{LlmClient, LlmError};
use crate::types::{ExtractionRecord, Requirement};

/// Erro de extração de um requisito
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// Chamada ao LLM falhou em um dos agentes
    #[error("LLM call failed in {agent} agent: {source}")]
    Llm {
        /// Agente que fez a chamada
        agent: &'static str,
        /// Erro do cliente
        #[source]
        source: LlmError,
    },
}

impl ExtractionError {
    pub(crate) fn llm(agent: &'static str) -> impl FnOnce(LlmError) -> Self {
        move |source| Self::Llm { agent, source }
    }
}

/// Estratégia de extração de campos semânticos
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Nome da estratégia
    fn name(&self) -> &'static str;

    /// Chamadas ao LLM feitas por requisito
    fn calls_per_requirement(&self) -> usize;

    /// Extrai os campos de um requisito
    async fn extract(&self, requirement: &Requirement) -> Result<ExtractionRecord, ExtractionError>;
}

/// Constrói a estratégia configurada sobre um cliente LLM compartilhado
pub fn build_strategy(
    config: &ExperimentConfig,
    client: Arc<dyn LlmClient>,
) -> Box<dyn ExtractionStrategy> {
    match config.strategy {
        Strategy::Single => Box::new(SingleAgent::new(client, config.variant)),
        Strategy::PerField => Box::new(PerFieldAgents::new(client)),
        Strategy::Pipeline => Box::new(PipelineAgents::new(client, config.atomic_policy)),
    }
}

//! Pipeline de 3 agentes: Entity → Action → Logic.
//!
//! 1. O agente de entidades extrai `Main_actor` e `Entity`
//! 2. O agente de ações recebe essas listas como contexto
//! 3. O agente de lógica não depende do contexto e roda junto com o de ações
//!
//! No fim, os campos são mesclados (`Entity ⊇ Main_actor`,
//! `Condition ⊇ Trigger ∪ Precondition`) e passam pelo smart filter.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ExtractionError, ExtractionStrategy};
use crate::filter::{smart_filter, AtomicPolicy};
use crate::llm::{GenerationConfig, LlmClient};
use crate::parsing::{parse_or_default, ParsedFields};
use crate::prompts::{action_agent_prompt, entity_agent_prompt, logic_agent_prompt};
use crate::types::{ExtractionRecord, Requirement, SemanticField};

/// Ordem dos campos na lista entregue ao smart filter
const MERGE_ORDER: [SemanticField; 8] = [
    SemanticField::MainActor,
    SemanticField::Entity,
    SemanticField::Action,
    SemanticField::SystemResponse,
    SemanticField::Purpose,
    SemanticField::Trigger,
    SemanticField::Precondition,
    SemanticField::Condition,
];

/// Estratégia de pipeline com injeção de contexto e deduplicação
pub struct PipelineAgents {
    client: Arc<dyn LlmClient>,
    policy: AtomicPolicy,
    generation: GenerationConfig,
}

impl PipelineAgents {
    /// Cria o pipeline com a política de tokens atômicos informada
    pub fn new(client: Arc<dyn LlmClient>, policy: AtomicPolicy) -> Self {
        Self {
            client,
            policy,
            generation: GenerationConfig::deterministic(500),
        }
    }
}

/// Mescla as saídas dos três agentes e aplica o smart filter.
///
/// Campos ausentes em um agente (ou agente com JSON ilegível) contribuem
/// com listas vazias. O filtro roda sequencialmente: as listas são pequenas
/// e a mescla acontece dentro de uma task assíncrona.
pub fn merge_agent_outputs(
    requirement: &Requirement,
    entity: &ParsedFields,
    action: &ParsedFields,
    logic: &ParsedFields,
    policy: &AtomicPolicy,
) -> ExtractionRecord {
    let main_actor = entity.get(SemanticField::MainActor);
    let trigger = logic.get(SemanticField::Trigger);
    let precondition = logic.get(SemanticField::Precondition);

    let mut all_entities = entity.get(SemanticField::Entity);
    all_entities.extend(main_actor.iter().cloned());

    let mut all_conditions = logic.get(SemanticField::Condition);
    all_conditions.extend(trigger.iter().cloned());
    all_conditions.extend(precondition.iter().cloned());

    let lists = vec![
        main_actor,
        all_entities,
        action.get(SemanticField::Action),
        action.get(SemanticField::SystemResponse),
        action.get(SemanticField::Purpose),
        trigger,
        precondition,
        all_conditions,
    ];

    let mut record = ExtractionRecord::empty(requirement);
    for (field, values) in MERGE_ORDER.into_iter().zip(&lists) {
        record.set_field(field, smart_filter(values, policy));
    }
    record
}

#[async_trait]
impl ExtractionStrategy for PipelineAgents {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn calls_per_requirement(&self) -> usize {
        3
    }

    async fn extract(&self, requirement: &Requirement) -> Result<ExtractionRecord, ExtractionError> {
        let text = &requirement.text;

        // A. Entity agent
        let raw_entity = self
            .client
            .complete(&entity_agent_prompt(text), &self.generation)
            .await
            .map_err(ExtractionError::llm("entity"))?;
        let entity = parse_or_default("entity", &raw_entity);

        // B + C. Action (com contexto) e Logic
        let action_prompt = action_agent_prompt(
            text,
            &entity.get(SemanticField::MainActor),
            &entity.get(SemanticField::Entity),
        );
        let logic_prompt = logic_agent_prompt(text);

        let (raw_action, raw_logic) = futures::join!(
            self.client.complete(&action_prompt, &self.generation),
            self.client.complete(&logic_prompt, &self.generation),
        );
        let action = parse_or_default("action", &raw_action.map_err(ExtractionError::llm("action"))?);
        let logic = parse_or_default("logic", &raw_logic.map_err(ExtractionError::llm("logic"))?);

        log::debug!("🔗 Pipeline concluído para requisito {}", requirement.id);

        Ok(merge_agent_outputs(
            requirement,
            &entity,
            &action,
            &logic,
            &self.policy,
        ))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EXECUÇÃO DO EXPERIMENTO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Percorre o dataset aplicando uma estratégia de extração, com concorrência
// limitada e saída sempre na ordem do dataset. Requisitos que falham viram
// registros vazios e são contabilizados no resumo.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use crate::llm::LlmClient;
use crate::strategies::ExtractionStrategy;
use crate::types::{ExtractionRecord, Requirement};
use crate::utils::{ActionTimer, LatencyStats};

/// Resumo de uma execução
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Identificador único da execução
    pub run_id: Uuid,
    /// Estratégia usada
    pub strategy: String,
    /// Início da execução
    pub started_at: DateTime<Utc>,
    /// Requisitos processados
    pub requirements: usize,
    /// Requisitos que falharam (registrados vazios)
    pub failures: usize,
    /// Chamadas ao LLM durante a execução
    pub llm_calls: usize,
    /// Tempo total de parede (ms)
    pub total_time_ms: u64,
    /// Tempo médio por requisito (ms)
    pub avg_requirement_ms: f64,
    /// Percentil 95 por requisito (ms)
    pub p95_requirement_ms: u64,
}

/// Resultado de uma execução: registros (na ordem do dataset) + resumo
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Um registro por requisito
    pub records: Vec<ExtractionRecord>,
    /// Métricas da execução
    pub summary: RunSummary,
}

struct Outcome {
    record: ExtractionRecord,
    elapsed_ms: u128,
    failed: bool,
}

/// Executor de uma estratégia sobre um dataset
pub struct ExperimentRunner {
    strategy: Box<dyn ExtractionStrategy>,
    client: Arc<dyn LlmClient>,
    concurrency: usize,
}

impl ExperimentRunner {
    /// Cria o executor. `client` deve ser o mesmo usado pela estratégia
    /// (é dele que vem a contagem de chamadas).
    pub fn new(strategy: Box<dyn ExtractionStrategy>, client: Arc<dyn LlmClient>) -> Self {
        Self {
            strategy,
            client,
            concurrency: 1,
        }
    }

    /// Define quantos requisitos são processados simultaneamente (mínimo 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    async fn process(&self, index: usize, total: usize, requirement: &Requirement) -> Outcome {
        let timer = ActionTimer::start(format!("requisito {}", requirement.id));

        let (record, failed) = match self.strategy.extract(requirement).await {
            Ok(record) => (record, false),
            Err(e) => {
                log::error!("❌ Requisito {} falhou: {}", requirement.id, e);
                (ExtractionRecord::empty(requirement), true)
            }
        };

        let elapsed_ms = timer.stop_and_log();
        log::info!(
            "[{}/{}] {} → {} fragmentos ({}ms)",
            index + 1,
            total,
            requirement.id,
            record.fragment_count(),
            elapsed_ms
        );

        Outcome {
            record,
            elapsed_ms,
            failed,
        }
    }

    /// Processa todos os requisitos do dataset
    pub async fn run(&self, requirements: &[Requirement]) -> RunReport {
        let started_at = Utc::now();
        let timer = ActionTimer::start(format!("execução {}", self.strategy.name()));
        let calls_before = self.client.calls();
        let total = requirements.len();

        log::info!(
            "🚀 Processando {} requisitos com estratégia {} ({} chamadas/requisito, concorrência {})",
            total,
            self.strategy.name(),
            self.strategy.calls_per_requirement(),
            self.concurrency
        );

        let outcomes: Vec<Outcome> = stream::iter(requirements.iter().enumerate())
            .map(|(index, requirement)| self.process(index, total, requirement))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut latencies = LatencyStats::new();
        let mut failures = 0;
        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            latencies.record(outcome.elapsed_ms);
            failures += usize::from(outcome.failed);
            records.push(outcome.record);
        }

        let total_time_ms = timer.stop_and_log() as u64;
        log::info!("📊 {}", latencies.summary());

        let summary = RunSummary {
            run_id: Uuid::new_v4(),
            strategy: self.strategy.name().to_string(),
            started_at,
            requirements: total,
            failures,
            llm_calls: self.client.calls().saturating_sub(calls_before),
            total_time_ms,
            avg_requirement_ms: latencies.avg_ms(),
            p95_requirement_ms: latencies.percentile_ms(0.95) as u64,
        };

        RunReport { records, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;
    use crate::prompts::PromptVariant;
    use crate::strategies::SingleAgent;
    use crate::types::RequirementId;

    fn dataset() -> Vec<Requirement> {
        (1..=5)
            .map(|i| Requirement::new(RequirementId::Number(i), format!("Requirement number {}.", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_run_preserves_order_and_counts_failures() {
        let client: Arc<dyn LlmClient> = Arc::new(
            ScriptedLlmClient::new()
                .fail_on("Requirement number 3.", "boom")
                .with_default(r#"{"abstractions": [{"Entity": ["The system"]}]}"#),
        );
        let strategy = Box::new(SingleAgent::new(client.clone(), PromptVariant::ZeroShot));
        let runner = ExperimentRunner::new(strategy, client).with_concurrency(3);

        let report = runner.run(&dataset()).await;

        let ids: Vec<String> = report.records.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
        assert!(report.records[2].is_empty());
        assert_eq!(report.records[0].entity, vec!["The system"]);

        assert_eq!(report.summary.strategy, "single");
        assert_eq!(report.summary.requirements, 5);
        assert_eq!(report.summary.failures, 1);
        assert_eq!(report.summary.llm_calls, 5);
    }

    #[tokio::test]
    async fn test_run_empty_dataset() {
        let client: Arc<dyn LlmClient> = Arc::new(ScriptedLlmClient::new());
        let strategy = Box::new(SingleAgent::new(client.clone(), PromptVariant::OneShot));
        let runner = ExperimentRunner::new(strategy, client).with_concurrency(0);

        let report = runner.run(&[]).await;
        assert!(report.records.is_empty());
        assert_eq!(report.summary.failures, 0);
        assert_eq!(report.summary.avg_requirement_ms, 0.0);
    }
}

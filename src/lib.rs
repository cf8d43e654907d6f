//! # Req Extract
//!
//! Extração de campos semânticos (atores, entidades, ações, gatilhos,
//! condições) de requisitos de software em linguagem natural, usando um
//! LLM como motor de extração.
//!
//! ## Estratégias Comparadas
//!
//! | Estratégia | Chamadas/requisito | Pós-processamento |
//! |------------|--------------------|-------------------|
//! | `single` | 1 | nenhum |
//! | `per_field` | 8 | nenhum |
//! | `pipeline` | 3 (entity → action ∥ logic) | merge + smart filter |
//!
//! ## Smart Filter
//!
//! O núcleo algorítmico do crate ([`filter::smart_filter`]): remove
//! fragmentos contidos em fragmentos mais longos, protegendo tokens
//! atômicos curtos com dígitos ("99%", "10x10", "85C").
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use req_extract::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client: Arc<dyn LlmClient> = Arc::new(OpenAiCompatClient::new(&load_llm_config()?)?);
//!     let config = load_experiment_config()?;
//!     let runner = ExperimentRunner::new(build_strategy(&config, client.clone()), client);
//!     let report = runner.run(&load_requirements(&config.input)?).await;
//!     println!("{} falhas", report.summary.failures);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o sistema.
///
/// - [`types::SemanticField`]: Os 8 campos extraídos
/// - [`types::Requirement`]: Requisito de entrada
/// - [`types::ExtractionRecord`]: Registro de saída por requisito
pub mod types;

/// Smart filter: deduplicação por contenção com proteção de tokens atômicos.
pub mod filter;

/// Fronteira de parsing entre o texto do modelo e os campos tipados.
///
/// Remove blocos markdown, localiza o objeto JSON e converte valores
/// fora do formato (null, string isolada) em listas.
pub mod parsing;

/// Prompts das três estratégias.
pub mod prompts;

/// Clientes para Large Language Models (LLMs).
///
/// Define a trait `LlmClient` e implementações para:
/// - Servidores compatíveis com OpenAI (vLLM, llama.cpp, Ollama)
/// - Respostas roteirizadas para testes
pub mod llm;

/// Estratégias de extração (single, per_field, pipeline).
pub mod strategies;

/// Leitura do dataset e gravação dos resultados.
pub mod dataset;

/// Execução de uma estratégia sobre um dataset inteiro.
pub mod runner;

/// Utilitários diversos.
pub mod utils;

/// Configuração do LLM e do experimento.
///
/// Fornece configuração dinâmica via variáveis de ambiente:
///
/// **LLM:**
/// - `LLM_API_BASE_URL`: URL base (padrão: `http://localhost:8000/v1`)
/// - `LLM_MODEL`: Modelo (padrão: `meta-llama/Meta-Llama-3.1-8B-Instruct`)
/// - `LLM_API_KEY`: Chave de API (opcional)
/// - `LLM_TIMEOUT_SECS`: Timeout por chamada (padrão: 120)
///
/// **Experimento:**
/// - `EXTRACTION_STRATEGY`: "single", "per_field", "pipeline" (padrão: pipeline)
/// - `PROMPT_VARIANT`: "zero_shot", "one_shot", "few_shot" (padrão: one_shot)
/// - `INPUT_FILE` / `OUTPUT_FILE`: Dataset e resultados
/// - `RUN_CONCURRENCY`: Requisitos simultâneos (padrão: 1)
/// - `FILTER_ATOMIC_MAX_LEN`: Comprimento máximo de token atômico (padrão: 10)
/// - `FILTER_ATOMIC_REQUIRE_DIGIT`: Exige dígito no token atômico (padrão: true)
pub mod config;

// Re-exports principais
pub use config::{
    load_experiment_config, load_llm_config, ExperimentConfig, LlmConfig, Strategy,
};
pub use filter::{is_atomic, smart_filter, AtomicPolicy};
pub use types::*;

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude com imports comuns para uso rápido.
///
/// ```rust,ignore
/// use req_extract::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{load_experiment_config, load_llm_config, ExperimentConfig, Strategy};
    pub use crate::dataset::{load_requirements, write_records};
    pub use crate::filter::{smart_filter, smart_filter_many, AtomicPolicy};
    pub use crate::llm::{GenerationConfig, LlmClient, OpenAiCompatClient, ScriptedLlmClient};
    pub use crate::runner::{ExperimentRunner, RunReport, RunSummary};
    pub use crate::strategies::{build_strategy, ExtractionStrategy};
    pub use crate::types::*;
    pub use std::sync::Arc;
}

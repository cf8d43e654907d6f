// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO LLM E DO EXPERIMENTO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Configurações do servidor de inferência, da estratégia de extração e do
// smart filter. Todas as configurações podem ser definidas via .env;
// flags de linha de comando sobrescrevem o ambiente.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;
use std::path::PathBuf;

use crate::filter::{AtomicPolicy, DEFAULT_ATOMIC_MAX_LEN};
use crate::prompts::PromptVariant;

/// Modelo padrão servido pelo endpoint de inferência
pub const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct";

/// Endpoint padrão (servidor local compatível com OpenAI)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";

/// Erros de configuração
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Missing value for flag {0}")]
    MissingFlagValue(String),

    #[error("Unknown flag: {0}")]
    UnknownFlag(String),
}

/// Estratégia de extração.
///
/// - `Single`: um prompt monolítico com os 8 campos
/// - `PerField`: 8 agentes, um por campo
/// - `Pipeline`: entity → action → logic com smart filter (padrão)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Agente único
    Single,
    /// Um agente por campo
    PerField,
    /// Pipeline de 3 agentes
    #[default]
    Pipeline,
}

impl Strategy {
    /// Converte string de configuração (case-insensitive).
    ///
    /// - "single" / "one" → Single
    /// - "per_field" / "per-field" / "eight" / "8" → PerField
    /// - "pipeline" / "three" / "3" → Pipeline
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "single" | "one" => Some(Self::Single),
            "per_field" | "eight" | "8" => Some(Self::PerField),
            "pipeline" | "three" | "3" => Some(Self::Pipeline),
            _ => None,
        }
    }

    /// Nome canônico, usado em logs e no resumo da execução
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::PerField => "per_field",
            Self::Pipeline => "pipeline",
        }
    }

    /// Arquivo de saída padrão da estratégia
    pub fn default_output(&self) -> PathBuf {
        PathBuf::from(format!("{}_predictions.json", self.as_str()))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuração do cliente LLM
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// URL base da API (sem `/chat/completions`)
    pub base_url: String,
    /// Nome do modelo
    pub model: String,
    /// Chave de API (opcional para servidores locais)
    pub api_key: Option<String>,
    /// Timeout por requisição (segundos)
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

/// Configuração de uma execução do experimento
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Estratégia de extração
    pub strategy: Strategy,
    /// Variante de prompt (apenas estratégia `Single`)
    pub variant: PromptVariant,
    /// Dataset de entrada
    pub input: PathBuf,
    /// Arquivo de resultados (padrão depende da estratégia)
    pub output: Option<PathBuf>,
    /// Requisitos processados simultaneamente
    pub concurrency: usize,
    /// Política de proteção de tokens atômicos
    pub atomic_policy: AtomicPolicy,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            variant: PromptVariant::default(),
            input: PathBuf::from("requirements.json"),
            output: None,
            concurrency: 1,
            atomic_policy: AtomicPolicy::default(),
        }
    }
}

impl ExperimentConfig {
    /// Arquivo de saída efetivo
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.strategy.default_output())
    }

    /// Aplica flags de linha de comando sobre a configuração.
    ///
    /// Flags: `--strategy`, `--variant`, `--input`, `--output`, `--concurrency`.
    pub fn apply_args(&mut self, args: &[String]) -> Result<(), ConfigError> {
        let mut iter = args.iter();

        while let Some(flag) = iter.next() {
            let value = iter
                .next()
                .ok_or_else(|| ConfigError::MissingFlagValue(flag.clone()))?;

            match flag.as_str() {
                "--strategy" | "-s" => {
                    self.strategy = Strategy::parse(value).ok_or_else(|| invalid("--strategy", value))?;
                }
                "--variant" | "-v" => {
                    self.variant =
                        PromptVariant::parse(value).ok_or_else(|| invalid("--variant", value))?;
                }
                "--input" | "-i" => self.input = PathBuf::from(value),
                "--output" | "-o" => self.output = Some(PathBuf::from(value)),
                "--concurrency" | "-c" => {
                    self.concurrency = parse_positive(value).ok_or_else(|| invalid("--concurrency", value))?;
                }
                other => return Err(ConfigError::UnknownFlag(other.to_string())),
            }
        }

        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Carrega a configuração do LLM a partir de uma função de lookup.
///
/// Variáveis suportadas:
/// - `LLM_API_BASE_URL`: URL base (padrão: `http://localhost:8000/v1`)
/// - `LLM_MODEL`: Modelo (padrão: Llama 3.1 8B Instruct)
/// - `LLM_API_KEY`: Chave de API (opcional)
/// - `LLM_TIMEOUT_SECS`: Timeout em segundos (padrão: 120)
pub fn llm_config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<LlmConfig, ConfigError> {
    let mut config = LlmConfig::default();

    if let Some(url) = lookup("LLM_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
        config.base_url = url.trim().to_string();
    }
    if let Some(model) = lookup("LLM_MODEL").filter(|v| !v.trim().is_empty()) {
        config.model = model.trim().to_string();
    }
    config.api_key = lookup("LLM_API_KEY").filter(|v| !v.trim().is_empty());

    if let Some(timeout) = lookup("LLM_TIMEOUT_SECS") {
        config.timeout_secs = parse_positive(&timeout)
            .map(|t| t as u64)
            .ok_or_else(|| invalid("LLM_TIMEOUT_SECS", &timeout))?;
    }

    Ok(config)
}

/// Carrega a configuração do experimento a partir de uma função de lookup.
///
/// Variáveis suportadas:
/// - `EXTRACTION_STRATEGY`: "single", "per_field", "pipeline" (padrão)
/// - `PROMPT_VARIANT`: "zero_shot", "one_shot" (padrão), "few_shot"
/// - `INPUT_FILE`: Dataset (padrão: requirements.json)
/// - `OUTPUT_FILE`: Resultados (padrão: `<estratégia>_predictions.json`)
/// - `RUN_CONCURRENCY`: Requisitos simultâneos (padrão: 1)
/// - `FILTER_ATOMIC_MAX_LEN`: Comprimento máximo de token atômico (padrão: 10)
/// - `FILTER_ATOMIC_REQUIRE_DIGIT`: Exige dígito em token atômico (padrão: true)
pub fn experiment_config_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ExperimentConfig, ConfigError> {
    let mut config = ExperimentConfig::default();

    if let Some(value) = lookup("EXTRACTION_STRATEGY") {
        config.strategy = Strategy::parse(&value).ok_or_else(|| invalid("EXTRACTION_STRATEGY", &value))?;
    }
    if let Some(value) = lookup("PROMPT_VARIANT") {
        config.variant = PromptVariant::parse(&value).ok_or_else(|| invalid("PROMPT_VARIANT", &value))?;
    }
    if let Some(value) = lookup("INPUT_FILE").filter(|v| !v.trim().is_empty()) {
        config.input = PathBuf::from(value.trim());
    }
    if let Some(value) = lookup("OUTPUT_FILE").filter(|v| !v.trim().is_empty()) {
        config.output = Some(PathBuf::from(value.trim()));
    }
    if let Some(value) = lookup("RUN_CONCURRENCY") {
        config.concurrency = parse_positive(&value).ok_or_else(|| invalid("RUN_CONCURRENCY", &value))?;
    }

    let mut policy = AtomicPolicy::with_max_len(DEFAULT_ATOMIC_MAX_LEN);
    if let Some(value) = lookup("FILTER_ATOMIC_MAX_LEN") {
        policy.max_len = value
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid("FILTER_ATOMIC_MAX_LEN", &value))?;
    }
    if let Some(value) = lookup("FILTER_ATOMIC_REQUIRE_DIGIT") {
        policy.require_digit =
            parse_bool(&value).ok_or_else(|| invalid("FILTER_ATOMIC_REQUIRE_DIGIT", &value))?;
    }
    config.atomic_policy = policy;

    Ok(config)
}

/// Carrega a configuração do LLM das variáveis de ambiente.
pub fn load_llm_config() -> Result<LlmConfig, ConfigError> {
    let config = llm_config_from(|key| std::env::var(key).ok())?;
    log::info!(
        "📦 LLM: {} @ {} (api key: {})",
        config.model,
        config.base_url,
        if config.api_key.is_some() { "sim" } else { "não" }
    );
    Ok(config)
}

/// Carrega a configuração do experimento das variáveis de ambiente.
pub fn load_experiment_config() -> Result<ExperimentConfig, ConfigError> {
    let config = experiment_config_from(|key| std::env::var(key).ok())?;
    log::info!(
        "📦 Estratégia: {} | variante: {} | atomic max_len: {} | concorrência: {}",
        config.strategy,
        config.variant,
        config.atomic_policy.max_len,
        config.concurrency
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(Strategy::parse("single"), Some(Strategy::Single));
        assert_eq!(Strategy::parse("PER-FIELD"), Some(Strategy::PerField));
        assert_eq!(Strategy::parse("8"), Some(Strategy::PerField));
        assert_eq!(Strategy::parse(" pipeline "), Some(Strategy::Pipeline));
        assert_eq!(Strategy::parse("magic"), None);
        assert_eq!(Strategy::default(), Strategy::Pipeline);
    }

    #[test]
    fn test_default_output_per_strategy() {
        let mut config = ExperimentConfig::default();
        assert_eq!(config.output_path(), PathBuf::from("pipeline_predictions.json"));

        config.strategy = Strategy::Single;
        assert_eq!(config.output_path(), PathBuf::from("single_predictions.json"));

        config.output = Some(PathBuf::from("out.json"));
        assert_eq!(config.output_path(), PathBuf::from("out.json"));
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = llm_config_from(lookup_from(&[])).unwrap();
        assert_eq!(config, LlmConfig::default());
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_llm_config_from_env() {
        let config = llm_config_from(lookup_from(&[
            ("LLM_API_BASE_URL", "http://gpu-box:9000/v1"),
            ("LLM_MODEL", "llama3"),
            ("LLM_API_KEY", ""),
            ("LLM_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://gpu-box:9000/v1");
        assert_eq!(config.model, "llama3");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, 30);

        assert!(llm_config_from(lookup_from(&[("LLM_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn test_experiment_config_from_env() {
        let config = experiment_config_from(lookup_from(&[
            ("EXTRACTION_STRATEGY", "single"),
            ("PROMPT_VARIANT", "few_shot"),
            ("INPUT_FILE", "Datasets/requirements.json"),
            ("RUN_CONCURRENCY", "4"),
            ("FILTER_ATOMIC_MAX_LEN", "6"),
            ("FILTER_ATOMIC_REQUIRE_DIGIT", "false"),
        ]))
        .unwrap();

        assert_eq!(config.strategy, Strategy::Single);
        assert_eq!(config.variant, PromptVariant::FewShot);
        assert_eq!(config.input, PathBuf::from("Datasets/requirements.json"));
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.atomic_policy.max_len, 6);
        assert!(!config.atomic_policy.require_digit);
    }

    #[test]
    fn test_experiment_config_rejects_invalid_values() {
        assert!(experiment_config_from(lookup_from(&[("EXTRACTION_STRATEGY", "x")])).is_err());
        assert!(experiment_config_from(lookup_from(&[("RUN_CONCURRENCY", "0")])).is_err());
        assert!(experiment_config_from(lookup_from(&[("FILTER_ATOMIC_MAX_LEN", "-1")])).is_err());
        assert!(experiment_config_from(lookup_from(&[("FILTER_ATOMIC_REQUIRE_DIGIT", "maybe")])).is_err());
    }

    #[test]
    fn test_apply_args() {
        let mut config = ExperimentConfig::default();
        let args: Vec<String> = ["--strategy", "per_field", "-o", "x.json", "--concurrency", "2"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        config.apply_args(&args).unwrap();
        assert_eq!(config.strategy, Strategy::PerField);
        assert_eq!(config.output_path(), PathBuf::from("x.json"));
        assert_eq!(config.concurrency, 2);

        let missing = vec!["--input".to_string()];
        assert!(matches!(
            config.apply_args(&missing),
            Err(ConfigError::MissingFlagValue(_))
        ));

        let unknown = vec!["--foo".to_string(), "bar".to_string()];
        assert!(matches!(config.apply_args(&unknown), Err(ConfigError::UnknownFlag(_))));
    }
}

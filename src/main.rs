// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// REQ EXTRACT CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Executa uma estratégia de extração sobre um dataset de requisitos.
//
// Uso:
//   req-extract                                  (configuração via .env)
//   req-extract --strategy single --variant few_shot
//   req-extract --strategy pipeline --input requirements.json --output out.json
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::path::PathBuf;

use anyhow::Context;
use req_extract::dataset::{load_requirements, write_records};
use req_extract::llm::OpenAiCompatClient;
use req_extract::prelude::*;

/// Tenta carregar o arquivo .env do diretório atual ou do diretório do crate
fn load_dotenv() {
    let possible_paths = [
        PathBuf::from(".env"),
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".env"),
    ];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!("✓ Carregado .env de: {:?}", path);
                    return;
                }
                Err(e) => eprintln!("⚠ Erro ao carregar {:?}: {}", path, e),
            }
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Req Extract v{}", req_extract::VERSION);
    eprintln!();
    eprintln!("Uso: {} [opções]", program);
    eprintln!();
    eprintln!("Opções:");
    eprintln!("  --strategy <s>     single | per_field | pipeline (padrão: pipeline)");
    eprintln!("  --variant <v>      zero_shot | one_shot | few_shot (apenas single)");
    eprintln!("  --input <arquivo>  Dataset JSON (padrão: requirements.json)");
    eprintln!("  --output <arquivo> Resultados (padrão: <estratégia>_predictions.json)");
    eprintln!("  --concurrency <n>  Requisitos simultâneos (padrão: 1)");
    eprintln!();
    eprintln!("Variáveis de ambiente: LLM_API_BASE_URL, LLM_MODEL, LLM_API_KEY,");
    eprintln!("  EXTRACTION_STRATEGY, PROMPT_VARIANT, INPUT_FILE, OUTPUT_FILE,");
    eprintln!("  RUN_CONCURRENCY, FILTER_ATOMIC_MAX_LEN, FILTER_ATOMIC_REQUIRE_DIGIT");
}

/// Argumentos após o nome do programa (vazio se argv vier vazio)
fn flag_args(args: &[String]) -> &[String] {
    args.get(1..).unwrap_or(&[])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carregar .env PRIMEIRO, antes de qualquer coisa
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("req-extract");

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(program);
        return Ok(());
    }

    let llm_config = load_llm_config()?;
    let mut config = load_experiment_config()?;
    if let Err(e) = config.apply_args(flag_args(&args)) {
        eprintln!("✗ {}", e);
        eprintln!();
        print_usage(program);
        std::process::exit(2);
    }

    let output = config.output_path();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(" REQ EXTRACT v{}", req_extract::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("Modelo:      {}", llm_config.model);
    println!("Estratégia:  {}", config.strategy);
    if config.strategy == Strategy::Single {
        println!("Variante:    {}", config.variant);
    }
    println!("Entrada:     {}", config.input.display());
    println!("Saída:       {}", output.display());
    println!();

    let requirements = load_requirements(&config.input)
        .with_context(|| format!("Falha ao carregar dataset {:?}", config.input))?;

    let client: Arc<dyn LlmClient> = Arc::new(OpenAiCompatClient::new(&llm_config)?);
    let strategy = build_strategy(&config, client.clone());
    let runner = ExperimentRunner::new(strategy, client).with_concurrency(config.concurrency);

    let report = runner.run(&requirements).await;

    write_records(&output, &report.records)
        .with_context(|| format!("Falha ao gravar resultados em {:?}", output))?;

    let summary = &report.summary;
    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(" PROCESSAMENTO CONCLUÍDO");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("🆔 Execução:      {}", summary.run_id);
    println!("📄 Requisitos:    {}", summary.requirements);
    println!("❌ Falhas:        {}", summary.failures);
    println!("🤖 Chamadas LLM:  {}", summary.llm_calls);
    println!("⏱️  Tempo total:   {:.2}s", summary.total_time_ms as f64 / 1000.0);
    println!("    - Média:      {:.1}ms/requisito", summary.avg_requirement_ms);
    println!("    - p95:        {}ms", summary.p95_requirement_ms);
    println!("💾 Arquivo salvo: {}", output.display());
    println!();

    Ok(())
}

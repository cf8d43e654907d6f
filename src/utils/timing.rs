// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIMING UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Medição de tempo por requisito e agregação de latências da execução.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::time::Instant;

/// Timer para medir duração de operações
pub struct ActionTimer {
    start: Instant,
    action_name: String,
}

impl ActionTimer {
    /// Inicia um novo timer para uma ação
    pub fn start(action_name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            action_name: action_name.into(),
        }
    }

    /// Retorna o tempo decorrido em milissegundos
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Para o timer e loga o tempo decorrido (nível debug)
    pub fn stop_and_log(self) -> u128 {
        let elapsed = self.elapsed_ms();
        log::debug!("⏱️  {} completado em {}ms", self.action_name, elapsed);
        elapsed
    }
}

/// Estatísticas de latência por requisito
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    samples: Vec<u128>,
}

impl LatencyStats {
    /// Cria estatísticas vazias
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra uma amostra (ms)
    pub fn record(&mut self, ms: u128) {
        self.samples.push(ms);
    }

    /// Número de amostras
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Soma de todas as amostras
    pub fn total_ms(&self) -> u128 {
        self.samples.iter().sum()
    }

    /// Média (0.0 sem amostras)
    pub fn avg_ms(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.total_ms() as f64 / self.samples.len() as f64
        }
    }

    /// Maior amostra
    pub fn max_ms(&self) -> u128 {
        self.samples.iter().copied().max().unwrap_or(0)
    }

    /// Percentil por nearest-rank (`p` em 0.0..=1.0)
    pub fn percentile_ms(&self, p: f64) -> u128 {
        if self.samples.is_empty() {
            return 0;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        let rank = (p.clamp(0.0, 1.0) * sorted.len() as f64).ceil() as usize;
        sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
    }

    /// Formata um resumo das estatísticas
    pub fn summary(&self) -> String {
        format!(
            "{} requisitos, avg {:.1}ms, p95 {}ms, max {}ms, total {}ms",
            self.count(),
            self.avg_ms(),
            self.percentile_ms(0.95),
            self.max_ms(),
            self.total_ms()
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SMART FILTER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Deduplicação de fragmentos extraídos com proteção de tokens atômicos.
//
// Um fragmento contido literalmente em outro fragmento (mais longo) é ruído
// ("the report" dentro de "the report of his actions") e é descartado.
// Exceção: tokens curtos com dígitos ("99%", "10x10", "85C") carregam
// informação própria e são mantidos mesmo quando contidos.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;

use rayon::prelude::*;

/// Comprimento máximo padrão (em caracteres) de um token atômico.
pub const DEFAULT_ATOMIC_MAX_LEN: usize = 10;

/// Política que decide se um fragmento é atômico.
///
/// Um fragmento é atômico quando:
/// - tem no máximo `max_len` caracteres (Unicode scalar values), e
/// - contém pelo menos um dígito ASCII, se `require_digit` estiver ativo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomicPolicy {
    /// Limite superior (inclusivo) de caracteres
    pub max_len: usize,
    /// Exige pelo menos um dígito
    pub require_digit: bool,
}

impl Default for AtomicPolicy {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_ATOMIC_MAX_LEN,
            require_digit: true,
        }
    }
}

impl AtomicPolicy {
    /// Cria uma política com o limite de comprimento informado.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            ..Self::default()
        }
    }

    /// Política que nunca protege nada (deduplicação pura por contenção).
    pub fn disabled() -> Self {
        Self {
            max_len: 0,
            require_digit: true,
        }
    }
}

/// Verifica se um fragmento é um token atômico segundo a política.
///
/// O fragmento vazio nunca é atômico.
pub fn is_atomic(fragment: &str, policy: &AtomicPolicy) -> bool {
    if fragment.is_empty() {
        return false;
    }

    let short = fragment.chars().count() <= policy.max_len;
    let numeric = !policy.require_digit || fragment.chars().any(|c| c.is_ascii_digit());

    short && numeric
}

/// Remove fragmentos redundantes preservando tokens atômicos.
///
/// 1. Remove duplicatas exatas
/// 2. Ordena por comprimento decrescente, empate por ordem lexicográfica
/// 3. Descarta cada candidato contido em outro candidato, exceto os atômicos
///
/// A saída segue a ordem do passo 2, portanto é determinística.
/// Função total: entrada vazia produz saída vazia.
///
/// # Exemplo
///
/// ```
/// use req_extract::filter::{smart_filter, AtomicPolicy};
///
/// let out = smart_filter(&["10x10", "a 10x10 grid"], &AtomicPolicy::default());
/// assert_eq!(out, vec!["a 10x10 grid", "10x10"]);
/// ```
pub fn smart_filter<S: AsRef<str>>(fragments: &[S], policy: &AtomicPolicy) -> Vec<String> {
    if fragments.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::with_capacity(fragments.len());
    let mut unique: Vec<&str> = fragments
        .iter()
        .map(AsRef::as_ref)
        .filter(|f| seen.insert(*f))
        .collect();

    unique.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });

    let kept: Vec<String> = unique
        .iter()
        .filter(|candidate| {
            let contained = unique
                .iter()
                .any(|other| other != *candidate && other.contains(**candidate));

            !contained || is_atomic(candidate, policy)
        })
        .map(|candidate| candidate.to_string())
        .collect();

    log::trace!(
        "smart_filter: {} → {} únicos → {} mantidos",
        fragments.len(),
        unique.len(),
        kept.len()
    );

    kept
}

/// Aplica [`smart_filter`] a várias listas independentes em paralelo.
///
/// A ordem das listas de saída corresponde à ordem de entrada.
pub fn smart_filter_many(lists: &[Vec<String>], policy: &AtomicPolicy) -> Vec<Vec<String>> {
    lists
        .par_iter()
        .map(|list| smart_filter(list, policy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(input: &[&str]) -> Vec<String> {
        smart_filter(input, &AtomicPolicy::default())
    }

    fn as_set(items: &[String]) -> HashSet<String> {
        items.iter().cloned().collect()
    }

    #[test]
    fn test_nested_phrases_collapse_to_longest() {
        let out = filter(&["the report", "the report of his actions", "his actions"]);
        assert_eq!(out, vec!["the report of his actions"]);
    }

    #[test]
    fn test_percentages_are_protected() {
        let out = filter(&["99%", "below 1%", "1%"]);
        assert_eq!(out, vec!["below 1%", "99%", "1%"]);
    }

    #[test]
    fn test_dimension_is_protected() {
        let out = filter(&["10x10", "a 10x10 grid"]);
        assert_eq!(out, vec!["a 10x10 grid", "10x10"]);
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        assert!(filter(&empty).is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(filter(&["X", "X"]), vec!["X"]);
        assert_eq!(filter(&["A", "A", "A"]), vec!["A"]);
    }

    #[test]
    fn test_empty_string_handling() {
        // Sozinha, a string vazia não está contida em nenhuma outra
        assert_eq!(filter(&[""]), vec![""]);
        // Com irmãs não vazias, é descartada
        assert_eq!(filter(&["", "abc"]), vec!["abc"]);
    }

    #[test]
    fn test_case_sensitive_matching() {
        let out = filter(&["The System", "the system shall start"]);
        assert_eq!(out, vec!["the system shall start", "The System"]);
    }

    #[test]
    fn test_whitespace_sensitive_matching() {
        let out = filter(&["the  report", "the report of his actions"]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_equal_length_ties_are_lexicographic() {
        let out = filter(&["beta", "alfa", "gama"]);
        assert_eq!(out, vec!["alfa", "beta", "gama"]);
    }

    #[test]
    fn test_long_numeric_phrase_is_not_atomic() {
        // "every 15 minutes" tem dígito mas é longo demais
        let out = filter(&["every 15 minutes", "transmit every 15 minutes"]);
        assert_eq!(out, vec!["transmit every 15 minutes"]);
    }

    #[test]
    fn test_short_word_without_digit_is_not_atomic() {
        let out = filter(&["fan", "the cooling fan"]);
        assert_eq!(out, vec!["the cooling fan"]);
    }

    #[test]
    fn test_transitive_containment() {
        let out = filter(&["a", "ab", "abc"]);
        assert_eq!(out, vec!["abc"]);
    }

    #[test]
    fn test_is_atomic() {
        let policy = AtomicPolicy::default();
        assert!(is_atomic("99%", &policy));
        assert!(is_atomic("10x10", &policy));
        assert!(is_atomic("85C", &policy));
        assert!(!is_atomic("", &policy));
        assert!(!is_atomic("percent", &policy));
        assert!(!is_atomic("within 10 minutes", &policy));
    }

    #[test]
    fn test_atomic_length_counts_chars_not_bytes() {
        let policy = AtomicPolicy::with_max_len(3);
        assert!(is_atomic("5°C", &policy));
        assert!(!is_atomic("50°C", &policy));
    }

    #[test]
    fn test_policy_without_digit_requirement() {
        let policy = AtomicPolicy {
            max_len: 3,
            require_digit: false,
        };
        let out = smart_filter(&["fan", "the cooling fan"], &policy);
        assert_eq!(out, vec!["the cooling fan", "fan"]);
    }

    #[test]
    fn test_disabled_policy_protects_nothing() {
        let out = smart_filter(&["1%", "below 1%"], &AtomicPolicy::disabled());
        assert_eq!(out, vec!["below 1%"]);
    }

    #[test]
    fn test_subset_keeps_atomic_and_drops_nested_phrase() {
        let out = filter(&[
            "every 15 minutes",
            "packet loss below 1%",
            "below 1%",
            "1%",
            "15",
            "minutes",
        ]);

        assert!(out.contains(&"1%".to_string()));
        assert!(out.contains(&"15".to_string()));
        assert!(out.contains(&"below 1%".to_string()));
        assert!(!out.contains(&"minutes".to_string()));
    }

    #[test]
    fn test_filter_many_preserves_order() {
        let lists = vec![
            vec!["the report".to_string(), "the report of his actions".to_string()],
            vec![],
            vec!["X".to_string(), "X".to_string()],
        ];
        let out = smart_filter_many(&lists, &AtomicPolicy::default());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], vec!["the report of his actions"]);
        assert!(out[1].is_empty());
        assert_eq!(out[2], vec!["X"]);
    }

    // Propriedades gerais, com políticas aleatórias
    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn fragment() -> impl Strategy<Value = String> {
            prop_oneof![
                Just(String::new()),
                "[ab1% ]{0,14}",
                "[a-c]{1,3}",
                "[0-9]{1,3}%?",
            ]
        }

        fn policy() -> impl Strategy<Value = AtomicPolicy> {
            (0usize..12, any::<bool>()).prop_map(|(max_len, require_digit)| AtomicPolicy {
                max_len,
                require_digit,
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn smart_filter_is_idempotent(input in prop::collection::vec(fragment(), 0..12), policy in policy()) {
                let once = smart_filter(&input, &policy);
                let twice = smart_filter(&once, &policy);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn smart_filter_output_is_unique_subset(input in prop::collection::vec(fragment(), 0..12), policy in policy()) {
                let out = smart_filter(&input, &policy);

                prop_assert_eq!(as_set(&out).len(), out.len());
                for item in &out {
                    prop_assert!(input.contains(item), "{:?} não estava na entrada", item);
                }
            }

            #[test]
            fn smart_filter_leaves_only_atomic_nested(input in prop::collection::vec(fragment(), 0..12), policy in policy()) {
                let out = smart_filter(&input, &policy);

                for a in &out {
                    for b in &out {
                        if a != b && b.contains(a.as_str()) {
                            prop_assert!(is_atomic(a, &policy), "{:?} sobreviveu dentro de {:?}", a, b);
                        }
                    }
                }
            }

            #[test]
            fn smart_filter_retains_atomic_and_maximal(input in prop::collection::vec(fragment(), 0..12), policy in policy()) {
                let out = smart_filter(&input, &policy);

                for item in &input {
                    let maximal = !input.iter().any(|other| other != item && other.contains(item.as_str()));
                    if is_atomic(item, &policy) || maximal {
                        prop_assert!(out.contains(item), "{:?} foi descartado", item);
                    }
                }
            }
        }
    }
}

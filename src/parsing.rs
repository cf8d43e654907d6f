// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PARSING DA SAÍDA DO LLM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Fronteira entre o texto livre gerado pelo modelo e os campos tipados.
// O modelo costuma envolver o JSON em blocos markdown, adicionar texto
// introdutório ou devolver valores fora do formato pedido (null, string
// em vez de lista). Tudo isso é resolvido aqui, antes do smart filter.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::types::{ExtractionRecord, SemanticField};

/// Remove cercas de bloco de código markdown (```json ... ```)
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z]*").expect("regex válida"));

/// Erros de parsing da saída do modelo
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Model output is empty")]
    EmptyOutput,

    #[error("No JSON object found in model output")]
    NoObject,

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Top-level JSON value is not an object")]
    NotAnObject,
}

/// Extrai o primeiro objeto JSON de um texto livre.
///
/// Estratégia:
/// 1. Remove cercas markdown
/// 2. Tenta o trecho entre o primeiro `{` e o último `}`
/// 3. Se falhar, tenta o primeiro trecho `{...}` balanceado
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, ParseError> {
    let cleaned = CODE_FENCE.replace_all(text, "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(ParseError::EmptyOutput);
    }

    let start = cleaned.find('{').ok_or(ParseError::NoObject)?;
    let end = cleaned.rfind('}').ok_or(ParseError::NoObject)?;
    if end < start {
        return Err(ParseError::NoObject);
    }

    let value = match serde_json::from_str::<Value>(&cleaned[start..=end]) {
        Ok(value) => value,
        Err(wide_err) => match balanced_object_span(&cleaned[start..]) {
            Some(span) => serde_json::from_str::<Value>(span)?,
            None => return Err(ParseError::InvalidJson(wide_err)),
        },
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

/// Retorna o primeiro objeto `{...}` balanceado no início do texto.
///
/// Chaves dentro de strings JSON (incluindo escapes) são ignoradas.
fn balanced_object_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Converte um valor JSON arbitrário em lista de strings.
///
/// - array → itens string (números e booleanos convertidos, null/objetos descartados)
/// - string → um item (string vazia → nenhum)
/// - null → vazio
fn coerce_to_strings(value: &Value) -> Vec<String> {
    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    match value {
        Value::Array(items) => items.iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect(),
    }
}

/// Campos semânticos extraídos de um objeto JSON do modelo.
#[derive(Debug, Clone, Default)]
pub struct ParsedFields {
    object: Map<String, Value>,
}

impl ParsedFields {
    /// Faz o parsing da saída bruta do modelo
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        extract_json_object(text).map(Self::from_object)
    }

    /// Faz o parsing da saída do agente único.
    ///
    /// Aceita `{"abstractions": [{...}]}` (usa a primeira abstração) ou um
    /// objeto com os campos diretamente.
    pub fn parse_abstractions(text: &str) -> Result<Self, ParseError> {
        let mut object = extract_json_object(text)?;

        match object.remove("abstractions") {
            Some(Value::Array(items)) => match items.into_iter().next() {
                Some(Value::Object(first)) => Ok(Self::from_object(first)),
                Some(_) => Err(ParseError::NotAnObject),
                None => Ok(Self::default()),
            },
            Some(Value::Object(inner)) => Ok(Self::from_object(inner)),
            Some(_) => Err(ParseError::NotAnObject),
            None => Ok(Self::from_object(object)),
        }
    }

    /// Envolve um objeto JSON já decodificado
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self { object }
    }

    /// Valores de um campo (vazio quando ausente)
    pub fn get(&self, field: SemanticField) -> Vec<String> {
        self.object
            .get(field.key())
            .map(coerce_to_strings)
            .unwrap_or_default()
    }

    /// Verifica se algum campo semântico está presente
    pub fn has_any_field(&self) -> bool {
        SemanticField::ALL
            .iter()
            .any(|f| self.object.contains_key(f.key()))
    }

    /// Copia todos os campos para um registro, sem filtragem
    pub fn fill_record(&self, record: &mut ExtractionRecord) {
        for field in SemanticField::ALL {
            record.set_field(field, self.get(field));
        }
    }
}

/// Faz o parsing e registra falhas, retornando campos vazios no lugar.
///
/// Equivale ao fallback "objeto vazio" usado pelos agentes: o chamador
/// decide que um agente com saída ilegível não contribui com valores.
pub fn parse_or_default(agent: &str, text: &str) -> ParsedFields {
    match ParsedFields::parse(text) {
        Ok(fields) => fields,
        Err(e) => {
            log::warn!(
                "⚠️  [{}] Falha ao decodificar JSON: {} | texto: {}...",
                agent,
                e,
                crate::utils::preview(text, 100)
            );
            ParsedFields::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        let map = extract_json_object(r#"{"Entity": ["the display"]}"#).unwrap();
        assert_eq!(map["Entity"][0], "the display");
    }

    #[test]
    fn test_markdown_and_intro_text() {
        let text = "Here is the result:\n```json\n{\"Trigger\": [\"every 60 seconds\"]}\n```\nDone.";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["Trigger"][0], "every 60 seconds");
    }

    #[test]
    fn test_empty_output() {
        assert!(matches!(extract_json_object("   "), Err(ParseError::EmptyOutput)));
    }

    #[test]
    fn test_no_braces() {
        assert!(matches!(
            extract_json_object("I cannot extract anything"),
            Err(ParseError::NoObject)
        ));
        assert!(matches!(extract_json_object("} reversed {"), Err(ParseError::NoObject)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            extract_json_object("{Entity: [the display]}"),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_falls_back_to_balanced_span() {
        let text = r#"{"Action": ["shall refresh"]} and also {"note": "}"}"#;
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["Action"][0], "shall refresh");
    }

    #[test]
    fn test_balanced_span_ignores_braces_in_strings() {
        let span = balanced_object_span(r#"{"a": "x}\"{y"} tail"#).unwrap();
        assert_eq!(span, r#"{"a": "x}\"{y"}"#);
        assert!(balanced_object_span("{\"a\": 1").is_none());
    }

    #[test]
    fn test_coercion_of_field_values() {
        let fields = ParsedFields::parse(
            r#"{"Purpose": "To ensure data safety", "Trigger": null,
                "Condition": ["below 1%", 99, null, {"x": 1}, ""],
                "Entity": ""}"#,
        )
        .unwrap();

        assert_eq!(fields.get(SemanticField::Purpose), vec!["To ensure data safety"]);
        assert!(fields.get(SemanticField::Trigger).is_empty());
        assert_eq!(fields.get(SemanticField::Condition), vec!["below 1%", "99"]);
        assert!(fields.get(SemanticField::Entity).is_empty());
        assert!(fields.get(SemanticField::Action).is_empty());
        assert!(fields.has_any_field());
    }

    #[test]
    fn test_parse_abstractions_wrapper() {
        let text = r#"{"abstractions": [{"Main_actor": ["the offensive player"], "Action": ["takes"]}]}"#;
        let fields = ParsedFields::parse_abstractions(text).unwrap();
        assert_eq!(fields.get(SemanticField::MainActor), vec!["the offensive player"]);

        let bare = ParsedFields::parse_abstractions(r#"{"Action": ["takes"]}"#).unwrap();
        assert_eq!(bare.get(SemanticField::Action), vec!["takes"]);

        let empty = ParsedFields::parse_abstractions(r#"{"abstractions": []}"#).unwrap();
        assert!(!empty.has_any_field());
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            ParsedFields::parse_abstractions(r#"{"abstractions": ["x"]}"#),
            Err(ParseError::NotAnObject)
        ));
    }

    #[test]
    fn test_parse_or_default() {
        let fields = parse_or_default("entity", "no json here");
        assert!(!fields.has_any_field());
    }

    #[test]
    fn test_fill_record() {
        let fields = ParsedFields::parse(r#"{"Entity": ["The system"], "Action": ["shall be available"]}"#).unwrap();
        let mut record = ExtractionRecord::default();
        fields.fill_record(&mut record);
        assert_eq!(record.entity, vec!["The system"]);
        assert_eq!(record.action, vec!["shall be available"]);
        assert!(record.purpose.is_empty());
    }
}

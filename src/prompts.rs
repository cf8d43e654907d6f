//! # Prompts de Extração
//!
//! Prompts usados pelas três estratégias de extração.
//!
//! ## Prompts Disponíveis
//!
//! - [`single_agent_prompt`] - Prompt monolítico com os 8 campos (zero/one/few-shot)
//! - [`field_agent_prompt`] - Um prompt especializado por campo semântico
//! - [`entity_agent_prompt`] - Estágio 1 do pipeline (atores e entidades)
//! - [`action_agent_prompt`] - Estágio 2 do pipeline (ações, com contexto injetado)
//! - [`logic_agent_prompt`] - Estágio 3 do pipeline (gatilhos e condições)

use std::fmt;

use crate::types::SemanticField;
use crate::utils::{estimate_tokens, format_list};

/// Par de prompts (sistema + usuário) para enviar ao LLM
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPair {
    /// Prompt de sistema que define o comportamento do LLM
    pub system: String,
    /// Prompt do usuário com o requisito a analisar
    pub user: String,
}

impl PromptPair {
    /// Cria um novo par de prompts
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Retorna o total de caracteres nos prompts
    pub fn total_chars(&self) -> usize {
        self.system.len() + self.user.len()
    }

    /// Estimativa de tokens (aproximado: 4 chars = 1 token)
    pub fn estimated_tokens(&self) -> usize {
        estimate_tokens(&self.system) + estimate_tokens(&self.user)
    }
}

impl fmt::Display for PromptPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[System: {} chars, User: {} chars]",
            self.system.len(),
            self.user.len()
        )
    }
}

/// Variante de prompt do agente único
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptVariant {
    /// Apenas instruções
    ZeroShot,
    /// Instruções + 1 exemplo
    #[default]
    OneShot,
    /// Instruções + 3 exemplos
    FewShot,
}

impl PromptVariant {
    /// Converte string de configuração (case-insensitive).
    /// Valores desconhecidos retornam `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "zero_shot" | "zero" => Some(Self::ZeroShot),
            "one_shot" | "one" => Some(Self::OneShot),
            "few_shot" | "few" => Some(Self::FewShot),
            _ => None,
        }
    }

    /// Nome canônico
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroShot => "zero_shot",
            Self::OneShot => "one_shot",
            Self::FewShot => "few_shot",
        }
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// AGENTE ÚNICO
// ============================================================================

const SINGLE_AGENT_INSTRUCTIONS: &str = r#"You are an expert Requirements Engineer specialized in Requirements Modeling.
Your task is to transform a software requirement into a structured JSON abstraction.

### EXTRACTION RULES:
Extract all relevant substrings exactly as they appear in the text. Return each field as a LIST of strings.
If a component is not present, return an empty list [].

1. "Purpose": The reason why the functionality described by the software requirement needs to be implemented.
2. "Trigger": An event establishing a temporal context and a causal link that constrains the requirement's applicability. A trigger is also a condition.
3. "Condition": Something that limits the scope of application of the requirement.
4. "Precondition": A condition that must hold in the requirement's context. A precondition is always a condition.
5. "Main_actor": The main user of the functionality described by the requirement. The main actor is often also an entity. The main actor is who gets the advantages of the requirement, not the grammatical subject of the requirement.
6. "Entity": Something involved in the actions described in the requirement. Can be both human or not (e.g. the system).
7. "Action": Something that happens in the scenario described by the software requirement.
8. "System_response": The behaviour of the system in the described scenario. A system response is always an action.

### FORMATTING RULES:
- Return ONLY a valid JSON object.
- Every value MUST be a LIST of strings.
- Do NOT add markdown code blocks.
- Extract substrings EXACTLY. Do not paraphrase.

JSON STRUCTURE:
{
  "abstractions": [
    {
      "Purpose": [], "Trigger": [], "Condition": [], "Precondition": [],
      "Main_actor": [], "Entity": [], "Action": [], "System_response": []
    }
  ]
}"#;

const EXAMPLE_SHOT: &str = r#"Requirement: When the offensive player takes a shot the product shall simulate the sound of a ship at sea.
JSON: {
  "abstractions": [{
    "Purpose": [],
    "Trigger": ["When the offensive player takes a shot"],
    "Condition": ["When the offensive player takes a shot"],
    "Precondition": [],
    "Main_actor": ["the offensive player"],
    "Entity": ["offensive player", "the product", "a shot", "sound of a ship at sea"],
    "Action": ["takes", "simulate"],
    "System_response": ["simulate the sound of a ship at sea"]
  }]
}"#;

const EXAMPLE_REPORT: &str = r#"Requirement: The system will return to the user the report of his actions every 2 minutes.
JSON: {
  "abstractions": [{
    "Purpose": [],
    "Trigger": ["every 2 minutes"],
    "Condition": ["every 2 minutes", "of his actions"],
    "Precondition": [],
    "Main_actor": ["the user"],
    "Entity": ["The system", "the user", "the report"],
    "Action": ["will return"],
    "System_response": ["will return"]
  }]
}"#;

const EXAMPLE_AVAILABILITY: &str = r#"Requirement: The system shall be available 99% of the time during business hours.
JSON: {
  "abstractions": [{
    "Purpose": [],
    "Trigger": [],
    "Condition": ["during business hours"],
    "Precondition": ["99% of the time", "during business hours"],
    "Main_actor": [],
    "Entity": ["The system"],
    "Action": ["shall be available"],
    "System_response": ["shall be available"]
  }]
}"#;

/// Gera o prompt monolítico do agente único
///
/// # Arguments
/// * `variant` - Quantidade de exemplos incluídos no prompt de sistema
/// * `requirement` - Texto do requisito (vai integralmente no prompt do usuário)
pub fn single_agent_prompt(variant: PromptVariant, requirement: &str) -> PromptPair {
    let system = match variant {
        PromptVariant::ZeroShot => SINGLE_AGENT_INSTRUCTIONS.to_string(),
        PromptVariant::OneShot => {
            format!("{}\n\n### EXAMPLE:\n{}", SINGLE_AGENT_INSTRUCTIONS, EXAMPLE_SHOT)
        }
        PromptVariant::FewShot => format!(
            "{}\n\n### EXAMPLES:\n{}\n\n{}\n\n{}",
            SINGLE_AGENT_INSTRUCTIONS, EXAMPLE_SHOT, EXAMPLE_REPORT, EXAMPLE_AVAILABILITY
        ),
    };

    PromptPair::new(system, requirement)
}

// ============================================================================
// AGENTES POR CAMPO
// ============================================================================

const FIELD_SHARED_RULES: &str = "You are an expert Requirements Engineer.
Extract the substring EXACTLY as it appears in the text.
Return ONLY a valid JSON object. No markdown.
Every value MUST be a LIST of strings.";

const FIELD_EXAMPLE_REQUIREMENT: &str =
    "When the offensive player takes a shot the product shall simulate the sound of a ship at sea.";

/// Tarefa, requisito de exemplo e resposta de exemplo de cada campo
fn field_task(field: SemanticField) -> (&'static str, &'static str, &'static str) {
    match field {
        SemanticField::Purpose => (
            "the \"Purpose\" (The reason why the functionality is implemented)",
            FIELD_EXAMPLE_REQUIREMENT,
            r#"{"Purpose": []}"#,
        ),
        SemanticField::Trigger => (
            "the \"Trigger\" (Events establishing temporal context/causal link)",
            FIELD_EXAMPLE_REQUIREMENT,
            r#"{"Trigger": ["When the offensive player takes a shot"]}"#,
        ),
        SemanticField::Condition => (
            "the \"Condition\" (Something that limits the scope of application)",
            FIELD_EXAMPLE_REQUIREMENT,
            r#"{"Condition": ["When the offensive player takes a shot"]}"#,
        ),
        SemanticField::Precondition => (
            "the \"Precondition\" (A condition that must hold in the requirement's context)",
            "The system shall be available 99% of the time during business hours.",
            r#"{"Precondition": ["99% of the time", "during business hours"]}"#,
        ),
        SemanticField::MainActor => (
            "the \"Main_actor\" (The main user or system initiating the functionality)",
            FIELD_EXAMPLE_REQUIREMENT,
            r#"{"Main_actor": ["the product"]}"#,
        ),
        SemanticField::Entity => (
            "all \"Entities\" (Things involved in the actions, human or not)",
            FIELD_EXAMPLE_REQUIREMENT,
            r#"{"Entity": ["offensive player", "the product", "a shot", "sound of a ship at sea"]}"#,
        ),
        SemanticField::Action => (
            "all \"Actions\" (Things that happen in the scenario)",
            FIELD_EXAMPLE_REQUIREMENT,
            r#"{"Action": ["takes", "simulate"]}"#,
        ),
        SemanticField::SystemResponse => (
            "the \"System_response\" (The specific behavior of the system)",
            FIELD_EXAMPLE_REQUIREMENT,
            r#"{"System_response": ["simulate the sound of a ship at sea"]}"#,
        ),
    }
}

/// Gera o prompt do agente especializado em um único campo
pub fn field_agent_prompt(field: SemanticField, requirement: &str) -> PromptPair {
    let (task, example, example_json) = field_task(field);

    let system = format!(
        "{}\nTask: Extract {}.\nExample: \"{}\"\nJSON: {}",
        FIELD_SHARED_RULES, task, example, example_json
    );
    let user = format!("Requirement: {}\nJSON:", requirement);

    PromptPair::new(system, user)
}

// ============================================================================
// PIPELINE: ENTITY → ACTION → LOGIC
// ============================================================================

const ENTITY_AGENT_SYSTEM: &str = r#"You are a Semantic Entity Extractor.
Your task is to extract all the participating "Actors" and "Entities" from the requirement text.

### DEFINITIONS:

1. **Main_actor** (The Doer):
   - The active subject performing the operation.
   - Can be a Human (e.g., "User", "Admin") or the System itself (e.g., "The System", "The Product", "The Server").
   - **Constraint**: Must be EXPLICITLY mentioned in the text. If passive voice ("Data is saved"), Main_actor is `[]`.

2. **Entity** (The Participants):
   - **INCLUDE**: Users, Systems, Components, Hardware, Data (files, reports, inputs), UI Elements (buttons, screens).
   - **MIRROR RULE**: Include the Main_actor here too.
   - **EXCLUSION RULES**:
     1. **NO TIME PHRASES**: Do NOT include time periods, durations, or frequencies (e.g., "business hours", "6 months", "seconds", "daily").
     2. **NO METRICS**: Do NOT include standalone values like "99%", "500ms", "10x10".

### OUTPUT FORMAT:
Return a valid JSON object with "Main_actor" and "Entity" keys (lists of strings).

### EXAMPLES:

Input: "The system shall refresh the display every 60 seconds."
Output:
{"Main_actor": ["The system"], "Entity": ["The system", "the display"]}

Input: "The HR Manager reviews the vacation request."
Output:
{"Main_actor": ["The HR Manager"], "Entity": ["The HR Manager", "the vacation request"]}

Input: "The product must be available during business hours."
Output:
{"Main_actor": ["The product"], "Entity": ["The product"]}

Input: "Audit logs are generated automatically."
Output:
{"Main_actor": [], "Entity": ["Audit logs"]}

IMPORTANT: Return ONLY the raw JSON string. Start with '{' and end with '}'."#;

const ACTION_AGENT_SYSTEM: &str = r#"You are a Semantic Behavior Analyst.
Your task is to analyze the "DOING" part of the requirement (Verbs and Actions).
You will receive a requirement and the Entities (Actors/Objects) already found.

Extract 3 components into a JSON object:
1. "Action": The list of operations.
2. "System_response": A subset of Actions performed explicitly or implicitly by the System.
3. "Purpose": The goal/intent (e.g., "to...", "so that...", "that allows...").

### DEFINITIONS & RULES:
1. **Action**: Extract the **verbal phrase**, not just the single word.
   - Keep modal verbs ("shall", "must", "will", "can").
   - Include the direct object if it clarifies the action (e.g., "shall refresh the display" instead of "refresh").
   - For User actions, simple phrases are fine (e.g., "clicks", "has access").
2. **System_response**: Identify which Actions are performed by the System.
   - Passive voice (e.g., "The data is stored") is a System Response.
   - Copy the full phrase from the Action list.
3. **Purpose**: Extract the intent clause ("to [verb]", "in order to", "so that", "that allows for").
   - If not present, return an empty list.

### EXAMPLES:

Input Req: "The software shall calculate the tax rate automatically when the user submits the form."
Context: Actors: ["The user"], Entities: ["The software", "the tax rate", "the form"]
Output:
{"Action": ["shall calculate the tax rate", "submits"], "System_response": ["shall calculate the tax rate"], "Purpose": []}

Input Req: "To ensure data safety, the backup must be completed within 10 minutes."
Context: Actors: [], Entities: ["the backup"]
Output:
{"Action": ["must be completed"], "System_response": ["must be completed"], "Purpose": ["To ensure data safety"]}

Input Req: "The interface shall provide a search bar that allows the user to find specific items."
Context: Actors: ["the user"], Entities: ["The interface", "a search bar", "specific items"]
Output:
{"Action": ["shall provide a search bar", "find"], "System_response": ["shall provide a search bar"], "Purpose": ["that allows the user to find specific items"]}

IMPORTANT: Return ONLY the raw JSON string.
- Do NOT output any introductory text or reasoning.
- Start the output strictly with '{' and end with '}'."#;

const LOGIC_AGENT_SYSTEM: &str = r#"You are a Semantic Logic Expert.
Extract logical constraints ("Trigger", "Precondition", "Condition").

### CLASSIFICATION RULES:
1. **DYNAMIC Requirement** (Action based on Time/Event):
   - Keywords: "When", "If", "Every", "Upon", "After", "Within".
   - **Trigger**: Extract the specific time or event clause.
2. **STATIC Requirement** (Capability/Property):
   - Describes what the system IS, HAS, or SUPPORTS.
   - **Trigger**: MUST be empty `[]`.

### EXTRACTION RULES:
- **Condition (Master List)**: Contains EVERYTHING (Trigger text + Preconditions + Rules).
- **Atomic Numbers**: Extract percentages (e.g., "1%") and dimensions/values (e.g., "85C") as separate items in Condition.

### CONTRASTIVE EXAMPLES:

Input (STATIC): "The database server must support SQL encryption for all stored procedures."
Output:
{"Trigger": [], "Precondition": ["for all stored procedures"], "Condition": ["support SQL encryption", "for all stored procedures"]}

Input (DYNAMIC - TIME): "The sensor network shall transmit telemetry data every 15 minutes with a packet loss below 1%."
Output:
{"Trigger": ["every 15 minutes"], "Precondition": ["below 1%"], "Condition": ["every 15 minutes", "packet loss below 1%", "1%"]}

Input (DYNAMIC - EVENT): "If the internal temperature exceeds 85C, the cooling fan must activate at maximum speed."
Output:
{"Trigger": ["If the internal temperature exceeds 85C"], "Precondition": ["at maximum speed"], "Condition": ["If the internal temperature exceeds 85C", "exceeds 85C", "85C", "at maximum speed"]}

Return ONLY the raw JSON string."#;

/// Marcador presente no prompt de sistema do agente de entidades
pub const ENTITY_AGENT_MARKER: &str = "Semantic Entity Extractor";
/// Marcador presente no prompt de sistema do agente de ações
pub const ACTION_AGENT_MARKER: &str = "Semantic Behavior Analyst";
/// Marcador presente no prompt de sistema do agente de lógica
pub const LOGIC_AGENT_MARKER: &str = "Semantic Logic Expert";

/// Estágio 1: atores e entidades
pub fn entity_agent_prompt(requirement: &str) -> PromptPair {
    PromptPair::new(ENTITY_AGENT_SYSTEM, format!("Input: \"{}\"", requirement))
}

/// Estágio 2: ações, com os atores/entidades do estágio 1 como contexto
pub fn action_agent_prompt(requirement: &str, actors: &[String], entities: &[String]) -> PromptPair {
    let context = format!(
        "Actors: {}, Entities: {}",
        format_list(actors),
        format_list(entities)
    );

    PromptPair::new(
        ACTION_AGENT_SYSTEM,
        format!("Input Req: \"{}\"\nContext: {}", requirement, context),
    )
}

/// Estágio 3: gatilhos, pré-condições e condições
pub fn logic_agent_prompt(requirement: &str) -> PromptPair {
    PromptPair::new(LOGIC_AGENT_SYSTEM, format!("Input: \"{}\"", requirement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_variant_parse() {
        assert_eq!(PromptVariant::parse("zero_shot"), Some(PromptVariant::ZeroShot));
        assert_eq!(PromptVariant::parse("One-Shot"), Some(PromptVariant::OneShot));
        assert_eq!(PromptVariant::parse(" FEW "), Some(PromptVariant::FewShot));
        assert_eq!(PromptVariant::parse("two_shot"), None);
        assert_eq!(PromptVariant::default(), PromptVariant::OneShot);
    }

    #[test]
    fn test_single_agent_variants_grow() {
        let req = "The system shall boot.";
        let zero = single_agent_prompt(PromptVariant::ZeroShot, req);
        let one = single_agent_prompt(PromptVariant::OneShot, req);
        let few = single_agent_prompt(PromptVariant::FewShot, req);

        assert_eq!(zero.user, req);
        assert!(!zero.system.contains("### EXAMPLE"));
        assert!(one.system.contains("offensive player"));
        assert!(few.system.contains("99% of the time"));
        assert!(zero.total_chars() < one.total_chars());
        assert!(one.total_chars() < few.total_chars());
    }

    #[test]
    fn test_field_prompts_name_their_field() {
        for field in SemanticField::ALL {
            let prompt = field_agent_prompt(field, "The user logs in.");
            assert!(prompt.system.contains(field.key()), "{}", field);
            assert!(prompt.system.starts_with(FIELD_SHARED_RULES));
            assert_eq!(prompt.user, "Requirement: The user logs in.\nJSON:");
        }
    }

    #[test]
    fn test_action_prompt_injects_context() {
        let prompt = action_agent_prompt(
            "The HR Manager reviews the vacation request.",
            &["The HR Manager".to_string()],
            &["The HR Manager".to_string(), "the vacation request".to_string()],
        );
        assert!(prompt.system.contains(ACTION_AGENT_MARKER));
        assert!(prompt.user.contains(r#"Actors: ["The HR Manager"]"#));
        assert!(prompt
            .user
            .contains(r#"Entities: ["The HR Manager","the vacation request"]"#));
    }

    #[test]
    fn test_pipeline_markers() {
        assert!(entity_agent_prompt("x").system.contains(ENTITY_AGENT_MARKER));
        assert!(logic_agent_prompt("x").system.contains(LOGIC_AGENT_MARKER));
        assert!(!logic_agent_prompt("x").system.contains(ENTITY_AGENT_MARKER));
    }

    #[test]
    fn test_prompt_pair_display() {
        let pair = PromptPair::new("abc", "de");
        assert_eq!(pair.to_string(), "[System: 3 chars, User: 2 chars]");
        assert_eq!(pair.estimated_tokens(), 2);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;

use serde::{Deserialize, Serialize};

/// Campos semânticos extraídos de um requisito.
///
/// Os nomes serializados (`Main_actor`, `System_response`...) são os mesmos
/// usados pelas chaves JSON dos prompts e do arquivo de resultados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticField {
    /// Razão pela qual a funcionalidade existe
    Purpose,
    /// Evento que estabelece contexto temporal/causal
    Trigger,
    /// Algo que limita o escopo de aplicação
    Condition,
    /// Condição que precisa valer no contexto do requisito
    Precondition,
    /// Usuário ou sistema principal
    #[serde(rename = "Main_actor")]
    MainActor,
    /// Qualquer coisa envolvida nas ações
    Entity,
    /// Algo que acontece no cenário
    Action,
    /// Comportamento do sistema no cenário
    #[serde(rename = "System_response")]
    SystemResponse,
}

impl SemanticField {
    /// Todos os campos, na ordem em que os agentes por campo são executados
    pub const ALL: [SemanticField; 8] = [
        Self::Purpose,
        Self::Trigger,
        Self::Condition,
        Self::Precondition,
        Self::MainActor,
        Self::Entity,
        Self::Action,
        Self::SystemResponse,
    ];

    /// Chave JSON do campo
    pub fn key(&self) -> &'static str {
        match self {
            Self::Purpose => "Purpose",
            Self::Trigger => "Trigger",
            Self::Condition => "Condition",
            Self::Precondition => "Precondition",
            Self::MainActor => "Main_actor",
            Self::Entity => "Entity",
            Self::Action => "Action",
            Self::SystemResponse => "System_response",
        }
    }
}

impl fmt::Display for SemanticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Identificador de um requisito no dataset (numérico ou textual).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementId {
    /// Id numérico
    Number(i64),
    /// Id textual
    Text(String),
}

impl Default for RequirementId {
    fn default() -> Self {
        Self::Text("unknown".into())
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Requisito de software a ser analisado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Identificador (padrão: "unknown")
    #[serde(default)]
    pub id: RequirementId,
    /// Texto do requisito (padrão: vazio)
    #[serde(rename = "Text", default)]
    pub text: String,
}

impl Requirement {
    /// Cria um requisito
    pub fn new(id: RequirementId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Registro final de extração de um requisito.
///
/// É o formato gravado no arquivo de resultados.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub id: RequirementId,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Main_actor", default)]
    pub main_actor: Vec<String>,
    #[serde(rename = "Entity", default)]
    pub entity: Vec<String>,
    #[serde(rename = "Action", default)]
    pub action: Vec<String>,
    #[serde(rename = "System_response", default)]
    pub system_response: Vec<String>,
    #[serde(rename = "Purpose", default)]
    pub purpose: Vec<String>,
    #[serde(rename = "Trigger", default)]
    pub trigger: Vec<String>,
    #[serde(rename = "Precondition", default)]
    pub precondition: Vec<String>,
    #[serde(rename = "Condition", default)]
    pub condition: Vec<String>,
}

impl ExtractionRecord {
    /// Registro vazio (todos os campos sem valores) para um requisito
    pub fn empty(requirement: &Requirement) -> Self {
        Self {
            id: requirement.id.clone(),
            text: requirement.text.clone(),
            ..Self::default()
        }
    }

    /// Valores de um campo
    pub fn field(&self, field: SemanticField) -> &[String] {
        match field {
            SemanticField::Purpose => &self.purpose,
            SemanticField::Trigger => &self.trigger,
            SemanticField::Condition => &self.condition,
            SemanticField::Precondition => &self.precondition,
            SemanticField::MainActor => &self.main_actor,
            SemanticField::Entity => &self.entity,
            SemanticField::Action => &self.action,
            SemanticField::SystemResponse => &self.system_response,
        }
    }

    /// Acesso mutável aos valores de um campo
    pub fn field_mut(&mut self, field: SemanticField) -> &mut Vec<String> {
        match field {
            SemanticField::Purpose => &mut self.purpose,
            SemanticField::Trigger => &mut self.trigger,
            SemanticField::Condition => &mut self.condition,
            SemanticField::Precondition => &mut self.precondition,
            SemanticField::MainActor => &mut self.main_actor,
            SemanticField::Entity => &mut self.entity,
            SemanticField::Action => &mut self.action,
            SemanticField::SystemResponse => &mut self.system_response,
        }
    }

    /// Define os valores de um campo
    pub fn set_field(&mut self, field: SemanticField, values: Vec<String>) {
        *self.field_mut(field) = values;
    }

    /// Total de fragmentos em todos os campos
    pub fn fragment_count(&self) -> usize {
        SemanticField::ALL.iter().map(|f| self.field(*f).len()).sum()
    }

    /// Verifica se nenhum campo tem valores
    pub fn is_empty(&self) -> bool {
        self.fragment_count() == 0
    }
}

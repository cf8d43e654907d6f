// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DATASET DE REQUISITOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Entrada: array JSON de objetos `{ "id": ..., "Text": ... }`.
// Saída: array JSON (indentado) de `ExtractionRecord`.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{ExtractionRecord, Requirement};

/// Erros de leitura/escrita do dataset
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Faz o parsing de um dataset a partir de texto JSON
pub fn parse_requirements(json: &str) -> Result<Vec<Requirement>, DatasetError> {
    Ok(serde_json::from_str(json)?)
}

/// Carrega o dataset de requisitos de um arquivo
pub fn load_requirements(path: &Path) -> Result<Vec<Requirement>, DatasetError> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let requirements = parse_requirements(&content)?;
    log::info!("📂 {} requisitos carregados de {:?}", requirements.len(), path);
    Ok(requirements)
}

/// Grava os registros de extração como JSON indentado
pub fn write_records(path: &Path, records: &[ExtractionRecord]) -> Result<(), DatasetError> {
    let json = serde_json::to_string_pretty(records)?;

    fs::write(path, json).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("💾 {} registros gravados em {:?}", records.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequirementId;

    #[test]
    fn test_parse_requirements() {
        let json = r#"[
            {"id": 1, "Text": "The system shall refresh the display every 60 seconds."},
            {"id": "R2", "Text": "Audit logs are generated automatically.", "Purpose": []},
            {"Text": "No id here."},
            {"id": 4}
        ]"#;

        let reqs = parse_requirements(json).unwrap();
        assert_eq!(reqs.len(), 4);
        assert_eq!(reqs[0].id, RequirementId::Number(1));
        assert_eq!(reqs[1].id, RequirementId::Text("R2".into()));
        assert_eq!(reqs[2].id.to_string(), "unknown");
        assert!(reqs[3].text.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(
            parse_requirements(r#"{"id": 1}"#),
            Err(DatasetError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_requirements(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_write_and_reload_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let req = Requirement::new(RequirementId::Number(3), "The product must be available.");
        let mut record = ExtractionRecord::empty(&req);
        record.entity = vec!["The product".into()];

        write_records(&path, &[record.clone()]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"Entity\": [\n"));

        let back: Vec<ExtractionRecord> = serde_json::from_str(&written).unwrap();
        assert_eq!(back, vec![record]);
    }
}

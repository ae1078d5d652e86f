use crate::error::{Result, SilverLinkError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A single welfare benefit as published in the source catalog.
///
/// `name` is the primary key: the validator accepts a model recommendation
/// only if its name matches one of these records character for character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitRecord {
    pub name: String,
    pub target: String,
    pub amount: String,
    pub description: String,
    pub documents: Vec<String>,
    pub contact: String,
}

/// The read-only benefit catalog, loaded once at startup.
///
/// Records keep their source order (the prompt enumerates them in that order)
/// and are indexed by exact name for allow-list lookups. The catalog is never
/// mutated after construction, so it can be shared freely across requests.
#[derive(Debug, Clone)]
pub struct BenefitCatalog {
    records: Vec<BenefitRecord>,
    index: HashMap<String, usize>,
}

const BUNDLED_CATALOG: &str = include_str!("../data/welfare_data.json");

impl BenefitCatalog {
    /// Builds a catalog from records, failing fast on schema violations.
    pub fn from_records(records: Vec<BenefitRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            validate_record(record)?;
            if index.insert(record.name.clone(), i).is_some() {
                return Err(SilverLinkError::CatalogDuplicate(record.name.clone()));
            }
        }

        info!("Loaded benefit catalog with {} records", records.len());
        Ok(Self { records, index })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<BenefitRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Loading benefit catalog from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The catalog shipped with the crate, embedded at compile time.
    pub fn bundled() -> Self {
        Self::from_json_str(BUNDLED_CATALOG).expect("bundled welfare catalog is well-formed")
    }

    /// Exact, case-sensitive lookup. No fuzzy matching: this is an allow-list.
    pub fn get(&self, name: &str) -> Option<&BenefitRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn records(&self) -> &[BenefitRecord] {
        &self.records
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pretty-printed JSON of every record, for inlining into prompts.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}

fn validate_record(record: &BenefitRecord) -> Result<()> {
    let fields = [
        ("name", &record.name),
        ("target", &record.target),
        ("amount", &record.amount),
        ("description", &record.description),
        ("contact", &record.contact),
    ];

    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(SilverLinkError::CatalogInvalid {
                name: record.name.clone(),
                details: format!("field '{}' is empty", field),
            });
        }
    }

    for (i, document) in record.documents.iter().enumerate() {
        if document.trim().is_empty() {
            return Err(SilverLinkError::CatalogInvalid {
                name: record.name.clone(),
                details: format!("document entry #{} is empty", i),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(name: &str) -> BenefitRecord {
        BenefitRecord {
            name: name.to_string(),
            target: "만 65세 이상".to_string(),
            amount: "월 최대 32만원".to_string(),
            description: "매달 연금을 지급합니다.".to_string(),
            documents: vec!["신분증".to_string()],
            contact: "129".to_string(),
        }
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = BenefitCatalog::bundled();
        assert!(!catalog.is_empty());
        assert!(catalog.contains("기초연금"));
        assert!(catalog.contains("독거노인 돌봄 서비스"));
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let catalog = BenefitCatalog::from_records(vec![sample_record("기초연금")]).unwrap();
        assert!(catalog.get("기초연금").is_some());
        assert!(catalog.get("기초연금 ").is_none());
        assert!(catalog.get("기초 연금").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result =
            BenefitCatalog::from_records(vec![sample_record("기초연금"), sample_record("기초연금")]);
        assert!(matches!(
            result,
            Err(SilverLinkError::CatalogDuplicate(name)) if name == "기초연금"
        ));
    }

    #[test]
    fn test_empty_field_fails_fast() {
        let mut record = sample_record("기초연금");
        record.amount = "  ".to_string();
        let result = BenefitCatalog::from_records(vec![record]);
        assert!(matches!(
            result,
            Err(SilverLinkError::CatalogInvalid { ref details, .. }) if details.contains("amount")
        ));
    }

    #[test]
    fn test_missing_required_field_fails_at_parse() {
        let json = r#"[{"name": "기초연금", "target": "만 65세 이상"}]"#;
        assert!(BenefitCatalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_source_order_preserved() {
        let catalog =
            BenefitCatalog::from_records(vec![sample_record("나중"), sample_record("먼저")]).unwrap();
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["나중", "먼저"]);
    }
}

//! Shared domain types.
//!
//! The form moves through two shapes:
//!
//! - `FormDraft`: what the user has picked so far (every field optional)
//! - `FormSelection`: a complete, validated selection, which is also the
//!   request body sent to the prediction endpoint
//!
//! Predictions come back as a `PredictionResult`, keyed by algorithm.

use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::data::tables::{
    self, COMPANY_SIZES, COUNTRIES, Category, EMPLOYMENT_TYPES, EXPERIENCE_LEVELS, JOB_TITLES,
};

/// The seven form fields, in request-body order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    ExperienceLevel,
    EmploymentType,
    JobTitle,
    EmployeeResidence,
    RemoteRatio,
    CompanyLocation,
    CompanySize,
}

/// Label and weight resolved from a reference table for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub label: &'static str,
    pub weight: u32,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::ExperienceLevel,
        Field::EmploymentType,
        Field::JobTitle,
        Field::EmployeeResidence,
        Field::RemoteRatio,
        Field::CompanyLocation,
        Field::CompanySize,
    ];

    /// Order in which the form asks for the fields.
    pub const FORM_ORDER: [Field; 7] = [
        Field::ExperienceLevel,
        Field::EmploymentType,
        Field::JobTitle,
        Field::EmployeeResidence,
        Field::CompanyLocation,
        Field::CompanySize,
        Field::RemoteRatio,
    ];

    /// JSON key used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Field::ExperienceLevel => "experience_level",
            Field::EmploymentType => "employment_type",
            Field::JobTitle => "job_title",
            Field::EmployeeResidence => "employee_residence",
            Field::RemoteRatio => "remote_ratio",
            Field::CompanyLocation => "company_location",
            Field::CompanySize => "company_size",
        }
    }

    /// Label shown next to the value in the form and results view.
    pub fn label(self) -> &'static str {
        match self {
            Field::ExperienceLevel => "Nível de Experiência",
            Field::EmploymentType => "Tipo de Contratação",
            Field::JobTitle => "Cargo",
            Field::EmployeeResidence => "Sua Localização",
            Field::RemoteRatio => "Modalidade de Trabalho",
            Field::CompanyLocation => "Localização da Empresa",
            Field::CompanySize => "Tamanho da Empresa",
        }
    }

    /// Placeholder shown while the field is still empty.
    pub fn placeholder(self) -> &'static str {
        match self {
            Field::ExperienceLevel => "Selecione seu nível",
            Field::EmploymentType => "Selecione o tipo",
            Field::JobTitle => "Selecione seu cargo",
            Field::EmployeeResidence => "Onde você mora?",
            Field::RemoteRatio => "Selecione a modalidade",
            Field::CompanyLocation => "Onde fica a empresa?",
            Field::CompanySize => "Selecione o tamanho",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Field::ExperienceLevel => Category::ExperienceLevel,
            Field::EmploymentType => Category::EmploymentType,
            Field::JobTitle => Category::JobTitle,
            Field::EmployeeResidence | Field::CompanyLocation => Category::Country,
            Field::RemoteRatio => Category::RemoteRatio,
            Field::CompanySize => Category::CompanySize,
        }
    }

    /// Resolve this field of `selection` against its reference table.
    pub fn resolve(self, selection: &FormSelection) -> Option<ResolvedEntry> {
        let found = match self {
            Field::ExperienceLevel => tables::lookup(&EXPERIENCE_LEVELS, &selection.experience_level.as_str()),
            Field::EmploymentType => tables::lookup(&EMPLOYMENT_TYPES, &selection.employment_type.as_str()),
            Field::JobTitle => tables::lookup(&JOB_TITLES, &selection.job_title.as_str()),
            Field::EmployeeResidence => tables::lookup(&COUNTRIES, &selection.employee_residence.as_str()),
            Field::CompanyLocation => tables::lookup(&COUNTRIES, &selection.company_location.as_str()),
            Field::CompanySize => tables::lookup(&COMPANY_SIZES, &selection.company_size.as_str()),
            Field::RemoteRatio => {
                return tables::remote_ratio(selection.remote_ratio).map(|e| ResolvedEntry {
                    label: e.label,
                    weight: e.weight,
                });
            }
        };
        found.map(|e| ResolvedEntry {
            label: e.label,
            weight: e.weight,
        })
    }

    /// Raw wire value of this field.
    pub fn raw_value(self, selection: &FormSelection) -> String {
        match self {
            Field::ExperienceLevel => selection.experience_level.clone(),
            Field::EmploymentType => selection.employment_type.clone(),
            Field::JobTitle => selection.job_title.clone(),
            Field::EmployeeResidence => selection.employee_residence.clone(),
            Field::RemoteRatio => selection.remote_ratio.to_string(),
            Field::CompanyLocation => selection.company_location.clone(),
            Field::CompanySize => selection.company_size.clone(),
        }
    }

    /// Human label for the selected value; unknown codes display as-is.
    pub fn display_value(self, selection: &FormSelection) -> String {
        match self {
            Field::JobTitle => selection.job_title.clone(),
            _ => self
                .resolve(selection)
                .map(|e| e.label.to_string())
                .unwrap_or_else(|| self.raw_value(selection)),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A complete selection. Obtained through `FormDraft::complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSelection {
    pub experience_level: String,
    pub employment_type: String,
    pub job_title: String,
    pub employee_residence: String,
    pub remote_ratio: u32,
    pub company_location: String,
    pub company_size: String,
}

/// The form as it is being filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    pub experience_level: Option<String>,
    pub employment_type: Option<String>,
    pub job_title: Option<String>,
    pub employee_residence: Option<String>,
    pub remote_ratio: Option<u32>,
    pub company_location: Option<String>,
    pub company_size: Option<String>,
}

impl Default for FormDraft {
    /// A fresh form: nothing picked except the on-site remote ratio.
    fn default() -> Self {
        Self {
            remote_ratio: Some(0),
            ..Self::empty()
        }
    }
}

impl FormDraft {
    /// A draft with every field unset.
    pub fn empty() -> Self {
        Self {
            experience_level: None,
            employment_type: None,
            job_title: None,
            employee_residence: None,
            remote_ratio: None,
            company_location: None,
            company_size: None,
        }
    }

    /// Current value of a field as text, if set.
    pub fn get(&self, field: Field) -> Option<String> {
        match field {
            Field::ExperienceLevel => self.experience_level.clone(),
            Field::EmploymentType => self.employment_type.clone(),
            Field::JobTitle => self.job_title.clone(),
            Field::EmployeeResidence => self.employee_residence.clone(),
            Field::RemoteRatio => self.remote_ratio.map(|v| v.to_string()),
            Field::CompanyLocation => self.company_location.clone(),
            Field::CompanySize => self.company_size.clone(),
        }
    }

    /// Set a field from text. A remote ratio that is not an integer clears it.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::ExperienceLevel => self.experience_level = Some(value),
            Field::EmploymentType => self.employment_type = Some(value),
            Field::JobTitle => self.job_title = Some(value),
            Field::EmployeeResidence => self.employee_residence = Some(value),
            Field::RemoteRatio => self.remote_ratio = value.trim().parse().ok(),
            Field::CompanyLocation => self.company_location = Some(value),
            Field::CompanySize => self.company_size = Some(value),
        }
    }

    pub fn clear(&mut self, field: Field) {
        match field {
            Field::ExperienceLevel => self.experience_level = None,
            Field::EmploymentType => self.employment_type = None,
            Field::JobTitle => self.job_title = None,
            Field::EmployeeResidence => self.employee_residence = None,
            Field::RemoteRatio => self.remote_ratio = None,
            Field::CompanyLocation => self.company_location = None,
            Field::CompanySize => self.company_size = None,
        }
    }

    /// Fields that are unset or blank, in request-body order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&field| {
                self.get(field)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Validate the draft into a `FormSelection`.
    pub fn complete(&self) -> Result<FormSelection, SelectionError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(SelectionError::Incomplete { missing });
        }

        let text = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();
        Ok(FormSelection {
            experience_level: text(&self.experience_level),
            employment_type: text(&self.employment_type),
            job_title: text(&self.job_title),
            employee_residence: text(&self.employee_residence),
            remote_ratio: self.remote_ratio.unwrap_or_default(),
            company_location: text(&self.company_location),
            company_size: text(&self.company_size),
        })
    }
}

impl From<&FormSelection> for FormDraft {
    fn from(value: &FormSelection) -> Self {
        Self {
            experience_level: Some(value.experience_level.clone()),
            employment_type: Some(value.employment_type.clone()),
            job_title: Some(value.job_title.clone()),
            employee_residence: Some(value.employee_residence.clone()),
            remote_ratio: Some(value.remote_ratio),
            company_location: Some(value.company_location.clone()),
            company_size: Some(value.company_size.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    Incomplete { missing: Vec<Field> },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::Incomplete { missing } => {
                let names: Vec<&str> = missing.iter().map(|field| field.key()).collect();
                write!(f, "missing required field(s): {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// The four models served by the prediction endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Knn,
    DecisionTree,
    NaiveBayes,
    Svm,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Knn,
        Algorithm::DecisionTree,
        Algorithm::NaiveBayes,
        Algorithm::Svm,
    ];

    /// Key in the `previsoes` response object.
    pub fn key(self) -> &'static str {
        match self {
            Algorithm::Knn => "knn",
            Algorithm::DecisionTree => "árvore",
            Algorithm::NaiveBayes => "naive_bayes",
            Algorithm::Svm => "svm",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Algorithm::Knn => "K-Nearest Neighbors",
            Algorithm::DecisionTree => "Árvore de Decisão",
            Algorithm::NaiveBayes => "Naive Bayes",
            Algorithm::Svm => "Support Vector Machine",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Algorithm::Knn => "Baseia-se em profissionais similares para estimar salários",
            Algorithm::DecisionTree => "Usa regras hierárquicas para determinar faixas salariais",
            Algorithm::NaiveBayes => "Aplica probabilidades condicionais aos dados profissionais",
            Algorithm::Svm => "Encontra padrões complexos nos dados salariais",
        }
    }
}

/// A response key: one of the four known models, or anything else the
/// endpoint chose to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmKey {
    Known(Algorithm),
    Other(String),
}

impl AlgorithmKey {
    pub fn key(&self) -> &str {
        match self {
            AlgorithmKey::Known(a) => a.key(),
            AlgorithmKey::Other(key) => key,
        }
    }

    /// Unknown keys render as the raw key.
    pub fn display_name(&self) -> &str {
        match self {
            AlgorithmKey::Known(a) => a.display_name(),
            AlgorithmKey::Other(key) => key,
        }
    }
}

/// Predicted salary-range labels per algorithm.
///
/// Always holds the four known algorithms, in canonical order, followed by
/// any extra keys in lexical order. Values are opaque display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    entries: Vec<(AlgorithmKey, String)>,
}

impl PredictionResult {
    /// Build from the raw response map. Fails with the known algorithms that
    /// are absent.
    pub fn from_map(mut raw: BTreeMap<String, String>) -> Result<Self, Vec<Algorithm>> {
        let missing: Vec<Algorithm> = Algorithm::ALL
            .into_iter()
            .filter(|a| !raw.contains_key(a.key()))
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let mut entries = Vec::with_capacity(raw.len());
        for algorithm in Algorithm::ALL {
            if let Some(value) = raw.remove(algorithm.key()) {
                entries.push((AlgorithmKey::Known(algorithm), value));
            }
        }
        entries.extend(raw.into_iter().map(|(k, v)| (AlgorithmKey::Other(k), v)));

        Ok(Self { entries })
    }

    /// The same label for every algorithm (used by the local estimate).
    pub fn uniform(label: &str) -> Self {
        Self {
            entries: Algorithm::ALL
                .into_iter()
                .map(|a| (AlgorithmKey::Known(a), label.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, algorithm: Algorithm) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == AlgorithmKey::Known(algorithm))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AlgorithmKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PredictionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.key(), value)?;
        }
        map.end()
    }
}

/// Where a set of predictions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    Remote,
    LocalFallback,
}

impl PredictionSource {
    pub fn display_name(self) -> &'static str {
        match self {
            PredictionSource::Remote => "API",
            PredictionSource::LocalFallback => "estimativa local (API indisponível)",
        }
    }
}

/// What to do when the prediction endpoint fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Report the failure and show nothing.
    Off,
    /// Show the local point-based estimate for all four algorithms.
    Local,
}

impl FallbackPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "0" | "false" => Some(Self::Off),
            "local" | "on" | "1" | "true" => Some(Self::Local),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn senior_ml_engineer() -> FormDraft {
        FormDraft {
            experience_level: Some("SE".to_string()),
            employment_type: Some("FT".to_string()),
            job_title: Some("Machine Learning Engineer".to_string()),
            employee_residence: Some("US".to_string()),
            remote_ratio: Some(100),
            company_location: Some("US".to_string()),
            company_size: Some("L".to_string()),
        }
    }

    #[test]
    fn fresh_draft_only_has_remote_ratio() {
        let draft = FormDraft::default();
        assert_eq!(draft.remote_ratio, Some(0));
        assert_eq!(draft.missing_fields().len(), 6);
        assert!(!draft.missing_fields().contains(&Field::RemoteRatio));
    }

    #[test]
    fn complete_rejects_unset_and_blank_fields() {
        let mut draft = senior_ml_engineer();
        draft.job_title = Some("   ".to_string());
        draft.remote_ratio = None;

        let err = draft.complete().unwrap_err();
        assert_eq!(
            err,
            SelectionError::Incomplete {
                missing: vec![Field::JobTitle, Field::RemoteRatio]
            }
        );
        assert_eq!(err.to_string(), "missing required field(s): job_title, remote_ratio");
    }

    #[test]
    fn complete_trims_and_keeps_values() {
        let mut draft = senior_ml_engineer();
        draft.company_size = Some(" L ".to_string());
        let selection = draft.complete().unwrap();
        assert_eq!(selection.company_size, "L");
        assert_eq!(selection.remote_ratio, 100);
        assert_eq!(FormDraft::from(&selection).complete().unwrap(), selection);
    }

    #[test]
    fn selection_serializes_with_wire_keys() {
        let selection = senior_ml_engineer().complete().unwrap();
        let value = serde_json::to_value(&selection).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        for field in Field::ALL {
            assert!(obj.contains_key(field.key()), "missing key {}", field.key());
        }
        assert_eq!(obj["remote_ratio"], serde_json::json!(100));
    }

    #[test]
    fn set_parses_remote_ratio() {
        let mut draft = FormDraft::empty();
        draft.set(Field::RemoteRatio, "50");
        assert_eq!(draft.remote_ratio, Some(50));
        draft.set(Field::RemoteRatio, "half");
        assert_eq!(draft.remote_ratio, None);
        draft.set(Field::CompanySize, "M");
        assert_eq!(draft.get(Field::CompanySize).as_deref(), Some("M"));
        draft.clear(Field::CompanySize);
        assert_eq!(draft.get(Field::CompanySize), None);
    }

    #[test]
    fn display_value_falls_back_to_raw_code() {
        let mut selection = senior_ml_engineer().complete().unwrap();
        assert_eq!(Field::EmployeeResidence.display_value(&selection), "Estados Unidos");
        assert_eq!(Field::RemoteRatio.display_value(&selection), "Totalmente remoto");
        assert_eq!(Field::CompanySize.display_value(&selection), "Large (> 250 funcionários)");

        selection.company_location = "PT".to_string();
        selection.remote_ratio = 25;
        assert_eq!(Field::CompanyLocation.display_value(&selection), "PT");
        assert_eq!(Field::RemoteRatio.display_value(&selection), "25");
        assert!(Field::CompanyLocation.resolve(&selection).is_none());
    }

    #[test]
    fn prediction_result_orders_known_keys_first() {
        let raw: BTreeMap<String, String> = [
            ("svm", "200k–300k"),
            ("ensemble", "100k–150k"),
            ("naive_bayes", "150k–200k"),
            ("knn", "100k–150k"),
            ("árvore", "Acima de 300k"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let result = PredictionResult::from_map(raw).unwrap();
        let keys: Vec<&str> = result.iter().map(|(k, _)| k.key()).collect();
        assert_eq!(keys, vec!["knn", "árvore", "naive_bayes", "svm", "ensemble"]);
        assert_eq!(result.get(Algorithm::DecisionTree), Some("Acima de 300k"));

        let (other, _) = result.iter().last().unwrap();
        assert_eq!(other.display_name(), "ensemble");
    }

    #[test]
    fn prediction_result_requires_all_known_keys() {
        let raw: BTreeMap<String, String> = [("knn", "Até 50k"), ("svm", "Até 50k")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let missing = PredictionResult::from_map(raw).unwrap_err();
        assert_eq!(missing, vec![Algorithm::DecisionTree, Algorithm::NaiveBayes]);
    }

    #[test]
    fn prediction_result_serializes_in_order() {
        let result = PredictionResult::uniform("50k–100k");
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"knn":"50k–100k","árvore":"50k–100k","naive_bayes":"50k–100k","svm":"50k–100k"}"#
        );
    }

    #[test]
    fn fallback_policy_parses_common_spellings() {
        assert_eq!(FallbackPolicy::parse("LOCAL"), Some(FallbackPolicy::Local));
        assert_eq!(FallbackPolicy::parse(" off "), Some(FallbackPolicy::Off));
        assert_eq!(FallbackPolicy::parse("maybe"), None);
    }
}

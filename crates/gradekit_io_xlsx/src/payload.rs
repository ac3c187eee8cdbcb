//! Request payload model.
//!
//! Field names follow the camelCase JSON shape. Aliases accept the older
//! council-export payload (`evaluationForm`, `indicators`, `pis`, `lecturers`,
//! ...). Absent or `null` lists decode as empty and `null` list elements are
//! dropped, so downstream code never sees a missing collection.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null`, a missing value, or a list with `null` holes into a dense list.
fn deserialize_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let l_items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(l_items.unwrap_or_default().into_iter().flatten().collect())
}

/// Whole export request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecEvaluationPayload {
    /// Primary evaluation form.
    #[serde(alias = "evaluationForm")]
    pub schema: Option<SpecSchema>,
    /// Further forms rendered as additional blocks after the primary one.
    #[serde(deserialize_with = "deserialize_list")]
    pub schemas: Vec<SpecSchema>,
    /// Evaluators in page order.
    #[serde(alias = "lecturers", deserialize_with = "deserialize_list")]
    pub evaluators: Vec<SpecEvaluator>,
}

impl SpecEvaluationPayload {
    /// Primary schema followed by the additional ones.
    pub fn iter_schemas(&self) -> impl Iterator<Item = &SpecSchema> {
        self.schema.iter().chain(self.schemas.iter())
    }
}

/// One evaluation form: ordered groups of criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecSchema {
    pub title: Option<String>,
    pub academic_year: Option<String>,
    pub form_key: Option<String>,
    pub evaluation_id: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "indicators", deserialize_with = "deserialize_list")]
    pub groups: Vec<SpecGroup>,
}

/// Named cluster of criteria with an optional weight fraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecGroup {
    #[serde(alias = "cloId")]
    pub id: Option<String>,
    #[serde(alias = "cloName")]
    pub name: Option<String>,
    #[serde(alias = "cloDescription")]
    pub description: Option<String>,
    /// Weight as a 0-1 fraction.
    pub weight: Option<f64>,
    #[serde(alias = "pis", deserialize_with = "deserialize_list")]
    pub criteria: Vec<SpecCriterion>,
}

/// Smallest gradeable unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecCriterion {
    #[serde(alias = "cloPisId")]
    pub id: Option<String>,
    #[serde(alias = "cloPisName")]
    pub name: Option<String>,
    #[serde(alias = "cloPisDescription")]
    pub description: Option<String>,
    /// Weight as a 0-1 fraction.
    #[serde(alias = "cloPisWeight")]
    pub weight: Option<f64>,
}

/// Person grading records; one page each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecEvaluator {
    #[serde(alias = "lecturerId")]
    pub id: Option<String>,
    #[serde(alias = "lecturerName")]
    pub name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    #[serde(alias = "evaluations", deserialize_with = "deserialize_list")]
    pub records: Vec<SpecRecord>,
}

/// One subject as graded by one evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecRecord {
    #[serde(alias = "studentId")]
    pub subject_id: Option<String>,
    #[serde(alias = "studentName")]
    pub subject_name: Option<String>,
    #[serde(rename = "class", alias = "className")]
    pub class_name: Option<String>,
    #[serde(alias = "comment")]
    pub remark: Option<String>,
    #[serde(alias = "evaluations")]
    pub result: Option<SpecRecordResult>,
}

impl SpecRecord {
    /// Precomputed total, when supplied.
    pub fn total_score(&self) -> Option<f64> {
        self.result.as_ref().and_then(|r| r.total_score)
    }

    /// Raw score entries in submission order.
    pub fn scores(&self) -> &[SpecScore] {
        self.result.as_ref().map_or(&[], |r| r.scores.as_slice())
    }
}

/// Scores and total of one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecRecordResult {
    pub evaluation_id: Option<String>,
    #[serde(deserialize_with = "deserialize_list")]
    pub scores: Vec<SpecScore>,
    pub total_score: Option<f64>,
}

/// One `criterion id -> value` pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecScore {
    #[serde(alias = "piId")]
    pub criterion_id: Option<String>,
    #[serde(alias = "score")]
    pub value: Option<f64>,
}

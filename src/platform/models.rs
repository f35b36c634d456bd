//! Typed projections of the platform's public API payloads
//!
//! Every field the reports read is declared here with its default. Payloads
//! carry many more keys; serde ignores them.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::core::Classification;
use crate::core::constants::{custom_fields, platform};

/// Treat an explicit JSON `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Free-form custom field map attached to projects and datasets
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CustomFields(Map<String, Value>);

impl CustomFields {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// Text value of a field, empty when absent. Non-string scalars are
    /// rendered with their JSON representation.
    pub fn text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Boolean flag, `false` when absent or not a boolean
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Array of names, empty when absent or not an array; blank entries
    /// are dropped
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|item| !item.trim().is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Personal-data classification, `Unsure` when absent
    pub fn classification(&self) -> Classification {
        Classification::from_field(
            self.get(custom_fields::CONTAINS_PERSONAL_DATA)
                .and_then(Value::as_str),
        )
    }
}

/// Project-level GDPR policy flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPolicy {
    pub forbid_dataset_sharing: bool,
    pub forbid_dataset_export: bool,
    pub forbid_model_creation: bool,
    pub forbid_uploaded_datasets: bool,
    pub forbidden_connections: Vec<String>,
}

impl From<&CustomFields> for ProjectPolicy {
    fn from(fields: &CustomFields) -> Self {
        Self {
            forbid_dataset_sharing: fields.flag(custom_fields::FORBID_DATASET_SHARING),
            forbid_dataset_export: fields.flag(custom_fields::FORBID_DATASET_EXPORT),
            forbid_model_creation: fields.flag(custom_fields::FORBID_MODEL_CREATION),
            forbid_uploaded_datasets: fields.flag(custom_fields::FORBID_UPLOADED_DATASETS),
            forbidden_connections: fields.list(custom_fields::FORBIDDEN_CONNECTIONS),
        }
    }
}

/// GDPR documentation fields of a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetGdprFields {
    pub classification: Classification,
    pub purposes: String,
    pub retention_policy: String,
    pub legal_consent: String,
}

impl From<&CustomFields> for DatasetGdprFields {
    fn from(fields: &CustomFields) -> Self {
        Self {
            classification: fields.classification(),
            purposes: fields.text(custom_fields::PURPOSES),
            retention_policy: fields.text(custom_fields::RETENTION_POLICY),
            legal_consent: fields.text(custom_fields::LEGAL_CONSENT),
        }
    }
}

/// Last-modification tag carried by most objects
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreationTag {
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_modified_on: i64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_key: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_fields: CustomFields,
}

impl ProjectMetadata {
    /// Display label, falling back to the project key
    pub fn label_or<'a>(&'a self, project_key: &'a str) -> &'a str {
        if self.label.is_empty() {
            project_key
        } else {
            &self.label
        }
    }

    pub fn policy(&self) -> ProjectPolicy {
        ProjectPolicy::from(&self.custom_fields)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPermissions {
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Vec<PermissionEntry>,
}

/// One permission grant. Grants to single users carry no group and are
/// ignored by the reports.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionEntry {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read_project_content: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub write_project_content: bool,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub exposed_objects: ExposedObjects,
}

impl ProjectSettings {
    /// Target projects a dataset of this project is shared with
    pub fn dataset_share_targets(&self, dataset_name: &str) -> Vec<String> {
        self.exposed_objects
            .objects
            .iter()
            .filter(|object| {
                object.object_type == platform::EXPOSED_DATASET
                    && object.local_name == dataset_name
            })
            .flat_map(|object| object.rules.iter())
            .filter(|rule| !rule.target_project.is_empty())
            .map(|rule| rule.target_project.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExposedObjects {
    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: Vec<ExposedObject>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExposedObject {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub object_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub local_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<ExposedObjectRule>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExposedObjectRule {
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_project: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DatasetSummary {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub dataset_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: DatasetParams,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schema: DatasetSchema,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_fields: CustomFields,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creation_tag: CreationTag,
}

impl DatasetDefinition {
    pub fn classification(&self) -> Classification {
        self.custom_fields.classification()
    }

    pub fn gdpr_fields(&self) -> DatasetGdprFields {
        DatasetGdprFields::from(&self.custom_fields)
    }

    /// Connection name, empty for datasets without one
    pub fn connection(&self) -> &str {
        &self.params.connection
    }

    pub fn is_uploaded(&self) -> bool {
        self.dataset_type == platform::UPLOADED_FILES_TYPE
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub connection: String,
    /// Storage connection of uploaded-file datasets
    #[serde(default, deserialize_with = "null_as_default")]
    pub upload_connection: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DatasetSchema {
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<SchemaColumn>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SchemaColumn {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub column_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meaning: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DatasetMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DatasetUsage {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub usage_type: String,
}

/// Whether a dataset is raw input: nothing in the flow produces it
pub fn is_source_dataset(usages: &[DatasetUsage]) -> bool {
    !usages
        .iter()
        .any(|usage| usage.usage_type == platform::USAGE_RECIPE_OUTPUT)
}

/// Last computed values of every metric of a dataset
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ComputedMetrics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Vec<MetricHistory>,
}

impl ComputedMetrics {
    pub fn metric(&self, metric_id: &str) -> Option<&MetricHistory> {
        self.metrics.iter().find(|entry| entry.metric.id == metric_id)
    }

    /// Latest build start time in epoch milliseconds, `None` without history
    pub fn last_build_millis(&self) -> Option<i64> {
        self.metric(platform::BUILD_START_DATE_METRIC)?
            .last_values
            .iter()
            .filter_map(|value| parse_metric_timestamp(&value.value))
            .max()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricHistory {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric: MetricId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_values: Vec<MetricValue>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetricId {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MetricValue {
    #[serde(default)]
    pub value: Value,
}

/// Parse a metric value holding a date into epoch milliseconds.
///
/// Accepts RFC 3339 strings, naive `YYYY-MM-DD[T ]HH:MM:SS[.fff]` strings
/// (read as UTC) and raw epoch milliseconds.
pub fn parse_metric_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Some(parsed.with_timezone(&Utc).timestamp_millis());
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
                    return Some(parsed.and_utc().timestamp_millis());
                }
            }
            text.parse::<i64>().ok()
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub analysis_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creation_tag: CreationTag,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_dataset_smart_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MlTaskList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ml_tasks: Vec<MlTaskSummary>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MlTaskSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub analysis_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ml_task_id: String,
    /// Smart name of the training dataset
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_dataset: String,
}

/// Feature handling shared by task settings and saved model versions
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Preprocessing {
    #[serde(default, deserialize_with = "null_as_default")]
    pub per_feature: IndexMap<String, FeatureSettings>,
}

impl Preprocessing {
    /// Non-rejected features in declaration order, annotated with their
    /// role unless they are plain inputs
    pub fn feature_labels(&self) -> Vec<String> {
        self.per_feature
            .iter()
            .filter_map(|(name, settings)| {
                let role = settings.role();
                if role == platform::ROLE_REJECT {
                    None
                } else if role == platform::ROLE_INPUT {
                    Some(name.clone())
                } else {
                    Some(format!("{name} ({role})"))
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FeatureSettings {
    #[serde(default)]
    pub role: Option<String>,
}

impl FeatureSettings {
    /// Feature role, `REJECT` when unset
    pub fn role(&self) -> &str {
        self.role.as_deref().unwrap_or(platform::ROLE_REJECT)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MlTaskSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prediction_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preprocessing: Preprocessing,
}

impl MlTaskSettings {
    pub fn type_label(&self) -> String {
        model_type_label(&self.task_type, &self.prediction_type)
    }
}

/// `TYPE` or `PREDICTION: <subtype>` for prediction models
pub fn model_type_label(model_type: &str, prediction_type: &str) -> String {
    if model_type == platform::PREDICTION_TASK {
        format!("{model_type}: {prediction_type}")
    } else {
        model_type.to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MlTaskStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_model_ids: Vec<TrainedModelEntry>,
}

impl MlTaskStatus {
    pub fn trained_model_ids(&self) -> Vec<String> {
        self.full_model_ids
            .iter()
            .map(|entry| entry.id.clone())
            .filter(|id| !id.is_empty())
            .collect()
    }
}

/// One trained model of a task; `id` is the full model id string
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TrainedModelEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainedModelDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub train_info: TrainInfo,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_time: i64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SavedModelSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub model_type: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedModelVersion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub train_date: i64,
}

/// The version currently serving predictions, if any
pub fn active_version(versions: &[SavedModelVersion]) -> Option<&SavedModelVersion> {
    versions.iter().find(|version| version.active)
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedModelVersionDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub core_params: CoreParams,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preprocessing: Preprocessing,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sm_origin: SavedModelOrigin,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CoreParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prediction_type: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedModelOrigin {
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_model_id: String,
}

impl SavedModelOrigin {
    /// Analysis id encoded as the third dash-delimited segment
    pub fn analysis_id(&self) -> Option<&str> {
        self.full_model_id
            .split(platform::FULL_MODEL_ID_SEPARATOR)
            .nth(platform::FULL_MODEL_ID_ANALYSIS_INDEX)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub connection_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details_readability: DetailsReadability,
    #[serde(default)]
    pub usable_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allowed_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetailsReadability {
    #[serde(default)]
    pub readable_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allowed_groups: Vec<String>,
}

/// Who may read or use a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    Nobody,
    Everyone,
    Groups(Vec<String>),
    /// Value this tool does not know about; rendered empty
    Unknown(String),
}

impl AccessPolicy {
    fn readability(raw: &str, groups: &[String]) -> Self {
        match raw {
            "NONE" => AccessPolicy::Nobody,
            other => AccessPolicy::usability(other, groups),
        }
    }

    /// Usage only knows `ALL` and `ALLOWED`
    fn usability(raw: &str, groups: &[String]) -> Self {
        match raw {
            "ALL" => AccessPolicy::Everyone,
            "ALLOWED" => AccessPolicy::Groups(groups.to_vec()),
            other => AccessPolicy::Unknown(other.to_string()),
        }
    }
}

impl Connection {
    /// Details read policy, `NONE` when unset
    pub fn read_policy(&self) -> AccessPolicy {
        AccessPolicy::readability(
            self.details_readability
                .readable_by
                .as_deref()
                .unwrap_or("NONE"),
            &self.details_readability.allowed_groups,
        )
    }

    /// Usage policy, `ALL` when unset
    pub fn usage_policy(&self) -> AccessPolicy {
        AccessPolicy::usability(
            self.usable_by.as_deref().unwrap_or("ALL"),
            &self.allowed_groups,
        )
    }
}

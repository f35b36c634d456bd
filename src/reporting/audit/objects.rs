//! All-objects section: datasets with their columns, analyses with their
//! model-training tasks, and saved models, per project

use super::DatasetLookup;
use crate::core::Result;
use crate::platform::PlatformApi;
use crate::platform::models::{
    AnalysisDefinition, ComputedMetrics, DatasetDefinition, DatasetMetadata, DatasetUsage,
    MlTaskSettings, SavedModelSummary, SavedModelVersion, SavedModelVersionDetails,
    active_version, is_source_dataset, model_type_label,
};
use crate::reporting::html::{
    Cell, Column, HtmlDocument, RowGroup, Table, format_epoch_millis, format_optional_millis,
};

pub const DATASET_COLUMNS: &[Column] = &[
    Column::leaf("Dataset"),
    Column::leaf("Is source?"),
    Column::group("Columns", &["Name", "Type", "Comment", "Meaning"]),
    Column::leaf("Creation date"),
    Column::leaf("Last build date"),
    Column::leaf("Projects shared with"),
    Column::leaf("Description"),
    Column::group(
        "GDPR fields",
        &[
            "Contains pers. data",
            "Purposes",
            "Retention policy",
            "Legal consent",
        ],
    ),
];

pub const ANALYSIS_COLUMNS: &[Column] = &[
    Column::leaf("ID"),
    Column::leaf("Name"),
    Column::leaf("Creation date"),
    Column::leaf("Dataset"),
    Column::group("Models", &["Type", "Features", "Last train date"]),
];

pub const SAVED_MODEL_COLUMNS: &[Column] = &[
    Column::leaf("Name"),
    Column::leaf("Type"),
    Column::leaf("Features"),
    Column::leaf("Original analysis ID"),
    Column::leaf("Train date"),
];

const SCHEMA_WIDTH: usize = 4;
const TASK_WIDTH: usize = 3;

/// Everything shown for one dataset
#[derive(Debug, Clone)]
pub struct DatasetEntry<'a> {
    pub definition: &'a DatasetDefinition,
    pub metadata: DatasetMetadata,
    pub usages: Vec<DatasetUsage>,
    pub metrics: ComputedMetrics,
    pub shared_with: Vec<String>,
}

impl<'a> DatasetEntry<'a> {
    /// Entry with no metadata, usages, metrics or sharing
    pub fn new(definition: &'a DatasetDefinition) -> Self {
        Self {
            definition,
            metadata: DatasetMetadata::default(),
            usages: Vec::new(),
            metrics: ComputedMetrics::default(),
            shared_with: Vec::new(),
        }
    }
}

/// One dataset laid out over one row per schema column
pub fn dataset_group(entry: &DatasetEntry<'_>) -> RowGroup {
    let definition = entry.definition;
    let gdpr = definition.gdpr_fields();

    let mut group = RowGroup::new(SCHEMA_WIDTH)
        .leading(definition.name.as_str())
        .leading(if is_source_dataset(&entry.usages) { "YES" } else { "" });

    for column in &definition.schema.columns {
        group = group.nested_row(vec![
            Cell::text(column.name.as_str()),
            Cell::text(column.column_type.as_str()),
            Cell::text(column.comment.as_str()),
            Cell::text(column.meaning.as_str()),
        ]);
    }

    group
        .trailing(format_epoch_millis(definition.creation_tag.last_modified_on))
        .trailing(format_optional_millis(entry.metrics.last_build_millis()))
        .trailing(Cell::lines(entry.shared_with.clone()))
        .trailing(entry.metadata.description.as_str())
        .trailing(gdpr.classification.as_str())
        .trailing(gdpr.purposes)
        .trailing(gdpr.retention_policy)
        .trailing(gdpr.legal_consent)
}

/// Model-training task as shown under its analysis
#[derive(Debug, Clone, Default)]
pub struct TaskEntry {
    pub settings: MlTaskSettings,
    /// Latest training start time across the task's trained models
    pub last_train_millis: Option<i64>,
}

/// One analysis laid out over one row per model-training task
pub fn analysis_group(definition: &AnalysisDefinition, tasks: &[TaskEntry]) -> RowGroup {
    let mut group = RowGroup::new(TASK_WIDTH)
        .leading(definition.id.as_str())
        .leading(definition.name.as_str())
        .leading(format_epoch_millis(definition.creation_tag.last_modified_on))
        .leading(definition.input_dataset_smart_name.as_str());

    for task in tasks {
        group = group.nested_row(vec![
            Cell::text(task.settings.type_label()),
            Cell::lines(task.settings.preprocessing.feature_labels()),
            Cell::text(format_optional_millis(task.last_train_millis)),
        ]);
    }
    group
}

/// Saved model row; version cells stay empty without an active version
pub fn saved_model_row(
    summary: &SavedModelSummary,
    active: Option<(&SavedModelVersion, &SavedModelVersionDetails)>,
) -> Vec<Cell> {
    match active {
        Some((version, details)) => vec![
            Cell::text(summary.name.as_str()),
            Cell::text(model_type_label(
                &summary.model_type,
                &details.core_params.prediction_type,
            )),
            Cell::lines(details.preprocessing.feature_labels()),
            Cell::text(details.sm_origin.analysis_id().unwrap_or_default()),
            Cell::text(format_epoch_millis(version.train_date)),
        ],
        None => vec![
            Cell::text(summary.name.as_str()),
            Cell::text(summary.model_type.as_str()),
            Cell::lines(Vec::new()),
            Cell::empty(),
            Cell::empty(),
        ],
    }
}

async fn datasets_table(
    api: &dyn PlatformApi,
    project_key: &str,
    lookup: &mut DatasetLookup<'_>,
) -> Result<Table> {
    let settings = api.project_settings(project_key).await?;
    let mut table = Table::new(DATASET_COLUMNS);

    for dataset_name in lookup.dataset_names(project_key).await? {
        let metadata = api.dataset_metadata(project_key, &dataset_name).await?;
        let usages = api.dataset_usages(project_key, &dataset_name).await?;
        let metrics = api.dataset_last_metrics(project_key, &dataset_name).await?;
        let entry = DatasetEntry {
            metadata,
            usages,
            metrics,
            shared_with: settings.dataset_share_targets(&dataset_name),
            ..DatasetEntry::new(lookup.definition(project_key, &dataset_name).await?)
        };
        table.group(&dataset_group(&entry));
    }
    Ok(table)
}

async fn last_train_millis(
    api: &dyn PlatformApi,
    project_key: &str,
    analysis_id: &str,
    ml_task_id: &str,
) -> Result<Option<i64>> {
    let mut latest: Option<i64> = None;
    for model_id in api
        .trained_model_ids(project_key, analysis_id, ml_task_id)
        .await?
    {
        let details = api
            .trained_model_details(project_key, analysis_id, ml_task_id, &model_id)
            .await?;
        let start_time = details.train_info.start_time;
        if start_time > 0 {
            latest = latest.max(Some(start_time));
        }
    }
    Ok(latest)
}

async fn analyses_table(api: &dyn PlatformApi, project_key: &str) -> Result<Table> {
    let mut table = Table::new(ANALYSIS_COLUMNS);

    for analysis in api.list_analyses(project_key).await? {
        let definition = api
            .analysis_definition(project_key, &analysis.analysis_id)
            .await?;
        let task_list = api
            .analysis_ml_tasks(project_key, &analysis.analysis_id)
            .await?;

        let mut tasks = Vec::with_capacity(task_list.ml_tasks.len());
        for task in &task_list.ml_tasks {
            let settings = api
                .ml_task_settings(project_key, &analysis.analysis_id, &task.ml_task_id)
                .await?;
            let last_train_millis =
                last_train_millis(api, project_key, &analysis.analysis_id, &task.ml_task_id)
                    .await?;
            tasks.push(TaskEntry {
                settings,
                last_train_millis,
            });
        }
        table.group(&analysis_group(&definition, &tasks));
    }
    Ok(table)
}

async fn saved_models_table(api: &dyn PlatformApi, project_key: &str) -> Result<Table> {
    let mut table = Table::new(SAVED_MODEL_COLUMNS);

    for summary in api.list_saved_models(project_key).await? {
        let versions = api.saved_model_versions(project_key, &summary.id).await?;
        let row = match active_version(&versions) {
            Some(version) => {
                let details = api
                    .saved_model_version_details(project_key, &summary.id, &version.id)
                    .await?;
                saved_model_row(&summary, Some((version, &details)))
            }
            None => {
                log::debug!("Saved model {} has no active version", summary.id);
                saved_model_row(&summary, None)
            }
        };
        table.row(&row);
    }
    Ok(table)
}

/// Render the heading and the three tables of one project; returns the
/// number of records rendered
pub async fn render_project(
    api: &dyn PlatformApi,
    project_key: &str,
    lookup: &mut DatasetLookup<'_>,
    doc: &mut HtmlDocument,
) -> Result<usize> {
    let metadata = api.project_metadata(project_key).await?;
    let datasets = datasets_table(api, project_key, lookup).await?;
    let analyses = analyses_table(api, project_key).await?;
    let saved_models = saved_models_table(api, project_key).await?;
    let records = datasets.records() + analyses.records() + saved_models.records();

    doc.heading(
        4,
        &format!("Project {} ({project_key})", metadata.label_or(project_key)),
    );
    doc.heading(5, "Datasets");
    doc.push_html(&datasets.finish());
    doc.heading(5, "Analysis");
    doc.push_html(&analyses.finish());
    doc.heading(5, "Saved models");
    doc.push_html(&saved_models.finish());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fixtures::InMemoryPlatform;
    use serde_json::json;

    fn render(group: &RowGroup) -> String {
        let mut out = String::new();
        group.render(&mut out);
        out
    }

    #[test]
    fn test_dataset_group_spans_columns() {
        let definition: DatasetDefinition = serde_json::from_value(json!({
            "name": "customers",
            "schema": {"columns": [
                {"name": "id", "type": "bigint"},
                {"name": "email", "type": "string", "comment": "login", "meaning": "Email"},
                {"name": "age", "type": "int"}
            ]},
            "customFields": {"gdpr_contains_personal_data": "YES", "gdpr_purposes": "CRM"},
            "creationTag": {"lastModifiedOn": 1_546_300_800_000_i64}
        }))
        .unwrap();
        let entry = DatasetEntry {
            shared_with: vec!["MARKETING".to_string()],
            ..DatasetEntry::new(&definition)
        };

        let group = dataset_group(&entry);
        assert_eq!(group.span(), 3);

        let html = render(&group);
        assert!(html.starts_with(
            "<tr><td rowspan=\"3\">customers</td><td rowspan=\"3\">YES</td><td>id</td><td>bigint</td><td></td><td></td>\
             <td rowspan=\"3\">2019-01-01 00:00:00</td><td rowspan=\"3\"></td><td rowspan=\"3\"><pre>MARKETING</pre></td>"
        ));
        assert!(html.contains("<td rowspan=\"3\">YES</td><td rowspan=\"3\">CRM</td>"));
        assert!(html.contains("<tr><td>email</td><td>string</td><td>login</td><td>Email</td></tr>"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn test_dataset_without_columns() {
        let definition: DatasetDefinition =
            serde_json::from_value(json!({"name": "empty"})).unwrap();
        let usages: Vec<DatasetUsage> =
            serde_json::from_value(json!([{"type": "RECIPE_OUTPUT"}])).unwrap();
        let entry = DatasetEntry {
            usages,
            ..DatasetEntry::new(&definition)
        };

        let html = render(&dataset_group(&entry));
        assert!(html.starts_with(
            "<tr><td rowspan=\"1\">empty</td><td rowspan=\"1\"></td><td></td><td></td><td></td><td></td>"
        ));
        assert!(html.contains("<td rowspan=\"1\">UNSURE</td>"));
        assert_eq!(html.matches("<tr>").count(), 1);
    }

    #[test]
    fn test_analysis_group() {
        let definition: AnalysisDefinition = serde_json::from_value(json!({
            "id": "a1", "name": "Churn", "inputDatasetSmartName": "customers"
        }))
        .unwrap();
        let prediction: MlTaskSettings = serde_json::from_value(json!({
            "taskType": "PREDICTION",
            "predictionType": "BINARY_CLASSIFICATION",
            "preprocessing": {"per_feature": {
                "age": {"role": "INPUT"}, "churned": {"role": "TARGET"}, "email": {"role": "REJECT"}
            }}
        }))
        .unwrap();
        let clustering: MlTaskSettings =
            serde_json::from_value(json!({"taskType": "CLUSTERING"})).unwrap();
        let tasks = vec![
            TaskEntry {
                settings: prediction,
                last_train_millis: Some(1_546_300_800_000),
            },
            TaskEntry {
                settings: clustering,
                last_train_millis: None,
            },
        ];

        let group = analysis_group(&definition, &tasks);
        assert_eq!(group.span(), 2);
        let html = render(&group);
        assert!(html.contains(
            "<td>PREDICTION: BINARY_CLASSIFICATION</td><td><pre>age\nchurned (TARGET)</pre></td><td>2019-01-01 00:00:00</td></tr>"
        ));
        assert!(html.contains("<tr><td>CLUSTERING</td><td></td><td></td></tr>"));
    }

    #[test]
    fn test_analysis_without_tasks() {
        let definition = AnalysisDefinition {
            id: "a2".to_string(),
            ..Default::default()
        };
        let html = render(&analysis_group(&definition, &[]));
        assert_eq!(
            html,
            "<tr><td rowspan=\"1\">a2</td><td rowspan=\"1\"></td><td rowspan=\"1\"></td><td rowspan=\"1\"></td>\
             <td></td><td></td><td></td></tr>"
        );
    }

    #[test]
    fn test_saved_model_without_active_version() {
        let summary = SavedModelSummary {
            id: "sm1".to_string(),
            name: "Churn model".to_string(),
            model_type: "PREDICTION".to_string(),
        };
        assert_eq!(
            saved_model_row(&summary, None),
            vec![
                Cell::text("Churn model"),
                Cell::text("PREDICTION"),
                Cell::lines(Vec::new()),
                Cell::empty(),
                Cell::empty(),
            ]
        );
    }

    fn platform() -> InMemoryPlatform {
        InMemoryPlatform::new()
            .project("CRM", json!({"label": "Customers"}))
            .settings(
                "CRM",
                json!({"exposedObjects": {"objects": [
                    {"type": "DATASET", "localName": "customers", "rules": [{"targetProject": "MARKETING"}]}
                ]}}),
            )
            .dataset(
                "CRM",
                json!({"name": "customers", "schema": {"columns": [{"name": "id"}, {"name": "email"}]},
                       "customFields": {"gdpr_contains_personal_data": "YES"}}),
            )
            .dataset_details(
                "CRM",
                "customers",
                json!({"description": "All customers"}),
                json!([{"type": "RECIPE_INPUT"}]),
                json!({"metrics": [{"metric": {"id": "reporting:BUILD_START_DATE"},
                                    "lastValues": [{"value": "2019-03-01T08:30:00.000Z"}]}]}),
            )
            .analysis(
                "CRM",
                json!({"id": "a1", "name": "Churn", "inputDatasetSmartName": "customers"}),
            )
            .ml_task(
                "CRM",
                "a1",
                "t1",
                "customers",
                json!({"taskType": "PREDICTION", "predictionType": "REGRESSION"}),
                &[("A-CRM-a1-t1-s1-pp1-m1", 1_546_300_800_000), ("A-CRM-a1-t1-s2-pp1-m1", 1_551_429_000_000)],
            )
            .saved_model(
                "CRM",
                json!({"id": "sm1", "name": "Churn model", "type": "PREDICTION"}),
                json!([{"id": "v1", "active": false}, {"id": "v2", "active": true, "trainDate": 1_546_300_800_000_i64}]),
                &[(
                    "v2",
                    json!({"coreParams": {"prediction_type": "REGRESSION"},
                           "preprocessing": {"per_feature": {"age": {"role": "INPUT"}}},
                           "smOrigin": {"fullModelId": "A-CRM-a1-t1-s2-pp1-m1"}}),
                )],
            )
            .project("EMPTY", json!({}))
    }

    #[tokio::test]
    async fn test_render_project() {
        let platform = platform();
        let mut lookup = DatasetLookup::new(&platform);
        let mut doc = HtmlDocument::new("test");

        let records = render_project(&platform, "CRM", &mut lookup, &mut doc)
            .await
            .unwrap();
        let html = doc.finish();

        assert_eq!(records, 3);
        assert!(html.contains("<h4>Project Customers (CRM)</h4>"));
        assert!(html.contains("<td rowspan=\"2\">customers</td><td rowspan=\"2\">YES</td>"));
        assert!(html.contains("<td rowspan=\"2\">2019-03-01 08:30:00</td>"));
        assert!(html.contains("<td rowspan=\"2\"><pre>MARKETING</pre></td>"));
        assert!(html.contains("<td rowspan=\"2\">All customers</td>"));
        assert!(html.contains(
            "<td>PREDICTION: REGRESSION</td><td></td><td>2019-03-01 08:30:00</td>"
        ));
        assert!(html.contains(
            "<tr><td>Churn model</td><td>PREDICTION: REGRESSION</td><td><pre>age</pre></td><td>a1</td><td>2019-01-01 00:00:00</td></tr>"
        ));
    }

    #[tokio::test]
    async fn test_render_empty_project() {
        let platform = platform();
        let mut lookup = DatasetLookup::new(&platform);
        let mut doc = HtmlDocument::new("test");

        let records = render_project(&platform, "EMPTY", &mut lookup, &mut doc)
            .await
            .unwrap();
        let html = doc.finish();

        assert_eq!(records, 0);
        assert!(html.contains("<h4>Project EMPTY (EMPTY)</h4>"));
        assert_eq!(html.matches("<tbody></tbody>").count(), 3);
        assert!(html.contains("<h5>Datasets</h5>"));
        assert!(html.contains("<h5>Analysis</h5>"));
        assert!(html.contains("<h5>Saved models</h5>"));
    }
}

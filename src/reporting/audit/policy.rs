//! Policy violations section: objects that break their project's own GDPR
//! flags as of now

use std::fmt;

use super::DatasetLookup;
use crate::core::{DatasetRef, Result};
use crate::platform::PlatformApi;
use crate::platform::models::{DatasetDefinition, ProjectPolicy};
use crate::reporting::html::{Cell, Column, Table};

pub const COLUMNS: &[Column] = &[
    Column::leaf("Project"),
    Column::leaf("Object"),
    Column::leaf("Rule"),
    Column::leaf("Detail"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRule {
    /// Dataset stored on a connection the project forbids
    ForbiddenConnection,
    /// Uploaded-file dataset in a project forbidding uploads
    UploadedDataset,
    /// Possibly personal dataset shared while sharing is forbidden
    SharedPersonalData,
    /// Model task trained on possibly personal data while forbidden
    ModelOnPersonalData,
}

impl PolicyRule {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyRule::ForbiddenConnection => "FORBIDDEN_CONNECTION",
            PolicyRule::UploadedDataset => "UPLOADED_DATASET",
            PolicyRule::SharedPersonalData => "SHARED_PERSONAL_DATA",
            PolicyRule::ModelOnPersonalData => "MODEL_ON_PERSONAL_DATA",
        }
    }
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub project: String,
    pub object: String,
    pub rule: PolicyRule,
    pub detail: String,
}

impl Violation {
    fn cells(&self) -> [Cell; 4] {
        [
            Cell::text(self.project.as_str()),
            Cell::text(self.object.as_str()),
            Cell::text(self.rule.as_str()),
            Cell::text(self.detail.as_str()),
        ]
    }
}

/// Check one dataset against the project policy
pub fn dataset_violations(
    project_key: &str,
    policy: &ProjectPolicy,
    definition: &DatasetDefinition,
    shared_with: &[String],
) -> Vec<Violation> {
    let violation = |rule, detail: String| Violation {
        project: project_key.to_string(),
        object: format!("dataset {}", definition.name),
        rule,
        detail,
    };
    let mut violations = Vec::new();

    let mut connections = vec![definition.connection()];
    if definition.is_uploaded() {
        connections.push(definition.params.upload_connection.as_str());
    }
    for connection in connections.into_iter().filter(|c| !c.is_empty()) {
        if policy.forbidden_connections.iter().any(|f| f == connection) {
            violations.push(violation(
                PolicyRule::ForbiddenConnection,
                format!("Stored on forbidden connection {connection}"),
            ));
        }
    }

    if definition.is_uploaded() && policy.forbid_uploaded_datasets {
        violations.push(violation(
            PolicyRule::UploadedDataset,
            "Uploaded datasets are forbidden in this project".to_string(),
        ));
    }

    let classification = definition.classification();
    if policy.forbid_dataset_sharing
        && !shared_with.is_empty()
        && classification.may_contain_personal_data()
    {
        violations.push(violation(
            PolicyRule::SharedPersonalData,
            format!(
                "Shared with {} while classified {classification}",
                shared_with.join(", ")
            ),
        ));
    }

    violations
}

/// Every violation found in one project, datasets first, then model tasks
pub async fn project_violations(
    api: &dyn PlatformApi,
    project_key: &str,
    lookup: &mut DatasetLookup<'_>,
) -> Result<Vec<Violation>> {
    let policy = api.project_metadata(project_key).await?.policy();
    let mut violations = Vec::new();

    let checks_datasets = policy.forbid_dataset_sharing
        || policy.forbid_uploaded_datasets
        || !policy.forbidden_connections.is_empty();
    if checks_datasets {
        let settings = if policy.forbid_dataset_sharing {
            Some(api.project_settings(project_key).await?)
        } else {
            None
        };
        for dataset_name in lookup.dataset_names(project_key).await? {
            let shared_with = settings
                .as_ref()
                .map(|settings| settings.dataset_share_targets(&dataset_name))
                .unwrap_or_default();
            let definition = lookup.definition(project_key, &dataset_name).await?;
            violations.extend(dataset_violations(
                project_key,
                &policy,
                definition,
                &shared_with,
            ));
        }
    }

    if policy.forbid_model_creation {
        for task in api.project_ml_tasks(project_key).await?.ml_tasks {
            let Some(input) = DatasetRef::parse(&task.input_dataset) else {
                continue;
            };
            let classification = lookup
                .classification(input.project_or(project_key), &input.name)
                .await?;
            if classification.may_contain_personal_data() {
                violations.push(Violation {
                    project: project_key.to_string(),
                    object: format!("ml task {}/{}", task.analysis_id, task.ml_task_id),
                    rule: PolicyRule::ModelOnPersonalData,
                    detail: format!("Trained on {input} classified {classification}"),
                });
            }
        }
    }

    log::debug!(
        "Project {project_key}: {} policy violation(s)",
        violations.len()
    );
    Ok(violations)
}

/// Build the violations table across all projects
pub async fn build(
    api: &dyn PlatformApi,
    project_keys: &[String],
    lookup: &mut DatasetLookup<'_>,
) -> Result<Table> {
    let mut table = Table::new(COLUMNS);
    for project_key in project_keys {
        for violation in project_violations(api, project_key, lookup).await? {
            table.row(&violation.cells());
        }
    }
    Ok(table)
}

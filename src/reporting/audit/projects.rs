//! Projects section: permissions, GDPR flags and personal-data counts

use super::DatasetLookup;
use crate::core::{Classification, DatasetRef, Result};
use crate::platform::PlatformApi;
use crate::platform::models::{MlTaskSummary, PermissionEntry};
use crate::reporting::html::{Cell, Column, Table, format_flag};

pub const COLUMNS: &[Column] = &[
    Column::leaf("Project"),
    Column::group("DSS groups", &["Read", "Write"]),
    Column::group(
        "GDPR fields",
        &[
            "Forbid DS sharing",
            "Forbid DS export",
            "Forbid model creation",
            "Forbid uploaded datasets",
            "Forbidden connections",
        ],
    ),
    Column::group(
        "Dataset counts",
        &["Pers. data", "Unsure", "No pers. data", "Total"],
    ),
    Column::group("Model counts", &["Pers. data or unsure", "Total"]),
];

/// Split group grants into `(read, write)` lists.
///
/// Write access implies read access; grants without a group are skipped.
pub fn split_groups(permissions: &[PermissionEntry]) -> (Vec<String>, Vec<String>) {
    let mut read = Vec::new();
    let mut write = Vec::new();
    for entry in permissions {
        let Some(group) = &entry.group else {
            continue;
        };
        if entry.write_project_content {
            write.push(group.clone());
            read.push(group.clone());
        } else if entry.read_project_content {
            read.push(group.clone());
        }
    }
    (read, write)
}

/// Datasets of a project counted by classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetTally {
    pub yes: usize,
    pub unsure: usize,
    pub no: usize,
}

impl DatasetTally {
    pub fn add(&mut self, classification: Classification) {
        match classification {
            Classification::Yes => self.yes += 1,
            Classification::Unsure => self.unsure += 1,
            Classification::No => self.no += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.yes + self.unsure + self.no
    }
}

impl FromIterator<Classification> for DatasetTally {
    fn from_iter<I: IntoIterator<Item = Classification>>(iter: I) -> Self {
        let mut tally = Self::default();
        for classification in iter {
            tally.add(classification);
        }
        tally
    }
}

/// Model-training tasks of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelTaskTally {
    /// Tasks trained on a dataset that may hold personal data
    pub personal: usize,
    pub total: usize,
}

/// Count tasks, resolving each input dataset's classification. Inputs
/// without a project prefix belong to `project_key`; tasks without an
/// input only count towards the total.
pub async fn model_task_tally(
    project_key: &str,
    tasks: &[MlTaskSummary],
    lookup: &mut DatasetLookup<'_>,
) -> Result<ModelTaskTally> {
    let mut tally = ModelTaskTally::default();
    for task in tasks {
        tally.total += 1;
        let Some(input) = DatasetRef::parse(&task.input_dataset) else {
            continue;
        };
        let classification = lookup
            .classification(input.project_or(project_key), &input.name)
            .await?;
        if classification.may_contain_personal_data() {
            tally.personal += 1;
        }
    }
    Ok(tally)
}

/// Build the projects table, one row per project
pub async fn build(
    api: &dyn PlatformApi,
    project_keys: &[String],
    lookup: &mut DatasetLookup<'_>,
) -> Result<Table> {
    let mut table = Table::new(COLUMNS);

    for project_key in project_keys {
        let metadata = api.project_metadata(project_key).await?;
        let permissions = api.project_permissions(project_key).await?;
        let (read_groups, write_groups) = split_groups(&permissions.permissions);
        let policy = metadata.policy();

        let mut datasets = DatasetTally::default();
        for dataset_name in lookup.dataset_names(project_key).await? {
            datasets.add(lookup.classification(project_key, &dataset_name).await?);
        }

        let tasks = api.project_ml_tasks(project_key).await?;
        let models = model_task_tally(project_key, &tasks.ml_tasks, lookup).await?;

        table.row(&[
            Cell::text(format!("{} ({project_key})", metadata.label_or(project_key))),
            Cell::lines(read_groups),
            Cell::lines(write_groups),
            Cell::text(format_flag(policy.forbid_dataset_sharing)),
            Cell::text(format_flag(policy.forbid_dataset_export)),
            Cell::text(format_flag(policy.forbid_model_creation)),
            Cell::text(format_flag(policy.forbid_uploaded_datasets)),
            Cell::lines(policy.forbidden_connections),
            Cell::text(datasets.yes.to_string()),
            Cell::text(datasets.unsure.to_string()),
            Cell::text(datasets.no.to_string()),
            Cell::text(datasets.total().to_string()),
            Cell::text(models.personal.to_string()),
            Cell::text(models.total.to_string()),
        ]);
    }

    Ok(table)
}

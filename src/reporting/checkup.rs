//! Dataset check-up report: which datasets still lack GDPR documentation

use async_trait::async_trait;

use super::html::{Cell, Column, HtmlDocument, Table};
use super::progress::{ProgressCallback, ProgressSchedule};
use super::{ProjectScope, Report, logging, select_projects};
use crate::core::{Classification, Result};
use crate::platform::PlatformApi;
use crate::platform::models::DatasetGdprFields;

const TITLE: &str = "Dataset check-up report";

pub const COLUMNS: &[Column] = &[
    Column::leaf("Dataset"),
    Column::leaf("Contains personal data"),
    Column::leaf("Purpose"),
    Column::leaf("Retention policy"),
    Column::leaf("Legal consent"),
];

/// Whether a dataset belongs in the check-up listing
pub fn is_listed(classification: Classification, only_unsure: bool) -> bool {
    !only_unsure || classification == Classification::Unsure
}

fn dataset_row(dataset_name: &str, fields: &DatasetGdprFields) -> [Cell; 5] {
    [
        Cell::text(dataset_name),
        Cell::text(fields.classification.as_str()),
        Cell::text(fields.purposes.as_str()),
        Cell::text(fields.retention_policy.as_str()),
        Cell::text(fields.legal_consent.as_str()),
    ]
}

/// Per-project listing of dataset classifications and GDPR fields
pub struct CheckupReport<'a> {
    api: &'a dyn PlatformApi,
    scope: ProjectScope,
    only_unsure: bool,
}

impl<'a> CheckupReport<'a> {
    pub fn new(api: &'a dyn PlatformApi, scope: ProjectScope, only_unsure: bool) -> Self {
        Self {
            api,
            scope,
            only_unsure,
        }
    }

    async fn project_table(&self, project_key: &str) -> Result<Table> {
        let mut table = Table::new(COLUMNS);
        for dataset in self.api.list_datasets(project_key).await? {
            let definition = self
                .api
                .dataset_definition(project_key, &dataset.name)
                .await?;
            let fields = definition.gdpr_fields();
            if is_listed(fields.classification, self.only_unsure) {
                table.row(&dataset_row(&dataset.name, &fields));
            }
        }
        Ok(table)
    }
}

#[async_trait]
impl Report for CheckupReport<'_> {
    async fn run(&self, progress: &mut dyn ProgressCallback) -> Result<String> {
        let project_keys = select_projects(self.api, &self.scope).await?;
        let mut schedule = ProgressSchedule::start(progress, project_keys.len());
        let mut doc = HtmlDocument::new(TITLE);

        for project_key in &project_keys {
            let phase = format!("check-up of {project_key}");
            logging::log_phase_start(&phase);
            let metadata = self.api.project_metadata(project_key).await?;
            let table = self.project_table(project_key).await?;
            let rows = table.records();

            doc.heading(3, &format!("Project {}", metadata.label_or(project_key)));
            doc.push_html(&table.finish());
            let value = schedule.advance();
            logging::log_phase_complete(&phase, rows, value);
        }

        schedule.finish();
        Ok(doc.finish())
    }
}

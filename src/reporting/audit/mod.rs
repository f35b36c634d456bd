//! GDPR audit report
//!
//! Up to four sections, each a top-level progress phase: connections,
//! projects, all objects and policy violations.

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use super::html::HtmlDocument;
use super::progress::{ProgressCallback, ProgressSchedule};
use super::{ProjectScope, Report, logging, select_projects};
use crate::core::{Classification, Result};
use crate::platform::{DatasetDefinition, PlatformApi};

pub mod connections;
pub mod objects;
pub mod policy;
pub mod projects;

const TITLE: &str = "GDPR audit report";

/// Sections rendered by the audit report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditSections {
    pub connections: bool,
    pub projects: bool,
    pub all_objects: bool,
    pub policy_violations: bool,
}

impl Default for AuditSections {
    fn default() -> Self {
        Self {
            connections: true,
            projects: true,
            all_objects: true,
            policy_violations: false,
        }
    }
}

impl AuditSections {
    /// Number of enabled sections, i.e. progress phases
    pub fn count(&self) -> usize {
        [
            self.connections,
            self.projects,
            self.all_objects,
            self.policy_violations,
        ]
        .iter()
        .filter(|enabled| **enabled)
        .count()
    }
}

/// Dataset definitions and listings fetched during one report run.
///
/// Several sections read the same definitions; each is requested once.
pub struct DatasetLookup<'a> {
    api: &'a dyn PlatformApi,
    names: FxHashMap<String, Vec<String>>,
    definitions: FxHashMap<(String, String), DatasetDefinition>,
}

impl<'a> DatasetLookup<'a> {
    pub fn new(api: &'a dyn PlatformApi) -> Self {
        Self {
            api,
            names: FxHashMap::default(),
            definitions: FxHashMap::default(),
        }
    }

    /// Dataset names of a project in platform order
    pub async fn dataset_names(&mut self, project_key: &str) -> Result<Vec<String>> {
        if let Some(names) = self.names.get(project_key) {
            return Ok(names.clone());
        }
        let names: Vec<String> = self
            .api
            .list_datasets(project_key)
            .await?
            .into_iter()
            .map(|dataset| dataset.name)
            .collect();
        self.names.insert(project_key.to_string(), names.clone());
        Ok(names)
    }

    pub async fn definition(
        &mut self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<&DatasetDefinition> {
        let key = (project_key.to_string(), dataset_name.to_string());
        if !self.definitions.contains_key(&key) {
            let definition = self.api.dataset_definition(project_key, dataset_name).await?;
            self.definitions.insert(key.clone(), definition);
        }
        Ok(&self.definitions[&key])
    }

    pub async fn classification(
        &mut self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<Classification> {
        Ok(self
            .definition(project_key, dataset_name)
            .await?
            .classification())
    }
}

/// Audit of connections, projects and data assets
pub struct AuditReport<'a> {
    api: &'a dyn PlatformApi,
    scope: ProjectScope,
    sections: AuditSections,
}

impl<'a> AuditReport<'a> {
    pub fn new(api: &'a dyn PlatformApi, scope: ProjectScope, sections: AuditSections) -> Self {
        Self {
            api,
            scope,
            sections,
        }
    }
}

#[async_trait]
impl Report for AuditReport<'_> {
    async fn run(&self, progress: &mut dyn ProgressCallback) -> Result<String> {
        let mut schedule = ProgressSchedule::start(progress, self.sections.count());
        let project_keys = select_projects(self.api, &self.scope).await?;
        let mut lookup = DatasetLookup::new(self.api);
        let mut doc = HtmlDocument::new(TITLE);

        if self.sections.connections {
            logging::log_phase_start("connections section");
            let table = connections::build(self.api, &project_keys, &mut lookup).await?;
            let rows = table.records();
            doc.heading(3, "Connections");
            doc.push_html(&table.finish());
            let value = schedule.advance();
            logging::log_phase_complete("connections section", rows, value);
        }

        if self.sections.projects {
            logging::log_phase_start("projects section");
            let table = projects::build(self.api, &project_keys, &mut lookup).await?;
            let rows = table.records();
            doc.heading(3, "Projects");
            doc.push_html(&table.finish());
            let value = schedule.advance();
            logging::log_phase_complete("projects section", rows, value);
        }

        if self.sections.all_objects {
            logging::log_phase_start("all objects section");
            doc.heading(3, "All objects");
            let mut rows = 0;
            for project_key in &project_keys {
                rows += objects::render_project(self.api, project_key, &mut lookup, &mut doc)
                    .await?;
            }
            let value = schedule.advance();
            logging::log_phase_complete("all objects section", rows, value);
        }

        if self.sections.policy_violations {
            logging::log_phase_start("policy violations section");
            let table = policy::build(self.api, &project_keys, &mut lookup).await?;
            let rows = table.records();
            doc.heading(3, "Policy violations");
            doc.push_html(&table.finish());
            let value = schedule.advance();
            logging::log_phase_complete("policy violations section", rows, value);
        }

        schedule.finish();
        Ok(doc.finish())
    }
}

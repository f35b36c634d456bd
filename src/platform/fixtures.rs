//! In-memory platform used by the report unit tests

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::PlatformApi;
use super::models::*;
use crate::core::{GdprError, Result};

fn from_json<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("fixture JSON must match the model")
}

fn not_found(what: &str) -> GdprError {
    GdprError::Api {
        status: 404,
        url: format!("memory://{what}"),
        message: format!("{what} does not exist"),
    }
}

#[derive(Debug, Default)]
struct DatasetFixture {
    definition: DatasetDefinition,
    metadata: DatasetMetadata,
    usages: Vec<DatasetUsage>,
    metrics: ComputedMetrics,
}

#[derive(Debug, Default)]
struct TaskFixture {
    summary: MlTaskSummary,
    settings: MlTaskSettings,
    trained: IndexMap<String, TrainedModelDetails>,
}

#[derive(Debug, Default)]
struct AnalysisFixture {
    definition: AnalysisDefinition,
    tasks: IndexMap<String, TaskFixture>,
}

#[derive(Debug, Default)]
struct SavedModelFixture {
    summary: SavedModelSummary,
    versions: Vec<SavedModelVersion>,
    details: IndexMap<String, SavedModelVersionDetails>,
}

#[derive(Debug, Default)]
struct ProjectFixture {
    metadata: ProjectMetadata,
    permissions: ProjectPermissions,
    settings: ProjectSettings,
    datasets: IndexMap<String, DatasetFixture>,
    analyses: IndexMap<String, AnalysisFixture>,
    saved_models: IndexMap<String, SavedModelFixture>,
}

/// Platform state assembled with a builder, answering like the REST API
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    projects: IndexMap<String, ProjectFixture>,
    connections: IndexMap<String, Connection>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn project_mut(&mut self, key: &str) -> &mut ProjectFixture {
        self.projects.entry(key.to_string()).or_default()
    }

    pub fn project(mut self, key: &str, metadata: Value) -> Self {
        self.project_mut(key).metadata = from_json(metadata);
        self
    }

    pub fn permissions(mut self, key: &str, permissions: Value) -> Self {
        self.project_mut(key).permissions = from_json(permissions);
        self
    }

    pub fn settings(mut self, key: &str, settings: Value) -> Self {
        self.project_mut(key).settings = from_json(settings);
        self
    }

    /// Add a dataset; its name is read from the definition
    pub fn dataset(mut self, key: &str, definition: Value) -> Self {
        let definition: DatasetDefinition = from_json(definition);
        let name = definition.name.clone();
        self.project_mut(key).datasets.insert(
            name,
            DatasetFixture {
                definition,
                ..Default::default()
            },
        );
        self
    }

    pub fn dataset_details(
        mut self,
        key: &str,
        name: &str,
        metadata: Value,
        usages: Value,
        metrics: Value,
    ) -> Self {
        let dataset = self
            .project_mut(key)
            .datasets
            .get_mut(name)
            .expect("dataset must be added before its details");
        dataset.metadata = from_json(metadata);
        dataset.usages = from_json(usages);
        dataset.metrics = from_json(metrics);
        self
    }

    /// Add an analysis; its id is read from the definition
    pub fn analysis(mut self, key: &str, definition: Value) -> Self {
        let definition: AnalysisDefinition = from_json(definition);
        let id = definition.id.clone();
        self.project_mut(key).analyses.insert(
            id,
            AnalysisFixture {
                definition,
                ..Default::default()
            },
        );
        self
    }

    /// Add a model-training task with trained models given as
    /// `(full model id, start time in ms)`
    pub fn ml_task(
        mut self,
        key: &str,
        analysis_id: &str,
        ml_task_id: &str,
        input_dataset: &str,
        settings: Value,
        trained: &[(&str, i64)],
    ) -> Self {
        let analysis = self
            .project_mut(key)
            .analyses
            .get_mut(analysis_id)
            .expect("analysis must be added before its tasks");
        analysis.tasks.insert(
            ml_task_id.to_string(),
            TaskFixture {
                summary: MlTaskSummary {
                    analysis_id: analysis_id.to_string(),
                    ml_task_id: ml_task_id.to_string(),
                    input_dataset: input_dataset.to_string(),
                },
                settings: from_json(settings),
                trained: trained
                    .iter()
                    .map(|(id, start_time)| {
                        (
                            id.to_string(),
                            TrainedModelDetails {
                                train_info: TrainInfo {
                                    start_time: *start_time,
                                },
                            },
                        )
                    })
                    .collect(),
            },
        );
        self
    }

    pub fn saved_model(
        mut self,
        key: &str,
        summary: Value,
        versions: Value,
        details: &[(&str, Value)],
    ) -> Self {
        let summary: SavedModelSummary = from_json(summary);
        let id = summary.id.clone();
        self.project_mut(key).saved_models.insert(
            id,
            SavedModelFixture {
                summary,
                versions: from_json(versions),
                details: details
                    .iter()
                    .map(|(version, value)| (version.to_string(), from_json(value.clone())))
                    .collect(),
            },
        );
        self
    }

    pub fn connection(mut self, name: &str, connection: Value) -> Self {
        self.connections
            .insert(name.to_string(), from_json(connection));
        self
    }

    fn get_project(&self, key: &str) -> Result<&ProjectFixture> {
        self.projects
            .get(key)
            .ok_or_else(|| not_found(&format!("project {key}")))
    }

    fn get_dataset(&self, key: &str, name: &str) -> Result<&DatasetFixture> {
        self.get_project(key)?
            .datasets
            .get(name)
            .ok_or_else(|| not_found(&format!("dataset {key}.{name}")))
    }

    fn get_analysis(&self, key: &str, analysis_id: &str) -> Result<&AnalysisFixture> {
        self.get_project(key)?
            .analyses
            .get(analysis_id)
            .ok_or_else(|| not_found(&format!("analysis {analysis_id}")))
    }

    fn get_task(&self, key: &str, analysis_id: &str, ml_task_id: &str) -> Result<&TaskFixture> {
        self.get_analysis(key, analysis_id)?
            .tasks
            .get(ml_task_id)
            .ok_or_else(|| not_found(&format!("ml task {ml_task_id}")))
    }

    fn get_saved_model(&self, key: &str, id: &str) -> Result<&SavedModelFixture> {
        self.get_project(key)?
            .saved_models
            .get(id)
            .ok_or_else(|| not_found(&format!("saved model {id}")))
    }
}

#[async_trait]
impl PlatformApi for InMemoryPlatform {
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        Ok(self
            .projects
            .keys()
            .map(|key| ProjectSummary {
                project_key: key.clone(),
            })
            .collect())
    }

    async fn project_metadata(&self, project_key: &str) -> Result<ProjectMetadata> {
        Ok(self.get_project(project_key)?.metadata.clone())
    }

    async fn project_permissions(&self, project_key: &str) -> Result<ProjectPermissions> {
        Ok(self.get_project(project_key)?.permissions.clone())
    }

    async fn project_settings(&self, project_key: &str) -> Result<ProjectSettings> {
        Ok(self.get_project(project_key)?.settings.clone())
    }

    async fn list_datasets(&self, project_key: &str) -> Result<Vec<DatasetSummary>> {
        Ok(self
            .get_project(project_key)?
            .datasets
            .keys()
            .map(|name| DatasetSummary { name: name.clone() })
            .collect())
    }

    async fn dataset_definition(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<DatasetDefinition> {
        Ok(self.get_dataset(project_key, dataset_name)?.definition.clone())
    }

    async fn dataset_metadata(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<DatasetMetadata> {
        Ok(self.get_dataset(project_key, dataset_name)?.metadata.clone())
    }

    async fn dataset_usages(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<Vec<DatasetUsage>> {
        Ok(self.get_dataset(project_key, dataset_name)?.usages.clone())
    }

    async fn dataset_last_metrics(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<ComputedMetrics> {
        Ok(self.get_dataset(project_key, dataset_name)?.metrics.clone())
    }

    async fn list_analyses(&self, project_key: &str) -> Result<Vec<AnalysisSummary>> {
        Ok(self
            .get_project(project_key)?
            .analyses
            .keys()
            .map(|id| AnalysisSummary {
                analysis_id: id.clone(),
            })
            .collect())
    }

    async fn analysis_definition(
        &self,
        project_key: &str,
        analysis_id: &str,
    ) -> Result<AnalysisDefinition> {
        Ok(self.get_analysis(project_key, analysis_id)?.definition.clone())
    }

    async fn analysis_ml_tasks(&self, project_key: &str, analysis_id: &str) -> Result<MlTaskList> {
        Ok(MlTaskList {
            ml_tasks: self
                .get_analysis(project_key, analysis_id)?
                .tasks
                .values()
                .map(|task| task.summary.clone())
                .collect(),
        })
    }

    async fn project_ml_tasks(&self, project_key: &str) -> Result<MlTaskList> {
        Ok(MlTaskList {
            ml_tasks: self
                .get_project(project_key)?
                .analyses
                .values()
                .flat_map(|analysis| analysis.tasks.values())
                .map(|task| task.summary.clone())
                .collect(),
        })
    }

    async fn ml_task_settings(
        &self,
        project_key: &str,
        analysis_id: &str,
        ml_task_id: &str,
    ) -> Result<MlTaskSettings> {
        Ok(self
            .get_task(project_key, analysis_id, ml_task_id)?
            .settings
            .clone())
    }

    async fn trained_model_ids(
        &self,
        project_key: &str,
        analysis_id: &str,
        ml_task_id: &str,
    ) -> Result<Vec<String>> {
        Ok(self
            .get_task(project_key, analysis_id, ml_task_id)?
            .trained
            .keys()
            .cloned()
            .collect())
    }

    async fn trained_model_details(
        &self,
        project_key: &str,
        analysis_id: &str,
        ml_task_id: &str,
        full_model_id: &str,
    ) -> Result<TrainedModelDetails> {
        self.get_task(project_key, analysis_id, ml_task_id)?
            .trained
            .get(full_model_id)
            .cloned()
            .ok_or_else(|| not_found(&format!("trained model {full_model_id}")))
    }

    async fn list_saved_models(&self, project_key: &str) -> Result<Vec<SavedModelSummary>> {
        Ok(self
            .get_project(project_key)?
            .saved_models
            .values()
            .map(|model| model.summary.clone())
            .collect())
    }

    async fn saved_model_versions(
        &self,
        project_key: &str,
        saved_model_id: &str,
    ) -> Result<Vec<SavedModelVersion>> {
        Ok(self
            .get_saved_model(project_key, saved_model_id)?
            .versions
            .clone())
    }

    async fn saved_model_version_details(
        &self,
        project_key: &str,
        saved_model_id: &str,
        version_id: &str,
    ) -> Result<SavedModelVersionDetails> {
        self.get_saved_model(project_key, saved_model_id)?
            .details
            .get(version_id)
            .cloned()
            .ok_or_else(|| not_found(&format!("saved model version {version_id}")))
    }

    async fn list_connections(&self) -> Result<IndexMap<String, Connection>> {
        Ok(self.connections.clone())
    }
}

//! Platform API access
//!
//! The reports only talk to the platform through [`PlatformApi`]. The
//! HTTP implementation lives in [`client`]; tests plug in-memory fixtures
//! behind the same trait.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::core::Result;

pub mod client;
pub mod models;

#[cfg(test)]
pub(crate) mod fixtures;

pub use client::DssClient;
pub use models::{
    AnalysisDefinition, AnalysisSummary, ComputedMetrics, Connection, DatasetDefinition,
    DatasetMetadata, DatasetSummary, DatasetUsage, MlTaskList, MlTaskSettings, ProjectMetadata,
    ProjectPermissions, ProjectSettings, ProjectSummary, SavedModelSummary, SavedModelVersion,
    SavedModelVersionDetails, TrainedModelDetails,
};

/// Read-only view of the platform state the reports are built from
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>>;

    async fn project_metadata(&self, project_key: &str) -> Result<ProjectMetadata>;

    async fn project_permissions(&self, project_key: &str) -> Result<ProjectPermissions>;

    async fn project_settings(&self, project_key: &str) -> Result<ProjectSettings>;

    async fn list_datasets(&self, project_key: &str) -> Result<Vec<DatasetSummary>>;

    async fn dataset_definition(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<DatasetDefinition>;

    async fn dataset_metadata(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<DatasetMetadata>;

    async fn dataset_usages(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<Vec<DatasetUsage>>;

    async fn dataset_last_metrics(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<ComputedMetrics>;

    async fn list_analyses(&self, project_key: &str) -> Result<Vec<AnalysisSummary>>;

    async fn analysis_definition(
        &self,
        project_key: &str,
        analysis_id: &str,
    ) -> Result<AnalysisDefinition>;

    /// Model-training tasks of one analysis
    async fn analysis_ml_tasks(&self, project_key: &str, analysis_id: &str) -> Result<MlTaskList>;

    /// Model-training tasks of every analysis of a project
    async fn project_ml_tasks(&self, project_key: &str) -> Result<MlTaskList>;

    async fn ml_task_settings(
        &self,
        project_key: &str,
        analysis_id: &str,
        ml_task_id: &str,
    ) -> Result<MlTaskSettings>;

    async fn trained_model_ids(
        &self,
        project_key: &str,
        analysis_id: &str,
        ml_task_id: &str,
    ) -> Result<Vec<String>>;

    async fn trained_model_details(
        &self,
        project_key: &str,
        analysis_id: &str,
        ml_task_id: &str,
        full_model_id: &str,
    ) -> Result<TrainedModelDetails>;

    async fn list_saved_models(&self, project_key: &str) -> Result<Vec<SavedModelSummary>>;

    async fn saved_model_versions(
        &self,
        project_key: &str,
        saved_model_id: &str,
    ) -> Result<Vec<SavedModelVersion>>;

    async fn saved_model_version_details(
        &self,
        project_key: &str,
        saved_model_id: &str,
        version_id: &str,
    ) -> Result<SavedModelVersionDetails>;

    /// Every connection of the instance, keyed by name in platform order
    async fn list_connections(&self) -> Result<IndexMap<String, Connection>>;
}

//! HTTP client for the platform's public REST API

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use super::PlatformApi;
use super::models::{
    AnalysisDefinition, AnalysisSummary, ComputedMetrics, Connection, DatasetDefinition,
    DatasetMetadata, DatasetSummary, DatasetUsage, MlTaskList, MlTaskSettings, MlTaskStatus,
    ProjectMetadata, ProjectPermissions, ProjectSettings, ProjectSummary, SavedModelSummary,
    SavedModelVersion, SavedModelVersionDetails, TrainedModelDetails,
};
use crate::config::Config;
use crate::core::constants::api;
use crate::core::{GdprError, Result};
use crate::reporting::logging;

/// Marker for list endpoints, which the platform serves with a trailing slash
const TRAILING: &str = "";

/// Platform API client authenticating with an API key
#[derive(Debug, Clone)]
pub struct DssClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl DssClient {
    /// Build a client from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.platform_url()?;
        let api_key = config.require_api_key()?.to_string();

        let user_agent = config.user_agent.as_deref().unwrap_or(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));

        let http = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .user_agent(user_agent)
            .danger_accept_invalid_certs(config.skip_ssl_verification.unwrap_or(false))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Resolve API path segments against the base URL. Segments are
    /// percent-encoded, so object names never alter the path structure.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GdprError::Config(format!(
                    "Platform URL '{}' cannot be used as a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(api::PUBLIC_API)
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        logging::log_request(url.as_str());

        let response = self
            .http
            .get(url.clone())
            .basic_auth(&self.api_key, Some(""))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = GdprError::Api {
                status: status.as_u16(),
                url: url.to_string(),
                message: error_message(status, &body),
            };
            logging::log_error("Platform request failed", Some(&error));
            return Err(error);
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Pull the human-readable message out of a platform error body
fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if let Ok(serde_json::Value::Object(payload)) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = payload.get("message").and_then(|m| m.as_str())
    {
        return message.to_string();
    }
    if body.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        body.to_string()
    }
}

#[async_trait]
impl PlatformApi for DssClient {
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        self.get_json(&["projects", TRAILING]).await
    }

    async fn project_metadata(&self, project_key: &str) -> Result<ProjectMetadata> {
        self.get_json(&["projects", project_key, "metadata"]).await
    }

    async fn project_permissions(&self, project_key: &str) -> Result<ProjectPermissions> {
        self.get_json(&["projects", project_key, "permissions"])
            .await
    }

    async fn project_settings(&self, project_key: &str) -> Result<ProjectSettings> {
        self.get_json(&["projects", project_key, "settings"]).await
    }

    async fn list_datasets(&self, project_key: &str) -> Result<Vec<DatasetSummary>> {
        self.get_json(&["projects", project_key, "datasets", TRAILING])
            .await
    }

    async fn dataset_definition(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<DatasetDefinition> {
        self.get_json(&["projects", project_key, "datasets", dataset_name])
            .await
    }

    async fn dataset_metadata(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<DatasetMetadata> {
        self.get_json(&["projects", project_key, "datasets", dataset_name, "metadata"])
            .await
    }

    async fn dataset_usages(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<Vec<DatasetUsage>> {
        self.get_json(&["projects", project_key, "datasets", dataset_name, "usages"])
            .await
    }

    async fn dataset_last_metrics(
        &self,
        project_key: &str,
        dataset_name: &str,
    ) -> Result<ComputedMetrics> {
        // NP addresses the whole dataset rather than one partition
        self.get_json(&[
            "projects",
            project_key,
            "datasets",
            dataset_name,
            "metrics",
            "last",
            "NP",
        ])
        .await
    }

    async fn list_analyses(&self, project_key: &str) -> Result<Vec<AnalysisSummary>> {
        self.get_json(&["projects", project_key, "lab", TRAILING])
            .await
    }

    async fn analysis_definition(
        &self,
        project_key: &str,
        analysis_id: &str,
    ) -> Result<AnalysisDefinition> {
        self.get_json(&["projects", project_key, "lab", analysis_id, TRAILING])
            .await
    }

    async fn analysis_ml_tasks(&self, project_key: &str, analysis_id: &str) -> Result<MlTaskList> {
        self.get_json(&[
            "projects",
            project_key,
            "lab",
            analysis_id,
            "models",
            TRAILING,
        ])
        .await
    }

    async fn project_ml_tasks(&self, project_key: &str) -> Result<MlTaskList> {
        self.get_json(&["projects", project_key, "models", "lab", TRAILING])
            .await
    }

    async fn ml_task_settings(
        &self,
        project_key: &str,
        analysis_id: &str,
        ml_task_id: &str,
    ) -> Result<MlTaskSettings> {
        self.get_json(&[
            "projects",
            project_key,
            "models",
            "lab",
            analysis_id,
            ml_task_id,
            "settings",
        ])
        .await
    }

    async fn trained_model_ids(
        &self,
        project_key: &str,
        analysis_id: &str,
        ml_task_id: &str,
    ) -> Result<Vec<String>> {
        let status: MlTaskStatus = self
            .get_json(&[
                "projects",
                project_key,
                "models",
                "lab",
                analysis_id,
                ml_task_id,
                "status",
            ])
            .await?;
        Ok(status.trained_model_ids())
    }

    async fn trained_model_details(
        &self,
        project_key: &str,
        analysis_id: &str,
        ml_task_id: &str,
        full_model_id: &str,
    ) -> Result<TrainedModelDetails> {
        self.get_json(&[
            "projects",
            project_key,
            "models",
            "lab",
            analysis_id,
            ml_task_id,
            "models",
            full_model_id,
            "details",
        ])
        .await
    }

    async fn list_saved_models(&self, project_key: &str) -> Result<Vec<SavedModelSummary>> {
        self.get_json(&["projects", project_key, "savedmodels", TRAILING])
            .await
    }

    async fn saved_model_versions(
        &self,
        project_key: &str,
        saved_model_id: &str,
    ) -> Result<Vec<SavedModelVersion>> {
        self.get_json(&[
            "projects",
            project_key,
            "savedmodels",
            saved_model_id,
            "versions",
        ])
        .await
    }

    async fn saved_model_version_details(
        &self,
        project_key: &str,
        saved_model_id: &str,
        version_id: &str,
    ) -> Result<SavedModelVersionDetails> {
        self.get_json(&[
            "projects",
            project_key,
            "savedmodels",
            saved_model_id,
            "versions",
            version_id,
            "details",
        ])
        .await
    }

    async fn list_connections(&self) -> Result<IndexMap<String, Connection>> {
        self.get_json(&["admin", "connections", TRAILING]).await
    }
}

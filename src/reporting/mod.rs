//! Report generation
//!
//! Both reports are functions of the platform state and the configuration,
//! producing one HTML document. They share the project selection, the HTML
//! building blocks and the progress schedule defined here.

use async_trait::async_trait;

use crate::core::{ProgressTarget, Result};
use crate::platform::PlatformApi;

pub mod audit;
pub mod checkup;
pub mod html;
pub mod logging;
pub mod progress;

// Re-export commonly used items
pub use audit::{AuditReport, AuditSections};
pub use checkup::CheckupReport;
pub use progress::{ProgressCallback, ProgressSchedule};

/// A report run against the platform
#[async_trait]
pub trait Report: Send + Sync {
    /// Scale of the values passed to the progress callback
    fn progress_target(&self) -> ProgressTarget {
        ProgressTarget::default()
    }

    /// Build the HTML document, reporting progress along the way
    async fn run(&self, progress: &mut dyn ProgressCallback) -> Result<String>;
}

/// Projects covered by a report run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    /// Every project of the instance, in platform order
    All,
    /// Only the project the report was launched for
    Single(String),
}

/// Resolve the scope into an ordered list of project keys
pub async fn select_projects(api: &dyn PlatformApi, scope: &ProjectScope) -> Result<Vec<String>> {
    let project_keys = match scope {
        ProjectScope::All => api
            .list_projects()
            .await?
            .into_iter()
            .map(|project| project.project_key)
            .collect(),
        ProjectScope::Single(key) => vec![key.clone()],
    };
    logging::log_scope(&project_keys);
    Ok(project_keys)
}

//! Configuration management
//!
//! Settings come from a TOML file, the environment and CLI arguments, in
//! increasing order of precedence.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::constants::{config_files, timeouts};
use crate::core::error::{GdprError, Result};
use crate::reporting::ProjectScope;
use crate::reporting::audit::AuditSections;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the platform, e.g. `https://dss.example.com`
    pub url: Option<String>,

    /// Personal or global API key
    pub api_key: Option<String>,

    /// Project the report is generated for when not covering all projects
    pub project_key: Option<String>,

    /// Cover every project of the instance
    pub all_projects: Option<bool>,

    /// Audit: connections section
    pub include_connections: Option<bool>,

    /// Audit: projects section
    pub include_projects: Option<bool>,

    /// Audit: all-objects section
    pub include_all_objects: Option<bool>,

    /// Audit: policy violations section
    pub include_policy_violations: Option<bool>,

    /// Check-up: only list datasets whose classification is unset or unsure
    pub only_unsure: Option<bool>,

    /// Path of the HTML file to write, stdout when unset
    pub output: Option<String>,

    /// Timeout in seconds for HTTP requests
    pub timeout: Option<u64>,

    /// Custom User-Agent header
    pub user_agent: Option<String>,

    /// Skip SSL certificate verification
    pub skip_ssl_verification: Option<bool>,

    /// Enable verbose logging
    pub verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            project_key: None,
            all_projects: Some(false),
            include_connections: Some(true),
            include_projects: Some(true),
            include_all_objects: Some(true),
            include_policy_violations: Some(false),
            only_unsure: Some(true),
            output: None,
            timeout: Some(timeouts::DEFAULT_TIMEOUT_SECONDS),
            user_agent: None,
            skip_ssl_verification: Some(false),
            verbose: Some(false),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults for unset keys
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GdprError::Config(format!(
                "Could not read config file '{}': {e}",
                path.display()
            ))
        })?;

        let config: Config = toml::from_str(&content).inspect_err(|_| {
            log::error!("Invalid TOML in config file '{}'", path.display());
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Config file paths searched in order: the working directory, then
    /// its parents
    pub fn standard_locations() -> Vec<PathBuf> {
        (0..=config_files::PARENT_SEARCH_DEPTH)
            .map(|depth| {
                PathBuf::from(format!("{}{}", "../".repeat(depth), config_files::FILE_NAME))
            })
            .collect()
    }

    /// Load the first config file found in the standard locations.
    ///
    /// A file that exists but cannot be parsed is an error; no file at all
    /// yields the defaults.
    pub fn load_from_standard_locations() -> Result<Self> {
        for path in Self::standard_locations() {
            if path.is_file() {
                log::debug!("Using config file {}", path.display());
                return Self::load_from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Fill the URL and API key from the environment
    pub fn apply_environment(&mut self) {
        self.apply_environment_from(|name| std::env::var(name).ok());
    }

    /// Fill the URL and API key through `lookup`; environment values override
    /// the file, empty values are ignored
    pub fn apply_environment_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(config_files::URL_ENV) {
            self.url = Some(url);
        }
        if let Some(api_key) = non_empty(config_files::API_KEY_ENV) {
            self.api_key = Some(api_key);
        }
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Platform access
        if let Some(ref url) = cli_config.url {
            self.url = Some(url.clone());
        }
        if let Some(ref api_key) = cli_config.api_key {
            self.api_key = Some(api_key.clone());
        }
        if let Some(ref project_key) = cli_config.project_key {
            self.project_key = Some(project_key.clone());
        }

        // Report scope & sections
        if cli_config.all_projects {
            self.all_projects = Some(true);
        }
        if cli_config.no_connections {
            self.include_connections = Some(false);
        }
        if cli_config.no_projects {
            self.include_projects = Some(false);
        }
        if cli_config.no_objects {
            self.include_all_objects = Some(false);
        }
        if cli_config.policy_violations {
            self.include_policy_violations = Some(true);
        }
        if cli_config.include_classified {
            self.only_unsure = Some(false);
        }

        // Output
        if let Some(ref output) = cli_config.output {
            self.output = Some(output.clone());
        }
        if cli_config.verbose {
            self.verbose = Some(true);
        }

        // Network & security
        if let Some(timeout) = cli_config.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(ref user_agent) = cli_config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }
        if cli_config.skip_ssl_verification {
            self.skip_ssl_verification = Some(true);
        }
    }

    /// Get timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(timeouts::DEFAULT_TIMEOUT_SECONDS))
    }

    /// Parsed platform URL; only http and https are accepted
    pub fn platform_url(&self) -> Result<Url> {
        let raw = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                GdprError::Config(format!(
                    "Platform URL is not set. Use --url or the {} environment variable.",
                    config_files::URL_ENV
                ))
            })?;

        let url = Url::parse(raw)
            .map_err(|e| GdprError::Config(format!("Platform URL '{raw}' is invalid: {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(GdprError::Config(format!(
                "Platform URL '{raw}' uses unsupported scheme '{scheme}'. Expected http or https."
            ))),
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GdprError::Config(format!(
                    "API key is not set. Use --api-key or the {} environment variable.",
                    config_files::API_KEY_ENV
                ))
            })
    }

    /// Projects covered by a report run
    pub fn project_scope(&self) -> Result<ProjectScope> {
        if self.all_projects.unwrap_or(false) {
            return Ok(ProjectScope::All);
        }
        match self.project_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(ProjectScope::Single(key.to_string())),
            _ => Err(GdprError::Config(
                "No project key given. Use --project <KEY> or --all-projects.".to_string(),
            )),
        }
    }

    /// Sections enabled for the audit report
    pub fn audit_sections(&self) -> AuditSections {
        AuditSections {
            connections: self.include_connections.unwrap_or(true),
            projects: self.include_projects.unwrap_or(true),
            all_objects: self.include_all_objects.unwrap_or(true),
            policy_violations: self.include_policy_violations.unwrap_or(false),
        }
    }

    pub fn only_unsure(&self) -> bool {
        self.only_unsure.unwrap_or(true)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(GdprError::Config(
                    "Timeout cannot be 0. Expected a positive integer representing seconds."
                        .to_string(),
                ));
            }
            if timeout > timeouts::MAX_TIMEOUT_SECONDS {
                return Err(GdprError::Config(format!(
                    "Timeout of {timeout} seconds is extremely large (>24 hours). Consider using a smaller value."
                )));
            }
        }

        if self.url.is_some() {
            self.platform_url()?;
        }

        Ok(())
    }

    /// Validate everything a report run needs: values, credentials and scope
    pub fn validate_for_run(&self) -> Result<()> {
        self.validate()?;
        self.platform_url()?;
        self.require_api_key()?;
        self.project_scope()?;
        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Platform access
    pub url: Option<String>,         // --url
    pub api_key: Option<String>,     // --api-key
    pub project_key: Option<String>, // --project

    // Report scope & sections
    pub all_projects: bool,       // --all-projects
    pub no_connections: bool,     // audit --no-connections
    pub no_projects: bool,        // audit --no-projects
    pub no_objects: bool,         // audit --no-objects
    pub policy_violations: bool,  // audit --policy-violations
    pub include_classified: bool, // checkup --include-classified

    // Output
    pub output: Option<String>, // --output
    pub quiet: bool,            // --quiet
    pub verbose: bool,          // --verbose
    pub no_progress: bool,      // --no-progress

    // Network & security
    pub timeout: Option<u64>,        // --timeout
    pub user_agent: Option<String>,  // --user-agent
    pub skip_ssl_verification: bool, // --insecure

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}

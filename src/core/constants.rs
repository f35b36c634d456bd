/// Application-wide constants to avoid magic values throughout the codebase.
///
/// Platform field names, defaults and layout values live here so the report
/// builders never spell a raw key twice.
/// Custom field keys written by the GDPR plugin on platform objects
pub mod custom_fields {
    /// Dataset classification: YES, NO or UNSURE
    pub const CONTAINS_PERSONAL_DATA: &str = "gdpr_contains_personal_data";
    /// Dataset processing purposes
    pub const PURPOSES: &str = "gdpr_purposes";
    /// Dataset retention policy
    pub const RETENTION_POLICY: &str = "gdpr_retention_policy";
    /// Dataset legal consent text
    pub const LEGAL_CONSENT: &str = "gdpr_legal_consent";

    /// Project flag: forbid sharing personal datasets with other projects
    pub const FORBID_DATASET_SHARING: &str = "gdpr_forbid_dataset_sharing";
    /// Project flag: forbid exporting personal datasets
    pub const FORBID_DATASET_EXPORT: &str = "gdpr_forbid_dataset_export";
    /// Project flag: forbid training models on personal datasets
    pub const FORBID_MODEL_CREATION: &str = "gdpr_forbid_model_creation";
    /// Project flag: forbid uploaded-file datasets
    pub const FORBID_UPLOADED_DATASETS: &str = "gdpr_forbid_uploaded_datasets";
    /// Project list: connections datasets may not use
    pub const FORBIDDEN_CONNECTIONS: &str = "gdpr_forbidden_connections";
}

/// Raw platform values the report logic branches on
pub mod platform {
    /// Usage kind of a dataset produced by a pipeline step
    pub const USAGE_RECIPE_OUTPUT: &str = "RECIPE_OUTPUT";
    /// Exposed object kind for datasets
    pub const EXPOSED_DATASET: &str = "DATASET";
    /// Metric holding the start time of every dataset build
    pub const BUILD_START_DATE_METRIC: &str = "reporting:BUILD_START_DATE";
    /// Dataset type of uploaded files
    pub const UPLOADED_FILES_TYPE: &str = "UploadedFiles";
    /// Model task type that carries a prediction subtype
    pub const PREDICTION_TASK: &str = "PREDICTION";
    /// Feature role for plain inputs (not annotated in reports)
    pub const ROLE_INPUT: &str = "INPUT";
    /// Feature role for rejected features (hidden in reports)
    pub const ROLE_REJECT: &str = "REJECT";
    /// Connection parameter holding an explicit host
    pub const PARAM_HOST: &str = "host";
    /// Connection parameter holding an explicit port
    pub const PARAM_PORT: &str = "port";
    /// Connection parameter holding a JDBC URL
    pub const PARAM_JDBC_URL: &str = "jdbcurl";
    /// Pattern extracting the authority part of a JDBC URL
    pub const JDBC_HOST_PATTERN: &str = r"^.*://([^/]*)/.*";
    /// Separator between the project key and the dataset name in smart names
    pub const SMART_NAME_SEPARATOR: char = '.';
    /// Separator inside a full model id
    pub const FULL_MODEL_ID_SEPARATOR: char = '-';
    /// Index of the analysis id inside a full model id
    pub const FULL_MODEL_ID_ANALYSIS_INDEX: usize = 2;
}

/// Progress reporting constants
pub mod progress {
    /// Fixed progress scale exposed to the host
    pub const TARGET: u32 = 100;
}

/// Date rendering constants
pub mod dates {
    /// Format used for every date cell
    pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
}

/// Timeout and duration constants
pub mod timeouts {
    /// Default request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
    /// Maximum accepted timeout in seconds (24 hours)
    pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;
}

/// Configuration discovery and environment constants
pub mod config_files {
    /// Name of the config file looked up in the working directory
    pub const FILE_NAME: &str = ".gdpr-report.toml";
    /// Number of parent directories searched for the config file
    pub const PARENT_SEARCH_DEPTH: usize = 3;
    /// Environment variable holding the API key
    pub const API_KEY_ENV: &str = "DSS_API_KEY";
    /// Environment variable holding the platform URL
    pub const URL_ENV: &str = "DSS_URL";
}

/// HTTP API paths
pub mod api {
    /// Path segments of the public API root
    pub const PUBLIC_API: [&str; 2] = ["public", "api"];
}

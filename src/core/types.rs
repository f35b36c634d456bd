use std::fmt;

use crate::core::constants::{platform, progress};

/// Personal-data classification of a dataset.
///
/// The flag is three-valued and defaults to [`Classification::Unsure`]:
/// a dataset nobody classified must never be reported as free of
/// personal data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    /// Dataset contains personal data
    Yes,
    /// Dataset was reviewed and holds no personal data
    No,
    /// Not classified yet, or explicitly marked unsure
    #[default]
    Unsure,
}

impl Classification {
    /// Parse a raw custom field value.
    ///
    /// Missing, empty and unrecognised values all map to `Unsure` so the
    /// three buckets always cover every dataset.
    pub fn from_field(value: Option<&str>) -> Self {
        match value {
            Some("YES") => Classification::Yes,
            Some("NO") => Classification::No,
            _ => Classification::Unsure,
        }
    }

    /// Whether the dataset may hold personal data (anything but `No`)
    pub fn may_contain_personal_data(self) -> bool {
        self != Classification::No
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Yes => "YES",
            Classification::No => "NO",
            Classification::Unsure => "UNSURE",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a dataset, optionally qualified by its owning project.
///
/// Smart names look like `PROJECT.dataset` or just `dataset`; they are
/// parsed once here instead of being split at every use site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub project: Option<String>,
    pub name: String,
}

impl DatasetRef {
    /// Parse a smart name. Returns `None` for an empty reference.
    pub fn parse(smart_name: &str) -> Option<Self> {
        if smart_name.is_empty() {
            return None;
        }
        match smart_name.split_once(platform::SMART_NAME_SEPARATOR) {
            Some((project, name)) => Some(Self {
                project: Some(project.to_string()),
                name: name.to_string(),
            }),
            None => Some(Self {
                project: None,
                name: smart_name.to_string(),
            }),
        }
    }

    /// Project key owning the dataset, falling back to the referencing project
    pub fn project_or<'a>(&'a self, current: &'a str) -> &'a str {
        self.project.as_deref().unwrap_or(current)
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project {
            Some(project) => write!(f, "{project}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Progress scale advertised to the caller of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTarget {
    pub total: u32,
    /// Unit label; reports use a bare percentage
    pub unit: Option<&'static str>,
}

impl Default for ProgressTarget {
    fn default() -> Self {
        Self {
            total: progress::TARGET,
            unit: None,
        }
    }
}

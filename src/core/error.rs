use std::fmt;

/// Error types for gdpr-report operations
#[derive(Debug)]
pub enum GdprError {
    /// IO error (writing the report, reading config files)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// HTTP transport error while talking to the platform
    Http(reqwest::Error),

    /// Platform answered with a non-success status
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// Platform payload could not be decoded
    Json(serde_json::Error),

    /// Config file is not valid TOML
    TomlParsing(toml::de::Error),
}

impl fmt::Display for GdprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GdprError::Io(err) => write!(f, "IO error: {err}"),
            GdprError::Config(msg) => write!(f, "Configuration error: {msg}"),
            GdprError::Http(err) => write!(f, "HTTP error: {err}"),
            GdprError::Api {
                status,
                url,
                message,
            } => {
                if message.is_empty() {
                    write!(f, "Platform API error: {status} on {url}")
                } else {
                    write!(f, "Platform API error: {status} on {url}: {message}")
                }
            }
            GdprError::Json(err) => write!(f, "Invalid platform response: {err}"),
            GdprError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
        }
    }
}

impl std::error::Error for GdprError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GdprError::Io(err) => Some(err),
            GdprError::Http(err) => Some(err),
            GdprError::Json(err) => Some(err),
            GdprError::TomlParsing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GdprError {
    fn from(err: std::io::Error) -> Self {
        GdprError::Io(err)
    }
}

impl From<reqwest::Error> for GdprError {
    fn from(err: reqwest::Error) -> Self {
        GdprError::Http(err)
    }
}

impl From<serde_json::Error> for GdprError {
    fn from(err: serde_json::Error) -> Self {
        GdprError::Json(err)
    }
}

impl From<toml::de::Error> for GdprError {
    fn from(err: toml::de::Error) -> Self {
        GdprError::TomlParsing(err)
    }
}

/// Type alias for Results using GdprError
pub type Result<T> = std::result::Result<T, GdprError>;

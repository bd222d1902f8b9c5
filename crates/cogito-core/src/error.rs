use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    /// A lookup that has no defaulting behavior referenced an absent concept.
    UnknownConcept(String),
    InvalidConfig(String),
    Config(toml::de::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::UnknownConcept(id) => write!(f, "unknown concept: {id}"),
            CoreError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            CoreError::Config(e) => write!(f, "config parse error: {e}"),
            CoreError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Config(e) => Some(e),
            CoreError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(e: toml::de::Error) -> Self {
        CoreError::Config(e)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

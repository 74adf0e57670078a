use std::fmt::{self, Display};
use std::io;

/// Errors raised while building or configuring a model. The simulation core
/// itself is total: stale or redundant events are silent no-ops, not errors.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ContagionError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    InvalidParameter(String),
    UnknownContagion(String),
}

impl From<io::Error> for ContagionError {
    fn from(error: io::Error) -> Self {
        ContagionError::IoError(error)
    }
}

impl From<serde_json::Error> for ContagionError {
    fn from(error: serde_json::Error) -> Self {
        ContagionError::JsonError(error)
    }
}

impl From<String> for ContagionError {
    fn from(error: String) -> Self {
        ContagionError::InvalidParameter(error)
    }
}

impl From<&str> for ContagionError {
    fn from(error: &str) -> Self {
        ContagionError::InvalidParameter(error.to_string())
    }
}

impl std::error::Error for ContagionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContagionError::IoError(error) => Some(error),
            ContagionError::JsonError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for ContagionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContagionError::IoError(error) => write!(f, "I/O error: {error}"),
            ContagionError::JsonError(error) => write!(f, "JSON error: {error}"),
            ContagionError::InvalidParameter(message) => {
                write!(f, "invalid parameter: {message}")
            }
            ContagionError::UnknownContagion(name) => write!(f, "unknown contagion: {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ContagionError;

    #[test]
    fn from_str_is_invalid_parameter() {
        let error: ContagionError = "bad".into();
        assert!(matches!(error, ContagionError::InvalidParameter(ref m) if m == "bad"));
        assert_eq!(error.to_string(), "invalid parameter: bad");
    }

    #[test]
    fn from_json_error() {
        let json_error = serde_json::from_str::<u32>("not json").unwrap_err();
        let error: ContagionError = json_error.into();
        assert!(matches!(error, ContagionError::JsonError(_)));
        assert!(std::error::Error::source(&error).is_some());
    }
}

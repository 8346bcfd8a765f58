use std::path::PathBuf;

/// Failure while loading or validating a conversation script.
#[derive(Debug)]
pub enum ScriptError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        origin: String,
        source: serde_json::Error,
    },
    Invalid {
        origin: String,
        problems: Vec<String>,
    },
    UnknownLocale(String),
}

impl ScriptError {
    pub fn origin(&self) -> Option<&str> {
        match self {
            ScriptError::Io { .. } | ScriptError::UnknownLocale(_) => None,
            ScriptError::Parse { origin, .. } | ScriptError::Invalid { origin, .. } => Some(origin),
        }
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptError::Io { path, source } => {
                write!(f, "could not read script {}: {}", path.display(), source)
            }
            ScriptError::Parse { origin, source } => {
                write!(f, "script {} is not valid JSON: {}", origin, source)
            }
            ScriptError::Invalid { origin, problems } => {
                write!(f, "script {} has {} problem(s): {}", origin, problems.len(), problems.join("; "))
            }
            ScriptError::UnknownLocale(code) => write!(f, "unknown locale '{}'", code),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScriptError::Io { source, .. } => Some(source),
            ScriptError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

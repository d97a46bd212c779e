use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    /// Writing rendered documentation failed
    OutputError { path: PathBuf, source: std::io::Error },
    /// A declaration manifest could not be read or decoded
    ManifestError { file: PathBuf, message: String },
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::OutputError { path, source } => {
                write!(f, "输出错误 {}: {}", path.display(), source)
            }
            Error::ManifestError { file, message } => {
                write!(f, "清单错误 {}: {}", file.display(), message)
            }
            Error::SerializationError(msg) => write!(f, "序列化错误: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OutputError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON 序列化错误: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML 序列化错误: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_output_error_keeps_source() {
        let err = Error::OutputError {
            path: PathBuf::from("/tmp/docs/index.html"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.to_string().contains("/tmp/docs/index.html"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::SerializationError(_)));
    }

    #[test]
    fn test_manifest_error_has_no_source() {
        let err = Error::ManifestError {
            file: PathBuf::from("decls.yaml"),
            message: "bad indent".to_string(),
        };

        assert!(err.to_string().contains("decls.yaml"));
        assert!(err.source().is_none());
    }
}

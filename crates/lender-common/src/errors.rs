use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("service error: {0}")]
    Service(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("summary.settle_delay_ms = 9000".into());
        assert_eq!(
            err.to_string(),
            "config validation error: summary.settle_delay_ms = 9000"
        );
    }

    #[test]
    fn lender_error_from_config() {
        let err: LenderError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, LenderError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn lender_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin closed");
        let err: LenderError = io_err.into();
        assert!(matches!(err, LenderError::Io(_)));
        assert!(err.to_string().contains("stdin closed"));
    }

    #[test]
    fn lender_error_other_variants() {
        let err = LenderError::Service("catalog unavailable".into());
        assert_eq!(err.to_string(), "service error: catalog unavailable");

        let err = LenderError::Session("no active session".into());
        assert_eq!(err.to_string(), "session error: no active session");

        let err = LenderError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}

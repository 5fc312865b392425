use std::fmt;

/// Errors from loading or saving settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// A value parsed but is not usable.
    Validation(String),
    /// IO error (file read/write, etc.).
    Io(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Validation(msg) => write!(f, "settings validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

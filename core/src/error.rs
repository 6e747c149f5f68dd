use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Failures surfaced by configuration, scanning and content loading.
///
/// Parsing a script path never fails; anything it cannot make sense of becomes
/// an absent field instead.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// A location could not be read: missing directory root, missing archive,
    /// or a file that is not a zip/jar container.
    #[error("unable to read script location '{location}': {reason}")]
    Location { location: String, reason: String },

    #[error("invalid script pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported script encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("unable to load content of script '{file_name}': {source}")]
    Content {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScriptError {
    pub fn location(location: impl Into<String>, reason: impl ToString) -> Self {
        ScriptError::Location { location: location.into(), reason: reason.to_string() }
    }
}

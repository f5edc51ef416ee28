use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or timeout talking to the inference endpoint
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model answered, but with neither text nor tool-use content
    #[error("Unrecognized model response: {0}")]
    ModelResponseFormat(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Tool '{tool}' execution failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    /// 401/403 from any remote collaborator
    #[error("Upstream rejected credentials ({status}): {message}")]
    UpstreamAuth { status: u16, message: String },

    #[error("No credentials found: {}", attempts.join("; "))]
    Credentials { attempts: Vec<String> },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Helper for creating configuration errors
    ///
    /// # Example
    /// ```
    /// use gm_core::Error;
    /// let err = Error::config_error("model_id must not be empty");
    /// ```
    pub fn config_error(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Helper for creating general errors with a message
    pub fn message(msg: impl Into<String>) -> Self {
        Error::Other(anyhow::anyhow!("{}", msg.into()))
    }

    /// Wraps any failure raised while a tool ran
    pub fn tool_failed(tool: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Error::ToolExecution {
            tool: tool.into(),
            source: source.into(),
        }
    }

    pub fn upstream_auth(status: u16, message: impl Into<String>) -> Self {
        Error::UpstreamAuth {
            status,
            message: message.into(),
        }
    }

    /// True for failures of the inference endpoint that a caller may
    /// recover from by degrading the reply.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Error::ModelUnavailable(_) | Error::ModelResponseFormat(_)
        )
    }
}

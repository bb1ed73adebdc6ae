/// Result alias that carries the custom [`KeylightError`] type.
pub type Result<T> = std::result::Result<T, KeylightError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum KeylightError {
    /// Free-form failure message.
    #[error("{0}")]
    Message(String),
    /// A caller supplied a value the engine cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// An event failed while rendering its layers for one tick.
    #[error("event `{event}` failed to render: {message}")]
    Render { event: String, message: String },
    /// A shared lock was poisoned by a panicking holder.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or game state could not be (de)serialised.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl KeylightError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Creates a render failure attributed to `event`.
    pub fn render(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            event: event.into(),
            message: message.into(),
        }
    }
}

impl From<&str> for KeylightError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for KeylightError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

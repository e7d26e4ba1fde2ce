//! Error types for the lookup server.

/// All errors that can stop the server from starting or serving.
///
/// Per-request failures never surface here: upstream problems degrade to an
/// empty record and a 404.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Invalid value {value:?} for {name}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Fetch setup error: {0}")]
    Fetch(#[from] rc_lookup::FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        ServerError::InvalidSetting {
            name,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

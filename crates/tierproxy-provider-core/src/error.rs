#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("upstream request timed out{}", hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    Timeout { hint: Option<String> },
    #[error("{0}")]
    Internal(String),
    #[error("not supported by this backend")]
    NotSupported,
}

impl AdapterError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

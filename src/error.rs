use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Any failed or timed-out fetch. The backend error is kept as the source.
    #[error("backend unavailable while {operation}")]
    BackendUnavailable {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl AnalyticsError {
    pub fn backend(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| AnalyticsError::BackendUnavailable { operation, source }
    }
}

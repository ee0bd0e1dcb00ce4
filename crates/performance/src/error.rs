use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerformanceError {
    #[error("Analytics error for manager '{manager_id}': {source}")]
    Analytics {
        manager_id: String,
        #[source]
        source: analytics::AnalyticsError,
    },
}

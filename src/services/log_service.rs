//! Log service - the capped, newest-first record of lookups.

use crate::{
    error::AppError,
    models::search_log::{LOG_CAP, NewSearchLog, SearchLog},
    storage::Storage,
};

/// Append one entry at the front of the log, keeping the newest [`LOG_CAP`].
pub async fn append_log(storage: &dyn Storage, entry: NewSearchLog) -> Result<SearchLog, AppError> {
    let log = entry.into_log();
    storage.prepend_log(&log, LOG_CAP).await?;
    Ok(log)
}

/// Append without letting a failure reach the caller.
///
/// Used on the lookup path, where logging must never block or fail the lookup.
pub async fn record(storage: &dyn Storage, entry: NewSearchLog) {
    let endpoint = entry.endpoint.clone();
    if let Err(e) = append_log(storage, entry).await {
        tracing::warn!(endpoint = %endpoint, error = %e, "failed to record search log");
    }
}

/// List entries, newest first.
pub async fn list_logs(storage: &dyn Storage) -> Result<Vec<SearchLog>, AppError> {
    Ok(storage.list_logs(LOG_CAP).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search_log::LogStatus;
    use crate::storage::local::LocalStorage;

    fn entry(query: String) -> NewSearchLog {
        NewSearchLog {
            key_name: "Tester".to_string(),
            endpoint: "/mobile".to_string(),
            query,
            status: LogStatus::Success,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_id_and_timestamp() {
        let storage = LocalStorage::in_memory();

        let first = append_log(&storage, entry("a".to_string())).await.unwrap();
        let second = append_log(&storage, entry("b".to_string())).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.timestamp >= first.timestamp);
        assert_eq!(list_logs(&storage).await.unwrap(), vec![second, first]);
    }

    #[tokio::test]
    async fn test_log_is_capped_newest_first() {
        let storage = LocalStorage::in_memory();

        for i in 1..=LOG_CAP + 1 {
            append_log(&storage, entry(format!("query-{i}"))).await.unwrap();
        }

        let logs = list_logs(&storage).await.unwrap();
        assert_eq!(logs.len(), LOG_CAP);
        assert_eq!(logs[0].query, format!("query-{}", LOG_CAP + 1));
        assert_eq!(logs[LOG_CAP - 1].query, "query-2");
    }
}

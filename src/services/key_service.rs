//! Key service - access key management and validation.
//!
//! This service handles:
//! - Creating keys with an explicit or generated value
//! - Listing, toggling and deleting keys
//! - Validating a presented key and counting the use
//!
//! Storage failures are returned, never swallowed; handlers decide how to degrade.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::access_key::{AccessKey, generate_key_value},
    storage::Storage,
};

/// List all keys in backend order.
pub async fn list_keys(storage: &dyn Storage) -> Result<Vec<AccessKey>, AppError> {
    Ok(storage.list_keys().await?)
}

/// Create and persist a new access key.
///
/// # Arguments
///
/// * `name` - Display label, trimmed; must not be blank
/// * `explicit_value` - Key value to use; `None` or blank generates `ak_` + 24 alphanumerics
///
/// # Errors
///
/// - `InvalidRequest`: name is blank
/// - `Storage`: backend write failed
pub async fn create_key(
    storage: &dyn Storage,
    name: &str,
    explicit_value: Option<&str>,
) -> Result<AccessKey, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest(
            "Key name must not be empty".to_string(),
        ));
    }

    let value = match explicit_value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => generate_key_value(),
    };

    let key = AccessKey::new(name, value);
    storage.insert_key(&key).await?;

    tracing::info!(key_id = %key.id, name = %key.name, "access key created");
    Ok(key)
}

/// Delete a key. Deleting an unknown id changes nothing.
pub async fn delete_key(storage: &dyn Storage, id: Uuid) -> Result<(), AppError> {
    storage.delete_key(id).await?;
    tracing::info!(key_id = %id, "access key deleted");
    Ok(())
}

/// Set `enabled` to the negation of the caller's `current_enabled`.
///
/// The stored value is not read first, so two concurrent toggles resolve as
/// last write wins.
pub async fn toggle_key(
    storage: &dyn Storage,
    id: Uuid,
    current_enabled: bool,
) -> Result<(), AppError> {
    storage.set_key_enabled(id, !current_enabled).await?;
    tracing::info!(key_id = %id, enabled = !current_enabled, "access key toggled");
    Ok(())
}

/// Validate a presented key value.
///
/// Returns the matching record with `uses` already incremented. Unknown and
/// disabled keys both yield `None`.
pub async fn validate_key(storage: &dyn Storage, key: &str) -> Result<Option<AccessKey>, AppError> {
    if key.is_empty() {
        return Ok(None);
    }
    Ok(storage.consume_key(key).await?)
}

/// Check that a previously validated key still exists and is enabled.
///
/// Does not count a use.
pub async fn is_key_active(storage: &dyn Storage, id: Uuid) -> Result<bool, AppError> {
    Ok(storage
        .find_key(id)
        .await?
        .is_some_and(|key| key.enabled))
}

/// Create the configured bootstrap key if the store holds no keys yet.
///
/// Returns whether a key was created.
pub async fn seed_if_empty(
    storage: &dyn Storage,
    name: &str,
    value: &str,
) -> Result<bool, AppError> {
    if !storage.list_keys().await?.is_empty() {
        return Ok(false);
    }
    create_key(storage, name, Some(value)).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::access_key::{GENERATED_KEY_LEN, GENERATED_KEY_PREFIX};
    use crate::storage::local::LocalStorage;

    async fn stored(storage: &dyn Storage, id: Uuid) -> AccessKey {
        storage.find_key(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_create_generates_key_when_absent() {
        let storage = LocalStorage::in_memory();

        let created = create_key(&storage, "Tester", None).await.unwrap();

        assert!(created.key.starts_with(GENERATED_KEY_PREFIX));
        assert_eq!(created.key.len(), GENERATED_KEY_PREFIX.len() + GENERATED_KEY_LEN);
        assert_eq!(created.uses, 0);
        assert!(created.enabled);
        assert_eq!(list_keys(&storage).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_create_uses_explicit_value() {
        let storage = LocalStorage::in_memory();

        let created = create_key(&storage, "  Custom ", Some(" my-key ")).await.unwrap();
        assert_eq!(created.name, "Custom");
        assert_eq!(created.key, "my-key");

        let blank = create_key(&storage, "Blank", Some("   ")).await.unwrap();
        assert!(blank.key.starts_with(GENERATED_KEY_PREFIX));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let storage = LocalStorage::in_memory();

        let result = create_key(&storage, "   ", None).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert!(list_keys(&storage).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validate_counts_each_use() {
        let storage = LocalStorage::in_memory();
        let created = create_key(&storage, "Tester", None).await.unwrap();

        for _ in 0..5 {
            assert!(validate_key(&storage, &created.key).await.unwrap().is_some());
        }

        assert_eq!(stored(&storage, created.id).await.uses, 5);
    }

    #[tokio::test]
    async fn test_disabled_and_unknown_keys_look_the_same() {
        let storage = LocalStorage::in_memory();
        let created = create_key(&storage, "Tester", Some("known")).await.unwrap();
        toggle_key(&storage, created.id, true).await.unwrap();

        let disabled = validate_key(&storage, "known").await.unwrap();
        let unknown = validate_key(&storage, "unknown").await.unwrap();

        assert_eq!(disabled, None);
        assert_eq!(unknown, None);
        assert_eq!(stored(&storage, created.id).await.uses, 0);
    }

    #[tokio::test]
    async fn test_validate_empty_key_never_matches() {
        let storage = LocalStorage::in_memory();
        assert_eq!(validate_key(&storage, "").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_toggle_sets_negation_of_current() {
        let storage = LocalStorage::in_memory();
        let created = create_key(&storage, "Tester", None).await.unwrap();

        toggle_key(&storage, created.id, true).await.unwrap();
        assert!(!stored(&storage, created.id).await.enabled);

        // Same stale input twice is idempotent
        toggle_key(&storage, created.id, true).await.unwrap();
        assert!(!stored(&storage, created.id).await.enabled);

        toggle_key(&storage, created.id, false).await.unwrap();
        assert!(stored(&storage, created.id).await.enabled);
    }

    #[tokio::test]
    async fn test_delete_removes_key_and_ignores_unknown_id() {
        let storage = LocalStorage::in_memory();
        let keep = create_key(&storage, "Keep", None).await.unwrap();
        let gone = create_key(&storage, "Gone", None).await.unwrap();

        delete_key(&storage, gone.id).await.unwrap();
        assert_eq!(list_keys(&storage).await.unwrap(), vec![keep.clone()]);

        delete_key(&storage, Uuid::new_v4()).await.unwrap();
        assert_eq!(list_keys(&storage).await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn test_create_validate_disable_flow() {
        let storage = LocalStorage::in_memory();
        let created = create_key(&storage, "Tester", None).await.unwrap();

        let validated = validate_key(&storage, &created.key).await.unwrap().unwrap();
        assert_eq!(validated.uses, 1);
        assert!(validated.enabled);

        toggle_key(&storage, created.id, true).await.unwrap();
        assert_eq!(validate_key(&storage, &created.key).await.unwrap(), None);
        assert!(!is_key_active(&storage, created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_seed_only_into_empty_store() {
        let storage = LocalStorage::in_memory();

        assert!(seed_if_empty(&storage, "Default User", "test7890").await.unwrap());
        assert!(!seed_if_empty(&storage, "Other", "other").await.unwrap());

        let keys = list_keys(&storage).await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].key, "test7890");
    }
}

use serde_json::Value;

use crate::storage::StorageError;

type MigrationFn = fn(Value) -> Result<Value, StorageError>;

/// Version assigned to documents that carry no `version` field.
pub const LEGACY_VERSION: u32 = 0;

/// Index `n` upgrades a document from version `n` to `n + 1`.
fn get_migrations() -> Vec<MigrationFn> {
    vec![migrate_v0_to_v1]
}

pub fn detect_version(value: &Value) -> Result<u32, StorageError> {
    match value.get("version") {
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| StorageError::InvalidVersion(v.to_string())),
        None => Ok(LEGACY_VERSION),
    }
}

/// Migrations are applied sequentially: v0→v1→v2→...→target
pub fn apply_migrations(
    mut data: Value,
    from_version: u32,
    to_version: u32,
) -> Result<Value, StorageError> {
    if from_version == to_version {
        return Ok(data);
    }

    if from_version > to_version {
        return Err(StorageError::FutureVersion(from_version));
    }

    let migrations = get_migrations();

    for version in from_version..to_version {
        let Some(migration) = migrations.get(version as usize) else {
            return Err(StorageError::UnsupportedVersion(version));
        };

        tracing::info!(from = version, to = version + 1, "migrating store");
        data = migration(data)?;
    }

    Ok(data)
}

/// Unversioned documents used fractional creation timestamps as ids.
/// Each task and habit gets a sequential integer id in stored order.
fn migrate_v0_to_v1(mut value: Value) -> Result<Value, StorageError> {
    if let Some(obj) = value.as_object_mut() {
        obj.insert("version".to_string(), Value::from(1));

        for collection in ["tasks", "habits"] {
            if let Some(items) = obj.get_mut(collection).and_then(|c| c.as_array_mut()) {
                for (index, item) in items.iter_mut().enumerate() {
                    if let Some(item_obj) = item.as_object_mut() {
                        item_obj.insert("id".to_string(), Value::from(index as u64 + 1));
                    }
                }
            }
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_version_with_version_field() {
        let value = json!({"version": 2, "tasks": [], "habits": []});
        assert_eq!(detect_version(&value).unwrap(), 2);
    }

    #[test]
    fn test_detect_version_without_version_field() {
        let value = json!({"tasks": [], "habits": []});
        assert_eq!(detect_version(&value).unwrap(), LEGACY_VERSION);
    }

    #[test]
    fn test_detect_version_rejects_non_numeric() {
        let value = json!({"version": "one"});
        assert!(matches!(
            detect_version(&value),
            Err(StorageError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_apply_migrations_same_version() {
        let data = json!({"version": 1});
        let result = apply_migrations(data.clone(), 1, 1).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_apply_migrations_future_version() {
        let data = json!({"version": 5});
        let result = apply_migrations(data, 5, 1);
        assert!(matches!(result, Err(StorageError::FutureVersion(5))));
    }

    #[test]
    fn test_apply_migrations_missing_step() {
        let data = json!({"version": 1});
        let result = apply_migrations(data, 1, 3);
        assert!(matches!(result, Err(StorageError::UnsupportedVersion(1))));
    }

    #[test]
    fn test_legacy_timestamp_ids_become_sequential() {
        let legacy = json!({
            "tasks": [
                {"id": 1712345678.123456, "title": "a"},
                {"id": 1712345690.5, "title": "b"}
            ],
            "habits": [
                {"id": 1712345700.25, "name": "h"}
            ],
            "points": 40,
            "level": 1
        });

        let migrated = apply_migrations(legacy, LEGACY_VERSION, 1).unwrap();

        assert_eq!(migrated["version"], 1);
        assert_eq!(migrated["tasks"][0]["id"], 1);
        assert_eq!(migrated["tasks"][1]["id"], 2);
        assert_eq!(migrated["habits"][0]["id"], 1);
        assert_eq!(migrated["points"], 40);
    }
}

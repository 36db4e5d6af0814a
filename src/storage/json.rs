use std::{
    fs::{self, rename, write},
    path::{Path, PathBuf},
};

use serde_json::to_string_pretty;
use uuid::Uuid;

use crate::{
    models::store::{CURRENT_VERSION, Store},
    storage::{
        Storage, StorageError,
        migrations::{apply_migrations, detect_version},
    },
};

const BACKUPS_TO_KEEP: usize = 5;

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create_backup(&self) -> Result<u64, StorageError> {
        let file_exists = fs::exists(&self.path).map_err(|e| StorageError::BackupFailed {
            path: self.path.clone(),
            source: e,
        })?;
        if !file_exists {
            return Ok(0);
        }

        let backups_dir = self.get_backup_dir();
        fs::create_dir_all(&backups_dir).map_err(|e| StorageError::BackupFailed {
            path: backups_dir.clone(),
            source: e,
        })?;

        let backup_path = self.get_backup_path();
        fs::copy(&self.path, &backup_path).map_err(|e| StorageError::BackupFailed {
            path: backup_path,
            source: e,
        })
    }

    /// Only rotates backups of this store; other files in `backups/` are left alone.
    fn cleanup_old_backups(&self) -> Result<(), StorageError> {
        let backup_dir = self.get_backup_dir();
        let prefix = format!("{}-", self.get_store_stem());
        let backup_dir_exists =
            fs::exists(&backup_dir).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        if !backup_dir_exists {
            return Ok(());
        }

        let mut file_entries = fs::read_dir(&backup_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();

        file_entries.sort();

        let number_of_files_to_delete = file_entries.len().saturating_sub(BACKUPS_TO_KEEP);
        if number_of_files_to_delete == 0 {
            return Ok(());
        }

        for file_path in &file_entries[0..number_of_files_to_delete] {
            fs::remove_file(file_path).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        }

        Ok(())
    }

    fn get_backup_dir(&self) -> PathBuf {
        let parent_store_path = self.path.parent().unwrap_or(Path::new("."));
        parent_store_path.join("backups")
    }

    fn get_store_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("store"))
    }

    /// Names sort chronologically: `<stem>-<nanoseconds since epoch>.json`
    fn get_backup_path(&self) -> PathBuf {
        let stem = self.get_store_stem();
        let nanos = jiff::Timestamp::now().as_nanosecond();

        self.get_backup_dir().join(format!("{stem}-{nanos:020}.json"))
    }

    fn parse_error(&self, source: serde_json::Error) -> StorageError {
        StorageError::ParseFailed {
            path: self.path.clone(),
            source,
        }
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Store, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let mut data: serde_json::Value =
                    serde_json::from_str(&content).map_err(|e| self.parse_error(e))?;

                let file_version = detect_version(&data)?;
                if file_version > CURRENT_VERSION {
                    return Err(StorageError::FutureVersion(file_version));
                }

                if file_version < CURRENT_VERSION {
                    data = apply_migrations(data, file_version, CURRENT_VERSION)?;
                }

                if let Some(obj) = data.as_object_mut() {
                    obj.insert("version".to_string(), serde_json::json!(CURRENT_VERSION));
                }

                serde_json::from_value(data).map_err(|e| self.parse_error(e))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Store::default()),
            Err(e) => Err(StorageError::LoadFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Replaces the whole document. The previous one is kept under `backups/`
    /// when possible; backup trouble never blocks the write itself.
    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json =
            to_string_pretty(store).map_err(|e| StorageError::SerializeFailed { source: e })?;

        if let Err(e) = self.create_backup() {
            tracing::warn!(error = %e, "skipping backup of previous store");
        }
        if let Err(e) = self.cleanup_old_backups() {
            tracing::warn!(error = %e, "could not rotate old backups");
        }

        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        if let Err(e) = write(&temp_path, json) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::SaveFailed {
                path: temp_path,
                source: e,
            });
        }

        if let Err(e) = rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::SaveFailed {
                path: self.path.clone(),
                source: e,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use tempfile::TempDir;

    use crate::models::{
        habit::Habit,
        task::{Priority, Task},
    };

    fn sample_store() -> Store {
        let mut store = Store::default();
        store.add_task(Task::new(
            0,
            String::from("Essay"),
            String::from("History essay"),
            Priority::High,
            String::from("2099-01-01"),
            Some(String::from("History")),
            date(2024, 1, 1),
        ));
        let mut habit = Habit::new(
            0,
            String::from("Read"),
            String::from("Read 20 min"),
            5,
            date(2024, 1, 1),
        );
        habit.mark_completed(date(2024, 1, 1), date(2024, 1, 2));
        habit.mark_completed(date(2024, 1, 2), date(2024, 1, 2));
        store.add_habit(habit);
        store.add_points(135);
        store
    }

    fn count_backups(dir: &Path) -> usize {
        fs::read_dir(dir.join("backups"))
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
                    .count()
            })
            .unwrap_or(0)
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        let store = sample_store();

        storage.save(&store).unwrap();
        let loaded = storage.load().unwrap();

        assert_eq!(loaded, store);
        assert_eq!(loaded.habits[0].current_streak, 2);
        assert_eq!(loaded.level, 2);
    }

    #[test]
    fn test_document_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let storage = JsonFileStorage::new(path.clone());
        storage.save(&sample_store()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["version"], CURRENT_VERSION);
        assert_eq!(value["points"], 135);
        assert_eq!(value["level"], 2);
        assert_eq!(value["tasks"][0]["id"], 1);
        assert_eq!(value["tasks"][0]["due_date"], "2099-01-01");
        assert_eq!(value["tasks"][0]["priority"], "High");
        assert_eq!(
            value["habits"][0]["completed_dates"],
            serde_json::json!(["2024-01-01", "2024-01-02"])
        );
    }

    #[test]
    fn test_missing_file_loads_empty_store() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("absent.json"));
        let store = storage.load().unwrap();
        assert!(store.tasks.is_empty());
        assert_eq!(store.version, CURRENT_VERSION);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("invalid_store.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let storage = JsonFileStorage::new(path);

        match storage.load() {
            Err(StorageError::ParseFailed { .. }) => {}
            _ => panic!("Expected ParseFailed error, got something else"),
        }
    }

    #[test]
    fn test_load_legacy_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("study_data.json");
        let legacy = r#"{
            "tasks": [{
                "id": 1712345678.123456,
                "title": "Essay",
                "description": "History essay",
                "priority": "Alta",
                "due_date": "2024-04-10",
                "completed": false,
                "created_at": "2024-04-01"
            }],
            "habits": [{
                "id": 1712345699.5,
                "name": "Read",
                "description": "Read 20 min",
                "completed_dates": ["2024-04-01"],
                "current_streak": 1,
                "best_streak": 1,
                "created_at": "2024-04-01"
            }],
            "points": 20,
            "level": 1
        }"#;
        fs::write(&path, legacy).unwrap();

        let store = JsonFileStorage::new(path).load().unwrap();

        assert_eq!(store.version, CURRENT_VERSION);
        assert_eq!(store.tasks[0].id, 1);
        assert_eq!(store.tasks[0].priority, Priority::High);
        assert_eq!(store.tasks[0].category, "General");
        assert_eq!(store.habits[0].id, 1);
        assert_eq!(store.habits[0].target_days, 7);
        assert_eq!(store.points, 20);
    }

    #[test]
    fn test_load_future_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("future_store.json");
        let future_json = r#"{
            "version": 999,
            "tasks": [],
            "habits": []
        }"#;
        fs::write(&path, future_json).unwrap();

        let storage = JsonFileStorage::new(path);

        match storage.load() {
            Err(StorageError::FutureVersion(999)) => {}
            _ => panic!("Expected FutureVersion(999) error"),
        }
    }

    #[test]
    fn test_save_fully_overwrites_previous_document() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));

        storage.save(&sample_store()).unwrap();
        storage.save(&Store::default()).unwrap();

        let loaded = storage.load().unwrap();
        assert!(loaded.tasks.is_empty());
        assert!(loaded.habits.is_empty());
        assert_eq!(loaded.points, 0);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        storage.save(&sample_store()).unwrap();

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_backup_creation_and_cleanup() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));

        for points in 1..=7 {
            let store = Store {
                points,
                ..Store::default()
            };
            storage.save(&store).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        assert_eq!(count_backups(dir.path()), 5, "Should keep exactly 5 backups");
    }

    #[test]
    fn test_unusable_backup_dir_does_not_block_save() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        storage.save(&Store::default()).unwrap();

        // A plain file where the backups directory should be
        fs::write(dir.path().join("backups"), "not a directory").unwrap();

        let store = Store {
            points: 40,
            ..Store::default()
        };
        storage.save(&store).unwrap();

        assert_eq!(storage.load().unwrap().points, 40);
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // The store path is a directory, so the final rename cannot replace it
        let store_path = dir.path().join("store.json");
        fs::create_dir(&store_path).unwrap();
        let storage = JsonFileStorage::new(store_path);

        match storage.save(&Store::default()) {
            Err(StorageError::SaveFailed { .. }) => {}
            other => panic!("Expected SaveFailed error, got {:?}", other),
        }

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_cleanup_keeps_backups_of_other_stores() {
        let dir = TempDir::new().unwrap();
        let backups_dir = dir.path().join("backups");
        fs::create_dir_all(&backups_dir).unwrap();
        let foreign = backups_dir.join("other-00000000000000000001.json");
        fs::write(&foreign, "{}").unwrap();

        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        for points in 1..=8 {
            let store = Store {
                points,
                ..Store::default()
            };
            storage.save(&store).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        assert!(foreign.exists(), "Backups of another store must survive rotation");
        assert_eq!(count_backups(dir.path()), BACKUPS_TO_KEEP + 1);
    }

    #[test]
    fn test_backup_directory_created_on_second_save() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        let backups_dir = dir.path().join("backups");

        storage.save(&Store::default()).unwrap();
        assert!(
            !backups_dir.exists(),
            "Backups dir should not exist after first save"
        );

        storage.save(&sample_store()).unwrap();
        assert!(backups_dir.is_dir(), "Backups dir should be created on second save");
        assert_eq!(count_backups(dir.path()), 1);
    }
}

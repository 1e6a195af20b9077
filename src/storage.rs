use crate::errors::AppError;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::error;

pub const GROUPS_KEY: &str = "homework_classes";
pub const CURRENT_GROUP_KEY: &str = "homework_current_class";

pub fn students_key(group_id: &str) -> String {
    format!("homework_students_{group_id}")
}

pub fn checks_key(group_id: &str) -> String {
    format!("homework_checks_{group_id}")
}

/// String-keyed JSON values, persisted as a single file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct KvStore {
    entries: BTreeMap<String, Value>,
}

impl KvStore {
    /// `Ok(None)` when the key is absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.entries.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub async fn load_store(path: &Path) -> KvStore {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(store) => store,
            Err(err) => {
                error!("failed to parse data file: {err}");
                KvStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => KvStore::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            KvStore::default()
        }
    }
}

pub async fn persist_store(path: &Path, store: &KvStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(|err| {
        error!("failed to write data file {}: {err}", path.display());
        AppError::internal(err)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Group;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "homework_tracker_{name}_{}_{nanos}.json",
            std::process::id()
        ))
    }

    #[test]
    fn missing_key_is_absent_not_error() {
        let store = KvStore::default();
        let value: Option<Vec<Group>> = store.get(GROUPS_KEY).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn set_get_remove() {
        let mut store = KvStore::default();
        store.set(CURRENT_GROUP_KEY, &"class_default").unwrap();
        assert_eq!(
            store.get::<String>(CURRENT_GROUP_KEY).unwrap().as_deref(),
            Some("class_default")
        );
        assert!(store.remove(CURRENT_GROUP_KEY));
        assert!(!store.remove(CURRENT_GROUP_KEY));
        assert!(!store.contains(CURRENT_GROUP_KEY));
    }

    #[test]
    fn wrong_shape_is_an_error() {
        let mut store = KvStore::default();
        store.set(GROUPS_KEY, &42).unwrap();
        assert!(store.get::<Vec<Group>>(GROUPS_KEY).is_err());
    }

    #[test]
    fn keys_are_partitioned_by_group() {
        assert_eq!(students_key("g1"), "homework_students_g1");
        assert_eq!(checks_key("g1"), "homework_checks_g1");
    }

    #[tokio::test]
    async fn file_round_trip() {
        let path = temp_path("round_trip");
        let mut store = KvStore::default();
        store.set(CURRENT_GROUP_KEY, &"g1").unwrap();
        store
            .set(students_key("g1").as_str(), &serde_json::json!([{ "id": "a" }]))
            .unwrap();

        persist_store(&path, &store).await.unwrap();
        let loaded = load_store(&path).await;
        assert_eq!(loaded, store);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corrupt_or_missing_file_loads_empty() {
        let missing = temp_path("missing");
        assert_eq!(load_store(&missing).await, KvStore::default());

        let corrupt = temp_path("corrupt");
        std::fs::write(&corrupt, b"{ not json").unwrap();
        assert_eq!(load_store(&corrupt).await, KvStore::default());
        let _ = std::fs::remove_file(&corrupt);
    }
}

use std::{marker::PhantomData, path::PathBuf, sync::Arc};

use serde::Serialize;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed ordered list store.
///
/// Persists a `Vec<T>` as a pretty-printed JSON array (4-space indent).
/// Every call re-reads the whole file; every mutation rewrites it in full.
/// The read-modify-write cycle of a mutation runs under a single-writer
/// lock, so concurrent mutations within this process cannot lose updates.
/// An absent file reads as the empty list and is only created on the first
/// successful save.
pub struct JsonListStore<T> {
    file_path: PathBuf,
    lock: RwLock<()>,
    _marker: PhantomData<T>,
}

impl<T> JsonListStore<T>
where
    T: Serialize + serde::de::DeserializeOwned + Clone,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Arc<Self> {
        Arc::new(Self { file_path: path.into(), lock: RwLock::new(()), _marker: PhantomData })
    }

    async fn load_unlocked(&self) -> Result<Vec<T>, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!(
                    "malformed store file {}: {e}",
                    self.file_path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ServiceError::Storage(format!(
                "cannot read {}: {e}",
                self.file_path.display()
            ))),
        }
    }

    async fn save_unlocked(&self, items: &[T]) -> Result<(), ServiceError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        items
            .serialize(&mut ser)
            .map_err(|e| ServiceError::Storage(format!("cannot serialize store: {e}")))?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    ServiceError::Storage(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }

        // Write to a sibling temp file, then rename over the real one.
        let tmp_path = self.file_path.with_extension("json.tmp");
        fs::write(&tmp_path, &buf).await.map_err(|e| {
            ServiceError::Storage(format!("cannot write {}: {e}", tmp_path.display()))
        })?;
        fs::rename(&tmp_path, &self.file_path).await.map_err(|e| {
            ServiceError::Storage(format!("cannot replace {}: {e}", self.file_path.display()))
        })?;
        debug!(path = %self.file_path.display(), count = items.len(), "store persisted");
        Ok(())
    }

    /// Load the full collection. Absent file reads as empty.
    pub async fn load(&self) -> Result<Vec<T>, ServiceError> {
        let _guard = self.lock.read().await;
        self.load_unlocked().await
    }

    /// Load, apply `f`, and persist the result. Nothing is written when `f`
    /// returns an error.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let _guard = self.lock.write().await;
        let mut items = self.load_unlocked().await?;
        let out = f(&mut items)?;
        self.save_unlocked(&items).await?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_list_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn absent_file_reads_empty_and_is_created_lazily() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = JsonListStore::<String>::new(&tmp);

        assert!(store.load().await?.is_empty());
        // reading must not create the file
        assert!(tokio::fs::metadata(&tmp).await.is_err());

        store
            .update(|items| {
                items.push("a".to_string());
                Ok(())
            })
            .await?;
        assert!(tokio::fs::metadata(&tmp).await.is_ok());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn mutations_persist_in_order() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = JsonListStore::<u32>::new(&tmp);

        store.update(|items| { items.push(1); Ok(()) }).await?;
        store.update(|items| { items.push(2); Ok(()) }).await?;
        store.update(|items| { items.push(3); Ok(()) }).await?;

        // reload from disk through a fresh store
        let reloaded = JsonListStore::<u32>::new(&tmp);
        assert_eq!(reloaded.load().await?, vec![1, 2, 3]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_is_pretty_printed_with_four_spaces() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = JsonListStore::<serde_json::Value>::new(&tmp);
        store
            .update(|items| {
                items.push(serde_json::json!({"id": 1}));
                Ok(())
            })
            .await?;

        let raw = tokio::fs::read_to_string(&tmp).await?;
        assert!(raw.starts_with("[\n    {\n        \"id\": 1\n    }\n]"), "got: {raw}");
        // the temp file must not be left behind
        assert!(tokio::fs::metadata(tmp.with_extension("json.tmp")).await.is_err());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_writes_nothing() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = JsonListStore::<u32>::new(&tmp);
        store.update(|items| { items.push(7); Ok(()) }).await?;

        let res = store
            .update(|items| {
                items.push(8);
                Err::<(), _>(ServiceError::not_found("thing"))
            })
            .await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        assert_eq!(store.load().await?, vec![7]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_surfaces_storage_error() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        tokio::fs::write(&tmp, b"{not json").await?;
        let store = JsonListStore::<u32>::new(&tmp);
        assert!(matches!(store.load().await, Err(ServiceError::Storage(_))));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}

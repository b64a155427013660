use std::sync::Arc;

use models::student::{NewStudent, Student, StudentUpdate};

use crate::errors::ServiceError;
use crate::storage::json_list_store::JsonListStore;
use crate::students::store::StudentStore;

/// File-backed store for student records.
///
/// The whole collection lives in one JSON file; records keep their insertion
/// order. Each operation loads the full collection and mutations rewrite it
/// in full.
#[derive(Clone)]
pub struct StudentFileStore {
    store: Arc<JsonListStore<Student>>,
}

impl StudentFileStore {
    /// Initialize the store from the given file path. The file itself is
    /// created on the first successful write; an existing but unreadable
    /// file fails here rather than at the first request.
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonListStore::<Student>::new(path);
        store.load().await?;
        Ok(Arc::new(Self { store }))
    }

    /// List all records in stored order.
    pub async fn list(&self) -> Result<Vec<Student>, ServiceError> {
        self.store.load().await
    }

    /// Get a record by id.
    pub async fn get(&self, id: u64) -> Result<Option<Student>, ServiceError> {
        let items = self.store.load().await?;
        Ok(items.into_iter().find(|s| s.id == id))
    }

    /// Validate, derive `average`, and append; duplicate ids are rejected
    /// without touching the file.
    pub async fn create(&self, input: NewStudent) -> Result<Student, ServiceError> {
        let student = input.into_student()?;
        let created = student.clone();
        self.store
            .update(move |items| {
                if items.iter().any(|s| s.id == student.id) {
                    return Err(ServiceError::Conflict("Student ID already exists".into()));
                }
                items.push(student);
                Ok(())
            })
            .await?;
        Ok(created)
    }

    /// Merge the supplied fields into the record with the given id.
    /// `average` is recomputed inside the merge when `marks` is supplied.
    pub async fn update(&self, id: u64, update: StudentUpdate) -> Result<Student, ServiceError> {
        self.store
            .update(move |items| {
                let existing = items
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or_else(|| ServiceError::not_found("Student"))?;
                existing.apply_update(update);
                Ok(existing.clone())
            })
            .await
    }

    /// Remove the record with the given id; returns whether it existed.
    /// A miss leaves the file untouched.
    pub async fn delete(&self, id: u64) -> Result<bool, ServiceError> {
        let res = self
            .store
            .update(|items| {
                let before = items.len();
                items.retain(|s| s.id != id);
                if items.len() == before {
                    return Err(ServiceError::not_found("Student"));
                }
                Ok(())
            })
            .await;
        match res {
            Ok(()) => Ok(true),
            Err(ServiceError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl StudentStore for StudentFileStore {
    async fn list(&self) -> Result<Vec<Student>, ServiceError> { self.list().await }
    async fn get(&self, id: u64) -> Result<Option<Student>, ServiceError> { self.get(id).await }
    async fn create(&self, input: NewStudent) -> Result<Student, ServiceError> { self.create(input).await }
    async fn update(&self, id: u64, update: StudentUpdate) -> Result<Student, ServiceError> { self.update(id, update).await }
    async fn delete(&self, id: u64) -> Result<bool, ServiceError> { self.delete(id).await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample(id: u64) -> NewStudent {
        NewStudent {
            id,
            name: "Alice".into(),
            age: 20,
            grade: "A".into(),
            marks: vec![80, 90, 70],
        }
    }

    fn temp_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("svc_students_{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn student_store_basic_crud() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = StudentFileStore::new(&tmp).await?;

        // initially empty
        assert!(store.list().await?.is_empty());

        // create derives average
        let created = store.create(sample(1)).await?;
        assert_eq!(created.average, 80.0);

        // get
        let found = store.get(1).await?.expect("found");
        assert_eq!(found, created);
        assert!(store.get(2).await?.is_none());

        // update merges and recomputes
        let updated = store
            .update(1, StudentUpdate { marks: Some(vec![100, 100]), ..Default::default() })
            .await?;
        assert_eq!(updated.average, 100.0);
        assert_eq!(updated.name, "Alice");

        // delete
        assert!(store.delete(1).await?);
        assert!(!store.delete(1).await?);

        // reload store from disk to ensure persistence
        let store2 = StudentFileStore::new(&tmp).await?;
        assert!(store2.list().await?.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected_without_write() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = StudentFileStore::new(&tmp).await?;
        store.create(sample(1)).await?;

        let mut dup = sample(1);
        dup.name = "Mallory".into();
        let err = store.create(dup).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let list = store.list().await?;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Alice");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_storage() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = StudentFileStore::new(&tmp).await?;

        let mut bad = sample(1);
        bad.marks = vec![101];
        assert!(matches!(store.create(bad).await, Err(ServiceError::Model(_))));
        assert!(store.list().await?.is_empty());
        // nothing was written, so the file still does not exist
        assert!(tokio::fs::metadata(&tmp).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn records_keep_insertion_order() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = StudentFileStore::new(&tmp).await?;
        for id in [3, 1, 2] {
            store.create(sample(id)).await?;
        }
        let ids: Vec<u64> = store.list().await?.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = StudentFileStore::new(&tmp).await?;
        let err = store
            .update(42, StudentUpdate { grade: Some("B".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }
}

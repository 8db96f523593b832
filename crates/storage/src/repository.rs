use async_trait::async_trait;
use portal_core::model::{CompletionMap, RoutineStore, StudentRoster};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// True when the store itself was unreachable or rejected the operation.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, StorageError::Connection(_))
    }
}

/// Named slots inside the aggregate portal document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Routine,
    CompletedTasks,
    Students,
    Users,
    Feedback,
    Notifications,
    SyllabusData,
    UserSettings,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Routine,
        Collection::CompletedTasks,
        Collection::Students,
        Collection::Users,
        Collection::Feedback,
        Collection::Notifications,
        Collection::SyllabusData,
        Collection::UserSettings,
    ];

    /// Key used for the collection in the persisted document.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Collection::Routine => "routine",
            Collection::CompletedTasks => "completedTasks",
            Collection::Students => "students",
            Collection::Users => "users",
            Collection::Feedback => "feedback",
            Collection::Notifications => "notifications",
            Collection::SyllabusData => "syllabusData",
            Collection::UserSettings => "userSettings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Collection {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| StorageError::Serialization(format!("unknown collection: {s}")))
    }
}

/// Whole-value persistence, one JSON value per collection.
///
/// `save` replaces the stored value wholesale; there is no field-level
/// update. Concurrent writers are not reconciled: the last save wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the current value of a collection.
    ///
    /// Returns `Ok(None)` if the collection has never been saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store is unreachable.
    async fn load(&self, collection: Collection) -> Result<Option<Value>, StorageError>;

    /// Replace the value of a collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the write is rejected.
    async fn save(&self, collection: Collection, value: &Value) -> Result<(), StorageError>;
}

/// Simple in-memory document store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<HashMap<Collection, Value>>>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn load(&self, collection: Collection) -> Result<Option<Value>, StorageError> {
        let guard = self
            .collections
            .lock()
            .map_err(|_| StorageError::Connection("poisoned lock".into()))?;
        Ok(guard.get(&collection).cloned())
    }

    async fn save(&self, collection: Collection, value: &Value) -> Result<(), StorageError> {
        let mut guard = self
            .collections
            .lock()
            .map_err(|_| StorageError::Connection("poisoned lock".into()))?;
        guard.insert(collection, value.clone());
        Ok(())
    }
}

/// Typed access to collections on top of a `DocumentStore`.
///
/// Missing collections read as their type's default value.
#[derive(Clone)]
pub struct Documents {
    store: Arc<dyn DocumentStore>,
}

impl Documents {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    /// Load and decode a collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value does not
    /// match `T`, or the store's own error.
    pub async fn get<T>(&self, collection: Collection) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        match self.store.load(collection).await? {
            Some(Value::Null) | None => Ok(T::default()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| StorageError::Serialization(format!("{collection}: {e}"))),
        }
    }

    /// Encode and replace a collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails, or the store's
    /// own error.
    pub async fn save<T>(&self, collection: Collection, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_json::to_value(value)
            .map_err(|e| StorageError::Serialization(format!("{collection}: {e}")))?;
        self.store.save(collection, &encoded).await?;
        tracing::debug!(%collection, "document saved");
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Documents::get`].
    pub async fn routine(&self) -> Result<RoutineStore, StorageError> {
        self.get(Collection::Routine).await
    }

    /// # Errors
    ///
    /// See [`Documents::save`].
    pub async fn save_routine(&self, routine: &RoutineStore) -> Result<(), StorageError> {
        self.save(Collection::Routine, routine).await
    }

    /// # Errors
    ///
    /// See [`Documents::get`].
    pub async fn completed_tasks(&self) -> Result<CompletionMap, StorageError> {
        self.get(Collection::CompletedTasks).await
    }

    /// # Errors
    ///
    /// See [`Documents::save`].
    pub async fn save_completed_tasks(&self, map: &CompletionMap) -> Result<(), StorageError> {
        self.save(Collection::CompletedTasks, map).await
    }

    /// # Errors
    ///
    /// See [`Documents::get`].
    pub async fn students(&self) -> Result<StudentRoster, StorageError> {
        self.get(Collection::Students).await
    }

    /// # Errors
    ///
    /// See [`Documents::save`].
    pub async fn save_students(&self, roster: &StudentRoster) -> Result<(), StorageError> {
        self.save(Collection::Students, roster).await
    }
}

/// Aggregates storage handles for easy wiring.
#[derive(Clone)]
pub struct Storage {
    pub documents: Documents,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        Self {
            documents: Documents::new(store),
        }
    }
}

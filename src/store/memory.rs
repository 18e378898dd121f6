use super::{ProfileStore, StoreError};
use crate::database::ConnectionError;
use crate::models::UserType;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Equality-only store used by handler tests.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<UserType, Vec<Document>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn seed(&self, user_type: UserType, mut doc: Document) -> ObjectId {
        let id = match doc.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                doc.insert("_id", id);
                id
            }
        };
        self.collections
            .lock()
            .unwrap()
            .entry(user_type)
            .or_default()
            .push(doc);
        id
    }

    pub fn get(&self, user_type: UserType, id: ObjectId) -> Option<Document> {
        let collections = self.collections.lock().unwrap();
        collections
            .get(&user_type)?
            .iter()
            .find(|d| d.get_object_id("_id").ok() == Some(id))
            .cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(ConnectionError::Timeout(
                std::time::Duration::from_secs(5),
            )))
        } else {
            Ok(())
        }
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| doc.get(key).map_or(*expected == Bson::Null, |v| v == expected))
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn find_one(
        &self,
        user_type: UserType,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        self.check_available()?;
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(&user_type)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn find_many(
        &self,
        user_type: UserType,
        filter: Document,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(&user_type)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        user_type: UserType,
        doc: Document,
    ) -> Result<ObjectId, StoreError> {
        self.check_available()?;
        if let Ok(email) = doc.get_str("email") {
            let taken = {
                let collections = self.collections.lock().unwrap();
                collections.get(&user_type).is_some_and(|docs| {
                    docs.iter().any(|d| d.get_str("email").ok() == Some(email))
                })
            };
            if taken {
                return Err(StoreError::Duplicate(email.to_string()));
            }
        }
        Ok(self.seed(user_type, doc))
    }

    async fn update_one(
        &self,
        user_type: UserType,
        id: ObjectId,
        set: Document,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.lock().unwrap();
        let target = collections.get_mut(&user_type).and_then(|docs| {
            docs.iter_mut()
                .find(|d| d.get_object_id("_id").ok() == Some(id))
        });
        match target {
            Some(doc) => {
                for (key, value) in set {
                    doc.insert(key, value);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one(&self, user_type: UserType, id: ObjectId) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.lock().unwrap();
        let Some(docs) = collections.get_mut(&user_type) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.get_object_id("_id").ok() != Some(id));
        Ok(docs.len() < before)
    }
}

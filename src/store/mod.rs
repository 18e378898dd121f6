// Acesso aos perfis (students, startups, clubs) com degradação explícita
#[cfg(test)]
pub mod memory;

use crate::database::{ConnectionError, ConnectionProvider, MongoHandle};
use crate::models::UserType;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No database handle could be obtained; the data may exist but cannot be read.
    #[error("profile store unavailable: {0}")]
    Unavailable(#[from] ConnectionError),
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *e.kind {
            if write_error.code == 11000 {
                return StoreError::Duplicate(write_error.message.clone());
            }
        }
        StoreError::Database(e.to_string())
    }
}

/// Per-collection document operations used by the route handlers.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Succeeds when a database handle can be obtained right now.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_one(
        &self,
        user_type: UserType,
        filter: Document,
    ) -> Result<Option<Document>, StoreError>;

    async fn find_many(
        &self,
        user_type: UserType,
        filter: Document,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert_one(&self, user_type: UserType, doc: Document)
        -> Result<ObjectId, StoreError>;

    /// Applies `$set` to the document with `id`. Returns whether it matched.
    async fn update_one(
        &self,
        user_type: UserType,
        id: ObjectId,
        set: Document,
    ) -> Result<bool, StoreError>;

    /// Returns whether a document was deleted.
    async fn delete_one(&self, user_type: UserType, id: ObjectId) -> Result<bool, StoreError>;
}

pub struct MongoProfileStore<P> {
    provider: P,
    indexes_ready: AtomicBool,
}

impl<P> MongoProfileStore<P>
where
    P: ConnectionProvider<Handle = MongoHandle>,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            indexes_ready: AtomicBool::new(false),
        }
    }

    pub fn indexes_ready(&self) -> bool {
        self.indexes_ready.load(Ordering::Acquire)
    }

    /// Unique indexes are created on the first handle this store obtains, so a
    /// database that was down at boot still gets them once it comes up.
    async fn handle(&self) -> Result<MongoHandle, StoreError> {
        let handle = self.provider.get_connection().await.map_err(|e| {
            log::warn!("⚠️  Profile store running degraded: {}", e);
            StoreError::Unavailable(e)
        })?;

        if !self.indexes_ready() {
            match handle.ensure_indexes().await {
                Ok(()) => self.indexes_ready.store(true, Ordering::Release),
                Err(e) => log::warn!("⚠️  Index setup failed, retrying on next request: {}", e),
            }
        }
        Ok(handle)
    }
}

#[async_trait]
impl<P> ProfileStore for MongoProfileStore<P>
where
    P: ConnectionProvider<Handle = MongoHandle>,
{
    async fn ping(&self) -> Result<(), StoreError> {
        self.handle().await.map(|_| ())
    }

    async fn find_one(
        &self,
        user_type: UserType,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        let handle = self.handle().await?;
        Ok(handle.collection(user_type).find_one(filter).await?)
    }

    async fn find_many(
        &self,
        user_type: UserType,
        filter: Document,
    ) -> Result<Vec<Document>, StoreError> {
        let handle = self.handle().await?;
        let cursor = handle.collection(user_type).find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_one(
        &self,
        user_type: UserType,
        doc: Document,
    ) -> Result<ObjectId, StoreError> {
        let handle = self.handle().await?;
        let result = handle.collection(user_type).insert_one(doc).await?;
        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id),
            other => Err(StoreError::Database(format!(
                "unexpected inserted id: {}",
                other
            ))),
        }
    }

    async fn update_one(
        &self,
        user_type: UserType,
        id: ObjectId,
        set: Document,
    ) -> Result<bool, StoreError> {
        let handle = self.handle().await?;
        let result = handle
            .collection(user_type)
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, user_type: UserType, id: ObjectId) -> Result<bool, StoreError> {
        let handle = self.handle().await?;
        let result = handle
            .collection(user_type)
            .delete_one(doc! { "_id": id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

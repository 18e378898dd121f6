use crate::config::DeploymentMode;
use crate::database::connection::{ConnectionError, Connector, DbHandle};
use crate::models::UserType;
use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions, Tls};
use mongodb::{Client, Collection, Database, IndexModel};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

impl From<mongodb::error::Error> for ConnectionError {
    fn from(e: mongodb::error::Error) -> Self {
        ConnectionError::Failure(e.to_string())
    }
}

/// Builds driver clients for the configured cluster.
pub struct MongoConnector {
    uri: String,
    db_name: String,
    mode: DeploymentMode,
}

impl MongoConnector {
    pub fn new(uri: &str, db_name: &str, mode: DeploymentMode) -> Self {
        Self {
            uri: uri.to_string(),
            db_name: db_name.to_string(),
            mode,
        }
    }
}

#[async_trait]
impl Connector for MongoConnector {
    type Handle = MongoHandle;

    async fn connect(&self) -> Result<MongoHandle, ConnectionError> {
        let mut client_options = ClientOptions::parse(self.uri.as_str()).await?;

        // Pool pequeno: cada instância serverless abre o seu
        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(1);
        client_options.max_idle_time = Some(Duration::from_secs(30));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        if self.mode.allow_invalid_certificates() {
            if let Some(Tls::Enabled(ref mut tls)) = client_options.tls {
                tls.allow_invalid_certificates = Some(true);
            }
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(&self.db_name);

        // Test connection
        db.run_command(doc! { "ping": 1 }).await?;

        log::info!("✅ MongoDB connected (database: {})", self.db_name);

        Ok(MongoHandle {
            db,
            open: Arc::new(AtomicBool::new(true)),
        })
    }
}

#[derive(Clone)]
pub struct MongoHandle {
    /// Holds the driver client; clones share its connection pool.
    db: Database,
    open: Arc<AtomicBool>,
}

impl MongoHandle {
    pub fn collection(&self, user_type: UserType) -> Collection<Document> {
        self.db.collection(user_type.collection_name())
    }

    /// Unique email per collection; cross-collection uniqueness is checked on registration.
    /// Re-creating an identical index is a no-op, so any error here is real.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        log::info!("🔧 Creating database indexes...");

        for user_type in UserType::ALL {
            let index = IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();

            if let Err(e) = self.collection(user_type).create_index(index).await {
                log::error!(
                    "   ❌ Index on {}(email) failed: {}",
                    user_type.collection_name(),
                    e
                );
                return Err(e);
            }
            log::info!("   ✅ Index ready: {}(email)", user_type.collection_name());
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }
}

#[async_trait]
impl DbHandle for MongoHandle {
    fn is_connected(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Requests may still hold clones of this handle, so it is not shut down here.
    /// The driver tears the pool down once the last clone is dropped.
    async fn close(&self) -> Result<(), ConnectionError> {
        if self.open.swap(false, Ordering::SeqCst) {
            log::debug!("🔌 Retired MongoDB client");
        }
        Ok(())
    }
}

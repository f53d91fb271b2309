//! MongoDB test infrastructure

use document_store::MongoStore;
use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Throwaway MongoDB container.
///
/// Stopped and removed when dropped. Each instance gets its own database
/// name so several tests can share a container image without colliding.
///
/// ```no_run
/// use test_utils::TestMongo;
/// use document_store::SoftDeleteCollection;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let contacts = SoftDeleteCollection::new(mongo.store("contacts"));
/// # }
/// ```
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    client: Client,
    database: Database,
    pub connection_string: String,
}

impl TestMongo {
    /// Start a MongoDB 7 container.
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("7")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string = format!("mongodb://127.0.0.1:{host_port}");
        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to create MongoDB client");

        let database_name = format!("test_{}", uuid::Uuid::now_v7().simple());
        let database = client.database(&database_name);

        tracing::info!(port = host_port, database = %database_name, "Test MongoDB ready");

        Self {
            container,
            client,
            database,
            connection_string,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// A [`MongoStore`] over `collection` in the test database.
    pub fn store(&self, collection: &str) -> MongoStore {
        MongoStore::new(&self.database, collection)
    }
}

impl Drop for TestMongo {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test MongoDB container");
    }
}

//! Shared application state passed to route constructors.

use mongodb::{Client, Database};

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// Shares the driver's connection pool across clones
    pub mongo_client: Client,
    pub db: Database,
}

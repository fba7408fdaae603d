use std::sync::Arc;

use sea_orm::DatabaseConnection;

use service::listings::repo::seaorm::SeaOrmListingRepository;
use service::listings::repository::ListingRepository;
use service::listings::ListingController;

use crate::auth::ServerAuthConfig;

#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub listings: ListingController<dyn ListingRepository>,
}

impl ServerState {
    /// State backed by the SeaORM listing repository.
    pub fn new(db: DatabaseConnection, auth: ServerAuthConfig) -> Self {
        let repo: Arc<dyn ListingRepository> = Arc::new(SeaOrmListingRepository { db });
        Self::with_repository(repo, auth)
    }

    pub fn with_repository(repo: Arc<dyn ListingRepository>, auth: ServerAuthConfig) -> Self {
        Self { auth, listings: ListingController::new(repo) }
    }
}
